// Well-known WS method names — must match cronkite client expectations.

// jobs
pub const JOB_ADD: &str = "job.add";
pub const JOB_UPDATE: &str = "job.update";
pub const JOB_REMOVE: &str = "job.remove";
pub const JOB_GET: &str = "job.get";
pub const JOB_LIST: &str = "job.list";
pub const JOB_RUN_NOW: &str = "job.run_now";

// scheduler lifecycle
pub const SCHEDULER_START: &str = "scheduler.start";
pub const SCHEDULER_STOP: &str = "scheduler.stop";
pub const SCHEDULER_STATUS: &str = "scheduler.status";

// autostart registration
pub const AUTOSTART_SET: &str = "autostart.set";
pub const AUTOSTART_GET: &str = "autostart.get";

// app surface
pub const APP_ACTIVATE: &str = "app.activate";

// handshake
pub const CONNECT: &str = "connect";

// pushed events
pub const EVENT_JOB_COMPLETED: &str = "job.completed";
pub const EVENT_JOBS_CHANGED: &str = "jobs.changed";
pub const EVENT_LOG_MESSAGE: &str = "log.message";
pub const EVENT_APP_ACTIVATE: &str = "app.activate";
