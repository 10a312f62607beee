//! cronkite-core — shared plumbing for the cronkite workspace.
//!
//! Config loading (`cronkite.toml` + `CRONKITE_*` env overrides), the
//! engine-wide [`events::EventBus`], and the injectable [`clock::Clock`]
//! time source.

pub mod clock;
pub mod config;
pub mod error;
pub mod events;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::CronkiteConfig;
pub use error::{CoreError, Result};
pub use events::{CronEvent, EventBus};
