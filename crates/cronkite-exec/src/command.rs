//! Target-to-command resolution.
//!
//! Pure string work — no filesystem or environment access. The extension →
//! interpreter mapping is a flat table so adding a language is a one-line
//! change.

use std::path::Path;

use crate::types::ResolvedCommand;

/// Interpreter table: (lowercase extension, program, leading args).
/// The target path is appended after the leading args, then the job's own
/// arguments.
const INTERPRETERS: &[(&str, &str, &[&str])] = &[
    ("py", "python", &[]),
    ("ps1", "powershell", &["-ExecutionPolicy", "Bypass", "-File"]),
    ("bat", "cmd", &["/c"]),
    ("cmd", "cmd", &["/c"]),
    ("js", "node", &[]),
];

/// Split an argument string on whitespace.
///
/// No quoting or escaping — every whitespace-separated token is one
/// argument. An empty or all-whitespace string yields no arguments.
pub fn split_arguments(arguments: &str) -> Vec<String> {
    arguments.split_whitespace().map(str::to_string).collect()
}

/// Map a job's target and argument string to the program/args pair to spawn.
///
/// A non-empty custom command bypasses the interpreter table entirely: it
/// becomes the program and the target its first argument. Otherwise the
/// target's extension selects an interpreter, and an unknown (or missing)
/// extension means the target is executed directly.
pub fn resolve(
    target: &str,
    arguments: &str,
    use_custom_command: bool,
    custom_command: &str,
) -> ResolvedCommand {
    let extra = split_arguments(arguments);

    if use_custom_command && !custom_command.trim().is_empty() {
        let mut args = vec![target.to_string()];
        args.extend(extra);
        return ResolvedCommand {
            program: custom_command.to_string(),
            args,
        };
    }

    let ext = Path::new(target)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    if let Some(ext) = ext {
        if let Some((_, program, leading)) = INTERPRETERS.iter().find(|(e, _, _)| *e == ext) {
            let mut args: Vec<String> = leading.iter().map(|s| s.to_string()).collect();
            args.push(target.to_string());
            args.extend(extra);
            return ResolvedCommand {
                program: program.to_string(),
                args,
            };
        }
    }

    ResolvedCommand {
        program: target.to_string(),
        args: extra,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn python_script_runs_under_python() {
        let cmd = resolve("/opt/backup.py", "", false, "");
        assert_eq!(cmd.program, "python");
        assert_eq!(cmd.args, args(&["/opt/backup.py"]));
    }

    #[test]
    fn powershell_script_gets_bypass_flags_before_target() {
        let cmd = resolve("C:/tasks/sync.ps1", "-Fast", false, "");
        assert_eq!(cmd.program, "powershell");
        assert_eq!(
            cmd.args,
            args(&["-ExecutionPolicy", "Bypass", "-File", "C:/tasks/sync.ps1", "-Fast"])
        );
    }

    #[test]
    fn batch_variants_run_under_cmd() {
        for target in ["job.bat", "job.cmd"] {
            let cmd = resolve(target, "", false, "");
            assert_eq!(cmd.program, "cmd");
            assert_eq!(cmd.args, args(&["/c", target]));
        }
    }

    #[test]
    fn javascript_runs_under_node() {
        let cmd = resolve("tasks/report.js", "--verbose", false, "");
        assert_eq!(cmd.program, "node");
        assert_eq!(cmd.args, args(&["tasks/report.js", "--verbose"]));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let cmd = resolve("/opt/Backup.PY", "", false, "");
        assert_eq!(cmd.program, "python");
    }

    #[test]
    fn unknown_extension_executes_directly() {
        let cmd = resolve("/usr/local/bin/backup.sh", "full", false, "");
        assert_eq!(cmd.program, "/usr/local/bin/backup.sh");
        assert_eq!(cmd.args, args(&["full"]));
    }

    #[test]
    fn no_extension_executes_directly() {
        let cmd = resolve("/usr/bin/rsync", "-a src dst", false, "");
        assert_eq!(cmd.program, "/usr/bin/rsync");
        assert_eq!(cmd.args, args(&["-a", "src", "dst"]));
    }

    #[test]
    fn custom_command_overrides_the_table() {
        let cmd = resolve("script.py", "--x 1", true, "python3.12");
        assert_eq!(cmd.program, "python3.12");
        assert_eq!(cmd.args, args(&["script.py", "--x", "1"]));
    }

    #[test]
    fn blank_custom_command_falls_back_to_the_table() {
        let cmd = resolve("script.py", "", true, "   ");
        assert_eq!(cmd.program, "python");
        assert_eq!(cmd.args, args(&["script.py"]));
    }

    #[test]
    fn arguments_split_on_any_whitespace() {
        assert_eq!(split_arguments("  -a   --long\tvalue "), args(&["-a", "--long", "value"]));
        assert!(split_arguments("").is_empty());
        assert!(split_arguments("   ").is_empty());
    }
}
