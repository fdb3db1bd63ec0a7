//! Post-conversion import hooks.
//!
//! After a marker file is written, a hook can hand it to whatever imports it
//! into the DAW (a script, a menu-automation helper, a notifier). Hooks are
//! best-effort: a failing hook is logged and reported, but the conversion
//! itself has already succeeded.

use std::path::Path;
use std::process::Command;

use crate::timecode::Timecode;

/// Placeholder replaced by the written file's path.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Placeholder replaced by the session start (`HH MM SS FF`).
pub const SESSION_START_PLACEHOLDER: &str = "{session_start}";

/// Error from a single hook run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HookError {
    #[error("Hook '{hook}' could not be started: {message}")]
    Spawn { hook: String, message: String },

    #[error("Hook '{hook}' failed: {message}")]
    Failed { hook: String, message: String },
}

/// Something that picks up a freshly written marker file.
pub trait ImportHook: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Hand over the file. `session_start` is the timecode the DAW session
    /// should start at for the markers to line up.
    fn run(&self, path: &Path, session_start: &Timecode) -> Result<(), HookError>;
}

/// Runs an external program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandHook {
    program: String,
    args: Vec<String>,
}

impl CommandHook {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args...]` list; `None` when empty.
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        if program.trim().is_empty() {
            return None;
        }
        Some(Self::new(program.clone(), args.to_vec()))
    }

    /// Arguments with placeholders filled in.
    pub fn expand_args(&self, path: &Path, session_start: &Timecode) -> Vec<String> {
        let path = path.display().to_string();
        let start = session_start.to_spaced();
        self.args
            .iter()
            .map(|arg| {
                arg.replace(PATH_PLACEHOLDER, &path)
                    .replace(SESSION_START_PLACEHOLDER, &start)
            })
            .collect()
    }
}

impl ImportHook for CommandHook {
    fn name(&self) -> &str {
        &self.program
    }

    fn run(&self, path: &Path, session_start: &Timecode) -> Result<(), HookError> {
        let output = Command::new(&self.program)
            .args(self.expand_args(path, session_start))
            .output()
            .map_err(|e| HookError::Spawn {
                hook: self.program.clone(),
                message: e.to_string(),
            })?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            Err(HookError::Failed {
                hook: self.program.clone(),
                message: if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                },
            })
        }
    }
}

/// Outcome of one hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookOutcome {
    pub hook: String,
    pub result: Result<(), HookError>,
}

impl HookOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Run every hook in order. Never fails; failures are logged at `warn`.
pub fn run_hooks(
    hooks: &[Box<dyn ImportHook>],
    path: &Path,
    session_start: &Timecode,
) -> Vec<HookOutcome> {
    hooks
        .iter()
        .map(|hook| {
            let result = hook.run(path, session_start);
            match &result {
                Ok(()) => tracing::info!(hook = hook.name(), "import hook finished"),
                Err(err) => tracing::warn!(hook = hook.name(), %err, "import hook failed"),
            }
            HookOutcome {
                hook: hook.name().to_string(),
                result,
            }
        })
        .collect()
}
