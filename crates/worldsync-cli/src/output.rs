//! Shared output layer for human/JSON parity across CLI commands.
//!
//! Every command handler receives an [`OutputMode`] and formats its output
//! accordingly: readable text for operators, stable JSON for scripts.

use anyhow::Result;
use serde::Serialize;
use std::io::{self, Write};
use worldsync_core::error::{ErrorCode, SyncError};
use worldsync_core::lock::LockError;

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON, one object per command.
    Json,
}

/// Render `value` to stdout in the requested mode.
///
/// JSON mode serializes the value as-is; human mode delegates to the
/// provided formatter.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human(value, &mut out)?,
    }
    Ok(())
}

/// Terminal-facing error payload with the machine code and remediation hint.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Stable `E####` code, absent for errors with no mapped code.
    pub code: Option<&'static str>,
    /// Stable per-code summary line, absent alongside `code`.
    pub summary: Option<&'static str>,
    pub message: String,
    pub hint: Option<&'static str>,
}

impl CliError {
    /// Extract code, message, and hint from a command failure.
    ///
    /// Typed engine and lock errors carry an [`ErrorCode`]; anything else
    /// renders as its plain context chain.
    #[must_use]
    pub fn from_failure(err: &anyhow::Error) -> Self {
        let code = err
            .downcast_ref::<SyncError>()
            .map(SyncError::code)
            .or_else(|| err.downcast_ref::<LockError>().map(LockError::code));
        Self {
            code: code.map(ErrorCode::code),
            summary: code.map(ErrorCode::message),
            message: format!("{err:#}"),
            hint: code.and_then(ErrorCode::hint),
        }
    }
}

/// Render a command failure to stderr, adapting format to the output mode.
///
/// In JSON mode outputs `{"error": {"code": ..., "message": ..., "hint": ...}}`;
/// in human mode `error[E....]: <message>` followed by an indented hint line.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn render_error(mode: OutputMode, error: &CliError) -> Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            match error.code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(hint) = error.hint {
                writeln!(out, "  hint: {hint}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CliError, OutputMode};
    use worldsync_core::error::SyncError;

    #[test]
    fn modes_are_distinct() {
        assert_ne!(OutputMode::Human, OutputMode::Json);
    }

    #[test]
    fn typed_errors_carry_code_and_hint() {
        let err = anyhow::Error::from(SyncError::MissingTextures {
            missing: vec!["dirt".into()],
        });
        let cli = CliError::from_failure(&err);
        assert_eq!(cli.code, Some("E2001"));
        assert_eq!(cli.summary, Some("Referenced textures missing"));
        assert!(cli.message.contains("dirt"));
        assert!(cli.hint.is_some());
    }

    #[test]
    fn untyped_errors_render_without_a_code() {
        let err = anyhow::anyhow!("no such catalog").context("load catalog");
        let cli = CliError::from_failure(&err);
        assert_eq!(cli.code, None);
        assert!(cli.message.contains("load catalog"));
        assert!(cli.hint.is_none());
    }
}
