// ============================================================================
// vidmend-cli/src/error.rs
// ============================================================================
//
// CLI ERROR HANDLING: Error reporting for the CLI
//
// Commands return `anyhow` errors carrying a context chain on top of the
// core's `CoreError`. This module turns such a chain into the message printed
// before the process exits nonzero.

use vidmend_core::CoreError;

/// Result type for CLI operations.
pub type CliResult<T> = anyhow::Result<T>;

/// Renders an error chain as one message, with a hint when the root cause
/// has an obvious fix.
pub fn describe(err: &anyhow::Error) -> String {
    let mut message = format!("{err:#}");
    if let Some(hint) = hint_for(err) {
        message.push_str("\n  hint: ");
        message.push_str(hint);
    }
    message
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    let core = err.chain().find_map(|cause| cause.downcast_ref::<CoreError>())?;
    match core {
        CoreError::ToolNotFound(_) => Some(
            "pass --ffmpeg-dir, set VIDMEND_FFMPEG_DIR, or run `vidmend config set-ffmpeg-dir <DIR>`",
        ),
        CoreError::TaskBusy => Some("wait for the running task to finish"),
        CoreError::Config(_) => Some("run `vidmend config reset` to start from defaults"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn includes_context_chain() {
        let err = Err::<(), _>(CoreError::ProbeFailed("bad header".into()))
            .context("Cannot inspect clip.mp4")
            .unwrap_err();
        let text = describe(&err);
        assert!(text.starts_with("Cannot inspect clip.mp4: Probe failed: bad header"));
        assert!(!text.contains("hint"));
    }

    #[test]
    fn hints_at_tool_location() {
        let err = Err::<(), _>(CoreError::ToolNotFound(PathBuf::from("/x/ffmpeg")))
            .context("Cannot start")
            .unwrap_err();
        assert!(describe(&err).contains("set-ffmpeg-dir"));
    }
}
