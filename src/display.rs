use anyhow::Result;
use async_trait::async_trait;

/// A single evolving status message shown to the end user.
///
/// The orchestrator and progress reporter push replacement text through
/// `edit`; surfaces that support in-place edits (chat transports) update one
/// message, others reprint. Callers treat failures as best-effort: an `edit`
/// error is logged and dropped, never propagated into the transfer.
#[async_trait]
pub trait StatusDisplay: Send + Sync {
    async fn edit(&self, text: &str) -> Result<()>;
}

/// Writes each status update to stdout as its own block.
pub struct ConsoleDisplay;

#[async_trait]
impl StatusDisplay for ConsoleDisplay {
    async fn edit(&self, text: &str) -> Result<()> {
        println!("{text}\n");
        Ok(())
    }
}
