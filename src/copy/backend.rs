use std::future::Future;

use thiserror::Error;

use super::carrier::{CommandHost, legacy_copy};

/// Why a clipboard write did not happen.
#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Primary(#[from] arboard::Error),
    #[error("clipboard task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("no copy carrier available: {0}")]
    CarrierUnavailable(#[source] std::io::Error),
    #[error("copy command reported failure")]
    CommandFailed,
    #[error("copy carrier I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The two clipboard tiers a [`super::CopyController`] tries in order.
pub trait ClipboardBackend {
    /// Preferred, asynchronous clipboard write.
    fn write_primary(&mut self, text: &str) -> impl Future<Output = Result<(), ClipboardError>>;

    /// Synchronous legacy write, tried only when the primary write fails.
    fn write_fallback(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Process clipboard: `arboard` first, then a platform copy command.
#[derive(Debug, Clone)]
pub struct SystemClipboard {
    fallback: CommandHost,
}

impl SystemClipboard {
    pub fn with_fallback_command(fallback: CommandHost) -> Self {
        Self { fallback }
    }

    pub fn fallback_command(&self) -> &CommandHost {
        &self.fallback
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::with_fallback_command(CommandHost::detect())
    }
}

impl ClipboardBackend for SystemClipboard {
    async fn write_primary(&mut self, text: &str) -> Result<(), ClipboardError> {
        let text = text.to_string();
        // arboard blocks on the display server; keep it off the runtime threads.
        tokio::task::spawn_blocking(move || {
            arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text))
        })
        .await??;
        Ok(())
    }

    fn write_fallback(&mut self, text: &str) -> Result<(), ClipboardError> {
        legacy_copy(&mut self.fallback, text)
    }
}
