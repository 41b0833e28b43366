//! Copy-raw-text control.
//!
//! A [`CopyController`] holds the exact content it was created with and copies
//! it through two tiers: the backend's primary (async) write, then its legacy
//! fallback. Success shows a glyph for a fixed window; a second success inside
//! the window re-arms it. Total failure is logged and leaves the state alone.

mod backend;
mod carrier;

pub use backend::{ClipboardBackend, ClipboardError, SystemClipboard};
pub use carrier::{
    COPY_COMMAND_ENV, CarrierHost, CommandCarrier, CommandHost, TextCarrier, legacy_copy,
};

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::document::{Element, Node};

/// How long the success glyph stays up by default.
pub const DEFAULT_ACK_WINDOW: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
}

impl CopyState {
    pub fn as_str(self) -> &'static str {
        match self {
            CopyState::Idle => "idle",
            CopyState::Copied => "copied",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            CopyState::Idle => "⧉",
            CopyState::Copied => "✓",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CopyState::Idle => "Copy",
            CopyState::Copied => "Copied!",
        }
    }
}

/// Copies one fixed piece of content and tracks the acknowledgement window.
#[derive(Debug)]
pub struct CopyController<B> {
    text: String,
    backend: B,
    ack_window: Duration,
    /// Single re-armable deadline; `Copied` while it lies in the future.
    reset_at: Option<Instant>,
}

impl<B: ClipboardBackend> CopyController<B> {
    pub fn new(text: impl Into<String>, backend: B) -> Self {
        Self {
            text: text.into(),
            backend,
            ack_window: DEFAULT_ACK_WINDOW,
            reset_at: None,
        }
    }

    #[must_use]
    pub fn with_ack_window(mut self, window: Duration) -> Self {
        self.ack_window = window;
        self
    }

    /// The content this controller copies, exactly as it was supplied.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn state(&self) -> CopyState {
        match self.reset_at {
            Some(deadline) if Instant::now() < deadline => CopyState::Copied,
            _ => CopyState::Idle,
        }
    }

    /// When the current acknowledgement ends, if one is showing.
    pub fn reset_at(&self) -> Option<Instant> {
        self.reset_at.filter(|deadline| Instant::now() < *deadline)
    }

    /// Drop any pending acknowledgement, e.g. when the view goes away.
    pub fn reset(&mut self) {
        self.reset_at = None;
    }

    /// Copy the content. Returns the state right after the attempt.
    ///
    /// Never fails: when both tiers fail the errors are logged and the
    /// state is left as it was.
    pub async fn copy(&mut self) -> CopyState {
        match self.backend.write_primary(&self.text).await {
            Ok(()) => self.acknowledge(),
            Err(primary) => {
                log::debug!("primary clipboard write failed: {}", primary);
                match self.backend.write_fallback(&self.text) {
                    Ok(()) => self.acknowledge(),
                    Err(fallback) => {
                        log::warn!("Copy failed: {} (fallback: {})", primary, fallback)
                    }
                }
            }
        }
        self.state()
    }

    fn acknowledge(&mut self) {
        self.reset_at = Some(Instant::now() + self.ack_window);
    }

    /// Glyph for the current state.
    pub fn glyph(&self) -> &'static str {
        self.state().glyph()
    }

    /// The copy button element for the current state.
    pub fn affordance(&self) -> Element {
        let state = self.state();
        Element::new("button")
            .with_attr("type", "button")
            .with_attr("class", "copy-button")
            .with_attr("data-state", state.as_str())
            .with_attr("aria-label", state.label())
            .with_child(Node::text(state.glyph()))
    }
}
