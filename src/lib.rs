//! # chatdoc
//!
//! Renders model-generated markdown (with LaTeX-style math, fenced code and
//! links of unknown trust) into a safe document, and offers a copy-raw-text
//! control with a tiered clipboard fallback.
//!
//! ## Pipeline
//! - [`normalize`]: delimiter and fence normalization before parsing
//! - [`parse`]: markdown event stream folded into a [`document::Document`]
//! - [`stages`]: post-parse stages (math typesetting, word splitting)
//! - [`render`]: the facade tying it together with link/image overrides
//! - [`copy`]: the copy controller state machine

pub mod app;
pub mod config;
pub mod copy;
pub mod document;
pub mod normalize;
pub mod parse;
pub mod render;
pub mod stages;

pub use copy::{ClipboardBackend, ClipboardError, CopyController, CopyState, SystemClipboard};
pub use document::{Document, Element, Node};
pub use normalize::{normalize, normalize_str};
pub use render::{Overrides, RenderOptions, Rendered, Renderer};
pub use stages::{Stage, StagePipeline, compose_stages};
