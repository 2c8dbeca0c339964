//! # Narrative Memory
//!
//! The memory engine behind an AI game master. This crate sits on top of
//! `campaign_state`, decides which pieces of a campaign are worth reminding the
//! model of on each turn, and turns the model's inline markup back into state
//! changes.
//!
//! ## Core Components
//!
//! - **tag_index**: Finds the tags a message refers to and throttles how often each resurfaces
//! - **context_composer**: Builds the bounded campaign digest injected into the prompt
//! - **directives**: Parses `[SAVE:...]` / `[UPDATE:PNJ|...]` markup out of model output
//! - **tracker**: Counts which entities keep coming up in play
//! - **session**: Sessions and the registry holding the current one
//! - **engine**: Runs a full turn against a [`LanguageModel`]
//!
//! ## Collaborators
//!
//! Persistence, the language model and the clock are injected through the
//! traits in [`ports`]. Two stores ship with the crate: an in-memory one and a
//! JSON file.

pub mod config;
pub mod context_composer;
pub mod directives;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod ports;
pub mod session;
pub mod tag_index;
pub mod telemetry;
pub mod tracker;

pub use config::*;
pub use context_composer::*;
pub use directives::*;
pub use engine::*;
pub use error::*;
pub use persistence::*;
pub use ports::*;
pub use session::*;
pub use tag_index::*;
pub use tracker::*;
