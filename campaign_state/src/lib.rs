//! # Campaign State
//!
//! The structured narrative record behind one play session: chapters,
//! important NPCs, locations, key events, curated tags and the NPC emotion
//! codec. This crate owns every invariant on that record and contains no I/O
//! and no prompt logic.
//!
//! ## Core Components
//!
//! - **emotion**: six-axis emotion vector and its compact `C50-A30-...` code
//! - **entities**: chapters, NPCs, locations, key events and their typed field updates
//! - **campaign**: the campaign record and all mutating operations (the campaign store)
//! - **tags**: cleaned, ordered, duplicate-free tag collections

pub mod campaign;
pub mod emotion;
pub mod entities;
pub mod tags;

pub use campaign::*;
pub use emotion::*;
pub use entities::*;
pub use tags::*;
