//! Policies deciding which markup the parsers drop.
//!
//! [`SkippableElements`] rules remove whole elements (or only the tags of
//! tracked insertions) from the stream; [`StrippableAttributes`] remove
//! revision and proofing attributes from start elements that are kept.

pub mod skippable;
pub mod strippable;

pub use skippable::{BlockSkippableElements, CrossStructure, RunSkippableElements, SkippableElements, skip_element};
pub use strippable::StrippableAttributes;
