//! Text direction clarification.
//!
//! When a document is translated between languages written in opposite
//! directions, paragraph, table, run and view markup must state the target
//! direction explicitly. A [`MarkupClarification`] walks a markup component
//! sequence once; at each recognized structure it resolves the cascade
//! through the styles in effect and rewrites the direction attributes or
//! elements. The pass threads a [`ClarificationContext`] explicitly, so the
//! paragraph being clarified is the one run properties resolve against.

mod attributes;
mod context;
mod elements;
mod markup;

pub use attributes::{AttributesClarification, ClarifiableAttribute};
pub use context::ClarificationContext;
pub use elements::{CombinedSource, ElementsClarification};
pub use markup::{
    BlockPropertiesClarification, MarkupClarification, MarkupComponentClarification, RunPropertiesClarification,
    StylesClarification,
};

/// The right-to-left value written for boolean attributes and elements.
const TRUE_VALUE: &str = "1";
const FALSE_VALUE: &str = "0";
const TRUE_VALUES: &[&str] = &["1", "true", "on"];
