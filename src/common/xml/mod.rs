//! XML text helpers shared by the markup reader and writer.

mod escape;

pub use escape::{escape_attribute, escape_text, resolve_reference, unescape_xml};
