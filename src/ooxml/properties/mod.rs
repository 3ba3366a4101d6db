//! Run and block property model.
//!
//! Run properties are kept as ordered bags of typed [`RunProperty`] values
//! so that they can be compared, combined along a style cascade and written
//! back without losing markup. Block properties keep their children as
//! opaque events, with paragraph properties adding style awareness.

mod block_properties;
mod block_property;
mod paragraph;
mod run_properties;
mod run_property;

pub use block_properties::{
    BODY_PROPERTIES, BlockProperties, SMART_TAG_PROPERTIES, STRUCTURED_DOCUMENT_TAG_END_PROPERTIES,
    STRUCTURED_DOCUMENT_TAG_PROPERTIES, TABLE_CELL_PROPERTIES, TABLE_PROPERTIES, TABLE_ROW_PROPERTIES,
    TABLE_STYLE_PROPERTIES,
};
pub use block_property::BlockProperty;
pub use paragraph::{ParagraphBlockProperties, ParagraphDialect, is_paragraph_properties};
pub use run_properties::RunProperties;
pub use run_property::{AttributeProperty, ElementProperty, RunProperty, WPML_TOGGLE_NAMES};

/// The cascade level a set of properties is combined at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalStage {
    /// Document-wide run defaults
    DocumentDefault,
    /// Along a style's `basedOn` chain
    Horizontal,
    /// Across style kinds (paragraph style under run style)
    Vertical,
    /// Direct formatting
    Direct,
}
