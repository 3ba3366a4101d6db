//! Single-pass parsers building chunks from an event stream.
//!
//! Every parser is entered right after the start element of the construct
//! it parses has been taken from the [`EventReader`](crate::ooxml::event::EventReader)
//! and consumes events up to and including the matching end element.

mod block;
mod markup;
mod run;
mod run_merger;
mod run_properties;
mod string_item;

pub use block::BlockParser;
pub use markup::{parse_block_properties, parse_empty_element, parse_paragraph_block_properties};
pub use run::RunParser;
pub use run_merger::RunMerger;
pub use run_properties::parse_run_properties;
pub use string_item::StringItemParser;

use crate::ooxml::config::FilterOptions;
use crate::ooxml::event::names::{DRAWING_ML, LOCAL_PARAGRAPH, WORDPROCESSING_ML, dml, wpml};
use crate::ooxml::event::{QName, XmlEvent};
use crate::ooxml::policy::SkippableElements;

const PARAGRAPH_PROPERTIES: &str = "pPr";

pub(crate) fn is_paragraph_name(name: &QName) -> bool {
    name.local == LOCAL_PARAGRAPH && (name.is_in(WORDPROCESSING_ML) || name.is_in(DRAWING_ML))
}

pub(crate) fn is_paragraph_properties_name(name: &QName) -> bool {
    name.local == PARAGRAPH_PROPERTIES
}

pub(crate) fn is_paragraph_end(event: &XmlEvent) -> bool {
    event.as_end_element().is_some_and(|e| is_paragraph_name(&e.name))
}

/// Paragraph properties met inside runs keep their proofing marks.
pub(crate) fn nested_block_properties_skippable(options: &FilterOptions) -> SkippableElements {
    SkippableElements::revision_property(
        vec![
            dml("rtl"),
            wpml("lang"),
            wpml("ins"),
            wpml("moveTo"),
            wpml("moveFrom"),
            wpml("pPrChange"),
            wpml("rPrChange"),
        ],
        options,
    )
}
