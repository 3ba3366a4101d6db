//! The chunk model.
//!
//! Parsing a block-level construct (a paragraph, a text body paragraph, a
//! shared string item) yields a tree of chunks. Each chunk re-emits the
//! events it was built from through `events()`, so an unmodified tree
//! serializes back to its source markup.

mod block;
mod container;
mod run;
mod string_item;
mod text;

pub use block::{Block, BlockBuilder};
pub use container::{RunContainer, RunContainerBuilder, RunContainerKind};
pub use run::{Run, RunBodyChunk, RunBuilder};
pub use string_item::{StringItem, StringItemBuilder};
pub use text::Text;

use crate::ooxml::event::XmlEvent;
use crate::ooxml::markup::Markup;

/// A self-contained piece of a parsed block.
#[derive(Debug, Clone)]
pub enum Chunk {
    /// Non-textual block markup
    Markup(Markup),
    Run(Run),
    RunContainer(RunContainer),
    /// A nested block kept as is
    Block(Box<Block>),
    /// Plain text of a shared string item
    Text(Text),
}

impl Chunk {
    pub fn events(&self) -> Vec<XmlEvent> {
        match self {
            Chunk::Markup(markup) => markup.events(),
            Chunk::Run(run) => run.events(),
            Chunk::RunContainer(container) => container.events(),
            Chunk::Block(block) => block.events(),
            Chunk::Text(text) => text.events(),
        }
    }

    #[inline]
    pub fn as_run(&self) -> Option<&Run> {
        match self {
            Chunk::Run(run) => Some(run),
            _ => None,
        }
    }

    #[inline]
    pub fn as_markup(&self) -> Option<&Markup> {
        match self {
            Chunk::Markup(markup) => Some(markup),
            _ => None,
        }
    }

    #[inline]
    pub fn as_markup_mut(&mut self) -> Option<&mut Markup> {
        match self {
            Chunk::Markup(markup) => Some(markup),
            _ => None,
        }
    }
}

impl From<Run> for Chunk {
    fn from(run: Run) -> Self {
        Chunk::Run(run)
    }
}

impl From<RunContainer> for Chunk {
    fn from(container: RunContainer) -> Self {
        Chunk::RunContainer(container)
    }
}

impl From<Block> for Chunk {
    fn from(block: Block) -> Self {
        Chunk::Block(Box::new(block))
    }
}

/// An attribute value extracted for translation (`wp:docPr/@name`,
/// `v:textpath/@string`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatableAttributeText {
    text: String,
}

impl TranslatableAttributeText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Translatable content living inside a run.
#[derive(Debug, Clone)]
pub enum Textual {
    /// A paragraph nested in a run (a text box)
    Block(Block),
    Attribute(TranslatableAttributeText),
}

/// A nested textual item together with the id its reference marker
/// carries in the enclosing markup.
#[derive(Debug, Clone)]
pub struct NestedTextual {
    pub id: String,
    pub item: Textual,
}

/// Allocates ids for the reference markers of nested textual items.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: usize,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_id(&mut self) -> String {
        self.last += 1;
        self.last.to_string()
    }
}

const REF_MARKER_START: &str = "[#$";
const REF_MARKER_END: &str = "]";

/// The marker standing in for a nested textual item.
pub fn ref_marker(id: &str) -> String {
    format!("{REF_MARKER_START}{id}{REF_MARKER_END}")
}

/// The id of the first reference marker in `text`, with its byte range.
pub fn find_ref_marker(text: &str) -> Option<(&str, std::ops::Range<usize>)> {
    let start = text.find(REF_MARKER_START)?;
    let id_start = start + REF_MARKER_START.len();
    let length = text[id_start..].find(REF_MARKER_END)?;
    let end = id_start + length + REF_MARKER_END.len();
    Some((&text[id_start..id_start + length], start..end))
}
