//! Style sheets and the run/paragraph property cascade.
//!
//! A [`StyleDefinitions`] value is built once per part scope (the Word
//! `styles.xml`, a DrawingML list style, a slide master's text styles) and
//! then consulted while parsing dependent parts. It resolves the effective
//! properties of a paragraph or a run by walking the cascade from the
//! document defaults through the named styles down to direct formatting.

mod powerpoint;
mod text;
mod word;

pub use powerpoint::{ParagraphLevelStyle, PowerpointStyleDefinitions};
pub use text::TextStyleDefinitions;
pub use word::{StyleType, WordStyle, WordStyleDefinitions};

use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::{EventReader, StartElement};
use crate::ooxml::markup::Markup;
use crate::ooxml::properties::{ParagraphBlockProperties, RunProperties};
use parking_lot::RwLock;
use std::sync::Arc;

/// Style definitions shared between the parsed paragraphs of a part.
///
/// Style optimisation places new styles while the part is processed, so
/// the definitions sit behind a lock.
pub type SharedStyles = Arc<RwLock<StyleDefinitions>>;

/// The style sheet in effect for a part.
#[derive(Debug, Clone, Default)]
pub enum StyleDefinitions {
    /// No style sheet: every property resolves to itself.
    #[default]
    Empty,
    Word(WordStyleDefinitions),
    Powerpoint(PowerpointStyleDefinitions),
}

impl StyleDefinitions {
    /// Wrap for sharing.
    pub fn shared(self) -> SharedStyles {
        Arc::new(RwLock::new(self))
    }

    /// Read a WordprocessingML `styles.xml` part.
    pub fn read_word(reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        WordStyleDefinitions::read(reader, options).map(StyleDefinitions::Word)
    }

    /// Read a DrawingML list style whose start element has just been read.
    pub fn read_powerpoint(start: StartElement, reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        PowerpointStyleDefinitions::read(start, reader, options).map(StyleDefinitions::Powerpoint)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, StyleDefinitions::Empty)
    }

    /// Paragraph properties with the cascade applied.
    pub fn combined_paragraph_block_properties(&self, properties: &ParagraphBlockProperties) -> ParagraphBlockProperties {
        match self {
            StyleDefinitions::Empty => properties.clone(),
            StyleDefinitions::Word(word) => word.combined_paragraph_block_properties(properties),
            StyleDefinitions::Powerpoint(powerpoint) => powerpoint.combined_paragraph_block_properties(properties),
        }
    }

    /// Run properties with the cascade applied.
    ///
    /// `paragraph_style` is the Word paragraph style id or the DrawingML
    /// paragraph level; `run_style` is only meaningful in Word.
    pub fn combined_run_properties(
        &self,
        paragraph_style: Option<&str>,
        run_style: Option<&str>,
        properties: &RunProperties,
    ) -> RunProperties {
        match self {
            StyleDefinitions::Empty => properties.clone(),
            StyleDefinitions::Word(word) => word.combined_run_properties(paragraph_style, run_style, properties),
            StyleDefinitions::Powerpoint(powerpoint) => powerpoint.combined_run_properties(paragraph_style, properties),
        }
    }

    /// Combine with a more specific style sheet.
    ///
    /// Merging with [`StyleDefinitions::Empty`] on either side yields the
    /// other operand. Word style sheets unite their styles by id and
    /// DrawingML list styles merge level by level, `other` winning in both;
    /// sheets of different kinds are rejected.
    pub fn merged_with(&self, other: &StyleDefinitions) -> Result<StyleDefinitions> {
        match (self, other) {
            (_, StyleDefinitions::Empty) => Ok(self.clone()),
            (StyleDefinitions::Empty, _) => Ok(other.clone()),
            (StyleDefinitions::Powerpoint(a), StyleDefinitions::Powerpoint(b)) => {
                a.merged_with(b).map(StyleDefinitions::Powerpoint)
            },
            (StyleDefinitions::Word(a), StyleDefinitions::Word(b)) => a.merged_with(b).map(StyleDefinitions::Word),
            _ => Err(OoxmlError::InvalidArgument(
                "Style definitions of different kinds can not be merged".to_string(),
            )),
        }
    }

    /// Find or create a paragraph style carrying `paragraph` and `run`
    /// properties, based on `parent`. The chosen id is then available
    /// through [`StyleDefinitions::placed_id`].
    ///
    /// Only Word style sheets hold placed styles.
    pub fn place(&mut self, parent: Option<&str>, paragraph: &ParagraphBlockProperties, run: &RunProperties) {
        if let StyleDefinitions::Word(word) = self {
            word.place(parent, paragraph, run);
        }
    }

    pub fn placed_id(&self) -> Option<&str> {
        match self {
            StyleDefinitions::Word(word) => word.placed_id(),
            _ => None,
        }
    }

    /// The markup of the style sheet.
    pub fn to_markup(&self) -> Markup {
        match self {
            StyleDefinitions::Empty => Markup::default(),
            StyleDefinitions::Word(word) => word.to_markup(),
            StyleDefinitions::Powerpoint(powerpoint) => powerpoint.to_markup(),
        }
    }
}
