/// Text units and the skeletons they are written back through.
use std::collections::HashMap;

use super::fragment::TextFragment;
use super::writer::BlockTextUnitWriter;
use crate::ooxml::chunk::{Block, Chunk, RunContainer, find_ref_marker};
use crate::ooxml::clarification::{ClarificationContext, RunPropertiesClarification};
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::Result;
use crate::ooxml::event::{EndElement, StartElement, XmlEvent};
use crate::ooxml::markup::Markup;
use crate::ooxml::properties::RunProperties;

/// What a code stands for when the coded text is written back.
#[derive(Debug, Clone)]
pub enum CodeContent {
    /// The formatting an opening code starts
    RunProperties(RunProperties),
    RunContainer(RunContainer),
    /// Markup inside a run, written without closing the run
    RunMarkup(Markup),
    /// A chunk written in place
    Chunk(Chunk),
}

impl CodeContent {
    pub fn events(&self) -> Vec<XmlEvent> {
        match self {
            CodeContent::RunProperties(properties) => properties.events(),
            CodeContent::RunContainer(container) => container.events(),
            CodeContent::RunMarkup(markup) => markup.events(),
            CodeContent::Chunk(chunk) => chunk.events(),
        }
    }
}

/// The block a text unit was mapped from, with the code contents needed
/// to write a coded text back.
#[derive(Debug, Clone)]
pub struct BlockSkeleton {
    block: Block,
    base_run_properties: RunProperties,
    hidden_codes: Vec<CodeContent>,
    visible_codes: HashMap<usize, CodeContent>,
}

impl BlockSkeleton {
    pub fn new(
        block: Block,
        base_run_properties: RunProperties,
        hidden_codes: Vec<CodeContent>,
        visible_codes: HashMap<usize, CodeContent>,
    ) -> Self {
        Self {
            block,
            base_run_properties,
            hidden_codes,
            visible_codes,
        }
    }

    #[inline]
    pub fn block(&self) -> &Block {
        &self.block
    }

    /// The properties of text outside any code.
    #[inline]
    pub fn base_run_properties(&self) -> &RunProperties {
        &self.base_run_properties
    }

    /// Text-less runs preceding the first text, written ahead of it.
    #[inline]
    pub fn hidden_codes(&self) -> &[CodeContent] {
        &self.hidden_codes
    }

    #[inline]
    pub fn visible_code(&self, id: usize) -> Option<&CodeContent> {
        self.visible_codes.get(&id)
    }
}

#[derive(Debug, Clone)]
pub enum UnitSkeleton {
    Block(BlockSkeleton),
    /// A plain shared string: the text replaces the content of a single
    /// text element.
    Plain {
        before: Vec<XmlEvent>,
        text_start: StartElement,
        text_end: EndElement,
        after: Vec<XmlEvent>,
    },
}

/// A translatable unit: a source fragment and the means to write a
/// translated one back.
///
/// Referent units hold text referenced from another unit's markup by a
/// reference marker carrying their id.
#[derive(Debug, Clone)]
pub struct TextUnit {
    id: String,
    name: Option<String>,
    source: TextFragment,
    referent: bool,
    references: usize,
    skeleton: Option<UnitSkeleton>,
}

impl TextUnit {
    pub fn new(id: impl Into<String>, source: TextFragment) -> Self {
        Self {
            id: id.into(),
            name: None,
            source,
            referent: false,
            references: 0,
            skeleton: None,
        }
    }

    #[inline]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn with_referent(mut self, referent: bool) -> Self {
        self.referent = referent;
        self
    }

    #[inline]
    pub fn with_references(mut self, references: usize) -> Self {
        self.references = references;
        self
    }

    #[inline]
    pub fn with_skeleton(mut self, skeleton: UnitSkeleton) -> Self {
        self.skeleton = Some(skeleton);
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The `sheet!cell` reference of a shared string unit.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    pub fn source(&self) -> &TextFragment {
        &self.source
    }

    #[inline]
    pub fn is_referent(&self) -> bool {
        self.referent
    }

    /// The number of reference markers in this unit's own markup.
    #[inline]
    pub fn references(&self) -> usize {
        self.references
    }

    #[inline]
    pub fn skeleton(&self) -> Option<&UnitSkeleton> {
        self.skeleton.as_ref()
    }

    pub(crate) fn set_referent(&mut self, referent: bool) {
        self.referent = referent;
    }

    /// Write `target` in place of the source text.
    ///
    /// Units without a skeleton (translatable attribute values) yield
    /// their text alone.
    pub fn write(&self, target: &TextFragment, options: &FilterOptions) -> Result<Vec<XmlEvent>> {
        self.write_with(target, options, None)
    }

    /// Write `target`, clarifying every written run's properties.
    pub fn write_clarified(
        &self,
        target: &TextFragment,
        options: &FilterOptions,
        clarification: &RunPropertiesClarification,
        context: &mut ClarificationContext,
    ) -> Result<Vec<XmlEvent>> {
        self.write_with(target, options, Some((clarification, context)))
    }

    fn write_with(
        &self,
        target: &TextFragment,
        options: &FilterOptions,
        clarification: Option<(&RunPropertiesClarification, &mut ClarificationContext)>,
    ) -> Result<Vec<XmlEvent>> {
        match &self.skeleton {
            Some(UnitSkeleton::Block(skeleton)) => {
                let mut writer = BlockTextUnitWriter::new(options, skeleton);
                if let Some((clarification, context)) = clarification {
                    writer = writer.with_run_properties_clarification(clarification, context);
                }
                writer.write_block(target)
            },
            Some(UnitSkeleton::Plain {
                before,
                text_start,
                text_end,
                after,
            }) => {
                let mut events = before.clone();
                events.push(XmlEvent::StartElement(text_start.clone()));
                let text = target.text();
                if !text.is_empty() {
                    events.push(XmlEvent::characters(text));
                }
                events.push(XmlEvent::EndElement(text_end.clone()));
                events.extend(after.iter().cloned());
                Ok(events)
            },
            None => Ok(vec![XmlEvent::characters(target.text())]),
        }
    }
}

/// Replace reference markers with the written content of their referents.
///
/// Markers in character data are replaced by the referent events; markers
/// in attribute values by the referent text. Unknown markers stay.
pub fn resolve_references(events: Vec<XmlEvent>, referents: &HashMap<String, Vec<XmlEvent>>) -> Vec<XmlEvent> {
    let mut resolved = Vec::with_capacity(events.len());
    for event in events {
        match event {
            XmlEvent::Characters(text) => resolve_characters(&text, referents, &mut resolved),
            XmlEvent::StartElement(mut start) => {
                for attribute in start.attributes.iter_mut() {
                    attribute.value = resolve_attribute_value(&attribute.value, referents);
                }
                resolved.push(XmlEvent::StartElement(start));
            },
            event => resolved.push(event),
        }
    }
    resolved
}

fn resolve_characters(text: &str, referents: &HashMap<String, Vec<XmlEvent>>, out: &mut Vec<XmlEvent>) {
    let mut rest = text;
    let mut pending = String::new();
    while let Some((id, range)) = find_ref_marker(rest) {
        match referents.get(id) {
            Some(events) => {
                pending.push_str(&rest[..range.start]);
                if !pending.is_empty() {
                    out.push(XmlEvent::characters(std::mem::take(&mut pending)));
                }
                out.extend(events.iter().cloned());
            },
            None => pending.push_str(&rest[..range.end]),
        }
        rest = &rest[range.end..];
    }
    pending.push_str(rest);
    if !pending.is_empty() {
        out.push(XmlEvent::characters(pending));
    }
}

fn resolve_attribute_value(value: &str, referents: &HashMap<String, Vec<XmlEvent>>) -> String {
    let mut resolved = String::with_capacity(value.len());
    let mut rest = value;
    while let Some((id, range)) = find_ref_marker(rest) {
        match referents.get(id) {
            Some(events) => {
                resolved.push_str(&rest[..range.start]);
                for event in events {
                    if let XmlEvent::Characters(text) = event {
                        resolved.push_str(text);
                    }
                }
            },
            None => resolved.push_str(&rest[..range.end]),
        }
        rest = &rest[range.end..];
    }
    resolved.push_str(rest);
    resolved
}
