/// Runs and their builder.
use super::{NestedTextual, Text};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{DRAWING_ML, LOCAL_PRESERVE, LOCAL_SPACE, LOCAL_TEXT, xml};
use crate::ooxml::event::{EndElement, QName, StartElement, XmlEvent};
use crate::ooxml::markup::{Markup, MarkupBuilder, MarkupComponent};
use crate::ooxml::properties::{ParagraphBlockProperties, RunProperties, RunProperty};
use crate::ooxml::styles::SharedStyles;
use std::collections::VecDeque;

const RUN_PROPERTIES: &str = "rPr";

/// A piece of run content.
#[derive(Debug, Clone, PartialEq)]
pub enum RunBodyChunk {
    Text(Text),
    Markup(Markup),
}

impl RunBodyChunk {
    pub fn events(&self) -> Vec<XmlEvent> {
        match self {
            RunBodyChunk::Text(text) => text.events(),
            RunBodyChunk::Markup(markup) => markup.events(),
        }
    }
}

/// A run: one formatting declaration over a span of content.
#[derive(Debug, Clone)]
pub struct Run {
    start: StartElement,
    end: EndElement,
    properties: RunProperties,
    combined: RunProperties,
    body: Vec<RunBodyChunk>,
    nested: Vec<NestedTextual>,
    hidden: bool,
}

impl Run {
    #[inline]
    pub fn start(&self) -> &StartElement {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &EndElement {
        &self.end
    }

    /// The direct run properties.
    #[inline]
    pub fn properties(&self) -> &RunProperties {
        &self.properties
    }

    /// The run properties with the style cascade applied.
    #[inline]
    pub fn combined_properties(&self) -> &RunProperties {
        &self.combined
    }

    #[inline]
    pub fn body_chunks(&self) -> &[RunBodyChunk] {
        &self.body
    }

    #[inline]
    pub fn nested_textual_items(&self) -> &[NestedTextual] {
        &self.nested
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Remove the properties hoisted into a paragraph style.
    pub fn refine_run_properties(&mut self, common: &[RunProperty]) {
        for property in common {
            self.properties.remove(property);
        }
    }

    pub fn contains_visible_text(&self) -> bool {
        !self.hidden && self.body.iter().any(|c| matches!(c, RunBodyChunk::Text(_)))
    }

    /// Whether the leading markup holds paragraph properties of a nested
    /// paragraph end.
    pub fn contains_paragraph_block_properties(&self) -> bool {
        matches!(
            self.body.first(),
            Some(RunBodyChunk::Markup(markup)) if markup.paragraph_block_properties().is_some()
        )
    }

    /// Replace the leading paragraph properties; `None` removes them.
    pub fn refine_paragraph_block_properties(&mut self, properties: Option<ParagraphBlockProperties>) -> Result<()> {
        match self.body.first_mut() {
            Some(RunBodyChunk::Markup(markup)) => markup.replace_paragraph_block_properties(properties),
            _ => Err(OoxmlError::illegal_state("The run markup is absent")),
        }
    }

    pub fn events(&self) -> Vec<XmlEvent> {
        let mut events = vec![XmlEvent::StartElement(self.start.clone())];
        events.extend(self.properties.events());
        for chunk in &self.body {
            events.extend(chunk.events());
        }
        events.push(XmlEvent::EndElement(self.end.clone()));
        events
    }
}

/// Accumulates a run while it is parsed and while adjacent runs are merged
/// into it.
#[derive(Debug)]
pub struct RunBuilder {
    start: StartElement,
    end: Option<EndElement>,
    styles: SharedStyles,
    properties: RunProperties,
    combined: Option<RunProperties>,
    body: Vec<RunBodyChunk>,
    nested: Vec<NestedTextual>,
    hidden: bool,
    text_name: Option<QName>,
    run_style: Option<String>,
    contains_nested_items: bool,
    contains_complex_fields: bool,
    text_preserving_whitespace: bool,
    non_whitespace_text: bool,
    text: Option<String>,
    markup: MarkupBuilder,
    deferred: VecDeque<XmlEvent>,
}

impl RunBuilder {
    pub fn new(start: StartElement, styles: SharedStyles) -> Self {
        let properties = RunProperties::empty(start.name.sibling(RUN_PROPERTIES));
        Self {
            start,
            end: None,
            styles,
            properties,
            combined: None,
            body: Vec::new(),
            nested: Vec::new(),
            hidden: false,
            text_name: None,
            run_style: None,
            contains_nested_items: false,
            contains_complex_fields: false,
            text_preserving_whitespace: false,
            non_whitespace_text: false,
            text: None,
            markup: MarkupBuilder::default(),
            deferred: VecDeque::new(),
        }
    }

    #[inline]
    pub fn start(&self) -> &StartElement {
        &self.start
    }

    #[inline]
    pub fn set_end(&mut self, end: EndElement) {
        self.end = Some(end);
    }

    #[inline]
    pub fn styles(&self) -> &SharedStyles {
        &self.styles
    }

    #[inline]
    pub fn properties(&self) -> &RunProperties {
        &self.properties
    }

    #[inline]
    pub fn set_properties(&mut self, properties: RunProperties) {
        self.properties = properties;
    }

    /// The cascade-resolved properties, computed on first use.
    pub fn combined_properties(&mut self, paragraph_style: Option<&str>) -> &RunProperties {
        if self.combined.is_none() {
            self.reset_combined_properties(paragraph_style);
        }
        self.combined.as_ref().unwrap_or(&self.properties)
    }

    pub fn reset_combined_properties(&mut self, paragraph_style: Option<&str>) {
        let combined = self
            .styles
            .read()
            .combined_run_properties(paragraph_style, self.run_style.as_deref(), &self.properties);
        self.combined = Some(combined);
    }

    #[inline]
    pub fn body_chunks(&self) -> &[RunBodyChunk] {
        &self.body
    }

    #[inline]
    pub fn body_chunks_mut(&mut self) -> &mut Vec<RunBodyChunk> {
        &mut self.body
    }

    #[inline]
    pub fn nested_textual_items(&self) -> &[NestedTextual] {
        &self.nested
    }

    #[inline]
    pub fn add_nested_textual_item(&mut self, item: NestedTextual) {
        self.contains_nested_items = true;
        self.nested.push(item);
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    #[inline]
    pub fn text_name(&self) -> Option<&QName> {
        self.text_name.as_ref()
    }

    #[inline]
    pub fn set_run_style(&mut self, run_style: Option<String>) {
        self.run_style = run_style;
    }

    #[inline]
    pub fn contains_nested_items(&self) -> bool {
        self.contains_nested_items
    }

    #[inline]
    pub fn set_contains_nested_items(&mut self, contains: bool) {
        self.contains_nested_items = contains;
    }

    #[inline]
    pub fn contains_complex_fields(&self) -> bool {
        self.contains_complex_fields
    }

    #[inline]
    pub fn set_contains_complex_fields(&mut self, contains: bool) {
        self.contains_complex_fields = contains;
    }

    #[inline]
    pub fn is_text_preserving_whitespace(&self) -> bool {
        self.text_preserving_whitespace
    }

    #[inline]
    pub fn set_text_preserving_whitespace(&mut self, preserving: bool) {
        self.text_preserving_whitespace = preserving;
    }

    #[inline]
    pub fn has_non_whitespace_text(&self) -> bool {
        self.non_whitespace_text
    }

    #[inline]
    pub fn set_non_whitespace_text(&mut self, non_whitespace: bool) {
        self.non_whitespace_text = non_whitespace;
    }

    /// Whether the markup most recently added asks for whitespace to be
    /// preserved.
    pub fn preserving_whitespace(&self) -> bool {
        matches!(self.markup.last_event(), Some(XmlEvent::StartElement(s)) if s.preserves_space())
    }

    /// Buffer text read from the text element `start`.
    pub fn add_text(&mut self, text: &str, start: &StartElement) {
        self.text.get_or_insert_with(String::new).push_str(text);
        if self.text_name.is_none() {
            self.text_name = Some(start.name.sibling(LOCAL_TEXT));
        }
    }

    /// Append to the first text of the run body.
    pub fn add_to_first_run_text(&mut self, text: &str) -> Result<()> {
        let first = self.body.iter_mut().find_map(|c| match c {
            RunBodyChunk::Text(t) => Some(t),
            RunBodyChunk::Markup(_) => None,
        });
        match first {
            Some(run_text) => {
                run_text.push_str(text);
                Ok(())
            },
            None => Err(OoxmlError::illegal_state("The run text is absent")),
        }
    }

    /// Turn the buffered text into a text chunk.
    pub fn flush_text(&mut self) {
        let Some(text) = self.text.take() else {
            return;
        };
        let Some(name) = self.text_name.clone() else {
            return;
        };
        let mut start = StartElement::new(name.clone());
        // DrawingML text elements carry no xml:space
        if self.text_preserving_whitespace && !name.is_in(DRAWING_ML) {
            start = start.with_attribute(xml(LOCAL_SPACE), LOCAL_PRESERVE);
        }
        self.body
            .push(RunBodyChunk::Text(Text::new(start, text, EndElement::new(name))));
    }

    #[inline]
    pub fn add_to_markup(&mut self, event: XmlEvent) {
        self.markup.add_event(event);
    }

    #[inline]
    pub fn add_component_to_markup(&mut self, component: MarkupComponent) {
        self.markup.add_component(component);
    }

    pub fn flush_markup(&mut self) {
        if !self.markup.is_empty() {
            let markup = self.markup.build();
            self.body.push(RunBodyChunk::Markup(markup));
        }
    }

    /// Whether the run carries the paragraph properties of a paragraph
    /// whose mark was deleted.
    pub fn contains_mergeable_markup(&self) -> bool {
        self.body
            .iter()
            .filter_map(|c| match c {
                RunBodyChunk::Markup(markup) => Some(markup),
                RunBodyChunk::Text(_) => None,
            })
            .flat_map(Markup::components)
            .any(|c| {
                matches!(c, MarkupComponent::ParagraphBlockProperties(p) if p.contains_run_property_deleted_paragraph_mark())
            })
    }

    #[inline]
    pub fn add_deferred_events(&mut self, events: impl IntoIterator<Item = XmlEvent>) {
        self.deferred.extend(events);
    }

    /// Events read past the end of the run that belong to the enclosing
    /// block.
    #[inline]
    pub fn deferred_events_mut(&mut self) -> &mut VecDeque<XmlEvent> {
        &mut self.deferred
    }

    pub fn build(self) -> Result<Run> {
        let end = self
            .end
            .ok_or_else(|| OoxmlError::illegal_state(format!("The run {} is not ended", self.start.name)))?;
        let combined = match self.combined {
            Some(combined) => combined,
            None => self.properties.clone(),
        };
        Ok(Run {
            start: self.start,
            end,
            properties: self.properties,
            combined,
            body: self.body,
            nested: self.nested,
            hidden: self.hidden,
        })
    }
}
