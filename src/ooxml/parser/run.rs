/// Run parsing.
use super::block::BlockParser;
use super::{is_paragraph_end, is_paragraph_name, is_paragraph_properties_name, nested_block_properties_skippable};
use crate::ooxml::chunk::{
    Chunk, IdGenerator, NestedTextual, RunBuilder, Textual, TranslatableAttributeText, ref_marker,
};
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{
    DRAWING_ML, LOCAL_BREAK, LOCAL_DOC_PR, LOCAL_NAME, LOCAL_NO_BREAK_HYPHEN, LOCAL_PAGE, LOCAL_RUN, LOCAL_TAB,
    LOCAL_TEXT, LOCAL_TEXT_PATH, LOCAL_TYPE,
};
use crate::ooxml::event::{EndElement, EventReader, StartElement, XmlEvent};
use crate::ooxml::markup::MarkupComponent;
use crate::ooxml::optimisation::StyleOptimisation;
use crate::ooxml::parser::{parse_paragraph_block_properties, parse_run_properties};
use crate::ooxml::policy::{
    BlockSkippableElements, RunSkippableElements, SkippableElements, StrippableAttributes, skip_element,
};
use crate::ooxml::properties::RunProperties;
use crate::ooxml::styles::{SharedStyles, StyleDefinitions};
use std::collections::VecDeque;

const RUN_PROPERTIES: &str = "rPr";
const FIELD_CHARACTER: &str = "fldChar";
const FIELD_CHARACTER_TYPE: &str = "fldCharType";
const FIELD_INSTRUCTION: &str = "instrText";
const FIELD_BEGIN: &str = "begin";
const FIELD_SEPARATE: &str = "separate";
const FIELD_END: &str = "end";
const TEXT_PATH_STRING: &str = "string";
const REGULAR_HYPHEN: &str = "-";

const INITIAL_FIELD_NESTING_LEVEL: usize = 1;

fn is_field_character(start: &StartElement, kind: &str) -> bool {
    start.name.local == FIELD_CHARACTER && start.attribute_by_local(FIELD_CHARACTER_TYPE) == Some(kind)
}

fn is_run_start(event: &XmlEvent) -> bool {
    event.is_start_named(LOCAL_RUN)
}

fn is_run_end(event: &XmlEvent) -> bool {
    event.is_end_named(LOCAL_RUN)
}

fn is_page_break(start: &StartElement) -> bool {
    start.attribute_by_local(LOCAL_TYPE) == Some(LOCAL_PAGE)
}

fn strip_revision_attributes(event: XmlEvent) -> XmlEvent {
    match event {
        XmlEvent::StartElement(start) if is_paragraph_name(&start.name) => {
            XmlEvent::StartElement(StrippableAttributes::WordParagraphRevisions.strip(&start))
        },
        XmlEvent::StartElement(start) if start.name.local == LOCAL_RUN => {
            XmlEvent::StartElement(StrippableAttributes::WordRunRevisions.strip(&start))
        },
        event => event,
    }
}

/// Parses one run into a [`RunBuilder`].
///
/// A complex field starting in the run is read through its end, so the
/// runs it spans are taken in as markup of this one. Paragraphs nested in
/// the run (text boxes) become nested textual items.
pub struct RunParser<'a> {
    start: StartElement,
    options: &'a FilterOptions,
    ids: &'a mut IdGenerator,
    styles: SharedStyles,
    optimisation: StyleOptimisation,
    paragraph_style: Option<String>,
    builder: RunBuilder,
    drawing_strippable: StrippableAttributes,
    properties_skippable: SkippableElements,
    run_skippable: RunSkippableElements,
    block_skippable: BlockSkippableElements,
    field_nesting_level: usize,
}

impl<'a> RunParser<'a> {
    pub fn new(
        start: &StartElement,
        options: &'a FilterOptions,
        ids: &'a mut IdGenerator,
        styles: SharedStyles,
        optimisation: StyleOptimisation,
        paragraph_style: Option<&str>,
        hidden: bool,
    ) -> Self {
        let start = StrippableAttributes::WordRunRevisions.strip(start);
        let mut builder = RunBuilder::new(start.clone(), styles.clone());
        builder.set_hidden(hidden);
        Self {
            run_skippable: RunSkippableElements::new(&start, options),
            block_skippable: BlockSkippableElements::new(&start, options),
            drawing_strippable: StrippableAttributes::drawing_run_properties(options),
            properties_skippable: nested_block_properties_skippable(options),
            start,
            options,
            ids,
            styles,
            optimisation,
            paragraph_style: paragraph_style.map(str::to_string),
            builder,
            field_nesting_level: 0,
        }
    }

    /// Consume the run content through the run end.
    pub fn parse(mut self, reader: &mut EventReader<'_>) -> Result<RunBuilder> {
        log::debug!("parsing run {}", self.start.name);

        // The run properties are the first child, if present
        match reader.next_tag()? {
            Some(XmlEvent::StartElement(e)) if e.name.local == RUN_PROPERTIES => {
                self.read_run_properties(&e, reader)?;
            },
            Some(XmlEvent::EndElement(e)) if e.name == self.start.name => return Ok(self.end_run(e)),
            Some(event) => self.start_run_parsing(event, reader)?,
            None => return Err(OoxmlError::structure("Unterminated run")),
        }
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::EndElement(e) if e.name == self.start.name => return Ok(self.end_run(e)),
                event => self.start_run_parsing(event, reader)?,
            }
        }
        Err(OoxmlError::structure(format!("Unterminated run {}", self.start.name)))
    }

    fn end_run(mut self, end: EndElement) -> RunBuilder {
        self.builder.flush_text();
        self.builder.flush_markup();
        self.builder.set_end(end);
        // The vertical alignment of a run without text is dropped
        if !self.builder.has_non_whitespace_text() && self.options.cleanup_aggressively {
            let properties = self.builder.properties().copied(true, false, false);
            self.builder.set_properties(properties);
        }
        self.builder
    }

    fn read_run_properties(&mut self, start: &StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        let mut skippable = self.run_skippable.properties().clone();
        let direct = parse_run_properties(start, reader, &mut skippable, self.options)?;
        let run_style = direct.run_style().map(str::to_string);
        let inherited = self.styles.read().combined_run_properties(
            self.paragraph_style.as_deref(),
            run_style.as_deref(),
            &RunProperties::empty(start.name.clone()),
        );
        self.builder.set_properties(direct.minified(&inherited));
        self.builder.set_run_style(run_style);
        Ok(())
    }

    fn start_run_parsing(&mut self, event: XmlEvent, reader: &mut EventReader<'_>) -> Result<()> {
        match event {
            XmlEvent::StartElement(start) if is_paragraph_name(&start.name) => {
                self.parse_nested_block(start, reader)?;
            },
            XmlEvent::StartElement(start) if is_field_character(&start, FIELD_BEGIN) => {
                self.parse_complex_field(start, reader)?;
                self.builder.set_contains_complex_fields(true);
            },
            event => {
                if !self.skip(&event, reader)? {
                    let event = self.process_translatable_attributes(event);
                    self.parse_content(event, reader)?;
                }
            },
        }
        Ok(())
    }

    fn skip(&mut self, event: &XmlEvent, reader: &mut EventReader<'_>) -> Result<bool> {
        Ok(self.run_skippable.skip(event, reader)? || self.block_skippable.skip(event, reader)?)
    }

    fn parse_nested_block(&mut self, start: StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        log::debug!("parsing nested block {}", start.name);
        self.builder.flush_text();

        let (styles, optimisation) = if start.name.is_in(DRAWING_ML) {
            let styles = StyleDefinitions::Empty.shared();
            let optimisation = StyleOptimisation::drawing(&start.name, styles.clone());
            (styles, optimisation)
        } else {
            (self.styles.clone(), self.optimisation.clone())
        };
        let mut nested = BlockParser::new(&start, self.options, styles, optimisation).parse(reader, self.ids)?;
        nested.optimise_styles(self.options)?;
        self.builder.set_contains_nested_items(true);

        if nested.has_visible_run_content() {
            let id = self.ids.create_id();
            self.builder.add_to_markup(XmlEvent::characters(ref_marker(&id)));
            self.builder.add_nested_textual_item(NestedTextual {
                id,
                item: Textual::Block(nested),
            });
            return Ok(());
        }

        // Nothing to expose, but whatever the block references stays translatable
        for event in nested.events() {
            self.builder.add_to_markup(event);
        }
        for chunk in nested.chunks() {
            match chunk {
                Chunk::Run(run) => self.lift_nested_items(run.nested_textual_items()),
                Chunk::RunContainer(container) => {
                    for run in container.chunks().iter().filter_map(Chunk::as_run) {
                        self.lift_nested_items(run.nested_textual_items());
                    }
                },
                _ => {},
            }
        }
        Ok(())
    }

    fn lift_nested_items(&mut self, items: &[NestedTextual]) {
        for item in items {
            self.builder.add_nested_textual_item(item.clone());
        }
    }

    fn parse_complex_field(&mut self, start: StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        let mut extractable = false;
        let mut at_result = false;
        let mut deferred: VecDeque<XmlEvent> = VecDeque::new();

        self.field_nesting_level += 1;
        self.gather_into_markup(start, reader)?;

        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::StartElement(end) if is_field_character(&end, FIELD_END) => {
                    if extractable {
                        self.end_complex_field_parsing(end, deferred, reader)?;
                    } else {
                        self.parse_simple_element(end, reader)?;
                    }
                    self.field_nesting_level -= 1;
                    return Ok(());
                },
                XmlEvent::StartElement(instruction) if instruction.name.local == FIELD_INSTRUCTION => {
                    extractable = self.parse_field_instruction(instruction, reader)?;
                },
                XmlEvent::StartElement(separate) if is_field_character(&separate, FIELD_SEPARATE) => {
                    self.parse_simple_element(separate, reader)?;
                    at_result = true;
                },
                XmlEvent::StartElement(begin) if is_field_character(&begin, FIELD_BEGIN) => {
                    if extractable && !deferred.is_empty() {
                        self.parse_content_from(deferred.drain(..))?;
                    }
                    self.parse_complex_field(begin, reader)?;
                },
                event if !extractable || !at_result => {
                    if !self.skip(&event, reader)? {
                        self.builder.add_to_markup(strip_revision_attributes(event));
                    }
                },
                event if is_paragraph_end(&event) => {
                    // The field result sticks to the latest paragraph
                    if !deferred.is_empty() {
                        self.parse_content_from(deferred.drain(..))?;
                    }
                    deferred.push_back(event);
                },
                XmlEvent::StartElement(properties_start)
                    if !deferred.is_empty() && is_paragraph_properties_name(&properties_start.name) =>
                {
                    let properties = parse_paragraph_block_properties(
                        &properties_start,
                        reader,
                        self.drawing_strippable,
                        &mut self.properties_skippable,
                    )?;
                    deferred.extend(properties.events());
                },
                event if !deferred.is_empty() => {
                    if !self.skip(&event, reader)? {
                        deferred.push_back(event);
                    }
                },
                event => {
                    let event = self.process_translatable_attributes(strip_revision_attributes(event));
                    self.parse_content(event, reader)?;
                },
            }
        }
        Err(OoxmlError::structure("Unterminated complex field"))
    }

    fn end_complex_field_parsing(
        &mut self,
        end: StartElement,
        mut deferred: VecDeque<XmlEvent>,
        reader: &mut EventReader<'_>,
    ) -> Result<()> {
        if deferred.iter().any(is_run_end) {
            // The field ends after another run: keep the boundary in place
            self.parse_content_from(deferred)?;
            return self.parse_simple_element(end, reader);
        }

        let split = deferred.iter().rposition(is_run_start).unwrap_or(0);
        let tail: Vec<XmlEvent> = deferred.drain(split..).collect();
        self.parse_content_from(tail)?;
        self.parse_simple_element(end, reader)?;
        if self.field_nesting_level == INITIAL_FIELD_NESTING_LEVEL {
            self.builder.add_deferred_events(deferred);
        } else {
            self.parse_to_first_closing_run(reader)?;
            self.parse_content_from(deferred)?;
        }
        Ok(())
    }

    fn parse_to_first_closing_run(&mut self, reader: &mut EventReader<'_>) -> Result<()> {
        while let Some(event) = reader.next_event()? {
            let run_end = is_run_end(&event);
            let event = self.process_translatable_attributes(strip_revision_attributes(event));
            self.parse_content(event, reader)?;
            if run_end {
                return Ok(());
            }
        }
        Err(OoxmlError::structure("Unterminated field run"))
    }

    /// Parse events held back from the stream as if read in place.
    fn parse_content_from(&mut self, events: impl IntoIterator<Item = XmlEvent>) -> Result<()> {
        let mut events = EventReader::from_events(events.into_iter().collect::<Vec<_>>());
        while let Some(event) = events.next_event()? {
            let event = self.process_translatable_attributes(strip_revision_attributes(event));
            self.parse_content(event, &mut events)?;
        }
        Ok(())
    }

    fn gather_into_markup(&mut self, start: StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        let name = start.name.clone();
        self.builder.add_to_markup(XmlEvent::StartElement(start));
        while let Some(event) = reader.next_event()? {
            let end = matches!(&event, XmlEvent::EndElement(e) if e.name == name);
            self.builder.add_to_markup(event);
            if end {
                return Ok(());
            }
        }
        Err(OoxmlError::structure(format!("Unexpected structure: {name}")))
    }

    /// Add an element that has no content to the markup.
    fn parse_simple_element(&mut self, start: StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        let name = start.name.clone();
        self.builder.add_to_markup(XmlEvent::StartElement(start));
        match reader.next_event()? {
            Some(event @ XmlEvent::EndElement(_)) if event.name() == Some(&name) => {
                self.builder.add_to_markup(event);
                Ok(())
            },
            other => Err(OoxmlError::structure(format!("Unexpected structure: {other:?}"))),
        }
    }

    /// Keep the field instruction as markup and tell whether the field
    /// result is extracted.
    fn parse_field_instruction(&mut self, start: StartElement, reader: &mut EventReader<'_>) -> Result<bool> {
        let name = start.name.clone();
        let mut extractable = false;
        self.builder.add_to_markup(XmlEvent::StartElement(start));
        while let Some(event) = reader.next_event()? {
            if matches!(&event, XmlEvent::EndElement(e) if e.name == name) {
                self.builder.add_to_markup(event);
                return Ok(extractable);
            }
            if !extractable && let Some(code) = event.as_characters() {
                let definition = code.split_whitespace().next().unwrap_or_default();
                extractable = self.options.is_complex_field_extractable(definition);
            }
            self.builder.add_to_markup(event);
        }
        Err(OoxmlError::structure(format!("Unexpected structure: {name}")))
    }

    fn parse_content(&mut self, event: XmlEvent, reader: &mut EventReader<'_>) -> Result<()> {
        let options = self.options;
        match event {
            XmlEvent::StartElement(start) if start.name.local == LOCAL_TEXT => {
                self.builder.flush_markup();
                self.parse_text(&start, reader)
            },
            XmlEvent::StartElement(start)
                if options.add_tab_as_character && start.name.local == LOCAL_TAB && !self.builder.is_hidden() =>
            {
                self.add_as_text("\t", &start, reader)
            },
            XmlEvent::StartElement(start)
                if options.add_line_separator_as_character
                    && start.name.local == LOCAL_BREAK
                    && !is_page_break(&start)
                    && !self.builder.is_hidden() =>
            {
                let replacement = options.line_separator_replacement.to_string();
                self.add_as_text(&replacement, &start, reader)
            },
            XmlEvent::StartElement(start)
                if options.replace_no_break_hyphen && start.name.local == LOCAL_NO_BREAK_HYPHEN =>
            {
                self.add_as_text(REGULAR_HYPHEN, &start, reader)
            },
            event if !event.is_whitespace() || self.builder.preserving_whitespace() => {
                // Ignorable whitespace is kept inside preserving elements such as w:instrText
                self.builder.flush_text();
                self.builder.set_text_preserving_whitespace(false);
                match event {
                    XmlEvent::StartElement(start) if is_paragraph_name(&start.name) => {
                        self.builder
                            .add_component_to_markup(MarkupComponent::paragraph_start(start, self.styles.clone()));
                    },
                    XmlEvent::StartElement(start) if is_paragraph_properties_name(&start.name) => {
                        let properties = parse_paragraph_block_properties(
                            &start,
                            reader,
                            self.drawing_strippable,
                            &mut self.properties_skippable,
                        )?;
                        self.builder
                            .add_component_to_markup(MarkupComponent::ParagraphBlockProperties(properties));
                    },
                    XmlEvent::EndElement(end) if is_paragraph_name(&end.name) => {
                        self.builder.add_component_to_markup(MarkupComponent::end(end));
                    },
                    event => {
                        if !self.skip(&event, reader)? {
                            self.builder.add_to_markup(event);
                        }
                    },
                }
                Ok(())
            },
            _ => Ok(()),
        }
    }

    /// Replace an element with text.
    fn add_as_text(&mut self, text: &str, start: &StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        self.builder.flush_markup();
        self.builder.add_text(text, start);
        skip_element(start, reader)
    }

    fn parse_text(&mut self, start: &StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        let preserving = self.builder.is_text_preserving_whitespace() || start.preserves_space();
        self.builder.set_text_preserving_whitespace(preserving);

        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::EndElement(end) if end.name == start.name => return Ok(()),
                XmlEvent::Characters(text) => {
                    if !text.trim().is_empty() {
                        self.builder.set_non_whitespace_text(true);
                    }
                    self.builder.add_text(&text, start);
                },
                _ => {},
            }
        }
        Err(OoxmlError::structure(format!("Unterminated text {}", start.name)))
    }

    /// Swap translatable attribute values (`wp:docPr/@name`,
    /// `v:textpath/@string`) for reference markers.
    fn process_translatable_attributes(&mut self, event: XmlEvent) -> XmlEvent {
        let XmlEvent::StartElement(mut start) = event else {
            return event;
        };
        let attribute = match start.name.local.as_str() {
            LOCAL_DOC_PR if self.options.translate_graphic_metadata => LOCAL_NAME,
            LOCAL_TEXT_PATH => TEXT_PATH_STRING,
            _ => return XmlEvent::StartElement(start),
        };
        for a in start.attributes.iter_mut().filter(|a| a.name.local == attribute) {
            let id = self.ids.create_id();
            let text = std::mem::replace(&mut a.value, ref_marker(&id));
            self.builder.add_nested_textual_item(NestedTextual {
                id,
                item: Textual::Attribute(TranslatableAttributeText::new(text)),
            });
        }
        XmlEvent::StartElement(start)
    }
}
