/// Block (paragraph) parsing.
use super::run::RunParser;
use super::run_merger::RunMerger;
use super::{is_paragraph_name, is_paragraph_properties_name};
use crate::ooxml::chunk::{
    Block, BlockBuilder, Chunk, IdGenerator, RunBuilder, RunContainer, RunContainerBuilder, RunContainerKind,
};
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{LOCAL_BREAK, LOCAL_RUN};
use crate::ooxml::event::{EventReader, StartElement, XmlEvent, gather_element};
use crate::ooxml::markup::MarkupComponent;
use crate::ooxml::optimisation::StyleOptimisation;
use crate::ooxml::parser::{parse_block_properties, parse_paragraph_block_properties, parse_run_properties};
use crate::ooxml::policy::{BlockSkippableElements, SkippableElements, StrippableAttributes, skip_element};
use crate::ooxml::styles::SharedStyles;
use std::collections::VecDeque;

const SIMPLE_FIELD: &str = "fldSimple";
const END_PARAGRAPH_RUN_PROPERTIES: &str = "endParaRPr";
const VANISH: &str = "vanish";

/// Parses a paragraph into a [`Block`].
///
/// Adjacent runs are merged as they are read. A move-from range running
/// past the paragraph end ends the block early and marks it skipped.
pub struct BlockParser<'a> {
    start: StartElement,
    options: &'a FilterOptions,
    styles: SharedStyles,
    optimisation: StyleOptimisation,
    builder: BlockBuilder,
    drawing_strippable: StrippableAttributes,
    properties_skippable: SkippableElements,
    block_skippable: BlockSkippableElements,
    deferred: VecDeque<XmlEvent>,
    paragraph_style: Option<String>,
}

impl<'a> BlockParser<'a> {
    pub fn new(
        start: &StartElement,
        options: &'a FilterOptions,
        styles: SharedStyles,
        optimisation: StyleOptimisation,
    ) -> Self {
        Self {
            start: start.clone(),
            options,
            styles,
            optimisation,
            builder: BlockBuilder::new(),
            drawing_strippable: StrippableAttributes::drawing_run_properties(options),
            properties_skippable: SkippableElements::block_properties(options),
            block_skippable: BlockSkippableElements::new(start, options),
            deferred: VecDeque::new(),
            paragraph_style: None,
        }
    }

    /// Consume the paragraph through its end; `ids` numbers the nested
    /// textual items found on the way.
    pub fn parse(mut self, reader: &mut EventReader<'_>, ids: &mut IdGenerator) -> Result<Block> {
        log::debug!("parsing block {}", self.start.name);
        let start = StrippableAttributes::WordParagraphRevisions.strip(&self.start);
        self.builder
            .add_component_to_markup(MarkupComponent::paragraph_start(start, self.styles.clone()));

        let mut merger = RunMerger::new();
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::StartElement(e) if is_paragraph_properties_name(&e.name) => {
                    let properties = parse_paragraph_block_properties(
                        &e,
                        reader,
                        self.drawing_strippable,
                        &mut self.properties_skippable,
                    )?;
                    self.paragraph_style = properties.paragraph_style().map(str::to_string);
                    merger.set_paragraph_style(self.paragraph_style.clone());
                    if !properties.is_empty() {
                        if properties.contains_run_property_deleted_paragraph_mark() {
                            self.builder.set_mergeable(true);
                        } else {
                            self.builder
                                .add_component_to_markup(MarkupComponent::ParagraphBlockProperties(properties));
                        }
                    }
                },
                XmlEvent::StartElement(e) if e.name.local == LOCAL_RUN => {
                    self.process_run(&mut merger, &e, reader, ids)?;
                    // A complex field ran across the paragraph end
                    if let Some(XmlEvent::EndElement(end)) = self.deferred.front()
                        && is_paragraph_name(&end.name)
                    {
                        let end = end.clone();
                        self.deferred.pop_front();
                        self.add_runs(&mut merger)?;
                        self.builder.add_component_to_markup(MarkupComponent::end(end));
                        self.builder.add_deferred_events(self.deferred.drain(..));
                        self.builder.set_optimisation(self.optimisation);
                        return Ok(self.builder.build());
                    }
                },
                XmlEvent::StartElement(e)
                    if self.options.add_line_separator_as_character
                        && e.name.local == LOCAL_BREAK
                        && merger.has_run_text() =>
                {
                    merger.add_to_run_text(&self.options.line_separator_replacement.to_string())?;
                    skip_element(&e, reader)?;
                },
                XmlEvent::StartElement(e) if RunContainerKind::is_start(&e) => {
                    self.add_runs(&mut merger)?;
                    let container = self.parse_run_container(e, reader, ids)?;
                    self.builder.add(Chunk::RunContainer(container));
                },
                XmlEvent::StartElement(e) if e.name.local == SIMPLE_FIELD => {
                    self.add_runs(&mut merger)?;
                    for event in gather_element(e, reader)? {
                        self.builder.add_to_markup(event);
                    }
                    // The whole field ends up as a single code
                    self.builder.flush_markup();
                },
                XmlEvent::StartElement(e) if e.name.local == END_PARAGRAPH_RUN_PROPERTIES => {
                    let mut skippable = SkippableElements::run_properties(self.options);
                    let properties = parse_run_properties(&e, reader, &mut skippable, self.options)?;
                    self.add_runs(&mut merger)?;
                    if self.builder.chunks_empty() {
                        self.builder.flush_markup();
                    }
                    self.builder
                        .add_component_to_markup(MarkupComponent::RunProperties(properties));
                },
                event => {
                    if self.block_skippable.skip(&event, reader)? {
                        if self.block_skippable.is_border_crossed() {
                            self.builder.set_skipped(true);
                            self.builder.set_optimisation(StyleOptimisation::Bypass);
                            return Ok(self.builder.build());
                        }
                        continue;
                    }
                    if event.is_whitespace() {
                        continue;
                    }
                    self.add_runs(&mut merger)?;
                    match event {
                        XmlEvent::EndElement(end) if end.name == self.start.name => {
                            log::debug!("block {} ended", end.name);
                            if self.builder.chunks_empty() {
                                self.builder.flush_markup();
                            }
                            self.builder.add_component_to_markup(MarkupComponent::end(end));
                            self.builder.set_optimisation(self.optimisation);
                            return Ok(self.builder.build());
                        },
                        event => self.builder.add_to_markup(event),
                    }
                },
            }
        }
        Err(OoxmlError::structure(format!("Unterminated paragraph {}", self.start.name)))
    }

    fn add_runs(&mut self, merger: &mut RunMerger) -> Result<()> {
        for chunk in merger.take_runs()? {
            self.builder.add(chunk);
        }
        Ok(())
    }

    fn process_run(
        &mut self,
        merger: &mut RunMerger,
        start: &StartElement,
        reader: &mut EventReader<'_>,
        ids: &mut IdGenerator,
    ) -> Result<()> {
        let mut run = RunParser::new(
            start,
            self.options,
            ids,
            self.styles.clone(),
            self.optimisation.clone(),
            self.paragraph_style.as_deref(),
            self.builder.is_hidden(),
        )
        .parse(reader)?;
        self.deferred.extend(run.deferred_events_mut().drain(..));

        if run.body_chunks().is_empty() && run.nested_textual_items().is_empty() {
            return Ok(());
        }
        self.clarify_visibility(&mut run);

        self.builder.set_run_name(Some(&start.name));
        self.builder.set_text_name(run.text_name());
        self.builder.set_mergeable(run.contains_mergeable_markup());
        merger.add(run)
    }

    /// Hide the run when the style cascade turns `vanish` on.
    fn clarify_visibility(&self, run: &mut RunBuilder) {
        if self.options.translate_hidden {
            return;
        }
        let vanish = run
            .combined_properties(self.paragraph_style.as_deref())
            .properties()
            .iter()
            .find(|p| p.local_name() == VANISH)
            .map(|p| p.toggle_value() != Some(false));
        if vanish == Some(true) {
            run.set_hidden(true);
        }
    }

    fn parse_run_container(
        &mut self,
        start: StartElement,
        reader: &mut EventReader<'_>,
        ids: &mut IdGenerator,
    ) -> Result<RunContainer> {
        let mut container = RunContainerBuilder::new(start.clone());
        let mut merger = RunMerger::new();
        merger.set_paragraph_style(self.paragraph_style.clone());
        container.add_to_start_markup(MarkupComponent::start(start.clone()));

        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::EndElement(end) if end.name == start.name => {
                    container.add_all(merger.take_runs()?);
                    container.add_to_end_markup(MarkupComponent::end(end));
                    return Ok(container.build());
                },
                XmlEvent::StartElement(e) if e.name.local == LOCAL_RUN => {
                    self.process_run(&mut merger, &e, reader, ids)?;
                },
                XmlEvent::StartElement(e) if RunContainerKind::is_start(&e) => {
                    container.add_all(merger.take_runs()?);
                    let nested = self.parse_run_container(e, reader, ids)?;
                    container.add(Chunk::RunContainer(nested));
                },
                XmlEvent::StartElement(e) if RunContainerKind::is_properties_start(&e) => {
                    let properties =
                        parse_block_properties(&e, reader, self.drawing_strippable, &mut SkippableElements::Empty)?;
                    container.add_to_start_markup(MarkupComponent::BlockProperties(properties));
                },
                XmlEvent::StartElement(e) if RunContainerKind::is_content(&e.name) => {
                    container.add_to_start_markup(MarkupComponent::start(e));
                },
                XmlEvent::EndElement(e) if RunContainerKind::is_content(&e.name) => {
                    container.add_to_end_markup(MarkupComponent::end(e));
                },
                event => {
                    if self.block_skippable.skip(&event, reader)? || event.is_whitespace() {
                        continue;
                    }
                    container.add_all(merger.take_runs()?);
                    container.add_markup(MarkupComponent::General(vec![event]));
                },
            }
        }
        Err(OoxmlError::structure(format!("Unterminated run container {}", start.name)))
    }
}
