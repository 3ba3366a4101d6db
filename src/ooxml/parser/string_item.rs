/// Shared string item parsing.
use super::run::RunParser;
use super::run_merger::RunMerger;
use crate::ooxml::chunk::{Chunk, IdGenerator, StringItem, StringItemBuilder, Text};
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{LOCAL_RUN, LOCAL_TEXT};
use crate::ooxml::event::{EndElement, EventReader, StartElement, XmlEvent};
use crate::ooxml::markup::MarkupComponent;
use crate::ooxml::optimisation::StyleOptimisation;
use crate::ooxml::policy::SkippableElements;
use crate::ooxml::styles::SharedStyles;

/// Parses a SpreadsheetML `si` element into a [`StringItem`].
///
/// Phonetic runs and properties are dropped.
pub struct StringItemParser<'a> {
    start: StartElement,
    options: &'a FilterOptions,
    styles: SharedStyles,
    optimisation: StyleOptimisation,
    builder: StringItemBuilder,
    phonetic: SkippableElements,
}

impl<'a> StringItemParser<'a> {
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
            builder: StringItemBuilder::new(),
            phonetic: SkippableElements::phonetic(),
        }
    }

    pub fn parse(mut self, reader: &mut EventReader<'_>, ids: &mut IdGenerator) -> Result<StringItem> {
        log::debug!("parsing string item {}", self.start.name);
        self.builder.add_component_to_markup(MarkupComponent::paragraph_start(
            self.start.clone(),
            self.styles.clone(),
        ));

        let mut merger = RunMerger::new();
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::StartElement(e) if e.name.local == LOCAL_RUN => {
                    self.process_run(&mut merger, &e, reader, ids)?;
                },
                XmlEvent::StartElement(e) if e.name.local == LOCAL_TEXT => {
                    self.add_runs(&mut merger)?;
                    let text = parse_plain_text(e, reader)?;
                    self.builder.add(Chunk::Text(text));
                },
                XmlEvent::StartElement(e) if self.phonetic.can_be_skipped(&e, Some(&self.start)) => {
                    self.phonetic.skip(&e, reader)?;
                },
                event if event.is_whitespace() => {},
                event => {
                    self.add_runs(&mut merger)?;
                    match event {
                        XmlEvent::EndElement(end) if end.name == self.start.name => {
                            self.builder.add_component_to_markup(MarkupComponent::end(end));
                            self.builder.set_optimisation(self.optimisation);
                            return Ok(self.builder.build());
                        },
                        event => self.builder.add_to_markup(event),
                    }
                },
            }
        }
        Err(OoxmlError::structure(format!("Unterminated string item {}", self.start.name)))
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
        let run = RunParser::new(
            start,
            self.options,
            ids,
            self.styles.clone(),
            self.optimisation.clone(),
            None,
            false,
        )
        .parse(reader)?;
        if run.body_chunks().is_empty() && run.nested_textual_items().is_empty() {
            return Ok(());
        }
        self.builder.set_run_name(start.name.clone());
        if let Some(text_name) = run.text_name() {
            self.builder.set_text_name(Some(text_name.clone()));
        }
        merger.add(run)
    }
}

/// A text element holding characters only; `<t/>` yields empty text.
fn parse_plain_text(start: StartElement, reader: &mut EventReader<'_>) -> Result<Text> {
    let mut text = String::new();
    while let Some(event) = reader.next_event()? {
        match event {
            XmlEvent::EndElement(end) if end.name == start.name => {
                return Ok(Text::new(start, text, EndElement::new(end.name)));
            },
            XmlEvent::Characters(characters) => text.push_str(&characters),
            other => {
                return Err(OoxmlError::structure(format!("Unexpected text content: {other:?}")));
            },
        }
    }
    Err(OoxmlError::structure(format!("Unterminated text {}", start.name)))
}
