/// Coalescing adjacent runs with the same effective formatting.
use crate::ooxml::chunk::{Chunk, RunBodyChunk, RunBuilder};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::MATH;
use crate::ooxml::properties::RunProperties;

/// Collects the runs of a block, merging each one into its predecessor
/// when both resolve to the same properties.
#[derive(Debug, Default)]
pub struct RunMerger {
    paragraph_style: Option<String>,
    current: Option<RunBuilder>,
    completed: Vec<Chunk>,
}

impl RunMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The paragraph style the combined run properties resolve against.
    pub fn set_paragraph_style(&mut self, paragraph_style: Option<String>) {
        self.paragraph_style = paragraph_style;
    }

    /// Whether the pending run has text to extend.
    pub fn has_run_text(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|r| r.body_chunks().iter().any(|c| matches!(c, RunBodyChunk::Text(_))))
    }

    pub fn add(&mut self, mut other: RunBuilder) -> Result<()> {
        let paragraph_style = self.paragraph_style.as_deref();
        let Some(mut current) = self.current.take() else {
            other.reset_combined_properties(paragraph_style);
            self.current = Some(other);
            return Ok(());
        };
        if can_merge(&mut current, &mut other, paragraph_style) {
            merge(&mut current, other, paragraph_style);
            self.current = Some(current);
        } else {
            self.completed.push(Chunk::Run(current.build()?));
            self.current = Some(other);
        }
        Ok(())
    }

    /// Append text to the first text of the pending run.
    pub fn add_to_run_text(&mut self, text: &str) -> Result<()> {
        match self.current.as_mut() {
            Some(current) => current.add_to_first_run_text(text),
            None => Err(OoxmlError::illegal_state("No run is pending")),
        }
    }

    /// Take the runs collected so far and start over.
    pub fn take_runs(&mut self) -> Result<Vec<Chunk>> {
        if let Some(current) = self.current.take() {
            self.completed.push(Chunk::Run(current.build()?));
        }
        Ok(std::mem::take(&mut self.completed))
    }
}

fn can_merge(current: &mut RunBuilder, other: &mut RunBuilder, paragraph_style: Option<&str>) -> bool {
    if current.is_hidden() || other.is_hidden() {
        return false;
    }
    // Merged math runs can break formulas
    if current.start().name.is_in(MATH) {
        return false;
    }
    if current.contains_nested_items() || other.contains_nested_items() {
        return false;
    }
    if current.contains_complex_fields() || other.contains_complex_fields() {
        return false;
    }
    let properties = current.combined_properties(paragraph_style);
    let other_properties = other.combined_properties(paragraph_style);
    can_properties_be_merged(properties, other_properties)
}

/// Same number of properties, each with a replaceable same-named
/// counterpart.
fn can_properties_be_merged(properties: &RunProperties, other: &RunProperties) -> bool {
    properties.count() == other.count()
        && properties.properties().iter().all(|p| {
            other
                .properties()
                .iter()
                .find(|o| o.name() == p.name())
                .is_some_and(|o| p.can_be_replaced(o))
        })
}

fn merge(current: &mut RunBuilder, mut other: RunBuilder, paragraph_style: Option<&str>) {
    if current.properties().count() > other.properties().count() {
        current.set_properties(other.properties().clone());
    }
    current.reset_combined_properties(paragraph_style);
    let preserving = current.is_text_preserving_whitespace() || other.is_text_preserving_whitespace();
    current.set_text_preserving_whitespace(preserving);
    let other_body = std::mem::take(other.body_chunks_mut());
    merge_body_chunks(current.body_chunks_mut(), other_body);
}

/// Concatenate run bodies, joining the boundary chunks when both are
/// markup or both are text.
fn merge_body_chunks(chunks: &mut Vec<RunBodyChunk>, other: Vec<RunBodyChunk>) {
    let mut other = other.into_iter();
    let Some(first) = other.next() else {
        return;
    };
    match (chunks.last_mut(), first) {
        (Some(RunBodyChunk::Markup(markup)), RunBodyChunk::Markup(other_markup)) => {
            markup.add_markup(other_markup);
        },
        (Some(RunBodyChunk::Text(text)), RunBodyChunk::Text(other_text)) => {
            if other_text.start().attributes.len() > text.start().attributes.len() {
                text.set_start(other_text.start().clone());
            }
            text.push_str(other_text.text());
        },
        (_, first) => chunks.push(first),
    }
    chunks.extend(other);
}
