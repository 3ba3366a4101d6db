/// Blocks: paragraphs and their equivalents.
use super::Chunk;
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::{QName, XmlEvent};
use crate::ooxml::markup::{Markup, MarkupBuilder, MarkupComponent};
use crate::ooxml::optimisation::StyleOptimisation;

/// A paragraph-level unit: bracketing markup around runs and run
/// containers.
///
/// The first chunk is the markup opening the block (the paragraph start
/// and its properties) and the last one the markup closing it.
#[derive(Debug, Clone)]
pub struct Block {
    chunks: Vec<Chunk>,
    optimisation: StyleOptimisation,
    run_name: Option<QName>,
    text_name: Option<QName>,
    hidden: bool,
    skipped: bool,
    mergeable: bool,
    deferred: Vec<XmlEvent>,
}

impl Block {
    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn chunks_mut(&mut self) -> &mut Vec<Chunk> {
        &mut self.chunks
    }

    /// The name of the runs of the block, if it has any.
    #[inline]
    pub fn run_name(&self) -> Option<&QName> {
        self.run_name.as_ref()
    }

    #[inline]
    pub fn text_name(&self) -> Option<&QName> {
        self.text_name.as_ref()
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Whether a skipped move-from range crossed the end of the block.
    #[inline]
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Whether the paragraph mark was deleted, so that the block continues
    /// in the next one.
    #[inline]
    pub fn is_mergeable(&self) -> bool {
        self.mergeable
    }

    /// Events that follow the block in the stream and must be written
    /// after it.
    #[inline]
    pub fn deferred_events(&self) -> &[XmlEvent] {
        &self.deferred
    }

    #[inline]
    pub fn optimisation(&self) -> &StyleOptimisation {
        &self.optimisation
    }

    pub fn first_markup(&self) -> Option<&Markup> {
        self.chunks.first().and_then(Chunk::as_markup)
    }

    pub fn events(&self) -> Vec<XmlEvent> {
        self.chunks.iter().flat_map(Chunk::events).collect()
    }

    /// Take in the content of the block preceding this one across a
    /// deleted paragraph mark.
    ///
    /// The inner chunks of `mergeable` are placed before ours. Runs of
    /// `mergeable` carrying nested paragraph properties take ours instead,
    /// and then our paragraph properties become those of `mergeable`.
    pub fn merge_with(&mut self, mergeable: Block) -> Result<()> {
        if mergeable.chunks.len() <= 2 {
            return Ok(());
        }
        if self.chunks.is_empty() {
            return Err(OoxmlError::illegal_state("The block markup is absent"));
        }
        let properties = self
            .first_markup()
            .and_then(Markup::paragraph_block_properties)
            .cloned();
        let mergeable_properties = mergeable
            .first_markup()
            .and_then(Markup::paragraph_block_properties)
            .cloned();

        let mut chunks = mergeable.chunks;
        let last = chunks.len() - 1;
        let mut inner: Vec<Chunk> = chunks.drain(1..last).collect();
        let mut refined_inline = false;
        for chunk in &mut inner {
            if let Chunk::Run(run) = chunk
                && run.contains_paragraph_block_properties()
            {
                run.refine_paragraph_block_properties(properties.clone())?;
                refined_inline = true;
            }
        }
        self.chunks.splice(1..1, inner);

        // The absorbed paragraph now opens the block; without properties of
        // its own ours go away
        if refined_inline && let Some(markup) = self.chunks.first_mut().and_then(Chunk::as_markup_mut) {
            markup.replace_paragraph_block_properties(mergeable_properties)?;
        }
        if self.run_name.is_none() {
            self.run_name = mergeable.run_name;
        }
        if self.text_name.is_none() {
            self.text_name = mergeable.text_name;
        }
        Ok(())
    }

    /// Hoist the run properties common to every run into a paragraph
    /// style.
    pub fn optimise_styles(&mut self, options: &FilterOptions) -> Result<()> {
        self.optimisation.apply_to(&mut self.chunks, options)
    }

    /// Whether a run, directly or in a container, shows text.
    pub fn has_visible_run_content(&self) -> bool {
        self.chunks.iter().any(|chunk| match chunk {
            Chunk::Run(run) => run.contains_visible_text(),
            Chunk::RunContainer(container) => container.contains_visible_text(),
            _ => false,
        })
    }
}

#[derive(Debug, Default)]
pub struct BlockBuilder {
    chunks: Vec<Chunk>,
    optimisation: StyleOptimisation,
    run_name: Option<QName>,
    text_name: Option<QName>,
    hidden: bool,
    skipped: bool,
    mergeable: bool,
    deferred: Vec<XmlEvent>,
    markup: MarkupBuilder,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk after the pending markup.
    pub fn add(&mut self, chunk: Chunk) {
        self.flush_markup();
        self.chunks.push(chunk);
    }

    /// The first name given wins.
    pub fn set_run_name(&mut self, name: Option<&QName>) {
        if self.run_name.is_none() {
            self.run_name = name.cloned();
        }
    }

    pub fn set_text_name(&mut self, name: Option<&QName>) {
        if self.text_name.is_none() {
            self.text_name = name.cloned();
        }
    }

    #[inline]
    pub fn set_optimisation(&mut self, optimisation: StyleOptimisation) {
        self.optimisation = optimisation;
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
    pub fn set_skipped(&mut self, skipped: bool) {
        self.skipped = skipped;
    }

    /// Once mergeable, always mergeable.
    pub fn set_mergeable(&mut self, mergeable: bool) {
        self.mergeable |= mergeable;
    }

    #[inline]
    pub fn add_deferred_events(&mut self, events: impl IntoIterator<Item = XmlEvent>) {
        self.deferred.extend(events);
    }

    #[inline]
    pub fn add_to_markup(&mut self, event: XmlEvent) {
        self.markup.add_event(event);
    }

    #[inline]
    pub fn add_component_to_markup(&mut self, component: MarkupComponent) {
        self.markup.add_component(component);
    }

    #[inline]
    pub fn chunks_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn flush_markup(&mut self) {
        if !self.markup.is_empty() {
            let markup = self.markup.build();
            self.chunks.push(Chunk::Markup(markup));
        }
    }

    pub fn build(mut self) -> Block {
        self.flush_markup();
        Block {
            chunks: self.chunks,
            optimisation: self.optimisation,
            run_name: self.run_name,
            text_name: self.text_name,
            hidden: self.hidden,
            skipped: self.skipped,
            mergeable: self.mergeable,
            deferred: self.deferred,
        }
    }
}
