/// SpreadsheetML shared string items.
use super::{Block, BlockBuilder, Chunk};
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::Result;
use crate::ooxml::event::{QName, XmlEvent};
use crate::ooxml::markup::{MarkupBuilder, MarkupComponent};
use crate::ooxml::optimisation::StyleOptimisation;

/// A shared string item (`si`): plain text or rich text runs.
#[derive(Debug, Clone)]
pub struct StringItem {
    chunks: Vec<Chunk>,
    optimisation: StyleOptimisation,
    run_name: Option<QName>,
    text_name: Option<QName>,
}

impl StringItem {
    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn run_name(&self) -> Option<&QName> {
        self.run_name.as_ref()
    }

    #[inline]
    pub fn text_name(&self) -> Option<&QName> {
        self.text_name.as_ref()
    }

    /// Whether the item holds rich text runs.
    pub fn is_styled(&self) -> bool {
        self.chunks.iter().any(|c| matches!(c, Chunk::Run(_)))
    }

    pub fn optimise_styles(&mut self, options: &FilterOptions) -> Result<()> {
        self.optimisation.apply_to(&mut self.chunks, options)
    }

    /// The item as a block of its chunks.
    pub fn block(&self) -> Block {
        let mut builder = BlockBuilder::new();
        for chunk in &self.chunks {
            builder.add(chunk.clone());
        }
        builder.set_optimisation(self.optimisation.clone());
        builder.set_run_name(self.run_name.as_ref());
        builder.set_text_name(self.text_name.as_ref());
        builder.build()
    }

    pub fn events(&self) -> Vec<XmlEvent> {
        self.chunks.iter().flat_map(Chunk::events).collect()
    }
}

#[derive(Debug, Default)]
pub struct StringItemBuilder {
    chunks: Vec<Chunk>,
    optimisation: StyleOptimisation,
    run_name: Option<QName>,
    text_name: Option<QName>,
    markup: MarkupBuilder,
}

impl StringItemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, chunk: Chunk) {
        self.flush_markup();
        self.chunks.push(chunk);
    }

    #[inline]
    pub fn set_optimisation(&mut self, optimisation: StyleOptimisation) {
        self.optimisation = optimisation;
    }

    #[inline]
    pub fn set_run_name(&mut self, name: QName) {
        self.run_name = Some(name);
    }

    #[inline]
    pub fn set_text_name(&mut self, name: Option<QName>) {
        self.text_name = name;
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
            self.chunks.push(Chunk::Markup(markup));
        }
    }

    pub fn build(mut self) -> StringItem {
        self.flush_markup();
        StringItem {
            chunks: self.chunks,
            optimisation: self.optimisation,
            run_name: self.run_name,
            text_name: self.text_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::chunk::Text;
    use crate::ooxml::event::names::sml;
    use crate::ooxml::event::StartElement;

    #[test]
    fn test_plain_item() {
        let start = StartElement::new(sml("si"));
        let t = StartElement::new(sml("t"));
        let mut builder = StringItemBuilder::new();
        builder.add_component_to_markup(MarkupComponent::start(start.clone()));
        builder.add(Chunk::Text(Text::new(t.clone(), "Total", t.end())));
        builder.add_component_to_markup(MarkupComponent::end(start.end()));
        let item = builder.build();

        assert!(!item.is_styled());
        assert_eq!(item.chunks().len(), 3);
        assert_eq!(item.events().len(), 5);
        assert_eq!(item.block().chunks().len(), 3);
    }
}
