//! Non-textual markup.
//!
//! Everything in a document part that is not text is kept as a sequence of
//! [`MarkupComponent`]s. Concatenating the events of every component
//! reproduces the original markup, except where clarification or style
//! optimisation rewrites it on purpose.

mod component;

pub use component::MarkupComponent;

use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::XmlEvent;
use crate::ooxml::properties::ParagraphBlockProperties;

/// An ordered sequence of markup components.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markup {
    components: Vec<MarkupComponent>,
}

impl Markup {
    pub fn new(components: Vec<MarkupComponent>) -> Self {
        Self { components }
    }

    #[inline]
    pub fn add_component(&mut self, component: MarkupComponent) {
        self.components.push(component);
    }

    #[inline]
    pub fn add_components(&mut self, components: impl IntoIterator<Item = MarkupComponent>) {
        self.components.extend(components);
    }

    #[inline]
    pub fn add_markup(&mut self, markup: Markup) {
        self.components.extend(markup.components);
    }

    #[inline]
    pub fn components(&self) -> &[MarkupComponent] {
        &self.components
    }

    #[inline]
    pub fn components_mut(&mut self) -> &mut Vec<MarkupComponent> {
        &mut self.components
    }

    #[inline]
    pub fn into_components(self) -> Vec<MarkupComponent> {
        self.components
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The first component carrying an element name.
    pub fn nameable_component(&self) -> Option<&MarkupComponent> {
        self.components.iter().find(|c| c.name().is_some())
    }

    pub fn events(&self) -> Vec<XmlEvent> {
        self.components.iter().flat_map(MarkupComponent::events).collect()
    }

    /// The first paragraph properties component.
    pub fn paragraph_block_properties(&self) -> Option<&ParagraphBlockProperties> {
        self.components.iter().find_map(|c| match c {
            MarkupComponent::ParagraphBlockProperties(p) => Some(p),
            _ => None,
        })
    }

    /// Replace the first block properties component with `properties`, or
    /// insert them right after the paragraph start.
    pub fn update_or_add_block_properties(&mut self, properties: ParagraphBlockProperties) -> Result<()> {
        let replacement = MarkupComponent::ParagraphBlockProperties(properties);
        if let Some(index) = self.components.iter().position(|c| {
            matches!(
                c,
                MarkupComponent::BlockProperties(_) | MarkupComponent::ParagraphBlockProperties(_)
            )
        }) {
            self.components[index] = replacement;
            return Ok(());
        }
        let index = self.paragraph_start_index()?;
        self.components.insert(index + 1, replacement);
        Ok(())
    }

    /// Replace the paragraph properties component, remove it when
    /// `properties` is `None`, or insert it after the paragraph start.
    pub fn replace_paragraph_block_properties(&mut self, properties: Option<ParagraphBlockProperties>) -> Result<()> {
        let position = self
            .components
            .iter()
            .position(MarkupComponent::is_paragraph_block_properties);
        match (position, properties) {
            (Some(index), Some(properties)) => {
                self.components[index] = MarkupComponent::ParagraphBlockProperties(properties);
            },
            (Some(index), None) => {
                self.components.remove(index);
            },
            (None, Some(properties)) => {
                let index = self.paragraph_start_index()?;
                self.components
                    .insert(index + 1, MarkupComponent::ParagraphBlockProperties(properties));
            },
            (None, None) => {},
        }
        Ok(())
    }

    fn paragraph_start_index(&self) -> Result<usize> {
        self.components
            .iter()
            .position(MarkupComponent::is_paragraph_start)
            .ok_or_else(|| OoxmlError::illegal_state("The paragraph start markup component is not found"))
    }
}

/// Accumulates markup, coalescing consecutive raw events into one
/// [`MarkupComponent::General`] component.
#[derive(Debug, Default)]
pub struct MarkupBuilder {
    components: Vec<MarkupComponent>,
}

impl MarkupBuilder {
    pub fn add_event(&mut self, event: XmlEvent) {
        if let Some(MarkupComponent::General(events)) = self.components.last_mut() {
            events.push(event);
        } else {
            self.components.push(MarkupComponent::General(vec![event]));
        }
    }

    #[inline]
    pub fn add_component(&mut self, component: MarkupComponent) {
        self.components.push(component);
    }

    /// The most recently added event.
    pub fn last_event(&self) -> Option<XmlEvent> {
        match self.components.last()? {
            MarkupComponent::General(events) => events.last().cloned(),
            component => component.events().pop(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Take the accumulated markup, leaving the builder empty.
    pub fn build(&mut self) -> Markup {
        Markup::new(std::mem::take(&mut self.components))
    }
}

impl From<MarkupComponent> for Markup {
    fn from(component: MarkupComponent) -> Self {
        Self::new(vec![component])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::wpml;
    use crate::ooxml::event::StartElement;

    #[test]
    fn test_markup_concatenates_events() {
        let mut markup = Markup::default();
        markup.add_component(MarkupComponent::General(vec![XmlEvent::characters("\n")]));
        markup.add_component(MarkupComponent::start(StartElement::new(wpml("hyperlink"))));
        let mut other = Markup::default();
        other.add_component(MarkupComponent::EmptyElement(StartElement::new(wpml("br"))));
        markup.add_markup(other);

        assert_eq!(markup.components().len(), 3);
        assert_eq!(markup.events().len(), 4);
        assert_eq!(markup.nameable_component().and_then(MarkupComponent::name), Some(&wpml("hyperlink")));
    }

    #[test]
    fn test_builder_coalesces_events() {
        let mut builder = MarkupBuilder::default();
        builder.add_event(XmlEvent::start(wpml("tab")));
        builder.add_event(XmlEvent::end(wpml("tab")));
        builder.add_component(MarkupComponent::EmptyElement(StartElement::new(wpml("br"))));
        builder.add_event(XmlEvent::characters(" "));
        assert_eq!(builder.last_event(), Some(XmlEvent::characters(" ")));

        let markup = builder.build();
        assert_eq!(markup.components().len(), 3);
        assert!(builder.is_empty());
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_update_or_add_block_properties() {
        use crate::ooxml::styles::StyleDefinitions;

        let properties = ParagraphBlockProperties::empty(wpml("pPr"));
        let mut markup = Markup::default();
        assert!(matches!(
            markup.update_or_add_block_properties(properties.clone()),
            Err(OoxmlError::IllegalState(_))
        ));

        let styles = StyleDefinitions::Empty.shared();
        markup.add_component(MarkupComponent::paragraph_start(StartElement::new(wpml("p")), styles));
        markup.add_component(MarkupComponent::General(vec![XmlEvent::characters("x")]));
        markup.update_or_add_block_properties(properties.clone()).unwrap();
        assert!(markup.components()[1].is_paragraph_block_properties());

        markup.replace_paragraph_block_properties(None).unwrap();
        assert_eq!(markup.components().len(), 2);
        assert!(markup.paragraph_block_properties().is_none());
    }
}
