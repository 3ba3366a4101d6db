/// Direction elements of property bags.
use super::{ClarificationContext, FALSE_VALUE, TRUE_VALUE};
use crate::ooxml::error::Result;
use crate::ooxml::event::names::{LOCAL_BIDI, LOCAL_BIDI_VISUAL, LOCAL_LANG, LOCAL_RTL, LOCAL_VAL};
use crate::ooxml::event::{Attribute, QName, StartElement, XmlEvent, parse_boolean};
use crate::ooxml::properties::{BlockProperty, RunProperty};

/// A child element of a property bag that can be looked up by local name
/// and created next to its siblings.
pub(crate) trait ClarifiableProperty: Sized {
    fn local_name(&self) -> &str;

    /// An empty element `local` in the namespace of `sibling`, with
    /// attributes in the same namespace.
    fn create(sibling: &QName, local: &str, attributes: &[(&str, &str)]) -> Result<Self>;

    fn start(&self) -> Option<&StartElement>;
}

impl ClarifiableProperty for BlockProperty {
    fn local_name(&self) -> &str {
        &self.name().local
    }

    fn create(sibling: &QName, local: &str, attributes: &[(&str, &str)]) -> Result<Self> {
        Ok(BlockProperty::with_attributes(sibling, local, attributes.iter().copied()))
    }

    fn start(&self) -> Option<&StartElement> {
        Some(BlockProperty::start(self))
    }
}

impl ClarifiableProperty for RunProperty {
    fn local_name(&self) -> &str {
        RunProperty::local_name(self)
    }

    fn create(sibling: &QName, local: &str, attributes: &[(&str, &str)]) -> Result<Self> {
        let start = StartElement::new(sibling.sibling(local)).with_attributes(
            attributes
                .iter()
                .map(|(name, value)| Attribute::new(sibling.sibling(*name), *value)),
        );
        let end = start.end();
        RunProperty::from_events(vec![XmlEvent::StartElement(start), XmlEvent::EndElement(end)])
    }

    fn start(&self) -> Option<&StartElement> {
        RunProperty::start(self)
    }
}

/// Where the cascade-combined value of a direction element comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombinedSource {
    Paragraph,
    Run,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementsClarification {
    Bypass,
    /// `w:bidiVisual`: present exactly when the target is right-to-left.
    TableBlockPropertyDefault { local: &'static str },
    /// A boolean direction element (`w:bidi`, `w:rtl`) switched when the
    /// combined value disagrees with the target direction.
    PropertyDefault { local: &'static str, source: CombinedSource },
    /// [`ElementsClarification::PropertyDefault`] on `w:rtl`, also marking
    /// the run language when the target writes its own numeral separators.
    RunPropertyLang { local: &'static str, attribute: &'static str },
}

impl ElementsClarification {
    pub fn table_bidi_visual() -> Self {
        ElementsClarification::TableBlockPropertyDefault {
            local: LOCAL_BIDI_VISUAL,
        }
    }

    pub fn paragraph_bidi() -> Self {
        ElementsClarification::PropertyDefault {
            local: LOCAL_BIDI,
            source: CombinedSource::Paragraph,
        }
    }

    pub fn run_rtl_and_lang() -> Self {
        ElementsClarification::RunPropertyLang {
            local: LOCAL_LANG,
            attribute: LOCAL_BIDI,
        }
    }

    /// Clarify the children of a property bag named `bag`.
    pub(crate) fn perform_for<P: ClarifiableProperty>(
        &self,
        properties: &mut Vec<P>,
        bag: &QName,
        context: &ClarificationContext,
    ) -> Result<()> {
        match self {
            ElementsClarification::Bypass => Ok(()),
            ElementsClarification::TableBlockPropertyDefault { local } => {
                match properties.iter().position(|p| p.local_name() == *local) {
                    Some(index) if !context.target_rtl() => {
                        properties.remove(index);
                    },
                    Some(_) => {},
                    None if context.target_rtl() => properties.push(P::create(bag, local, &[])?),
                    None => {},
                }
                Ok(())
            },
            ElementsClarification::PropertyDefault { local, source } => {
                clarify_property_default(properties, bag, local, *source, context)
            },
            ElementsClarification::RunPropertyLang { local, attribute } => {
                clarify_property_default(properties, bag, LOCAL_RTL, CombinedSource::Run, context)?;
                if context.directions_match() || !context.target_has_numeral_separators() {
                    return Ok(());
                }
                clarify_language(properties, bag, local, attribute, context)
            },
        }
    }
}

fn combined_value(local: &str, source: CombinedSource, context: &ClarificationContext) -> Result<Option<String>> {
    let value = match source {
        CombinedSource::Paragraph => match context
            .combined_paragraph_properties()
            .and_then(|p| p.properties().iter().find(|p| p.name().local == local))
        {
            Some(property) => Some(property.value()?.unwrap_or(TRUE_VALUE).to_string()),
            None => None,
        },
        CombinedSource::Run => context
            .combined_run_properties()
            .and_then(|p| p.properties().iter().find(|p| p.local_name() == local))
            .map(|p| p.value().unwrap_or(TRUE_VALUE).to_string()),
    };
    Ok(value)
}

fn clarify_property_default<P: ClarifiableProperty>(
    properties: &mut Vec<P>,
    bag: &QName,
    local: &str,
    source: CombinedSource,
    context: &ClarificationContext,
) -> Result<()> {
    if context.directions_match() {
        return Ok(());
    }
    let combined = combined_value(local, source, context)?.unwrap_or_else(|| FALSE_VALUE.to_string());
    let position = properties.iter().position(|p| p.local_name() == local);
    match parse_boolean(&combined) {
        Some(false) if context.target_rtl() => {
            let property = P::create(bag, local, &[])?;
            match position {
                Some(index) => properties[index] = property,
                None => properties.push(property),
            }
        },
        // A direct value is removed; an inherited one is overridden
        Some(true) if !context.target_rtl() => match position {
            Some(index) => {
                properties.remove(index);
            },
            None => properties.push(P::create(bag, local, &[(LOCAL_VAL, FALSE_VALUE)])?),
        },
        _ => {},
    }
    Ok(())
}

/// Set the bidirectional language of an existing language element, or add
/// one.
fn clarify_language<P: ClarifiableProperty>(
    properties: &mut Vec<P>,
    bag: &QName,
    local: &str,
    attribute: &str,
    context: &ClarificationContext,
) -> Result<()> {
    let language = context.target_language();
    match properties.iter().position(|p| p.local_name() == local) {
        Some(index) => {
            let mut attributes: Vec<(String, String)> = properties[index]
                .start()
                .map(|s| {
                    s.attributes
                        .iter()
                        .filter(|a| a.name.local != attribute)
                        .map(|a| (a.name.local.clone(), a.value.clone()))
                        .collect()
                })
                .unwrap_or_default();
            attributes.push((attribute.to_string(), language.to_string()));
            let attributes: Vec<(&str, &str)> = attributes.iter().map(|(n, v)| (n.as_str(), v.as_str())).collect();
            properties[index] = P::create(bag, local, &attributes)?;
        },
        None => properties.push(P::create(bag, local, &[(attribute, language)])?),
    }
    Ok(())
}
