/// Run property bags.
use super::run_property::RunProperty;
use super::TraversalStage;
use crate::ooxml::event::names::{SPREADSHEET_ML, WORDPROCESSING_ML};
use crate::ooxml::event::{Attribute, EndElement, QName, StartElement, XmlEvent};

const VERTICAL_ALIGNMENT: &str = "vertAlign";

/// The ordered properties of a run properties element (`w:rPr`, `a:rPr`,
/// `a:defRPr`, `a:endParaRPr`, SpreadsheetML `rPr`).
///
/// Equality compares the start elements and the property lists in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunProperties {
    start: StartElement,
    end: EndElement,
    properties: Vec<RunProperty>,
}

/// The outcome of combining two same-named properties.
enum Replacement {
    Keep,
    RemoveBoth,
    Set(RunProperty),
}

impl RunProperties {
    pub fn new(start: StartElement, end: EndElement, properties: Vec<RunProperty>) -> Self {
        Self { start, end, properties }
    }

    /// A bag without properties named `name`.
    pub fn empty(name: QName) -> Self {
        let start = StartElement::new(name);
        let end = start.end();
        Self::new(start, end, Vec::new())
    }

    /// A bag with the same element names and no properties.
    pub fn emptied(&self) -> Self {
        Self::new(StartElement::new(self.start.name.clone()), self.end.clone(), Vec::new())
    }

    #[inline]
    pub fn name(&self) -> &QName {
        &self.start.name
    }

    #[inline]
    pub fn start(&self) -> &StartElement {
        &self.start
    }

    #[inline]
    pub fn end(&self) -> &EndElement {
        &self.end
    }

    #[inline]
    pub fn properties(&self) -> &[RunProperty] {
        &self.properties
    }

    #[inline]
    pub fn properties_mut(&mut self) -> &mut Vec<RunProperty> {
        &mut self.properties
    }

    #[inline]
    pub fn into_properties(self) -> Vec<RunProperty> {
        self.properties
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.properties.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn contains_local(&self, local: &str) -> bool {
        self.properties.iter().any(|p| p.local_name() == local)
    }

    pub fn contains_name(&self, name: &QName) -> bool {
        self.properties.iter().any(|p| p.name() == name)
    }

    pub fn contains(&self, property: &RunProperty) -> bool {
        self.properties.contains(property)
    }

    pub fn get(&self, name: &QName) -> Option<&RunProperty> {
        self.properties.iter().find(|p| p.name() == name)
    }

    pub fn run_style_property(&self) -> Option<&RunProperty> {
        self.properties.iter().find(|p| matches!(p, RunProperty::Style(_)))
    }

    /// The `w:rStyle` value.
    pub fn run_style(&self) -> Option<&str> {
        self.run_style_property().and_then(RunProperty::value)
    }

    pub fn highlight(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| matches!(p, RunProperty::Highlight(_)))
            .and_then(RunProperty::value)
    }

    pub fn color(&self) -> Option<&str> {
        self.properties
            .iter()
            .find(|p| matches!(p, RunProperty::Color(_)))
            .and_then(RunProperty::value)
    }

    pub fn attribute_properties(&self) -> impl Iterator<Item = &RunProperty> {
        self.properties.iter().filter(|p| p.is_attribute())
    }

    /// Replace same-named properties with `common` ones, appending the rest.
    pub fn refine(&mut self, common: &[RunProperty]) {
        for property in common {
            match self.properties.iter_mut().find(|p| p.name() == property.name()) {
                Some(existing) => *existing = property.clone(),
                None => self.properties.push(property.clone()),
            }
        }
    }

    /// Remove the properties named like `property`.
    pub fn remove(&mut self, property: &RunProperty) {
        self.properties.retain(|p| p.name() != property.name());
    }

    /// Remove every property named like one of `properties`.
    pub fn remove_all(&mut self, properties: &[RunProperty]) {
        self.properties
            .retain(|p| !properties.iter().any(|r| r.name() == p.name()));
    }

    /// A copy without the selected kinds of properties.
    pub fn copied(&self, strip_vertical_alignment: bool, strip_run_style: bool, strip_toggles: bool) -> Self {
        let properties = self
            .properties
            .iter()
            .filter(|p| !(strip_vertical_alignment && is_vertical_alignment(p)))
            .filter(|p| !(strip_run_style && matches!(p, RunProperty::Style(_))))
            .filter(|p| !(strip_toggles && p.is_toggle()))
            .cloned()
            .collect();
        Self::new(self.start.clone(), self.end.clone(), properties)
    }

    /// A copy holding the toggle properties only.
    pub fn copied_toggle(&self) -> Self {
        let properties = self.properties.iter().filter(|p| p.is_toggle()).cloned().collect();
        Self::new(self.start.clone(), self.end.clone(), properties)
    }

    /// Whether every property has an equal counterpart in `other`.
    ///
    /// An empty bag is a subset of every bag.
    pub fn is_subset_of(&self, other: &RunProperties) -> bool {
        self.properties.iter().all(|p| other.properties.contains(p))
    }

    /// Overlay `other` onto this bag.
    ///
    /// Same-named properties from `other` replace ours, the rest of
    /// `other` is appended. Toggles follow the cascade rules of `stage`:
    /// between two styles, equal toggles cancel each other out and an
    /// enabled toggle survives a disabled one; over document defaults an
    /// enabled toggle is kept.
    pub fn combine_distinct(mut self, other: &RunProperties, stage: TraversalStage) -> Self {
        let mut remaining = other.properties.clone();
        let mut index = 0;
        while index < self.properties.len() && !remaining.is_empty() {
            let Some(position) = remaining
                .iter()
                .position(|o| o.name() == self.properties[index].name())
            else {
                index += 1;
                continue;
            };
            let replacement = remaining.remove(position);
            match replace(&self.properties[index], replacement, stage) {
                Replacement::Keep => index += 1,
                Replacement::RemoveBoth => {
                    self.properties.remove(index);
                },
                Replacement::Set(property) => {
                    self.properties[index] = property;
                    index += 1;
                },
            }
        }
        self.properties.extend(remaining);
        self
    }

    /// This bag overlaid with `other` as direct formatting.
    pub fn merged_with(&self, other: &RunProperties) -> Self {
        self.clone().combine_distinct(other, TraversalStage::Direct)
    }

    /// The properties not already implied by `pre_combined`.
    ///
    /// A property is dropped when `pre_combined` holds an equal one, or when
    /// it carries a default "off" value that nothing above overrides.
    /// SpreadsheetML properties are always kept.
    pub fn minified(&self, pre_combined: &RunProperties) -> Self {
        let properties = self
            .properties
            .iter()
            .filter(|p| {
                matches!(p, RunProperty::Sml(_))
                    || !(pre_combined.contains(p)
                        || (is_default_off(p) && !pre_combined.contains_name(p.name())))
            })
            .cloned()
            .collect();
        Self::new(StartElement::new(self.start.name.clone()), self.end.clone(), properties)
    }

    /// The markup of this bag; nothing when empty.
    ///
    /// Attribute properties become attributes of the start element.
    pub fn events(&self) -> Vec<XmlEvent> {
        if self.properties.is_empty() {
            return Vec::new();
        }
        let mut start = StartElement::new(self.start.name.clone()).with_attributes(
            self.properties.iter().filter_map(|p| match p {
                RunProperty::Attribute(a) | RunProperty::BooleanAttribute(a) => {
                    Some(Attribute::new(a.name.clone(), a.value.clone()))
                },
                _ => None,
            }),
        );
        start.namespaces = self.start.namespaces.clone();

        let mut events = vec![XmlEvent::StartElement(start)];
        for property in &self.properties {
            events.extend_from_slice(property.events());
        }
        events.push(XmlEvent::EndElement(self.end.clone()));
        events
    }
}

fn is_vertical_alignment(property: &RunProperty) -> bool {
    matches!(property, RunProperty::Generic(_))
        && property.local_name() == VERTICAL_ALIGNMENT
        && (property.name().is_in(WORDPROCESSING_ML) || property.name().is_in(SPREADSHEET_ML))
}

fn replace(current: &RunProperty, other: RunProperty, stage: TraversalStage) -> Replacement {
    if let (Some(own), Some(theirs)) = (current.toggle_value(), other.toggle_value())
        && current.is_toggle()
    {
        match stage {
            TraversalStage::Vertical if own == theirs => return Replacement::RemoveBoth,
            TraversalStage::Vertical | TraversalStage::DocumentDefault if own => return Replacement::Keep,
            _ => {},
        }
    }
    Replacement::Set(other)
}

fn is_default_off(property: &RunProperty) -> bool {
    if let Some(enabled) = property.toggle_value() {
        return !enabled;
    }
    let Some(value) = property.value() else {
        return false;
    };
    match property.local_name() {
        "brd" | "effect" | "em" | "highlight" | "u" | "cap" | "scheme" => value == "none" || value == "nil",
        "kern" | "position" | "baseline" | "spc" => value == "0",
        "w" => value == "100",
        "vertAlign" => value == "baseline",
        "strike" => value == "noStrike",
        _ => false,
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::ooxml::event::names::wpml;
    use proptest::prelude::*;

    fn property() -> impl Strategy<Value = RunProperty> {
        (prop::sample::select(vec!["b", "i", "sz", "color", "u", "kern"]), "[0-9A-F]{1,4}").prop_map(|(local, value)| {
            RunProperty::from_events(vec![
                StartElement::new(wpml(local)).with_attribute(wpml("val"), value).into(),
                XmlEvent::end(wpml(local)),
            ])
            .unwrap()
        })
    }

    fn bag() -> impl Strategy<Value = RunProperties> {
        prop::collection::vec(property(), 0..6).prop_map(|properties| {
            RunProperties::new(StartElement::new(wpml("rPr")), EndElement::new(wpml("rPr")), properties)
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_subset_is_reflexive(a in bag()) {
            prop_assert!(a.is_subset_of(&a));
        }

        #[test]
        fn prop_differing_value_is_not_subset(a in bag(), b in bag()) {
            let differs = a.properties().iter().any(|p| {
                b.get(p.name()).is_some_and(|q| q != p) && !b.contains(p)
            });
            if differs {
                prop_assert!(!a.is_subset_of(&b));
            }
        }

        #[test]
        fn prop_merge_keeps_direct_values(a in bag(), b in bag()) {
            let merged = a.merged_with(&b);
            for p in b.properties() {
                prop_assert!(merged.properties().iter().any(|m| m.name() == p.name()));
            }
        }
    }
}
