/// Direction attributes of start elements.
use super::{ClarificationContext, FALSE_VALUE, TRUE_VALUE, TRUE_VALUES};
use crate::ooxml::event::names::LOCAL_RTL;
use crate::ooxml::event::{Attribute, Attributes, QName, parse_boolean};

const DRAWING_ALIGNMENT: &str = "algn";
const DRAWING_ALIGNMENT_LEFT: &str = "l";
const DRAWING_ALIGNMENT_RIGHT: &str = "r";

/// An unqualified attribute and the values that mean right-to-left; the
/// first value is the one written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClarifiableAttribute {
    pub local: &'static str,
    pub values: &'static [&'static str],
}

impl ClarifiableAttribute {
    pub const fn new(local: &'static str, values: &'static [&'static str]) -> Self {
        Self { local, values }
    }

    /// A boolean attribute, `1` when right-to-left.
    pub const fn boolean(local: &'static str) -> Self {
        Self::new(local, TRUE_VALUES)
    }

    fn required(&self) -> Attribute {
        Attribute::new(QName::unqualified(self.local), self.values.first().copied().unwrap_or(TRUE_VALUE))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributesClarification {
    Bypass,
    /// The attribute is present with a right-to-left value exactly when
    /// the target is right-to-left.
    Default(ClarifiableAttribute),
    /// DrawingML paragraph alignment and direction: switching direction
    /// mirrors a left or right alignment so that the text keeps its side.
    AlignmentAndRtl,
}

impl AttributesClarification {
    pub fn perform_for(&self, attributes: &mut Attributes, context: &ClarificationContext) {
        match self {
            AttributesClarification::Bypass => {},
            AttributesClarification::Default(clarifiable) => clarify_default(clarifiable, attributes, context),
            AttributesClarification::AlignmentAndRtl => clarify_alignment_and_rtl(attributes, context),
        }
    }
}

fn clarify_default(clarifiable: &ClarifiableAttribute, attributes: &mut Attributes, context: &ClarificationContext) {
    match attributes.iter().position(|a| a.name.local == clarifiable.local) {
        Some(index) if !context.target_rtl() => {
            attributes.remove(index);
        },
        Some(index) => {
            if !clarifiable.values.contains(&attributes[index].value.as_str()) {
                attributes[index] = clarifiable.required();
            }
        },
        None if context.target_rtl() => attributes.push(clarifiable.required()),
        None => {},
    }
}

fn clarify_alignment_and_rtl(attributes: &mut Attributes, context: &ClarificationContext) {
    if context.directions_match() {
        return;
    }
    let combined = context.combined_paragraph_properties();
    let combined_value = |local: &str| {
        combined.and_then(|p| {
            p.attributes()
                .iter()
                .find(|a| a.name.local == local)
                .map(|a| a.value.clone())
        })
    };
    let alignment = combined_value(DRAWING_ALIGNMENT).unwrap_or_else(|| DRAWING_ALIGNMENT_LEFT.to_string());
    let rtl = combined_value(LOCAL_RTL).map_or(Some(false), |v| parse_boolean(&v));

    let flips = match rtl {
        Some(false) => context.target_rtl(),
        Some(true) => !context.target_rtl(),
        None => false,
    };
    if !flips {
        return;
    }
    let mirrored = match alignment.as_str() {
        DRAWING_ALIGNMENT_LEFT => Some(DRAWING_ALIGNMENT_RIGHT),
        DRAWING_ALIGNMENT_RIGHT => Some(DRAWING_ALIGNMENT_LEFT),
        _ => None,
    };
    if let Some(mirrored) = mirrored {
        set_attribute(attributes, DRAWING_ALIGNMENT, mirrored);
    }
    let direction = if context.target_rtl() { TRUE_VALUE } else { FALSE_VALUE };
    set_attribute(attributes, LOCAL_RTL, direction);
}

/// Replace the value of the attribute named `local`, or add it.
fn set_attribute(attributes: &mut Attributes, local: &str, value: &str) {
    match attributes.iter_mut().find(|a| a.name.local == local) {
        Some(attribute) => attribute.value = value.to_string(),
        None => attributes.push(Attribute::new(QName::unqualified(local), value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::StartElement;
    use crate::ooxml::event::names::dml;
    use crate::ooxml::properties::{BlockProperties, ParagraphBlockProperties};

    fn rtl_attribute() -> AttributesClarification {
        AttributesClarification::Default(ClarifiableAttribute::boolean("rtl"))
    }

    fn values(attributes: &Attributes) -> Vec<(String, String)> {
        attributes
            .iter()
            .map(|a| (a.name.local.clone(), a.value.clone()))
            .collect()
    }

    #[test]
    fn test_default_adds_for_rtl_target() {
        let context = ClarificationContext::new("ar").with_target_rtl(true);
        let mut attributes = Attributes::new();
        rtl_attribute().perform_for(&mut attributes, &context);
        assert_eq!(values(&attributes), vec![("rtl".to_string(), "1".to_string())]);

        // An accepted value is kept as is
        let mut attributes = StartElement::new(dml("tblPr"))
            .with_attribute(QName::unqualified("rtl"), "true")
            .attributes;
        rtl_attribute().perform_for(&mut attributes, &context);
        assert_eq!(attributes[0].value, "true");
    }

    #[test]
    fn test_default_removes_for_ltr_target() {
        let context = ClarificationContext::new("en").with_source_rtl(true);
        let mut attributes = StartElement::new(dml("tblPr"))
            .with_attribute(QName::unqualified("rtl"), "1")
            .with_attribute(QName::unqualified("bandRow"), "1")
            .attributes;
        rtl_attribute().perform_for(&mut attributes, &context);
        assert_eq!(values(&attributes), vec![("bandRow".to_string(), "1".to_string())]);
    }

    #[test]
    fn test_reading_order_value_replaced() {
        let context = ClarificationContext::new("he").with_target_rtl(true);
        let clarification = AttributesClarification::Default(ClarifiableAttribute::new("readingOrder", &["2"]));
        let mut attributes = StartElement::new(QName::unqualified("alignment"))
            .with_attribute(QName::unqualified("readingOrder"), "1")
            .attributes;
        clarification.perform_for(&mut attributes, &context);
        assert_eq!(attributes[0].value, "2");
    }

    #[test]
    fn test_alignment_mirrored() {
        let mut context = ClarificationContext::new("ar").with_target_rtl(true);
        let mut properties = BlockProperties::empty(dml("pPr"));
        properties.set_attributes([Attribute::new(QName::unqualified("algn"), "r")]);
        context.adjust_combined_paragraph_properties_for(&ParagraphBlockProperties::new(properties.clone()));

        let mut attributes = properties.attributes().iter().cloned().collect::<Attributes>();
        AttributesClarification::AlignmentAndRtl.perform_for(&mut attributes, &context);
        assert_eq!(
            values(&attributes),
            vec![("algn".to_string(), "l".to_string()), ("rtl".to_string(), "1".to_string())]
        );
    }

    #[test]
    fn test_centered_keeps_alignment() {
        let mut context = ClarificationContext::new("en").with_source_rtl(true);
        let mut properties = BlockProperties::empty(dml("pPr"));
        properties.set_attributes([
            Attribute::new(QName::unqualified("algn"), "ctr"),
            Attribute::new(QName::unqualified("rtl"), "1"),
        ]);
        context.adjust_combined_paragraph_properties_for(&ParagraphBlockProperties::new(properties.clone()));

        let mut attributes = properties.attributes().iter().cloned().collect::<Attributes>();
        AttributesClarification::AlignmentAndRtl.perform_for(&mut attributes, &context);
        assert_eq!(
            values(&attributes),
            vec![("algn".to_string(), "ctr".to_string()), ("rtl".to_string(), "0".to_string())]
        );
    }

    #[test]
    fn test_same_direction_untouched() {
        let context = ClarificationContext::new("fr");
        let mut attributes = Attributes::new();
        AttributesClarification::AlignmentAndRtl.perform_for(&mut attributes, &context);
        assert!(attributes.is_empty());
    }
}
