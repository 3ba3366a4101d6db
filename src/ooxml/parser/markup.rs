/// Markup component parsing.
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::{EventReader, StartElement, XmlEvent};
use crate::ooxml::markup::MarkupComponent;
use crate::ooxml::policy::{SkippableElements, StrippableAttributes};
use crate::ooxml::properties::{BlockProperties, BlockProperty, ParagraphBlockProperties, is_paragraph_properties};

const RUN_PROPERTIES: &str = "rPr";
const DEFAULT_RUN_PROPERTIES: &str = "defRPr";

/// Read the end of an element expected to be empty.
pub fn parse_empty_element(start: StartElement, reader: &mut EventReader<'_>) -> Result<MarkupComponent> {
    match reader.next_event()? {
        Some(XmlEvent::EndElement(end)) if end.name == start.name => Ok(MarkupComponent::EmptyElement(start)),
        _ => Err(OoxmlError::structure(format!("Expected an empty element {}", start.name))),
    }
}

/// Parse a block properties element.
///
/// Children matched by `skippable` are dropped, also when nested one level
/// down (`w:rPr` inside `w:pPr`). `strippable` cleans the start elements of
/// the children. Empty run properties children are dropped.
pub fn parse_block_properties(
    start: &StartElement,
    reader: &mut EventReader<'_>,
    strippable: StrippableAttributes,
    skippable: &mut SkippableElements,
) -> Result<BlockProperties> {
    let mut properties = Vec::new();
    while let Some(event) = reader.next_event()? {
        match event {
            XmlEvent::EndElement(end) if end.name == start.name => {
                return Ok(BlockProperties::new(start.clone(), end, properties));
            },
            XmlEvent::StartElement(e) => {
                if skippable.can_be_skipped(&e, Some(start)) {
                    skippable.skip(&e, reader)?;
                    continue;
                }
                let property = BlockProperty::new(gather_without_skippable(e, reader, strippable, skippable)?)?;
                if !is_empty_run_properties(&property) {
                    properties.push(property);
                }
            },
            _ => {},
        }
    }
    Err(OoxmlError::structure(format!("Unterminated block properties {}", start.name)))
}

/// Parse paragraph properties (`w:pPr`, `a:pPr`, `a:lvlNpPr`, `a:defPPr`).
pub fn parse_paragraph_block_properties(
    start: &StartElement,
    reader: &mut EventReader<'_>,
    strippable: StrippableAttributes,
    skippable: &mut SkippableElements,
) -> Result<ParagraphBlockProperties> {
    if !is_paragraph_properties(&start.name) {
        return Err(OoxmlError::illegal_state(format!("{} are not paragraph properties", start.name)));
    }
    parse_block_properties(start, reader, strippable, skippable).map(ParagraphBlockProperties::new)
}

fn gather_without_skippable(
    start: StartElement,
    reader: &mut EventReader<'_>,
    strippable: StrippableAttributes,
    skippable: &mut SkippableElements,
) -> Result<Vec<XmlEvent>> {
    let parent = strippable.strip(&start);
    let mut events = vec![XmlEvent::StartElement(parent.clone())];
    let mut depth = 0usize;
    while let Some(event) = reader.next_event()? {
        match &event {
            XmlEvent::StartElement(e) if skippable.can_be_skipped(e, Some(&parent)) => {
                skippable.skip(e, reader)?;
                continue;
            },
            XmlEvent::StartElement(e) if e.name == parent.name => depth += 1,
            XmlEvent::EndElement(e) if e.name == parent.name => {
                if depth == 0 {
                    events.push(event);
                    return Ok(events);
                }
                depth -= 1;
            },
            _ => {},
        }
        events.push(event);
    }
    Err(OoxmlError::structure(format!("Unterminated block property {}", parent.name)))
}

fn is_empty_run_properties(property: &BlockProperty) -> bool {
    matches!(property.name().local.as_str(), RUN_PROPERTIES | DEFAULT_RUN_PROPERTIES)
        && !property.start().has_attributes()
        && property.events()[1..property.events().len().saturating_sub(1)]
            .iter()
            .all(XmlEvent::is_whitespace)
}
