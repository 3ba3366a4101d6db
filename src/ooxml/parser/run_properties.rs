/// Run properties parsing.
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::DRAWING_ML;
use crate::ooxml::event::{EventReader, StartElement, XmlEvent};
use crate::ooxml::policy::{SkippableElements, StrippableAttributes};
use crate::ooxml::properties::{RunProperties, RunProperty};

/// Parse the children of a run properties element.
///
/// `start` must be the event most recently taken from `reader`. Revision
/// and proofing attributes are stripped, and DrawingML attributes become
/// attribute properties. Properties matched by `skippable` are dropped.
pub fn parse_run_properties(
    start: &StartElement,
    reader: &mut EventReader<'_>,
    skippable: &mut SkippableElements,
    options: &FilterOptions,
) -> Result<RunProperties> {
    let mut stripped = StrippableAttributes::WordRunRevisions.strip(start);
    StrippableAttributes::drawing_run_properties(options).strip_in_place(&mut stripped);

    let mut properties: Vec<RunProperty> = Vec::new();
    if stripped.name.is_in(DRAWING_ML) {
        properties.extend(
            stripped
                .attributes
                .iter()
                .map(|a| RunProperty::from_attribute(a.name.clone(), a.value.clone())),
        );
    }

    while let Some(event) = reader.next_event()? {
        match event {
            XmlEvent::EndElement(end) if end.name == stripped.name => {
                return Ok(RunProperties::new(stripped, end, properties));
            },
            XmlEvent::StartElement(e) => {
                if skippable.can_be_skipped(&e, Some(&stripped)) {
                    skippable.skip(&e, reader)?;
                } else {
                    properties.push(RunProperty::from_element(e, reader)?);
                }
            },
            XmlEvent::Characters(text) if !text.chars().all(char::is_whitespace) => {
                return Err(OoxmlError::structure(format!(
                    "Discarding non-whitespace {} characters: {:?}",
                    stripped.name, text
                )));
            },
            _ => {},
        }
    }
    Err(OoxmlError::structure(format!("Unterminated run properties {}", stripped.name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;
    const A: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    fn parse(xml: &str, options: &FilterOptions) -> Result<RunProperties> {
        let mut reader = EventReader::from_str(xml);
        let start = reader.next_event()?.and_then(|e| e.as_start_element().cloned()).unwrap();
        let mut skippable = SkippableElements::run_properties(options);
        parse_run_properties(&start, &mut reader, &mut skippable, options)
    }

    #[test]
    fn test_word_run_properties() {
        let xml = format!(
            r#"<w:rPr {W} w:rsidR="00A1"><w:rStyle w:val="Strong"/> <w:b/><w:lang w:val="en-US"/><w:sz w:val="24"/></w:rPr>"#
        );
        let rpr = parse(&xml, &FilterOptions::default()).unwrap();
        assert_eq!(rpr.count(), 3);
        assert_eq!(rpr.run_style(), Some("Strong"));
        assert!(!rpr.contains_local("lang"));
        assert!(!rpr.start().has_attributes());
    }

    #[test]
    fn test_drawing_attributes_become_properties() {
        let xml = format!(r#"<a:rPr {A} lang="en-US" b="1" sz="1800" dirty="0"><a:latin typeface="Arial"/></a:rPr>"#);
        let rpr = parse(&xml, &FilterOptions::default()).unwrap();
        let names: Vec<&str> = rpr.properties().iter().map(RunProperty::local_name).collect();
        assert_eq!(names, vec!["b", "sz", "latin"]);
    }

    #[test]
    fn test_text_inside_properties_is_an_error() {
        let xml = format!(r#"<w:rPr {W}><w:b/>oops</w:rPr>"#);
        assert!(matches!(
            parse(&xml, &FilterOptions::default()),
            Err(OoxmlError::UnexpectedStructure(_))
        ));
    }

    #[test]
    fn test_unterminated_properties() {
        let options = FilterOptions::default();
        let mut reader = EventReader::from_events(vec![
            XmlEvent::start(crate::ooxml::event::names::wpml("rPr")),
            XmlEvent::start(crate::ooxml::event::names::wpml("b")),
            XmlEvent::end(crate::ooxml::event::names::wpml("b")),
        ]);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        let mut skippable = SkippableElements::run_properties(&options);
        assert!(parse_run_properties(&start, &mut reader, &mut skippable, &options).is_err());
    }
}
