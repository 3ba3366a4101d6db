/// Slide master text styles (`p:txStyles`).
use super::StyleDefinitions;
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::{EventReader, StartElement, XmlEvent};

const TITLE_STYLE: &str = "titleStyle";
const BODY_STYLE: &str = "bodyStyle";
const OTHER_STYLE: &str = "otherStyle";

static EMPTY: StyleDefinitions = StyleDefinitions::Empty;

/// The list styles a slide master defines for its placeholder kinds.
#[derive(Debug, Clone, Default)]
pub enum TextStyleDefinitions {
    #[default]
    Empty,
    Default {
        title: Option<StyleDefinitions>,
        body: Option<StyleDefinitions>,
        other: Option<StyleDefinitions>,
    },
}

impl TextStyleDefinitions {
    /// Read `p:txStyles`, whose start element has just been read.
    pub fn read(start: &StartElement, reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        let (mut title, mut body, mut other) = (None, None, None);
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::EndElement(end) if end.name == start.name => {
                    return Ok(TextStyleDefinitions::Default { title, body, other });
                },
                XmlEvent::StartElement(e) => {
                    let slot = match e.name.local.as_str() {
                        TITLE_STYLE => &mut title,
                        BODY_STYLE => &mut body,
                        OTHER_STYLE => &mut other,
                        _ => continue,
                    };
                    *slot = Some(StyleDefinitions::read_powerpoint(e, reader, options)?);
                },
                _ => {},
            }
        }
        Err(OoxmlError::structure(format!("Unterminated {}", start.name)))
    }

    /// The list style for a placeholder type (`p:ph/@type`).
    pub fn style_for(&self, placeholder_type: &str) -> &StyleDefinitions {
        let TextStyleDefinitions::Default { title, body, other } = self else {
            return &EMPTY;
        };
        let style = match placeholder_type {
            "title" | "ctrTitle" => title,
            "subTitle" | "body" => body,
            _ => other,
        };
        style.as_ref().unwrap_or(&EMPTY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TX_STYLES: &str = r#"<p:txStyles xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><p:titleStyle><a:lvl1pPr algn="ctr"><a:defRPr sz="4400"/></a:lvl1pPr></p:titleStyle><p:bodyStyle><a:lvl1pPr marL="0"><a:defRPr sz="2800"/></a:lvl1pPr></p:bodyStyle></p:txStyles>"#;

    fn read() -> TextStyleDefinitions {
        let mut reader = EventReader::from_str(TX_STYLES);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        TextStyleDefinitions::read(&start, &mut reader, &FilterOptions::default()).unwrap()
    }

    #[test]
    fn test_placeholder_types() {
        let styles = read();
        assert!(matches!(styles.style_for("ctrTitle"), StyleDefinitions::Powerpoint(_)));
        assert!(matches!(styles.style_for("subTitle"), StyleDefinitions::Powerpoint(_)));
        assert!(styles.style_for("dt").is_empty());
        assert!(TextStyleDefinitions::Empty.style_for("title").is_empty());
    }

    #[test]
    fn test_title_level() {
        let styles = read();
        let StyleDefinitions::Powerpoint(title) = styles.style_for("title") else {
            panic!("title style expected");
        };
        assert_eq!(title.levels().len(), 1);
        assert_eq!(title.level("1").unwrap().run_properties().count(), 1);
    }
}
