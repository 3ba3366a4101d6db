/// DrawingML list styles.
///
/// A list style holds an optional `a:defPPr` and up to nine `a:lvlNpPr`
/// paragraph levels, each with its default run properties (`a:defRPr`).
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::{EndElement, EventReader, QName, StartElement, XmlEvent};
use crate::ooxml::markup::{Markup, MarkupComponent};
use crate::ooxml::parser::parse_paragraph_block_properties;
use crate::ooxml::policy::{SkippableElements, StrippableAttributes, skip_element};
use crate::ooxml::properties::{
    BlockProperty, ParagraphBlockProperties, RunProperties, TraversalStage, is_paragraph_properties,
};

const PARAGRAPH_DEFAULT: &str = "defPPr";
const PARAGRAPH_PROPERTIES: &str = "pPr";
const DEFAULT_RUN_PROPERTIES: &str = "defRPr";

/// The paragraph and run properties of one list level, or of the list
/// defaults (whose id is empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ParagraphLevelStyle {
    id: String,
    paragraph: ParagraphBlockProperties,
    run: RunProperties,
}

impl ParagraphLevelStyle {
    /// Defaults for a list style without `a:defPPr`.
    fn absent(list_style: &QName) -> Self {
        Self {
            id: String::new(),
            paragraph: ParagraphBlockProperties::empty(list_style.sibling(PARAGRAPH_PROPERTIES)),
            run: RunProperties::empty(list_style.sibling(DEFAULT_RUN_PROPERTIES)),
        }
    }

    fn read(start: &StartElement, reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        let mut paragraph = parse_paragraph_block_properties(
            start,
            reader,
            StrippableAttributes::drawing_run_properties(options),
            &mut SkippableElements::Empty,
        )?;
        let mut run = RunProperties::empty(start.name.sibling(DEFAULT_RUN_PROPERTIES));

        // Default run properties are kept normalised, and dropped when empty
        let mut index = 0;
        while index < paragraph.properties().len() {
            let property = &paragraph.properties()[index];
            if property.name().local != DEFAULT_RUN_PROPERTIES {
                index += 1;
                continue;
            }
            run = property.as_run_properties(options)?;
            if run.is_empty() {
                paragraph.properties_mut().remove(index);
            } else {
                paragraph.properties_mut()[index] = BlockProperty::from_run_properties(&run)?;
                index += 1;
            }
        }

        Ok(Self {
            id: level_id(&start.name.local).unwrap_or_default().to_string(),
            paragraph,
            run,
        })
    }

    /// `"1"` to `"9"` for list levels, empty for the list defaults.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn paragraph_properties(&self) -> &ParagraphBlockProperties {
        &self.paragraph
    }

    #[inline]
    pub fn run_properties(&self) -> &RunProperties {
        &self.run
    }

    fn merged_with(&self, other: &ParagraphLevelStyle) -> Result<Self> {
        if self.id != other.id {
            return Err(OoxmlError::InvalidArgument(format!(
                "The provided paragraph level ID does not match with the available one: {} instead of {}",
                other.id, self.id
            )));
        }
        let run = self.run.merged_with(&other.run);
        let mut paragraph = self.paragraph.merged_with(&other.paragraph);
        if let Some(index) = paragraph
            .properties()
            .iter()
            .position(|p| p.name().local == DEFAULT_RUN_PROPERTIES)
        {
            paragraph.properties_mut()[index] = BlockProperty::from_run_properties(&run)?;
        }
        Ok(Self {
            id: self.id.clone(),
            paragraph,
            run,
        })
    }
}

/// The level digit of `lvlNpPr`.
fn level_id(local: &str) -> Option<&str> {
    local.strip_prefix("lvl").and_then(|rest| rest.strip_suffix("pPr"))
}

/// The level style id for a zero-based `lvl` attribute value; absent or
/// malformed values select the first level.
fn paragraph_level(level: Option<&str>) -> String {
    let level = level.and_then(|l| l.parse::<u8>().ok()).map_or(1, |l| l.saturating_add(1));
    level.to_string()
}

/// A parsed DrawingML list style (`a:lstStyle`, `p:titleStyle`,
/// `p:bodyStyle`, `p:otherStyle`, `p:defaultTextStyle`, `p:notesStyle`).
#[derive(Debug, Clone, PartialEq)]
pub struct PowerpointStyleDefinitions {
    start: StartElement,
    defaults: ParagraphLevelStyle,
    has_defaults: bool,
    levels: Vec<ParagraphLevelStyle>,
    end: EndElement,
}

impl PowerpointStyleDefinitions {
    /// Read the list style whose `start` element has just been read.
    pub fn read(start: StartElement, reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        let mut definitions = Self {
            defaults: ParagraphLevelStyle::absent(&start.name),
            has_defaults: false,
            levels: Vec::new(),
            end: start.end(),
            start,
        };
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::EndElement(end) if end.name == definitions.start.name => {
                    definitions.end = end;
                    definitions.levels.sort_by(|a, b| a.id.cmp(&b.id));
                    log::debug!("read {} list levels of {}", definitions.levels.len(), definitions.start.name);
                    return Ok(definitions);
                },
                XmlEvent::StartElement(e) if e.name.local == PARAGRAPH_DEFAULT => {
                    definitions.defaults = ParagraphLevelStyle::read(&e, reader, options)?;
                    definitions.has_defaults = true;
                },
                XmlEvent::StartElement(e) if is_paragraph_properties(&e.name) && level_id(&e.name.local).is_some() => {
                    let level = ParagraphLevelStyle::read(&e, reader, options)?;
                    definitions.place(level);
                },
                XmlEvent::StartElement(e) => skip_element(&e, reader)?,
                _ => {},
            }
        }
        Err(OoxmlError::structure(format!(
            "Unsupported structure of {}",
            definitions.start.name.local
        )))
    }

    fn place(&mut self, level: ParagraphLevelStyle) {
        match self.levels.iter().position(|l| l.id == level.id) {
            Some(index) => self.levels[index] = level,
            None => self.levels.push(level),
        }
    }

    pub fn level(&self, id: &str) -> Option<&ParagraphLevelStyle> {
        self.levels.iter().find(|l| l.id == id)
    }

    #[inline]
    pub fn levels(&self) -> &[ParagraphLevelStyle] {
        &self.levels
    }

    #[inline]
    pub fn defaults(&self) -> &ParagraphLevelStyle {
        &self.defaults
    }

    fn level_or_defaults(&self, level: Option<&str>) -> &ParagraphLevelStyle {
        self.level(&paragraph_level(level)).unwrap_or(&self.defaults)
    }

    /// The level properties overlaid with `properties`, named like them.
    pub fn combined_paragraph_block_properties(&self, properties: &ParagraphBlockProperties) -> ParagraphBlockProperties {
        self.level_or_defaults(properties.paragraph_style())
            .paragraph
            .merged_with(properties)
            .renamed(properties.name().clone())
    }

    pub fn combined_run_properties(&self, level: Option<&str>, properties: &RunProperties) -> RunProperties {
        self.level_or_defaults(level)
            .run
            .clone()
            .combine_distinct(properties, TraversalStage::Direct)
    }

    /// Merge with a more specific list style; levels present in both are
    /// merged with `other` winning.
    pub fn merged_with(&self, other: &PowerpointStyleDefinitions) -> Result<Self> {
        let mut levels = Vec::with_capacity(self.levels.len().max(other.levels.len()));
        for level in &self.levels {
            match other.level(&level.id) {
                Some(theirs) => levels.push(level.merged_with(theirs)?),
                None => levels.push(level.clone()),
            }
        }
        levels.extend(other.levels.iter().filter(|l| self.level(&l.id).is_none()).cloned());
        levels.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(Self {
            start: self.start.clone(),
            defaults: self.defaults.merged_with(&other.defaults)?,
            has_defaults: self.has_defaults || other.has_defaults,
            levels,
            end: self.end.clone(),
        })
    }

    pub fn to_markup(&self) -> Markup {
        let mut markup = Markup::default();
        markup.add_component(MarkupComponent::start(self.start.clone()));
        if self.has_defaults {
            markup.add_component(MarkupComponent::ParagraphBlockProperties(self.defaults.paragraph.clone()));
        }
        for level in &self.levels {
            markup.add_component(MarkupComponent::ParagraphBlockProperties(level.paragraph.clone()));
        }
        markup.add_component(MarkupComponent::end(self.end.clone()));
        markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::dml;
    use crate::ooxml::event::serialize;
    use crate::ooxml::properties::RunProperty;

    const A: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    fn read(xml: &str) -> PowerpointStyleDefinitions {
        let mut reader = EventReader::from_str(xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        PowerpointStyleDefinitions::read(start, &mut reader, &FilterOptions::default()).unwrap()
    }

    fn master() -> PowerpointStyleDefinitions {
        read(&format!(
            r#"<a:lstStyle {A}><a:defPPr><a:defRPr lang="en-US"/></a:defPPr><a:lvl2pPr marL="457200"><a:defRPr sz="2000"/></a:lvl2pPr><a:lvl1pPr marL="0" algn="l"><a:defRPr sz="2400" b="1" dirty="0"><a:latin typeface="Arial"/></a:defRPr></a:lvl1pPr><a:extLst><a:ext uri="x"><a:lvl3pPr/></a:ext></a:extLst></a:lstStyle>"#
        ))
    }

    fn attribute(properties: &RunProperties, local: &str) -> Option<String> {
        properties
            .attribute_properties()
            .find(|p| p.local_name() == local)
            .and_then(RunProperty::value)
            .map(str::to_string)
    }

    #[test]
    fn test_read_levels() {
        let styles = master();
        let ids: Vec<&str> = styles.levels().iter().map(ParagraphLevelStyle::id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        // lang is stripped, leaving empty default run properties behind
        assert!(styles.defaults().run_properties().is_empty());
        assert!(styles.defaults().paragraph_properties().properties().is_empty());
        let first = styles.level("1").unwrap();
        assert_eq!(first.run_properties().count(), 3);
        assert_eq!(attribute(first.run_properties(), "sz").as_deref(), Some("2400"));
    }

    #[test]
    fn test_level_resolution() {
        let styles = master();
        let direct = RunProperties::empty(dml("rPr"));
        assert_eq!(
            attribute(&styles.combined_run_properties(None, &direct), "sz").as_deref(),
            Some("2400")
        );
        assert_eq!(
            attribute(&styles.combined_run_properties(Some("1"), &direct), "sz").as_deref(),
            Some("2000")
        );
        // missing level falls back to the list defaults
        assert!(styles.combined_run_properties(Some("5"), &direct).is_empty());
    }

    #[test]
    fn test_direct_formatting_wins() {
        let styles = master();
        let direct = RunProperties::new(
            StartElement::new(dml("rPr")),
            EndElement::new(dml("rPr")),
            vec![RunProperty::from_attribute(QName::unqualified("sz"), "1200")],
        );
        let combined = styles.combined_run_properties(None, &direct);
        assert_eq!(attribute(&combined, "sz").as_deref(), Some("1200"));
        assert_eq!(attribute(&combined, "b").as_deref(), Some("1"));
    }

    #[test]
    fn test_combined_paragraph_properties_keep_name() {
        let styles = master();
        let start = StartElement::new(dml("pPr")).with_attribute(QName::unqualified("algn"), "ctr");
        let direct = ParagraphBlockProperties::new(crate::ooxml::properties::BlockProperties::new(
            start.clone(),
            start.end(),
            Vec::new(),
        ));
        let combined = styles.combined_paragraph_block_properties(&direct);
        assert_eq!(combined.name(), &dml("pPr"));
        let algn: Vec<&str> = combined
            .attributes()
            .iter()
            .filter(|a| a.name.local == "algn")
            .map(|a| a.value.as_str())
            .collect();
        assert_eq!(algn, vec!["ctr"]);
        assert!(combined.attributes().iter().any(|a| a.name.local == "marL"));
    }

    #[test]
    fn test_merge_levels() {
        let master = master();
        let layout = read(&format!(
            r#"<a:lstStyle {A}><a:lvl1pPr><a:defRPr sz="3200"/></a:lvl1pPr><a:lvl4pPr><a:defRPr i="1"/></a:lvl4pPr></a:lstStyle>"#
        ));
        let merged = master.merged_with(&layout).unwrap();
        let ids: Vec<&str> = merged.levels().iter().map(ParagraphLevelStyle::id).collect();
        assert_eq!(ids, vec!["1", "2", "4"]);
        let first = merged.level("1").unwrap().run_properties();
        assert_eq!(attribute(first, "sz").as_deref(), Some("3200"));
        assert_eq!(attribute(first, "b").as_deref(), Some("1"));
        let markup = serialize(&merged.to_markup().events());
        assert!(markup.contains(r#"<a:defRPr sz="3200" b="1">"#));
    }

    #[test]
    fn test_to_markup() {
        let xml = serialize(&master().to_markup().events());
        assert!(xml.starts_with("<a:lstStyle"));
        assert!(xml.contains(r#"<a:lvl1pPr marL="0" algn="l"><a:defRPr sz="2400" b="1"><a:latin typeface="Arial"/></a:defRPr></a:lvl1pPr>"#));
        assert!(!xml.contains("extLst"));
        assert!(!xml.contains("defPPr"));
    }

    #[test]
    fn test_unterminated_list_style() {
        let xml = format!(r#"<a:lstStyle {A}><a:lvl1pPr/>"#);
        let mut reader = EventReader::from_str(&xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        assert!(PowerpointStyleDefinitions::read(start, &mut reader, &FilterOptions::default()).is_err());
    }
}
