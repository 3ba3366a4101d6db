/// WordprocessingML style sheets (`styles.xml`).
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{
    LOCAL_BIDI_VISUAL, LOCAL_DOC_DEFAULTS, LOCAL_LANG, LOCAL_NAME, LOCAL_PARAGRAPH_PROPERTIES_DEFAULT,
    LOCAL_RUN_PROPERTIES_DEFAULT, LOCAL_STYLE, LOCAL_STYLES, LOCAL_TYPE, LOCAL_VAL,
};
use crate::ooxml::event::{EndElement, EventReader, QName, StartElement, XmlEvent, gather_element, parse_boolean};
use crate::ooxml::markup::{Markup, MarkupComponent};
use crate::ooxml::parser::{parse_block_properties, parse_paragraph_block_properties, parse_run_properties};
use crate::ooxml::policy::{SkippableElements, StrippableAttributes};
use crate::ooxml::properties::{
    BlockProperties, ParagraphBlockProperties, RunProperties, TABLE_PROPERTIES, TraversalStage,
};
use crate::ooxml::styles::StyleDefinitions;
use std::collections::HashMap;

const LATENT_STYLES: &str = "latentStyles";
const STYLE_ID: &str = "styleId";
const DEFAULT: &str = "default";
const BASED_ON: &str = "basedOn";
const LINK: &str = "link";
const PARAGRAPH_PROPERTIES: &str = "pPr";
const RUN_PROPERTIES: &str = "rPr";
const GENERATED_ID_PREFIX: &str = "style";

/// The `w:type` of a style. Unknown types are read as paragraph styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleType {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleType {
    pub fn from_value(value: Option<&str>) -> Self {
        match value {
            Some("character") => StyleType::Character,
            Some("table") => StyleType::Table,
            Some("numbering") => StyleType::Numbering,
            _ => StyleType::Paragraph,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StyleType::Paragraph => "paragraph",
            StyleType::Character => "character",
            StyleType::Table => "table",
            StyleType::Numbering => "numbering",
        }
    }
}

/// One `w:style` element.
///
/// Markup other than the parsed properties is kept in place so that the
/// style writes back as read.
#[derive(Debug, Clone, PartialEq)]
pub struct WordStyle {
    start: StartElement,
    id: String,
    style_type: StyleType,
    default: bool,
    parent: Option<String>,
    linked: Option<String>,
    before_paragraph: Vec<XmlEvent>,
    paragraph: ParagraphBlockProperties,
    before_run: Vec<XmlEvent>,
    run: RunProperties,
    before_table: Vec<XmlEvent>,
    table: Option<BlockProperties>,
    before_end: Vec<XmlEvent>,
    end: EndElement,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Paragraph,
    Run,
    Table,
    End,
}

impl WordStyle {
    fn read(start: StartElement, reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        let name = start.name.clone();
        let style_type = StyleType::from_value(start.attribute(&name.sibling(LOCAL_TYPE)));
        let mut style = WordStyle {
            id: start.attribute(&name.sibling(STYLE_ID)).unwrap_or_default().to_string(),
            default: start
                .attribute(&name.sibling(DEFAULT))
                .and_then(parse_boolean)
                .unwrap_or(false),
            style_type,
            parent: None,
            linked: None,
            before_paragraph: Vec::new(),
            paragraph: ParagraphBlockProperties::empty(name.sibling(PARAGRAPH_PROPERTIES)),
            before_run: Vec::new(),
            run: RunProperties::empty(name.sibling(RUN_PROPERTIES)),
            before_table: Vec::new(),
            table: (style_type == StyleType::Table).then(|| BlockProperties::empty(name.sibling(TABLE_PROPERTIES))),
            before_end: Vec::new(),
            end: start.end(),
            start,
        };

        let mut section = Section::Paragraph;
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::EndElement(end) if end.name == name => {
                    style.end = end;
                    return Ok(style);
                },
                XmlEvent::StartElement(e) if e.name.local == PARAGRAPH_PROPERTIES => {
                    let mut skippable = SkippableElements::property(
                        vec![e.name.sibling(LOCAL_BIDI_VISUAL), e.name.sibling(LOCAL_LANG)],
                        options,
                    );
                    style.paragraph = parse_paragraph_block_properties(
                        &e,
                        reader,
                        StrippableAttributes::drawing_run_properties(options),
                        &mut skippable,
                    )?;
                    section = section.max(Section::Run);
                },
                XmlEvent::StartElement(e) if e.name.local == RUN_PROPERTIES => {
                    let mut skippable = SkippableElements::run_properties(options);
                    style.run = parse_run_properties(&e, reader, &mut skippable, options)?;
                    section = section.max(Section::Table);
                },
                XmlEvent::StartElement(e) if e.name.local == TABLE_PROPERTIES => {
                    let mut skippable = SkippableElements::block_properties(options);
                    style.table = Some(parse_block_properties(
                        &e,
                        reader,
                        StrippableAttributes::WordParagraphRevisions,
                        &mut skippable,
                    )?);
                    section = Section::End;
                },
                XmlEvent::StartElement(e) => {
                    match e.name.local.as_str() {
                        BASED_ON => style.parent = e.attribute(&e.name.sibling(LOCAL_VAL)).map(str::to_string),
                        LINK => style.linked = e.attribute(&e.name.sibling(LOCAL_VAL)).map(str::to_string),
                        _ => {},
                    }
                    let events = gather_element(e, reader)?;
                    style.bucket(section).extend(events);
                },
                other => style.bucket(section).push(other),
            }
        }
        Err(OoxmlError::structure(format!("Unterminated style {}", style.id)))
    }

    /// A paragraph style created to hold hoisted properties.
    fn created(styles: &StartElement, id: &str, parent: Option<&str>, run: &RunProperties) -> Self {
        let style_name = styles.name.sibling(LOCAL_STYLE);
        let start = StartElement::new(style_name.clone())
            .with_attribute(style_name.sibling(LOCAL_TYPE), StyleType::Paragraph.as_str())
            .with_attribute(style_name.sibling(STYLE_ID), id);

        let mut before_paragraph = value_element(&style_name, LOCAL_NAME, id).to_vec();
        if let Some(parent) = parent {
            before_paragraph.extend(value_element(&style_name, BASED_ON, parent));
        }

        WordStyle {
            end: start.end(),
            start,
            id: id.to_string(),
            style_type: StyleType::Paragraph,
            default: false,
            parent: parent.map(str::to_string),
            linked: None,
            before_paragraph,
            paragraph: ParagraphBlockProperties::empty(style_name.sibling(PARAGRAPH_PROPERTIES)),
            before_run: Vec::new(),
            run: run.clone(),
            before_table: Vec::new(),
            table: None,
            before_end: Vec::new(),
        }
    }

    /// This style overridden by `other` of the same id: the markup of
    /// `other` is kept, its properties replace same-named ones of ours.
    fn merged_with(&self, other: &WordStyle) -> Self {
        WordStyle {
            parent: other.parent.clone().or_else(|| self.parent.clone()),
            linked: other.linked.clone().or_else(|| self.linked.clone()),
            paragraph: self.paragraph.merged_with(&other.paragraph),
            run: self.run.merged_with(&other.run),
            table: other.table.clone().or_else(|| self.table.clone()),
            ..other.clone()
        }
    }

    fn bucket(&mut self, section: Section) -> &mut Vec<XmlEvent> {
        match section {
            Section::Paragraph => &mut self.before_paragraph,
            Section::Run => &mut self.before_run,
            Section::Table => &mut self.before_table,
            Section::End => &mut self.before_end,
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn style_type(&self) -> StyleType {
        self.style_type
    }

    #[inline]
    pub fn is_default(&self) -> bool {
        self.default
    }

    /// The `w:basedOn` style id.
    #[inline]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// The `w:link` style id.
    #[inline]
    pub fn linked(&self) -> Option<&str> {
        self.linked.as_deref()
    }

    #[inline]
    pub fn paragraph_properties(&self) -> &ParagraphBlockProperties {
        &self.paragraph
    }

    #[inline]
    pub fn run_properties(&self) -> &RunProperties {
        &self.run
    }

    #[inline]
    pub fn table_properties(&self) -> Option<&BlockProperties> {
        self.table.as_ref()
    }

    pub fn to_markup(&self) -> Markup {
        let mut markup = Markup::default();
        markup.add_component(MarkupComponent::start(self.start.clone()));
        push_general(&mut markup, &self.before_paragraph);
        markup.add_component(MarkupComponent::ParagraphBlockProperties(self.paragraph.clone()));
        push_general(&mut markup, &self.before_run);
        markup.add_component(MarkupComponent::RunProperties(self.run.clone()));
        push_general(&mut markup, &self.before_table);
        if let Some(table) = &self.table {
            markup.add_component(MarkupComponent::BlockProperties(table.clone()));
        }
        push_general(&mut markup, &self.before_end);
        markup.add_component(MarkupComponent::end(self.end.clone()));
        markup
    }
}

/// `<w:{local} w:val="{value}"/>`
fn value_element(sibling: &QName, local: &str, value: &str) -> [XmlEvent; 2] {
    let element = StartElement::new(sibling.sibling(local)).with_attribute(sibling.sibling(LOCAL_VAL), value);
    let end = element.end();
    [XmlEvent::StartElement(element), XmlEvent::EndElement(end)]
}

fn push_general(markup: &mut Markup, events: &[XmlEvent]) {
    if !events.is_empty() {
        markup.add_component(MarkupComponent::General(events.to_vec()));
    }
}

/// `w:docDefaults`: the paragraph and run properties every style starts from.
#[derive(Debug, Clone, PartialEq)]
struct DocumentDefaults {
    start: Option<StartElement>,
    paragraph_default: Option<(StartElement, EndElement)>,
    paragraph: ParagraphBlockProperties,
    run_default: Option<(StartElement, EndElement)>,
    run: RunProperties,
}

impl DocumentDefaults {
    fn absent(styles: &QName) -> Self {
        Self {
            start: None,
            paragraph_default: None,
            paragraph: ParagraphBlockProperties::empty(styles.sibling(PARAGRAPH_PROPERTIES)),
            run_default: None,
            run: RunProperties::empty(styles.sibling(RUN_PROPERTIES)),
        }
    }

    fn read(start: StartElement, reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        let mut defaults = Self::absent(&start.name);
        let mut paragraph_default = None;
        let mut run_default = None;
        while let Some(event) = reader.next_event()? {
            match event {
                XmlEvent::EndElement(end) if end.name == start.name => {
                    defaults.start = Some(start);
                    return Ok(defaults);
                },
                XmlEvent::StartElement(e) if e.name.local == LOCAL_PARAGRAPH_PROPERTIES_DEFAULT => {
                    paragraph_default = Some(e);
                },
                XmlEvent::EndElement(e) if e.name.local == LOCAL_PARAGRAPH_PROPERTIES_DEFAULT => {
                    defaults.paragraph_default = paragraph_default.take().map(|s| (s, e));
                },
                XmlEvent::StartElement(e) if e.name.local == LOCAL_RUN_PROPERTIES_DEFAULT => {
                    run_default = Some(e);
                },
                XmlEvent::EndElement(e) if e.name.local == LOCAL_RUN_PROPERTIES_DEFAULT => {
                    defaults.run_default = run_default.take().map(|s| (s, e));
                },
                XmlEvent::StartElement(e) if e.name.local == PARAGRAPH_PROPERTIES => {
                    let mut skippable = SkippableElements::property(
                        vec![e.name.sibling(LOCAL_BIDI_VISUAL), e.name.sibling(LOCAL_LANG)],
                        options,
                    );
                    defaults.paragraph = parse_paragraph_block_properties(
                        &e,
                        reader,
                        StrippableAttributes::drawing_run_properties(options),
                        &mut skippable,
                    )?;
                },
                XmlEvent::StartElement(e) if e.name.local == RUN_PROPERTIES => {
                    let mut skippable = SkippableElements::run_properties(options);
                    defaults.run = parse_run_properties(&e, reader, &mut skippable, options)?;
                },
                _ => {},
            }
        }
        Err(OoxmlError::structure("Unterminated document defaults"))
    }

    fn merged_with(&self, other: &DocumentDefaults) -> Self {
        Self {
            start: other.start.clone().or_else(|| self.start.clone()),
            paragraph_default: other.paragraph_default.clone().or_else(|| self.paragraph_default.clone()),
            paragraph: self.paragraph.merged_with(&other.paragraph),
            run_default: other.run_default.clone().or_else(|| self.run_default.clone()),
            run: self.run.merged_with(&other.run),
        }
    }

    fn to_markup(&self) -> Markup {
        let mut markup = Markup::default();
        let Some(start) = &self.start else {
            return markup;
        };
        markup.add_component(MarkupComponent::start(start.clone()));
        if let Some((start, end)) = &self.paragraph_default {
            markup.add_component(MarkupComponent::paragraph_start(
                start.clone(),
                StyleDefinitions::Empty.shared(),
            ));
            markup.add_component(MarkupComponent::ParagraphBlockProperties(self.paragraph.clone()));
            markup.add_component(MarkupComponent::end(end.clone()));
        }
        if let Some((start, end)) = &self.run_default {
            markup.add_component(MarkupComponent::start(start.clone()));
            markup.add_component(MarkupComponent::RunProperties(self.run.clone()));
            markup.add_component(MarkupComponent::end(end.clone()));
        }
        markup.add_component(MarkupComponent::end(start.end()));
        markup
    }
}

/// A parsed Word style sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct WordStyleDefinitions {
    prolog: Vec<XmlEvent>,
    start: StartElement,
    defaults: DocumentDefaults,
    latent: Vec<XmlEvent>,
    styles: Vec<WordStyle>,
    index: HashMap<String, usize>,
    default_styles: HashMap<StyleType, String>,
    end: EndElement,
    epilog: Vec<XmlEvent>,
    placed_id: Option<String>,
}

impl WordStyleDefinitions {
    /// Read a whole `styles.xml` part.
    pub fn read(reader: &mut EventReader<'_>, options: &FilterOptions) -> Result<Self> {
        let mut prolog = Vec::new();
        let start = loop {
            match reader.next_event()? {
                Some(XmlEvent::StartElement(e)) if e.name.local == LOCAL_STYLES => break e,
                Some(event) => prolog.push(event),
                None => return Err(OoxmlError::structure("Unexpected styles structure: the start element is absent")),
            }
        };

        let mut definitions = WordStyleDefinitions {
            prolog,
            defaults: DocumentDefaults::absent(&start.name),
            latent: Vec::new(),
            styles: Vec::new(),
            index: HashMap::new(),
            default_styles: HashMap::new(),
            end: start.end(),
            epilog: Vec::new(),
            placed_id: None,
            start,
        };

        loop {
            match reader.next_event()? {
                Some(XmlEvent::EndElement(end)) if end.name == definitions.start.name => {
                    definitions.end = end;
                    break;
                },
                Some(XmlEvent::StartElement(e)) if e.name.local == LOCAL_DOC_DEFAULTS => {
                    definitions.defaults = DocumentDefaults::read(e, reader, options)?;
                },
                Some(XmlEvent::StartElement(e)) if e.name.local == LATENT_STYLES => {
                    definitions.latent = gather_element(e, reader)?;
                },
                Some(XmlEvent::StartElement(e)) if e.name.local == LOCAL_STYLE => {
                    let style = WordStyle::read(e, reader, options)?;
                    definitions.insert(style);
                },
                Some(XmlEvent::StartElement(e)) => {
                    gather_element(e, reader)?;
                },
                Some(_) => {},
                None => return Err(OoxmlError::structure("Unexpected styles structure: the end element is absent")),
            }
        }
        while let Some(event) = reader.next_event()? {
            definitions.epilog.push(event);
        }
        log::debug!("read {} word styles", definitions.styles.len());
        Ok(definitions)
    }

    /// Combine with `other`: styles are united by id, a style defined on
    /// both sides keeps the properties only we set and takes the rest from
    /// `other`. The document defaults combine the same way.
    pub fn merged_with(&self, other: &WordStyleDefinitions) -> Result<Self> {
        let mut merged = self.clone();
        merged.defaults = self.defaults.merged_with(&other.defaults);
        if !other.latent.is_empty() {
            merged.latent = other.latent.clone();
        }
        for style in &other.styles {
            let style = match self.style(&style.id) {
                Some(ours) => ours.merged_with(style),
                None => style.clone(),
            };
            merged.insert(style);
        }
        merged.placed_id = None;
        log::debug!("merged {} word styles into {}", other.styles.len(), self.styles.len());
        Ok(merged)
    }

    fn insert(&mut self, style: WordStyle) {
        if style.default {
            self.default_styles.insert(style.style_type, style.id.clone());
        }
        match self.index.get(&style.id) {
            Some(&position) => self.styles[position] = style,
            None => {
                self.index.insert(style.id.clone(), self.styles.len());
                self.styles.push(style);
            },
        }
    }

    pub fn style(&self, id: &str) -> Option<&WordStyle> {
        self.index.get(id).map(|&position| &self.styles[position])
    }

    #[inline]
    pub fn styles(&self) -> &[WordStyle] {
        &self.styles
    }

    /// The style marked `w:default` for a type.
    pub fn default_style(&self, style_type: StyleType) -> Option<&str> {
        self.default_styles.get(&style_type).map(String::as_str)
    }

    #[inline]
    pub fn document_default_run_properties(&self) -> &RunProperties {
        &self.defaults.run
    }

    #[inline]
    pub fn document_default_paragraph_properties(&self) -> &ParagraphBlockProperties {
        &self.defaults.paragraph
    }

    fn is_of_type(&self, id: &str, style_type: StyleType) -> bool {
        self.style(id).is_some_and(|s| s.style_type == style_type)
    }

    /// The parent of `id` when it exists and has the given type.
    fn typed_parent(&self, style: &WordStyle, style_type: StyleType) -> Option<&WordStyle> {
        style
            .parent
            .as_deref()
            .and_then(|parent| self.style(parent))
            .filter(|parent| parent.style_type == style_type)
    }

    /// Document defaults, then the paragraph style chain (or the default
    /// paragraph style), then the direct properties.
    pub fn combined_paragraph_block_properties(&self, properties: &ParagraphBlockProperties) -> ParagraphBlockProperties {
        let direct = properties.without_paragraph_style();
        let style = properties
            .paragraph_style()
            .filter(|id| self.style(id).is_some())
            .or_else(|| self.default_style(StyleType::Paragraph));
        let chained = match style {
            Some(id) => self.paragraph_chain(id, &direct, 0),
            None => direct,
        };
        self.defaults.paragraph.merged_with(&chained)
    }

    fn paragraph_chain(&self, id: &str, properties: &ParagraphBlockProperties, depth: usize) -> ParagraphBlockProperties {
        let Some(style) = self.style(id) else {
            return properties.clone();
        };
        match self.typed_parent(style, StyleType::Paragraph) {
            // basedOn cycles end once every style has been visited
            Some(parent) if depth < self.styles.len() => self
                .paragraph_chain(&parent.id, &style.paragraph, depth + 1)
                .merged_with(properties),
            _ => style.paragraph.merged_with(properties),
        }
    }

    /// Resolve run properties through the cascade.
    ///
    /// Toggle properties of the document defaults apply only where no style
    /// set them; paragraph and character style toggles cancel out.
    pub fn combined_run_properties(
        &self,
        paragraph_style: Option<&str>,
        run_style: Option<&str>,
        properties: &RunProperties,
    ) -> RunProperties {
        self.defaults
            .run
            .copied(false, false, true)
            .combine_distinct(
                &self.properties_by_type_and_style(StyleType::Paragraph, paragraph_style, None),
                TraversalStage::Vertical,
            )
            .combine_distinct(
                &self.properties_by_type_and_style(StyleType::Character, run_style, paragraph_style),
                TraversalStage::Vertical,
            )
            .combine_distinct(&self.defaults.run.copied_toggle(), TraversalStage::DocumentDefault)
            .combine_distinct(&properties.copied(false, true, false), TraversalStage::Direct)
    }

    fn properties_by_type_and_style(&self, style_type: StyleType, id: Option<&str>, linked: Option<&str>) -> RunProperties {
        let empty = self.defaults.run.emptied();
        match id.filter(|id| self.is_of_type(id, style_type)) {
            Some(id) => match linked.and_then(|linked| self.linked_character_style(style_type, linked)) {
                Some(linked_style) => self
                    .combine_parent(StyleType::Paragraph, linked_style, empty.clone(), 0)
                    .combine_distinct(
                        &self.combine_parent(StyleType::Character, id, empty, 0),
                        TraversalStage::Horizontal,
                    ),
                None => self.combine_parent(style_type, id, empty, 0),
            },
            None => match self.default_style(style_type) {
                Some(default) => self.combine_parent(style_type, default, empty, 0),
                None => empty,
            },
        }
    }

    /// The style linked to the paragraph style `paragraph_style`, when a
    /// character style is being resolved.
    fn linked_character_style(&self, style_type: StyleType, paragraph_style: &str) -> Option<&str> {
        if style_type != StyleType::Character || !self.is_of_type(paragraph_style, StyleType::Paragraph) {
            return None;
        }
        self.style(paragraph_style).and_then(WordStyle::linked)
    }

    fn combine_parent(&self, style_type: StyleType, id: &str, properties: RunProperties, depth: usize) -> RunProperties {
        let Some(style) = self.style(id) else {
            return properties;
        };
        match self.typed_parent(style, style_type) {
            Some(parent) if depth < self.styles.len() => self
                .combine_parent(style_type, &parent.id, style.run.clone(), depth + 1)
                .combine_distinct(&properties, TraversalStage::Horizontal),
            _ => style.run.clone().combine_distinct(&properties, TraversalStage::Horizontal),
        }
    }

    /// Find a paragraph style equivalent to the given properties or create
    /// one. The new style is based on `parent` when it exists, otherwise on
    /// the default paragraph style.
    pub fn place(&mut self, parent: Option<&str>, paragraph: &ParagraphBlockProperties, run: &RunProperties) {
        let parent = parent
            .filter(|id| self.style(id).is_some())
            .or_else(|| self.default_style(StyleType::Paragraph))
            .map(str::to_string);

        let existing = self
            .styles
            .iter()
            .find(|s| {
                s.style_type == StyleType::Paragraph
                    && s.parent == parent
                    && (parent.is_none() || paragraph.mergeable_with(&s.paragraph))
                    && s.run == *run
            })
            .map(|s| s.id.clone());
        if let Some(id) = existing {
            self.placed_id = Some(id);
            return;
        }

        let prefix = parent.as_deref().unwrap_or(GENERATED_ID_PREFIX);
        let id = (1..)
            .map(|n| format!("{prefix}{n}"))
            .find(|id| self.style(id).is_none())
            .unwrap_or_default();
        let style = WordStyle::created(&self.start, &id, parent.as_deref(), run);
        self.insert(style);
        self.placed_id = Some(id);
    }

    pub fn placed_id(&self) -> Option<&str> {
        self.placed_id.as_deref()
    }

    pub fn to_markup(&self) -> Markup {
        let mut markup = Markup::default();
        push_general(&mut markup, &self.prolog);
        markup.add_component(MarkupComponent::start(self.start.clone()));
        markup.add_markup(self.defaults.to_markup());
        push_general(&mut markup, &self.latent);
        for style in &self.styles {
            markup.add_markup(style.to_markup());
        }
        markup.add_component(MarkupComponent::end(self.end.clone()));
        push_general(&mut markup, &self.epilog);
        markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::wpml;
    use crate::ooxml::event::serialize;
    use crate::ooxml::properties::RunProperty;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn read(body: &str) -> WordStyleDefinitions {
        let xml = format!(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles {W}>{body}</w:styles>"#);
        WordStyleDefinitions::read(&mut EventReader::from_str(&xml), &FilterOptions::default()).unwrap()
    }

    fn run_properties(xml: &str) -> RunProperties {
        let xml = format!(r#"<w:rPr {W}>{xml}</w:rPr>"#);
        let mut reader = EventReader::from_str(&xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        parse_run_properties(&start, &mut reader, &mut SkippableElements::Empty, &FilterOptions::default()).unwrap()
    }

    fn bold(properties: &RunProperties) -> Option<bool> {
        properties.get(&wpml("b")).and_then(RunProperty::toggle_value)
    }

    const HEADINGS: &str = r#"<w:docDefaults><w:rPrDefault><w:rPr><w:b w:val="0"/><w:sz w:val="22"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="160"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:link w:val="Heading1Char"/><w:pPr><w:keepNext/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style><w:style w:type="character" w:styleId="Heading1Char"><w:name w:val="Heading 1 Char"/><w:rPr><w:i/></w:rPr></w:style><w:style w:type="character" w:styleId="Emphasis"><w:rPr><w:i/><w:color w:val="FF0000"/></w:rPr></w:style>"#;

    #[test]
    fn test_read_structure() {
        let styles = read(HEADINGS);
        assert_eq!(styles.styles().len(), 4);
        assert_eq!(styles.default_style(StyleType::Paragraph), Some("Normal"));
        let heading = styles.style("Heading1").unwrap();
        assert_eq!(heading.parent(), Some("Normal"));
        assert_eq!(heading.linked(), Some("Heading1Char"));
        assert_eq!(heading.run_properties().count(), 2);
        assert_eq!(styles.style("Emphasis").unwrap().style_type(), StyleType::Character);
    }

    #[test]
    fn test_heading_overrides_document_default() {
        let styles = read(HEADINGS);
        let combined = styles.combined_run_properties(Some("Heading1"), None, &RunProperties::empty(wpml("rPr")));
        assert_eq!(bold(&combined), Some(true));
        let size = combined.get(&wpml("sz")).and_then(RunProperty::value);
        assert_eq!(size, Some("32"));
    }

    #[test]
    fn test_cascade_precedence() {
        let styles = read(HEADINGS);
        let direct = run_properties(r#"<w:sz w:val="40"/>"#);
        let combined = styles.combined_run_properties(Some("Heading1"), None, &direct);
        assert_eq!(combined.get(&wpml("sz")).and_then(RunProperty::value), Some("40"));

        let combined = styles.combined_run_properties(Some("Normal"), None, &RunProperties::empty(wpml("rPr")));
        assert_eq!(combined.get(&wpml("sz")).and_then(RunProperty::value), Some("22"));
        assert_eq!(bold(&combined), Some(false));
    }

    #[test]
    fn test_character_style_and_run_style_stripped() {
        let styles = read(HEADINGS);
        let direct = run_properties(r#"<w:rStyle w:val="Emphasis"/>"#);
        let combined = styles.combined_run_properties(None, Some("Emphasis"), &direct);
        assert!(combined.run_style().is_none());
        assert_eq!(combined.color(), Some("FF0000"));
    }

    #[test]
    fn test_linked_character_style() {
        let styles = read(HEADINGS);
        let combined =
            styles.combined_run_properties(Some("Heading1"), Some("Heading1Char"), &RunProperties::empty(wpml("rPr")));
        assert!(combined.contains_name(&wpml("i")));
    }

    #[test]
    fn test_combined_paragraph_properties() {
        let styles = read(HEADINGS);
        let mut direct = ParagraphBlockProperties::empty(wpml("pPr"));
        direct.refine(&wpml("rPr"), "Heading1", &[], &FilterOptions::default()).unwrap();
        let combined = styles.combined_paragraph_block_properties(&direct);
        let names: Vec<&str> = combined.properties().iter().map(|p| p.name().local.as_str()).collect();
        assert_eq!(names, vec!["spacing", "keepNext"]);
    }

    #[test]
    fn test_based_on_cycle_terminates() {
        let styles = read(
            r#"<w:style w:type="paragraph" w:styleId="A"><w:basedOn w:val="B"/><w:rPr><w:b/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="B"><w:basedOn w:val="A"/></w:style>"#,
        );
        let combined = styles.combined_run_properties(Some("A"), None, &RunProperties::empty(wpml("rPr")));
        assert_eq!(bold(&combined), Some(true));
    }

    #[test]
    fn test_place_reuses_and_creates() {
        let mut styles = read(HEADINGS);
        let paragraph = ParagraphBlockProperties::empty(wpml("pPr"));
        let run = run_properties(r#"<w:i/>"#);
        styles.place(Some("Heading1"), &paragraph, &run);
        assert_eq!(styles.placed_id(), Some("Heading11"));
        styles.place(Some("Heading1"), &paragraph, &run);
        assert_eq!(styles.placed_id(), Some("Heading11"));
        assert_eq!(styles.styles().len(), 5);

        styles.place(Some("Missing"), &paragraph, &run);
        assert_eq!(styles.placed_id(), Some("Normal1"));
        let created = styles.style("Normal1").unwrap();
        assert_eq!(created.parent(), Some("Normal"));
        let xml = serialize(&created.to_markup().events());
        assert!(xml.contains(r#"<w:basedOn w:val="Normal"/>"#));
    }

    #[test]
    fn test_markup_round_trip() {
        let styles = read(HEADINGS);
        let events = styles.to_markup().events();
        let xml = serialize(&events);
        let again = WordStyleDefinitions::read(&mut EventReader::from_str(&xml), &FilterOptions::default()).unwrap();
        assert_eq!(again.styles(), styles.styles());
        assert!(styles.to_markup().components().iter().any(MarkupComponent::is_word_paragraph_properties_default_start));
    }

    #[test]
    fn test_merge_unites_styles() {
        let ours = read(HEADINGS);
        let theirs = read(
            r#"<w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="24"/></w:rPr></w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:rPr><w:sz w:val="40"/><w:color w:val="00FF00"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/><w:rPr><w:i/></w:rPr></w:style>"#,
        );
        let merged = ours.merged_with(&theirs).unwrap();

        let ids: Vec<&str> = merged.styles().iter().map(WordStyle::id).collect();
        assert_eq!(ids, vec!["Normal", "Heading1", "Heading1Char", "Emphasis", "Quote"]);
        assert!(merged.style("Quote").unwrap().run_properties().contains_name(&wpml("i")));

        let heading = merged.style("Heading1").unwrap();
        let run = heading.run_properties();
        assert_eq!(run.get(&wpml("sz")).and_then(RunProperty::value), Some("40"));
        assert_eq!(run.color(), Some("00FF00"));
        assert_eq!(bold(run), Some(true));
        assert_eq!(heading.parent(), Some("Normal"));
        assert_eq!(merged.default_style(StyleType::Paragraph), Some("Normal"));

        let defaults = merged.document_default_run_properties();
        assert_eq!(defaults.get(&wpml("sz")).and_then(RunProperty::value), Some("24"));
        assert_eq!(bold(defaults), Some(false));
        let combined = merged.combined_run_properties(Some("Normal"), None, &RunProperties::empty(wpml("rPr")));
        assert_eq!(combined.get(&wpml("sz")).and_then(RunProperty::value), Some("24"));
    }

    #[test]
    fn test_missing_styles_element() {
        let xml = format!(r#"<w:document {W}/>"#);
        let result = WordStyleDefinitions::read(&mut EventReader::from_str(&xml), &FilterOptions::default());
        assert!(matches!(result, Err(OoxmlError::UnexpectedStructure(_))));
    }
}
