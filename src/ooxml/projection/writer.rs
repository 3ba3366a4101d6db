/// Writing coded text back into runs.
use super::fragment::{Code, FragmentPart, TagType, TextFragment};
use super::unit::{BlockSkeleton, CodeContent};
use crate::ooxml::chunk::Chunk;
use crate::ooxml::clarification::{ClarificationContext, MarkupClarification, RunPropertiesClarification};
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{
    DRAWING_ML, LOCAL_BREAK, LOCAL_PRESERVE, LOCAL_SPACE, LOCAL_TAB, SPREADSHEET_ML, WORDPROCESSING_ML, xml,
};
use crate::ooxml::event::{EndElement, QName, StartElement, XmlEvent};
use crate::ooxml::properties::RunProperties;

/// Regenerates the runs of a block from a coded text.
///
/// Text outside any code is written with the base run properties, text
/// inside an opening code with the properties the code was opened for.
/// A run is opened lazily, only when text or run markup is written.
pub struct BlockTextUnitWriter<'a> {
    options: &'a FilterOptions,
    skeleton: &'a BlockSkeleton,
    clarification: Option<(&'a RunPropertiesClarification, &'a mut ClarificationContext)>,
    run_properties: Vec<RunProperties>,
    text: String,
    run_open: bool,
    events: Vec<XmlEvent>,
}

impl<'a> BlockTextUnitWriter<'a> {
    pub fn new(options: &'a FilterOptions, skeleton: &'a BlockSkeleton) -> Self {
        Self {
            options,
            skeleton,
            clarification: None,
            run_properties: Vec::new(),
            text: String::new(),
            run_open: false,
            events: Vec::new(),
        }
    }

    /// Clarify the properties of every run start written, and the
    /// opening markup written by [`BlockTextUnitWriter::write_block`].
    pub fn with_run_properties_clarification(
        mut self,
        clarification: &'a RunPropertiesClarification,
        context: &'a mut ClarificationContext,
    ) -> Self {
        self.clarification = Some((clarification, context));
        self
    }

    /// The events of the runs making up `fragment`.
    pub fn write(mut self, fragment: &TextFragment) -> Result<Vec<XmlEvent>> {
        if let Err(e) = self.write_fragment(fragment) {
            log::error!("failed writing coded text '{}': {}", fragment, e);
            return Err(e);
        }
        Ok(self.events)
    }

    /// The events of the whole block: its opening markup, the runs making
    /// up `fragment`, its closing markup.
    pub fn write_block(mut self, fragment: &TextFragment) -> Result<Vec<XmlEvent>> {
        let skeleton = self.skeleton;
        let chunks = skeleton.block().chunks();
        let (Some(first), Some(last)) = (chunks.first(), chunks.last()) else {
            return Err(OoxmlError::illegal_state("The block markup is absent"));
        };
        let mut events = match (first, self.clarification.as_mut()) {
            (Chunk::Markup(markup), Some((_, context))) => match MarkupClarification::for_markup(markup) {
                Some(clarification) => {
                    let mut markup = markup.clone();
                    clarification.perform_for(&mut markup, context)?;
                    markup.events()
                },
                None => markup.events(),
            },
            _ => first.events(),
        };
        let closing = if chunks.len() > 1 { last.events() } else { Vec::new() };
        events.extend(self.write(fragment)?);
        events.extend(closing);
        Ok(events)
    }

    fn write_fragment(&mut self, fragment: &TextFragment) -> Result<()> {
        let skeleton = self.skeleton;
        for hidden in skeleton.hidden_codes() {
            self.events.extend(hidden.events());
        }
        for part in fragment.parts() {
            match part? {
                FragmentPart::Text(text) => {
                    for c in text.chars() {
                        self.write_char(c)?;
                    }
                },
                FragmentPart::Code(code) => self.write_code(code)?,
            }
        }
        self.flush_text(true)
    }

    fn write_char(&mut self, c: char) -> Result<()> {
        if !self.run_open && self.run_properties.is_empty() {
            let base = self.skeleton.base_run_properties().clone();
            self.write_run_start(base)?;
            self.run_open = true;
        }
        self.text.push(c);
        Ok(())
    }

    fn write_code(&mut self, code: &Code) -> Result<()> {
        let skeleton = self.skeleton;
        let content = skeleton
            .visible_code(code.id())
            .ok_or_else(|| OoxmlError::illegal_state(format!("Unknown code {}", code.data())))?;
        match code.tag_type() {
            TagType::Opening => {
                self.flush_text(true)?;
                match content {
                    CodeContent::RunProperties(properties) => self.run_properties.push(properties.clone()),
                    CodeContent::RunContainer(container) => {
                        self.events.extend(container.start_markup().events());
                        self.run_properties.push(container.default_run_properties());
                    },
                    _ => {
                        return Err(OoxmlError::illegal_state(format!(
                            "Unexpected content for opening code {}",
                            code.data()
                        )));
                    },
                }
            },
            TagType::Placeholder => {
                let run_markup = matches!(content, CodeContent::RunMarkup(_));
                if run_markup {
                    self.flush_run_start()?;
                }
                self.flush_text(!run_markup)?;
                self.events.extend(content.events());
            },
            TagType::Closing => {
                self.flush_text(true)?;
                match content {
                    CodeContent::RunProperties(_) => {
                        self.run_properties.pop();
                    },
                    CodeContent::RunContainer(container) => {
                        self.events.extend(container.end_markup().events());
                        self.run_properties.pop();
                    },
                    _ => {
                        return Err(OoxmlError::illegal_state(format!(
                            "Unexpected content for closing code {}",
                            code.data()
                        )));
                    },
                }
            },
        }
        Ok(())
    }

    fn current_run_properties(&self) -> RunProperties {
        self.run_properties
            .last()
            .unwrap_or_else(|| self.skeleton.base_run_properties())
            .clone()
    }

    fn flush_run_start(&mut self) -> Result<()> {
        if !self.run_open {
            self.write_run_start(self.current_run_properties())?;
            self.run_open = true;
        }
        Ok(())
    }

    fn flush_text(&mut self, terminate_run: bool) -> Result<()> {
        if !self.text.is_empty() {
            self.flush_run_start()?;
            let text = std::mem::take(&mut self.text);
            self.write_run_text(&text)?;
        }
        if terminate_run && self.run_open {
            self.write_run_end()?;
            self.run_open = false;
        }
        Ok(())
    }

    fn run_name(&self) -> Result<QName> {
        self.skeleton
            .block()
            .run_name()
            .cloned()
            .ok_or_else(|| OoxmlError::illegal_state("No run name set"))
    }

    fn text_name(&self) -> Result<QName> {
        self.skeleton
            .block()
            .text_name()
            .cloned()
            .ok_or_else(|| OoxmlError::illegal_state("No text name set"))
    }

    fn write_run_start(&mut self, mut properties: RunProperties) -> Result<()> {
        self.events.push(XmlEvent::start(self.run_name()?));
        if let Some((clarification, context)) = self.clarification.as_mut() {
            clarification.perform_for(&mut properties, context)?;
        }
        self.events.extend(properties.events());
        Ok(())
    }

    fn write_run_end(&mut self) -> Result<()> {
        self.events.push(XmlEvent::end(self.run_name()?));
        Ok(())
    }

    fn write_run_text(&mut self, text: &str) -> Result<()> {
        let text_name = self.text_name()?;
        // SpreadsheetML runs cannot hold breaks
        if text_name.is_in(SPREADSHEET_ML) {
            self.write_text(&text_name, text);
            return Ok(());
        }

        let mut pending = String::new();
        for c in text.chars() {
            if c == self.options.line_separator_replacement && self.options.add_line_separator_as_character {
                self.write_pending_text(&text_name, &mut pending);
                self.write_line_break(&text_name)?;
            } else if c == '\t' && self.options.add_tab_as_character && text_name.is_in(WORDPROCESSING_ML) {
                self.write_pending_text(&text_name, &mut pending);
                self.write_empty_element(text_name.sibling(LOCAL_TAB));
            } else {
                pending.push(c);
            }
        }
        self.write_pending_text(&text_name, &mut pending);
        Ok(())
    }

    fn write_pending_text(&mut self, text_name: &QName, pending: &mut String) {
        if !pending.is_empty() {
            let text = std::mem::take(pending);
            self.write_text(text_name, &text);
        }
    }

    /// Word starts a new run before every break.
    fn write_line_break(&mut self, text_name: &QName) -> Result<()> {
        self.write_run_end()?;
        self.write_run_start(self.current_run_properties())?;
        self.write_empty_element(text_name.sibling(LOCAL_BREAK));
        Ok(())
    }

    fn write_empty_element(&mut self, name: QName) {
        let start = StartElement::new(name);
        let end = start.end();
        self.events.push(XmlEvent::StartElement(start));
        self.events.push(XmlEvent::EndElement(end));
    }

    fn write_text(&mut self, text_name: &QName, text: &str) {
        let mut start = StartElement::new(text_name.clone());
        // DrawingML text does not take xml:space
        if needs_preserve_space(text) && !text_name.is_in(DRAWING_ML) {
            start = start.with_attribute(xml(LOCAL_SPACE), LOCAL_PRESERVE);
        }
        self.events.push(XmlEvent::StartElement(start));
        self.events.push(XmlEvent::characters(text));
        self.events.push(XmlEvent::EndElement(EndElement::new(text_name.clone())));
    }
}

/// Any whitespace, no-break space included.
pub(crate) fn needs_preserve_space(text: &str) -> bool {
    text.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::chunk::{Block, IdGenerator};
    use crate::ooxml::event::names::wpml;
    use crate::ooxml::event::{EventReader, serialize};
    use crate::ooxml::optimisation::StyleOptimisation;
    use crate::ooxml::parser::BlockParser;
    use crate::ooxml::projection::BlockTextUnitMapper;
    use crate::ooxml::projection::unit::{TextUnit, UnitSkeleton};
    use crate::ooxml::styles::StyleDefinitions;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn parse(xml: &str, options: &FilterOptions) -> Block {
        let mut reader = EventReader::from_str(xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        let styles = StyleDefinitions::Empty.shared();
        BlockParser::new(&start, options, styles, StyleOptimisation::Bypass)
            .parse(&mut reader, &mut IdGenerator::new())
            .unwrap()
    }

    fn unit(xml: &str, options: &FilterOptions) -> TextUnit {
        let block = parse(xml, options);
        BlockTextUnitMapper::new("tu1", &block).map().unwrap().remove(0)
    }

    fn skeleton(unit: &TextUnit) -> &BlockSkeleton {
        match unit.skeleton() {
            Some(UnitSkeleton::Block(skeleton)) => skeleton,
            _ => panic!("block skeleton expected"),
        }
    }

    fn runs(unit: &TextUnit, target: &TextFragment, options: &FilterOptions) -> String {
        let events = BlockTextUnitWriter::new(options, skeleton(unit)).write(target).unwrap();
        serialize(&events)
    }

    #[test]
    fn test_plain_text() {
        let options = FilterOptions::default();
        let unit = unit(&format!(r#"<w:p {W}><w:r><w:t>Hello</w:t></w:r></w:p>"#), &options);
        assert_eq!(
            runs(&unit, &TextFragment::from_text("Hallo Welt"), &options),
            r#"<w:r><w:t xml:space="preserve">Hallo Welt</w:t></w:r>"#
        );
    }

    #[test]
    fn test_formatting_codes() {
        let options = FilterOptions::default();
        let unit = unit(
            &format!(r#"<w:p {W}><w:r><w:rPr><w:b/></w:rPr><w:t>Bold</w:t></w:r><w:r><w:t>plain</w:t></w:r></w:p>"#),
            &options,
        );
        assert_eq!(unit.source().to_string(), "<run1>Bold</run1>plain");

        let mut target = TextFragment::new();
        target.append_text("schlicht");
        target.append_code(unit.source().codes()[0].clone()).unwrap();
        target.append_text("Fett");
        target.append_code(unit.source().codes()[1].clone()).unwrap();
        assert_eq!(
            runs(&unit, &target, &options),
            concat!(
                r#"<w:r><w:t>schlicht</w:t></w:r>"#,
                r#"<w:r><w:rPr><w:b/></w:rPr><w:t>Fett</w:t></w:r>"#,
            )
        );
    }

    #[test]
    fn test_line_break_reopens_run() {
        let options = FilterOptions::default().with_add_line_separator_as_character(true);
        let unit = unit(
            &format!(r#"<w:p {W}><w:r><w:t>one</w:t><w:br/><w:t>two</w:t></w:r></w:p>"#),
            &options,
        );
        assert_eq!(unit.source().text(), "one\ntwo");
        assert_eq!(
            runs(&unit, unit.source(), &options),
            r#"<w:r><w:t>one</w:t></w:r><w:r><w:br/><w:t>two</w:t></w:r>"#
        );
    }

    #[test]
    fn test_line_break_with_default_namespace() {
        let options = FilterOptions::default().with_add_line_separator_as_character(true);
        let unit = unit(
            r#"<p xmlns="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><r><t>one</t><br/><t>two</t></r></p>"#,
            &options,
        );
        assert_eq!(unit.source().text(), "one\ntwo");
        assert_eq!(
            runs(&unit, unit.source(), &options),
            r#"<r><t>one</t></r><r><br/><t>two</t></r>"#
        );
    }

    #[test]
    fn test_hyperlink_round_trip() {
        let options = FilterOptions::default();
        let xml = format!(
            concat!(
                r#"<w:p {W}><w:r><w:t xml:space="preserve">See </w:t></w:r>"#,
                r#"<w:hyperlink w:anchor="x"><w:r><w:t>here</w:t></w:r></w:hyperlink></w:p>"#,
            ),
            W = W
        );
        let unit = unit(&xml, &options);
        assert_eq!(unit.source().to_string(), "See <run1>here</run1>");

        let events = BlockTextUnitWriter::new(&options, skeleton(&unit))
            .write_block(unit.source())
            .unwrap();
        let written = serialize(&events);
        assert!(written.contains(r#"<w:hyperlink w:anchor="x"><w:r><w:t>here</w:t></w:r></w:hyperlink>"#));

        let reparsed = unit_from_written(&written, &options);
        assert_eq!(reparsed.source(), unit.source());
    }

    fn unit_from_written(written: &str, options: &FilterOptions) -> TextUnit {
        unit(written, options)
    }

    #[test]
    fn test_clarified_block() {
        let options = FilterOptions::default();
        let unit = unit(&format!(r#"<w:p {W}><w:r><w:t>Hello</w:t></w:r></w:p>"#), &options);
        let clarification = RunPropertiesClarification::for_dialect(&wpml("p"));
        let mut context = ClarificationContext::new("ar-SA").with_target_rtl(true);
        let events = BlockTextUnitWriter::new(&options, skeleton(&unit))
            .with_run_properties_clarification(&clarification, &mut context)
            .write_block(&TextFragment::from_text("مرحبا"))
            .unwrap();
        let written = serialize(&events);
        assert!(written.starts_with("<w:p "), "{written}");
        assert!(written.ends_with(r#"<w:pPr><w:bidi/></w:pPr><w:r><w:rPr><w:rtl/></w:rPr><w:t>مرحبا</w:t></w:r></w:p>"#));
    }

    #[test]
    fn test_tab_markup_keeps_run_open() {
        let options = FilterOptions::default();
        let unit = unit(
            &format!(r#"<w:p {W}><w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r></w:p>"#),
            &options,
        );
        assert_eq!(unit.source().to_string(), "a<tags1/>b");
        assert_eq!(
            runs(&unit, unit.source(), &options),
            r#"<w:r><w:t>a</w:t><w:tab/><w:t>b</w:t></w:r>"#
        );
    }

    #[test]
    fn test_unknown_code_fails() {
        let options = FilterOptions::default();
        let unit = unit(&format!(r#"<w:p {W}><w:r><w:t>x</w:t></w:r></w:p>"#), &options);
        let mut target = TextFragment::new();
        target
            .append_code(Code::new(TagType::Placeholder, "x", 42, "<tags42/>"))
            .unwrap();
        let result = BlockTextUnitWriter::new(&options, skeleton(&unit)).write(&target);
        assert!(matches!(result, Err(OoxmlError::IllegalState(_))));
    }

    #[test]
    fn test_preserve_space_detection() {
        assert!(needs_preserve_space("a b"));
        assert!(needs_preserve_space("a\u{a0}b"));
        assert!(needs_preserve_space("\u{3000}"));
        assert!(!needs_preserve_space("ab"));
    }
}
