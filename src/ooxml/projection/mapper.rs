//! Mapping blocks onto text units.
//!
//! Runs are walked in document order while a stack of open formatting
//! codes is maintained. A run whose properties are not covered by the
//! code on top of the stack closes codes until they are; a run whose
//! properties differ from both the base properties and the top of the
//! stack opens a new code. Text-less runs and non-run chunks become
//! placeholders. Every code still open at the end of a block is closed,
//! so the codes of a fragment always nest.

use std::collections::HashMap;

use super::fragment::{Code, TagType, TextFragment};
use super::unit::{BlockSkeleton, CodeContent, TextUnit, UnitSkeleton};
use crate::ooxml::chunk::{Block, Chunk, Run, RunBodyChunk, RunContainer, RunContainerKind, StringItem, Textual};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::wpml;
use crate::ooxml::event::QName;
use crate::ooxml::properties::RunProperties;

const RUN_PROPERTIES: &str = "rPr";
const RUN_CODE_TYPE: &str = "x-run";
const PLACEHOLDER_CODE_TYPE: &str = "x";

/// An open formatting code.
#[derive(Debug)]
struct RunCode {
    id: usize,
    properties: RunProperties,
}

/// The state of projecting one block.
#[derive(Debug)]
struct Projection {
    fragment: TextFragment,
    base_run_properties: RunProperties,
    hidden_codes: Vec<CodeContent>,
    visible_codes: HashMap<usize, CodeContent>,
    run_codes: Vec<RunCode>,
    next_code_id: usize,
    referents: Vec<TextUnit>,
    references: usize,
}

impl Projection {
    fn new(base_run_properties: RunProperties) -> Self {
        Self {
            fragment: TextFragment::new(),
            base_run_properties,
            hidden_codes: Vec::new(),
            visible_codes: HashMap::new(),
            run_codes: Vec::new(),
            next_code_id: 1,
            referents: Vec::new(),
            references: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_code_id;
        self.next_code_id += 1;
        id
    }

    /// Map the inner chunks of a block; whether any run showed text.
    fn add_chunks(&mut self, chunks: &[Chunk]) -> Result<bool> {
        let mut has_text = false;
        for chunk in chunks {
            match chunk {
                Chunk::Run(run) => {
                    self.add_nested_items(run)?;
                    has_text |= self.add_run(0, None, run, None)?;
                },
                Chunk::RunContainer(container) => has_text |= self.add_run_container(container)?,
                other => self.add_placeholder(CodeContent::Chunk(other.clone()))?,
            }
        }
        self.pop_run_codes(0)?;
        Ok(has_text)
    }

    /// Referent units for the nested textual items of a run.
    fn add_nested_items(&mut self, run: &Run) -> Result<()> {
        for nested in run.nested_textual_items() {
            match &nested.item {
                Textual::Attribute(attribute) => {
                    self.referents.push(
                        TextUnit::new(nested.id.clone(), TextFragment::from_text(attribute.text())).with_referent(true),
                    );
                },
                Textual::Block(block) => {
                    for mut unit in BlockTextUnitMapper::new(nested.id.clone(), block).map()? {
                        if unit.id() == nested.id {
                            unit.set_referent(true);
                        }
                        self.referents.push(unit);
                    }
                },
            }
        }
        self.references += run.nested_textual_items().len();
        Ok(())
    }

    /// Add a run; whether its text was added.
    ///
    /// `position` and `next` are given for runs inside a container: the
    /// first run opens a code eagerly when the run after it is formatted
    /// differently. Codes below `pops_limit` belong to enclosing containers
    /// and are never closed here.
    fn add_run(&mut self, pops_limit: usize, position: Option<usize>, run: &Run, next: Option<&Run>) -> Result<bool> {
        if !run.contains_visible_text() {
            let content = CodeContent::Chunk(Chunk::Run(run.clone()));
            if self.fragment.is_empty() {
                self.hidden_codes.push(content);
            } else {
                self.add_placeholder(content)?;
            }
            return Ok(false);
        }

        let properties = run.properties();
        while self.run_codes.len() > pops_limit
            && self
                .run_codes
                .last()
                .is_some_and(|top| !top.properties.is_subset_of(properties))
        {
            self.close_top()?;
        }

        let next_differs = position == Some(0)
            && next.is_some_and(|next| {
                !same_properties(next.properties(), properties) && !next.properties().is_subset_of(properties)
            });
        let differs = !same_properties(&self.base_run_properties, properties)
            && self
                .run_codes
                .last()
                .is_none_or(|top| !same_properties(&top.properties, properties));
        if next_differs || differs {
            let id = self.next_id();
            self.visible_codes
                .insert(id, CodeContent::RunProperties(properties.clone()));
            self.fragment
                .append_code(Code::new(TagType::Opening, RUN_CODE_TYPE, id, format!("<run{id}>")))?;
            self.run_codes.push(RunCode {
                id,
                properties: properties.clone(),
            });
        }

        for chunk in run.body_chunks() {
            match chunk {
                RunBodyChunk::Text(text) => self.fragment.append_text(text.text()),
                RunBodyChunk::Markup(markup) => self.add_placeholder(CodeContent::RunMarkup(markup.clone()))?,
            }
        }
        Ok(true)
    }

    /// A container is a code of its own, opened with the properties of its
    /// first run.
    fn add_run_container(&mut self, container: &RunContainer) -> Result<bool> {
        let id = self.next_id();
        let code_type = container_code_type(container.kind());
        self.visible_codes
            .insert(id, CodeContent::RunContainer(container.clone()));
        self.fragment
            .append_code(Code::new(TagType::Opening, code_type, id, format!("<run{id}>")))?;
        self.run_codes.push(RunCode {
            id,
            properties: container.default_run_properties(),
        });
        let pops_limit = self.run_codes.len();

        let mut has_text = false;
        let mut position = 0;
        let chunks = container.chunks();
        for (index, chunk) in chunks.iter().enumerate() {
            match chunk {
                Chunk::Run(run) => {
                    self.add_nested_items(run)?;
                    let next = chunks.get(index + 1).and_then(Chunk::as_run);
                    has_text |= self.add_run(pops_limit, Some(position), run, next)?;
                    position += 1;
                },
                Chunk::RunContainer(nested) => has_text |= self.add_run_container(nested)?,
                other => self.add_placeholder(CodeContent::Chunk(other.clone()))?,
            }
        }

        self.pop_run_codes(pops_limit - 1)?;
        Ok(has_text)
    }

    fn add_placeholder(&mut self, content: CodeContent) -> Result<()> {
        let id = self.next_id();
        let data = match &content {
            CodeContent::Chunk(Chunk::Run(_)) => format!("<run{id}/>"),
            _ => format!("<tags{id}/>"),
        };
        self.visible_codes.insert(id, content);
        self.fragment
            .append_code(Code::new(TagType::Placeholder, PLACEHOLDER_CODE_TYPE, id, data))
    }

    fn close_top(&mut self) -> Result<()> {
        let Some(code) = self.run_codes.pop() else {
            return Ok(());
        };
        let code_type = match self.visible_codes.get(&code.id) {
            Some(CodeContent::RunContainer(container)) => container_code_type(container.kind()),
            _ => RUN_CODE_TYPE,
        };
        self.fragment.append_code(Code::new(
            TagType::Closing,
            code_type,
            code.id,
            format!("</run{}>", code.id),
        ))
    }

    /// Close codes until `depth` remain open.
    fn pop_run_codes(&mut self, depth: usize) -> Result<()> {
        while self.run_codes.len() > depth {
            self.close_top()?;
        }
        Ok(())
    }

    /// The unit for `block`, followed by the referents; the unit itself is
    /// left out when it has neither text nor referents.
    fn into_text_units(self, id: String, block: Block, has_text: bool) -> Vec<TextUnit> {
        let mut units = Vec::with_capacity(self.referents.len() + 1);
        if has_text || !self.referents.is_empty() {
            let skeleton = BlockSkeleton::new(block, self.base_run_properties, self.hidden_codes, self.visible_codes);
            units.push(
                TextUnit::new(id, self.fragment)
                    .with_references(self.references)
                    .with_skeleton(UnitSkeleton::Block(skeleton)),
            );
        }
        units.extend(self.referents);
        units
    }
}

/// Properties compared by their property lists.
fn same_properties(a: &RunProperties, b: &RunProperties) -> bool {
    a.properties() == b.properties()
}

fn container_code_type(kind: RunContainerKind) -> &'static str {
    match kind {
        RunContainerKind::Hyperlink => "x-hyperlink",
        RunContainerKind::SmartTag => "x-smarttag",
        RunContainerKind::StructuredDocumentTag => "x-sdt",
        RunContainerKind::Unsupported => "x-container",
    }
}

/// The properties of the least formatted direct run, which text outside
/// any code is written with.
fn base_run_properties(chunks: &[Chunk], run_name: Option<&QName>) -> RunProperties {
    chunks
        .iter()
        .filter_map(Chunk::as_run)
        .map(Run::properties)
        .min_by_key(|p| p.count())
        .cloned()
        .unwrap_or_else(|| {
            let name = run_name.map_or_else(|| wpml(RUN_PROPERTIES), |n| n.sibling(RUN_PROPERTIES));
            RunProperties::empty(name)
        })
}

/// Blocks start and end with markup; anything shorter must hold no
/// content.
fn inner_chunks(chunks: &[Chunk]) -> Result<Option<&[Chunk]>> {
    if chunks.len() > 2 {
        return Ok(Some(&chunks[1..chunks.len() - 1]));
    }
    if chunks
        .iter()
        .any(|c| matches!(c, Chunk::Run(_) | Chunk::RunContainer(_) | Chunk::Text(_)))
    {
        return Err(OoxmlError::structure("Content outside the block markup"));
    }
    Ok(None)
}

/// Maps a block onto its text unit and the referent units of its nested
/// items.
pub struct BlockTextUnitMapper<'a> {
    id: String,
    block: &'a Block,
}

impl<'a> BlockTextUnitMapper<'a> {
    pub fn new(id: impl Into<String>, block: &'a Block) -> Self {
        Self { id: id.into(), block }
    }

    pub fn map(&self) -> Result<Vec<TextUnit>> {
        let Some(chunks) = inner_chunks(self.block.chunks())? else {
            return Ok(Vec::new());
        };
        let mut projection = Projection::new(base_run_properties(chunks, self.block.run_name()));
        let has_text = projection.add_chunks(chunks)?;
        log::debug!("mapped block {} onto '{}'", self.id, projection.fragment);
        Ok(projection.into_text_units(self.id.clone(), self.block.clone(), has_text))
    }
}

/// Maps a shared string item onto a text unit.
///
/// Rich text items map like blocks. Plain items map onto their text alone,
/// written back into the original text element.
pub struct StringItemTextUnitMapper<'a> {
    id: String,
    item: &'a StringItem,
    cell: Option<String>,
    worksheet: Option<String>,
}

impl<'a> StringItemTextUnitMapper<'a> {
    pub fn new(id: impl Into<String>, item: &'a StringItem) -> Self {
        Self {
            id: id.into(),
            item,
            cell: None,
            worksheet: None,
        }
    }

    /// Name the unit after the cell referencing the item.
    #[inline]
    pub fn with_cell(mut self, worksheet: impl Into<String>, cell: impl Into<String>) -> Self {
        self.worksheet = Some(worksheet.into());
        self.cell = Some(cell.into());
        self
    }

    pub fn map(&self) -> Result<Vec<TextUnit>> {
        let mut units = if self.item.is_styled() {
            self.map_styled()?
        } else {
            self.map_plain()?
        };
        if let (Some(worksheet), Some(cell)) = (&self.worksheet, &self.cell)
            && let Some(unit) = units.iter_mut().find(|u| u.id() == self.id)
        {
            *unit = unit.clone().with_name(format!("{worksheet}!{cell}"));
        }
        Ok(units)
    }

    fn map_styled(&self) -> Result<Vec<TextUnit>> {
        let Some(chunks) = inner_chunks(self.item.chunks())? else {
            return Ok(Vec::new());
        };
        let mut projection = Projection::new(base_run_properties(chunks, self.item.run_name()));
        let has_text = projection.add_chunks(chunks)?;
        Ok(projection.into_text_units(self.id.clone(), self.item.block(), has_text))
    }

    fn map_plain(&self) -> Result<Vec<TextUnit>> {
        let chunks = self.item.chunks();
        let Some(position) = chunks.iter().position(|c| matches!(c, Chunk::Text(_))) else {
            return Ok(Vec::new());
        };
        let Chunk::Text(text) = &chunks[position] else {
            return Ok(Vec::new());
        };
        let skeleton = UnitSkeleton::Plain {
            before: chunks[..position].iter().flat_map(Chunk::events).collect(),
            text_start: text.start().clone(),
            text_end: text.end().clone(),
            after: chunks[position + 1..].iter().flat_map(Chunk::events).collect(),
        };
        Ok(vec![
            TextUnit::new(self.id.clone(), TextFragment::from_text(text.text())).with_skeleton(skeleton),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::chunk::{BlockBuilder, IdGenerator, RunBuilder};
    use crate::ooxml::config::FilterOptions;
    use crate::ooxml::event::{EndElement, EventReader, StartElement};
    use crate::ooxml::markup::MarkupComponent;
    use crate::ooxml::optimisation::StyleOptimisation;
    use crate::ooxml::parser::{BlockParser, StringItemParser};
    use crate::ooxml::properties::RunProperty;
    use crate::ooxml::styles::StyleDefinitions;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    /// A run with the given toggles, `b`, `i` or `u`.
    pub(super) fn run(text: &str, toggles: &[&str]) -> Run {
        let mut builder = RunBuilder::new(StartElement::new(wpml("r")), StyleDefinitions::Empty.shared());
        if !toggles.is_empty() {
            let rpr = StartElement::new(wpml("rPr"));
            builder.set_properties(RunProperties::new(
                rpr.clone(),
                rpr.end(),
                toggles
                    .iter()
                    .map(|t| RunProperty::generic(StartElement::new(wpml(t))))
                    .collect(),
            ));
        }
        if !text.is_empty() {
            builder.add_text(text, &StartElement::new(wpml("t")));
            builder.flush_text();
        }
        builder.set_end(EndElement::new(wpml("r")));
        builder.build().unwrap()
    }

    pub(super) fn block_of(chunks: Vec<Chunk>) -> Block {
        let p = StartElement::new(wpml("p"));
        let mut builder = BlockBuilder::new();
        builder.add_component_to_markup(MarkupComponent::paragraph_start(p.clone(), StyleDefinitions::Empty.shared()));
        for chunk in chunks {
            builder.add(chunk);
        }
        builder.add_component_to_markup(MarkupComponent::end(p.end()));
        builder.set_run_name(Some(&wpml("r")));
        builder.set_text_name(Some(&wpml("t")));
        builder.build()
    }

    fn map(chunks: Vec<Chunk>) -> TextUnit {
        let block = block_of(chunks);
        BlockTextUnitMapper::new("1", &block).map().unwrap().remove(0)
    }

    fn parse(xml: &str) -> Block {
        let mut reader = EventReader::from_str(xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        let options = FilterOptions::default();
        BlockParser::new(&start, &options, StyleDefinitions::Empty.shared(), StyleOptimisation::Bypass)
            .parse(&mut reader, &mut IdGenerator::new())
            .unwrap()
    }

    #[test]
    fn test_bold_bold_plain() {
        let unit = map(vec![
            run("R1 ", &["b"]).into(),
            run("R2 ", &["b"]).into(),
            run("R3", &[]).into(),
        ]);
        assert_eq!(unit.source().to_string(), "<run1>R1 R2 </run1>R3");
        assert_eq!(unit.source().text(), "R1 R2 R3");
    }

    #[test]
    fn test_overlapping_styles() {
        let unit = map(vec![
            run("This ", &[]).into(),
            run("document has ", &["b"]).into(),
            run("overlapping styles", &["b", "i"]).into(),
            run(".", &[]).into(),
        ]);
        assert_eq!(
            unit.source().to_string(),
            "This <run1>document has <run2>overlapping styles</run2></run1>."
        );
    }

    #[test]
    fn test_narrower_run_reopens() {
        let unit = map(vec![
            run("a", &["b", "i"]).into(),
            run("b", &["b"]).into(),
            run("c", &[]).into(),
        ]);
        // The base is the plain run, so bold alone needs a code of its own
        assert_eq!(unit.source().to_string(), "<run1>a</run1><run2>b</run2>c");
    }

    #[test]
    fn test_hidden_codes_and_placeholders() {
        let block = block_of(vec![
            run("", &["b"]).into(),
            run("text", &[]).into(),
            run("", &["i"]).into(),
        ]);
        let units = BlockTextUnitMapper::new("1", &block).map().unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].source().to_string(), "text<run1/>");
        let Some(UnitSkeleton::Block(skeleton)) = units[0].skeleton() else {
            panic!("block skeleton expected");
        };
        assert_eq!(skeleton.hidden_codes().len(), 1);
    }

    #[test]
    fn test_empty_block() {
        let block = parse(&format!(r#"<w:p {W}><w:pPr><w:jc w:val="center"/></w:pPr></w:p>"#));
        assert!(BlockTextUnitMapper::new("1", &block).map().unwrap().is_empty());
    }

    #[test]
    fn test_textless_block_maps_to_nothing() {
        let block = block_of(vec![run("", &["b"]).into()]);
        assert!(BlockTextUnitMapper::new("1", &block).map().unwrap().is_empty());
    }

    #[test]
    fn test_container_first_run_look_ahead() {
        let xml = format!(
            concat!(
                r#"<w:p {W}><w:r><w:t>Go </w:t></w:r><w:hyperlink w:anchor="a">"#,
                r#"<w:r><w:t>to </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>top</w:t></w:r>"#,
                r#"</w:hyperlink></w:p>"#,
            ),
            W = W
        );
        let block = parse(&xml);
        let unit = BlockTextUnitMapper::new("1", &block).map().unwrap().remove(0);
        // Plain formatting is covered by bold, so the first code stays open
        assert_eq!(unit.source().to_string(), "Go <run1><run2>to <run3>top</run3></run2></run1>");
        assert_eq!(unit.source().codes()[0].code_type(), "x-hyperlink");
    }

    #[test]
    fn test_graphic_name_referent() {
        let xml = format!(
            concat!(
                r#"<w:p {W} xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
                r#"<w:r><w:t>Logo</w:t></w:r><w:r><w:drawing><wp:inline><wp:docPr id="1" name="Picture 1"/>"#,
                r#"</wp:inline></w:drawing></w:r></w:p>"#,
            ),
            W = W
        );
        let block = parse(&xml);
        let units = BlockTextUnitMapper::new("tu1", &block).map().unwrap();
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].references(), 1);
        assert!(units[1].is_referent());
        assert_eq!(units[1].source().text(), "Picture 1");
    }

    #[test]
    fn test_plain_string_item() {
        let xml = r#"<si xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><t>Total</t></si>"#;
        let mut reader = EventReader::from_str(xml);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        let options = FilterOptions::default();
        let item = StringItemParser::new(&start, &options, StyleDefinitions::Empty.shared(), StyleOptimisation::Bypass)
            .parse(&mut reader, &mut IdGenerator::new())
            .unwrap();
        let units = StringItemTextUnitMapper::new("1", &item)
            .with_cell("Sheet1", "B2")
            .map()
            .unwrap();
        assert_eq!(units.len(), 1);
        assert_eq!(units[0].name(), Some("Sheet1!B2"));
        assert_eq!(units[0].source().text(), "Total");

        let written = units[0]
            .write(&TextFragment::from_text("Summe"), &options)
            .unwrap();
        assert_eq!(
            crate::ooxml::event::serialize(&written),
            r#"<si xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><t>Summe</t></si>"#
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::tests::{block_of, run};
    use super::*;
    use proptest::prelude::*;

    const TOGGLES: [&str; 3] = ["b", "i", "u"];

    fn toggles(mask: u8) -> Vec<&'static str> {
        TOGGLES
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, t)| *t)
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_codes_nest(runs in prop::collection::vec((0u8..8, "[a-z]{0,3}"), 1..12)) {
            let chunks = runs
                .iter()
                .map(|(mask, text)| Chunk::Run(run(text, &toggles(*mask))))
                .collect();
            let block = block_of(chunks);
            let units = BlockTextUnitMapper::new("1", &block).map().unwrap();

            let mut open = Vec::new();
            for unit in &units {
                for code in unit.source().codes() {
                    match code.tag_type() {
                        TagType::Opening => open.push(code.id()),
                        TagType::Closing => prop_assert_eq!(open.pop(), Some(code.id())),
                        TagType::Placeholder => {},
                    }
                }
            }
            prop_assert!(open.is_empty());
        }

        #[test]
        fn prop_text_preserved(runs in prop::collection::vec((0u8..8, "[a-z ]{1,4}"), 1..8)) {
            let chunks = runs
                .iter()
                .map(|(mask, text)| Chunk::Run(run(text, &toggles(*mask))))
                .collect();
            let block = block_of(chunks);
            let units = BlockTextUnitMapper::new("1", &block).map().unwrap();
            let expected: String = runs.iter().map(|(_, text)| text.as_str()).collect();
            prop_assert_eq!(units[0].source().text(), expected);
        }
    }
}
