//! Style optimisation: hoisting run properties shared by every run of a
//! block into a paragraph-level style.

use crate::ooxml::chunk::Chunk;
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{DRAWING_ML, WORDPROCESSING_ML, wpml};
use crate::ooxml::event::{EndElement, QName, StartElement};
use crate::ooxml::properties::{ParagraphBlockProperties, ParagraphDialect, RunProperties, RunProperty};
use crate::ooxml::styles::SharedStyles;

const PARAGRAPH_PROPERTIES: &str = "pPr";
const RUN_PROPERTIES: &str = "rPr";
const DEFAULT_RUN_PROPERTIES: &str = "defRPr";
const RUN_STYLE: &str = "rStyle";

#[derive(Debug, Clone, Default)]
pub enum StyleOptimisation {
    /// Leave the chunks as they are.
    #[default]
    Bypass,
    Default {
        /// The paragraph properties to create when a block has none
        block_properties_name: QName,
        /// The paragraph-level run properties receiving the common ones
        inner_name: QName,
        /// Run properties preventing the optimisation
        exclusions: Vec<QName>,
        styles: SharedStyles,
    },
}

impl StyleOptimisation {
    /// WordprocessingML: common properties move to a placed paragraph
    /// style; runs referencing a run style are left alone.
    pub fn word(styles: SharedStyles) -> Self {
        StyleOptimisation::Default {
            block_properties_name: wpml(PARAGRAPH_PROPERTIES),
            inner_name: wpml(RUN_PROPERTIES),
            exclusions: vec![wpml(RUN_STYLE)],
            styles,
        }
    }

    /// DrawingML: common properties move to the paragraph's `defRPr`.
    pub fn drawing(paragraph_name: &QName, styles: SharedStyles) -> Self {
        StyleOptimisation::Default {
            block_properties_name: paragraph_name.sibling(PARAGRAPH_PROPERTIES),
            inner_name: paragraph_name.sibling(DEFAULT_RUN_PROPERTIES),
            exclusions: Vec::new(),
            styles,
        }
    }

    /// The optimisation fitting a paragraph of the given name.
    pub fn for_paragraph(paragraph_name: &QName, styles: SharedStyles) -> Self {
        if paragraph_name.is_in(WORDPROCESSING_ML) {
            Self::word(styles)
        } else if paragraph_name.is_in(DRAWING_ML) {
            Self::drawing(paragraph_name, styles)
        } else {
            StyleOptimisation::Bypass
        }
    }

    /// Optimise the chunks of a block in place.
    ///
    /// Nothing changes for blocks without inner chunks, when a run carries
    /// an excluded property, or when the runs share no property.
    pub fn apply_to(&self, chunks: &mut [Chunk], options: &FilterOptions) -> Result<()> {
        let StyleOptimisation::Default {
            block_properties_name,
            inner_name,
            exclusions,
            styles,
        } = self
        else {
            return Ok(());
        };
        if chunks.len() <= 2 {
            return Ok(());
        }
        let last = chunks.len() - 1;
        let (first, rest) = chunks.split_at_mut(1);
        let inner = &mut rest[..last - 1];
        if contain_exclusions(inner, exclusions) {
            return Ok(());
        }
        let common = common_run_properties(inner);
        if common.is_empty() {
            return Ok(());
        }
        let Chunk::Markup(first_markup) = &mut first[0] else {
            return Err(OoxmlError::illegal_state("The block start markup is absent"));
        };

        let mut paragraph = first_markup
            .paragraph_block_properties()
            .cloned()
            .unwrap_or_else(|| ParagraphBlockProperties::empty(block_properties_name.clone()));
        let run_properties = RunProperties::new(
            StartElement::new(inner_name.clone()),
            EndElement::new(inner_name.clone()),
            common.clone(),
        );
        let placed_id = {
            let mut styles = styles.write();
            styles.place(
                paragraph.paragraph_style(),
                &paragraph.without_paragraph_style(),
                &run_properties,
            );
            styles.placed_id().map(str::to_string)
        };
        let style_id = match (paragraph.dialect(), placed_id) {
            (_, Some(id)) => id,
            (ParagraphDialect::Drawing, None) => String::new(),
            (ParagraphDialect::Word, None) => {
                log::debug!("no style placed for {} common run properties", common.len());
                return Ok(());
            },
        };

        paragraph.refine(inner_name, &style_id, &common, options)?;
        first_markup.update_or_add_block_properties(paragraph)?;
        refine_runs(inner, &common);
        Ok(())
    }
}

fn contain_exclusions(chunks: &[Chunk], exclusions: &[QName]) -> bool {
    chunks.iter().any(|chunk| match chunk {
        Chunk::RunContainer(container) => contain_exclusions(container.chunks(), exclusions),
        Chunk::Run(run) => run
            .properties()
            .properties()
            .iter()
            .any(|p| exclusions.contains(p.name())),
        _ => false,
    })
}

/// The direct run properties every run holds, in the order of the first
/// run. A run without properties leaves nothing in common.
fn common_run_properties(chunks: &[Chunk]) -> Vec<RunProperty> {
    let mut common: Option<Vec<RunProperty>> = None;
    for chunk in chunks {
        let properties = match chunk {
            Chunk::RunContainer(container) => common_run_properties(container.chunks()),
            Chunk::Run(run) => run.properties().properties().to_vec(),
            _ => continue,
        };
        if properties.is_empty() {
            return Vec::new();
        }
        match common.as_mut() {
            None => common = Some(properties),
            Some(common) => common.retain(|p| properties.contains(p)),
        }
    }
    common.unwrap_or_default()
}

fn refine_runs(chunks: &mut [Chunk], common: &[RunProperty]) {
    for chunk in chunks {
        match chunk {
            Chunk::RunContainer(container) => refine_runs(container.chunks_mut(), common),
            Chunk::Run(run) => run.refine_run_properties(common),
            _ => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::chunk::{Block, IdGenerator, Run};
    use crate::ooxml::event::{EventReader, serialize};
    use crate::ooxml::parser::BlockParser;
    use crate::ooxml::styles::StyleDefinitions;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;
    const A: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#;

    fn word_styles() -> SharedStyles {
        let xml = format!(r#"<w:styles {W}/>"#);
        StyleDefinitions::read_word(&mut EventReader::from_str(&xml), &FilterOptions::default())
            .unwrap()
            .shared()
    }

    fn parse(xml: &str, styles: SharedStyles) -> Block {
        let mut reader = EventReader::from_str(xml);
        let start = reader
            .next_event()
            .unwrap()
            .and_then(|e| e.as_start_element().cloned())
            .unwrap();
        let optimisation = StyleOptimisation::for_paragraph(&start.name, styles.clone());
        let options = FilterOptions::default();
        BlockParser::new(&start, &options, styles, optimisation)
            .parse(&mut reader, &mut IdGenerator::new())
            .unwrap()
    }

    fn runs(block: &Block) -> Vec<&Run> {
        block.chunks().iter().filter_map(Chunk::as_run).collect()
    }

    #[test]
    fn test_for_paragraph() {
        let styles = StyleDefinitions::Empty.shared();
        assert!(matches!(
            StyleOptimisation::for_paragraph(&wpml("p"), styles.clone()),
            StyleOptimisation::Default { exclusions, .. } if exclusions == vec![wpml(RUN_STYLE)]
        ));
        let paragraph = QName::new(DRAWING_ML, "p", "a");
        match StyleOptimisation::for_paragraph(&paragraph, styles.clone()) {
            StyleOptimisation::Default { inner_name, .. } => assert_eq!(inner_name.local, DEFAULT_RUN_PROPERTIES),
            StyleOptimisation::Bypass => panic!("DrawingML paragraphs are optimised"),
        }
        assert!(matches!(
            StyleOptimisation::for_paragraph(&QName::unqualified("si"), styles),
            StyleOptimisation::Bypass
        ));
    }

    #[test]
    fn test_word_common_properties_placed_in_style() {
        let styles = word_styles();
        let xml = format!(
            r#"<w:p {W}><w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>One </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>two</w:t></w:r></w:p>"#
        );
        let mut block = parse(&xml, styles.clone());
        block.optimise_styles(&FilterOptions::default()).unwrap();

        let xml = serialize(&block.events());
        assert!(xml.contains(r#"<w:pPr><w:pStyle w:val="style1"/></w:pPr>"#), "{xml}");
        let runs = runs(&block);
        assert_eq!(runs[0].properties().count(), 1);
        assert!(runs[0].properties().contains_name(&wpml("i")));
        assert_eq!(runs[1].properties().count(), 0);

        let placed = styles.read();
        assert_eq!(placed.placed_id(), Some("style1"));
    }

    #[test]
    fn test_run_style_prevents_optimisation() {
        let xml = format!(
            r#"<w:p {W}><w:r><w:rPr><w:rStyle w:val="Strong"/><w:b/></w:rPr><w:t>One </w:t></w:r><w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>two</w:t></w:r></w:p>"#
        );
        let mut block = parse(&xml, word_styles());
        let before = serialize(&block.events());
        block.optimise_styles(&FilterOptions::default()).unwrap();
        assert_eq!(serialize(&block.events()), before);
    }

    #[test]
    fn test_nothing_in_common() {
        let xml = format!(
            r#"<w:p {W}><w:r><w:rPr><w:b/></w:rPr><w:t>One </w:t></w:r><w:r><w:t>two</w:t></w:r></w:p>"#
        );
        let mut block = parse(&xml, word_styles());
        let before = serialize(&block.events());
        block.optimise_styles(&FilterOptions::default()).unwrap();
        assert_eq!(serialize(&block.events()), before);
    }

    #[test]
    fn test_bypass() {
        let xml = format!(
            r#"<w:p {W}><w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>One </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t>two</w:t></w:r></w:p>"#
        );
        let mut block = parse(&xml, word_styles());
        let mut chunks = block.chunks().to_vec();
        StyleOptimisation::Bypass
            .apply_to(&mut chunks, &FilterOptions::default())
            .unwrap();
        let events: Vec<_> = chunks.iter().flat_map(Chunk::events).collect();
        assert_eq!(serialize(&events), serialize(&block.events()));
        // Without a style sheet nothing can be placed for Word
        block = parse(&xml, StyleDefinitions::Empty.shared());
        let before = serialize(&block.events());
        block.optimise_styles(&FilterOptions::default()).unwrap();
        assert_eq!(serialize(&block.events()), before);
    }

    #[test]
    fn test_drawing_common_properties_in_default_run_properties() {
        let xml = format!(
            r#"<a:p {A}><a:r><a:rPr b="1" i="1"/><a:t>One </a:t></a:r><a:r><a:rPr b="1"/><a:t>two</a:t></a:r><a:endParaRPr/></a:p>"#
        );
        let mut block = parse(&xml, StyleDefinitions::Empty.shared());
        block.optimise_styles(&FilterOptions::default()).unwrap();

        let xml = serialize(&block.events());
        assert!(xml.contains(r#"<a:pPr><a:defRPr b="1"/></a:pPr>"#), "{xml}");
        let runs = runs(&block);
        assert_eq!(runs[0].properties().count(), 1);
        assert_eq!(runs[1].properties().count(), 0);
    }
}
