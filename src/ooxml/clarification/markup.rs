/// Clarification passes over markup component sequences.
use super::{AttributesClarification, ClarifiableAttribute, ClarificationContext, ElementsClarification, TRUE_VALUES};
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::QName;
use crate::ooxml::event::names::{DRAWING_ML, LOCAL_RTL, LOCAL_RTL_COL, LOCAL_TYPE, dml};
use crate::ooxml::markup::{Markup, MarkupComponent};
use crate::ooxml::properties::{BODY_PROPERTIES, BlockProperties, RunProperties, TABLE_PROPERTIES};
use crate::ooxml::styles::StyleDefinitions;

const PARAGRAPH_PROPERTIES: &str = "pPr";
const RIGHT_TO_LEFT: &str = "rightToLeft";
const READING_ORDER: &str = "readingOrder";
const READING_ORDER_RTL: &[&str] = &["2"];
const STYLE_DEFAULT: &str = "default";
const STYLE_TYPE_PARAGRAPH: &str = "paragraph";
const STYLE_TYPE_CHARACTER: &str = "character";
const STYLE_TYPE_TABLE: &str = "table";

/// The attribute and element steps applied to one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupComponentClarification {
    attributes: AttributesClarification,
    elements: ElementsClarification,
}

impl MarkupComponentClarification {
    pub fn new(attributes: AttributesClarification, elements: ElementsClarification) -> Self {
        Self { attributes, elements }
    }

    pub fn attributes_only(attributes: AttributesClarification) -> Self {
        Self::new(attributes, ElementsClarification::Bypass)
    }

    pub fn perform_for(&self, component: &mut MarkupComponent, context: &ClarificationContext) -> Result<()> {
        match component {
            MarkupComponent::Start(start)
            | MarkupComponent::EmptyElement(start)
            | MarkupComponent::ParagraphStart { start, .. } => {
                self.attributes.perform_for(&mut start.attributes, context);
                Ok(())
            },
            MarkupComponent::BlockProperties(properties) => {
                self.attributes
                    .perform_for(&mut properties.start_mut().attributes, context);
                let name = properties.name().clone();
                self.elements
                    .perform_for(properties.properties_mut(), &name, context)
            },
            MarkupComponent::ParagraphBlockProperties(properties) => {
                self.attributes
                    .perform_for(&mut properties.start_mut().attributes, context);
                let name = properties.name().clone();
                self.elements
                    .perform_for(properties.properties_mut(), &name, context)
            },
            MarkupComponent::RunProperties(properties) => {
                let name = properties.name().clone();
                self.elements
                    .perform_for(properties.properties_mut(), &name, context)
            },
            MarkupComponent::End(_) | MarkupComponent::General(_) => Ok(()),
        }
    }
}

/// Run properties resolved against the current paragraph, then clarified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPropertiesClarification {
    elements: ElementsClarification,
}

impl RunPropertiesClarification {
    pub fn new(elements: ElementsClarification) -> Self {
        Self { elements }
    }

    /// `w:rtl` and `w:lang` for WordprocessingML; nothing for DrawingML,
    /// whose runs follow their paragraph.
    pub fn for_dialect(name: &QName) -> Self {
        if name.is_in(DRAWING_ML) {
            Self::new(ElementsClarification::Bypass)
        } else {
            Self::new(ElementsClarification::run_rtl_and_lang())
        }
    }

    pub fn perform_for(&self, properties: &mut RunProperties, context: &mut ClarificationContext) -> Result<()> {
        context.adjust_combined_run_properties_for(properties);
        let name = properties.name().clone();
        self.elements
            .perform_for(properties.properties_mut(), &name, context)
    }
}

/// Clarifies the properties element that must follow a block start,
/// inserting an empty one when the block has none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockPropertiesClarification {
    local: &'static str,
    component: MarkupComponentClarification,
    /// Paragraph starts bring their own styles into the context
    paragraph: bool,
}

impl BlockPropertiesClarification {
    pub fn new(local: &'static str, component: MarkupComponentClarification) -> Self {
        Self {
            local,
            component,
            paragraph: false,
        }
    }

    pub fn paragraph(component: MarkupComponentClarification) -> Self {
        Self {
            local: PARAGRAPH_PROPERTIES,
            component,
            paragraph: true,
        }
    }

    /// Clarify the properties of the block started at `start`; the index of
    /// the properties component.
    pub fn perform_with(
        &self,
        components: &mut Vec<MarkupComponent>,
        start: usize,
        context: &mut ClarificationContext,
    ) -> Result<usize> {
        if self.paragraph {
            match components.get(start) {
                Some(MarkupComponent::ParagraphStart { styles, .. }) => context.adjust(styles.clone()),
                _ => context.adjust(StyleDefinitions::Empty.shared()),
            }
        }

        let mut index = start + 1;
        if components.get(index).is_some_and(MarkupComponent::is_whitespace) {
            index += 1;
        }
        if !components.get(index).is_some_and(|c| self.is_properties(c)) {
            let name = self.properties_name(components.get(start))?;
            log::debug!("adding empty {name} for clarification");
            components.insert(
                index,
                MarkupComponent::from_block_properties(BlockProperties::empty(name)),
            );
        }

        if let Some(MarkupComponent::ParagraphBlockProperties(properties)) = components.get(index) {
            context.adjust_combined_paragraph_properties_for(properties);
        }
        self.component.perform_for(&mut components[index], context)?;
        Ok(index)
    }

    fn is_properties(&self, component: &MarkupComponent) -> bool {
        match component {
            MarkupComponent::BlockProperties(p) => p.name().local == self.local,
            MarkupComponent::ParagraphBlockProperties(p) => p.name().local == self.local,
            _ => false,
        }
    }

    /// Text body properties are DrawingML in every host language; other
    /// properties share the namespace of their block.
    fn properties_name(&self, start: Option<&MarkupComponent>) -> Result<QName> {
        if self.local == BODY_PROPERTIES {
            return Ok(dml(BODY_PROPERTIES));
        }
        start
            .and_then(MarkupComponent::name)
            .map(|name| name.sibling(self.local))
            .ok_or_else(|| OoxmlError::illegal_state(format!("No block start to add {} to", self.local)))
    }
}

/// Clarification of a WordprocessingML style sheet: the document defaults
/// and the default table, paragraph and character styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StylesClarification {
    Bypass,
    Word {
        table: BlockPropertiesClarification,
        paragraph: BlockPropertiesClarification,
        run: RunPropertiesClarification,
    },
}

impl StylesClarification {
    /// Walk the style sheet started at `start`; the index of its end.
    pub fn perform_with(
        &self,
        components: &mut Vec<MarkupComponent>,
        start: usize,
        context: &mut ClarificationContext,
    ) -> Result<usize> {
        let StylesClarification::Word { table, paragraph, run } = self else {
            return Ok(start);
        };
        // Document defaults take the place of the default paragraph and
        // character styles
        let mut style_types = vec![STYLE_TYPE_TABLE, STYLE_TYPE_PARAGRAPH, STYLE_TYPE_CHARACTER];
        let mut index = start + 1;
        while index < components.len() {
            let component = &components[index];
            if component.is_word_styles_end() {
                break;
            }
            if component.is_word_document_defaults_start() {
                index = clarify_document_defaults(paragraph, run, components, index, context, &mut style_types)?;
            } else if component.is_word_style_start() {
                let clarifiable = component.contains_attribute_with_any_of_values(LOCAL_TYPE, &style_types)
                    && component.contains_attribute_with_any_of_values(STYLE_DEFAULT, TRUE_VALUES);
                if clarifiable {
                    index = clarify_style(table, paragraph, run, components, index, context)?;
                }
            }
            index += 1;
        }
        Ok(index)
    }
}

fn clarify_document_defaults(
    paragraph: &BlockPropertiesClarification,
    run: &RunPropertiesClarification,
    components: &mut Vec<MarkupComponent>,
    start: usize,
    context: &mut ClarificationContext,
    style_types: &mut Vec<&str>,
) -> Result<usize> {
    let mut index = start + 1;
    while index < components.len() {
        let component = &components[index];
        if component.is_word_document_defaults_end() {
            break;
        }
        if component.is_word_paragraph_properties_default_start() {
            index = paragraph.perform_with(components, index, context)?;
            style_types.retain(|t| *t != STYLE_TYPE_PARAGRAPH);
        } else if component.is_word_run_properties_default_start() {
            index = clarify_run_properties_until(run, components, index, context, MarkupComponent::is_word_run_properties_default_end)?;
            style_types.retain(|t| *t != STYLE_TYPE_CHARACTER);
        }
        index += 1;
    }
    Ok(index)
}

fn clarify_style(
    table: &BlockPropertiesClarification,
    paragraph: &BlockPropertiesClarification,
    run: &RunPropertiesClarification,
    components: &mut Vec<MarkupComponent>,
    start: usize,
    context: &mut ClarificationContext,
) -> Result<usize> {
    let mut index = start + 1;
    while index < components.len() {
        let component = &components[index];
        if component.is_word_style_end() {
            break;
        }
        if component.is_paragraph_block_properties() {
            index = paragraph.perform_with(components, index - 1, context)?;
        } else if component.is_table_block_properties() {
            index = table.perform_with(components, index - 1, context)?;
        } else if let MarkupComponent::RunProperties(properties) = &mut components[index] {
            run.perform_for(properties, context)?;
        }
        index += 1;
    }
    Ok(index)
}

/// Clarify run properties up to the component matching `is_end`; the index
/// of that component.
fn clarify_run_properties_until(
    run: &RunPropertiesClarification,
    components: &mut [MarkupComponent],
    start: usize,
    context: &mut ClarificationContext,
    is_end: fn(&MarkupComponent) -> bool,
) -> Result<usize> {
    let mut index = start + 1;
    while index < components.len() {
        if is_end(&components[index]) {
            break;
        }
        if let MarkupComponent::RunProperties(properties) = &mut components[index] {
            run.perform_for(properties, context)?;
        }
        index += 1;
    }
    Ok(index)
}

/// A single pass over markup, clarifying the text direction of every
/// recognized structure for the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupClarification {
    sheet_view: MarkupComponentClarification,
    alignment: MarkupComponentClarification,
    presentation: MarkupComponentClarification,
    table: BlockPropertiesClarification,
    text_body: BlockPropertiesClarification,
    paragraph: BlockPropertiesClarification,
    word_styles: StylesClarification,
}

impl MarkupClarification {
    /// The clarification steps for markup whose first named component is
    /// `name`. DrawingML keeps direction in attributes; the other
    /// vocabularies keep it in property elements.
    pub fn for_dialect(name: &QName) -> Self {
        let rtl = AttributesClarification::Default(ClarifiableAttribute::boolean(LOCAL_RTL));
        let text_body = BlockPropertiesClarification::new(
            BODY_PROPERTIES,
            MarkupComponentClarification::attributes_only(AttributesClarification::Default(
                ClarifiableAttribute::boolean(LOCAL_RTL_COL),
            )),
        );
        let (table, paragraph) = if name.is_in(DRAWING_ML) {
            (
                MarkupComponentClarification::attributes_only(rtl.clone()),
                MarkupComponentClarification::attributes_only(AttributesClarification::AlignmentAndRtl),
            )
        } else {
            (
                MarkupComponentClarification::new(
                    AttributesClarification::Bypass,
                    ElementsClarification::table_bidi_visual(),
                ),
                MarkupComponentClarification::new(
                    AttributesClarification::Bypass,
                    ElementsClarification::paragraph_bidi(),
                ),
            )
        };
        let table = BlockPropertiesClarification::new(TABLE_PROPERTIES, table);
        let paragraph = BlockPropertiesClarification::paragraph(paragraph);
        let word_styles = if name.is_in(DRAWING_ML) {
            StylesClarification::Bypass
        } else {
            StylesClarification::Word {
                table: table.clone(),
                paragraph: paragraph.clone(),
                run: RunPropertiesClarification::for_dialect(name),
            }
        };
        Self {
            sheet_view: MarkupComponentClarification::attributes_only(AttributesClarification::Default(
                ClarifiableAttribute::boolean(RIGHT_TO_LEFT),
            )),
            alignment: MarkupComponentClarification::attributes_only(AttributesClarification::Default(
                ClarifiableAttribute::new(READING_ORDER, READING_ORDER_RTL),
            )),
            presentation: MarkupComponentClarification::attributes_only(rtl),
            table,
            text_body,
            paragraph,
            word_styles,
        }
    }

    /// The clarification for `markup`, if it names anything.
    pub fn for_markup(markup: &Markup) -> Option<Self> {
        markup
            .nameable_component()
            .and_then(MarkupComponent::name)
            .map(Self::for_dialect)
    }

    pub fn perform_for(&self, markup: &mut Markup, context: &mut ClarificationContext) -> Result<()> {
        let components = markup.components_mut();
        let mut index = 0;
        while index < components.len() {
            let component = &components[index];
            if component.is_sheet_view_start() {
                self.sheet_view.perform_for(&mut components[index], context)?;
            } else if component.is_alignment_empty_element() {
                self.alignment.perform_for(&mut components[index], context)?;
            } else if component.is_presentation_start() {
                self.presentation.perform_for(&mut components[index], context)?;
            } else if component.is_table_start() {
                index = self.table.perform_with(components, index, context)?;
            } else if component.is_text_body_start() {
                index = self.text_body.perform_with(components, index, context)?;
            } else if component.is_paragraph_start() {
                index = self.paragraph.perform_with(components, index, context)?;
            } else if component.is_word_styles_start() {
                index = self.word_styles.perform_with(components, index, context)?;
            }
            index += 1;
        }
        Ok(())
    }
}
