/// State shared by the clarification steps of one markup pass.
use crate::ooxml::properties::{ParagraphBlockProperties, RunProperties};
use crate::ooxml::styles::{SharedStyles, StyleDefinitions};

/// Text directions of the source and target languages, and the cascade
/// results of the paragraph being clarified.
///
/// The paragraph-specific fields are reset whenever a new paragraph start
/// adjusts the styles, so run properties are always resolved against the
/// paragraph they belong to.
#[derive(Debug, Clone)]
pub struct ClarificationContext {
    source_rtl: bool,
    target_rtl: bool,
    target_language: String,
    target_has_numeral_separators: bool,
    styles: SharedStyles,
    combined_paragraph_properties: Option<ParagraphBlockProperties>,
    paragraph_style: Option<String>,
    combined_run_properties: Option<RunProperties>,
}

impl ClarificationContext {
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            source_rtl: false,
            target_rtl: false,
            target_language: target_language.into(),
            target_has_numeral_separators: false,
            styles: StyleDefinitions::Empty.shared(),
            combined_paragraph_properties: None,
            paragraph_style: None,
            combined_run_properties: None,
        }
    }

    #[inline]
    pub fn with_source_rtl(mut self, rtl: bool) -> Self {
        self.source_rtl = rtl;
        self
    }

    #[inline]
    pub fn with_target_rtl(mut self, rtl: bool) -> Self {
        self.target_rtl = rtl;
        self
    }

    /// Whether the target language writes numeral separators as
    /// characters of its own script (Arabic, Persian).
    #[inline]
    pub fn with_target_numeral_separators(mut self, has_separators: bool) -> Self {
        self.target_has_numeral_separators = has_separators;
        self
    }

    #[inline]
    pub fn source_rtl(&self) -> bool {
        self.source_rtl
    }

    #[inline]
    pub fn target_rtl(&self) -> bool {
        self.target_rtl
    }

    /// Source and target run in the same direction; nothing to clarify.
    #[inline]
    pub fn directions_match(&self) -> bool {
        self.source_rtl == self.target_rtl
    }

    #[inline]
    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    #[inline]
    pub fn target_has_numeral_separators(&self) -> bool {
        self.target_has_numeral_separators
    }

    /// Resolve subsequent properties against `styles`.
    pub fn adjust(&mut self, styles: SharedStyles) {
        self.styles = styles;
        self.combined_paragraph_properties = None;
        self.paragraph_style = None;
        self.combined_run_properties = None;
    }

    pub fn adjust_combined_paragraph_properties_for(&mut self, properties: &ParagraphBlockProperties) {
        self.combined_paragraph_properties = Some(self.styles.read().combined_paragraph_block_properties(properties));
        self.paragraph_style = properties.paragraph_style().map(str::to_string);
    }

    pub fn adjust_combined_run_properties_for(&mut self, properties: &RunProperties) {
        self.combined_run_properties = Some(self.styles.read().combined_run_properties(
            self.paragraph_style.as_deref(),
            properties.run_style(),
            properties,
        ));
    }

    #[inline]
    pub fn combined_paragraph_properties(&self) -> Option<&ParagraphBlockProperties> {
        self.combined_paragraph_properties.as_ref()
    }

    #[inline]
    pub fn combined_run_properties(&self) -> Option<&RunProperties> {
        self.combined_run_properties.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ooxml::event::names::wpml;
    use crate::ooxml::event::StartElement;
    use crate::ooxml::properties::BlockProperty;

    #[test]
    fn test_directions() {
        let context = ClarificationContext::new("ar-SA").with_target_rtl(true);
        assert!(!context.directions_match());
        assert!(context.target_rtl());
        assert!(!context.source_rtl());
        assert!(ClarificationContext::new("de-DE").directions_match());
    }

    #[test]
    fn test_adjust_resets_paragraph_state() {
        let mut context = ClarificationContext::new("he-IL");
        let mut properties = ParagraphBlockProperties::empty(wpml("pPr"));
        properties
            .properties_mut()
            .push(BlockProperty::with_attributes(&wpml("pPr"), "pStyle", [("val", "Heading1")]));
        context.adjust_combined_paragraph_properties_for(&properties);
        assert!(context.combined_paragraph_properties().is_some());

        let run_properties = RunProperties::new(
            StartElement::new(wpml("rPr")),
            StartElement::new(wpml("rPr")).end(),
            Vec::new(),
        );
        context.adjust_combined_run_properties_for(&run_properties);
        assert_eq!(context.combined_run_properties(), Some(&run_properties));

        context.adjust(StyleDefinitions::Empty.shared());
        assert!(context.combined_paragraph_properties().is_none());
        assert!(context.combined_run_properties().is_none());
    }
}
