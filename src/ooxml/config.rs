//! Configuration for OOXML markup processing.
//!
//! These flags control which markup the parsers drop, which characters
//! become part of the translatable text, and how aggressively redundant
//! formatting is cleaned up.
//!
//! # Examples
//!
//! ```rust
//! use runweave::ooxml::config::FilterOptions;
//!
//! // Create with defaults
//! let options = FilterOptions::default();
//!
//! // Or customize
//! let options = FilterOptions::new()
//!     .with_add_tab_as_character(true)
//!     .with_cleanup_aggressively(true);
//! ```
use crate::ooxml::error::{OoxmlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default complex field instruction whose result is extracted.
const HYPERLINK_FIELD: &str = "HYPERLINK";

/// Processing options for the OOXML markup engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    /// Whether hidden (`vanish`) runs stay translatable
    pub translate_hidden: bool,
    /// Whether line breaks are represented as a character in the text
    pub add_line_separator_as_character: bool,
    /// The character standing in for a line break
    pub line_separator_replacement: char,
    /// Whether tabs are represented as a character in the text
    pub add_tab_as_character: bool,
    /// Whether `w:noBreakHyphen` is replaced by a regular hyphen
    pub replace_no_break_hyphen: bool,
    /// Whether `w:softHyphen` is dropped
    pub ignore_soft_hyphen: bool,
    /// Whether spacing and complex script properties are stripped
    pub cleanup_aggressively: bool,
    /// Whether tracked changes are accepted silently
    pub automatically_accept_revisions: bool,
    /// Whether drawing names (`wp:docPr/@name`) are extracted
    pub translate_graphic_metadata: bool,
    /// Complex field instructions whose result text is extracted
    pub complex_field_definitions_to_extract: BTreeSet<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            translate_hidden: false,
            add_line_separator_as_character: false,
            line_separator_replacement: '\n',
            add_tab_as_character: false,
            replace_no_break_hyphen: false,
            ignore_soft_hyphen: false,
            cleanup_aggressively: false,
            automatically_accept_revisions: true,
            translate_graphic_metadata: true,
            complex_field_definitions_to_extract: BTreeSet::from([HYPERLINK_FIELD.to_string()]),
        }
    }
}

impl FilterOptions {
    /// Create a new `FilterOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether hidden runs remain translatable.
    #[inline]
    pub fn with_translate_hidden(mut self, translate: bool) -> Self {
        self.translate_hidden = translate;
        self
    }

    /// Set whether line breaks are exposed as characters.
    ///
    /// When enabled, `<w:br/>` (but not page breaks) becomes the
    /// configured replacement character and is turned back into a break
    /// element when writing.
    #[inline]
    pub fn with_add_line_separator_as_character(mut self, add: bool) -> Self {
        self.add_line_separator_as_character = add;
        self
    }

    /// Set the line separator replacement character.
    #[inline]
    pub fn with_line_separator_replacement(mut self, replacement: char) -> Self {
        self.line_separator_replacement = replacement;
        self
    }

    /// Set whether tabs are exposed as characters.
    #[inline]
    pub fn with_add_tab_as_character(mut self, add: bool) -> Self {
        self.add_tab_as_character = add;
        self
    }

    /// Set whether non-breaking hyphens become regular hyphens.
    #[inline]
    pub fn with_replace_no_break_hyphen(mut self, replace: bool) -> Self {
        self.replace_no_break_hyphen = replace;
        self
    }

    /// Set whether soft hyphens are dropped.
    #[inline]
    pub fn with_ignore_soft_hyphen(mut self, ignore: bool) -> Self {
        self.ignore_soft_hyphen = ignore;
        self
    }

    /// Set whether aggressive cleanup is performed.
    #[inline]
    pub fn with_cleanup_aggressively(mut self, cleanup: bool) -> Self {
        self.cleanup_aggressively = cleanup;
        self
    }

    /// Set whether tracked changes are accepted automatically.
    ///
    /// When disabled, meeting a revision raises
    /// [`OoxmlError::UnexpectedRevision`].
    #[inline]
    pub fn with_automatically_accept_revisions(mut self, accept: bool) -> Self {
        self.automatically_accept_revisions = accept;
        self
    }

    /// Set whether drawing names are extracted.
    #[inline]
    pub fn with_translate_graphic_metadata(mut self, translate: bool) -> Self {
        self.translate_graphic_metadata = translate;
        self
    }

    /// Add a complex field instruction whose result text is extracted.
    #[inline]
    pub fn with_complex_field_definition(mut self, definition: impl Into<String>) -> Self {
        self.complex_field_definitions_to_extract.insert(definition.into());
        self
    }

    /// Check whether a complex field instruction is extractable.
    #[inline]
    pub fn is_complex_field_extractable(&self, definition: &str) -> bool {
        self.complex_field_definitions_to_extract.contains(definition)
    }

    /// Load options from a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_saphyr::from_str(yaml)
            .map_err(|e| OoxmlError::InvalidArgument(format!("Failed to parse options YAML: {}", e)))
    }

    /// Serialize the options to YAML.
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_saphyr::to_string(self)
            .map_err(|e| OoxmlError::InvalidArgument(format!("Failed to serialize options to YAML: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = FilterOptions::default();
        assert!(!options.translate_hidden);
        assert!(options.automatically_accept_revisions);
        assert_eq!(options.line_separator_replacement, '\n');
        assert!(options.is_complex_field_extractable("HYPERLINK"));
        assert!(!options.is_complex_field_extractable("PAGE"));
    }

    #[test]
    fn test_builder_chain() {
        let options = FilterOptions::new()
            .with_add_tab_as_character(true)
            .with_ignore_soft_hyphen(true)
            .with_complex_field_definition("REF");

        assert!(options.add_tab_as_character);
        assert!(options.ignore_soft_hyphen);
        assert!(options.is_complex_field_extractable("REF"));
    }

    #[test]
    fn test_yaml_partial_document_keeps_defaults() {
        let options = FilterOptions::from_yaml_str("cleanup_aggressively: true\n").unwrap();
        assert!(options.cleanup_aggressively);
        assert!(options.automatically_accept_revisions);
    }

    #[test]
    fn test_yaml_round_trip() {
        let options = FilterOptions::new().with_translate_hidden(true);
        let yaml = options.to_yaml_string().unwrap();
        let parsed = FilterOptions::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, options);
    }
}
