/// Coded text: text with inline code markers.
use std::fmt;

use crate::ooxml::error::{OoxmlError, Result};

const MARKER_OPENING: char = '\u{E101}';
const MARKER_CLOSING: char = '\u{E102}';
const MARKER_PLACEHOLDER: char = '\u{E103}';
/// Code indices are written as the character following a marker.
const INDEX_BASE: u32 = 0xE110;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    Opening,
    Closing,
    Placeholder,
}

impl TagType {
    #[inline]
    fn marker(self) -> char {
        match self {
            TagType::Opening => MARKER_OPENING,
            TagType::Closing => MARKER_CLOSING,
            TagType::Placeholder => MARKER_PLACEHOLDER,
        }
    }

    #[inline]
    fn from_marker(c: char) -> Option<Self> {
        match c {
            MARKER_OPENING => Some(TagType::Opening),
            MARKER_CLOSING => Some(TagType::Closing),
            MARKER_PLACEHOLDER => Some(TagType::Placeholder),
            _ => None,
        }
    }
}

/// An inline code standing in for formatting or non-textual markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    id: usize,
    tag_type: TagType,
    code_type: String,
    data: String,
}

impl Code {
    pub fn new(tag_type: TagType, code_type: impl Into<String>, id: usize, data: impl Into<String>) -> Self {
        Self {
            id,
            tag_type,
            code_type: code_type.into(),
            data: data.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    #[inline]
    pub fn code_type(&self) -> &str {
        &self.code_type
    }

    /// The display form, e.g. `<run1>` or `<tags2/>`.
    #[inline]
    pub fn data(&self) -> &str {
        &self.data
    }
}

/// A piece of coded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentPart<'a> {
    Text(&'a str),
    Code(&'a Code),
}

/// Text with inline codes.
///
/// Each code occupies two characters of the coded text: a marker telling
/// its tag type and the index of the code in the code list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFragment {
    coded_text: String,
    codes: Vec<Code>,
}

impl TextFragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment holding plain text.
    pub fn from_text(text: &str) -> Self {
        let mut fragment = Self::new();
        fragment.append_text(text);
        fragment
    }

    /// Append text. Characters reserved for code markers are dropped.
    pub fn append_text(&mut self, text: &str) {
        self.coded_text
            .extend(text.chars().filter(|c| TagType::from_marker(*c).is_none()));
    }

    pub fn append_code(&mut self, code: Code) -> Result<()> {
        let index = u32::try_from(self.codes.len())
            .ok()
            .and_then(|i| char::from_u32(INDEX_BASE + i))
            .ok_or_else(|| OoxmlError::InvalidArgument("Too many codes in a fragment".to_string()))?;
        self.coded_text.push(code.tag_type.marker());
        self.coded_text.push(index);
        self.codes.push(code);
        Ok(())
    }

    #[inline]
    pub fn coded_text(&self) -> &str {
        &self.coded_text
    }

    #[inline]
    pub fn codes(&self) -> &[Code] {
        &self.codes
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coded_text.is_empty()
    }

    /// The code with the given id.
    pub fn code(&self, id: usize, tag_type: TagType) -> Option<&Code> {
        self.codes.iter().find(|c| c.id == id && c.tag_type == tag_type)
    }

    /// The text without codes.
    pub fn text(&self) -> String {
        self.parts()
            .into_iter()
            .filter_map(|part| match part {
                Ok(FragmentPart::Text(text)) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Whether the fragment holds any text.
    pub fn has_text(&self) -> bool {
        self.parts()
            .into_iter()
            .any(|part| matches!(part, Ok(FragmentPart::Text(text)) if !text.is_empty()))
    }

    /// The fragment split into text runs and codes.
    ///
    /// A marker without a valid index yields an error part.
    pub fn parts(&self) -> Vec<Result<FragmentPart<'_>>> {
        let mut parts = Vec::new();
        let mut text_start = 0;
        let mut chars = self.coded_text.char_indices();
        while let Some((position, c)) = chars.next() {
            if TagType::from_marker(c).is_none() {
                continue;
            }
            if text_start < position {
                parts.push(Ok(FragmentPart::Text(&self.coded_text[text_start..position])));
            }
            let code = chars.next().and_then(|(_, index)| {
                let index = (index as u32).checked_sub(INDEX_BASE)? as usize;
                self.codes.get(index)
            });
            match chars.clone().next() {
                Some((next, _)) => text_start = next,
                None => text_start = self.coded_text.len(),
            }
            parts.push(code.map(FragmentPart::Code).ok_or_else(|| {
                OoxmlError::structure(format!("Invalid code marker at {position}"))
            }));
        }
        if text_start < self.coded_text.len() {
            parts.push(Ok(FragmentPart::Text(&self.coded_text[text_start..])));
        }
        parts
    }
}

/// The text with the data of each code in place.
impl fmt::Display for TextFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in self.parts() {
            match part {
                Ok(FragmentPart::Text(text)) => f.write_str(text)?,
                Ok(FragmentPart::Code(code)) => f.write_str(code.data())?,
                Err(_) => f.write_str("\u{FFFD}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bold_fragment() -> TextFragment {
        let mut fragment = TextFragment::new();
        fragment.append_text("This is ");
        fragment
            .append_code(Code::new(TagType::Opening, "x-run", 1, "<run1>"))
            .unwrap();
        fragment.append_text("bold");
        fragment
            .append_code(Code::new(TagType::Closing, "x-run", 1, "</run1>"))
            .unwrap();
        fragment.append_text(".");
        fragment
    }

    #[test]
    fn test_display_and_text() {
        let fragment = bold_fragment();
        assert_eq!(fragment.to_string(), "This is <run1>bold</run1>.");
        assert_eq!(fragment.text(), "This is bold.");
        assert_eq!(fragment.codes().len(), 2);
        assert_eq!(fragment.coded_text().chars().count(), 17);
    }

    #[test]
    fn test_parts() {
        let fragment = bold_fragment();
        let parts: Vec<_> = fragment.parts().into_iter().map(Result::unwrap).collect();
        assert_eq!(parts.len(), 5);
        assert_eq!(parts[0], FragmentPart::Text("This is "));
        assert!(matches!(parts[1], FragmentPart::Code(c) if c.tag_type() == TagType::Opening));
        assert_eq!(parts[2], FragmentPart::Text("bold"));
        assert_eq!(parts[4], FragmentPart::Text("."));
    }

    #[test]
    fn test_adjacent_codes() {
        let mut fragment = TextFragment::new();
        fragment
            .append_code(Code::new(TagType::Placeholder, "x", 1, "<tags1/>"))
            .unwrap();
        fragment
            .append_code(Code::new(TagType::Placeholder, "x", 2, "<tags2/>"))
            .unwrap();
        assert!(!fragment.has_text());
        assert_eq!(fragment.to_string(), "<tags1/><tags2/>");
        assert_eq!(fragment.code(2, TagType::Placeholder).map(Code::data), Some("<tags2/>"));
    }

    #[test]
    fn test_marker_characters_dropped() {
        let fragment = TextFragment::from_text("a\u{E101}b");
        assert_eq!(fragment.coded_text(), "ab");
        assert!(fragment.codes().is_empty());
    }

    #[test]
    fn test_dangling_marker() {
        let fragment = TextFragment {
            coded_text: format!("x{MARKER_OPENING}"),
            codes: Vec::new(),
        };
        let parts = fragment.parts();
        assert!(parts[0].is_ok());
        assert!(parts[1].is_err());
    }
}
