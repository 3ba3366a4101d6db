//! Namespace URIs and well-known element names.
//!
//! OOXML dialects share a handful of element local names (`p`, `r`, `t`,
//! `pPr`, `rPr`) across namespaces, so most structural checks compare
//! local names only. Skippable-element policies compare fully qualified
//! names.

use super::QName;

/// WordprocessingML main namespace
pub const WORDPROCESSING_ML: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
/// DrawingML main namespace
pub const DRAWING_ML: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
/// SpreadsheetML main namespace
pub const SPREADSHEET_ML: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
/// PresentationML main namespace
pub const PRESENTATION_ML: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
/// Office Math namespace
pub const MATH: &str = "http://schemas.openxmlformats.org/officeDocument/2006/math";
/// Markup compatibility namespace
pub const MARKUP_COMPATIBILITY: &str = "http://schemas.openxmlformats.org/markup-compatibility/2006";
/// Document relationships namespace
pub const DOCUMENT_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
/// WordprocessingML drawing namespace
pub const WORDPROCESSING_DRAWING: &str =
    "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
/// VML namespace
pub const VML: &str = "urn:schemas-microsoft-com:vml";
/// The reserved `xml` namespace
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

/// Conventional prefixes.
pub const PREFIX_W: &str = "w";
pub const PREFIX_A: &str = "a";
pub const PREFIX_XML: &str = "xml";

pub const LOCAL_PARAGRAPH: &str = "p";
pub const LOCAL_RUN: &str = "r";
pub const LOCAL_TEXT: &str = "t";
pub const LOCAL_TAB: &str = "tab";
pub const LOCAL_BREAK: &str = "br";
pub const LOCAL_NO_BREAK_HYPHEN: &str = "noBreakHyphen";
pub const LOCAL_TYPE: &str = "type";
pub const LOCAL_PAGE: &str = "page";
pub const LOCAL_VAL: &str = "val";
pub const LOCAL_ID: &str = "id";
pub const LOCAL_NAME: &str = "name";
pub const LOCAL_SPACE: &str = "space";
pub const LOCAL_PRESERVE: &str = "preserve";
pub const LOCAL_STRING_ITEM: &str = "si";
pub const LOCAL_DOC_PR: &str = "docPr";
pub const LOCAL_TEXT_PATH: &str = "textpath";
pub const LOCAL_TABLE_GRID: &str = "tblGrid";
pub const LOCAL_NUMBERING_PROPERTIES: &str = "numPr";
pub const LOCAL_BIDI: &str = "bidi";
pub const LOCAL_BIDI_VISUAL: &str = "bidiVisual";
pub const LOCAL_RTL: &str = "rtl";
pub const LOCAL_RTL_COL: &str = "rtlCol";
pub const LOCAL_LANG: &str = "lang";
pub const LOCAL_STYLE: &str = "style";
pub const LOCAL_STYLES: &str = "styles";
pub const LOCAL_DOC_DEFAULTS: &str = "docDefaults";
pub const LOCAL_PARAGRAPH_PROPERTIES_DEFAULT: &str = "pPrDefault";
pub const LOCAL_RUN_PROPERTIES_DEFAULT: &str = "rPrDefault";
pub const LOCAL_TABLE: &str = "tbl";
pub const LOCAL_TEXT_BODY: &str = "txBody";
pub const LOCAL_SHEET_VIEW: &str = "sheetView";
pub const LOCAL_ALIGNMENT: &str = "alignment";
pub const LOCAL_PRESENTATION: &str = "presentation";

/// Build a WordprocessingML name with the conventional `w` prefix.
#[inline]
pub fn wpml(local: &str) -> QName {
    QName::new(WORDPROCESSING_ML, local, PREFIX_W)
}

/// Build a DrawingML name with the conventional `a` prefix.
#[inline]
pub fn dml(local: &str) -> QName {
    QName::new(DRAWING_ML, local, PREFIX_A)
}

/// Build a SpreadsheetML name (unprefixed by convention).
#[inline]
pub fn sml(local: &str) -> QName {
    QName::new(SPREADSHEET_ML, local, "")
}

/// Build a name in the reserved `xml` namespace.
#[inline]
pub fn xml(local: &str) -> QName {
    QName::new(XML, local, PREFIX_XML)
}

/// Build a name in the markup compatibility namespace.
#[inline]
pub fn mc(local: &str) -> QName {
    QName::new(MARKUP_COMPATIBILITY, local, "mc")
}

/// Build a name in the document relationships namespace.
#[inline]
pub fn relationships(local: &str) -> QName {
    QName::new(DOCUMENT_RELATIONSHIPS, local, "r")
}
