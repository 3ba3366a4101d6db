//! Runweave - streaming markup model and run/style reconstruction for
//! Office Open XML documents
//!
//! Paragraphs of WordprocessingML, DrawingML and SpreadsheetML shared
//! strings are read as XML events and rebuilt into blocks of markup and
//! runs. Runs that only differ by revision noise are merged, properties
//! are resolved through the style cascade, and the result can be projected
//! into translatable text units with inline codes and written back.
//!
//! # Features
//!
//! - **Event model**: Owned, namespace-aware XML events with lossless
//!   serialization
//! - **Run merging**: Adjacent runs with equivalent properties become one
//! - **Style cascade**: Word `styles.xml` and DrawingML list styles
//! - **Style optimisation**: Run properties shared by a paragraph are
//!   hoisted into a style
//! - **Direction clarification**: Right-to-left markup made explicit for
//!   the target language
//! - **Projection**: Blocks mapped to text units and written back
//!
//! See [`ooxml`] for a complete example.

pub mod common;
pub mod ooxml;
