//! Office Open XML run and style reconstruction.
//!
//! The modules are layered bottom-up:
//!
//! 1. **Events** (`event`): owned, namespace-resolved XML events with a
//!    streaming reader and a serializer.
//! 2. **Property model** (`properties`, `markup`, `styles`): run and block
//!    properties, markup components, and the style cascade of Word
//!    `styles.xml` and DrawingML list styles.
//! 3. **Chunking** (`chunk`, `parser`, `policy`): paragraphs and shared
//!    string items parsed into blocks of markup, runs and run containers,
//!    with adjacent equivalent runs merged and noise markup dropped.
//! 4. **Rewriting** (`optimisation`, `clarification`, `projection`):
//!    common run properties hoisted into styles, text direction made
//!    explicit for the target language, and blocks projected to text
//!    units with inline codes and written back.
//!
//! # Example
//!
//! ```rust
//! use runweave::ooxml::chunk::IdGenerator;
//! use runweave::ooxml::config::FilterOptions;
//! use runweave::ooxml::event::EventReader;
//! use runweave::ooxml::optimisation::StyleOptimisation;
//! use runweave::ooxml::parser::BlockParser;
//! use runweave::ooxml::projection::BlockTextUnitMapper;
//! use runweave::ooxml::styles::StyleDefinitions;
//!
//! let xml = concat!(
//!     r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
//!     r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">Hello </w:t></w:r>"#,
//!     r#"<w:r><w:rPr><w:b/></w:rPr><w:t>world</w:t></w:r></w:p>"#,
//! );
//! let mut reader = EventReader::from_str(xml);
//! let start = reader.next_event()?.and_then(|e| e.as_start_element().cloned()).unwrap();
//! let options = FilterOptions::default();
//! let styles = StyleDefinitions::Empty.shared();
//! let optimisation = StyleOptimisation::for_paragraph(&start.name, styles.clone());
//! let block = BlockParser::new(&start, &options, styles, optimisation).parse(&mut reader, &mut IdGenerator::new())?;
//!
//! let units = BlockTextUnitMapper::new("p1", &block).map()?;
//! assert_eq!(units.len(), 1);
//! # Ok::<(), runweave::ooxml::OoxmlError>(())
//! ```

pub mod chunk;
pub mod clarification;
pub mod config;
pub mod error;
pub mod event;
pub mod markup;
pub mod optimisation;
pub mod parser;
pub mod policy;
pub mod projection;
pub mod properties;
pub mod styles;

pub use error::{OoxmlError, Result};
