//! Projection of blocks onto coded text and back.
//!
//! A [`BlockTextUnitMapper`] turns a parsed block into [`TextUnit`]s whose
//! source fragments carry inline codes for formatting changes and
//! non-textual markup. Writing a unit back with a translated fragment
//! rebuilds runs from the codes through the unit's skeleton.

mod fragment;
mod mapper;
mod unit;
mod writer;

pub use fragment::{Code, FragmentPart, TagType, TextFragment};
pub use mapper::{BlockTextUnitMapper, StringItemTextUnitMapper};
pub use unit::{BlockSkeleton, CodeContent, TextUnit, UnitSkeleton, resolve_references};
pub use writer::BlockTextUnitWriter;
