/// Skippable element rules.
///
/// Each rule answers whether an element may be dropped in a given context
/// and consumes it from the stream when asked to. Cross-structure rules
/// pair range start and end markers by their `w:id` and therefore carry
/// state between calls.
use crate::ooxml::config::FilterOptions;
use crate::ooxml::error::{OoxmlError, Result};
use crate::ooxml::event::names::{
    LOCAL_ID, LOCAL_NAME, LOCAL_NUMBERING_PROPERTIES, LOCAL_TABLE_GRID, dml, mc, sml, wpml,
};
use crate::ooxml::event::{EndElement, EventReader, QName, StartElement, XmlEvent};

/// The bookmark Word inserts to remember the last edit position.
pub const SKIPPABLE_BOOKMARK_NAME: &str = "_GoBack";

const REVISION_INLINE: &[&str] = &["ins", "del", "moveTo", "moveFrom"];
const REVISION_CROSS_STRUCTURE: &[&str] =
    &["moveToRangeStart", "moveToRangeEnd", "moveFromRangeStart", "moveFromRangeEnd"];
const REVISION_PROPERTY: &[&str] = &[
    "ins",
    "del",
    "moveTo",
    "moveFrom",
    "pPrChange",
    "rPrChange",
    "sectPrChange",
    "tblGridChange",
    "tblPrChange",
    "tblPrExChange",
    "tcPrChange",
    "trPrChange",
    "numberingChange",
];
const AGGRESSIVE_RUN_PROPERTIES: &[&str] = &["bCs", "iCs", "spacing", "szCs", "w"];

/// Character spacing is only dropped directly inside `w:rPr`.
const CONTEXT_AWARE_PROPERTY: &[(&str, &str)] = &[("rPr", "spacing")];

/// Revision properties kept in these parents while revisions are not
/// accepted automatically.
const CONTEXT_AWARE_REVISION_PROPERTY: &[(&str, &str)] = &[
    (LOCAL_NUMBERING_PROPERTIES, "ins"),
    ("tblPr", "tblPrChange"),
    (LOCAL_TABLE_GRID, "tblGridChange"),
    ("trPr", "ins"),
    ("trPr", "del"),
];

fn is_wpml_named(name: &QName, locals: &[&str]) -> bool {
    name.is_in(crate::ooxml::event::names::WORDPROCESSING_ML) && locals.contains(&name.local.as_str())
}

fn context_pair_present(start: &StartElement, parent: Option<&StartElement>, pairs: &[(&str, &str)]) -> bool {
    let Some(parent) = parent else {
        return false;
    };
    pairs
        .iter()
        .any(|(p, c)| parent.name == wpml(p) && start.name == wpml(c))
}

fn context_value_present(start: &StartElement, pairs: &[(&str, &str)]) -> bool {
    pairs.iter().any(|(_, c)| start.name == wpml(c))
}

/// Consume events up to and including the end of `start`.
pub fn skip_element(start: &StartElement, reader: &mut EventReader<'_>) -> Result<()> {
    let mut depth = 0usize;
    while let Some(event) = reader.next_event()? {
        match &event {
            XmlEvent::StartElement(e) if e.name == start.name => depth += 1,
            XmlEvent::EndElement(e) if e.name == start.name => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            },
            _ => {},
        }
    }
    Err(OoxmlError::structure(format!("Unterminated skippable element {}", start.name)))
}

fn unexpected_revision(start: &StartElement) -> OoxmlError {
    OoxmlError::UnexpectedRevision(start.name.qualified())
}

/// A range marker pair such as `w:bookmarkStart`/`w:bookmarkEnd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossStructure {
    start_name: QName,
    end_name: QName,
    identifier: Option<String>,
}

impl CrossStructure {
    /// Both names must follow the `...Start`/`...End` convention.
    pub fn new(start_name: QName, end_name: QName) -> Result<Self> {
        if !start_name.local.ends_with("Start") {
            return Err(OoxmlError::InvalidArgument(format!(
                "The start skippable element is invalid: '{}'",
                start_name
            )));
        }
        if !end_name.local.ends_with("End") {
            return Err(OoxmlError::InvalidArgument(format!(
                "The end skippable element is invalid: '{}'",
                end_name
            )));
        }
        Ok(Self {
            start_name,
            end_name,
            identifier: None,
        })
    }

    fn wpml_pair(start: &str, end: &str) -> Self {
        Self {
            start_name: wpml(start),
            end_name: wpml(end),
            identifier: None,
        }
    }

    fn is_matching_end(&self, start: &StartElement) -> bool {
        self.end_name == start.name && self.identifier.as_deref() == start.attribute(&wpml(LOCAL_ID))
    }

    fn can_be_skipped(&self, start: &StartElement) -> bool {
        self.start_name == start.name || self.is_matching_end(start)
    }

    fn skip(&mut self, start: &StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        skip_element(start, reader)?;
        self.identifier = if self.start_name == start.name {
            start.attribute(&wpml(LOCAL_ID)).map(str::to_string)
        } else {
            None
        };
        Ok(())
    }

    fn is_revision(&self, start: &StartElement) -> bool {
        is_wpml_named(&start.name, REVISION_CROSS_STRUCTURE)
    }
}

/// A skippable element rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkippableElements {
    Empty,
    /// Whole elements with the given names
    Default(Vec<QName>),
    /// Whole inline elements with the given names
    Inline(Vec<QName>),
    /// Tracked change wrappers: insertions keep their content, deletions are dropped
    RevisionInline { names: Vec<QName>, accept_revisions: bool },
    CrossStructure(CrossStructure),
    BookmarkCrossStructure { cross: CrossStructure, bookmark_name: String },
    RevisionCrossStructure { cross: CrossStructure, accept_revisions: bool },
    /// Drops everything from a move-from range start through its range end
    MoveFromRevisionCrossStructure {
        cross: CrossStructure,
        accept_revisions: bool,
        structure_name: String,
        structure_crossed: bool,
    },
    /// Property elements, with character spacing only dropped inside `w:rPr`
    Property(Vec<QName>),
    RevisionProperty { names: Vec<QName>, accept_revisions: bool },
}

impl SkippableElements {
    /// A property rule; aggressive cleanup adds complex script and spacing properties.
    pub fn property(names: Vec<QName>, options: &FilterOptions) -> Self {
        SkippableElements::Property(Self::property_names(names, options))
    }

    pub fn revision_property(names: Vec<QName>, options: &FilterOptions) -> Self {
        SkippableElements::RevisionProperty {
            names: Self::property_names(names, options),
            accept_revisions: options.automatically_accept_revisions,
        }
    }

    fn property_names(mut names: Vec<QName>, options: &FilterOptions) -> Vec<QName> {
        if options.cleanup_aggressively {
            names.extend(AGGRESSIVE_RUN_PROPERTIES.iter().map(|n| wpml(n)));
        }
        names
    }

    /// Properties dropped from run properties.
    pub fn run_properties(options: &FilterOptions) -> Self {
        Self::revision_property(
            vec![dml("rtl"), wpml("lang"), wpml("noProof"), wpml("rPrChange")],
            options,
        )
    }

    /// Properties dropped from paragraph properties and their nested run properties.
    pub fn block_properties(options: &FilterOptions) -> Self {
        Self::revision_property(
            vec![
                dml("rtl"),
                wpml("lang"),
                wpml("noProof"),
                wpml("ins"),
                wpml("moveTo"),
                wpml("moveFrom"),
                wpml("pPrChange"),
                wpml("rPrChange"),
            ],
            options,
        )
    }

    /// Phonetic runs and properties of shared string items.
    pub fn phonetic() -> Self {
        SkippableElements::Inline(vec![sml("rPh"), sml("phoneticPr")])
    }

    pub fn can_be_skipped(&self, start: &StartElement, parent: Option<&StartElement>) -> bool {
        match self {
            SkippableElements::Empty => false,
            SkippableElements::Default(names) | SkippableElements::Inline(names) => names.contains(&start.name),
            SkippableElements::RevisionInline { names, .. } => names.contains(&start.name),
            SkippableElements::CrossStructure(cross)
            | SkippableElements::RevisionCrossStructure { cross, .. }
            | SkippableElements::MoveFromRevisionCrossStructure { cross, .. } => cross.can_be_skipped(start),
            SkippableElements::BookmarkCrossStructure { cross, bookmark_name } => {
                (cross.start_name == start.name
                    && start.attribute(&wpml(LOCAL_NAME)) == Some(bookmark_name.as_str()))
                    || cross.is_matching_end(start)
            },
            SkippableElements::Property(names) => Self::property_can_be_skipped(names, start, parent),
            SkippableElements::RevisionProperty {
                names,
                accept_revisions,
            } => {
                Self::property_can_be_skipped(names, start, parent)
                    && (*accept_revisions || !context_pair_present(start, parent, CONTEXT_AWARE_REVISION_PROPERTY))
            },
        }
    }

    fn property_can_be_skipped(names: &[QName], start: &StartElement, parent: Option<&StartElement>) -> bool {
        names.contains(&start.name)
            && (!context_value_present(start, CONTEXT_AWARE_PROPERTY)
                || context_pair_present(start, parent, CONTEXT_AWARE_PROPERTY))
    }

    /// Whether a free-standing end element is dropped.
    ///
    /// Only inline rules match end elements; the tags of inserted content
    /// are dropped separately from their content.
    pub fn can_skip_end(&self, end: &EndElement) -> bool {
        match self {
            SkippableElements::Default(names)
            | SkippableElements::Inline(names)
            | SkippableElements::RevisionInline { names, .. } => names.contains(&end.name),
            _ => false,
        }
    }

    /// Consume `start`, the event most recently taken from `reader`.
    pub fn skip(&mut self, start: &StartElement, reader: &mut EventReader<'_>) -> Result<()> {
        match self {
            SkippableElements::Empty => Ok(()),
            SkippableElements::Default(_) | SkippableElements::Inline(_) | SkippableElements::Property(_) => {
                skip_element(start, reader)
            },
            SkippableElements::RevisionInline { accept_revisions, .. } => {
                if !*accept_revisions && is_wpml_named(&start.name, REVISION_INLINE) {
                    return Err(unexpected_revision(start));
                }
                if start.name == wpml("ins") || start.name == wpml("moveTo") {
                    return Ok(());
                }
                skip_element(start, reader)
            },
            SkippableElements::CrossStructure(cross) | SkippableElements::BookmarkCrossStructure { cross, .. } => {
                cross.skip(start, reader)
            },
            SkippableElements::RevisionCrossStructure {
                cross,
                accept_revisions,
            } => {
                if !*accept_revisions && cross.is_revision(start) {
                    return Err(unexpected_revision(start));
                }
                cross.skip(start, reader)
            },
            SkippableElements::MoveFromRevisionCrossStructure {
                cross,
                accept_revisions,
                structure_name,
                structure_crossed,
            } => {
                if !*accept_revisions && cross.is_revision(start) {
                    return Err(unexpected_revision(start));
                }
                cross.skip(start, reader)?;

                while let Some(event) = reader.next_event()? {
                    match &event {
                        XmlEvent::EndElement(e) if e.name.local == *structure_name => *structure_crossed = true,
                        XmlEvent::StartElement(e) if e.name.local == *structure_name => *structure_crossed = false,
                        XmlEvent::StartElement(e) if e.name == cross.end_name => {
                            return cross.skip(e, reader);
                        },
                        _ => {},
                    }
                }
                Err(OoxmlError::structure(format!("Unterminated move-from range {}", start.name)))
            },
            SkippableElements::RevisionProperty { accept_revisions, .. } => {
                if !*accept_revisions && is_wpml_named(&start.name, REVISION_PROPERTY) {
                    return Err(unexpected_revision(start));
                }
                skip_element(start, reader)
            },
        }
    }

    /// Whether a move-from range ran across the end of the enclosing structure.
    pub fn is_structure_crossed(&self) -> bool {
        matches!(
            self,
            SkippableElements::MoveFromRevisionCrossStructure {
                structure_crossed: true,
                ..
            }
        )
    }
}

/// Rules applied to the children of a run.
#[derive(Debug, Clone)]
pub struct RunSkippableElements {
    run_start: StartElement,
    ignore_soft_hyphen: bool,
    last_rendered_page_break: SkippableElements,
    soft_hyphen: SkippableElements,
    alternate_content_fallback: SkippableElements,
    properties: SkippableElements,
}

impl RunSkippableElements {
    pub fn new(run_start: &StartElement, options: &FilterOptions) -> Self {
        Self {
            run_start: run_start.clone(),
            ignore_soft_hyphen: options.ignore_soft_hyphen,
            last_rendered_page_break: SkippableElements::Inline(vec![wpml("lastRenderedPageBreak")]),
            soft_hyphen: SkippableElements::Inline(vec![wpml("softHyphen")]),
            alternate_content_fallback: SkippableElements::Inline(vec![mc("Fallback")]),
            properties: SkippableElements::run_properties(options),
        }
    }

    /// Skip `event` when a rule applies; `event` must have just been read.
    pub fn skip(&mut self, event: &XmlEvent, reader: &mut EventReader<'_>) -> Result<bool> {
        let Some(start) = event.as_start_element() else {
            return Ok(false);
        };
        let parent = Some(&self.run_start);
        if self.last_rendered_page_break.can_be_skipped(start, parent) {
            self.last_rendered_page_break.skip(start, reader)?;
            return Ok(true);
        }
        if self.ignore_soft_hyphen && self.soft_hyphen.can_be_skipped(start, parent) {
            self.soft_hyphen.skip(start, reader)?;
            return Ok(true);
        }
        if self.alternate_content_fallback.can_be_skipped(start, parent) {
            self.alternate_content_fallback.skip(start, reader)?;
            return Ok(true);
        }
        self.skip_properties(event, reader)
    }

    pub fn skip_properties(&mut self, event: &XmlEvent, reader: &mut EventReader<'_>) -> Result<bool> {
        match event.as_start_element() {
            Some(start) if self.properties.can_be_skipped(start, Some(&self.run_start)) => {
                self.properties.skip(start, reader)?;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    /// The property rule, for run property parsing.
    pub fn properties(&self) -> &SkippableElements {
        &self.properties
    }
}

/// Rules applied to the children of a block.
#[derive(Debug, Clone)]
pub struct BlockSkippableElements {
    block_start: StartElement,
    inserted_and_moved_to: SkippableElements,
    deleted_moved_from_and_proofing_errors: SkippableElements,
    bookmarks: SkippableElements,
    move_to_range: SkippableElements,
    move_from_range: SkippableElements,
}

impl BlockSkippableElements {
    pub fn new(block_start: &StartElement, options: &FilterOptions) -> Self {
        let accept_revisions = options.automatically_accept_revisions;
        Self {
            block_start: block_start.clone(),
            inserted_and_moved_to: SkippableElements::RevisionInline {
                names: vec![wpml("ins"), wpml("moveTo")],
                accept_revisions,
            },
            deleted_moved_from_and_proofing_errors: SkippableElements::RevisionInline {
                names: vec![wpml("del"), wpml("moveFrom"), wpml("proofErr")],
                accept_revisions,
            },
            bookmarks: SkippableElements::BookmarkCrossStructure {
                cross: CrossStructure::wpml_pair("bookmarkStart", "bookmarkEnd"),
                bookmark_name: SKIPPABLE_BOOKMARK_NAME.to_string(),
            },
            move_to_range: SkippableElements::RevisionCrossStructure {
                cross: CrossStructure::wpml_pair("moveToRangeStart", "moveToRangeEnd"),
                accept_revisions,
            },
            move_from_range: SkippableElements::MoveFromRevisionCrossStructure {
                cross: CrossStructure::wpml_pair("moveFromRangeStart", "moveFromRangeEnd"),
                accept_revisions,
                structure_name: block_start.name.local.clone(),
                structure_crossed: false,
            },
        }
    }

    /// Skip `event` when a rule applies; `event` must have just been read.
    pub fn skip(&mut self, event: &XmlEvent, reader: &mut EventReader<'_>) -> Result<bool> {
        match event {
            XmlEvent::StartElement(start) => {
                let parent = Some(&self.block_start);
                if self.inserted_and_moved_to.can_be_skipped(start, parent) {
                    self.inserted_and_moved_to.skip(start, reader)?;
                    return Ok(true);
                }
                if self.deleted_moved_from_and_proofing_errors.can_be_skipped(start, parent) {
                    self.deleted_moved_from_and_proofing_errors.skip(start, reader)?;
                    return Ok(true);
                }
                for rule in [
                    &mut self.bookmarks,
                    &mut self.move_to_range,
                    &mut self.move_from_range,
                ] {
                    if rule.can_be_skipped(start, None) {
                        rule.skip(start, reader)?;
                        return Ok(true);
                    }
                }
                Ok(false)
            },
            XmlEvent::EndElement(end) => Ok(self.inserted_and_moved_to.can_skip_end(end)),
            _ => Ok(false),
        }
    }

    /// Whether a skipped move-from range ran past the end of the block.
    #[inline]
    pub fn is_border_crossed(&self) -> bool {
        self.move_from_range.is_structure_crossed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn reader_at_first_child(xml: &str) -> (EventReader<'_>, StartElement) {
        let mut reader = EventReader::from_str(xml);
        reader.next_event().unwrap();
        let child = reader.next_event().unwrap().unwrap();
        (reader, child.as_start_element().unwrap().clone())
    }

    #[test]
    fn test_default_skip_consumes_element() {
        let xml = format!("<w:p {W}><w:proofErr w:type=\"spellStart\"/><w:r/></w:p>");
        let (mut reader, child) = reader_at_first_child(&xml);
        let mut rule = SkippableElements::Default(vec![wpml("proofErr")]);
        assert!(rule.can_be_skipped(&child, None));
        rule.skip(&child, &mut reader).unwrap();
        assert!(reader.next_event().unwrap().unwrap().is_start_named("r"));
    }

    #[test]
    fn test_unterminated_skip_is_structural_error() {
        let events = vec![XmlEvent::start(wpml("lang"))];
        let mut reader = EventReader::from_events(events);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        let err = skip_element(&start, &mut reader).unwrap_err();
        assert!(matches!(err, OoxmlError::UnexpectedStructure(_)));
    }

    #[test]
    fn test_character_spacing_context() {
        let options = FilterOptions::new().with_cleanup_aggressively(true);
        let rule = SkippableElements::run_properties(&options);
        let spacing = StartElement::new(wpml("spacing"));
        assert!(rule.can_be_skipped(&spacing, Some(&StartElement::new(wpml("rPr")))));
        assert!(!rule.can_be_skipped(&spacing, Some(&StartElement::new(wpml("pPr")))));
        assert!(!SkippableElements::run_properties(&FilterOptions::default())
            .can_be_skipped(&spacing, Some(&StartElement::new(wpml("rPr")))));
    }

    #[test]
    fn test_revision_property_context_kept_without_acceptance() {
        let options = FilterOptions::new().with_automatically_accept_revisions(false);
        let rule = SkippableElements::revision_property(vec![wpml("ins")], &options);
        let ins = StartElement::new(wpml("ins"));
        assert!(!rule.can_be_skipped(&ins, Some(&StartElement::new(wpml("numPr")))));
        assert!(rule.can_be_skipped(&ins, Some(&StartElement::new(wpml("rPr")))));
    }

    #[test]
    fn test_unaccepted_revision_property_is_an_error() {
        let options = FilterOptions::new().with_automatically_accept_revisions(false);
        let mut rule = SkippableElements::block_properties(&options);
        let events = vec![XmlEvent::start(wpml("pPrChange")), XmlEvent::end(wpml("pPrChange"))];
        let mut reader = EventReader::from_events(events);
        let start = reader.next_event().unwrap().unwrap().as_start_element().unwrap().clone();
        assert!(matches!(
            rule.skip(&start, &mut reader),
            Err(OoxmlError::UnexpectedRevision(_))
        ));
    }

    #[test]
    fn test_bookmark_go_back_only() {
        let rule = SkippableElements::BookmarkCrossStructure {
            cross: CrossStructure::wpml_pair("bookmarkStart", "bookmarkEnd"),
            bookmark_name: SKIPPABLE_BOOKMARK_NAME.to_string(),
        };
        let go_back = StartElement::new(wpml("bookmarkStart"))
            .with_attribute(wpml("id"), "0")
            .with_attribute(wpml("name"), "_GoBack");
        let named = StartElement::new(wpml("bookmarkStart")).with_attribute(wpml("name"), "Intro");
        assert!(rule.can_be_skipped(&go_back, None));
        assert!(!rule.can_be_skipped(&named, None));
    }

    #[test]
    fn test_cross_structure_pairs_by_identifier() {
        let xml = format!(
            r#"<w:p {W}><w:bookmarkStart w:id="7" w:name="_GoBack"/><w:bookmarkEnd w:id="3"/><w:bookmarkEnd w:id="7"/></w:p>"#
        );
        let (mut reader, child) = reader_at_first_child(&xml);
        let mut rule = SkippableElements::BookmarkCrossStructure {
            cross: CrossStructure::wpml_pair("bookmarkStart", "bookmarkEnd"),
            bookmark_name: SKIPPABLE_BOOKMARK_NAME.to_string(),
        };
        rule.skip(&child, &mut reader).unwrap();

        let other = reader.next_event().unwrap().unwrap();
        assert!(!rule.can_be_skipped(other.as_start_element().unwrap(), None));
        reader.next_event().unwrap();
        let matching = reader.next_event().unwrap().unwrap();
        assert!(rule.can_be_skipped(matching.as_start_element().unwrap(), None));
    }

    #[test]
    fn test_cross_structure_name_validation() {
        assert!(CrossStructure::new(wpml("bookmarkEnd"), wpml("bookmarkStart")).is_err());
        assert!(CrossStructure::new(wpml("commentRangeStart"), wpml("commentRangeEnd")).is_ok());
    }

    #[test]
    fn test_inserted_content_keeps_children() {
        let xml = format!("<w:p {W}><w:ins w:id=\"1\"><w:r/></w:ins></w:p>");
        let (mut reader, child) = reader_at_first_child(&xml);
        let mut rules = BlockSkippableElements::new(&StartElement::new(wpml("p")), &FilterOptions::default());
        assert!(rules.skip(&XmlEvent::StartElement(child), &mut reader).unwrap());

        let run = reader.next_event().unwrap().unwrap();
        assert!(run.is_start_named("r"));
        reader.next_event().unwrap();
        let end = reader.next_event().unwrap().unwrap();
        assert!(rules.skip(&end, &mut reader).unwrap());
    }

    #[test]
    fn test_deleted_content_is_dropped() {
        let xml = format!("<w:p {W}><w:del><w:r><w:delText>x</w:delText></w:r></w:del><w:r/></w:p>");
        let (mut reader, child) = reader_at_first_child(&xml);
        let mut rules = BlockSkippableElements::new(&StartElement::new(wpml("p")), &FilterOptions::default());
        assert!(rules.skip(&XmlEvent::StartElement(child), &mut reader).unwrap());
        assert!(reader.next_event().unwrap().unwrap().is_start_named("r"));
    }

    #[test]
    fn test_move_from_range_within_block() {
        let xml = format!(
            r#"<w:p {W}><w:moveFromRangeStart w:id="1"/><w:r/><w:moveFromRangeEnd w:id="1"/><w:r/></w:p>"#
        );
        let (mut reader, child) = reader_at_first_child(&xml);
        let mut rules = BlockSkippableElements::new(&StartElement::new(wpml("p")), &FilterOptions::default());
        assert!(rules.skip(&XmlEvent::StartElement(child), &mut reader).unwrap());
        assert!(!rules.is_border_crossed());
        assert!(reader.next_event().unwrap().unwrap().is_start_named("r"));
    }

    #[test]
    fn test_move_from_range_crossing_block_border() {
        let xml = format!(
            r#"<w:body {W}><w:p><w:moveFromRangeStart w:id="1"/><w:r/></w:p><w:moveFromRangeEnd w:id="1"/><w:p/></w:body>"#
        );
        let mut reader = EventReader::from_str(&xml);
        reader.next_event().unwrap();
        reader.next_event().unwrap();
        let child = reader.next_event().unwrap().unwrap();
        let mut rules = BlockSkippableElements::new(&StartElement::new(wpml("p")), &FilterOptions::default());
        assert!(rules.skip(&child, &mut reader).unwrap());
        assert!(rules.is_border_crossed());
        assert!(reader.next_event().unwrap().unwrap().is_start_named("p"));
    }

    #[test]
    fn test_run_soft_hyphen_only_when_ignored() {
        let xml = format!("<w:r {W}><w:softHyphen/><w:t>a</w:t></w:r>");
        let (mut reader, child) = reader_at_first_child(&xml);
        let run = StartElement::new(wpml("r"));
        let event = XmlEvent::StartElement(child);

        let mut keep = RunSkippableElements::new(&run, &FilterOptions::default());
        assert!(!keep.skip(&event, &mut reader).unwrap());

        let mut drop = RunSkippableElements::new(&run, &FilterOptions::new().with_ignore_soft_hyphen(true));
        assert!(drop.skip(&event, &mut reader).unwrap());
        assert!(reader.next_event().unwrap().unwrap().is_start_named("t"));
    }
}
