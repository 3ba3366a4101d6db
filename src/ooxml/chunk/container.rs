/// Run containers: hyperlinks, smart tags and structured document tags.
use super::Chunk;
use crate::ooxml::event::{QName, StartElement, XmlEvent};
use crate::ooxml::markup::{Markup, MarkupComponent};
use crate::ooxml::properties::{
    RunProperties, SMART_TAG_PROPERTIES, STRUCTURED_DOCUMENT_TAG_END_PROPERTIES, STRUCTURED_DOCUMENT_TAG_PROPERTIES,
};

const STRUCTURED_DOCUMENT_TAG_CONTENT: &str = "sdtContent";
const RUN_PROPERTIES: &str = "rPr";

/// The kind of a run container, named after its element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunContainerKind {
    Hyperlink,
    SmartTag,
    StructuredDocumentTag,
    Unsupported,
}

impl RunContainerKind {
    pub fn from_local_name(local: &str) -> Self {
        match local {
            "hyperlink" => RunContainerKind::Hyperlink,
            "smartTag" => RunContainerKind::SmartTag,
            "sdt" => RunContainerKind::StructuredDocumentTag,
            _ => RunContainerKind::Unsupported,
        }
    }

    /// Whether `start` opens a supported run container.
    pub fn is_start(start: &StartElement) -> bool {
        Self::from_local_name(&start.name.local) != RunContainerKind::Unsupported
    }

    pub fn is_properties_start(start: &StartElement) -> bool {
        matches!(
            start.name.local.as_str(),
            SMART_TAG_PROPERTIES | STRUCTURED_DOCUMENT_TAG_PROPERTIES | STRUCTURED_DOCUMENT_TAG_END_PROPERTIES
        )
    }

    /// Whether `name` is the content element of a structured document tag.
    pub fn is_content(name: &QName) -> bool {
        name.local == STRUCTURED_DOCUMENT_TAG_CONTENT
    }
}

/// Runs wrapped in structural start and end markup.
#[derive(Debug, Clone)]
pub struct RunContainer {
    start: StartElement,
    kind: RunContainerKind,
    start_markup: Markup,
    chunks: Vec<Chunk>,
    end_markup: Markup,
}

impl RunContainer {
    #[inline]
    pub fn kind(&self) -> RunContainerKind {
        self.kind
    }

    #[inline]
    pub fn start_markup(&self) -> &Markup {
        &self.start_markup
    }

    #[inline]
    pub fn end_markup(&self) -> &Markup {
        &self.end_markup
    }

    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    #[inline]
    pub fn chunks_mut(&mut self) -> &mut Vec<Chunk> {
        &mut self.chunks
    }

    /// Whether a direct child run shows text.
    pub fn contains_visible_text(&self) -> bool {
        self.chunks
            .iter()
            .any(|c| matches!(c, Chunk::Run(run) if run.contains_visible_text()))
    }

    /// The direct properties of the first run, if the container starts
    /// with one.
    pub fn default_run_properties(&self) -> RunProperties {
        match self.chunks.first() {
            Some(Chunk::Run(run)) => run.properties().clone(),
            _ => self.empty_run_properties(),
        }
    }

    pub fn default_combined_run_properties(&self) -> RunProperties {
        match self.chunks.first() {
            Some(Chunk::Run(run)) => run.combined_properties().clone(),
            _ => self.empty_run_properties(),
        }
    }

    fn empty_run_properties(&self) -> RunProperties {
        RunProperties::empty(self.start.name.sibling(RUN_PROPERTIES))
    }

    pub fn events(&self) -> Vec<XmlEvent> {
        let mut events = self.start_markup.events();
        for chunk in &self.chunks {
            events.extend(chunk.events());
        }
        events.extend(self.end_markup.events());
        events
    }
}

#[derive(Debug)]
pub struct RunContainerBuilder {
    start: StartElement,
    kind: RunContainerKind,
    start_markup: Markup,
    chunks: Vec<Chunk>,
    end_markup: Markup,
}

impl RunContainerBuilder {
    pub fn new(start: StartElement) -> Self {
        let kind = RunContainerKind::from_local_name(&start.name.local);
        Self {
            start,
            kind,
            start_markup: Markup::default(),
            chunks: Vec::new(),
            end_markup: Markup::default(),
        }
    }

    #[inline]
    pub fn kind(&self) -> RunContainerKind {
        self.kind
    }

    #[inline]
    pub fn add_to_start_markup(&mut self, component: MarkupComponent) {
        self.start_markup.add_component(component);
    }

    #[inline]
    pub fn add_to_end_markup(&mut self, component: MarkupComponent) {
        self.end_markup.add_component(component);
    }

    #[inline]
    pub fn add(&mut self, chunk: Chunk) {
        self.chunks.push(chunk);
    }

    #[inline]
    pub fn add_all(&mut self, chunks: impl IntoIterator<Item = Chunk>) {
        self.chunks.extend(chunks);
    }

    /// Add markup to the content, coalescing with trailing markup.
    pub fn add_markup(&mut self, component: MarkupComponent) {
        if let Some(Chunk::Markup(markup)) = self.chunks.last_mut() {
            markup.add_component(component);
        } else {
            self.chunks.push(Chunk::Markup(Markup::from(component)));
        }
    }

    pub fn build(self) -> RunContainer {
        RunContainer {
            start: self.start,
            kind: self.kind,
            start_markup: self.start_markup,
            chunks: self.chunks,
            end_markup: self.end_markup,
        }
    }
}
