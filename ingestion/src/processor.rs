use crate::analyzer::{AnalyzedContent, ContentAnalyzer};
use crate::extract::{detect_content_kind, ContentKind, DefaultTextExtractor, ExtractError, TextExtractor};
use curriculum::principles::applicable_principles;
use curriculum::{order_topics, KnowledgeGraph, LessonAssembler, LessonContent, TemplateContent};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lessonforge_core::error::{ErrorCode, LessonForgeError};
use lessonforge_core::lesson::Lesson;
use lessonforge_core::model::TopicId;
use std::sync::Arc;
use storage::store::StoreError;
use storage::ModuleCatalog;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Unsupported content type: {0}")]
    UnsupportedType(String),
    #[error("Content extraction failed: {0}")]
    Extraction(#[from] ExtractError),
    #[error("Ingestion already in progress for {0}")]
    InFlight(String),
}

impl LessonForgeError for IngestionError {
    fn error_code(&self) -> ErrorCode {
        match self {
            IngestionError::Storage(err) => err.error_code(),
            IngestionError::UnsupportedType(_) => ErrorCode::InvalidArgument,
            IngestionError::Extraction(_) => ErrorCode::InvalidArgument,
            IngestionError::InFlight(_) => ErrorCode::Conflict,
        }
    }
}

/// A document submitted for lesson generation.
#[derive(Debug, Clone)]
pub struct DocumentRequest {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DocumentRequest {
    /// Content kind is taken from the file extension unless a MIME type is set.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: String::new(),
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }
}

/// Output of the in-memory pipeline for one document's text.
#[derive(Debug, Clone)]
pub struct Curriculum {
    pub analysis: AnalyzedContent,
    pub graph: KnowledgeGraph,
    /// Topic ids in lesson order.
    pub order: Vec<TopicId>,
    /// Topics left out of `order` by a prerequisite cycle.
    pub omitted: Vec<TopicId>,
    pub lessons: Vec<Lesson>,
}

/// Segment, infer, build the graph, order and assemble. Never fails; text
/// without headings produces an empty curriculum.
pub fn generate_curriculum(text: &str, content: &dyn LessonContent) -> Curriculum {
    let analysis = ContentAnalyzer.analyze(text);
    let graph = KnowledgeGraph::build(&analysis.topics, &analysis.relationships);
    let principles = applicable_principles(&analysis.principles);

    let ordering = order_topics(&analysis.topics, &analysis.relationships);
    let lessons = LessonAssembler::new(&analysis.topics, content)
        .with_concepts(&analysis.concepts)
        .with_principles(&principles)
        .assemble(&ordering.ordered, &analysis.relationships);
    let order = ordering.ordered_ids();
    let omitted = ordering.omitted;

    Curriculum {
        analysis,
        graph,
        order,
        omitted,
        lessons,
    }
}

#[derive(Debug, Clone)]
pub struct IngestionOutcome {
    pub module_file: String,
    pub analysis: AnalyzedContent,
    pub graph: KnowledgeGraph,
    pub lessons: Vec<Lesson>,
    pub lesson_row_ids: Vec<u64>,
    /// True when the store already held this document's lessons.
    pub already_stored: bool,
}

struct InFlightGuard {
    key: String,
    in_flight: Arc<DashMap<String, ()>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.remove(&self.key);
    }
}

pub struct IngestionPipeline {
    catalog: Arc<ModuleCatalog>,
    extractor: Box<dyn TextExtractor>,
    content: Box<dyn LessonContent>,
    // Store files with an ingestion currently running.
    in_flight: Arc<DashMap<String, ()>>,
}

impl IngestionPipeline {
    pub fn new(catalog: Arc<ModuleCatalog>) -> Self {
        Self::with_components(
            catalog,
            Box::new(DefaultTextExtractor),
            Box::new(TemplateContent),
        )
    }

    pub fn with_components(
        catalog: Arc<ModuleCatalog>,
        extractor: Box<dyn TextExtractor>,
        content: Box<dyn LessonContent>,
    ) -> Self {
        Self {
            catalog,
            extractor,
            content,
            in_flight: Arc::new(DashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Arc<ModuleCatalog> {
        &self.catalog
    }

    /// Extracts, analyzes and stores one document.
    ///
    /// The document's store file is derived from its name and bytes, so
    /// re-ingesting identical bytes finds the earlier lessons and returns
    /// their row ids instead of storing a second copy.
    pub async fn ingest(&self, request: DocumentRequest) -> Result<IngestionOutcome, IngestionError> {
        let kind = detect_content_kind(&request.mime_type, Some(&request.name));
        if kind == ContentKind::Unsupported {
            return Err(IngestionError::UnsupportedType(request.name));
        }

        let module_file = ModuleCatalog::module_file_name(&request.name, &request.bytes);
        let _guard = self.acquire(&module_file)?;

        let text = self.extractor.extract(kind, &request.bytes).await?;
        let curriculum = generate_curriculum(&text, self.content.as_ref());

        let store = self.catalog.open_or_create(&module_file).await?;
        let (lesson_row_ids, already_stored) = if store.has_module().await {
            (store.lesson_ids().await, true)
        } else {
            (store.store_lessons(&request.name, &curriculum.lessons).await?, false)
        };

        tracing::info!(
            document = %request.name,
            file = %module_file,
            topics = curriculum.analysis.topics.len(),
            lessons = curriculum.lessons.len(),
            already_stored,
            "document ingested"
        );

        Ok(IngestionOutcome {
            module_file,
            analysis: curriculum.analysis,
            graph: curriculum.graph,
            lessons: curriculum.lessons,
            lesson_row_ids,
            already_stored,
        })
    }

    fn acquire(&self, key: &str) -> Result<InFlightGuard, IngestionError> {
        match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(_) => return Err(IngestionError::InFlight(key.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(());
            }
        }
        Ok(InFlightGuard {
            key: key.to_string(),
            in_flight: self.in_flight.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "\
Chapter 1: Sets
Sets collect objects. Order does not matter.
Chapter 2: Functions
Functions builds on Sets and maps inputs.
Chapter 3: Limits
Limits requires Functions.
";

    #[test]
    fn curriculum_orders_lessons_by_prerequisite() {
        let curriculum = generate_curriculum(TEXT, &TemplateContent);

        assert_eq!(curriculum.order, vec![1, 2, 3]);
        assert!(curriculum.omitted.is_empty());
        let ids: Vec<&str> = curriculum.lessons.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["lesson-1", "lesson-2", "lesson-3"]);
        assert_eq!(curriculum.lessons[1].prerequisites.len(), 1);
        assert_eq!(curriculum.lessons[1].prerequisites[0].id, 1);
        assert_eq!(curriculum.graph.stats().prerequisite_edges, 2);

        let principles: Vec<&str> = curriculum.lessons[0]
            .principles
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(principles, vec!["Knowledge Graph", "Scaffolded Mastery Learning"]);
    }

    #[test]
    fn segmented_topics_use_a_single_content_section() {
        let text = "Chapter 1: Sets\nFirst paragraph.\n\nSecond paragraph.\n\nThird paragraph.\n";
        let curriculum = generate_curriculum(text, &TemplateContent);

        assert!(!curriculum.analysis.topics[0].content.contains("\n\n"));
        let titles: Vec<&str> = curriculum.lessons[0]
            .sections
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Introduction", "Content", "Summary"]);
    }

    #[test]
    fn heading_less_text_gives_an_empty_curriculum() {
        let curriculum = generate_curriculum("no headings here", &TemplateContent);
        assert!(curriculum.lessons.is_empty());
        assert!(curriculum.graph.nodes().is_empty());
    }

    #[test]
    fn in_flight_guard_releases_on_drop() {
        let catalog = Arc::new(ModuleCatalog::new("unused", Default::default()));
        let pipeline = IngestionPipeline::new(catalog);

        let guard = pipeline.acquire("doc.module").unwrap();
        assert!(matches!(
            pipeline.acquire("doc.module"),
            Err(IngestionError::InFlight(_))
        ));
        drop(guard);
        assert!(pipeline.acquire("doc.module").is_ok());
    }
}
