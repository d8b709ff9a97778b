pub mod analyzer;
pub mod concepts;
pub mod extract;
pub mod principles;
pub mod processor;
pub mod relations;
pub mod segmenter;

pub use analyzer::{AnalyzedContent, ContentAnalyzer};
pub use extract::{ContentKind, DefaultTextExtractor, ExtractError, TextExtractor};
pub use processor::{
    generate_curriculum, Curriculum, DocumentRequest, IngestionError, IngestionOutcome,
    IngestionPipeline,
};
pub use relations::infer_relationships;
pub use segmenter::segment;
