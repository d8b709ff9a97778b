pub mod assembler;
pub mod content;
pub mod graph;
pub mod order;
pub mod principles;

pub use assembler::{assemble_lessons, LessonAssembler, SUBTOPIC_LESSON_MIN_CHARS};
pub use content::{LessonContent, LessonSubject, TemplateContent};
pub use graph::{GraphStats, KnowledgeGraph};
pub use order::{order_topics, topological_order, TopicOrdering};
