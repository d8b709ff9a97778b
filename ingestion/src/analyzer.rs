use crate::concepts::extract_concepts;
use crate::principles::detect_principles;
use crate::relations::infer_relationships;
use crate::segmenter::segment;
use lessonforge_core::model::{Concept, PrincipleMention, Relationship, Topic};
use serde::Serialize;

/// Everything read out of one document's text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzedContent {
    pub topics: Vec<Topic>,
    pub concepts: Vec<Concept>,
    pub relationships: Vec<Relationship>,
    pub principles: Vec<PrincipleMention>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentAnalyzer;

impl ContentAnalyzer {
    pub fn analyze(&self, text: &str) -> AnalyzedContent {
        let topics = segment(text);
        let relationships = infer_relationships(&topics);

        AnalyzedContent {
            concepts: extract_concepts(text),
            principles: detect_principles(text),
            topics,
            relationships,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_combines_every_extractor() {
        let text = "\
Chapter 1: Sets
A set is defined as a collection of distinct objects.
Chapter 2: Functions
Functions builds on Sets. Working memory is limited.
";
        let analysis = ContentAnalyzer.analyze(text);

        assert_eq!(analysis.topics.len(), 2);
        assert_eq!(analysis.relationships.len(), 1);
        assert!(analysis.relationships[0].is_prerequisite());
        assert_eq!(analysis.concepts[0].term, "A set");
        assert_eq!(analysis.principles[0].name, "Working Memory");
    }

    #[test]
    fn empty_text_is_not_an_error() {
        assert_eq!(ContentAnalyzer.analyze(""), AnalyzedContent::default());
    }
}
