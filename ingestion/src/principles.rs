use curriculum::principles::{
    COGNITIVE_STRATEGIES, DESIRABLE_DIFFICULTY, KNOWLEDGE_GRAPH, PREREQUISITES, SCAFFOLDED_MASTERY,
    TWO_SIGMA, WORKING_MEMORY,
};
use lessonforge_core::model::PrincipleMention;
use regex::Regex;
use std::sync::OnceLock;

const PRINCIPLE_KEYWORDS: [(&str, &[&str]); 7] = [
    (KNOWLEDGE_GRAPH, &["knowledge graph", "prerequisite", "linking topics"]),
    (SCAFFOLDED_MASTERY, &["scaffolded mastery", "mastery learning"]),
    (PREREQUISITES, &["key prerequisites", "targeted remediation"]),
    (
        WORKING_MEMORY,
        &["working memory", "sensory memory", "long-term memory"],
    ),
    (COGNITIVE_STRATEGIES, &["cognitive learning", "learning strategy"]),
    (
        DESIRABLE_DIFFICULTY,
        &["desirable difficulty", "illusion of comprehension"],
    ),
    (TWO_SIGMA, &["two-sigma", "bloom's two-sigma"]),
];

/// Learning principles the document talks about, in a fixed principle order.
/// Each principle is reported once, for the first of its keywords found.
pub fn detect_principles(text: &str) -> Vec<PrincipleMention> {
    let lowered = text.to_lowercase();
    let mut mentions = Vec::new();

    for (name, keywords) in PRINCIPLE_KEYWORDS {
        let Some(keyword) = keywords.iter().find(|keyword| lowered.contains(*keyword)) else {
            continue;
        };
        let contexts = sentences_containing(text, keyword);
        mentions.push(PrincipleMention {
            name: name.to_string(),
            keyword: keyword.to_string(),
            context: contexts.first().cloned().unwrap_or_default(),
            all_contexts: contexts,
        });
    }

    mentions
}

/// Sentences (split after `.`, `!` or `?` followed by whitespace) that contain
/// `keyword`, ignoring case.
fn sentences_containing(text: &str, keyword: &str) -> Vec<String> {
    split_sentences(text)
        .into_iter()
        .filter(|sentence| sentence.to_lowercase().contains(keyword))
        .map(|sentence| sentence.trim().to_string())
        .collect()
}

fn sentence_end_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence regex must compile"))
}

/// Splits after terminal punctuation followed by whitespace, keeping the
/// punctuation with its sentence.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for found in sentence_end_re().find_iter(text) {
        sentences.push(&text[start..found.start() + 1]);
        start = found.end();
    }
    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}
