//! Text filled into each lesson.
//!
//! [`LessonContent`] is the seam between lesson assembly and the words that
//! end up in a lesson. [`TemplateContent`] is the deterministic default: the
//! same subject always yields the same lesson text.

use crate::principles;
use lessonforge_core::lesson::{
    Assessment, AssessmentQuestion, Difficulty, LessonSection, PracticeProblem, ProblemKind,
    QuestionKind, Resource, ResourceKind,
};
use lessonforge_core::model::{Concept, NodeId, Subtopic, Topic};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;

/// The topic or subtopic a lesson is generated for.
#[derive(Debug, Clone, Copy)]
pub struct LessonSubject<'a> {
    pub id: NodeId,
    pub title: &'a str,
    pub level: u8,
    pub content: &'a str,
    pub subtopics: &'a [Subtopic],
}

impl<'a> From<&'a Topic> for LessonSubject<'a> {
    fn from(topic: &'a Topic) -> Self {
        Self {
            id: topic.node_id(),
            title: &topic.title,
            level: topic.level,
            content: &topic.content,
            subtopics: &topic.subtopics,
        }
    }
}

impl<'a> From<&'a Subtopic> for LessonSubject<'a> {
    fn from(subtopic: &'a Subtopic) -> Self {
        Self {
            id: subtopic.id,
            title: &subtopic.title,
            level: subtopic.level,
            content: &subtopic.content,
            subtopics: &[],
        }
    }
}

pub trait LessonContent: Send + Sync {
    fn overview(&self, subject: &LessonSubject<'_>) -> String;
    fn objectives(&self, subject: &LessonSubject<'_>) -> Vec<String>;
    fn sections(&self, subject: &LessonSubject<'_>) -> Vec<LessonSection>;
    fn practice(&self, subject: &LessonSubject<'_>) -> Vec<PracticeProblem>;
    fn assessment(&self, subject: &LessonSubject<'_>) -> Assessment;
    fn further_resources(&self, subject: &LessonSubject<'_>, concepts: &[Concept]) -> Vec<Resource>;

    fn principle_application(&self, name: &str, subject: &LessonSubject<'_>) -> String {
        principles::principle_application(name, subject.title)
    }
}

const UNDERSTAND_VERBS: [&str; 6] = ["explain", "interpret", "classify", "compare", "summarize", "infer"];
const REMEMBER_VERBS: [&str; 6] = ["define", "describe", "identify", "list", "recognize", "recall"];
const APPLY_VERBS: [&str; 6] = ["apply", "implement", "use", "execute", "demonstrate", "solve"];
const ANALYZE_VERBS: [&str; 6] = [
    "analyze",
    "differentiate",
    "organize",
    "attribute",
    "compare",
    "deconstruct",
];

const KEY_TERM_PHRASES: [&str; 5] = [
    "key term is",
    "key concept is",
    "important term is",
    "defined as",
    "refers to",
];

const SECTION_PLACEHOLDER: &str = "Content for this section will be developed based on the topic.";

#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateContent;

impl LessonContent for TemplateContent {
    fn overview(&self, subject: &LessonSubject<'_>) -> String {
        let sentences = sentences(subject.content);
        if sentences.len() >= 2 {
            let lead: Vec<&str> = sentences.iter().take(3).copied().collect();
            format!("{}.", lead.join(". "))
        } else {
            format!(
                "This lesson covers {}, exploring key concepts and applications.",
                subject.title
            )
        }
    }

    fn objectives(&self, subject: &LessonSubject<'_>) -> Vec<String> {
        let verbs = VerbPicker::new(subject.title);
        let terms = key_terms(subject.content);
        let mut objectives = Vec::with_capacity(4);

        objectives.push(format!(
            "{} the concepts of {}",
            verbs.pick(&UNDERSTAND_VERBS, 0),
            subject.title
        ));
        if !terms.is_empty() {
            let shown: Vec<&str> = terms.iter().take(3).map(String::as_str).collect();
            objectives.push(format!(
                "{} key terms including {}",
                verbs.pick(&REMEMBER_VERBS, 1),
                shown.join(", ")
            ));
        }
        objectives.push(format!(
            "{} the principles of {} to solve problems",
            verbs.pick(&APPLY_VERBS, 2),
            subject.title
        ));
        if subject.level >= 2
            || subject.title.contains("Analysis")
            || subject.title.contains("Evaluation")
        {
            objectives.push(format!(
                "{} complex problems related to {}",
                verbs.pick(&ANALYZE_VERBS, 3),
                subject.title
            ));
        }

        objectives
    }

    fn sections(&self, subject: &LessonSubject<'_>) -> Vec<LessonSection> {
        let mut sections = vec![LessonSection::new("Introduction", self.overview(subject))];

        if !subject.subtopics.is_empty() {
            sections.extend(subject.subtopics.iter().map(|subtopic| {
                let content = if subtopic.content.is_empty() {
                    SECTION_PLACEHOLDER
                } else {
                    subtopic.content.as_str()
                };
                LessonSection::new(subtopic.title.clone(), content)
            }));
        } else {
            let paragraphs: Vec<&str> = subject
                .content
                .split("\n\n")
                .filter(|paragraph| !paragraph.trim().is_empty())
                .collect();

            if paragraphs.len() >= 3 {
                let n = paragraphs.len();
                let first = n.div_ceil(3);
                let second = (2 * n).div_ceil(3);
                sections.push(LessonSection::new("Key Concepts", paragraphs[..first].join("\n\n")));
                sections.push(LessonSection::new(
                    "Detailed Explanation",
                    paragraphs[first..second].join("\n\n"),
                ));
                sections.push(LessonSection::new("Applications", paragraphs[second..].join("\n\n")));
            } else {
                sections.push(LessonSection::new("Content", subject.content));
            }
        }

        sections.push(LessonSection::new(
            "Summary",
            format!(
                "This lesson covered the main concepts of {}. We explored key ideas and applications that will be important for future topics.",
                subject.title
            ),
        ));
        sections
    }

    fn practice(&self, subject: &LessonSubject<'_>) -> Vec<PracticeProblem> {
        let prompts = [
            (
                format!(
                    "Demonstrate your understanding of {} by explaining its key concepts.",
                    subject.title
                ),
                Difficulty::Medium,
            ),
            (
                format!(
                    "Apply the principles of {} to solve a real-world problem.",
                    subject.title
                ),
                Difficulty::Hard,
            ),
            (
                format!(
                    "Explain how {} relates to other concepts in this subject.",
                    subject.title
                ),
                Difficulty::Medium,
            ),
        ];

        prompts
            .into_iter()
            .enumerate()
            .map(|(i, (question, difficulty))| PracticeProblem {
                id: format!("practice-{}-{}", subject.id, i + 1),
                question,
                kind: ProblemKind::OpenEnded,
                difficulty,
            })
            .collect()
    }

    fn assessment(&self, subject: &LessonSubject<'_>) -> Assessment {
        let questions = [
            (
                format!("Define and explain the main concepts of {}.", subject.title),
                QuestionKind::ShortAnswer,
                10,
            ),
            (
                format!(
                    "Apply the principles of {} to solve the following problem...",
                    subject.title
                ),
                QuestionKind::ProblemSolving,
                15,
            ),
            (
                format!(
                    "Analyze how {} connects to other topics in this subject.",
                    subject.title
                ),
                QuestionKind::Essay,
                15,
            ),
        ];

        Assessment {
            id: format!("assessment-{}", subject.id),
            title: format!("{} Assessment", subject.title),
            description: format!(
                "This assessment covers the key concepts and applications of {}.",
                subject.title
            ),
            questions: questions
                .into_iter()
                .enumerate()
                .map(|(i, (text, kind, points))| AssessmentQuestion {
                    id: format!("q-{}-{}", subject.id, i + 1),
                    text,
                    kind,
                    points,
                })
                .collect(),
            passing_score: 25,
        }
    }

    fn further_resources(&self, subject: &LessonSubject<'_>, concepts: &[Concept]) -> Vec<Resource> {
        let mut resources: Vec<Resource> = concepts
            .iter()
            .filter(|concept| subject.content.contains(concept.term.as_str()))
            .map(|concept| Resource {
                title: concept.term.clone(),
                kind: ResourceKind::Definition,
                content: concept.definition.clone(),
            })
            .collect();

        resources.push(Resource {
            title: "Additional Reading".to_string(),
            kind: ResourceKind::External,
            content: format!("Additional resources for {} will be provided.", subject.title),
        });
        resources
    }
}

fn sentence_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("sentence regex must compile"))
}

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("bold regex must compile"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*([^*]+)\*").expect("italic regex must compile"))
}

/// Non-empty sentences with terminal punctuation removed.
fn sentences(content: &str) -> Vec<&str> {
    sentence_break_re()
        .split(content)
        .map(|sentence| sentence.trim().trim_end_matches(['.', '!', '?']))
        .filter(|sentence| !sentence.is_empty())
        .collect()
}

/// Emphasised terms and terms introduced by a defining phrase, first
/// occurrence wins.
pub fn key_terms(content: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    let mut push = |term: &str| {
        if !terms.iter().any(|known| known == term) {
            terms.push(term.to_string());
        }
    };

    for captures in bold_re().captures_iter(content) {
        push(&captures[1]);
    }
    for captures in italic_re().captures_iter(content) {
        push(&captures[1]);
    }

    for line in content.lines() {
        for phrase in KEY_TERM_PHRASES {
            let Some((before, _)) = line.split_once(phrase) else {
                continue;
            };
            let words: Vec<&str> = before.trim().split(' ').collect();
            let term = words[words.len().saturating_sub(2)..].join(" ");
            if term.chars().count() > 2 {
                push(&term);
            }
        }
    }

    terms
}

/// Picks objective verbs from a digest of the lesson title.
struct VerbPicker([u8; 32]);

impl VerbPicker {
    fn new(title: &str) -> Self {
        let digest = Sha256::digest(title.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    fn pick(&self, verbs: &[&str], slot: usize) -> String {
        let verb = verbs[self.0[slot] as usize % verbs.len()];
        let mut chars = verb.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}
