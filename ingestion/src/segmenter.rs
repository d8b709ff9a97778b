//! Heading-driven segmentation of extracted text into topics and subtopics.

use lessonforge_core::model::{NodeId, Subtopic, Topic};
use regex::Regex;
use std::sync::OnceLock;

fn chapter_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(Chapter\s+[0-9]+[.:]\s*|[IVX]+\.\s+|[0-9]+\.\s+)(.+)$")
            .expect("chapter regex must compile")
    })
}

fn section_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^([0-9]+\.[0-9]+[.:]\s*|[0-9]+\.[0-9]+\.\s+)(.+)$")
            .expect("section regex must compile")
    })
}

struct OpenTopic {
    topic: Topic,
    buffer: String,
    subtopic: Option<(Subtopic, String)>,
}

impl OpenTopic {
    fn close_subtopic(&mut self) {
        if let Some((mut subtopic, buffer)) = self.subtopic.take() {
            subtopic.content = buffer.trim().to_string();
            self.topic.subtopics.push(subtopic);
        }
    }

    fn finish(mut self) -> Topic {
        self.close_subtopic();
        self.topic.content = self.buffer.trim().to_string();
        self.topic
    }

    fn append_line(&mut self, line: &str) {
        let buffer = match self.subtopic.as_mut() {
            Some((_, buffer)) => buffer,
            None => &mut self.buffer,
        };
        buffer.push_str(line);
        buffer.push('\n');
    }
}

/// Splits `text` into topics at chapter headings and into subtopics at
/// section headings.
///
/// Lines are trimmed and blank lines skipped. Text before the first chapter
/// heading is discarded, and so is a section heading seen before any chapter.
/// Topic ids run from 1 in document order; subtopic ids are `<topic>.<n>`.
pub fn segment(text: &str) -> Vec<Topic> {
    let mut topics = Vec::new();
    let mut current: Option<OpenTopic> = None;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(captures) = chapter_re().captures(line) {
            if let Some(open) = current.take() {
                topics.push(open.finish());
            }
            current = Some(OpenTopic {
                topic: Topic {
                    id: topics.len() as u32 + 1,
                    title: captures[2].trim().to_string(),
                    number: captures[1].chars().filter(char::is_ascii_digit).collect(),
                    level: 1,
                    content: String::new(),
                    subtopics: Vec::new(),
                },
                buffer: String::new(),
                subtopic: None,
            });
            continue;
        }

        let Some(open) = current.as_mut() else {
            continue;
        };

        if let Some(captures) = section_re().captures(line) {
            open.close_subtopic();
            let seq = open.topic.subtopics.len() as u32 + 1;
            let subtopic = Subtopic {
                id: NodeId::Subtopic {
                    topic: open.topic.id,
                    seq,
                },
                title: captures[2].trim().to_string(),
                number: captures[1]
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.')
                    .collect(),
                level: 2,
                content: String::new(),
            };
            open.subtopic = Some((subtopic, String::new()));
            continue;
        }

        open.append_line(line);
    }

    if let Some(open) = current {
        topics.push(open.finish());
    }

    tracing::debug!(topics = topics.len(), "segmented document");
    topics
}
