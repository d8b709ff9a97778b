//! Generated lesson records. Produced once per pipeline run and never mutated;
//! completion and XP live in the module store.

use crate::model::{NodeId, TopicId};
use serde::{Deserialize, Serialize};

pub fn lesson_id(node: NodeId) -> String {
    format!("lesson-{}", node)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerequisiteRef {
    pub id: TopicId,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSection {
    pub title: String,
    pub content: String,
}

impl LessonSection {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProblemKind {
    OpenEnded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeProblem {
    pub id: String,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: ProblemKind,
    pub difficulty: Difficulty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    ShortAnswer,
    ProblemSolving,
    Essay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub id: String,
    pub title: String,
    pub description: String,
    pub questions: Vec<AssessmentQuestion>,
    pub passing_score: u32,
}

impl Assessment {
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|question| question.points).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Definition,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ResourceKind,
    pub content: String,
}

/// A principle selected for the whole document, before it is tied to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicablePrinciple {
    pub name: String,
    pub description: String,
    pub implementation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedPrinciple {
    pub name: String,
    pub description: String,
    pub application: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_lesson_id: Option<String>,
    pub title: String,
    pub overview: String,
    pub objectives: Vec<String>,
    pub prerequisites: Vec<PrerequisiteRef>,
    pub sections: Vec<LessonSection>,
    pub practice: Vec<PracticeProblem>,
    pub assessment: Assessment,
    pub further_resources: Vec<Resource>,
    pub principles: Vec<AppliedPrinciple>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lesson_ids_follow_node_ids() {
        assert_eq!(lesson_id(NodeId::Topic(2)), "lesson-2");
        assert_eq!(lesson_id(NodeId::Subtopic { topic: 2, seq: 1 }), "lesson-2.1");
    }

    #[test]
    fn wire_names_match_the_lesson_viewer() {
        let problem = PracticeProblem {
            id: "practice-1-1".to_string(),
            question: "q".to_string(),
            kind: ProblemKind::OpenEnded,
            difficulty: Difficulty::Medium,
        };
        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(value["type"], "open-ended");
        assert_eq!(value["difficulty"], "medium");

        let question = AssessmentQuestion {
            id: "q-1-2".to_string(),
            text: "t".to_string(),
            kind: QuestionKind::ProblemSolving,
            points: 15,
        };
        assert_eq!(serde_json::to_value(&question).unwrap()["type"], "problem-solving");
    }
}
