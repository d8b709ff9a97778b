//! Document structure produced by segmentation and relationship inference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub type TopicId = u32;

/// Identifier of a graph node: a topic (`"3"`) or one of its subtopics (`"3.2"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum NodeId {
    Topic(TopicId),
    Subtopic { topic: TopicId, seq: u32 },
}

impl NodeId {
    pub fn topic_id(&self) -> Option<TopicId> {
        match self {
            NodeId::Topic(id) => Some(*id),
            NodeId::Subtopic { .. } => None,
        }
    }

    /// Topic that owns this node (the topic itself for topic ids).
    pub fn owner(&self) -> TopicId {
        match self {
            NodeId::Topic(id) => *id,
            NodeId::Subtopic { topic, .. } => *topic,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Topic(id) => write!(f, "{}", id),
            NodeId::Subtopic { topic, seq } => write!(f, "{}.{}", topic, seq),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid node id: {0:?}")]
pub struct ParseNodeIdError(pub String);

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseNodeIdError(s.to_string());
        match s.split_once('.') {
            None => s.parse().map(NodeId::Topic).map_err(|_| invalid()),
            Some((topic, seq)) => Ok(NodeId::Subtopic {
                topic: topic.parse().map_err(|_| invalid())?,
                seq: seq.parse().map_err(|_| invalid())?,
            }),
        }
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for NodeId {
    type Error = ParseNodeIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtopic {
    pub id: NodeId,
    pub title: String,
    pub number: String,
    pub level: u8,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub number: String,
    pub level: u8,
    pub content: String,
    pub subtopics: Vec<Subtopic>,
}

impl Topic {
    pub fn node_id(&self) -> NodeId {
        NodeId::Topic(self.id)
    }

    /// Own content followed by every subtopic's content, space separated.
    pub fn all_content(&self) -> String {
        let subtopic_content: Vec<&str> = self
            .subtopics
            .iter()
            .map(|subtopic| subtopic.content.as_str())
            .collect();
        format!("{} {}", self.content, subtopic_content.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Prerequisite,
    Connection,
    Contains,
}

impl RelationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Prerequisite => "prerequisite",
            RelationKind::Connection => "connection",
            RelationKind::Contains => "contains",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub description: String,
}

impl Relationship {
    pub fn new(
        source: NodeId,
        target: NodeId,
        kind: RelationKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            source,
            target,
            kind,
            description: description.into(),
        }
    }

    pub fn is_prerequisite(&self) -> bool {
        self.kind == RelationKind::Prerequisite
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub id: u32,
    pub term: String,
    pub definition: String,
}

/// A learning principle the document talks about, with the sentences that mention it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipleMention {
    pub name: String,
    pub keyword: String,
    pub context: String,
    pub all_contexts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display_and_parse_agree() {
        let topic = NodeId::Topic(4);
        let subtopic = NodeId::Subtopic { topic: 4, seq: 2 };
        assert_eq!(topic.to_string(), "4");
        assert_eq!(subtopic.to_string(), "4.2");
        assert_eq!("4".parse::<NodeId>().unwrap(), topic);
        assert_eq!("4.2".parse::<NodeId>().unwrap(), subtopic);
        assert!("4.x".parse::<NodeId>().is_err());
        assert!("".parse::<NodeId>().is_err());
    }

    #[test]
    fn node_id_serializes_as_string() {
        let json = serde_json::to_string(&NodeId::Subtopic { topic: 1, seq: 3 }).unwrap();
        assert_eq!(json, "\"1.3\"");
        let back: NodeId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(back, NodeId::Topic(7));
    }

    #[test]
    fn all_content_joins_subtopics_with_spaces() {
        let topic = Topic {
            id: 1,
            title: "Sets".to_string(),
            number: "1".to_string(),
            level: 1,
            content: "intro".to_string(),
            subtopics: vec![
                Subtopic {
                    id: NodeId::Subtopic { topic: 1, seq: 1 },
                    title: "Unions".to_string(),
                    number: "1.1".to_string(),
                    level: 2,
                    content: "a".to_string(),
                },
                Subtopic {
                    id: NodeId::Subtopic { topic: 1, seq: 2 },
                    title: "Intersections".to_string(),
                    number: "1.2".to_string(),
                    level: 2,
                    content: "b".to_string(),
                },
            ],
        };
        assert_eq!(topic.all_content(), "intro a b");
    }

    #[test]
    fn relationship_serializes_kind_as_type() {
        let rel = Relationship::new(NodeId::Topic(1), NodeId::Topic(2), RelationKind::Prerequisite, "x");
        let value = serde_json::to_value(&rel).unwrap();
        assert_eq!(value["type"], "prerequisite");
        assert_eq!(value["source"], "1");
    }
}
