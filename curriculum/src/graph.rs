//! Knowledge graph over topics and subtopics.
//!
//! Nodes live in an arena indexed by [`NodeId`]; edges are kept in one list
//! with per-node outgoing adjacency. Every query is a lookup over these
//! structures, so the graph never holds back-pointers.

use lessonforge_core::model::{NodeId, RelationKind, Relationship, Topic, TopicId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Topic,
    Subtopic {
        #[serde(rename = "parentId")]
        parent_id: TopicId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub label: String,
    pub level: u8,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub label: String,
    pub description: String,
}

/// How a neighbour relates to the node a `connected_to` query started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// The queried node is the edge source.
    #[serde(rename = "depends on")]
    DependsOn,
    /// The queried node is the edge target.
    #[serde(rename = "prerequisite for")]
    PrerequisiteFor,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::DependsOn => "depends on",
            Direction::PrerequisiteFor => "prerequisite for",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectedNode<'a> {
    pub node: &'a GraphNode,
    pub relationship: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub prerequisite_edges: usize,
    pub connection_edges: usize,
    pub contains_edges: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KnowledgeGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    #[serde(skip)]
    index: HashMap<NodeId, usize>,
    #[serde(skip)]
    outgoing: HashMap<NodeId, Vec<usize>>,
}

impl KnowledgeGraph {
    /// Builds the graph from segmented topics and inferred relationships.
    ///
    /// Every topic and subtopic becomes a node and each subtopic gets a
    /// structural `contains` edge from its parent. Relationships whose
    /// endpoints are not both nodes are dropped.
    pub fn build(topics: &[Topic], relationships: &[Relationship]) -> Self {
        let mut graph = Self::default();

        for topic in topics {
            graph.insert_node(GraphNode {
                id: topic.node_id(),
                label: topic.title.clone(),
                level: topic.level,
                kind: NodeKind::Topic,
            });
        }

        let mut structural = Vec::new();
        for topic in topics {
            for subtopic in &topic.subtopics {
                graph.insert_node(GraphNode {
                    id: subtopic.id,
                    label: subtopic.title.clone(),
                    level: subtopic.level,
                    kind: NodeKind::Subtopic {
                        parent_id: topic.id,
                    },
                });
                structural.push(Relationship::new(
                    topic.node_id(),
                    subtopic.id,
                    RelationKind::Contains,
                    format!("{} contains {}", topic.title, subtopic.title),
                ));
            }
        }

        let mut dropped = 0usize;
        for relationship in relationships.iter().chain(structural.iter()) {
            if !graph.insert_edge(relationship) {
                dropped += 1;
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "ignored relationships with unknown endpoints");
        }

        graph
    }

    fn insert_node(&mut self, node: GraphNode) {
        if self.index.contains_key(&node.id) {
            return;
        }
        self.index.insert(node.id, self.nodes.len());
        self.nodes.push(node);
    }

    fn insert_edge(&mut self, relationship: &Relationship) -> bool {
        if !self.contains(relationship.source) || !self.contains(relationship.target) {
            return false;
        }

        let position = self.edges.len();
        self.edges.push(GraphEdge {
            id: format!("e{}", position),
            source: relationship.source,
            target: relationship.target,
            kind: relationship.kind,
            label: edge_label(relationship.kind).to_string(),
            description: relationship.description.clone(),
        });
        self.outgoing
            .entry(relationship.source)
            .or_default()
            .push(position);
        true
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.index.get(&id).map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Sources of `prerequisite` edges that target `id`.
    pub fn prerequisites_of(&self, id: NodeId) -> Vec<&GraphNode> {
        self.edges
            .iter()
            .filter(|edge| edge.target == id && edge.kind == RelationKind::Prerequisite)
            .filter_map(|edge| self.node(edge.source))
            .collect()
    }

    /// Targets of `prerequisite` edges sourced at `id`.
    pub fn dependents_of(&self, id: NodeId) -> Vec<&GraphNode> {
        self.outgoing_edges(id)
            .filter(|edge| edge.kind == RelationKind::Prerequisite)
            .filter_map(|edge| self.node(edge.target))
            .collect()
    }

    /// Every node sharing an edge with `id`, in edge order, once per node.
    pub fn connected_to(&self, id: NodeId) -> Vec<ConnectedNode<'_>> {
        let mut seen = HashSet::new();
        let mut connected = Vec::new();

        for edge in &self.edges {
            let (other, relationship) = if edge.source == id {
                (edge.target, Direction::DependsOn)
            } else if edge.target == id {
                (edge.source, Direction::PrerequisiteFor)
            } else {
                continue;
            };

            let Some(node) = self.node(other) else {
                continue;
            };
            if seen.insert(other) {
                connected.push(ConnectedNode { node, relationship });
            }
        }

        connected
    }

    /// Shortest path (fewest edges) from `start` to `end` following edge
    /// direction. Returns the first path breadth-first search discovers, or an
    /// empty vector when `end` is unreachable.
    pub fn path_between(&self, start: NodeId, end: NodeId) -> Vec<&GraphNode> {
        if !self.contains(start) {
            return Vec::new();
        }

        let mut parent: HashMap<NodeId, NodeId> = HashMap::new();
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            if current == end {
                return self.trace_path(&parent, start, end);
            }

            for edge in self.outgoing_edges(current) {
                if visited.insert(edge.target) {
                    parent.insert(edge.target, current);
                    queue.push_back(edge.target);
                }
            }
        }

        Vec::new()
    }

    fn trace_path(
        &self,
        parent: &HashMap<NodeId, NodeId>,
        start: NodeId,
        end: NodeId,
    ) -> Vec<&GraphNode> {
        let mut ids = vec![end];
        let mut cursor = end;
        while cursor != start {
            match parent.get(&cursor) {
                Some(&previous) => {
                    ids.push(previous);
                    cursor = previous;
                }
                None => return Vec::new(),
            }
        }
        ids.reverse();
        ids.into_iter().filter_map(|id| self.node(id)).collect()
    }

    fn outgoing_edges(&self, id: NodeId) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.outgoing
            .get(&id)
            .into_iter()
            .flatten()
            .map(|&position| &self.edges[position])
    }

    pub fn stats(&self) -> GraphStats {
        let count = |kind: RelationKind| self.edges.iter().filter(|e| e.kind == kind).count();
        GraphStats {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            prerequisite_edges: count(RelationKind::Prerequisite),
            connection_edges: count(RelationKind::Connection),
            contains_edges: count(RelationKind::Contains),
        }
    }
}

fn edge_label(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Prerequisite => "prerequisite for",
        RelationKind::Contains => "contains",
        RelationKind::Connection => "related to",
    }
}
