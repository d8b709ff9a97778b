use lessonforge_core::model::{Relationship, Topic, TopicId};
use std::collections::{HashMap, VecDeque};

/// Result of ordering topics by their prerequisite edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicOrdering<'a> {
    pub ordered: Vec<&'a Topic>,
    /// Topics stuck on a prerequisite cycle, in input order.
    pub omitted: Vec<TopicId>,
}

impl TopicOrdering<'_> {
    pub fn ordered_ids(&self) -> Vec<TopicId> {
        self.ordered.iter().map(|topic| topic.id).collect()
    }

    pub fn is_complete(&self) -> bool {
        self.omitted.is_empty()
    }
}

/// Kahn's algorithm over `prerequisite` edges between known topics.
///
/// Edges touching subtopic ids or unknown topic ids are ignored. Ties are
/// broken by input order. Topics that never reach in-degree zero are left
/// out of `ordered` and listed in `omitted`.
pub fn order_topics<'a>(topics: &'a [Topic], relationships: &[Relationship]) -> TopicOrdering<'a> {
    let mut position: HashMap<TopicId, usize> = HashMap::with_capacity(topics.len());
    for (i, topic) in topics.iter().enumerate() {
        position.entry(topic.id).or_insert(i);
    }

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); topics.len()];
    let mut in_degree = vec![0usize; topics.len()];

    for relationship in relationships.iter().filter(|r| r.is_prerequisite()) {
        let source = relationship
            .source
            .topic_id()
            .and_then(|id| position.get(&id).copied());
        let target = relationship
            .target
            .topic_id()
            .and_then(|id| position.get(&id).copied());
        let (Some(source), Some(target)) = (source, target) else {
            continue;
        };
        dependents[source].push(target);
        in_degree[target] += 1;
    }

    let mut queue: VecDeque<usize> = (0..topics.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut ordered = Vec::with_capacity(topics.len());

    while let Some(current) = queue.pop_front() {
        ordered.push(&topics[current]);
        for &next in &dependents[current] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                queue.push_back(next);
            }
        }
    }

    let omitted: Vec<TopicId> = topics
        .iter()
        .zip(&in_degree)
        .filter(|(_, &degree)| degree > 0)
        .map(|(topic, _)| topic.id)
        .collect();

    if !omitted.is_empty() {
        tracing::warn!(
            count = omitted.len(),
            ?omitted,
            "prerequisite cycle detected; topics left out of lesson order"
        );
    }

    TopicOrdering { ordered, omitted }
}

/// Topics in prerequisite order. May be a strict subset of `topics` when the
/// prerequisite edges contain a cycle.
pub fn topological_order<'a>(topics: &'a [Topic], relationships: &[Relationship]) -> Vec<&'a Topic> {
    order_topics(topics, relationships).ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use lessonforge_core::model::{NodeId, RelationKind};

    fn topics(ids: &[TopicId]) -> Vec<Topic> {
        ids.iter()
            .map(|&id| Topic {
                id,
                title: format!("T{}", id),
                number: id.to_string(),
                level: 1,
                content: String::new(),
                subtopics: Vec::new(),
            })
            .collect()
    }

    fn prereq(source: TopicId, target: TopicId) -> Relationship {
        Relationship::new(
            NodeId::Topic(source),
            NodeId::Topic(target),
            RelationKind::Prerequisite,
            "p",
        )
    }

    fn ids(ordered: &[&Topic]) -> Vec<TopicId> {
        ordered.iter().map(|t| t.id).collect()
    }

    #[test]
    fn chain_is_ordered() {
        let topics = topics(&[1, 2, 3]);
        let order = topological_order(&topics, &[prereq(1, 2), prereq(2, 3)]);
        assert_eq!(ids(&order), vec![1, 2, 3]);
    }

    #[test]
    fn reversed_input_is_reordered() {
        let topics = topics(&[3, 2, 1]);
        let order = topological_order(&topics, &[prereq(1, 2), prereq(2, 3)]);
        assert_eq!(ids(&order), vec![1, 2, 3]);
    }

    #[test]
    fn full_cycle_yields_nothing() {
        let topics = topics(&[1, 2, 3]);
        let ordering = order_topics(&topics, &[prereq(1, 2), prereq(2, 3), prereq(3, 1)]);
        assert!(ordering.ordered.is_empty());
        assert_eq!(ordering.omitted, vec![1, 2, 3]);
        assert!(!ordering.is_complete());
    }

    #[test]
    fn cycle_downstream_is_truncated_but_rest_survives() {
        let topics = topics(&[1, 2, 3, 4]);
        let relationships = vec![prereq(1, 2), prereq(2, 3), prereq(3, 2), prereq(1, 4)];
        let ordering = order_topics(&topics, &relationships);
        assert_eq!(ordering.ordered_ids(), vec![1, 4]);
        assert_eq!(ordering.omitted, vec![2, 3]);
    }

    #[test]
    fn ties_keep_input_order_and_non_prerequisites_are_ignored() {
        let topics = topics(&[1, 2, 3]);
        let relationships = vec![
            Relationship::new(NodeId::Topic(3), NodeId::Topic(1), RelationKind::Connection, "c"),
            Relationship::new(
                NodeId::Topic(1),
                NodeId::Subtopic { topic: 1, seq: 1 },
                RelationKind::Contains,
                "k",
            ),
            Relationship::new(
                NodeId::Subtopic { topic: 3, seq: 1 },
                NodeId::Topic(1),
                RelationKind::Prerequisite,
                "p",
            ),
            prereq(9, 2),
        ];
        let order = topological_order(&topics, &relationships);
        assert_eq!(ids(&order), vec![1, 2, 3]);
    }

    #[test]
    fn every_prerequisite_edge_points_forward() {
        let topics = topics(&[1, 2, 3, 4, 5]);
        let relationships = vec![prereq(5, 1), prereq(4, 2), prereq(1, 2), prereq(2, 3), prereq(5, 3)];
        let order = topological_order(&topics, &relationships);
        let rank: HashMap<TopicId, usize> = order.iter().enumerate().map(|(i, t)| (t.id, i)).collect();

        assert_eq!(order.len(), 5);
        for rel in &relationships {
            let (s, t) = (rel.source.owner(), rel.target.owner());
            assert!(rank[&s] < rank[&t], "{} should precede {}", s, t);
        }
    }
}
