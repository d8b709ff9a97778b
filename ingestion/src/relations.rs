use lessonforge_core::model::{RelationKind, Relationship, Topic};

/// Phrases that mark a mentioned topic as a prerequisite when they appear
/// directly before or after its title.
pub const PREREQUISITE_INDICATORS: [&str; 7] = [
    "prerequisite",
    "requires",
    "depends on",
    "based on",
    "builds on",
    "following",
    "before",
];

/// Infers topic-to-topic relationships from title mentions.
///
/// When topic B's content (its own and its subtopics') mentions topic A's
/// title, A gets an edge to B: `prerequisite` if an indicator phrase sits
/// next to the title, `connection` otherwise. Matching is case-sensitive.
pub fn infer_relationships(topics: &[Topic]) -> Vec<Relationship> {
    let mut relationships = Vec::new();

    for target in topics {
        let content = target.all_content();

        for source in topics {
            if source.id == target.id || !content.contains(source.title.as_str()) {
                continue;
            }

            let relationship = if mentions_as_prerequisite(&content, &source.title) {
                Relationship::new(
                    source.node_id(),
                    target.node_id(),
                    RelationKind::Prerequisite,
                    format!("{} is a prerequisite for {}", source.title, target.title),
                )
            } else {
                Relationship::new(
                    source.node_id(),
                    target.node_id(),
                    RelationKind::Connection,
                    format!("{} is related to {}", target.title, source.title),
                )
            };
            relationships.push(relationship);
        }
    }

    tracing::debug!(
        topics = topics.len(),
        relationships = relationships.len(),
        "inferred relationships"
    );
    relationships
}

fn mentions_as_prerequisite(content: &str, title: &str) -> bool {
    PREREQUISITE_INDICATORS.iter().any(|indicator| {
        content.contains(&format!("{} {}", indicator, title))
            || content.contains(&format!("{} {}", title, indicator))
    })
}
