//! Learning principles applied across a generated curriculum.

use lessonforge_core::lesson::ApplicablePrinciple;
use lessonforge_core::model::PrincipleMention;

pub const KNOWLEDGE_GRAPH: &str = "Knowledge Graph";
pub const SCAFFOLDED_MASTERY: &str = "Scaffolded Mastery Learning";
pub const PREREQUISITES: &str = "Prerequisites";
pub const WORKING_MEMORY: &str = "Working Memory";
pub const COGNITIVE_STRATEGIES: &str = "Cognitive Learning Strategies";
pub const DESIRABLE_DIFFICULTY: &str = "Desirable Difficulty";
pub const TWO_SIGMA: &str = "Bloom's Two-Sigma Problem";

/// Every principle the document mentions, followed by the two core
/// principles when the document does not mention them itself.
pub fn applicable_principles(mentions: &[PrincipleMention]) -> Vec<ApplicablePrinciple> {
    let mut principles: Vec<ApplicablePrinciple> = mentions
        .iter()
        .map(|mention| ApplicablePrinciple {
            name: mention.name.clone(),
            description: if mention.context.is_empty() {
                format!("Apply the {} principle", mention.name)
            } else {
                mention.context.clone()
            },
            implementation: principle_implementation(&mention.name),
        })
        .collect();

    let defaults = [
        (
            KNOWLEDGE_GRAPH,
            "Organize topics based on prerequisite relationships",
        ),
        (
            SCAFFOLDED_MASTERY,
            "Ensure mastery of prerequisites before advancing to new topics",
        ),
    ];
    for (name, description) in defaults {
        if principles.iter().any(|principle| principle.name == name) {
            continue;
        }
        principles.push(ApplicablePrinciple {
            name: name.to_string(),
            description: description.to_string(),
            implementation: principle_implementation(name),
        });
    }

    principles
}

/// Curriculum-wide guidance for a principle.
pub fn principle_implementation(name: &str) -> String {
    let text = match name {
        KNOWLEDGE_GRAPH => "Visualize topic relationships in a knowledge graph to show prerequisites and connections",
        SCAFFOLDED_MASTERY => "Require mastery of prerequisites before advancing to new topics",
        PREREQUISITES => "Identify and address key prerequisites before introducing new material",
        WORKING_MEMORY => "Break complex concepts into manageable chunks to avoid overloading working memory",
        COGNITIVE_STRATEGIES => "Use retrieval practice, spaced repetition, and interleaving to enhance learning",
        DESIRABLE_DIFFICULTY => "Incorporate challenges that promote deeper processing and better retention",
        TWO_SIGMA => "Provide personalized instruction and feedback to approach the two-sigma effect",
        other => {
            return format!(
                "Implement the {} principle throughout the learning experience",
                other
            )
        }
    };
    text.to_string()
}

/// How a principle plays out in the lesson on `title`.
pub fn principle_application(name: &str, title: &str) -> String {
    match name {
        KNOWLEDGE_GRAPH => format!(
            "Visualize how {} connects to its prerequisites and subsequent topics",
            title
        ),
        SCAFFOLDED_MASTERY => format!("Ensure mastery of prerequisites before advancing to {}", title),
        PREREQUISITES => format!(
            "Identify and address key prerequisites needed for understanding {}",
            title
        ),
        WORKING_MEMORY => format!(
            "Break {} into manageable chunks to avoid cognitive overload",
            title
        ),
        COGNITIVE_STRATEGIES => format!(
            "Apply retrieval practice and spaced repetition to reinforce understanding of {}",
            title
        ),
        DESIRABLE_DIFFICULTY => format!(
            "Incorporate challenging problems related to {} to promote deeper learning",
            title
        ),
        TWO_SIGMA => format!(
            "Provide personalized feedback on {} to approach the two-sigma effect",
            title
        ),
        other => format!("Apply the {} principle to {}", other, title),
    }
}
