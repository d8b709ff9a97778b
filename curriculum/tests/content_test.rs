use curriculum::principles::applicable_principles;
use curriculum::{order_topics, KnowledgeGraph, LessonAssembler, LessonContent, LessonSubject};
use lessonforge_core::lesson::{
    Assessment, LessonSection, PracticeProblem, Resource, ResourceKind,
};
use lessonforge_core::model::{Concept, NodeId, RelationKind, Relationship, Subtopic, Topic};

/// Fixed text so assertions can see exactly what the assembler forwards.
struct FixedContent;

impl LessonContent for FixedContent {
    fn overview(&self, subject: &LessonSubject<'_>) -> String {
        format!("overview of {}", subject.id)
    }

    fn objectives(&self, subject: &LessonSubject<'_>) -> Vec<String> {
        vec![format!("learn {}", subject.title)]
    }

    fn sections(&self, _subject: &LessonSubject<'_>) -> Vec<LessonSection> {
        vec![LessonSection::new("Body", "fixed")]
    }

    fn practice(&self, _subject: &LessonSubject<'_>) -> Vec<PracticeProblem> {
        Vec::new()
    }

    fn assessment(&self, subject: &LessonSubject<'_>) -> Assessment {
        Assessment {
            id: format!("quiz-{}", subject.id),
            title: String::new(),
            description: String::new(),
            questions: Vec::new(),
            passing_score: 0,
        }
    }

    fn further_resources(&self, _subject: &LessonSubject<'_>, concepts: &[Concept]) -> Vec<Resource> {
        concepts
            .iter()
            .map(|concept| Resource {
                title: concept.term.clone(),
                kind: ResourceKind::Definition,
                content: concept.definition.clone(),
            })
            .collect()
    }

    fn principle_application(&self, name: &str, subject: &LessonSubject<'_>) -> String {
        format!("{} in {}", name, subject.title)
    }
}

fn topics() -> Vec<Topic> {
    let long = "Graphs of groups ".repeat(15);
    vec![
        Topic {
            id: 1,
            title: "Groups".to_string(),
            number: "1".to_string(),
            level: 1,
            content: "Groups have an identity.".to_string(),
            subtopics: vec![Subtopic {
                id: NodeId::Subtopic { topic: 1, seq: 1 },
                title: "Cayley Graphs".to_string(),
                number: "1.1".to_string(),
                level: 2,
                content: long,
            }],
        },
        Topic {
            id: 2,
            title: "Rings".to_string(),
            number: "2".to_string(),
            level: 1,
            content: "Rings builds on Groups.".to_string(),
            subtopics: Vec::new(),
        },
    ]
}

fn relationships() -> Vec<Relationship> {
    vec![Relationship::new(
        NodeId::Topic(1),
        NodeId::Topic(2),
        RelationKind::Prerequisite,
        "Groups is a prerequisite for Rings",
    )]
}

#[test]
fn assembler_forwards_provider_text() {
    let topics = topics();
    let relationships = relationships();
    let concepts = vec![Concept {
        id: 1,
        term: "A group".to_string(),
        definition: "a set with an operation".to_string(),
    }];
    let principles = applicable_principles(&[]);
    let ordering = order_topics(&topics, &relationships);

    let lessons = LessonAssembler::new(&topics, &FixedContent)
        .with_concepts(&concepts)
        .with_principles(&principles)
        .assemble(&ordering.ordered, &relationships);

    let ids: Vec<&str> = lessons.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec!["lesson-1", "lesson-1.1", "lesson-2"]);

    assert_eq!(lessons[0].overview, "overview of 1");
    assert_eq!(lessons[0].sections[0].title, "Body");
    assert_eq!(lessons[0].assessment.id, "quiz-1");
    assert_eq!(lessons[0].further_resources.len(), 1);
    assert_eq!(lessons[0].principles[0].application, "Knowledge Graph in Groups");

    let subtopic = &lessons[1];
    assert_eq!(subtopic.overview, "overview of 1.1");
    assert_eq!(subtopic.parent_lesson_id.as_deref(), Some("lesson-1"));
    assert_eq!(subtopic.sections.len(), 1);
    assert_eq!(subtopic.sections[0].title, "Introduction");
    assert_eq!(subtopic.prerequisites[0].title, "Groups");

    assert_eq!(lessons[2].prerequisites.len(), 1);
    assert_eq!(lessons[2].prerequisites[0].id, 1);
}

#[test]
fn graph_and_order_agree_on_prerequisites() {
    let topics = topics();
    let relationships = relationships();
    let graph = KnowledgeGraph::build(&topics, &relationships);
    let order = order_topics(&topics, &relationships).ordered_ids();

    for edge in graph.edges().iter().filter(|e| e.kind == RelationKind::Prerequisite) {
        let (Some(source), Some(target)) = (edge.source.topic_id(), edge.target.topic_id()) else {
            continue;
        };
        let source_at = order.iter().position(|&id| id == source).unwrap();
        let target_at = order.iter().position(|&id| id == target).unwrap();
        assert!(source_at < target_at);
    }

    let rings = graph.prerequisites_of(NodeId::Topic(2));
    assert_eq!(rings.len(), 1);
    assert_eq!(rings[0].label, "Groups");
    assert_eq!(graph.dependents_of(NodeId::Topic(1))[0].id, NodeId::Topic(2));
}
