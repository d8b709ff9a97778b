use crate::content::{LessonContent, LessonSubject, TemplateContent};
use lessonforge_core::lesson::{
    lesson_id, ApplicablePrinciple, AppliedPrinciple, Lesson, LessonSection, PrerequisiteRef,
};
use lessonforge_core::model::{Concept, NodeId, Relationship, Subtopic, Topic, TopicId};
use std::collections::HashMap;

/// Subtopics with more content than this, counted in chars, get a lesson of
/// their own.
pub const SUBTOPIC_LESSON_MIN_CHARS: usize = 200;

/// Turns ordered topics into lessons.
///
/// The assembler borrows everything it needs for one run: the full topic list
/// (prerequisite sources resolve against it, not against the ordered subset),
/// the content provider, and the document-wide concepts and principles.
pub struct LessonAssembler<'a> {
    topics: HashMap<TopicId, &'a Topic>,
    content: &'a dyn LessonContent,
    concepts: &'a [Concept],
    principles: &'a [ApplicablePrinciple],
}

impl<'a> LessonAssembler<'a> {
    pub fn new(topics: &'a [Topic], content: &'a dyn LessonContent) -> Self {
        let mut by_id = HashMap::with_capacity(topics.len());
        for topic in topics {
            by_id.entry(topic.id).or_insert(topic);
        }
        Self {
            topics: by_id,
            content,
            concepts: &[],
            principles: &[],
        }
    }

    pub fn with_concepts(mut self, concepts: &'a [Concept]) -> Self {
        self.concepts = concepts;
        self
    }

    pub fn with_principles(mut self, principles: &'a [ApplicablePrinciple]) -> Self {
        self.principles = principles;
        self
    }

    /// One lesson per ordered topic, each followed by lessons for its
    /// substantial subtopics.
    pub fn assemble(&self, ordered: &[&Topic], relationships: &[Relationship]) -> Vec<Lesson> {
        let mut lessons = Vec::with_capacity(ordered.len());

        for &topic in ordered {
            let subject = LessonSubject::from(topic);
            let lesson = self.lesson(
                &subject,
                self.prerequisites_for(topic.node_id(), relationships),
                self.content.sections(&subject),
                None,
            );
            let parent_id = lesson.id.clone();
            lessons.push(lesson);

            for subtopic in substantial_subtopics(topic) {
                lessons.push(self.subtopic_lesson(topic, subtopic, &parent_id));
            }
        }

        tracing::debug!(
            topics = ordered.len(),
            lessons = lessons.len(),
            "assembled lessons"
        );
        lessons
    }

    fn prerequisites_for(&self, target: NodeId, relationships: &[Relationship]) -> Vec<PrerequisiteRef> {
        relationships
            .iter()
            .filter(|relationship| relationship.target == target && relationship.is_prerequisite())
            .filter_map(|relationship| {
                let source = self.topics.get(&relationship.source.topic_id()?)?;
                Some(PrerequisiteRef {
                    id: source.id,
                    title: source.title.clone(),
                    description: relationship.description.clone(),
                })
            })
            .collect()
    }

    fn subtopic_lesson(&self, parent: &Topic, subtopic: &Subtopic, parent_id: &str) -> Lesson {
        let subject = LessonSubject::from(subtopic);
        let prerequisite = PrerequisiteRef {
            id: parent.id,
            title: parent.title.clone(),
            description: format!(
                "Understanding of {} is required for this lesson",
                parent.title
            ),
        };
        self.lesson(
            &subject,
            vec![prerequisite],
            vec![LessonSection::new("Introduction", subtopic.content.clone())],
            Some(parent_id.to_string()),
        )
    }

    fn lesson(
        &self,
        subject: &LessonSubject<'_>,
        prerequisites: Vec<PrerequisiteRef>,
        sections: Vec<LessonSection>,
        parent_lesson_id: Option<String>,
    ) -> Lesson {
        Lesson {
            id: lesson_id(subject.id),
            parent_lesson_id,
            title: subject.title.to_string(),
            overview: self.content.overview(subject),
            objectives: self.content.objectives(subject),
            prerequisites,
            sections,
            practice: self.content.practice(subject),
            assessment: self.content.assessment(subject),
            further_resources: self.content.further_resources(subject, self.concepts),
            principles: self
                .principles
                .iter()
                .map(|principle| AppliedPrinciple {
                    name: principle.name.clone(),
                    description: principle.description.clone(),
                    application: self.content.principle_application(&principle.name, subject),
                })
                .collect(),
        }
    }
}

fn substantial_subtopics(topic: &Topic) -> impl Iterator<Item = &Subtopic> {
    topic
        .subtopics
        .iter()
        .filter(|subtopic| subtopic.content.chars().count() > SUBTOPIC_LESSON_MIN_CHARS)
}

/// Assembles lessons with [`TemplateContent`] and no concept resources.
pub fn assemble_lessons(
    ordered: &[&Topic],
    topics: &[Topic],
    relationships: &[Relationship],
    principles: &[ApplicablePrinciple],
) -> Vec<Lesson> {
    LessonAssembler::new(topics, &TemplateContent)
        .with_principles(principles)
        .assemble(ordered, relationships)
}
