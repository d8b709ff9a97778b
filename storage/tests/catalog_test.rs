use chrono::NaiveDate;
use lessonforge_core::error::{ErrorCode, LessonForgeError};
use lessonforge_core::lesson::{Assessment, Lesson};
use std::sync::Arc;
use storage::{ModuleCatalog, ProgressOptions};
use tempfile::tempdir;

fn lesson(key: &str) -> Lesson {
    Lesson {
        id: key.to_string(),
        parent_lesson_id: None,
        title: key.to_string(),
        overview: String::new(),
        objectives: Vec::new(),
        prerequisites: Vec::new(),
        sections: Vec::new(),
        practice: Vec::new(),
        assessment: Assessment {
            id: format!("assessment-{}", key),
            title: String::new(),
            description: String::new(),
            questions: Vec::new(),
            passing_score: 25,
        },
        further_resources: Vec::new(),
        principles: Vec::new(),
    }
}

#[tokio::test]
async fn list_summarizes_every_module_file() {
    let dir = tempdir().unwrap();
    let catalog = ModuleCatalog::new(dir.path(), ProgressOptions::default());

    let algebra = ModuleCatalog::module_file_name("algebra.pdf", b"algebra");
    let store = catalog.open_or_create(&algebra).await.unwrap();
    store
        .store_lessons("algebra.pdf", &[lesson("lesson-1"), lesson("lesson-2"), lesson("lesson-3")])
        .await
        .unwrap();
    store
        .update_lesson_progress("lesson-2", 25, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap())
        .await
        .unwrap();

    let empty = ModuleCatalog::module_file_name("blank.pdf", b"blank");
    catalog.open_or_create(&empty).await.unwrap();

    tokio::fs::write(dir.path().join("notes.txt"), b"ignored").await.unwrap();

    let summaries = catalog.list().await.unwrap();
    assert_eq!(summaries.len(), 2);

    let first = &summaries[0];
    assert_eq!(first.file, algebra);
    assert_eq!(first.title, "Generated from algebra.pdf");
    assert_eq!(first.lesson_count, 3);
    assert_eq!(first.completed_count, 1);
    assert_eq!(first.progress, 33);
    assert!(first.created_at.is_some());

    let second = &summaries[1];
    assert_eq!(second.title, "Unknown Module");
    assert_eq!(second.lesson_count, 0);
    assert_eq!(second.progress, 0);
}

#[tokio::test]
async fn open_distinguishes_missing_files_and_shares_handles() {
    let dir = tempdir().unwrap();
    let catalog = ModuleCatalog::new(dir.path(), ProgressOptions::default());

    assert!(catalog.open("missing_0000000000.module").await.unwrap().is_none());

    let created = catalog.open_or_create("sets_0000000000.module").await.unwrap();
    let opened = catalog.open("sets_0000000000.module").await.unwrap().unwrap();
    assert!(Arc::ptr_eq(&created, &opened));

    let err = catalog.open("../escape.module").await.unwrap_err();
    assert_eq!(err.error_code(), ErrorCode::InvalidArgument);
}

#[tokio::test]
async fn reopened_catalog_sees_persisted_progress() {
    let dir = tempdir().unwrap();
    let file = ModuleCatalog::module_file_name("limits.pdf", b"limits");
    let day = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

    {
        let catalog = ModuleCatalog::new(dir.path(), ProgressOptions::default());
        let store = catalog.open_or_create(&file).await.unwrap();
        store.store_lessons("limits.pdf", &[lesson("lesson-1")]).await.unwrap();
        store.update_lesson_progress("lesson-1", 120, day).await.unwrap();
    }

    let catalog = ModuleCatalog::new(dir.path(), ProgressOptions::default());
    let store = catalog.open(&file).await.unwrap().unwrap();
    let stats = store.progress_stats(day).await;
    assert_eq!(stats.total_xp, 120);
    assert!(stats.streak.last().unwrap().completed);
    assert_eq!(stats.progress, 100);
}
