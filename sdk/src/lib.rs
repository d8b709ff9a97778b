//! Library facade over the lesson pipeline and the module stores. The
//! `lessonforge` binary is a thin clap wrapper around [`LessonForge`].

use chrono::{Local, NaiveDate};
use ingestion::extract::detect_content_kind;
use ingestion::{
    generate_curriculum, ContentKind, Curriculum, DefaultTextExtractor, DocumentRequest,
    IngestionError, IngestionOutcome, IngestionPipeline, TextExtractor,
};
use lessonforge_core::config::{AppConfig, ConfigError};
use lessonforge_core::error::{ErrorCode, LessonForgeError};
use std::path::Path;
use std::sync::Arc;
use storage::{
    ModuleCatalog, ModuleStore, ModuleSummary, ProgressOptions, ProgressStats, StoreError,
    StoredModule,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ingestion(#[from] IngestionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),
    #[error("Module not found: {0}")]
    ModuleNotFound(String),
}

impl LessonForgeError for SdkError {
    fn error_code(&self) -> ErrorCode {
        match self {
            SdkError::Config(_) => ErrorCode::InvalidArgument,
            SdkError::Ingestion(err) => err.error_code(),
            SdkError::Store(err) => err.error_code(),
            SdkError::Read { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                ErrorCode::NotFound
            }
            SdkError::Read { .. } => ErrorCode::Unavailable,
            SdkError::UnsupportedDocument(_) => ErrorCode::InvalidArgument,
            SdkError::ModuleNotFound(_) => ErrorCode::NotFound,
        }
    }
}

pub struct LessonForge {
    catalog: Arc<ModuleCatalog>,
    pipeline: IngestionPipeline,
}

impl LessonForge {
    /// Loads [`AppConfig`] from `config/` and the environment.
    pub fn open() -> Result<Self, SdkError> {
        let config = AppConfig::load()?;
        Ok(Self::from_config(&config))
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let options = ProgressOptions {
            daily_xp_goal: config.progress.daily_xp_goal,
            streak_days: config.progress.streak_days,
        };
        let catalog = Arc::new(ModuleCatalog::new(&config.storage.data_dir, options));
        let pipeline = IngestionPipeline::new(catalog.clone());
        Self { catalog, pipeline }
    }

    pub fn catalog(&self) -> &ModuleCatalog {
        &self.catalog
    }

    /// Generates and stores lessons for the document at `path`.
    pub async fn generate(&self, path: impl AsRef<Path>) -> Result<IngestionOutcome, SdkError> {
        let (name, bytes) = read_document(path.as_ref()).await?;
        Ok(self.pipeline.ingest(DocumentRequest::new(name, bytes)).await?)
    }

    /// Runs the analysis for the document at `path` without storing anything.
    pub async fn graph(&self, path: impl AsRef<Path>) -> Result<Curriculum, SdkError> {
        let (name, bytes) = read_document(path.as_ref()).await?;
        let kind = detect_content_kind("", Some(&name));
        if kind == ContentKind::Unsupported {
            return Err(SdkError::UnsupportedDocument(name));
        }
        let text = DefaultTextExtractor
            .extract(kind, &bytes)
            .await
            .map_err(IngestionError::from)?;
        Ok(generate_curriculum(&text, &curriculum::TemplateContent))
    }

    pub async fn modules(&self) -> Result<Vec<ModuleSummary>, SdkError> {
        Ok(self.catalog.list().await?)
    }

    pub async fn lessons(&self, module_file: &str) -> Result<StoredModule, SdkError> {
        self.store(module_file)
            .await?
            .module()
            .await
            .ok_or_else(|| SdkError::ModuleNotFound(module_file.to_string()))
    }

    /// Records a completion for `lesson` (lesson key or row id) dated today
    /// in local time and returns the refreshed stats.
    pub async fn complete(&self, module_file: &str, lesson: &str, xp: u32) -> Result<ProgressStats, SdkError> {
        self.complete_on(module_file, lesson, xp, today()).await
    }

    pub async fn complete_on(
        &self,
        module_file: &str,
        lesson: &str,
        xp: u32,
        day: NaiveDate,
    ) -> Result<ProgressStats, SdkError> {
        let store = self.store(module_file).await?;
        store.update_lesson_progress(lesson, xp, day).await?;
        Ok(store.progress_stats(day).await)
    }

    pub async fn stats(&self, module_file: &str) -> Result<ProgressStats, SdkError> {
        self.stats_on(module_file, today()).await
    }

    pub async fn stats_on(&self, module_file: &str, day: NaiveDate) -> Result<ProgressStats, SdkError> {
        Ok(self.store(module_file).await?.progress_stats(day).await)
    }

    async fn store(&self, module_file: &str) -> Result<Arc<ModuleStore>, SdkError> {
        self.catalog
            .open(module_file)
            .await?
            .ok_or_else(|| SdkError::ModuleNotFound(module_file.to_string()))
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn read_document(path: &Path) -> Result<(String, Vec<u8>), SdkError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| SdkError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, bytes))
}
