//! Per-document store: generated lessons plus learner progress.
//!
//! Every mutation is one rkyv-encoded WAL record; the in-memory state is
//! rebuilt by replaying the log on open.

use crate::wal::{Wal, WalError};
use chrono::{Days, NaiveDate, Utc};
use lessonforge_core::error::{ErrorCode, LessonForgeError};
use lessonforge_core::lesson::Lesson;
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use rkyv::{Archive, Deserialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),
    #[error("Serialization error")]
    Serialization,
    #[error("Module already stored in {0}")]
    AlreadyStored(String),
    #[error("Lesson not found: {0}")]
    LessonNotFound(String),
    #[error("Invalid module file name: {0}")]
    InvalidFileName(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LessonForgeError for StoreError {
    fn error_code(&self) -> ErrorCode {
        match self {
            StoreError::Wal(err) => err.error_code(),
            StoreError::Serialization => ErrorCode::Internal,
            StoreError::AlreadyStored(_) => ErrorCode::Conflict,
            StoreError::LessonNotFound(_) => ErrorCode::NotFound,
            StoreError::InvalidFileName(_) => ErrorCode::InvalidArgument,
            StoreError::Io(_) => ErrorCode::Unavailable,
        }
    }
}

#[derive(Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub enum StoreEntry {
    Module(ModuleRecord),
    Progress(ProgressRecord),
}

#[derive(Archive, rkyv::Deserialize, rkyv::Serialize, serde::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    pub pdf_name: String,
    pub title: String,
    pub description: String,
    pub created_at: i64,
    #[serde(skip)]
    pub lessons: Vec<LessonRecord>,
}

#[derive(Archive, rkyv::Deserialize, rkyv::Serialize, serde::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
#[serde(rename_all = "camelCase")]
pub struct LessonRecord {
    /// Row id, sequential from 1 within the store.
    pub id: u64,
    pub lesson_key: String,
    pub parent_key: Option<String>,
    pub title: String,
    pub overview: String,
    pub objectives: Vec<String>,
    pub prerequisites: Vec<PrerequisiteRecord>,
    pub sections: Vec<SectionRecord>,
    pub principles: Vec<PrincipleRecord>,
}

#[derive(Archive, rkyv::Deserialize, rkyv::Serialize, serde::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct PrerequisiteRecord {
    pub title: String,
    pub description: String,
}

#[derive(Archive, rkyv::Deserialize, rkyv::Serialize, serde::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct SectionRecord {
    pub title: String,
    pub content: String,
}

#[derive(Archive, rkyv::Deserialize, rkyv::Serialize, serde::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct PrincipleRecord {
    pub name: String,
    pub application: String,
}

#[derive(Archive, rkyv::Deserialize, rkyv::Serialize, Debug, Clone, PartialEq)]
#[archive(check_bytes)]
pub struct ProgressRecord {
    pub lesson_id: u64,
    pub xp_earned: u32,
    pub completed_at: i64,
    pub date: String,
    pub daily_goal: u32,
}

impl LessonRecord {
    fn from_lesson(id: u64, lesson: &Lesson) -> Self {
        Self {
            id,
            lesson_key: lesson.id.clone(),
            parent_key: lesson.parent_lesson_id.clone(),
            title: lesson.title.clone(),
            overview: lesson.overview.clone(),
            objectives: lesson.objectives.clone(),
            prerequisites: lesson
                .prerequisites
                .iter()
                .map(|prerequisite| PrerequisiteRecord {
                    title: prerequisite.title.clone(),
                    description: prerequisite.description.clone(),
                })
                .collect(),
            sections: lesson
                .sections
                .iter()
                .map(|section| SectionRecord {
                    title: section.title.clone(),
                    content: section.content.clone(),
                })
                .collect(),
            principles: lesson
                .principles
                .iter()
                .map(|principle| PrincipleRecord {
                    name: principle.name.clone(),
                    application: principle.application.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressOptions {
    pub daily_xp_goal: u32,
    pub streak_days: u32,
}

impl Default for ProgressOptions {
    fn default() -> Self {
        Self {
            daily_xp_goal: 100,
            streak_days: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredLesson {
    #[serde(flatten)]
    pub record: LessonRecord,
    pub completed: bool,
    pub xp_earned: u32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct StoredModule {
    pub module: ModuleRecord,
    pub lessons: Vec<StoredLesson>,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakDay {
    pub date: String,
    pub day: String,
    pub xp_earned: u32,
    pub xp_goal: u32,
    pub completed: bool,
    pub partial: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_xp: u64,
    pub daily_xp: u32,
    pub daily_goal: u32,
    pub streak: Vec<StreakDay>,
    pub completed_lessons: usize,
    pub total_lessons: usize,
    pub progress: u32,
}

#[derive(Debug, Clone, Copy, Default)]
struct DailyGoal {
    xp_earned: u32,
    xp_goal: u32,
}

#[derive(Debug, Default)]
struct State {
    module: Option<ModuleRecord>,
    progress: HashMap<u64, ProgressRecord>,
    daily: BTreeMap<String, DailyGoal>,
}

impl State {
    fn apply(&mut self, entry: StoreEntry) {
        match entry {
            StoreEntry::Module(module) => {
                self.module = Some(module);
            }
            StoreEntry::Progress(record) => {
                let day = self.daily.entry(record.date.clone()).or_insert(DailyGoal {
                    xp_earned: 0,
                    xp_goal: record.daily_goal,
                });
                day.xp_earned = day.xp_earned.saturating_add(record.xp_earned);
                self.progress.insert(record.lesson_id, record);
            }
        }
    }

    fn lessons(&self) -> &[LessonRecord] {
        self.module
            .as_ref()
            .map(|module| module.lessons.as_slice())
            .unwrap_or(&[])
    }

    fn resolve_lesson(&self, lesson: &str) -> Option<u64> {
        let lessons = self.lessons();
        lessons
            .iter()
            .find(|record| record.lesson_key == lesson)
            .or_else(|| {
                let row: u64 = lesson.parse().ok()?;
                lessons.iter().find(|record| record.id == row)
            })
            .map(|record| record.id)
    }

    fn completed_count(&self) -> usize {
        self.lessons()
            .iter()
            .filter(|record| self.progress.contains_key(&record.id))
            .count()
    }
}

#[derive(Debug)]
pub struct ModuleStore {
    path: PathBuf,
    wal: Mutex<Wal>,
    state: RwLock<State>,
    options: ProgressOptions,
}

impl ModuleStore {
    /// Opens the store file at `path`, replaying its log.
    pub async fn open(path: impl AsRef<Path>, options: ProgressOptions) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut wal = Wal::open(&path).await?;
        let mut state = State::default();

        let last_lsn = wal
            .replay(|_lsn, data| {
                let entry = decode_entry(&data)?;
                state.apply(entry);
                Ok(())
            })
            .await?;
        tracing::debug!(path = %path.display(), last_lsn, "module store opened");

        Ok(Self {
            path,
            wal: Mutex::new(wal),
            state: RwLock::new(state),
            options,
        })
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Stores module metadata and every lesson as a single log record.
    /// Returns the lesson row ids in lesson order. A store holds one module;
    /// a second call fails with [`StoreError::AlreadyStored`].
    pub async fn store_lessons(&self, pdf_name: &str, lessons: &[Lesson]) -> Result<Vec<u64>, StoreError> {
        let mut state = self.state.write().await;
        if state.module.is_some() {
            return Err(StoreError::AlreadyStored(self.file_name()));
        }

        let records: Vec<LessonRecord> = lessons
            .iter()
            .enumerate()
            .map(|(i, lesson)| LessonRecord::from_lesson(i as u64 + 1, lesson))
            .collect();
        let ids = records.iter().map(|record| record.id).collect();

        let module = ModuleRecord {
            pdf_name: pdf_name.to_string(),
            title: format!("Generated from {}", pdf_name),
            description: "Lessons generated from PDF content analysis".to_string(),
            created_at: Utc::now().timestamp(),
            lessons: records,
        };
        let entry = StoreEntry::Module(module);
        self.append(&entry).await?;
        state.apply(entry);

        tracing::info!(file = %self.file_name(), lessons = lessons.len(), "stored lessons");
        Ok(ids)
    }

    /// Row ids of the stored lessons; empty when nothing was stored yet.
    pub async fn lesson_ids(&self) -> Vec<u64> {
        let state = self.state.read().await;
        state.lessons().iter().map(|record| record.id).collect()
    }

    pub async fn has_module(&self) -> bool {
        self.state.read().await.module.is_some()
    }

    /// The stored module with every lesson and its completion state.
    pub async fn module(&self) -> Option<StoredModule> {
        let state = self.state.read().await;
        let module = state.module.as_ref()?;

        let lessons = module
            .lessons
            .iter()
            .map(|record| {
                let progress = state.progress.get(&record.id);
                StoredLesson {
                    record: record.clone(),
                    completed: progress.is_some(),
                    xp_earned: progress.map(|p| p.xp_earned).unwrap_or(0),
                }
            })
            .collect();

        Some(StoredModule {
            module: module.clone(),
            lessons,
        })
    }

    /// Marks a lesson completed with `xp` earned on `today`.
    ///
    /// `lesson` is a lesson key (`lesson-2.1`) or a row id. The lesson's XP is
    /// replaced on repeat completion while the day's XP keeps accumulating.
    pub async fn update_lesson_progress(&self, lesson: &str, xp: u32, today: NaiveDate) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        let lesson_id = state
            .resolve_lesson(lesson)
            .ok_or_else(|| StoreError::LessonNotFound(lesson.to_string()))?;

        let entry = StoreEntry::Progress(ProgressRecord {
            lesson_id,
            xp_earned: xp,
            completed_at: Utc::now().timestamp(),
            date: today.format(DATE_FORMAT).to_string(),
            daily_goal: self.options.daily_xp_goal,
        });
        self.append(&entry).await?;
        state.apply(entry);

        tracing::debug!(lesson, xp, "lesson progress updated");
        Ok(())
    }

    pub async fn progress_stats(&self, today: NaiveDate) -> ProgressStats {
        let state = self.state.read().await;
        let goal_for = |date: &str| {
            state.daily.get(date).copied().unwrap_or(DailyGoal {
                xp_earned: 0,
                xp_goal: self.options.daily_xp_goal,
            })
        };

        let streak = (0..self.options.streak_days)
            .rev()
            .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
            .map(|date| {
                let key = date.format(DATE_FORMAT).to_string();
                let goal = goal_for(&key);
                StreakDay {
                    day: date.format("%A").to_string(),
                    date: key,
                    xp_earned: goal.xp_earned,
                    xp_goal: goal.xp_goal,
                    completed: goal.xp_earned >= goal.xp_goal,
                    partial: goal.xp_earned > 0 && goal.xp_earned < goal.xp_goal,
                }
            })
            .collect();

        let today_goal = goal_for(&today.format(DATE_FORMAT).to_string());
        let completed_lessons = state.completed_count();
        let total_lessons = state.lessons().len();

        ProgressStats {
            total_xp: state.progress.values().map(|p| u64::from(p.xp_earned)).sum(),
            daily_xp: today_goal.xp_earned,
            daily_goal: today_goal.xp_goal,
            streak,
            completed_lessons,
            total_lessons,
            progress: percent(completed_lessons, total_lessons),
        }
    }

    pub(crate) async fn counts(&self) -> (Option<ModuleRecord>, usize, usize) {
        let state = self.state.read().await;
        let module = state.module.as_ref().map(|module| ModuleRecord {
            lessons: Vec::new(),
            ..module.clone()
        });
        (module, state.lessons().len(), state.completed_count())
    }

    async fn append(&self, entry: &StoreEntry) -> Result<u64, StoreError> {
        let bytes = encode_entry(entry)?;
        let mut wal = self.wal.lock().await;
        let lsn = wal.append(&bytes).await?;
        wal.flush().await?;
        Ok(lsn)
    }
}

pub(crate) fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((part as f64 / total as f64) * 100.0).round() as u32
}

fn encode_entry(entry: &StoreEntry) -> Result<Vec<u8>, StoreError> {
    let mut serializer = AllocSerializer::<4096>::default();
    serializer
        .serialize_value(entry)
        .map_err(|_| StoreError::Serialization)?;
    Ok(serializer.into_serializer().into_inner().to_vec())
}

fn decode_entry(data: &[u8]) -> Result<StoreEntry, WalError> {
    let archived =
        rkyv::check_archived_root::<StoreEntry>(data).map_err(|_| WalError::CorruptEntry)?;
    archived
        .deserialize(&mut rkyv::Infallible)
        .map_err(|_| WalError::CorruptEntry)
}
