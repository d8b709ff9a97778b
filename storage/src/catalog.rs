use crate::store::{percent, ModuleStore, ProgressOptions, StoreError};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const MODULE_FILE_EXTENSION: &str = "module";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSummary {
    pub file: String,
    pub title: String,
    pub pdf_name: String,
    pub created_at: Option<i64>,
    pub lesson_count: usize,
    pub completed_count: usize,
    pub progress: u32,
}

/// Directory of module stores, one file per source document.
///
/// Opened stores are cached so every caller in the process shares the same
/// WAL handle for a given file.
pub struct ModuleCatalog {
    dir: PathBuf,
    options: ProgressOptions,
    open_stores: Mutex<HashMap<String, Arc<ModuleStore>>>,
}

impl ModuleCatalog {
    pub fn new(dir: impl Into<PathBuf>, options: ProgressOptions) -> Self {
        Self {
            dir: dir.into(),
            options,
            open_stores: Mutex::new(HashMap::new()),
        }
    }

    /// `<name>_<hash>.module`: the document name lowercased with every
    /// non-alphanumeric character replaced by `_`, and the first ten hex
    /// digits of the SHA-256 of its bytes.
    pub fn module_file_name(pdf_name: &str, bytes: &[u8]) -> String {
        let hash = format!("{:x}", Sha256::digest(bytes));
        let sanitized: String = pdf_name
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        format!("{}_{}.{}", sanitized, &hash[..10], MODULE_FILE_EXTENSION)
    }

    pub async fn open_or_create(&self, file_name: &str) -> Result<Arc<ModuleStore>, StoreError> {
        validate_file_name(file_name)?;
        let mut stores = self.open_stores.lock().await;
        if let Some(store) = stores.get(file_name) {
            return Ok(store.clone());
        }

        let store = Arc::new(ModuleStore::open(self.dir.join(file_name), self.options).await?);
        stores.insert(file_name.to_string(), store.clone());
        Ok(store)
    }

    /// Opens an existing store; `None` when the file does not exist.
    pub async fn open(&self, file_name: &str) -> Result<Option<Arc<ModuleStore>>, StoreError> {
        validate_file_name(file_name)?;
        {
            let stores = self.open_stores.lock().await;
            if let Some(store) = stores.get(file_name) {
                return Ok(Some(store.clone()));
            }
        }

        if !tokio::fs::try_exists(self.dir.join(file_name)).await? {
            return Ok(None);
        }
        self.open_or_create(file_name).await.map(Some)
    }

    /// Summaries of every store file in the directory, sorted by file name.
    pub async fn list(&self) -> Result<Vec<ModuleSummary>, StoreError> {
        let mut names = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(MODULE_FILE_EXTENSION) {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();

        let mut summaries = Vec::with_capacity(names.len());
        for name in names {
            // Stores not already in use are opened for the summary only.
            let cached = self.open_stores.lock().await.get(&name).cloned();
            let store = match cached {
                Some(store) => store,
                None => Arc::new(ModuleStore::open(self.dir.join(&name), self.options).await?),
            };
            let (module, lesson_count, completed_count) = store.counts().await;
            summaries.push(ModuleSummary {
                title: module
                    .as_ref()
                    .map(|m| m.title.clone())
                    .unwrap_or_else(|| "Unknown Module".to_string()),
                pdf_name: module
                    .as_ref()
                    .map(|m| m.pdf_name.clone())
                    .unwrap_or_else(|| "Unknown PDF".to_string()),
                created_at: module.as_ref().map(|m| m.created_at),
                lesson_count,
                completed_count,
                progress: percent(completed_count, lesson_count),
                file: name,
            });
        }
        Ok(summaries)
    }
}

fn validate_file_name(file_name: &str) -> Result<(), StoreError> {
    let invalid = file_name.is_empty()
        || file_name.contains(['/', '\\'])
        || file_name.contains("..")
        || !file_name.ends_with(&format!(".{}", MODULE_FILE_EXTENSION));
    if invalid {
        return Err(StoreError::InvalidFileName(file_name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_sanitized_and_hashed() {
        let name = ModuleCatalog::module_file_name("My Notes (v2).PDF", b"bytes");
        assert!(name.starts_with("my_notes__v2__pdf_"));
        assert!(name.ends_with(".module"));
        let hash = name
            .trim_start_matches("my_notes__v2__pdf_")
            .trim_end_matches(".module");
        assert_eq!(hash.len(), 10);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        assert_eq!(name, ModuleCatalog::module_file_name("My Notes (v2).PDF", b"bytes"));
        assert_ne!(name, ModuleCatalog::module_file_name("My Notes (v2).PDF", b"other"));
    }

    #[test]
    fn path_like_names_are_rejected() {
        assert!(validate_file_name("../x.module").is_err());
        assert!(validate_file_name("a/b.module").is_err());
        assert!(validate_file_name("notes.txt").is_err());
        assert!(validate_file_name("notes_0123456789.module").is_ok());
    }

    #[tokio::test]
    async fn listing_does_not_keep_stores_open() {
        let dir = tempfile::tempdir().unwrap();
        {
            let writer = ModuleCatalog::new(dir.path(), ProgressOptions::default());
            for i in 0..5 {
                let name = ModuleCatalog::module_file_name(&format!("doc{}.pdf", i), &[i]);
                writer.open_or_create(&name).await.unwrap();
            }
        }

        let catalog = ModuleCatalog::new(dir.path(), ProgressOptions::default());
        let in_use = ModuleCatalog::module_file_name("doc0.pdf", &[0]);
        let shared = catalog.open(&in_use).await.unwrap().unwrap();

        let summaries = catalog.list().await.unwrap();
        assert_eq!(summaries.len(), 5);
        assert_eq!(catalog.open_stores.lock().await.len(), 1);

        let reopened = catalog.open(&in_use).await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&shared, &reopened));
    }
}
