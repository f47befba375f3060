use std::{
    cmp::Reverse,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use budget_core::{BudgetDocument, BudgetStorage, CoreError, TransferService};
use budget_domain::Budget;
use chrono::Local;
use tracing::{debug, info};

const DOCUMENT_FILE: &str = "budget.json";
const BACKUP_PREFIX: &str = "budget_";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
pub const DEFAULT_RETENTION: usize = 5;

/// Filesystem-backed storage for the budget document and its backups.
#[derive(Debug, Clone)]
pub struct JsonBudgetStorage {
    data_dir: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonBudgetStorage {
    pub fn new(data_dir: PathBuf, backups_dir: PathBuf) -> Result<Self, CoreError> {
        Self::with_retention(data_dir, backups_dir, DEFAULT_RETENTION)
    }

    pub fn with_retention(
        data_dir: PathBuf,
        backups_dir: PathBuf,
        retention: usize,
    ) -> Result<Self, CoreError> {
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backups_dir)?;
        Ok(Self {
            data_dir,
            backups_dir,
            retention: retention.max(1),
        })
    }

    pub fn document_path(&self) -> PathBuf {
        self.data_dir.join(DOCUMENT_FILE)
    }

    pub fn backups_dir(&self) -> &Path {
        &self.backups_dir
    }

    /// Backup files, newest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, CoreError> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let is_backup = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with(BACKUP_PREFIX));
            if is_backup {
                entries.push(path);
            }
        }
        // timestamps sort lexicographically
        entries.sort_by_key(|path| Reverse(path.file_name().map(|name| name.to_os_string())));
        Ok(entries)
    }

    fn backup_existing_file(&self, path: &Path) -> Result<(), CoreError> {
        if !path.exists() {
            return Ok(());
        }
        fs::create_dir_all(&self.backups_dir)?;
        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let file_name = format!("{BACKUP_PREFIX}{timestamp}.{BACKUP_EXTENSION}");
        let backup_path = self.backups_dir.join(&file_name);
        fs::copy(path, &backup_path)?;
        debug!(backup = %backup_path.display(), "budget backup written");
        self.prune_backups()
    }

    fn prune_backups(&self) -> Result<(), CoreError> {
        for path in self.list_backups()?.into_iter().skip(self.retention) {
            let _ = fs::remove_file(path);
        }
        Ok(())
    }
}

impl BudgetStorage for JsonBudgetStorage {
    fn load_blob(&self) -> Result<Option<String>, CoreError> {
        let path = self.document_path();
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(&path)?;
        info!(path = %path.display(), "budget loaded");
        Ok(Some(data))
    }

    fn save_blob(&self, blob: &str) -> Result<(), CoreError> {
        let path = self.document_path();
        self.backup_existing_file(&path)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, blob)?;
        fs::rename(&tmp, &path)?;
        debug!(path = %path.display(), bytes = blob.len(), "budget saved");
        Ok(())
    }
}

/// Writes the full budget document to an arbitrary path.
pub fn save_budget_to_path(budget: &Budget, path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = TransferService::export_json(budget)?;
    let tmp = tmp_path(path);
    write_atomic(&tmp, &json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Reads and validates a possibly partial import document from disk.
pub fn load_document_from_path(path: &Path) -> Result<BudgetDocument, CoreError> {
    let data = fs::read_to_string(path)?;
    TransferService::parse_document(&data)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
