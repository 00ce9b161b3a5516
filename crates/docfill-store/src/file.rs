use crate::StoreError;
use docfill_domain::traits::TaskStore;
use docfill_domain::{TaskId, TaskRecord};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Status-file implementation of TaskStore
///
/// Each task owns exactly one file, `<task_id>.json`, in the store
/// directory. Writes go to a sibling temp file which is then renamed over the
/// status file, so the success and error outcomes share one artifact and a
/// reader never observes a half-written record.
#[derive(Debug, Clone)]
pub struct FileTaskStore {
    dir: PathBuf,
}

impl FileTaskStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self, StoreError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Directory holding the status files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: TaskId) -> PathBuf {
        self.dir.join(format!("{}.json", id))
    }

    fn temp_path(&self, id: TaskId) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", id))
    }
}

impl TaskStore for FileTaskStore {
    type Error = StoreError;

    fn put(&self, record: &TaskRecord) -> Result<(), Self::Error> {
        let bytes = serde_json::to_vec_pretty(record)?;
        let temp = self.temp_path(record.task_id);

        {
            let mut file = fs::File::create(&temp)?;
            file.write_all(&bytes)?;
            file.sync_all()?;
        }
        fs::rename(&temp, self.record_path(record.task_id))?;

        debug!(task_id = %record.task_id, status = record.status.as_str(), "Status file written");
        Ok(())
    }

    fn get(&self, id: TaskId) -> Result<Option<TaskRecord>, Self::Error> {
        match fs::read(self.record_path(id)) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_directory() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("status").join("tasks");
        let store = FileTaskStore::new(&nested).unwrap();
        assert!(store.dir().is_dir());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let tmp = TempDir::new().unwrap();
        let store = FileTaskStore::new(tmp.path()).unwrap();
        let record = TaskRecord::processing(TaskId::new());
        store.put(&record).unwrap();

        let names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![format!("{}.json", record.task_id)]);
    }

    #[test]
    fn test_corrupt_file_is_invalid_data() {
        let tmp = TempDir::new().unwrap();
        let store = FileTaskStore::new(tmp.path()).unwrap();
        let id = TaskId::new();
        fs::write(tmp.path().join(format!("{}.json", id)), b"{not json").unwrap();

        assert!(matches!(store.get(id), Err(StoreError::InvalidData(_))));
    }
}
