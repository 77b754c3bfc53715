use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::warn;
use uuid::Uuid;

use crate::core::models::application::{Application, ApplicationQuery, Apply, DecisionPatch};
use crate::core::ports::repository::ApplicationStore;
use crate::error::Error;
use crate::sanitize::sanitize;

/// File-per-record store: `{slug}_{tg_id}.json` under one directory. Every
/// applicant owns a separate storage unit, so a corrupted entry never
/// touches a neighbour and writers on different applicants never contend on
/// a shared file. The id suffix carries uniqueness; the slug is cosmetic.
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Write-then-publish: the payload goes to a uniquely named temp file and
    /// becomes visible only through an atomic rename, so a crash mid-write
    /// leaves the previous version intact and at worst a stray `*.tmp` that
    /// scans never look at.
    fn persist(&self, path: &Path, application: &Application) -> Result<(), Error> {
        let payload = serde_json::to_vec_pretty(application)?;
        let tmp = self.dir.join(format!("{}.tmp", Uuid::new_v4().simple()));
        fs::write(&tmp, payload)?;
        if let Err(e) = fs::rename(&tmp, path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn read_entry(path: &Path) -> Option<Application> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("skipping unreadable entry {}: {}", path.display(), e);
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(application) => Some(application),
            Err(e) => {
                warn!("skipping malformed entry {}: {}", path.display(), e);
                None
            }
        }
    }

    fn entries(&self) -> Result<Vec<PathBuf>, Error> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Locates the entry for an applicant by the `_{tg_id}.json` suffix,
    /// whatever the cosmetic slug in front of it says.
    fn find_path(&self, tg_id: i64) -> Result<Option<PathBuf>, Error> {
        let suffix = format!("_{}.json", tg_id);
        Ok(self.entries()?.into_iter().find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map_or(false, |name| name.ends_with(&suffix))
        }))
    }
}

#[async_trait]
impl ApplicationStore for FsStore {
    async fn insert(&self, data: Apply) -> Result<Application, Error> {
        // The filename-level check also covers entries that no longer parse:
        // an occupied id stays occupied even if its payload got mangled.
        if self.find_path(data.tg_id)?.is_some() {
            return Err(Error::AlreadyExists(data.tg_id));
        }
        let application = Application::pending(data);
        let path = self.dir.join(format!(
            "{}_{}.json",
            sanitize(&application.first_name),
            application.tg_id
        ));
        self.persist(&path, &application)?;
        Ok(application)
    }

    async fn get(&self, tg_id: i64) -> Result<Option<Application>, Error> {
        match self.find_path(tg_id)? {
            Some(path) => Ok(Self::read_entry(&path)),
            None => Ok(None),
        }
    }

    async fn patch(&self, tg_id: i64, patch: DecisionPatch) -> Result<Application, Error> {
        let path = self.find_path(tg_id)?.ok_or(Error::NotFound(tg_id))?;
        let mut application = Self::read_entry(&path).ok_or(Error::NotFound(tg_id))?;
        application.merge(patch);
        self.persist(&path, &application)?;
        Ok(application)
    }

    async fn count(&self, query: &ApplicationQuery) -> Result<i64, Error> {
        let mut total = 0;
        for path in self.entries()? {
            if let Some(application) = Self::read_entry(&path) {
                if query.matches(&application) {
                    total += 1;
                }
            }
        }
        Ok(total)
    }

    async fn list(&self, query: &ApplicationQuery) -> Result<Vec<Application>, Error> {
        let mut applications = Vec::new();
        for path in self.entries()? {
            if let Some(application) = Self::read_entry(&path) {
                if query.matches(&application) {
                    applications.push(application);
                }
            }
        }
        applications.sort_by_key(|a| (a.applied_at, a.tg_id));
        Ok(applications)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use tempfile::tempdir;

    use super::*;
    use crate::core::models::application::Status;

    fn apply(tg_id: i64, first_name: &str) -> Apply {
        Apply {
            tg_id,
            first_name: first_name.to_owned(),
            last_name: "Tester".to_owned(),
            username: "tester".to_owned(),
            reason: Some("want in".to_owned()),
        }
    }

    fn approval(decided_by: i64) -> DecisionPatch {
        DecisionPatch {
            status: Status::Approved,
            credential: Some("k".repeat(32)),
            decided_at: Utc::now(),
            decided_by,
        }
    }

    #[tokio::test]
    async fn insert_then_get_roundtrips() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        let created = store.insert(apply(7, "Женя")).await.unwrap();
        assert_eq!(created.status, Status::Pending);
        let read = store.get(7).await.unwrap().unwrap();
        assert_eq!(read, created);
        assert!(dir.path().join("Zhenya_7.json").exists());
    }

    #[tokio::test]
    async fn duplicate_insert_is_refused() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        store.insert(apply(7, "A")).await.unwrap();
        match store.insert(apply(7, "B")).await {
            Err(Error::AlreadyExists(7)) => {}
            other => panic!("expected AlreadyExists, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn patch_rewrites_the_same_entry() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        store.insert(apply(7, "Ann")).await.unwrap();
        let patched = store.patch(7, approval(1)).await.unwrap();
        assert_eq!(patched.status, Status::Approved);
        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
        let read = store.get(7).await.unwrap().unwrap();
        assert_eq!(read.credential, patched.credential);
        assert_eq!(read.decided_by, Some(1));
    }

    #[tokio::test]
    async fn patch_on_missing_entry_fails() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        match store.patch(404, approval(1)).await {
            Err(Error::NotFound(404)) => {}
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn disk_layout_keeps_legacy_field_names() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        store.insert(apply(7, "Ann")).await.unwrap();
        store.patch(7, approval(1)).await.unwrap();
        let raw = std::fs::read_to_string(dir.path().join("Ann_7.json")).unwrap();
        assert!(raw.contains("\"vpn_key\""));
        assert!(raw.contains("\"approved_at\""));
        assert!(raw.contains("\"approved_by\""));
        assert!(!raw.contains("\"credential\""));
    }

    #[tokio::test]
    async fn corrupt_entry_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        store.insert(apply(1, "Ann")).await.unwrap();
        store.insert(apply(2, "Bob")).await.unwrap();
        std::fs::write(dir.path().join("mangled_3.json"), b"{ not json").unwrap();

        assert_eq!(store.count(&ApplicationQuery::default()).await.unwrap(), 2);
        assert!(store.get(2).await.unwrap().is_some());
        // The mangled id reads as absent but stays occupied.
        assert!(store.get(3).await.unwrap().is_none());
        match store.insert(apply(3, "Eve")).await {
            Err(Error::AlreadyExists(3)) => {}
            other => panic!("expected AlreadyExists, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stray_tmp_files_are_invisible() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        store.insert(apply(1, "Ann")).await.unwrap();
        std::fs::write(dir.path().join("deadbeef.tmp"), b"partial").unwrap();
        assert_eq!(store.count(&ApplicationQuery::default()).await.unwrap(), 1);
        assert_eq!(store.list(&ApplicationQuery::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn id_suffix_match_is_exact() {
        let dir = tempdir().unwrap();
        let store = FsStore::new(dir.path()).unwrap();
        store.insert(apply(123, "Ann")).await.unwrap();
        assert!(store.get(23).await.unwrap().is_none());
        assert!(store.get(123).await.unwrap().is_some());
    }
}
