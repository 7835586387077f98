//! Favorite places and their on-disk store

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Insertion-ordered set of place names
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FavoriteSet {
    names: Vec<String>,
}

impl FavoriteSet {
    pub fn from_names(names: impl IntoIterator<Item = String>) -> Self {
        let mut set = Self::default();
        for name in names {
            if !set.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Remove `name` if present, append it otherwise. Returns whether it is
    /// a favorite afterwards.
    pub fn toggle(&mut self, name: &str) -> bool {
        if let Some(index) = self.names.iter().position(|n| n == name) {
            self.names.remove(index);
            false
        } else {
            self.names.push(name.to_string());
            true
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FavoritesError {
    #[error("favorites file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("favorites file is corrupted: {0}")]
    Corrupt(#[from] serde_json::Error),
}

const FILE_NAME: &str = "favorites.json";

/// JSON file holding the favorites as an array of names.
///
/// Clones share one writer: saves run one at a time and an older snapshot
/// never lands on top of a newer one.
#[derive(Clone, Debug)]
pub struct FavoritesStore {
    path: PathBuf,
    next_seq: Arc<AtomicU64>,
    /// Sequence number of the snapshot currently on disk
    written: Arc<tokio::sync::Mutex<u64>>,
}

impl FavoritesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_seq: Arc::new(AtomicU64::new(0)),
            written: Arc::new(tokio::sync::Mutex::new(0)),
        }
    }

    /// Store inside `dir`, or the platform data directory when `None`.
    pub fn in_dir(dir: Option<&Path>) -> Self {
        let base = dir
            .map(Path::to_path_buf)
            .or_else(|| dirs_next::data_local_dir().map(|d| d.join("weatherdeck")))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base.join(FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is an empty set.
    pub async fn load(&self) -> Result<FavoriteSet, FavoritesError> {
        let json = match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(FavoriteSet::default());
            }
            Err(e) => return Err(e.into()),
        };
        let names: Vec<String> = serde_json::from_str(&json)?;
        Ok(FavoriteSet::from_names(names))
    }

    /// Write `favorites` to a sibling temp file and rename it into place.
    ///
    /// The write runs on its own task, so cancelling the caller (a newer
    /// save replacing this one) never leaves a half-written file behind.
    pub async fn save(&self, favorites: &FavoriteSet) -> Result<(), FavoritesError> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let json = serde_json::to_string_pretty(favorites)?;
        let path = self.path.clone();
        let written = Arc::clone(&self.written);
        let count = favorites.len();

        let job = tokio::spawn(async move {
            let mut on_disk = written.lock().await;
            if *on_disk > seq {
                return Ok(());
            }
            write_atomically(&path, &json).await?;
            *on_disk = seq;
            tracing::debug!(path = %path.display(), count, "favorites saved");
            Ok::<_, FavoritesError>(())
        });
        job.await.map_err(|e| FavoritesError::Io(std::io::Error::other(e)))?
    }
}

async fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    tokio::fs::write(&tmp, contents).await?;
    tokio::fs::rename(&tmp, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = FavoriteSet::default();
        assert!(set.toggle("Lisbon"));
        assert!(set.contains("Lisbon"));
        assert!(!set.toggle("Lisbon"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_membership_is_exact() {
        let set = FavoriteSet::from_names(["Lisbon".to_string()]);
        assert!(!set.contains("lisbon"));
        assert!(!set.contains("Lisbon "));
    }

    #[test]
    fn test_from_names_drops_duplicates() {
        let set = FavoriteSet::from_names(["A".into(), "B".into(), "A".into()]);
        assert_eq!(set.names(), ["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(Some(dir.path()));
        let set = store.load().await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(Some(&dir.path().join("nested")));

        let mut set = FavoriteSet::default();
        set.toggle("Tokyo");
        set.toggle("Accra");
        store.save(&set).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let names: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(names, vec!["Tokyo", "Accra"]);
        assert_eq!(store.load().await.unwrap(), set);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(Some(dir.path()));
        std::fs::write(store.path(), "{not json").unwrap();
        assert!(matches!(
            store.load().await,
            Err(FavoritesError::Corrupt(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_saves_leave_valid_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(Some(dir.path()));
        let long = FavoriteSet::from_names((0..50).map(|i| format!("Place number {i}")));
        let short = FavoriteSet::from_names(["Oslo".to_string()]);

        for _ in 0..100 {
            let (a, b) = tokio::join!(
                tokio::spawn({
                    let store = store.clone();
                    let long = long.clone();
                    async move { store.save(&long).await }
                }),
                tokio::spawn({
                    let store = store.clone();
                    let short = short.clone();
                    async move { store.save(&short).await }
                }),
            );
            a.unwrap().unwrap();
            b.unwrap().unwrap();

            let loaded = store.load().await.unwrap();
            assert!(loaded == long || loaded == short);
        }
    }

    #[tokio::test]
    async fn test_cancelled_save_still_completes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FavoritesStore::in_dir(Some(dir.path()));
        let first = FavoriteSet::from_names(["Lima".to_string()]);
        let second = FavoriteSet::from_names(["Lima".to_string(), "Quito".to_string()]);

        let pending = tokio::spawn({
            let store = store.clone();
            async move { store.save(&first).await }
        });
        pending.abort();
        store.save(&second).await.unwrap();

        assert_eq!(store.load().await.unwrap(), second);
    }
}
