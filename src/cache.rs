//! Stage cache - one file per (stage, article) pair
//!
//! Files live under a single directory:
//! - `{id}.plain.txt` - extracted prose
//! - `{id}.based.txt` - augmented prose
//! - `{id}.wav` - final narration (its existence is the synthesis skip flag)
//!
//! Entries are addressed by name only. A changed belief profile or article does not
//! invalidate anything; delete the file to force a stage to run again.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use tracing::debug;

use crate::error::{PipelineError, Result};
use crate::identifier::ArticleId;

/// Kinds of artifacts the pipeline persists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Plain,
    Augmented,
    Audio,
}

impl StageKind {
    /// File name suffix for this kind
    pub fn file_suffix(&self) -> &'static str {
        match self {
            StageKind::Plain => "plain.txt",
            StageKind::Augmented => "based.txt",
            StageKind::Audio => "wav",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StageKind::Plain => "plain",
            StageKind::Augmented => "augmented",
            StageKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Disk-backed store of stage artifacts
#[derive(Debug, Clone)]
pub struct StageCache {
    root: PathBuf,
}

impl StageCache {
    /// Create a cache rooted at `root`. The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Location of the artifact for a (kind, id) pair
    pub fn path_for(&self, kind: StageKind, id: &ArticleId) -> PathBuf {
        self.root.join(format!("{}.{}", id, kind.file_suffix()))
    }

    /// Read an artifact. Absent entries are `Ok(None)`.
    pub fn get(&self, kind: StageKind, id: &ArticleId) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(kind, id);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(stage = %kind, id = %id, bytes = bytes.len(), "Cache hit");
                Ok(Some(bytes))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(stage = %kind, id = %id, "Cache miss");
                Ok(None)
            }
            Err(e) => Err(PipelineError::storage(path, e)),
        }
    }

    /// Read a textual artifact
    pub fn get_text(&self, kind: StageKind, id: &ArticleId) -> Result<Option<String>> {
        match self.get(kind, id)? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                PipelineError::storage(
                    self.path_for(kind, id),
                    std::io::Error::new(ErrorKind::InvalidData, e),
                )
            }),
            None => Ok(None),
        }
    }

    /// Whether an artifact exists, without reading it
    pub fn contains(&self, kind: StageKind, id: &ArticleId) -> Result<bool> {
        let path = self.path_for(kind, id);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(PipelineError::storage(path, e)),
        }
    }

    /// Store an artifact, replacing any previous content.
    ///
    /// The bytes are written and synced to a temporary sibling first and then renamed
    /// over the final name, so readers never see a partially written entry.
    pub fn put(&self, kind: StageKind, id: &ArticleId, content: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.root).map_err(|e| PipelineError::storage(&self.root, e))?;

        let path = self.path_for(kind, id);
        let tmp_path = self.root.join(format!(".{}.{}.partial", id, kind.file_suffix()));

        {
            let mut file =
                fs::File::create(&tmp_path).map_err(|e| PipelineError::storage(&tmp_path, e))?;
            file.write_all(content)
                .and_then(|_| file.sync_all())
                .map_err(|e| PipelineError::storage(&tmp_path, e))?;
        }

        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(PipelineError::storage(&path, e));
        }

        debug!(
            stage = %kind,
            id = %id,
            bytes = content.len(),
            path = %path.display(),
            "Cached artifact"
        );
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(s: &str) -> ArticleId {
        ArticleId::from_url(&format!("https://example.com/{}", s)).unwrap()
    }

    #[test]
    fn test_file_names() {
        let cache = StageCache::new("/tmp/narrations");
        let article = id("story.html");
        assert_eq!(
            cache.path_for(StageKind::Plain, &article),
            PathBuf::from("/tmp/narrations/story.plain.txt")
        );
        assert_eq!(
            cache.path_for(StageKind::Augmented, &article),
            PathBuf::from("/tmp/narrations/story.based.txt")
        );
        assert_eq!(
            cache.path_for(StageKind::Audio, &article),
            PathBuf::from("/tmp/narrations/story.wav")
        );
    }

    #[test]
    fn test_round_trip_is_byte_exact() {
        let dir = TempDir::new().unwrap();
        let cache = StageCache::new(dir.path());
        let article = id("story");
        let payload = "Ünïcode prose\r\nwith trailing space ".as_bytes();

        cache.put(StageKind::Plain, &article, payload).unwrap();
        let read = cache.get(StageKind::Plain, &article).unwrap();
        assert_eq!(read.as_deref(), Some(payload));
    }

    #[test]
    fn test_absent_entry_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let cache = StageCache::new(dir.path().join("not-created-yet"));
        let article = id("missing");

        assert!(cache.get(StageKind::Augmented, &article).unwrap().is_none());
        assert!(!cache.contains(StageKind::Audio, &article).unwrap());
    }

    #[test]
    fn test_put_is_idempotent_and_last_write_wins() {
        let dir = TempDir::new().unwrap();
        let cache = StageCache::new(dir.path());
        let article = id("story");

        cache.put(StageKind::Augmented, &article, b"first").unwrap();
        cache.put(StageKind::Augmented, &article, b"first").unwrap();
        cache.put(StageKind::Augmented, &article, b"second").unwrap();

        let text = cache.get_text(StageKind::Augmented, &article).unwrap();
        assert_eq!(text.as_deref(), Some("second"));
    }

    #[test]
    fn test_stages_do_not_collide() {
        let dir = TempDir::new().unwrap();
        let cache = StageCache::new(dir.path());
        let article = id("story");

        cache.put(StageKind::Plain, &article, b"plain").unwrap();
        assert!(cache.get(StageKind::Augmented, &article).unwrap().is_none());
        assert!(cache.contains(StageKind::Plain, &article).unwrap());
    }

    #[test]
    fn test_no_partial_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let cache = StageCache::new(dir.path());
        let article = id("story");

        cache.put(StageKind::Audio, &article, &[1, 2, 3, 4]).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["story.wav".to_string()]);
    }

    #[test]
    fn test_unreadable_entry_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let cache = StageCache::new(dir.path());
        let article = id("story");

        // A directory where a file is expected cannot be read as an artifact
        fs::create_dir_all(cache.path_for(StageKind::Plain, &article)).unwrap();
        let err = cache.get(StageKind::Plain, &article).unwrap_err();
        assert!(matches!(err, PipelineError::StorageUnavailable { .. }));
    }
}
