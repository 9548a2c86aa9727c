use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{DbError, DbResult};
use crate::traits::KeyValueStore;

/// Directory-backed key/value store: one `<key>.json` file per key.
///
/// Writes go to a sibling temp file that is flushed to disk before being
/// renamed over the target, so a crash mid-write leaves either the old
/// document or the new one.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub async fn open(dir: impl AsRef<Path>) -> DbResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> DbResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DbError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

/// Persist a rename by flushing the containing directory entry.
#[cfg(unix)]
async fn sync_dir(dir: &Path) -> std::io::Result<()> {
    tokio::fs::File::open(dir).await?.sync_all().await
}

#[cfg(not(unix))]
async fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DbError::Io(e)),
        }
    }

    async fn set(&self, key: &str, value: String) -> DbResult<()> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let failed = |e: std::io::Error| DbError::WriteFailed(format!("{key}: {e}"));

        let mut file = tokio::fs::File::create(&tmp).await.map_err(failed)?;
        file.write_all(value.as_bytes()).await.map_err(failed)?;
        file.sync_all().await.map_err(failed)?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await.map_err(failed)?;
        sync_dir(&self.dir).await.map_err(failed)
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DbError::Io(e)),
        }
    }
}
