use std::path::PathBuf;

use tokio::fs;

use crate::error::Result;

/// Content-addressable blob storage rooted at the configured uploads
/// directory. Keys are the generated document storage keys; deletion is
/// idempotent so lifecycle cleanup can stay best-effort.
#[derive(Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config() -> Self {
        Self::new(&crate::config::get_config().uploads_dir)
    }

    pub fn locate(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    pub async fn put(&self, key: &str, data: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root).await?;
        fs::write(self.locate(key), data).await?;
        Ok(())
    }

    /// Missing files are not an error.
    pub async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.locate(key)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_store() -> FileStore {
        FileStore::new(std::env::temp_dir().join(format!("portal-store-{}", Uuid::new_v4())))
    }

    #[test]
    fn put_then_read_back() {
        tokio_test::block_on(async {
            let store = scratch_store();
            store.put("a_b_c.pdf", b"%PDF-1.7").await.unwrap();
            let on_disk = tokio::fs::read(store.locate("a_b_c.pdf")).await.unwrap();
            assert_eq!(on_disk, b"%PDF-1.7");
        });
    }

    #[test]
    fn delete_is_idempotent() {
        tokio_test::block_on(async {
            let store = scratch_store();
            store.put("key.pdf", b"data").await.unwrap();
            store.delete("key.pdf").await.unwrap();
            // second delete of a missing key succeeds too
            store.delete("key.pdf").await.unwrap();
            assert!(!store.locate("key.pdf").exists());
        });
    }

    #[test]
    fn delete_of_never_written_key_succeeds() {
        tokio_test::block_on(async {
            let store = scratch_store();
            store.delete("ghost.pdf").await.unwrap();
        });
    }
}
