//! File storage behind a swappable trait. The default implementation keeps
//! uploads on the local filesystem under one base directory.

use std::path::PathBuf;

use anyhow::{bail, Result};
use async_trait::async_trait;

#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Saves file content and returns the relative storage key.
    async fn save(&self, content: &[u8], filename: &str, subdir: &str) -> Result<String>;

    /// Resolves a storage key to an absolute path; fails if the file is missing.
    async fn retrieve(&self, file_path: &str) -> Result<PathBuf>;

    /// Deletes a file if present.
    async fn delete(&self, file_path: &str) -> Result<()>;

    /// True when the key points at an existing file.
    async fn exists(&self, file_path: &str) -> bool;
}

pub struct LocalFileStorage {
    base_dir: PathBuf,
}

impl LocalFileStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn absolute(&self, file_path: &str) -> PathBuf {
        self.base_dir.join(file_path)
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn save(&self, content: &[u8], filename: &str, subdir: &str) -> Result<String> {
        let target_dir = if subdir.is_empty() {
            self.base_dir.clone()
        } else {
            self.base_dir.join(subdir)
        };
        tokio::fs::create_dir_all(&target_dir).await?;

        let target = target_dir.join(filename);
        tokio::fs::write(&target, content).await?;

        Ok(if subdir.is_empty() {
            filename.to_string()
        } else {
            format!("{subdir}/{filename}")
        })
    }

    async fn retrieve(&self, file_path: &str) -> Result<PathBuf> {
        let abs_path = self.absolute(file_path);
        if !tokio::fs::try_exists(&abs_path).await.unwrap_or(false) {
            bail!("File not found: {file_path}");
        }
        Ok(abs_path)
    }

    async fn delete(&self, file_path: &str) -> Result<()> {
        let abs_path = self.absolute(file_path);
        if tokio::fs::try_exists(&abs_path).await.unwrap_or(false) {
            tokio::fs::remove_file(&abs_path).await?;
        }
        Ok(())
    }

    async fn exists(&self, file_path: &str) -> bool {
        tokio::fs::try_exists(self.absolute(file_path))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_and_retrieve_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let key = storage.save(b"hello", "a.txt", "sub").await.unwrap();
        assert_eq!(key, "sub/a.txt");
        assert!(storage.exists(&key).await);

        let abs_path = storage.retrieve(&key).await.unwrap();
        let content = tokio::fs::read(&abs_path).await.unwrap();
        assert_eq!(content, b"hello");
    }

    #[tokio::test]
    async fn test_save_without_subdir_uses_bare_filename_key() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let key = storage.save(b"x", "b.txt", "").await.unwrap();
        assert_eq!(key, "b.txt");
        assert!(storage.exists(&key).await);
    }

    #[tokio::test]
    async fn test_retrieve_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());
        assert!(storage.retrieve("nope/missing.txt").await.is_err());
    }

    #[tokio::test]
    async fn test_delete_removes_file_and_is_noop_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalFileStorage::new(dir.path());

        let key = storage.save(b"bye", "c.txt", "sub").await.unwrap();
        storage.delete(&key).await.unwrap();
        assert!(!storage.exists(&key).await);

        // Deleting again is not an error.
        storage.delete(&key).await.unwrap();
    }
}
