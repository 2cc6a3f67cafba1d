use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::uploads::category::Category;

/// Filesystem layout for uploads: `<root>/<category dir>/<stored name>`.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.descriptor().directory)
    }

    /// Creates the root and every category directory. Safe to call repeatedly.
    pub async fn ensure_layout(&self) -> io::Result<()> {
        for category in Category::ALL {
            let dir = self.category_dir(category);
            fs::create_dir_all(&dir).await?;
            debug!(dir = %dir.display(), "Upload directory ready");
        }
        Ok(())
    }

    /// Opens a hidden staging file next to the final destination.
    ///
    /// `stored_name` must already be a sanitized basename.
    pub async fn stage(&self, category: Category, stored_name: &str) -> io::Result<StagedFile> {
        let dir = self.category_dir(category);
        fs::create_dir_all(&dir).await?;

        let staging_path = dir.join(format!(".{}.part", Uuid::new_v4()));
        let final_path = dir.join(stored_name);
        let file = File::create(&staging_path).await?;

        Ok(StagedFile {
            file: Some(file),
            staging_path,
            final_path,
            bytes_written: 0,
            committed: false,
        })
    }
}

/// An in-progress upload. Bytes land in the staging file until `commit`
/// renames it into place; dropping it uncommitted removes the staging file.
#[derive(Debug)]
pub struct StagedFile {
    file: Option<File>,
    staging_path: PathBuf,
    final_path: PathBuf,
    bytes_written: u64,
    committed: bool,
}

impl StagedFile {
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "staging file already closed"))?;
        file.write_all(chunk).await?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flushes and atomically moves the staged bytes onto the final path.
    pub async fn commit(mut self) -> io::Result<PathBuf> {
        if let Some(mut file) = self.file.take() {
            file.flush().await?;
        }
        fs::rename(&self.staging_path, &self.final_path).await?;
        self.committed = true;

        info!(
            path = %self.final_path.display(),
            bytes = self.bytes_written,
            "Upload stored"
        );
        Ok(self.final_path.clone())
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        // Close the handle before unlinking.
        self.file.take();
        if let Err(e) = std::fs::remove_file(&self.staging_path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(
                    path = %self.staging_path.display(),
                    "Failed to remove staging file: {e}"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn list(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_ensure_layout_creates_category_dirs() {
        let tmp = TempDir::new().unwrap();
        let store = UploadStore::new(tmp.path().join("uploads"));

        store.ensure_layout().await.unwrap();

        assert!(tmp.path().join("uploads/resumes").is_dir());
        assert!(tmp.path().join("uploads/videos").is_dir());
    }

    #[tokio::test]
    async fn test_ensure_layout_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = UploadStore::new(tmp.path());
        std::fs::create_dir_all(tmp.path().join("resumes")).unwrap();
        std::fs::write(tmp.path().join("resumes/keep.pdf"), b"x").unwrap();

        store.ensure_layout().await.unwrap();
        store.ensure_layout().await.unwrap();

        assert_eq!(list(&tmp.path().join("resumes")), vec!["keep.pdf"]);
    }

    #[tokio::test]
    async fn test_commit_writes_bytes_verbatim() {
        let tmp = TempDir::new().unwrap();
        let store = UploadStore::new(tmp.path());

        let mut staged = store.stage(Category::Video, "clip.mp4").await.unwrap();
        staged.write_chunk(b"\x00\x00\x00\x18ftyp").await.unwrap();
        staged.write_chunk(b"mp42").await.unwrap();
        assert_eq!(staged.bytes_written(), 12);
        let path = staged.commit().await.unwrap();

        assert_eq!(path, tmp.path().join("videos/clip.mp4"));
        assert_eq!(std::fs::read(&path).unwrap(), b"\x00\x00\x00\x18ftypmp42");
        assert_eq!(list(&tmp.path().join("videos")), vec!["clip.mp4"]);
    }

    #[tokio::test]
    async fn test_stage_creates_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let store = UploadStore::new(tmp.path().join("fresh"));

        let staged = store.stage(Category::Resume, "cv.pdf").await.unwrap();
        staged.commit().await.unwrap();

        assert!(tmp.path().join("fresh/resumes/cv.pdf").is_file());
    }

    #[tokio::test]
    async fn test_dropped_stage_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let store = UploadStore::new(tmp.path());

        let mut staged = store.stage(Category::Resume, "cv.pdf").await.unwrap();
        staged.write_chunk(b"%PDF-1.4 partial").await.unwrap();
        drop(staged);

        assert!(list(&tmp.path().join("resumes")).is_empty());
    }

    #[tokio::test]
    async fn test_commit_overwrites_same_name() {
        let tmp = TempDir::new().unwrap();
        let store = UploadStore::new(tmp.path());

        for body in [&b"first"[..], &b"second"[..]] {
            let mut staged = store.stage(Category::Resume, "cv.pdf").await.unwrap();
            staged.write_chunk(body).await.unwrap();
            staged.commit().await.unwrap();
        }

        let path = tmp.path().join("resumes/cv.pdf");
        assert_eq!(std::fs::read(path).unwrap(), b"second");
    }
}
