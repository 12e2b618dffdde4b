use crate::core::interfaces::FileSystemService;
use crate::utils::{MpaError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct TokioFileSystemService;

#[async_trait::async_trait]
impl FileSystemService for TokioFileSystemService {
    async fn file_exists(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }

    async fn dir_exists(&self, path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).await.map_err(MpaError::Io)
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(MpaError::Io)?;
        }

        fs::write(path, content).await.map_err(MpaError::Io)
    }

    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut pending = vec![dir.to_path_buf()];

        while let Some(current) = pending.pop() {
            let mut entries = fs::read_dir(&current).await.map_err(MpaError::Io)?;

            while let Some(entry) = entries.next_entry().await.map_err(MpaError::Io)? {
                let file_type = entry.file_type().await.map_err(MpaError::Io)?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    files.push(entry.path());
                }
            }
        }

        files.sort();
        Ok(files)
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent).await.map_err(MpaError::Io)?;
        }

        fs::copy(from, to).await.map(|_| ()).map_err(MpaError::Io)
    }
}

/// True when any component below `base` starts with a dot
pub fn is_hidden(path: &Path, base: &Path) -> bool {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_operations() {
        let fs_service = TokioFileSystemService;
        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("nested/test.txt");

        fs_service.write_file(&test_file, b"Hello, pages!").await.unwrap();

        assert!(fs_service.file_exists(&test_file).await);
        assert!(!fs_service.file_exists(temp_dir.path()).await);
        assert!(fs_service.dir_exists(&temp_dir.path().join("nested")).await);
        assert!(!fs_service.dir_exists(&test_file).await);
        assert_eq!(fs_service.read_bytes(&test_file).await.unwrap(), b"Hello, pages!");
    }

    #[tokio::test]
    async fn test_list_files_recursive() {
        let fs_service = TokioFileSystemService;
        let temp_dir = tempdir().unwrap();

        fs_service.write_file(&temp_dir.path().join("a.txt"), b"a").await.unwrap();
        fs_service.write_file(&temp_dir.path().join("img/b.png"), b"b").await.unwrap();
        fs_service.write_file(&temp_dir.path().join(".git/c"), b"c").await.unwrap();

        let files = fs_service.list_files(temp_dir.path()).await.unwrap();
        assert_eq!(files.len(), 3);
    }

    #[tokio::test]
    async fn test_copy_creates_parents() {
        let fs_service = TokioFileSystemService;
        let temp_dir = tempdir().unwrap();
        let from = temp_dir.path().join("favicon.ico");
        let to = temp_dir.path().join("dist/static/favicon.ico");

        fs_service.write_file(&from, &[0, 1, 2, 255]).await.unwrap();
        fs_service.copy_file(&from, &to).await.unwrap();

        assert_eq!(std::fs::read(&to).unwrap(), vec![0, 1, 2, 255]);
    }

    #[test]
    fn test_is_hidden() {
        let base = Path::new("/project/static");
        assert!(is_hidden(Path::new("/project/static/.DS_Store"), base));
        assert!(is_hidden(Path::new("/project/static/.cache/x.png"), base));
        assert!(!is_hidden(Path::new("/project/static/img/logo.png"), base));
    }
}
