use crate::domain::model::SourceEntry;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Local disk storage. Relative paths resolve against `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }
}

/// An entry whose type cannot be read is treated as not a regular file.
fn is_regular_file(file_type: std::io::Result<std::fs::FileType>, path: &Path) -> bool {
    match file_type {
        Ok(file_type) => file_type.is_file(),
        Err(e) => {
            tracing::warn!("⚠️  Cannot read file type of '{}': {}", path.display(), e);
            false
        }
    }
}

impl Storage for LocalStorage {
    async fn list_entries(&self, dir: &Path) -> Result<Vec<SourceEntry>> {
        let mut reader = tokio::fs::read_dir(self.resolve(dir)).await?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await? {
            // 保留相對路徑，日誌裡顯示的是使用者給的目錄
            let path = dir.join(entry.file_name());
            let is_file = is_regular_file(entry.file_type().await, &path);
            entries.push(SourceEntry::new(path, is_file));
        }

        Ok(entries)
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_entries_is_flat_and_flags_directories() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("ocr-input");
        std::fs::create_dir_all(input.join("nested")).unwrap();
        std::fs::write(input.join("apple.png"), b"png").unwrap();
        std::fs::write(input.join("nested").join("deep.png"), b"png").unwrap();

        let storage = LocalStorage::new(temp_dir.path());
        let mut entries = storage.list_entries(Path::new("ocr-input")).await.unwrap();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "apple.png");
        assert!(entries[0].is_file);
        assert_eq!(entries[0].path, Path::new("ocr-input").join("apple.png"));
        assert_eq!(entries[1].name, "nested");
        assert!(!entries[1].is_file);
    }

    #[tokio::test]
    async fn test_write_creates_missing_directories_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        let target = Path::new("ocr-output").join("apple.txt");

        storage.write_file(&target, b"first").await.unwrap();
        storage.write_file(&target, b"second").await.unwrap();

        assert_eq!(storage.read_file(&target).await.unwrap(), b"second");
    }

    #[test]
    fn test_unreadable_file_type_is_not_a_regular_file() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!is_regular_file(Err(err), Path::new("ocr-input/locked.png")));

        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("apple.png");
        std::fs::write(&file, b"png").unwrap();
        let file_type = std::fs::metadata(&file).map(|m| m.file_type());
        assert!(is_regular_file(file_type, &file));
    }

    #[tokio::test]
    async fn test_listing_missing_directory_fails() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        assert!(storage.list_entries(Path::new("absent")).await.is_err());
    }
}
