use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Filesystem layout for the service.
///
/// Everything lives under a single data directory:
/// - `documents/` keeps the raw uploaded files
/// - `logs/` keeps the rolling server logs
/// - `docqa_index.db` is the SQLite document bookkeeping index
/// - `docqa_vectors.db` is the SQLite vector store
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub data_dir: PathBuf,
    pub documents_dir: PathBuf,
    pub log_dir: PathBuf,
    pub index_db_path: PathBuf,
    pub vector_db_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        Self::at(&discover_data_dir())
    }

    /// Build the layout rooted at an explicit directory. Used by tests
    /// to keep everything inside a scratch dir.
    pub fn at(data_dir: &Path) -> Self {
        let documents_dir = data_dir.join("documents");
        let log_dir = data_dir.join("logs");
        let index_db_path = data_dir.join("docqa_index.db");
        let vector_db_path = data_dir.join("docqa_vectors.db");

        for dir in [data_dir, &documents_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            data_dir: data_dir.to_path_buf(),
            documents_dir,
            log_dir,
            index_db_path,
            vector_db_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_data_dir() -> PathBuf {
    if let Ok(dir) = env::var("DOCQA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_layout_under_root() {
        let tmp = tempfile::tempdir().unwrap();
        let paths = AppPaths::at(tmp.path());

        assert!(paths.documents_dir.is_dir());
        assert!(paths.log_dir.is_dir());
        assert_eq!(paths.index_db_path.parent().unwrap(), tmp.path());
    }
}
