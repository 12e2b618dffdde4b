use crate::core::assets::ProcessingStage;
use crate::core::models::*;
use crate::utils::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// A source file flowing through a stage chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSource {
    pub path: PathBuf,
    pub content: Vec<u8>,
}

impl AssetSource {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// File system operations interface
#[async_trait]
pub trait FileSystemService: Send + Sync {
    async fn file_exists(&self, path: &Path) -> bool;
    async fn dir_exists(&self, path: &Path) -> bool;
    async fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;
    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<()>;
    /// Every regular file under `dir`, recursively, sorted
    async fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;
    async fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;
}

/// Runs one processing stage (linter, transpiler, style compiler...).
///
/// Implementations must not share mutable state between calls: the engine
/// may run chains for independent files concurrently.
#[async_trait]
pub trait StageExecutor: Send + Sync {
    fn supports(&self, stage: &ProcessingStage) -> bool;
    async fn execute(&self, stage: &ProcessingStage, input: AssetSource) -> anyhow::Result<AssetSource>;
}

/// Downstream consumer of a finished plan
#[async_trait]
pub trait BuildEngine: Send + Sync {
    async fn execute(&self, plan: &BuildPlan, root: &Path) -> Result<BuildReport>;
}
