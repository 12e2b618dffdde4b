use crate::core::interfaces::{BuildEngine, FileSystemService};
use crate::core::models::{BuildPlan, BuildReport, BuildStep};
use crate::infrastructure::file_system::is_hidden;
use crate::utils::{Logger, Result};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

pub const PLAN_FILE_NAME: &str = "build-plan.json";

/// Hands the plan to the external bundler as `build-plan.json` and performs
/// the static-file copy step itself.
pub struct JsonPlanEngine {
    fs_service: Arc<dyn FileSystemService>,
}

impl JsonPlanEngine {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self { fs_service }
    }

    /// Byte-for-byte copy of `from` into `to`, skipping dotfiles
    async fn copy_static(&self, root: &Path, from: &Path, to: &Path) -> Result<usize> {
        let source_root = root.join(from);
        if !self.fs_service.dir_exists(&source_root).await {
            Logger::warn(&format!("Static dir {} not found, nothing to copy", source_root.display()));
            return Ok(0);
        }

        let mut copied = 0;
        for file in self.fs_service.list_files(&source_root).await? {
            if is_hidden(&file, &source_root) {
                continue;
            }
            let relative = file.strip_prefix(&source_root).unwrap_or(&file);
            self.fs_service.copy_file(&file, &root.join(to).join(relative)).await?;
            copied += 1;
        }

        Logger::debug(&format!("📁 Copied {} static files", copied));
        Ok(copied)
    }
}

#[async_trait]
impl BuildEngine for JsonPlanEngine {
    async fn execute(&self, plan: &BuildPlan, root: &Path) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        for step in &plan.steps {
            if let BuildStep::CopyStatic { from, to, .. } = step {
                report.copied_static += self.copy_static(root, from, to).await?;
            }
        }

        let plan_path = root.join(&plan.output_dir).join(PLAN_FILE_NAME);
        self.fs_service
            .write_file(&plan_path, plan.to_json()?.as_bytes())
            .await?;
        report.output_files.push(plan_path);

        Ok(report)
    }
}
