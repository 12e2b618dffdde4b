use crate::core::assembler::assemble;
use crate::core::assets::AssetTable;
use crate::core::chunks::ChunkPolicy;
use crate::core::interfaces::*;
use crate::core::mode::ModeConfig;
use crate::core::models::*;
use crate::core::pages::PageRegistry;
use crate::utils::{Logger, MpaError, Result, Timer};
use std::path::Path;
use std::sync::Arc;

/// Preflight → assemble → hand off to the engine
pub struct PlanService {
    fs_service: Arc<dyn FileSystemService>,
}

impl PlanService {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self { fs_service }
    }

    /// Abort before any output exists if a page's entry or template is missing.
    pub async fn preflight(&self, root: &Path, pages: &PageRegistry) -> Result<()> {
        let _timer = Timer::start("preflight");

        for page in pages.list() {
            for path in [&page.entry_path, &page.template_path] {
                if !self.fs_service.file_exists(&root.join(path)).await {
                    return Err(MpaError::missing_file(&page.id, path.clone()));
                }
            }
            Logger::debug(&format!("✓ page {}", page.id));
        }

        Ok(())
    }

    pub async fn plan(&self, settings: &ProjectSettings, mode: &ModeConfig) -> Result<BuildPlan> {
        let pages = PageRegistry::new(&settings.pages, settings.layout.clone())?;
        self.preflight(&settings.root, &pages).await?;
        assemble_plan(&pages, settings, mode)
    }

    pub async fn build(
        &self,
        settings: &ProjectSettings,
        mode: &ModeConfig,
        engine: &dyn BuildEngine,
    ) -> Result<BuildReport> {
        let plan = self.plan(settings, mode).await?;
        let _timer = Timer::start("engine");
        engine.execute(&plan, &settings.root).await
    }
}

/// Assemble without touching the filesystem
pub fn plan_for(settings: &ProjectSettings, mode: &ModeConfig) -> Result<BuildPlan> {
    let pages = PageRegistry::new(&settings.pages, settings.layout.clone())?;
    assemble_plan(&pages, settings, mode)
}

fn assemble_plan(pages: &PageRegistry, settings: &ProjectSettings, mode: &ModeConfig) -> Result<BuildPlan> {
    let _timer = Timer::start("assemble");
    Logger::plan_start(mode.mode.as_str(), pages.len());

    let assets = AssetTable::standard(mode, pages.layout())?.rooted(&settings.root);
    let chunks = ChunkPolicy::for_mode(mode, settings.dependency_root.clone());
    let plan = assemble(pages, &assets, mode, &chunks);

    Logger::plan_complete(plan.entries.len(), plan.module_rules.len(), plan.steps.len());
    Ok(plan)
}
