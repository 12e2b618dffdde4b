// Stage chain execution: output of stage n feeds stage n+1

use crate::core::assets::{AssetTable, ProcessingStage};
use crate::core::interfaces::{AssetSource, StageExecutor};
use crate::utils::{Logger, MpaError, Result};
use std::sync::Arc;

/// Executors tried in order; the first that supports a stage runs it
#[derive(Clone, Default)]
pub struct StageRegistry {
    executors: Vec<Arc<dyn StageExecutor>>,
}

impl StageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, executor: Arc<dyn StageExecutor>) -> Self {
        self.executors.push(executor);
        self
    }

    fn find(&self, stage: &ProcessingStage) -> Option<&Arc<dyn StageExecutor>> {
        self.executors.iter().find(|executor| executor.supports(stage))
    }
}

/// Run `stages` left to right. The first failure aborts the chain; there is no retry.
pub async fn run_chain(
    registry: &StageRegistry,
    stages: &[ProcessingStage],
    source: AssetSource,
) -> Result<AssetSource> {
    let mut current = source;

    for stage in stages {
        let executor = registry.find(stage).ok_or_else(|| MpaError::AssetProcessing {
            stage: stage.name().to_string(),
            file: current.path.clone(),
            message: "no executor registered for this stage".to_string(),
        })?;

        Logger::debug(&format!("⚡ {} → {}", stage.name(), current.path.display()));
        let file = current.path.clone();

        current = executor
            .execute(stage, current)
            .await
            .map_err(|err| stage_failure(stage, file, err))?;
    }

    Ok(current)
}

/// Resolve `source` against the table and run its chain; unmatched files pass through.
pub async fn process_file(
    table: &AssetTable,
    registry: &StageRegistry,
    source: AssetSource,
) -> Result<AssetSource> {
    let stages = table.resolve(&source.path).stages();
    if stages.is_empty() {
        return Ok(source);
    }
    run_chain(registry, &stages, source).await
}

fn stage_failure(stage: &ProcessingStage, file: std::path::PathBuf, err: anyhow::Error) -> MpaError {
    if stage.is_lint() {
        MpaError::LintViolation {
            file,
            diagnostics: err.chain().map(|cause| cause.to_string()).collect(),
        }
    } else {
        MpaError::AssetProcessing {
            stage: stage.name().to_string(),
            file,
            message: format!("{:#}", err),
        }
    }
}
