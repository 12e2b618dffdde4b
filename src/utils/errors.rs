use std::path::PathBuf;
use thiserror::Error;

/// File and stage context attached to a failure
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    pub file_path: Option<PathBuf>,
    pub stage: Option<String>,
    pub diagnostics: Vec<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_diagnostics(mut self, diagnostics: Vec<String>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

#[derive(Error, Debug)]
pub enum MpaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A declared page is missing its entry script or template
    #[error("Configuration error: page '{page}' is missing {}", path.display())]
    Configuration { page: String, path: PathBuf },

    #[error("Lint violation in {}", file.display())]
    LintViolation {
        file: PathBuf,
        diagnostics: Vec<String>,
    },

    #[error("Asset processing error in stage '{stage}' for {}: {message}", file.display())]
    AssetProcessing {
        stage: String,
        file: PathBuf,
        message: String,
    },

    /// Invalid project settings (config file, page list, rule table)
    #[error("Invalid config: {0}")]
    Config(String),
}

impl MpaError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn missing_file(page: &str, path: PathBuf) -> Self {
        Self::Configuration {
            page: page.to_string(),
            path,
        }
    }

    /// Context view used by `format_detailed`
    pub fn context(&self) -> Option<ErrorContext> {
        match self {
            MpaError::Configuration { path, .. } => {
                Some(ErrorContext::new().with_file(path.clone()).with_stage("preflight"))
            }
            MpaError::LintViolation { file, diagnostics } => Some(
                ErrorContext::new()
                    .with_file(file.clone())
                    .with_stage("lint")
                    .with_diagnostics(diagnostics.clone()),
            ),
            MpaError::AssetProcessing { stage, file, .. } => {
                Some(ErrorContext::new().with_file(file.clone()).with_stage(stage.clone()))
            }
            _ => None,
        }
    }

    /// Format error with stage and file for terminal output
    pub fn format_detailed(&self) -> String {
        let mut output = format!("❌ {}", self);

        if let Some(ctx) = self.context() {
            if let Some(ref stage) = ctx.stage {
                output.push_str(&format!("\n🔧 Stage: {}", stage));
            }
            if let Some(ref file_path) = ctx.file_path {
                output.push_str(&format!("\n📁 File: {}", file_path.display()));
            }
            for diagnostic in &ctx.diagnostics {
                output.push_str(&format!("\n  → {}", diagnostic));
            }
        }

        output
    }
}

pub type Result<T> = std::result::Result<T, MpaError>;

impl From<regex::Error> for MpaError {
    fn from(err: regex::Error) -> Self {
        MpaError::config(format!("invalid asset pattern: {}", err))
    }
}
