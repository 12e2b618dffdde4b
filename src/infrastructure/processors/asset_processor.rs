use crate::core::assets::{ProcessingStage, StageKind, INLINE_LIMIT_BYTES};
use crate::core::interfaces::{AssetSource, StageExecutor};
use crate::core::naming::render_asset;
use crate::utils::Logger;
use async_trait::async_trait;
use base64::Engine;
use std::path::Path;

/// Outcome of the size-threshold stage for one binary file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetDisposition {
    /// Embedded as a data URI
    Inline { data_uri: String },
    /// Written as a standalone hashed file
    Emit { file_name: String },
}

impl AssetDisposition {
    pub fn url(&self) -> &str {
        match self {
            AssetDisposition::Inline { data_uri } => data_uri,
            AssetDisposition::Emit { file_name } => file_name,
        }
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, AssetDisposition::Inline { .. })
    }
}

/// Executes `url` stages: inline small images, media and fonts, emit the rest
pub struct AssetProcessor {
    limit: u64,
}

impl AssetProcessor {
    pub fn new() -> Self {
        Self {
            limit: INLINE_LIMIT_BYTES,
        }
    }

    /// Strictly below the limit inlines; at or above it emits.
    pub fn is_inline_size(size: u64, limit: u64) -> bool {
        size < limit
    }

    /// Apply the `limit`/`name` options carried by a `url` stage
    pub fn dispose(&self, stage: &ProcessingStage, path: &Path, content: &[u8]) -> AssetDisposition {
        let limit = stage.option_u64("limit").unwrap_or(self.limit);
        if Self::is_inline_size(content.len() as u64, limit) {
            return AssetDisposition::Inline {
                data_uri: data_uri(path, content),
            };
        }

        let template = stage
            .option_str("name")
            .unwrap_or("static/[name].[hash:7].[ext]");
        AssetDisposition::Emit {
            file_name: render_asset(template, path, content),
        }
    }
}

impl Default for AssetProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StageExecutor for AssetProcessor {
    fn supports(&self, stage: &ProcessingStage) -> bool {
        stage.kind == StageKind::Url
    }

    async fn execute(&self, stage: &ProcessingStage, input: AssetSource) -> anyhow::Result<AssetSource> {
        let disposition = self.dispose(stage, &input.path, &input.content);
        Logger::debug(&format!(
            "📦 {} {}",
            if disposition.is_inline() { "inline" } else { "emit" },
            input.path.display()
        ));

        let module = format!("module.exports = {};\n", serde_json::to_string(disposition.url())?);
        Ok(AssetSource::new(input.path, module.into_bytes()))
    }
}

fn extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    Some(ext.split('?').next().unwrap_or(ext).to_lowercase())
}

fn mime_type(path: &Path) -> &'static str {
    match extension(path).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogg") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("aac") => "audio/aac",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("eot") => "application/vnd.ms-fontobject",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        _ => "application/octet-stream",
    }
}

fn data_uri(path: &Path, content: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type(path),
        base64::engine::general_purpose::STANDARD.encode(content)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::assets::AssetTable;
    use crate::core::mode::ModeResolver;
    use crate::core::pages::ProjectLayout;
    use regex::Regex;
    use serde_json::json;

    /// The `url` stage the standard table attaches to `path`
    fn url_stage(path: &str) -> ProcessingStage {
        let mode = ModeResolver::default().resolve(Some("prod"));
        let table = AssetTable::standard(&mode, &ProjectLayout::default()).unwrap();
        let stages = table.resolve(Path::new(path)).stages();
        assert_eq!(stages.len(), 1, "{}", path);
        stages[0].clone()
    }

    async fn run(stage: &ProcessingStage, path: &str, size: usize) -> String {
        let output = AssetProcessor::new()
            .execute(stage, AssetSource::new(path, vec![7u8; size]))
            .await
            .unwrap();
        String::from_utf8(output.content).unwrap()
    }

    #[test]
    fn test_inline_boundary() {
        assert!(AssetProcessor::is_inline_size(0, INLINE_LIMIT_BYTES));
        assert!(AssetProcessor::is_inline_size(9_999, INLINE_LIMIT_BYTES));
        assert!(!AssetProcessor::is_inline_size(10_000, INLINE_LIMIT_BYTES));
        assert!(!AssetProcessor::is_inline_size(10_001, INLINE_LIMIT_BYTES));
    }

    #[tokio::test]
    async fn test_standard_url_stage_at_exact_threshold() {
        let stage = url_stage("src/img/logo.png");

        let below = run(&stage, "src/img/logo.png", 9_999).await;
        assert!(below.starts_with("module.exports = \"data:image/png;base64,"), "{}", below);

        let at = run(&stage, "src/img/logo.png", 10_000).await;
        let re = Regex::new(r#"^module\.exports = "static/img/logo\.[0-9a-f]{7}\.png";\n$"#).unwrap();
        assert!(re.is_match(&at), "{}", at);
    }

    #[test]
    fn test_category_folders() {
        let processor = AssetProcessor::new();
        let big = vec![1u8; 20_000];

        let path = Path::new("src/media/intro.mp4");
        let media = processor.dispose(&url_stage("src/media/intro.mp4"), path, &big);
        assert!(!media.is_inline());
        assert!(media.url().starts_with("static/media/intro."));

        let path = Path::new("src/fonts/icons.woff2");
        let font = processor.dispose(&url_stage("src/fonts/icons.woff2"), path, &big);
        assert!(font.url().starts_with("static/fonts/icons."));
        assert!(font.url().ends_with(".woff2"));
    }

    #[tokio::test]
    async fn test_stage_options_override_defaults() {
        let stage = ProcessingStage::new(StageKind::Url)
            .with_option("limit", json!(4))
            .with_option("name", json!("static/img/[name].[hash:7].[ext]"));

        let small = run(&stage, "a.gif", 3).await;
        assert!(small.starts_with("module.exports = \"data:image/gif;base64,"));

        let large = run(&stage, "b.gif", 4).await;
        assert!(large.starts_with("module.exports = \"static/img/b."));
    }

    #[test]
    fn test_supports_only_url() {
        let processor = AssetProcessor::new();
        assert!(processor.supports(&ProcessingStage::new(StageKind::Url)));
        assert!(!processor.supports(&ProcessingStage::new(StageKind::Sass)));
    }
}
