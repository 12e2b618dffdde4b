// Output filename templates and their rendering

use crate::core::mode::ModeConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// Length of `[contenthash]` in hex characters
pub const CONTENT_HASH_LEN: usize = 20;

static HASH_TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(?:content)?hash(?::(\d+))?\]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputNaming {
    pub filename: String,
    pub chunk_filename: String,
    /// `None` when styles are injected inline instead of extracted
    pub css_filename: Option<String>,
}

impl OutputNaming {
    pub fn for_mode(mode: &ModeConfig) -> Self {
        if mode.content_hash {
            Self {
                filename: "js/[name].[contenthash].js".to_string(),
                chunk_filename: "js/[id].[contenthash].chunk.js".to_string(),
                css_filename: Some("css/[name].[contenthash].css".to_string()),
            }
        } else {
            Self {
                filename: "js/[name].js".to_string(),
                chunk_filename: "js/[id].chunk.js".to_string(),
                css_filename: None,
            }
        }
    }

    pub fn is_hashed(&self) -> bool {
        HASH_TOKEN_REGEX.is_match(&self.filename)
    }

    /// Output path of the entry chunk `name` given its emitted content
    pub fn entry_file(&self, name: &str, content: &[u8]) -> String {
        render(&self.filename, name, name, content)
    }
}

/// Hex digest of `content`, truncated to `len` characters
pub fn content_hash(content: &[u8], len: usize) -> String {
    let hex = blake3::hash(content).to_hex();
    hex.as_str()[..len.min(hex.len())].to_string()
}

/// Substitute `[name]`, `[id]`, `[contenthash]`, `[hash]` and `[hash:N]`
pub fn render(template: &str, name: &str, id: &str, content: &[u8]) -> String {
    let named = template.replace("[name]", name).replace("[id]", id);
    HASH_TOKEN_REGEX
        .replace_all(&named, |caps: &regex::Captures| {
            let len = caps
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(CONTENT_HASH_LEN);
            content_hash(content, len)
        })
        .into_owned()
}

/// Render an asset template such as `static/img/[name].[hash:7].[ext]` for a source file
pub fn render_asset(template: &str, source: &Path, content: &[u8]) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("asset");
    let ext = source
        .extension()
        .and_then(|s| s.to_str())
        .map(|ext| ext.split('?').next().unwrap_or(ext))
        .unwrap_or("");
    render(&template.replace("[ext]", ext), stem, stem, content)
}
