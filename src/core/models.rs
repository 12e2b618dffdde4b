use crate::core::assets::ResolvedRule;
use crate::core::chunks::{ChunkGraph, ChunkName};
use crate::core::mode::{DevServer, DevServerSettings, Mode};
use crate::core::naming::OutputNaming;
use crate::core::pages::ProjectLayout;
use serde::Serialize;
use std::path::PathBuf;

/// Project inputs after merging the config file with CLI arguments
#[derive(Debug, Clone)]
pub struct ProjectSettings {
    pub root: PathBuf,
    pub pages: Vec<String>,
    pub layout: ProjectLayout,
    pub dependency_root: PathBuf,
    pub dev_server: DevServerSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum EntrySource {
    /// Installed package resolved by the engine
    Package(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPoint {
    pub name: ChunkName,
    pub source: EntrySource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlMinify {
    pub remove_comments: bool,
    pub collapse_whitespace: bool,
    pub remove_attribute_quotes: bool,
}

impl HtmlMinify {
    pub fn full() -> Self {
        Self {
            remove_comments: true,
            collapse_whitespace: true,
            remove_attribute_quotes: true,
        }
    }
}

/// One generated HTML page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlTarget {
    pub page: String,
    pub filename: String,
    pub template: PathBuf,
    pub favicon: PathBuf,
    /// Injected in exactly this order
    pub chunks: Vec<ChunkName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minify: Option<HtmlMinify>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum BuildStep {
    ExtractCss { filename: String, disabled: bool },
    #[serde(rename_all = "camelCase")]
    Define { key: String, value: String },
    HotModuleReplacement,
    NamedModules,
    NoEmitOnErrors,
    FriendlyErrors,
    #[serde(rename_all = "camelCase")]
    MinifyJs { compress_warnings: bool, source_map: bool },
    OptimizeCss { safe: bool },
    #[serde(rename_all = "camelCase")]
    SplitVendor { dependency_root: PathBuf, min_entries: usize },
    SplitManifest { chunks: Vec<ChunkName> },
    CopyStatic { from: PathBuf, to: PathBuf, ignore: Vec<String> },
    Html { page: String },
}

impl BuildStep {
    pub fn name(&self) -> &'static str {
        match self {
            BuildStep::ExtractCss { .. } => "extract-css",
            BuildStep::Define { .. } => "define",
            BuildStep::HotModuleReplacement => "hot-module-replacement",
            BuildStep::NamedModules => "named-modules",
            BuildStep::NoEmitOnErrors => "no-emit-on-errors",
            BuildStep::FriendlyErrors => "friendly-errors",
            BuildStep::MinifyJs { .. } => "minify-js",
            BuildStep::OptimizeCss { .. } => "optimize-css",
            BuildStep::SplitVendor { .. } => "split-vendor",
            BuildStep::SplitManifest { .. } => "split-manifest",
            BuildStep::CopyStatic { .. } => "copy-static",
            BuildStep::Html { .. } => "html",
        }
    }
}

/// Final immutable artifact consumed by the build engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildPlan {
    pub mode: Mode,
    pub entries: Vec<EntryPoint>,
    pub module_rules: Vec<ResolvedRule>,
    pub chunk_graph: ChunkGraph,
    pub html_targets: Vec<HtmlTarget>,
    pub steps: Vec<BuildStep>,
    pub output: OutputNaming,
    pub output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devtool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServer>,
}

impl BuildPlan {
    pub fn entry(&self, name: &str) -> Option<&EntryPoint> {
        self.entries.iter().find(|entry| entry.name.as_str() == name)
    }

    pub fn html_target(&self, page: &str) -> Option<&HtmlTarget> {
        self.html_targets.iter().find(|target| target.page == page)
    }

    pub fn has_step(&self, name: &str) -> bool {
        self.steps.iter().any(|step| step.name() == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// What the engine reports back after consuming a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub output_files: Vec<PathBuf>,
    pub copied_static: usize,
}
