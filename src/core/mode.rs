// Mode resolution: the external mode signal selects one of two overlays,
// or neither (base config).

use crate::utils::Logger;
use serde::Serialize;
use std::path::PathBuf;

/// Environment variable carrying the mode signal
pub const MODE_ENV_VAR: &str = "NODE_ENV";

/// Source-map style used whenever the production overlay is not applied
pub const EVAL_SOURCE_MAP: &str = "cheap-module-eval-source-map";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Dev,
    Prod,
    /// Neither overlay applied
    Base,
}

impl Mode {
    /// Only the exact tokens `dev` and `prod` select an overlay.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("dev") => Mode::Dev,
            Some("prod") => Mode::Prod,
            _ => Mode::Base,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Prod => "prod",
            Mode::Base => "base",
        }
    }

    pub fn is_prod(&self) -> bool {
        matches!(self, Mode::Prod)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forward requests under `prefix` to `target`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyRule {
    pub prefix: String,
    pub target: String,
    pub change_origin: bool,
}

/// Dev server inputs coming from project configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevServerSettings {
    pub port: u16,
    pub proxy: Vec<ProxyRule>,
}

impl Default for DevServerSettings {
    fn default() -> Self {
        Self {
            port: 9000,
            proxy: vec![ProxyRule {
                prefix: "/cloud_account".to_string(),
                target: "http://local-crash.163.com:8181".to_string(),
                change_origin: true,
            }],
        }
    }
}

/// Description of the development server handed to the serving tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServer {
    pub port: u16,
    pub hot: bool,
    pub compress: bool,
    pub content_base: PathBuf,
    pub proxy: Vec<ProxyRule>,
}

impl DevServer {
    /// First proxy rule whose prefix matches the request path
    pub fn proxy_for(&self, request_path: &str) -> Option<&ProxyRule> {
        self.proxy
            .iter()
            .find(|rule| request_path.starts_with(&rule.prefix))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitThresholds {
    /// Modules reached from at least this many entries move to `vendor`
    pub min_entries: usize,
}

impl Default for SplitThresholds {
    fn default() -> Self {
        Self { min_entries: 2 }
    }
}

/// Immutable overlay selected by the mode signal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    pub mode: Mode,
    /// Raw signal as read, injected into bundles as `process.env.NODE_ENV`
    pub signal: Option<String>,
    pub hot_reload: bool,
    pub source_maps: bool,
    pub devtool: Option<String>,
    pub content_hash: bool,
    pub minify: bool,
    pub split: Option<SplitThresholds>,
    pub dev_server: Option<DevServer>,
}

pub struct ModeResolver {
    dev_server: DevServerSettings,
    content_base: PathBuf,
}

impl Default for ModeResolver {
    fn default() -> Self {
        Self::new(DevServerSettings::default(), PathBuf::from("dist"))
    }
}

impl ModeResolver {
    pub fn new(dev_server: DevServerSettings, content_base: PathBuf) -> Self {
        Self {
            dev_server,
            content_base,
        }
    }

    /// Read the mode signal from the environment, once.
    pub fn from_env(&self) -> ModeConfig {
        let raw = std::env::var(MODE_ENV_VAR).ok();
        self.resolve(raw.as_deref())
    }

    pub fn resolve(&self, raw: Option<&str>) -> ModeConfig {
        let mode = Mode::parse(raw);
        let base = self.base(raw);

        match mode {
            Mode::Dev => ModeConfig {
                mode,
                hot_reload: true,
                dev_server: Some(DevServer {
                    port: self.dev_server.port,
                    hot: true,
                    compress: true,
                    content_base: self.content_base.clone(),
                    proxy: self.dev_server.proxy.clone(),
                }),
                ..base
            },
            Mode::Prod => ModeConfig {
                mode,
                source_maps: false,
                devtool: None,
                content_hash: true,
                minify: true,
                split: Some(SplitThresholds::default()),
                ..base
            },
            Mode::Base => {
                Logger::unmatched_mode(raw);
                base
            }
        }
    }

    fn base(&self, raw: Option<&str>) -> ModeConfig {
        ModeConfig {
            mode: Mode::Base,
            signal: raw.map(str::to_string),
            hot_reload: false,
            source_maps: true,
            devtool: Some(EVAL_SOURCE_MAP.to_string()),
            content_hash: false,
            minify: false,
            split: None,
            dev_server: None,
        }
    }
}
