use crate::core::models::ProjectSettings;
use crate::core::{DevServerSettings, ProjectLayout, ProxyRule};
use crate::utils::{Logger, MpaError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "mpa.config.json";

/// Configuration file format (mpa.config.json)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MpaConfig {
    /// Declared page ids, in load order (default: pageA, pageB, pageC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<String>>,

    /// Source root holding one folder per page (default: "src")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_dir: Option<String>,

    /// Entry script extension (default: "js")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub script_ext: Option<String>,

    /// Static files copied verbatim in production (default: "static")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,

    /// Output directory (default: "dist")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,

    /// Installed third-party packages (default: "node_modules")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependency_root: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServerFileConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServerFileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<Vec<ProxyEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEntry {
    pub prefix: String,
    pub target: String,
    #[serde(default = "default_true")]
    pub change_origin: bool,
}

fn default_true() -> bool {
    true
}

/// Config loader that supports config files with CLI override
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from `mpa.config.json` in the project root, if present
    pub fn load_from_file(root: &Path) -> Result<Option<MpaConfig>> {
        let config_path = root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            Logger::debug("No mpa.config.json found, using defaults");
            return Ok(None);
        }

        Logger::debug(&format!("Loading config from {}", config_path.display()));

        let content = std::fs::read_to_string(&config_path)?;

        let config: MpaConfig = serde_json::from_str(&content).map_err(|e| {
            MpaError::config(format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e))
        })?;

        Ok(Some(config))
    }

    /// Merge file config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(
        file_config: Option<MpaConfig>,
        root: PathBuf,
        pages: Option<Vec<String>>,
        out_dir: Option<&str>,
        port: Option<u16>,
    ) -> ProjectSettings {
        let base = file_config.unwrap_or_default();
        let default_layout = ProjectLayout::default();
        let default_dev = DevServerSettings::default();

        let pages = pages
            .or(base.pages)
            .unwrap_or_else(|| vec!["pageA".to_string(), "pageB".to_string(), "pageC".to_string()]);

        let layout = ProjectLayout {
            src_dir: base.src_dir.map(PathBuf::from).unwrap_or(default_layout.src_dir),
            script_ext: base.script_ext.unwrap_or(default_layout.script_ext),
            static_dir: base.static_dir.map(PathBuf::from).unwrap_or(default_layout.static_dir),
            out_dir: out_dir
                .map(PathBuf::from)
                .or_else(|| base.out_dir.map(PathBuf::from))
                .unwrap_or(default_layout.out_dir),
        };

        let file_dev = base.dev_server.unwrap_or_default();
        let dev_server = DevServerSettings {
            port: port.or(file_dev.port).unwrap_or(default_dev.port),
            proxy: file_dev
                .proxy
                .map(|entries| {
                    entries
                        .into_iter()
                        .map(|entry| ProxyRule {
                            prefix: entry.prefix,
                            target: entry.target,
                            change_origin: entry.change_origin,
                        })
                        .collect()
                })
                .unwrap_or(default_dev.proxy),
        };

        ProjectSettings {
            root,
            pages,
            layout,
            dependency_root: base
                .dependency_root
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("node_modules")),
            dev_server,
        }
    }

    /// Generate an example config file mirroring the defaults
    pub fn generate_example() -> String {
        let example = MpaConfig {
            pages: Some(vec!["pageA".to_string(), "pageB".to_string(), "pageC".to_string()]),
            src_dir: Some("src".to_string()),
            script_ext: Some("js".to_string()),
            static_dir: Some("static".to_string()),
            out_dir: Some("dist".to_string()),
            dependency_root: Some("node_modules".to_string()),
            dev_server: Some(DevServerFileConfig {
                port: Some(9000),
                proxy: Some(vec![ProxyEntry {
                    prefix: "/cloud_account".to_string(),
                    target: "http://local-crash.163.com:8181".to_string(),
                    change_origin: true,
                }]),
            }),
        };
        serde_json::to_string_pretty(&example).unwrap_or_else(|_| "{}".to_string())
    }
}
