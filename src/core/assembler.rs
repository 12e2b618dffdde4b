// Build plan assembly: a pure function of pages, asset table, mode and chunk policy

use crate::core::assets::AssetTable;
use crate::core::chunks::{ChunkName, ChunkPolicy, POLYFILL_ENTRY};
use crate::core::mode::{Mode, ModeConfig};
use crate::core::models::*;
use crate::core::naming::OutputNaming;
use crate::core::pages::PageRegistry;

pub fn assemble(
    pages: &PageRegistry,
    assets: &AssetTable,
    mode: &ModeConfig,
    chunks: &ChunkPolicy,
) -> BuildPlan {
    let output = OutputNaming::for_mode(mode);

    BuildPlan {
        mode: mode.mode,
        entries: entries(pages),
        module_rules: assets.resolved_rules(),
        chunk_graph: chunks.chunk_graph(pages),
        html_targets: html_targets(pages, mode),
        steps: steps(pages, mode, chunks, &output),
        output,
        output_dir: pages.layout().out_dir.clone(),
        devtool: mode.devtool.clone(),
        dev_server: mode.dev_server.clone(),
    }
}

/// Polyfill first, then pages in declaration order
fn entries(pages: &PageRegistry) -> Vec<EntryPoint> {
    let polyfill = EntryPoint {
        name: ChunkName::Polyfill,
        source: EntrySource::Package(POLYFILL_ENTRY.to_string()),
    };

    std::iter::once(polyfill)
        .chain(pages.list().iter().map(|page| EntryPoint {
            name: ChunkName::Page(page.id.clone()),
            source: EntrySource::File(page.entry_path.clone()),
        }))
        .collect()
}

/// Same targets in every mode; only minification differs
fn html_targets(pages: &PageRegistry, mode: &ModeConfig) -> Vec<HtmlTarget> {
    let favicon = pages.layout().favicon();
    let minify = mode.minify.then(HtmlMinify::full);

    pages
        .list()
        .iter()
        .map(|page| HtmlTarget {
            page: page.id.clone(),
            filename: format!("{}.html", page.id),
            template: page.template_path.clone(),
            favicon: favicon.clone(),
            chunks: ChunkName::load_order(&page.id),
            minify,
        })
        .collect()
}

fn steps(
    pages: &PageRegistry,
    mode: &ModeConfig,
    chunks: &ChunkPolicy,
    output: &OutputNaming,
) -> Vec<BuildStep> {
    let mut steps = vec![
        BuildStep::ExtractCss {
            filename: output
                .css_filename
                .clone()
                .unwrap_or_else(|| "css/[name].[contenthash].css".to_string()),
            disabled: output.css_filename.is_none(),
        },
        BuildStep::Define {
            key: "process.env.NODE_ENV".to_string(),
            value: define_value(mode.signal.as_deref()),
        },
    ];

    match mode.mode {
        Mode::Dev => steps.extend([
            BuildStep::HotModuleReplacement,
            BuildStep::NamedModules,
            BuildStep::NoEmitOnErrors,
            BuildStep::FriendlyErrors,
        ]),
        Mode::Prod => {
            let layout = pages.layout();
            steps.extend([
                BuildStep::MinifyJs {
                    compress_warnings: false,
                    source_map: false,
                },
                BuildStep::OptimizeCss { safe: true },
            ]);
            if let Some(split) = mode.split {
                steps.extend([
                    BuildStep::SplitVendor {
                        dependency_root: chunks.dependency_root().to_path_buf(),
                        min_entries: split.min_entries,
                    },
                    BuildStep::SplitManifest {
                        chunks: vec![ChunkName::Vendor],
                    },
                ]);
            }
            steps.push(BuildStep::CopyStatic {
                from: layout.static_dir.clone(),
                to: layout.out_dir.join(&layout.static_dir),
                ignore: vec![".*".to_string()],
            });
        }
        Mode::Base => {}
    }

    steps.extend(pages.list().iter().map(|page| BuildStep::Html {
        page: page.id.clone(),
    }));

    steps
}

/// JSON literal substituted for `process.env.NODE_ENV`
fn define_value(signal: Option<&str>) -> String {
    match signal {
        Some(raw) => serde_json::Value::String(raw.to_string()).to_string(),
        None => "undefined".to_string(),
    }
}
