use crate::core::{plan_for, BuildPlan, ModeConfig, ModeResolver, PageRegistry, PlanService, ProjectSettings};
use crate::infrastructure::{JsonPlanEngine, TokioFileSystemService};
use crate::utils::{ConfigLoader, Logger, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mpa")]
#[command(about = "Build plan generator for multi-page web applications")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct ProjectArgs {
    /// Project root directory
    #[arg(short, long, default_value = ".")]
    pub root: String,
    /// Override the mode signal (otherwise read from NODE_ENV)
    #[arg(short, long)]
    pub mode: Option<String>,
    /// Override the declared page list
    #[arg(long, value_delimiter = ',')]
    pub pages: Option<Vec<String>>,
    /// Output directory
    #[arg(short, long)]
    pub out_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the build plan as JSON
    Plan {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Verify that every page has its entry script and template
    Check {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Write the plan for the build engine and copy static files
    Build {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Describe the development server
    Dev {
        #[command(flatten)]
        project: ProjectArgs,
        /// Port to serve on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print an example mpa.config.json
    Init,
    /// Show planner information
    Info,
}

pub struct CliHandler;

impl CliHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn run(&self) -> Result<()> {
        Logger::init();

        let cli = Cli::parse();

        match cli.command {
            Commands::Plan { project } => self.handle_plan_command(&project).await,
            Commands::Check { project } => self.handle_check_command(&project).await,
            Commands::Build { project } => self.handle_build_command(&project).await,
            Commands::Dev { project, port } => self.handle_dev_command(&project, port).await,
            Commands::Init => {
                println!("{}", ConfigLoader::generate_example());
                Ok(())
            }
            Commands::Info => self.handle_info_command(),
        }
    }

    fn load_settings(&self, project: &ProjectArgs, port: Option<u16>) -> Result<ProjectSettings> {
        let root = PathBuf::from(&project.root);
        let file_config = ConfigLoader::load_from_file(&root)?;
        Ok(ConfigLoader::merge_with_cli(
            file_config,
            root,
            project.pages.clone(),
            project.out_dir.as_deref(),
            port,
        ))
    }

    fn resolve_mode(&self, settings: &ProjectSettings, raw: Option<&str>) -> ModeConfig {
        let resolver = ModeResolver::new(settings.dev_server.clone(), settings.layout.out_dir.clone());
        match raw {
            Some(raw) => resolver.resolve(Some(raw)),
            None => resolver.from_env(),
        }
    }

    async fn handle_plan_command(&self, project: &ProjectArgs) -> Result<()> {
        let settings = self.load_settings(project, None)?;
        let mode = self.resolve_mode(&settings, project.mode.as_deref());
        let plan = plan_for(&settings, &mode)?;
        println!("{}", plan.to_json()?);
        Ok(())
    }

    async fn handle_check_command(&self, project: &ProjectArgs) -> Result<()> {
        let settings = self.load_settings(project, None)?;
        let pages = PageRegistry::new(&settings.pages, settings.layout.clone())?;
        let service = PlanService::new(Arc::new(TokioFileSystemService));

        service.preflight(&settings.root, &pages).await?;
        Logger::info(&format!("✅ {} pages ready", pages.len()));
        Ok(())
    }

    async fn handle_build_command(&self, project: &ProjectArgs) -> Result<()> {
        let settings = self.load_settings(project, None)?;
        let mode = self.resolve_mode(&settings, project.mode.as_deref());

        let fs_service = Arc::new(TokioFileSystemService);
        let service = PlanService::new(fs_service.clone());
        let engine = JsonPlanEngine::new(fs_service);

        let report = service.build(&settings, &mode, &engine).await?;

        for file in &report.output_files {
            Logger::info(&format!("📝 {}", file.display()));
        }
        if report.copied_static > 0 {
            Logger::info(&format!("📁 {} static files copied", report.copied_static));
        }
        Ok(())
    }

    async fn handle_dev_command(&self, project: &ProjectArgs, port: Option<u16>) -> Result<()> {
        let settings = self.load_settings(project, port)?;
        let mode = self.resolve_mode(&settings, Some(project.mode.as_deref().unwrap_or("dev")));

        let service = PlanService::new(Arc::new(TokioFileSystemService));
        let plan = service.plan(&settings, &mode).await?;
        self.print_dev_server(&plan);
        Ok(())
    }

    fn print_dev_server(&self, plan: &BuildPlan) {
        let Some(server) = &plan.dev_server else {
            Logger::warn(&format!("Mode '{}' has no dev server", plan.mode));
            return;
        };

        tracing::info!("🚀 Development server");
        tracing::info!("═══════════════════════════════════════");
        tracing::info!("🌐 Local:   http://localhost:{}", server.port);
        tracing::info!("🔥 HMR: {}", if server.hot { "on" } else { "off" });
        for rule in &server.proxy {
            tracing::info!("🔀 {} → {}", rule.prefix, rule.target);
        }
        for target in &plan.html_targets {
            tracing::info!("📄 http://localhost:{}/{}", server.port, target.filename);
        }
    }

    fn handle_info_command(&self) -> Result<()> {
        tracing::info!("🦀 mpa v{}", env!("CARGO_PKG_VERSION"));
        tracing::info!("══════════════════════════════════════");
        tracing::info!("Modes (NODE_ENV): dev | prod | anything else = base");
        tracing::info!("Pages: ./src/<id>/index.js + ./src/<id>/<id>.html");
        tracing::info!("Chunks per page: manifest, vendor, babel-polyfill, <id>");
        Ok(())
    }
}

impl Default for CliHandler {
    fn default() -> Self {
        Self::new()
    }
}
