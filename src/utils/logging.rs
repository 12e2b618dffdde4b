use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use std::time::Instant;

pub struct Logger;

impl Logger {
    pub fn init() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("mpa=info"));

        // stdout carries command output such as plan JSON
        // A second init (tests, embedding) keeps the first subscriber
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }

    pub fn plan_start(mode: &str, pages: usize) {
        info!("🗺️  Assembling build plan");
        info!("═══════════════════════════════════════");
        info!("🎯 Mode: {}", mode);
        info!("📄 Pages: {}", pages);
    }

    pub fn unmatched_mode(raw: Option<&str>) {
        warn!(
            "⚠️  Mode signal {:?} is neither 'dev' nor 'prod'; using base config (no HMR, no hashing, no minification)",
            raw
        );
    }

    pub fn rule_overlap(earlier: &str, later: &str, probe: &str) {
        warn!(
            "⚠️  Asset rule '{}' shadows '{}' for {}",
            earlier, later, probe
        );
    }

    pub fn plan_complete(entries: usize, rules: usize, steps: usize) {
        info!("");
        info!("📊 Plan:");
        info!("  • Entries: {}", entries);
        info!("  • Module rules: {}", rules);
        info!("  • Steps: {}", steps);
        info!("✅ Build plan ready");
    }

    pub fn info(msg: &str) {
        info!("{}", msg);
    }

    pub fn debug(msg: &str) {
        debug!("{}", msg);
    }

    pub fn warn(msg: &str) {
        warn!("⚠️  {}", msg);
    }
}

pub struct Timer {
    start: Instant,
    name: String,
}

impl Timer {
    pub fn start(name: &str) -> Self {
        debug!("⏱️  Starting: {}", name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        debug!("⏱️  Completed: {} in {:.2?}", self.name, self.elapsed());
    }
}
