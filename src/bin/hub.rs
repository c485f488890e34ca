use std::sync::Arc;

use anyhow::Context;
use canary_monitor::{
    backends::{
        ConfigSource, DashboardBackend, FileConfigSource, FileDashboardBackend, MemoryBackend,
        MetricsSink, StaticConfigSource, WebhookMetricsSink,
    },
    config::{MonitorConfig, read_config_file},
    cycle::{Backends, MonitoringCycle},
    monitors::MetricCollector,
    scheduler::SchedulerHandle,
};
use clap::Parser;
use tracing::{debug, info, level_filters::LevelFilter, trace};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (defaults apply if omitted)
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Run a single cycle and exit
    #[arg(long)]
    once: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![
        ("canary_monitor", level),
        ("canary_hub", level),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init(args.verbose);
    trace!("started with args: {args:?}");

    let config = match &args.config {
        Some(path) => read_config_file(path)?,
        None => MonitorConfig::default(),
    }
    .apply_env_overrides();
    debug!("effective config: {config:?}");

    let cycle = build_cycle(config)?;

    if args.once {
        let report = cycle.run_once().await.context("monitoring cycle failed")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let handle = SchedulerHandle::spawn(cycle);
    info!("scheduler started, press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    info!("shutting down");
    handle.shutdown().await?;

    Ok(())
}

fn build_cycle(config: MonitorConfig) -> anyhow::Result<MonitoringCycle> {
    let memory = Arc::new(MemoryBackend::new());

    let config_source: Arc<dyn ConfigSource> = match &config.resources_file {
        Some(path) => Arc::new(FileConfigSource::new(path)),
        None => Arc::new(StaticConfigSource::empty()),
    };

    let metrics: Arc<dyn MetricsSink> = match &config.metrics_webhook {
        Some(url) => Arc::new(WebhookMetricsSink::new(url)),
        None => memory.clone(),
    };

    let dashboards: Arc<dyn DashboardBackend> = match &config.dashboard_dir {
        Some(dir) => Arc::new(FileDashboardBackend::new(dir)),
        None => memory.clone(),
    };

    let collector = MetricCollector::from_config(&config)?;
    let backends = Backends {
        config_source,
        alarms: memory,
        metrics,
        dashboards,
    };

    Ok(MonitoringCycle::new(config, collector, backends))
}
