use clap::Parser;
use mirror_sync_scheduler::cli::Cli;
use mirror_sync_scheduler::config::{load_catalogue, StartupEnv};
use mirror_sync_scheduler::jobs::JobManager;
use mirror_sync_scheduler::scheduler::{serve_manual_sync, SyncScheduler};
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_env_filter("debug").init();
    } else {
        tracing_subscriber::fmt().with_env_filter("info").init();
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let env = StartupEnv::read();
    let dry_run = cli.dry_run || env.dry_run;
    let manual_sync_port = cli.manual_sync_port.unwrap_or(env.manual_sync_port);

    let (catalogue, report) = load_catalogue(&cli.catalogue).map_err(|e| {
        error!("failed to load catalogue: {e:?}");
        anyhow::anyhow!("{e}")
    })?;
    info!(
        "loaded {} project(s); {} static, {} malformed",
        catalogue.len(),
        report.skipped_static.len(),
        report.skipped_malformed.len()
    );

    let job_manager = JobManager::new();
    let scheduler = SyncScheduler::new(catalogue, job_manager.clone(), dry_run, manual_sync_port);

    info!(
        "built schedule: lcm={} intervals, dry_run={dry_run}, manual_sync_port={manual_sync_port}",
        scheduler.schedule().lcm()
    );

    let tick_scheduler = scheduler.clone();
    let tick_loop = tokio::spawn(tick_scheduler.run());

    let manual_sync = tokio::spawn(serve_manual_sync(scheduler.clone(), manual_sync_port));

    tokio::select! {
        _ = tick_loop => {
            error!("tick loop exited unexpectedly");
        }
        result = manual_sync => {
            if let Ok(Err(e)) = result {
                error!("manual-sync worker exited: {e}");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    job_manager.shutdown();
    Ok(())
}
