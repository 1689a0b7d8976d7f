use std::process;
use std::sync::Arc;

use clap::Parser;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

use starbase::config::NodeConfig;
use starbase::context::BaseContext;
use starbase::dispatch::{broadcast_once, AnnouncementDispatcher};
use starbase::http::{build_router, ApiState};
use starbase::identity::KeyPair;
use starbase::inbound::AcceptedAnnouncementStore;
use starbase::retry::{retry_sweep, FailedAnnouncementStore};
use starbase::schedule::{derive_interval, spawn_periodic};
use starbase::utils::now_i64;

use starbase_daemon::Args;

const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    // An unparsable or invalid config is fatal; nothing starts on a bad
    // config.
    let config = match NodeConfig::load(&args.config) {
        Ok(config) => config,
        Err(err) => {
            error!("fatal: {err}");
            process::exit(1);
        }
    };

    let ctx = Arc::new(BaseContext::new(
        config,
        KeyPair::generate(),
        args.hostname.clone(),
    ));
    let dispatcher = match AnnouncementDispatcher::new() {
        Ok(dispatcher) => Arc::new(dispatcher),
        Err(err) => {
            error!("fatal: {err}");
            process::exit(1);
        }
    };
    let failed_store = Arc::new(FailedAnnouncementStore::new(args.failed_dir()));
    let accepted_store = Arc::new(AcceptedAnnouncementStore::new(args.accepted_dir()));

    for (service, url) in ctx.resolved_services() {
        info!("service `{service}` at {url}");
    }

    let shutdown = CancellationToken::new();
    let mut jobs = Vec::new();
    let mut handles = Vec::new();

    let bootstrap = &ctx.config.bootstrap;
    if bootstrap.auto_announce {
        if let Some(interval) = derive_interval(bootstrap.announcement_interval) {
            let ctx = ctx.clone();
            let dispatcher = dispatcher.clone();
            let store = failed_store.clone();
            handles.push(spawn_periodic(
                "announce_broadcast",
                interval,
                shutdown.clone(),
                move || {
                    let ctx = ctx.clone();
                    let dispatcher = dispatcher.clone();
                    let store = store.clone();
                    async move { broadcast_once(&ctx, &dispatcher, &store).await }
                },
            ));
            jobs.push("announce_broadcast".to_string());
        }
    }
    if bootstrap.retry_failed_announcements {
        if let Some(interval) = derive_interval(bootstrap.retry_interval) {
            let ctx = ctx.clone();
            let dispatcher = dispatcher.clone();
            let store = failed_store.clone();
            handles.push(spawn_periodic(
                "failed_announcement_retry",
                interval,
                shutdown.clone(),
                move || {
                    let ctx = ctx.clone();
                    let dispatcher = dispatcher.clone();
                    let store = store.clone();
                    async move { retry_sweep(&ctx, &dispatcher, &store).await }
                },
            ));
            jobs.push("failed_announcement_retry".to_string());
        }
    }

    let api = Arc::new(ApiState {
        ctx: ctx.clone(),
        accepted: accepted_store,
        started_at: now_i64(),
        active_jobs: jobs,
    });
    let router = build_router(api);

    let listener = match TcpListener::bind(&args.listen).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("fatal: could not bind {}: {err}", args.listen);
            process::exit(1);
        }
    };
    info!("starbased listening on http://{}", args.listen);

    let server_shutdown = shutdown.clone();
    let server = tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(server_shutdown.cancelled_owned())
            .await;
        if let Err(err) = result {
            error!("http server error: {err}");
        }
    });

    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("could not listen for shutdown signal: {err}");
    }
    info!("shutting down");
    shutdown.cancel();

    // Graceful drain: in-flight ticks finish, then we hard-stop.
    let drain = async {
        for handle in handles {
            let _ = handle.await;
        }
        let _ = server.await;
    };
    if timeout(SHUTDOWN_DEADLINE, drain).await.is_err() {
        error!("shutdown deadline exceeded; abandoning in-flight work");
    }
}
