use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use log::{error, info};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use rknfs::api::xlinestore::XlineStore;
use rknfs::cli::Cli;
use rknfs::config::{Config, PodIdentity, load_config};
use rknfs::controller::{Controller, Reconciler};
use rknfs::exec::{DockerExec, resolve_sibling_container};
use rknfs::informer::PodInformer;
use rknfs::nfs::ContainerNfsServer;
use rknfs::record::{COMPONENT, EventBroadcaster};

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() -> anyhow::Result<()> {
    let mut term = signal(SignalKind::terminate())?;
    tokio::select! {
        res = tokio::signal::ctrl_c() => res?,
        _ = term.recv() => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .target(env_logger::Target::Stdout)
        .init();

    let cli = Cli::parse();
    let mut cfg = match &cli.config {
        Some(path) => load_config(&path.to_string_lossy())?,
        None => Config::default(),
    };
    cli.apply(&mut cfg);

    let identity = PodIdentity::from_env()?;
    let store = Arc::new(XlineStore::new(&cfg.xline_config).await?);

    let own_pod = store
        .get_pod(&identity.name)
        .await
        .context("Failed to get own pod")?
        .with_context(|| format!("pod {} not found", identity.name))?;
    if own_pod.metadata.namespace != identity.namespace {
        bail!(
            "pod {} is in namespace {}, expected {}",
            identity.name,
            own_pod.metadata.namespace,
            identity.namespace
        );
    }
    let target = resolve_sibling_container(&own_pod, &cfg.nfs.container_name).with_context(|| {
        format!(
            "container {} not found in pod {}/{}",
            cfg.nfs.container_name, identity.namespace, identity.name
        )
    })?;
    info!("[rknfs] nfs server container {} is {target}", cfg.nfs.container_name);

    let docker = DockerExec::connect(&cfg.nfs.docker_endpoint)
        .with_context(|| format!("Failed to connect docker at {}", cfg.nfs.docker_endpoint))?;
    let nfs = ContainerNfsServer::new(Arc::new(docker), target, cfg.nfs.exports_file.clone());

    let mut informer = PodInformer::new(store.clone());
    let events = informer.subscribe();
    let lister = informer.lister();

    let (recorder, recorder_handle) = EventBroadcaster::start(store.clone(), COMPONENT);
    let reconciler = Reconciler::new(
        lister.clone(),
        store.clone(),
        Arc::new(nfs),
        Arc::new(recorder),
        cfg.nfs.pods_root.clone(),
        cfg.controller.share_label.clone(),
    );
    let controller = Controller::new(
        lister,
        reconciler,
        events,
        cfg.controller.share_label.clone(),
    );

    let cancel = CancellationToken::new();
    let informer_handle = tokio::spawn(informer.run(cancel.clone()));
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match shutdown_signal().await {
            Ok(()) => {
                info!("[rknfs] shutting down");
                signal_cancel.cancel();
            }
            Err(e) => error!("Failed to listen for shutdown signals: {e}"),
        }
    });

    let result = controller.run(cfg.controller.workers, cancel.clone()).await;
    cancel.cancel();
    if let Err(e) = informer_handle.await {
        error!("informer task failed: {e}");
    }
    // The controller owned the last recorder, pending events are flushed here.
    if let Err(e) = recorder_handle.await {
        error!("event writer failed: {e}");
    }
    result
}
