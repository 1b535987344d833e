use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

#[derive(Parser, Debug)]
#[command(
    name = "rknfs",
    version,
    about = "Exports labelled pod volumes through the NFS server container"
)]
pub struct Cli {
    /// YAML config file, defaults are used when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Xline endpoints, comma separated. Overrides the config file.
    #[arg(long, value_delimiter = ',')]
    pub master: Option<Vec<String>>,

    /// Docker endpoint of the node, e.g. unix:///var/run/docker.sock
    #[arg(long)]
    pub docker_endpoint: Option<String>,

    /// Number of reconcile workers
    #[arg(long)]
    pub workers: Option<usize>,
}

impl Cli {
    /// Command line flags win over the config file.
    pub fn apply(&self, cfg: &mut Config) {
        if let Some(master) = &self.master {
            cfg.xline_config.endpoints = master.clone();
        }
        if let Some(endpoint) = &self.docker_endpoint {
            cfg.nfs.docker_endpoint = endpoint.clone();
        }
        if let Some(workers) = self.workers {
            cfg.controller.workers = workers;
        }
    }
}
