use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    // Xline endpoints and credentials
    pub xline_config: XlineConfig,
    pub nfs: NfsConfig,
    pub controller: ControllerConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct XlineConfig {
    pub endpoints: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for XlineConfig {
    fn default() -> Self {
        Self {
            endpoints: vec!["http://127.0.0.1:2379".to_string()],
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NfsConfig {
    /// Name of the NFS server container inside the controller's own pod.
    pub container_name: String,
    pub docker_endpoint: String,
    /// Export table inside the NFS server container.
    pub exports_file: String,
    /// Root of the kubelet pod directories on the host.
    pub pods_root: PathBuf,
}

impl Default for NfsConfig {
    fn default() -> Self {
        Self {
            container_name: "centos-nfs".to_string(),
            docker_endpoint: "unix:///var/run/docker.sock".to_string(),
            exports_file: "/etc/exports".to_string(),
            pods_root: PathBuf::from("/var/lib/kubelet/pods"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub workers: usize,
    /// Pod label listing the volumes to export, comma separated.
    pub share_label: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            share_label: "NFSShare".to_string(),
        }
    }
}

/// Where the controller itself runs, read from `POD_NAME` and `POD_NAMESPACE`.
#[derive(Debug, Clone, PartialEq)]
pub struct PodIdentity {
    pub name: String,
    pub namespace: String,
}

impl PodIdentity {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            name: required_env("POD_NAME")?,
            namespace: required_env("POD_NAMESPACE")?,
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("{key} must be set"),
    }
}

pub fn load_config(path: &str) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read config from {path}"))?;
    let cfg: Config = serde_yaml::from_str(&content).context("Failed to parse YAML config")?;
    Ok(cfg)
}
