use async_trait::async_trait;
use bollard::Docker;
use bollard::container::LogOutput;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use common::PodTask;
use futures::StreamExt;
use log::debug;

/// Handle of the process commands are run in, a container id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerTarget(String);

impl ContainerTarget {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContainerTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find the container named `container_name` in the pod's statuses and strip the
/// runtime prefix (`docker://`, `containerd://`, ...) from its id.
pub fn resolve_sibling_container(pod: &PodTask, container_name: &str) -> Option<ContainerTarget> {
    pod.status
        .container_statuses
        .iter()
        .find(|status| status.name == container_name)
        .map(|status| match status.container_id.split_once("://") {
            Some((_, id)) => id,
            None => status.container_id.as_str(),
        })
        .filter(|id| !id.is_empty())
        .map(ContainerTarget::new)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecOutput {
    pub stdout: String,
    /// stdout and stderr interleaved as they arrived.
    pub combined: String,
    pub exit_code: Option<i64>,
}

impl ExecOutput {
    /// Only a reported zero exit is a success, a missing code is not.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("docker: {0}")]
    Docker(#[from] bollard::errors::Error),
    #[error("exec in {target} did not attach")]
    Detached { target: String },
}

/// Runs a command inside a target process and captures its output.
#[async_trait]
pub trait CommandChannel: Send + Sync {
    /// Only transport failures are errors, a non-zero exit is reported in
    /// [`ExecOutput::exit_code`].
    async fn execute(
        &self,
        target: &ContainerTarget,
        argv: &[String],
    ) -> Result<ExecOutput, ExecError>;
}

pub struct DockerExec {
    docker: Docker,
}

impl DockerExec {
    /// Connect to `endpoint`, either `unix://<socket>` or `tcp://host:port` / `http://host:port`.
    pub fn connect(endpoint: &str) -> Result<Self, ExecError> {
        let docker = if let Some(path) = endpoint.strip_prefix("unix://") {
            Docker::connect_with_unix(path, 120, bollard::API_DEFAULT_VERSION)?
        } else if let Some(addr) = endpoint.strip_prefix("tcp://") {
            Docker::connect_with_http(&format!("http://{addr}"), 120, bollard::API_DEFAULT_VERSION)?
        } else if endpoint.starts_with("http://") {
            Docker::connect_with_http(endpoint, 120, bollard::API_DEFAULT_VERSION)?
        } else {
            Docker::connect_with_local_defaults()?
        };
        Ok(Self { docker })
    }
}

#[async_trait]
impl CommandChannel for DockerExec {
    async fn execute(
        &self,
        target: &ContainerTarget,
        argv: &[String],
    ) -> Result<ExecOutput, ExecError> {
        let exec_config = CreateExecOptions {
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            cmd: Some(argv.to_vec()),
            ..Default::default()
        };
        let exec = self.docker.create_exec(target.as_str(), exec_config).await?;

        let start_opts = StartExecOptions {
            detach: false,
            ..Default::default()
        };
        let mut output = ExecOutput::default();
        match self.docker.start_exec(&exec.id, Some(start_opts)).await? {
            StartExecResults::Attached { output: mut stream, .. } => {
                while let Some(msg) = stream.next().await {
                    match msg? {
                        LogOutput::StdOut { message } => {
                            let text = String::from_utf8_lossy(&message);
                            output.stdout.push_str(&text);
                            output.combined.push_str(&text);
                        }
                        LogOutput::StdErr { message } => {
                            output.combined.push_str(&String::from_utf8_lossy(&message));
                        }
                        _ => {}
                    }
                }
            }
            StartExecResults::Detached => {
                return Err(ExecError::Detached {
                    target: target.to_string(),
                });
            }
        }

        let inspect = self.docker.inspect_exec(&exec.id).await?;
        output.exit_code = inspect.exit_code;
        debug!("exec {argv:?} in {target} exited with {:?}", output.exit_code);
        Ok(output)
    }
}
