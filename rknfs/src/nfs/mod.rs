pub mod exports;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::Mutex;

use crate::exec::{CommandChannel, ContainerTarget, ExecError, ExecOutput};

#[derive(Debug, thiserror::Error)]
pub enum NfsError {
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("`{command}` exited with {code:?}: {output}")]
    Command {
        command: String,
        code: Option<i64>,
        output: String,
    },
}

/// Mount and export operations on the NFS server.
///
/// Checks report whether something exists, the other operations change state and
/// fail when the underlying command does.
#[async_trait]
pub trait NfsServer: Send + Sync {
    async fn mkdir(&self, path: &str) -> Result<(), NfsError>;
    async fn has_mount(&self, path: &str) -> Result<bool, NfsError>;
    async fn mount_bind(&self, source: &Path, target: &str) -> Result<(), NfsError>;
    async fn has_export_entry(&self, path: &str) -> Result<bool, NfsError>;
    async fn add_export_entry(&self, path: &str) -> Result<(), NfsError>;
    async fn del_export_entry(&self, path: &str) -> Result<(), NfsError>;
    async fn umount(&self, path: &str) -> Result<(), NfsError>;
    /// Re-publish the export table (`exportfs -r`).
    async fn refresh_exports(&self) -> Result<(), NfsError>;
}

/// [`NfsServer`] driving a container through a [`CommandChannel`], one command per
/// operation.
///
/// Commands touching the exports file run one at a time: `sed -i` replaces the file
/// and would drop a line appended while it runs.
pub struct ContainerNfsServer {
    channel: Arc<dyn CommandChannel>,
    target: ContainerTarget,
    exports_file: String,
    exports_lock: Mutex<()>,
}

impl ContainerNfsServer {
    pub fn new(
        channel: Arc<dyn CommandChannel>,
        target: ContainerTarget,
        exports_file: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            target,
            exports_file: exports_file.into(),
            exports_lock: Mutex::new(()),
        }
    }

    async fn run(&self, argv: Vec<String>) -> Result<ExecOutput, NfsError> {
        let output = self.channel.execute(&self.target, &argv).await?;
        if !output.success() {
            return Err(NfsError::Command {
                command: argv.join(" "),
                code: output.exit_code,
                output: output.combined,
            });
        }
        debug!("{} output: {}", argv.join(" "), output.combined.trim_end());
        Ok(output)
    }

    /// Exit status is ignored, a lookup matched when it printed anything.
    async fn lookup(&self, argv: Vec<String>) -> Result<bool, NfsError> {
        let output = self.channel.execute(&self.target, &argv).await?;
        Ok(!output.stdout.trim().is_empty())
    }
}

#[async_trait]
impl NfsServer for ContainerNfsServer {
    async fn mkdir(&self, path: &str) -> Result<(), NfsError> {
        self.run(exports::mkdir(path)).await.map(|_| ())
    }

    async fn has_mount(&self, path: &str) -> Result<bool, NfsError> {
        self.lookup(exports::find_mount(path)).await
    }

    async fn mount_bind(&self, source: &Path, target: &str) -> Result<(), NfsError> {
        info!("start mount from {} to {target}", source.display());
        self.run(exports::mount_bind(&source.to_string_lossy(), target))
            .await
            .map(|_| ())
    }

    async fn has_export_entry(&self, path: &str) -> Result<bool, NfsError> {
        let _guard = self.exports_lock.lock().await;
        self.lookup(exports::find_export(path, &self.exports_file)).await
    }

    async fn add_export_entry(&self, path: &str) -> Result<(), NfsError> {
        info!("add export entry: {}", exports::export_line(path));
        let _guard = self.exports_lock.lock().await;
        self.run(exports::add_export(path, &self.exports_file))
            .await
            .map(|_| ())
    }

    async fn del_export_entry(&self, path: &str) -> Result<(), NfsError> {
        info!("remove export entry: {path}");
        let _guard = self.exports_lock.lock().await;
        self.run(exports::del_export(path, &self.exports_file))
            .await
            .map(|_| ())
    }

    async fn umount(&self, path: &str) -> Result<(), NfsError> {
        info!("remove mount: {path}");
        self.run(exports::umount(path)).await.map(|_| ())
    }

    async fn refresh_exports(&self) -> Result<(), NfsError> {
        let _guard = self.exports_lock.lock().await;
        self.run(exports::refresh_exports()).await.map(|_| ())
    }
}
