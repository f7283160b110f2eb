use std::{future::Future, io::ErrorKind, path::Path};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::debug;

use crate::fs::operations::write_replace;

/// Interface for abstracting access to the ledger document on disk.
pub trait LedgerStore {
    /// Reads the current ledger text, `None` when no document exists yet.
    fn load(&self, path: &Path) -> impl Future<Output = Result<Option<String>>> + Send;

    /// Replaces the ledger with `content` in one atomic step, creating parent
    /// directories as needed.
    fn replace(&self, path: &Path, content: &str) -> impl Future<Output = Result<()>> + Send;
}

/// The main realization of [LedgerStore].
pub struct FileLedgerStore;

impl LedgerStore for FileLedgerStore {
    async fn load(&self, path: &Path) -> Result<Option<String>> {
        async fn extract(path: &Path) -> std::result::Result<String, std::io::Error> {
            debug!("Loading ledger {path:?}");
            let mut file = File::open(path).await?;
            // Shared lock so a concurrent replace never shows us a
            // half-written document.
            file.lock_shared()?;
            let mut content = String::new();
            let read = file.read_to_string(&mut content).await;
            file.unlock_async().await?;
            read?;
            Ok(content)
        }

        match extract(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e)?,
        }
    }

    async fn replace(&self, path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        write_replace(path, content).await?;
        Ok(())
    }
}
