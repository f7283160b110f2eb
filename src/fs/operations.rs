use std::path::{Path, PathBuf};

use tokio::{
    fs::File,
    io::{self, AsyncWriteExt},
};

/// Replaces the contents of `path` in one step: the new text is written to a
/// temporary sibling, flushed to disk, and renamed over the target. A crash
/// mid-write leaves the previous file untouched.
///
/// The temporary name is deterministic, so a leftover from an interrupted run
/// is simply truncated by the next write instead of accumulating.
pub async fn write_replace(path: &Path, contents: &str) -> Result<(), io::Error> {
    let tmp = tmp_sibling(path);

    let mut file = File::create(&tmp).await?;
    file.write_all(contents.as_bytes()).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|v| v.to_os_string())
        .unwrap_or_else(|| "ledger".into());
    name.push(".tmp");
    path.with_file_name(name)
}
