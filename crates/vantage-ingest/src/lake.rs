//! The object-storage boundary.
//!
//! Raw dataset files live in a data lake addressed by object key
//! (`raw/ppd/pp-2024.csv`). Loaders only ever see a local path; fetching
//! is the job of an [`ObjectStore`].

use std::{
  future::Future,
  io::ErrorKind,
  path::{Component, Path, PathBuf},
};

use tracing::{debug, info};

use crate::error::FetchError;

/// Somewhere dataset files can be fetched from.
pub trait ObjectStore: Send + Sync {
  /// Fetch `remote_key` into `dest_dir` and return the local path. A file
  /// already present at that path is reused without fetching.
  fn download<'a>(
    &'a self,
    remote_key: &'a str,
    dest_dir: &'a Path,
  ) -> impl Future<Output = Result<PathBuf, FetchError>> + Send + 'a;
}

/// A data lake mirrored on the local filesystem, with object keys resolved
/// relative to `root`.
#[derive(Debug, Clone)]
pub struct LocalLake {
  root: PathBuf,
}

impl LocalLake {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  /// Resolve a key to a path under `root`. Keys may not climb out of it.
  fn resolve(&self, remote_key: &str) -> Result<PathBuf, FetchError> {
    let key = Path::new(remote_key.trim_start_matches('/'));
    let escapes = key
      .components()
      .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if remote_key.trim().is_empty() || escapes {
      return Err(FetchError::NotFound(remote_key.to_owned()));
    }
    Ok(self.root.join(key))
  }
}

/// Map an I/O failure on `key` onto the fetch taxonomy.
fn classify(key: &str, err: std::io::Error) -> FetchError {
  match err.kind() {
    ErrorKind::NotFound => FetchError::NotFound(key.to_owned()),
    ErrorKind::PermissionDenied => FetchError::PermissionDenied(key.to_owned()),
    _ => FetchError::Other(err),
  }
}

impl ObjectStore for LocalLake {
  async fn download(&self, remote_key: &str, dest_dir: &Path) -> Result<PathBuf, FetchError> {
    let source = self.resolve(remote_key)?;
    let Some(file_name) = source.file_name() else {
      return Err(FetchError::NotFound(remote_key.to_owned()));
    };
    let dest = dest_dir.join(file_name);

    if tokio::fs::try_exists(&dest).await? {
      debug!(key = remote_key, path = %dest.display(), "reusing local copy");
      return Ok(dest);
    }

    tokio::fs::create_dir_all(dest_dir).await?;
    let bytes = tokio::fs::copy(&source, &dest)
      .await
      .map_err(|e| classify(remote_key, e))?;
    info!(key = remote_key, bytes, path = %dest.display(), "downloaded");
    Ok(dest)
  }
}
