//! Optional branding asset (e.g. a logo) attached to a dashboard view.

use std::fmt::Debug;
use std::path::PathBuf;

use async_trait::async_trait;
use liquidity_core::{LiquidityError, Result};
use tracing::debug;

/// Binary asset shown alongside the dashboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Asset name, e.g. the file name.
    pub name: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

/// Loads a branding asset.
///
/// Loading is best-effort: the dashboard turns any error into a missing asset.
#[async_trait]
pub trait AssetSource: Send + Sync + Debug {
    /// Loads the asset.
    async fn load(&self) -> Result<Asset>;
}

/// Asset read from a file on disk.
#[derive(Clone, Debug)]
pub struct FileAsset {
    path: PathBuf,
}

impl FileAsset {
    /// Creates a source reading `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AssetSource for FileAsset {
    async fn load(&self) -> Result<Asset> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| LiquidityError::Other(format!("{}: {e}", self.path.display())))?;
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!(asset = %name, size = bytes.len(), "Loaded branding asset");
        Ok(Asset { name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_asset_roundtrip() {
        let path = std::env::temp_dir().join(format!("liquidity-logo-{}.svg", std::process::id()));
        tokio::fs::write(&path, b"<svg/>").await.unwrap();

        let asset = FileAsset::new(path.clone()).load().await.unwrap();
        tokio::fs::remove_file(&path).await.unwrap();

        assert_eq!(asset.bytes, b"<svg/>");
        assert!(asset.name.starts_with("liquidity-logo-"));
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let source = FileAsset::new("/nonexistent/liquidity/logo.png");
        assert!(source.load().await.is_err());
    }
}
