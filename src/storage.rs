//! 基础目录：规范化根路径与受限的路径解析。

use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::path::RequestPath;

#[derive(Clone, Debug)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// 打开基础目录并保存其规范路径，后续的包含校验都基于该路径。
    pub async fn open(base: impl AsRef<Path>) -> io::Result<Self> {
        let root = fs::canonicalize(base.as_ref()).await?;
        if !fs::metadata(&root).await?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", root.display()),
            ));
        }
        Ok(Self { root })
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// 将请求路径解析为基础目录内的规范绝对路径（跟随符号链接后再校验）。
    pub async fn resolve(&self, request: &RequestPath) -> Result<PathBuf, StorageError> {
        let joined = self.root.join(request.relative());
        let canonical = fs::canonicalize(&joined).await?;
        if !canonical.starts_with(&self.root) {
            return Err(StorageError::OutsideRoot);
        }
        Ok(canonical)
    }
}

#[derive(Debug)]
pub enum StorageError {
    OutsideRoot,
    Io(io::Error),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err)
    }
}
