//! 目录列表：扩展名过滤、排序与页面视图模型。

use std::cmp::Ordering;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::debug;

use crate::config::ALLOWED_EXTENSIONS;
use crate::path::RequestPath;
use crate::storage::StorageError;

/// 列表中可见文件的扩展名白名单。
#[derive(Clone, Debug)]
pub struct ExtensionFilter {
    allowed: &'static [&'static str],
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self {
            allowed: ALLOWED_EXTENSIONS,
        }
    }
}

impl ExtensionFilter {
    pub fn allows(&self, file_name: &str) -> bool {
        match extension_of(file_name) {
            Some(ext) => self.allowed.contains(&ext),
            None => false,
        }
    }
}

/// 文件名中最后一个 `.` 开始的后缀（含点）。
fn extension_of(file_name: &str) -> Option<&str> {
    file_name.rfind('.').map(|idx| &file_name[idx..])
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub path: RequestPath,
    pub is_dir: bool,
    pub size: u64,
    /// 修改时间（Unix 秒）。
    pub book_date: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    pub entries: Vec<DirectoryEntry>,
    pub current_path: RequestPath,
}

/// 读取目录并构建页面视图：目录在前，其次为允许扩展名的文件。
pub async fn build_page(
    dir: &Path,
    request: &RequestPath,
    filter: &ExtensionFilter,
) -> Result<PageView, StorageError> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!(name = ?raw, "skipping non-UTF-8 entry");
                continue;
            }
        };
        if name == "." || name == ".." {
            continue;
        }
        let is_dir = entry.file_type().await?.is_dir();
        if !is_dir && !filter.allows(&name) {
            continue;
        }
        let metadata = entry.metadata().await?;
        entries.push(DirectoryEntry {
            path: request.join(&name),
            name,
            is_dir,
            size: metadata.len(),
            book_date: unix_seconds(metadata.modified()?),
        });
    }

    entries.sort_by(compare_entries);

    Ok(PageView {
        entries,
        current_path: request.clone(),
    })
}

fn compare_entries(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    match (a.is_dir, b.is_dir) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => a
            .name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name)),
    }
}

fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => i64::try_from(after.as_secs()).unwrap_or(i64::MAX),
        Err(err) => -i64::try_from(err.duration().as_secs()).unwrap_or(i64::MAX),
    }
}
