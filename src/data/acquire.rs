//! 并发获取
//!
//! 每个缺失文件一个并发下载任务；任一下载失败即取消其余下载，
//! 等待全部任务结束后返回首个错误。

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use super::cancel::FailFast;
use super::download::{build_client, fetch_to_file};
use super::error::DataError;

/// 待下载文件的远程信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteFile {
    pub url: String,
    /// 可选的 MD5 校验码
    pub md5: Option<String>,
}

impl RemoteFile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            md5: None,
        }
    }

    pub fn with_md5(mut self, md5: impl Into<String>) -> Self {
        self.md5 = Some(md5.into());
        self
    }
}

/// 并发下载 `files` 中的全部文件到 `directory`
///
/// 等价于以一个永不取消的父令牌调用 [`download_files_with_cancel`]。
pub fn download_files(
    directory: &Path,
    files: &BTreeMap<String, RemoteFile>,
    timeout: Duration,
) -> Result<(), DataError> {
    download_files_with_cancel(directory, files, timeout, &CancellationToken::new())
}

/// [`download_files_async`] 的同步版本，内部使用单线程 tokio 运行时
///
/// # Panics
/// 在 tokio 运行时内部调用时 panic，异步环境请直接使用 [`download_files_async`]
pub fn download_files_with_cancel(
    directory: &Path,
    files: &BTreeMap<String, RemoteFile>,
    timeout: Duration,
    parent: &CancellationToken,
) -> Result<(), DataError> {
    if files.is_empty() {
        return Ok(());
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(download_files_async(directory, files, timeout, parent))
}

/// 并发下载 `files`（文件名 → 远程信息）到 `directory`
///
/// - `files` 为空时立即返回 `Ok(())`，不做任何 IO
/// - 所有下载共享 `parent` 派生出的子令牌；首个失败会取消该令牌
/// - 总是等待全部下载任务结束后才返回
/// - 失败时返回触发取消的那个错误，兄弟任务因取消产生的错误被丢弃
pub async fn download_files_async(
    directory: &Path,
    files: &BTreeMap<String, RemoteFile>,
    timeout: Duration,
    parent: &CancellationToken,
) -> Result<(), DataError> {
    if files.is_empty() {
        return Ok(());
    }
    if directory.as_os_str().is_empty() {
        return Err(DataError::DirectoryNotSpecified);
    }

    let client = build_client(timeout)?;
    let group = FailFast::new(parent);

    let tasks = files.iter().map(|(name, remote)| {
        let client = &client;
        let group = &group;
        let dest_path = directory.join(name);
        async move {
            let result = fetch_to_file(
                client,
                &remote.url,
                &dest_path,
                group.token(),
                remote.md5.as_deref(),
            )
            .await;
            if let Err(err) = result {
                if group.fail(err) {
                    log::warn!("下载 {name} 失败，取消其余下载");
                }
            }
        }
    });
    join_all(tasks).await;

    group.into_result()
}
