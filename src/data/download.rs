//! 单文件下载
//!
//! 提供流式 HTTP 下载（可取消、可选 MD5 校验），供 [`super::acquire`] 并发调用。
//! 整个下载过程（连接、等待响应头、读取响应体、写盘）与取消信号竞争，
//! 取消后正在进行的 IO 立即被丢弃。

use std::path::Path;
use std::time::Duration;

use md5::{Digest, Md5};
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

use super::error::DataError;

/// 默认的整体请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// 构造带整体超时的 HTTP 客户端
///
/// 超时覆盖连接、重定向以及响应体的读取。
pub fn build_client(timeout: Duration) -> Result<Client, DataError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DataError::Transport {
            url: String::new(),
            message: format!("无法创建 HTTP 客户端: {e}"),
        })
}

/// 下载 `url` 并流式写入 `dest_path`
///
/// # 参数
/// - `client`: 共享的 HTTP 客户端
/// - `url`: 下载地址
/// - `dest_path`: 保存路径（已存在则截断）
/// - `cancel`: 取消信号，取消后立即返回 `DataError::Cancelled`
/// - `expected_md5`: 可选的 MD5 校验码
///
/// # 返回
/// - 成功返回 `Ok(())`
/// - 失败时尽力删除目标文件，返回原始错误
pub async fn fetch_to_file(
    client: &Client,
    url: &str,
    dest_path: &Path,
    cancel: &CancellationToken,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DataError::Cancelled {
            url: url.to_string(),
        }),
        result = fetch_inner(client, url, dest_path, expected_md5) => result,
    };
    if result.is_err() && dest_path.exists() {
        if let Err(e) = tokio::fs::remove_file(dest_path).await {
            log::warn!("清理未完成的文件 {dest_path:?} 失败: {e}");
        }
    }
    result
}

async fn fetch_inner(
    client: &Client,
    url: &str,
    dest_path: &Path,
    expected_md5: Option<&str>,
) -> Result<(), DataError> {
    let mut file = tokio::fs::File::create(dest_path).await?;

    log::info!("正在下载 {url} ...");

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|e| DataError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

    if response.status() != StatusCode::OK {
        return Err(DataError::BadStatus {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    let mut hasher = Md5::new();
    let mut total = 0usize;
    while let Some(chunk) = response.chunk().await.map_err(|e| body_error(url, e))? {
        hasher.update(&chunk);
        file.write_all(&chunk).await?;
        total += chunk.len();
    }
    file.flush().await?;

    // MD5 校验（如果提供了预期值）
    if let Some(expected) = expected_md5 {
        let actual = format!("{:x}", hasher.finalize());
        if actual != expected {
            return Err(DataError::ChecksumMismatch {
                expected: expected.to_string(),
                got: actual,
            });
        }
        log::debug!("MD5 校验通过: {actual}");
    }

    log::info!("下载完成: {dest_path:?} ({total} 字节)");
    Ok(())
}

/// 读取响应体失败：超时属于传输错误，其余视为 IO 中断
fn body_error(url: &str, e: reqwest::Error) -> DataError {
    if e.is_timeout() {
        DataError::Transport {
            url: url.to_string(),
            message: format!("读取响应超时: {e}"),
        }
    } else {
        DataError::IoError(std::io::Error::other(e))
    }
}
