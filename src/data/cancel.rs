//! 快速失败任务组
//!
//! [`FailFast`] = 共享取消令牌 + 只保留首个错误的槽位，
//! 用于“一处失败、全体中止”的并发下载。

use std::sync::OnceLock;

use tokio_util::sync::CancellationToken;

use super::error::DataError;

/// 快速失败任务组的共享状态
///
/// 首个调用 [`FailFast::fail`] 的错误被保留，并取消共享令牌；之后的错误全部丢弃。
#[derive(Debug)]
pub struct FailFast {
    token: CancellationToken,
    first_error: OnceLock<DataError>,
}

impl FailFast {
    /// 以 `parent` 的子令牌作为共享令牌（取消子令牌不影响父令牌）
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
            first_error: OnceLock::new(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// 记录失败。返回 true 表示该错误是首个错误
    pub fn fail(&self, err: DataError) -> bool {
        // 先写入错误再取消，保证兄弟任务因取消产生的错误不会抢先
        let first = self.first_error.set(err).is_ok();
        self.token.cancel();
        first
    }

    pub fn into_result(self) -> Result<(), DataError> {
        match self.first_error.into_inner() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
