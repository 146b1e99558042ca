//! 按错误类型重试
//!
//! 只有 [`crate::error::AppError::is_retryable`] 为真的错误才会重试，每次重试都从头
//! 重新执行整个操作，不保留上一次的部分结果。重试严格串行。

use std::future::Future;
use tracing::warn;

use crate::error::AppResult;

/// 执行 `op`，遇到可重试错误时重新执行，最多 `max_attempts` 次
///
/// `op` 的参数是当前尝试序号（从 1 开始）。不可重试的错误立即返回；
/// 次数用尽时返回最后一次的错误。
pub async fn retry_recoverable<T, F, Fut>(
    label: &str,
    max_attempts: usize,
    mut op: F,
) -> AppResult<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                warn!(
                    "{} 第 {}/{} 次尝试失败, 重试: {}",
                    label, attempt, max_attempts, e
                );
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    warn!("{} 已尝试 {} 次, 放弃: {}", label, attempt, e);
                }
                return Err(e);
            }
        }
    }
}
