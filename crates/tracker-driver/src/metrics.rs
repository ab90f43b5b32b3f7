//! 接收链路指标模块
//!
//! 提供零开销的原子计数器，用于监控 UDP 接收链路的健康状态。
//! 所有计数器都使用原子操作，可以在任何线程安全地读取，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 会话实时指标
///
/// # 使用示例
///
/// ```rust
/// use tracker_driver::SessionMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = SessionMetrics::new();
///
/// // 在接收线程中更新指标
/// metrics.datagrams_total.fetch_add(1, Ordering::Relaxed);
///
/// // 在主线程中读取快照
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.datagrams_total, 1);
/// ```
#[derive(Debug, Default)]
pub struct SessionMetrics {
    /// 收到的数据报总数（包括被丢弃的）
    pub datagrams_total: AtomicU64,

    /// 成功解码并写入插槽的样本数
    pub samples_applied: AtomicU64,

    /// 长度不符被丢弃的数据报数
    pub datagrams_rejected: AtomicU64,

    /// 非预期的接收错误次数（每次都会终止接收循环）
    pub receive_errors: AtomicU64,
}

impl SessionMetrics {
    /// 创建新的指标实例（所有计数器初始化为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指标快照
    ///
    /// 使用 `Ordering::Relaxed`，不同计数器之间可能有微小的时间差。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            datagrams_total: self.datagrams_total.load(Ordering::Relaxed),
            samples_applied: self.samples_applied.load(Ordering::Relaxed),
            datagrams_rejected: self.datagrams_rejected.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.datagrams_total.store(0, Ordering::Relaxed);
        self.samples_applied.store(0, Ordering::Relaxed);
        self.datagrams_rejected.store(0, Ordering::Relaxed);
        self.receive_errors.store(0, Ordering::Relaxed);
    }
}

/// 指标快照（不可变，用于读取）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub datagrams_total: u64,
    pub samples_applied: u64,
    pub datagrams_rejected: u64,
    pub receive_errors: u64,
}

impl MetricsSnapshot {
    /// 被丢弃数据报占比（0.0 - 1.0）
    pub fn rejection_rate(&self) -> f64 {
        if self.datagrams_total == 0 {
            0.0
        } else {
            self.datagrams_rejected as f64 / self.datagrams_total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = SessionMetrics::new();
        metrics.datagrams_total.fetch_add(4, Ordering::Relaxed);
        metrics.samples_applied.fetch_add(3, Ordering::Relaxed);
        metrics.datagrams_rejected.fetch_add(1, Ordering::Relaxed);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.datagrams_total, 4);
        assert_eq!(snapshot.samples_applied, 3);
        assert_eq!(snapshot.datagrams_rejected, 1);
        assert_eq!(snapshot.receive_errors, 0);
        assert!((snapshot.rejection_rate() - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_reset() {
        let metrics = SessionMetrics::new();
        metrics.datagrams_total.fetch_add(10, Ordering::Relaxed);
        metrics.receive_errors.fetch_add(1, Ordering::Relaxed);
        metrics.reset();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_rejection_rate_empty() {
        assert_eq!(MetricsSnapshot::default().rejection_rate(), 0.0);
    }
}
