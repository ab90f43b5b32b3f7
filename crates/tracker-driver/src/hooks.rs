//! 钩子系统（Hook System）
//!
//! 接收线程每成功应用一个样本，就在插槽更新**之后**触发一次全部回调。
//! 追踪运行时的"位姿已更新"通知就是通过这里送达的。
//!
//! # 使用示例
//!
//! ```rust
//! use tracker_driver::hooks::{HookManager, PoseCallback};
//! use tracker_driver::Pose;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! struct Counter(AtomicU64);
//!
//! impl PoseCallback for Counter {
//!     fn on_pose_updated(&self, _pose: &Pose) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//!
//! let counter = Arc::new(Counter(AtomicU64::new(0)));
//! let mut hooks = HookManager::new();
//! hooks.add_callback(counter.clone());
//!
//! hooks.trigger_all(&Pose::default());
//! assert_eq!(counter.0.load(Ordering::Relaxed), 1);
//! ```

use crate::state::Pose;
use std::sync::Arc;

/// 位姿更新回调
///
/// # 性能要求
///
/// 回调在接收线程上同步执行，必须尽快返回：
/// 禁止阻塞 IO，推荐用 `try_send` 把数据交给其他线程处理。
///
/// 触发时不持有回调列表的锁，回调内部可以注册或清除回调，
/// 变更从下一个样本开始生效。
pub trait PoseCallback: Send + Sync {
    /// 插槽已写入新位姿后调用
    fn on_pose_updated(&self, pose: &Pose);
}

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，需要外部同步（`PoseContext` 中使用 `RwLock<HookManager>`）。
/// 列表写时复制，[`snapshot`](Self::snapshot) 只增加引用计数。
#[derive(Clone, Default)]
pub struct HookManager {
    callbacks: Arc<Vec<Arc<dyn PoseCallback>>>,
}

impl HookManager {
    #[must_use]
    pub fn new() -> Self {
        Self {
            callbacks: Arc::new(Vec::new()),
        }
    }

    /// 添加回调
    pub fn add_callback(&mut self, callback: Arc<dyn PoseCallback>) {
        Arc::make_mut(&mut self.callbacks).push(callback);
    }

    /// 移除所有回调
    pub fn clear(&mut self) {
        self.callbacks = Arc::new(Vec::new());
    }

    /// 当前回调列表的快照
    ///
    /// 之后对本管理器的修改不影响快照。接收线程先取快照、释放锁，再触发回调。
    #[must_use]
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    /// 触发所有回调（在接收线程中调用）
    pub fn trigger_all(&self, pose: &Pose) {
        for callback in self.callbacks.iter() {
            callback.on_pose_updated(pose);
        }
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl std::fmt::Debug for HookManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookManager").field("callbacks", &self.callbacks.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tracker_protocol::Quaternion;

    struct Collector {
        seen: Mutex<Vec<Quaternion>>,
    }

    impl PoseCallback for Collector {
        fn on_pose_updated(&self, pose: &Pose) {
            self.seen.lock().push(pose.orientation);
        }
    }

    #[test]
    fn test_trigger_all_in_order() {
        let a = Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        });
        let b = Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        });
        let mut hooks = HookManager::new();
        hooks.add_callback(a.clone());
        hooks.add_callback(b.clone());
        assert_eq!(hooks.len(), 2);

        let mut pose = Pose::default();
        hooks.trigger_all(&pose);
        pose.orientation = Quaternion::new(0.0, 1.0, 0.0, 0.0);
        hooks.trigger_all(&pose);

        let expected = vec![Quaternion::IDENTITY, Quaternion::new(0.0, 1.0, 0.0, 0.0)];
        assert_eq!(*a.seen.lock(), expected);
        assert_eq!(*b.seen.lock(), expected);
    }

    #[test]
    fn test_clear() {
        let mut hooks = HookManager::new();
        hooks.add_callback(Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        }));
        hooks.clear();
        assert!(hooks.is_empty());
        hooks.trigger_all(&Pose::default());
    }

    #[test]
    fn test_snapshot_unaffected_by_later_changes() {
        let a = Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        });
        let mut hooks = HookManager::new();
        hooks.add_callback(a.clone());

        let snapshot = hooks.snapshot();
        hooks.clear();
        hooks.add_callback(Arc::new(Collector {
            seen: Mutex::new(Vec::new()),
        }));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(hooks.len(), 1);

        snapshot.trigger_all(&Pose::default());
        assert_eq!(a.seen.lock().len(), 1);
    }
}
