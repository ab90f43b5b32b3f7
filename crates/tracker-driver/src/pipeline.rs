//! 接收循环模块
//!
//! 负责后台接收线程的数据报接收、解码、坐标转换和插槽更新。

use crate::state::{AtomicSessionState, Pose, PoseContext, SessionState};
use crate::transport::Endpoint;
use std::io;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tracing::{debug, error, info, trace};
use tracker_protocol::{OrientationPolicy, WIRE_SAMPLE_SIZE, WireSample, to_consumer_frame};

/// 默认接收缓冲区大小
///
/// 远大于有效样本长度，超长数据报会以真实长度被识别并丢弃，
/// 不会被截断成"恰好 28 字节"。
pub const DEFAULT_RECV_BUFFER_SIZE: usize = 2048;

/// Pipeline 配置
///
/// # Example
///
/// ```
/// use tracker_driver::PipelineConfig;
/// use tracker_protocol::OrientationPolicy;
///
/// let config = PipelineConfig {
///     orientation_policy: OrientationPolicy::Normalize,
///     ..PipelineConfig::default()
/// };
/// assert_eq!(config.recv_buffer_size, 2048);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// 转换后四元数的处理策略
    pub orientation_policy: OrientationPolicy,
    /// 接收缓冲区大小（字节，不小于 29）
    pub recv_buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            orientation_policy: OrientationPolicy::PassThrough,
            recv_buffer_size: DEFAULT_RECV_BUFFER_SIZE,
        }
    }
}

/// 处理一个数据报
///
/// 长度不等于 28 字节的数据报被静默丢弃（仅计数）并返回 `None`；
/// 有效样本依次经过：解码 → 坐标转换 → 策略 → 写入插槽 → 触发回调。
/// 回调总是在插槽更新之后触发，每个样本恰好一次。
pub fn apply_datagram(bytes: &[u8], ctx: &PoseContext, policy: OrientationPolicy) -> Option<Pose> {
    ctx.metrics.datagrams_total.fetch_add(1, Ordering::Relaxed);

    let sample = match WireSample::decode(bytes) {
        Ok(sample) => sample,
        Err(e) => {
            ctx.metrics.datagrams_rejected.fetch_add(1, Ordering::Relaxed);
            trace!("Dropping malformed datagram: {}", e);
            return None;
        },
    };

    let orientation = policy.apply(to_consumer_frame(sample.orientation()));
    let pose = ctx.pose.store(orientation, sample.acceleration());

    ctx.connection_monitor.register_sample();
    ctx.metrics.samples_applied.fetch_add(1, Ordering::Relaxed);

    // 先取快照再触发，回调内部可以调用 add_callback 而不会死锁
    let hooks = ctx.hooks.read().snapshot();
    hooks.trigger_all(&pose);

    Some(pose)
}

/// 接收线程主循环
///
/// 阻塞在 `Endpoint::wait(None)` 上，直到数据到达或 `stop()` 唤醒。
/// 线程退出时端点随之释放（Socket 关闭）。
///
/// # 参数
/// - `endpoint`: 已绑定的端点（所有权转移到本线程）
/// - `ctx`: 共享状态上下文
/// - `config`: Pipeline 配置
/// - `state`: 会话状态（`Running` 以外的值都会让循环退出）
pub fn rx_loop(
    mut endpoint: Endpoint,
    ctx: Arc<PoseContext>,
    config: PipelineConfig,
    state: Arc<AtomicSessionState>,
) {
    let mut buf = vec![0u8; config.recv_buffer_size.max(WIRE_SAMPLE_SIZE + 1)];
    info!(addr = %endpoint.local_addr(), "Receive loop started");

    'outer: loop {
        // Acquire: 看到 Stopping 时，也能看到 stop() 之前的所有写入
        if !state.get(Ordering::Acquire).is_running() {
            trace!("RX thread: session no longer running, exiting");
            break;
        }

        let readiness = match endpoint.wait(None) {
            Ok(readiness) => readiness,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                report_receive_error(&e, &ctx, &state);
                break;
            },
        };

        if readiness.woken {
            debug!("RX thread: woken by stop request");
        }

        if !readiness.readable {
            continue;
        }

        // 边沿触发：必须一直读到 WouldBlock
        loop {
            if !state.get(Ordering::Acquire).is_running() {
                break 'outer;
            }

            match endpoint.recv_from(&mut buf) {
                Ok((len, from)) => {
                    if apply_datagram(&buf[..len], &ctx, config.orientation_policy).is_none() {
                        trace!(%from, len, "Datagram rejected");
                    }
                },
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    report_receive_error(&e, &ctx, &state);
                    break 'outer;
                },
            }
        }
    }

    let snapshot = ctx.metrics.snapshot();
    info!(
        samples_applied = snapshot.samples_applied,
        datagrams_rejected = snapshot.datagrams_rejected,
        "Receive loop finished"
    );
}

/// 接收错误处理：运行中属于故障，停止过程中属于预期
fn report_receive_error(e: &io::Error, ctx: &PoseContext, state: &AtomicSessionState) {
    match state.get(Ordering::Acquire) {
        SessionState::Running => {
            error!("RX thread: UDP receive error: {}", e);
            ctx.metrics.receive_errors.fetch_add(1, Ordering::Relaxed);
            // 不重连，会话回到 Idle，允许再次 start()
            state.set(SessionState::Idle, Ordering::Release);
        },
        _ => debug!("RX thread: receive interrupted during shutdown: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::PoseCallback;
    use std::sync::atomic::AtomicU64;
    use tracker_protocol::Quaternion;

    struct Count(AtomicU64);

    impl PoseCallback for Count {
        fn on_pose_updated(&self, _pose: &Pose) {
            self.0.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.orientation_policy, OrientationPolicy::PassThrough);
        assert_eq!(config.recv_buffer_size, DEFAULT_RECV_BUFFER_SIZE);
    }

    #[test]
    fn test_apply_valid_datagram() {
        let ctx = PoseContext::default();
        let bytes = WireSample::new(0.0, 1.0, 0.0, 0.0, 0.1, 0.2, 9.8).encode();

        let pose = apply_datagram(&bytes, &ctx, OrientationPolicy::PassThrough).unwrap();
        assert_eq!(pose.orientation, Quaternion::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(pose.raw_acceleration, [0.1, 0.2, 9.8]);
        assert_eq!(ctx.pose.snapshot(), pose);
        assert!(ctx.connection_monitor.is_streaming());

        let snapshot = ctx.metrics.snapshot();
        assert_eq!(snapshot.datagrams_total, 1);
        assert_eq!(snapshot.samples_applied, 1);
        assert_eq!(snapshot.datagrams_rejected, 0);
    }

    #[test]
    fn test_apply_transforms_to_consumer_frame() {
        let ctx = PoseContext::default();
        let bytes = WireSample::new(0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0).encode();
        let pose = apply_datagram(&bytes, &ctx, OrientationPolicy::PassThrough).unwrap();
        assert_eq!(pose.orientation, Quaternion::new(0.0, 0.0, 0.0, -1.0));
    }

    #[test]
    fn test_short_datagram_rejected() {
        let ctx = PoseContext::default();
        let hook = Arc::new(Count(AtomicU64::new(0)));
        ctx.hooks.write().add_callback(hook.clone());

        assert!(apply_datagram(&[0u8; 10], &ctx, OrientationPolicy::PassThrough).is_none());
        assert!(apply_datagram(&[0u8; 29], &ctx, OrientationPolicy::PassThrough).is_none());
        assert!(apply_datagram(&[], &ctx, OrientationPolicy::PassThrough).is_none());

        assert_eq!(ctx.pose.snapshot().orientation, Quaternion::IDENTITY);
        assert_eq!(ctx.pose.snapshot().sample_count, 0);
        assert_eq!(hook.0.load(Ordering::Relaxed), 0);

        let snapshot = ctx.metrics.snapshot();
        assert_eq!(snapshot.datagrams_total, 3);
        assert_eq!(snapshot.datagrams_rejected, 3);
    }

    #[test]
    fn test_hooks_see_updated_slot() {
        struct SlotCheck {
            ctx: Arc<PoseContext>,
            ok: AtomicU64,
        }
        impl PoseCallback for SlotCheck {
            fn on_pose_updated(&self, pose: &Pose) {
                if self.ctx.pose.snapshot() == *pose {
                    self.ok.fetch_add(1, Ordering::Relaxed);
                }
            }
        }

        let ctx = Arc::new(PoseContext::default());
        let hook = Arc::new(SlotCheck {
            ctx: ctx.clone(),
            ok: AtomicU64::new(0),
        });
        ctx.hooks.write().add_callback(hook.clone());

        for i in 0..3 {
            let bytes = WireSample::new(i as f32, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0).encode();
            apply_datagram(&bytes, &ctx, OrientationPolicy::PassThrough);
        }
        assert_eq!(hook.ok.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn test_callback_may_register_callbacks() {
        struct Registrar {
            ctx: Arc<PoseContext>,
            extra: Arc<Count>,
            done: std::sync::atomic::AtomicBool,
        }
        impl PoseCallback for Registrar {
            fn on_pose_updated(&self, _pose: &Pose) {
                if !self.done.swap(true, Ordering::Relaxed) {
                    self.ctx.hooks.write().add_callback(self.extra.clone());
                }
            }
        }

        let ctx = Arc::new(PoseContext::default());
        let extra = Arc::new(Count(AtomicU64::new(0)));
        ctx.hooks.write().add_callback(Arc::new(Registrar {
            ctx: ctx.clone(),
            extra: extra.clone(),
            done: std::sync::atomic::AtomicBool::new(false),
        }));

        let bytes = WireSample::new(1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0).encode();
        apply_datagram(&bytes, &ctx, OrientationPolicy::PassThrough);
        // 新回调从下一个样本开始生效
        assert_eq!(extra.0.load(Ordering::Relaxed), 0);
        assert_eq!(ctx.hooks.read().len(), 2);

        apply_datagram(&bytes, &ctx, OrientationPolicy::PassThrough);
        assert_eq!(extra.0.load(Ordering::Relaxed), 1);

        // 打破 Registrar 持有 ctx 的引用环
        ctx.hooks.write().clear();
    }

    #[test]
    fn test_receive_error_while_running_goes_idle() {
        let ctx = PoseContext::default();
        let state = AtomicSessionState::new(SessionState::Running);

        report_receive_error(&io::Error::other("network down"), &ctx, &state);

        assert_eq!(ctx.metrics.snapshot().receive_errors, 1);
        assert_eq!(state.get(Ordering::Acquire), SessionState::Idle);
    }

    #[test]
    fn test_receive_error_during_stop_not_counted() {
        let ctx = PoseContext::default();
        let state = AtomicSessionState::new(SessionState::Stopping);

        report_receive_error(&io::Error::other("socket closed"), &ctx, &state);

        assert_eq!(ctx.metrics.snapshot().receive_errors, 0);
        assert_eq!(state.get(Ordering::Acquire), SessionState::Stopping);
    }

    #[test]
    fn test_normalize_policy() {
        let ctx = PoseContext::default();
        let bytes = WireSample::new(2.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0).encode();
        let pose = apply_datagram(&bytes, &ctx, OrientationPolicy::Normalize).unwrap();
        assert_eq!(pose.orientation, Quaternion::IDENTITY);

        let zero = WireSample::default().encode();
        let pose = apply_datagram(&zero, &ctx, OrientationPolicy::Normalize).unwrap();
        assert_eq!(pose.orientation, Quaternion::IDENTITY);
    }
}
