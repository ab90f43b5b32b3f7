//! 位姿会话
//!
//! `PoseSession` 持有 UDP 端点、接收线程和唯一的位姿插槽。
//!
//! - `start(port)`：绑定 `bind_address:port`，启动一个接收线程
//! - `current_pose()`：任意线程、任意时刻可调用的快照读取
//! - `stop()`：唤醒并等待接收线程退出，幂等
//!
//! `start`/`stop` 只应由一个控制线程调用；读取可以来自任意数量的线程
//! （通过 [`PoseReader`]）。

use crate::builder::SessionConfig;
use crate::error::SessionError;
use crate::hooks::PoseCallback;
use crate::metrics::MetricsSnapshot;
use crate::pipeline::rx_loop;
use crate::state::{AtomicSessionState, Pose, PoseContext, SessionState};
use crate::transport::Endpoint;
use mio::Waker;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// 运行中的接收线程
struct Worker {
    handle: JoinHandle<()>,
    waker: Arc<Waker>,
    local_addr: SocketAddr,
}

/// 位姿会话
///
/// # Example
///
/// ```no_run
/// use tracker_driver::PoseSession;
///
/// let mut session = PoseSession::new();
/// session.start(8080)?;
///
/// let pose = session.current_pose();
/// println!("orientation = {:?}", pose.orientation);
///
/// session.stop();
/// # Ok::<(), tracker_driver::SessionError>(())
/// ```
pub struct PoseSession {
    ctx: Arc<PoseContext>,
    state: Arc<AtomicSessionState>,
    config: SessionConfig,
    worker: Option<Worker>,
}

impl PoseSession {
    /// 使用默认配置创建会话（Idle）
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    /// 使用指定配置创建会话（Idle）
    pub fn with_config(config: SessionConfig) -> Self {
        let ctx = Arc::new(PoseContext::with_stream_timeout(
            config.position,
            config.stream_timeout,
        ));
        Self {
            ctx,
            state: Arc::new(AtomicSessionState::default()),
            config,
            worker: None,
        }
    }

    /// 启动会话
    ///
    /// 绑定 `bind_address:port`（端口 0 表示由系统分配，见 [`local_addr`](Self::local_addr)），
    /// 成功后会话进入 `Running`，且恰好有一个接收线程。
    ///
    /// # 错误
    /// - 会话已在运行：[`SessionError::AlreadyRunning`]
    /// - 端口无法绑定：[`SessionError::BindFailed`]
    /// - 传输层无法初始化：[`SessionError::SocketCreateFailed`]
    /// - 线程无法创建：[`SessionError::WorkerSpawn`]
    ///
    /// 任何错误都不会改变会话状态（保持 `Idle`）。
    pub fn start(&mut self, port: u16) -> Result<(), SessionError> {
        if self.state.get(Ordering::Acquire).is_running() {
            return Err(SessionError::AlreadyRunning);
        }

        // 上一个接收线程可能因接收错误自行退出，先回收
        self.reap_worker();

        let addr = SocketAddr::new(self.config.bind_address, port);
        let endpoint = Endpoint::bind(addr)?;
        let local_addr = endpoint.local_addr();
        let waker = endpoint.waker();
        info!(%local_addr, "UDP socket bound");

        self.ctx.connection_monitor.reset();
        // Release: 接收线程看到 Running 时，端点和上下文已就绪
        self.state.set(SessionState::Running, Ordering::Release);

        let ctx = Arc::clone(&self.ctx);
        let state = Arc::clone(&self.state);
        let pipeline = self.config.pipeline;
        let handle = thread::Builder::new()
            .name("tracker-rx".into())
            .spawn(move || rx_loop(endpoint, ctx, pipeline, state))
            .map_err(|e| {
                self.state.set(SessionState::Idle, Ordering::Release);
                SessionError::WorkerSpawn(e)
            })?;

        self.worker = Some(Worker {
            handle,
            waker,
            local_addr,
        });
        Ok(())
    }

    /// 停止会话
    ///
    /// Running → Stopping → 唤醒接收线程 → 等待其退出 → Idle。
    /// 返回时接收线程已结束、Socket 已关闭，插槽不会再被写入。
    /// 对 Idle 会话调用无任何效果。
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        // Release: 接收线程看到 Stopping 时，也能看到此前的所有写入
        self.state.set(SessionState::Stopping, Ordering::Release);

        if let Err(e) = worker.waker.wake() {
            warn!("Failed to wake receive thread: {}, sending wake-up datagram", e);
            nudge(worker.local_addr);
        }

        if worker.handle.join().is_err() {
            error!("Receive thread panicked");
        }

        self.state.set(SessionState::Idle, Ordering::Release);
        info!(local_addr = %worker.local_addr, "Pose session stopped");
    }

    /// 当前位姿快照
    ///
    /// 不做任何 IO，只短暂持有插槽锁。`start()` 之前返回单位姿态 + 配置的位置，
    /// `stop()` 之后返回最后一次写入的位姿。
    pub fn current_pose(&self) -> Pose {
        self.ctx.pose.snapshot()
    }

    /// 获取可跨线程克隆的只读句柄
    pub fn reader(&self) -> PoseReader {
        PoseReader {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// 当前生命周期状态
    pub fn state(&self) -> SessionState {
        self.state.get(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// 实际绑定的地址（仅在运行中可用）
    ///
    /// 接收线程因接收错误退出后返回 `None`。
    pub fn local_addr(&self) -> Option<SocketAddr> {
        if !self.is_running() {
            return None;
        }
        self.worker.as_ref().map(|worker| worker.local_addr)
    }

    /// 注册位姿更新回调（运行中也可注册）
    pub fn add_callback(&self, callback: Arc<dyn PoseCallback>) {
        self.ctx.hooks.write().add_callback(callback);
    }

    /// 移除所有回调
    pub fn clear_callbacks(&self) {
        self.ctx.hooks.write().clear();
    }

    /// 接收链路指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.ctx.metrics.snapshot()
    }

    /// 最近 `stream_timeout` 内是否收到过有效样本
    pub fn is_streaming(&self) -> bool {
        self.ctx.connection_monitor.is_streaming()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// 回收已自行退出的接收线程
    ///
    /// 状态已不是 `Running`，先唤醒一次，保证仍阻塞在 poll 上的线程能看到并退出。
    fn reap_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            debug!(local_addr = %worker.local_addr, "Reaping finished receive thread");
            if let Err(e) = worker.waker.wake() {
                debug!("Failed to wake receive thread before reaping: {}", e);
                nudge(worker.local_addr);
            }
            if worker.handle.join().is_err() {
                error!("Receive thread panicked");
            }
        }
    }
}

impl Default for PoseSession {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PoseSession {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PoseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseSession")
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .field("config", &self.config)
            .finish()
    }
}

/// 只读位姿句柄
///
/// 可克隆并发送到任意线程；会话停止或重启后依然有效。
#[derive(Clone)]
pub struct PoseReader {
    ctx: Arc<PoseContext>,
}

impl PoseReader {
    pub fn current_pose(&self) -> Pose {
        self.ctx.pose.snapshot()
    }

    pub fn is_streaming(&self) -> bool {
        self.ctx.connection_monitor.is_streaming()
    }
}

impl std::fmt::Debug for PoseReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoseReader").finish_non_exhaustive()
    }
}

/// 向本地端点发送一个空数据报，让阻塞的 poll 返回
fn nudge(local_addr: SocketAddr) {
    let target = match local_addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => SocketAddr::new(Ipv4Addr::LOCALHOST.into(), local_addr.port()),
        IpAddr::V6(ip) if ip.is_unspecified() => SocketAddr::new(Ipv6Addr::LOCALHOST.into(), local_addr.port()),
        _ => local_addr,
    };
    let bind: SocketAddr = match target {
        SocketAddr::V4(_) => (Ipv4Addr::UNSPECIFIED, 0).into(),
        SocketAddr::V6(_) => (Ipv6Addr::UNSPECIFIED, 0).into(),
    };
    if let Err(e) = UdpSocket::bind(bind).and_then(|socket| socket.send_to(&[], target)) {
        error!("Failed to send wake-up datagram to {}: {}", target, e);
    }
}
