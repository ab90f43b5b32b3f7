//! UDP 传输端点
//!
//! 端点在 `start()` 时创建、随接收线程退出而释放（RAII）：
//! Socket 关闭与 `Poll` 注册的注销都由 `Drop` 完成。
//!
//! 接收线程阻塞在 `Poll::poll(None)` 上，没有轮询超时；
//! `stop()` 通过 [`Waker`] 唤醒它，这是唯一的取消路径。

use crate::error::SessionError;
use mio::net::UdpSocket;
use mio::{Events, Interest, Poll, Token, Waker};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Socket 可读事件
pub(crate) const SOCKET: Token = Token(0);
/// `stop()` 唤醒事件
pub(crate) const WAKER: Token = Token(1);

/// 一次 poll 最多处理的事件数
const EVENTS_CAPACITY: usize = 16;

/// 已绑定的 UDP 端点
pub struct Endpoint {
    poll: Poll,
    events: Events,
    socket: UdpSocket,
    waker: Arc<Waker>,
    local_addr: SocketAddr,
}

impl Endpoint {
    /// 绑定到 `addr` 并注册可读事件
    ///
    /// # 错误
    /// - 绑定失败（端口被占用、权限不足、地址不可用）：[`SessionError::BindFailed`]
    /// - 事件循环或唤醒器无法创建：[`SessionError::SocketCreateFailed`]
    pub fn bind(addr: SocketAddr) -> Result<Self, SessionError> {
        let poll = Poll::new().map_err(SessionError::SocketCreateFailed)?;
        let waker = Waker::new(poll.registry(), WAKER).map_err(SessionError::SocketCreateFailed)?;

        let mut socket =
            UdpSocket::bind(addr).map_err(|source| SessionError::BindFailed { addr, source })?;
        let local_addr = socket.local_addr().map_err(SessionError::SocketCreateFailed)?;

        poll.registry()
            .register(&mut socket, SOCKET, Interest::READABLE)
            .map_err(SessionError::SocketCreateFailed)?;

        Ok(Self {
            poll,
            events: Events::with_capacity(EVENTS_CAPACITY),
            socket,
            waker: Arc::new(waker),
            local_addr,
        })
    }

    /// 实际绑定的地址（绑定端口 0 时可得知系统分配的端口）
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 唤醒器句柄（由会话持有，用于 `stop()`）
    pub fn waker(&self) -> Arc<Waker> {
        Arc::clone(&self.waker)
    }

    /// 等待事件
    ///
    /// `timeout = None` 时无限期阻塞，直到数据到达或被唤醒。
    /// 返回本轮是否包含 (可读, 唤醒) 事件。
    pub(crate) fn wait(&mut self, timeout: Option<Duration>) -> io::Result<Readiness> {
        self.poll.poll(&mut self.events, timeout)?;

        let mut readiness = Readiness::default();
        for event in self.events.iter() {
            match event.token() {
                SOCKET => readiness.readable = true,
                WAKER => readiness.woken = true,
                _ => {},
            }
        }
        Ok(readiness)
    }

    /// 非阻塞接收一个数据报
    ///
    /// 无数据时返回 `ErrorKind::WouldBlock`。
    pub(crate) fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf)
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint").field("local_addr", &self.local_addr).finish()
    }
}

/// 一轮 poll 的就绪结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Readiness {
    pub readable: bool,
    pub woken: bool,
}
