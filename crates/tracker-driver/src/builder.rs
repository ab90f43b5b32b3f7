//! Builder 模式实现
//!
//! 提供链式构造 `PoseSession` 实例的便捷方式。

use crate::heartbeat::ConnectionMonitor;
use crate::pipeline::PipelineConfig;
use crate::session::PoseSession;
use crate::state::DEFAULT_POSITION;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tracker_protocol::OrientationPolicy;

/// 会话运行参数
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// 绑定地址（端口由 `start()` 提供），默认 `0.0.0.0`
    pub bind_address: IpAddr,
    /// 固定位置偏移
    pub position: [f32; 3],
    /// Pipeline 配置（姿态策略、接收缓冲区）
    pub pipeline: PipelineConfig,
    /// 多久没有样本算作"断流"
    pub stream_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            position: DEFAULT_POSITION,
            pipeline: PipelineConfig::default(),
            stream_timeout: ConnectionMonitor::DEFAULT_TIMEOUT,
        }
    }
}

/// Session Builder（链式构造）
///
/// # Example
///
/// ```
/// use tracker_driver::SessionBuilder;
/// use tracker_protocol::OrientationPolicy;
/// use std::net::Ipv4Addr;
///
/// let session = SessionBuilder::new()
///     .bind_address(Ipv4Addr::LOCALHOST.into())
///     .position([0.0, 1.2, 0.0])
///     .orientation_policy(OrientationPolicy::Normalize)
///     .build();
///
/// assert_eq!(session.current_pose().position, [0.0, 1.2, 0.0]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SessionBuilder {
    config: SessionConfig,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从已有配置开始构造
    pub fn from_config(config: SessionConfig) -> Self {
        Self { config }
    }

    /// 设置绑定地址（默认 `0.0.0.0`）
    pub fn bind_address(mut self, address: IpAddr) -> Self {
        self.config.bind_address = address;
        self
    }

    /// 设置固定位置（默认 `[0.0, 1.0, 0.0]`）
    pub fn position(mut self, position: [f32; 3]) -> Self {
        self.config.position = position;
        self
    }

    /// 设置姿态策略（默认 `PassThrough`）
    pub fn orientation_policy(mut self, policy: OrientationPolicy) -> Self {
        self.config.pipeline.orientation_policy = policy;
        self
    }

    /// 设置接收缓冲区大小（默认 2048 字节）
    ///
    /// 小于 29 字节的值会在接收线程中被提升到 29，保证超长数据报能被识别。
    pub fn recv_buffer_size(mut self, size: usize) -> Self {
        self.config.pipeline.recv_buffer_size = size;
        self
    }

    /// 设置断流判定时间（默认 1 秒）
    pub fn stream_timeout(mut self, timeout: Duration) -> Self {
        self.config.stream_timeout = timeout;
        self
    }

    /// 构造处于 Idle 状态的会话
    pub fn build(self) -> PoseSession {
        PoseSession::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::DEFAULT_RECV_BUFFER_SIZE;

    #[test]
    fn test_builder_defaults() {
        let builder = SessionBuilder::new();
        assert_eq!(builder.config, SessionConfig::default());
        assert_eq!(builder.config.bind_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(builder.config.pipeline.recv_buffer_size, DEFAULT_RECV_BUFFER_SIZE);
        assert_eq!(builder.config.stream_timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_builder_chain() {
        let builder = SessionBuilder::new()
            .bind_address(IpAddr::V4(Ipv4Addr::LOCALHOST))
            .position([1.0, 2.0, 3.0])
            .orientation_policy(OrientationPolicy::Normalize)
            .recv_buffer_size(512)
            .stream_timeout(Duration::from_millis(250));

        let config = builder.config;
        assert_eq!(config.bind_address, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.position, [1.0, 2.0, 3.0]);
        assert_eq!(config.pipeline.orientation_policy, OrientationPolicy::Normalize);
        assert_eq!(config.pipeline.recv_buffer_size, 512);
        assert_eq!(config.stream_timeout, Duration::from_millis(250));
    }
}
