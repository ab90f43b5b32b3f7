//! 驱动层错误类型定义

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// 会话错误类型
///
/// 只有 `start()` 会同步返回这些错误；接收循环运行期间的错误
/// 只记录日志，不会跨线程传播。
#[derive(Error, Debug)]
pub enum SessionError {
    /// 传输层初始化失败（事件轮询器、唤醒器或 Socket 注册）
    #[error("Failed to initialize UDP transport: {0}")]
    SocketCreateFailed(#[source] io::Error),

    /// 端口绑定失败（端口被占用、权限不足等）
    #[error("Failed to bind UDP socket on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// 会话已在运行
    #[error("Session is already running")]
    AlreadyRunning,

    /// 接收线程创建失败
    #[error("Failed to spawn receive thread: {0}")]
    WorkerSpawn(#[source] io::Error),
}

/// 设备激活错误
#[derive(Error, Debug)]
pub enum DeviceError {
    /// 会话启动失败
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// 配置无效
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 读取/写入配置文件失败
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML 解析失败
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML 序列化失败
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// 字段取值无效
    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_error_display() {
        let addr: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let err = SessionError::BindFailed {
            addr,
            source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("0.0.0.0:8080"), "message: {}", msg);
        assert!(msg.contains("address in use"), "message: {}", msg);

        let err = SessionError::AlreadyRunning;
        assert_eq!(format!("{}", err), "Session is already running");

        let err = SessionError::SocketCreateFailed(io::Error::other("no fd"));
        assert!(format!("{}", err).contains("no fd"));
    }

    #[test]
    fn test_from_session_error() {
        let err: DeviceError = SessionError::AlreadyRunning.into();
        match err {
            DeviceError::Session(SessionError::AlreadyRunning) => {},
            other => panic!("Expected Session variant, got {:?}", other),
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Invalid("port must not be 0".to_string());
        assert_eq!(format!("{}", err), "Invalid config: port must not be 0");
    }
}
