//! # 追踪器配置
//!
//! TOML 配置文件与宿主设置查询接口。
//!
//! ```toml
//! [tracker]
//! model_number = "simpletracker"
//!
//! [network]
//! bind_address = "0.0.0.0"
//! port = 8080
//!
//! [pose]
//! position = [0.0, 1.0, 0.0]
//! orientation_policy = "pass_through"
//! stream_timeout_ms = 1000
//! ```

use crate::builder::SessionConfig;
use crate::error::ConfigError;
use crate::pipeline::PipelineConfig;
use crate::state::DEFAULT_POSITION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::Duration;
use tracker_protocol::{DEFAULT_PORT, OrientationPolicy};

/// 宿主设置中的驱动分区名
pub const SETTINGS_SECTION: &str = "driver_simpletrackers";
/// 型号字段的键名
pub const MODEL_NUMBER_KEY: &str = "mytracker_model_number";
/// 未配置时使用的型号
pub const DEFAULT_MODEL_NUMBER: &str = "simpletracker";

/// 宿主设置查询接口
///
/// 追踪运行时通常提供一个按 (分区, 键) 查询字符串的设置存储。
pub trait Settings {
    /// 查询字符串设置，不存在时返回 `None`
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}

/// 追踪器配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// 设备标识
    pub tracker: TrackerSection,
    /// 网络设置
    pub network: NetworkSection,
    /// 位姿设置
    pub pose: PoseSection,
}

/// `[tracker]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSection {
    /// 型号（序列号 = 型号 + 实例编号）
    pub model_number: String,
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            model_number: DEFAULT_MODEL_NUMBER.to_string(),
        }
    }
}

/// `[network]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSection {
    pub bind_address: IpAddr,
    pub port: u16,
}

impl Default for NetworkSection {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
        }
    }
}

/// `[pose]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseSection {
    /// 固定位置偏移
    pub position: [f32; 3],
    pub orientation_policy: OrientationPolicy,
    /// 断流判定时间（毫秒）
    pub stream_timeout_ms: u64,
}

impl Default for PoseSection {
    fn default() -> Self {
        Self {
            position: DEFAULT_POSITION,
            orientation_policy: OrientationPolicy::PassThrough,
            stream_timeout_ms: 1000,
        }
    }
}

impl TrackerConfig {
    /// 从文件加载配置（缺失字段取默认值），并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析，并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 校验字段取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tracker.model_number.trim().is_empty() {
            return Err(ConfigError::Invalid("tracker.model_number must not be empty".into()));
        }
        if self.network.port == 0 {
            return Err(ConfigError::Invalid("network.port must not be 0".into()));
        }
        if !self.pose.position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "pose.position must be finite, got {:?}",
                self.pose.position
            )));
        }
        if self.pose.stream_timeout_ms == 0 {
            return Err(ConfigError::Invalid("pose.stream_timeout_ms must be > 0".into()));
        }
        Ok(())
    }

    /// 转换为会话运行参数
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            bind_address: self.network.bind_address,
            position: self.pose.position,
            pipeline: PipelineConfig {
                orientation_policy: self.pose.orientation_policy,
                ..PipelineConfig::default()
            },
            stream_timeout: Duration::from_millis(self.pose.stream_timeout_ms),
        }
    }
}

impl Settings for TrackerConfig {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        match (section, key) {
            (SETTINGS_SECTION, MODEL_NUMBER_KEY) => Some(self.tracker.model_number.clone()),
            _ => None,
        }
    }
}
