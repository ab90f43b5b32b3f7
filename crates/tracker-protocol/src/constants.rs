//! 协议常量定义

/// 单个浮点字段的字节数
pub const FIELD_SIZE: usize = 4;

/// 每个样本的浮点字段数（w, x, y, z, ax, ay, az）
pub const FIELD_COUNT: usize = 7;

/// `WireSample` 的线上字节数（7 × 4 = 28，无填充）
pub const WIRE_SAMPLE_SIZE: usize = FIELD_COUNT * FIELD_SIZE;

/// 默认 UDP 监听端口
pub const DEFAULT_PORT: u16 = 8080;

/// 各字段在数据包内的字节偏移
pub mod offsets {
    pub const W: usize = 0;
    pub const X: usize = 4;
    pub const Y: usize = 8;
    pub const Z: usize = 12;
    pub const AX: usize = 16;
    pub const AY: usize = 20;
    pub const AZ: usize = 24;
}
