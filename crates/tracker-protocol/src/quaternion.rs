//! 四元数类型
//!
//! W-first 约定：`(w, x, y, z)`，`w` 为实部。

/// 姿态四元数（W-first）
///
/// 本类型只是一个数据载体：协议层不会主动归一化，
/// 是否归一化由 [`OrientationPolicy`](crate::OrientationPolicy) 决定。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quaternion {
    /// 单位四元数（无旋转）
    pub const IDENTITY: Self = Self {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }

    /// 模长的平方
    pub fn norm_squared(&self) -> f32 {
        self.w * self.w + self.x * self.x + self.y * self.y + self.z * self.z
    }

    /// 模长
    pub fn norm(&self) -> f32 {
        self.norm_squared().sqrt()
    }

    /// 是否所有分量都是有限值
    pub fn is_finite(&self) -> bool {
        self.w.is_finite() && self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// 返回归一化后的四元数
    ///
    /// 模长为 0 或包含非有限值时返回 `None`。
    pub fn normalized(&self) -> Option<Self> {
        let norm = self.norm();
        if !norm.is_finite() || norm <= f32::EPSILON {
            return None;
        }
        Some(Self {
            w: self.w / norm,
            x: self.x / norm,
            y: self.y / norm,
            z: self.z / norm,
        })
    }

    /// 以数组形式返回 `[w, x, y, z]`
    pub fn to_array(&self) -> [f32; 4] {
        [self.w, self.x, self.y, self.z]
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 4]> for Quaternion {
    fn from([w, x, y, z]: [f32; 4]) -> Self {
        Self { w, x, y, z }
    }
}
