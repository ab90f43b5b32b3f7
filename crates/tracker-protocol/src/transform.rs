//! 坐标系转换
//!
//! 传感器坐标系为 Z-Up，消费端（追踪运行时）为 Y-Up。映射关系：
//!
//! ```text
//! 消费端 X =  传感器 X
//! 消费端 Y =  传感器 Z
//! 消费端 Z = -传感器 Y
//! ```
//!
//! 只转换姿态；加速度保持传感器坐标系。

use crate::quaternion::Quaternion;

/// 传感器坐标系 → 消费端坐标系
///
/// 固定的轴置换 + 符号翻转，纯函数，不做归一化。
///
/// # 示例
///
/// ```rust
/// use tracker_protocol::{Quaternion, to_consumer_frame};
///
/// let q = to_consumer_frame(Quaternion::new(0.0, 0.0, 1.0, 0.0));
/// assert_eq!(q, Quaternion::new(0.0, 0.0, 0.0, -1.0));
/// ```
#[inline]
pub fn to_consumer_frame(q: Quaternion) -> Quaternion {
    Quaternion {
        w: q.w,
        x: q.x,
        y: q.z,
        z: -q.y,
    }
}

/// 转换后四元数的处理策略
///
/// 传感器发出的四元数不保证严格单位化。默认原样透传，
/// 下游对非单位四元数敏感时可选择 `Normalize`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum OrientationPolicy {
    /// 原样透传（默认）
    #[default]
    PassThrough,
    /// 重新归一化；退化输入（零模长、NaN/Inf）回退为单位四元数
    Normalize,
}

impl OrientationPolicy {
    /// 对消费端坐标系下的四元数应用策略
    pub fn apply(self, q: Quaternion) -> Quaternion {
        match self {
            Self::PassThrough => q,
            Self::Normalize => q.normalized().unwrap_or(Quaternion::IDENTITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identity_unchanged() {
        assert_eq!(to_consumer_frame(Quaternion::IDENTITY), Quaternion::IDENTITY);
    }

    #[test]
    fn test_sensor_y_becomes_negative_consumer_z() {
        let q = to_consumer_frame(Quaternion::new(0.0, 0.0, 1.0, 0.0));
        assert_eq!(q, Quaternion::new(0.0, 0.0, 0.0, -1.0));
    }

    #[test]
    fn test_sensor_z_becomes_consumer_y() {
        let q = to_consumer_frame(Quaternion::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(q, Quaternion::new(0.0, 0.0, 1.0, 0.0));
    }

    #[test]
    fn test_x_axis_pass_through() {
        let q = to_consumer_frame(Quaternion::new(0.0, 1.0, 0.0, 0.0));
        assert_eq!(q, Quaternion::new(0.0, 1.0, 0.0, 0.0));
    }

    #[test]
    fn test_not_an_involution() {
        // 连续应用两次不会回到原值：(w, x, y, z) → (w, x, -y, -z)
        let q = Quaternion::new(0.1, 0.2, 0.3, 0.4);
        let twice = to_consumer_frame(to_consumer_frame(q));
        assert_eq!(twice, Quaternion::new(0.1, 0.2, -0.3, -0.4));
        assert_ne!(twice, q);
    }

    #[test]
    fn test_no_normalization_by_default() {
        let q = Quaternion::new(2.0, 0.0, 0.0, 0.0);
        let out = OrientationPolicy::default().apply(to_consumer_frame(q));
        assert_eq!(out.w, 2.0);
    }

    #[test]
    fn test_normalize_policy() {
        let out = OrientationPolicy::Normalize.apply(Quaternion::new(0.0, 0.0, 0.0, 3.0));
        assert_eq!(out, Quaternion::new(0.0, 0.0, 0.0, 1.0));

        let degenerate = OrientationPolicy::Normalize.apply(Quaternion::new(0.0, 0.0, 0.0, 0.0));
        assert_eq!(degenerate, Quaternion::IDENTITY);
    }

    proptest! {
        /// (w, x, y, z) → (w, x, z, -y)，逐分量确定
        #[test]
        fn transform_permutes_axes(
            w in -1.0f32..1.0, x in -1.0f32..1.0, y in -1.0f32..1.0, z in -1.0f32..1.0
        ) {
            let out = to_consumer_frame(Quaternion::new(w, x, y, z));
            prop_assert_eq!(out, Quaternion::new(w, x, z, -y));
        }

        /// 轴置换保持模长
        #[test]
        fn transform_preserves_norm(
            w in -1.0f32..1.0, x in -1.0f32..1.0, y in -1.0f32..1.0, z in -1.0f32..1.0
        ) {
            let q = Quaternion::new(w, x, y, z);
            prop_assert!((to_consumer_frame(q).norm_squared() - q.norm_squared()).abs() < 1e-6);
        }
    }
}
