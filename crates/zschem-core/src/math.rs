//! 基础数学类型与网格对齐
//!
//! 所有可放置实体的坐标都对齐到 10 单位网格。

use serde::{Deserialize, Serialize};

/// 二维点
pub type Point2 = nalgebra::Point2<f64>;

/// 二维向量
pub type Vector2 = nalgebra::Vector2<f64>;

/// 浮点比较容差
pub const EPSILON: f64 = 1e-6;

/// 网格间距
pub const GRID: f64 = 10.0;

/// 将坐标对齐到最近的网格点
///
/// 两个坐标分别取最近的 GRID 倍数。平局（恰好位于两个网格点中间）
/// 采用 `f64::round` 的远离零方向舍入，例如 5.0 -> 10.0，-5.0 -> -10.0。
/// 网格点对齐自身，因此该操作是幂等的。
pub fn nearest_on_grid(p: Point2) -> Point2 {
    Point2::new((p.x / GRID).round() * GRID, (p.y / GRID).round() * GRID)
}

/// 检查点是否已位于网格上
pub fn is_on_grid(p: Point2) -> bool {
    (p.x - (p.x / GRID).round() * GRID).abs() < EPSILON
        && (p.y - (p.y / GRID).round() * GRID).abs() < EPSILON
}

/// 可放置实体的位置与朝向
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub loc: Point2,
    pub orientation: crate::orientation::Orientation,
}

impl Place {
    pub fn new(loc: Point2, orientation: crate::orientation::Orientation) -> Self {
        Self { loc, orientation }
    }
}
