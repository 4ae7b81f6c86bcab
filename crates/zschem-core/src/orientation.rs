//! 朝向代数
//!
//! 可放置实体的朝向是 0/90/180/270 度旋转与可选镜像的组合，
//! 共 8 个状态，对应 SVG `matrix(a b c d e f)` 中 8 个合法的
//! 2x2 符号置换矩阵。该矩阵表是线格式的逐位契约之一。

use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 旋转角度（顺时针，屏幕坐标系 y 向下）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// 顺时针旋转 90 度
    pub fn next(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R90,
            Rotation::R90 => Rotation::R180,
            Rotation::R180 => Rotation::R270,
            Rotation::R270 => Rotation::R0,
        }
    }

    /// 取反角（-r mod 360）
    pub fn negated(self) -> Self {
        match self {
            Rotation::R0 => Rotation::R0,
            Rotation::R90 => Rotation::R270,
            Rotation::R180 => Rotation::R180,
            Rotation::R270 => Rotation::R90,
        }
    }
}

/// 镜像方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlipDir {
    /// 沿水平轴镜像（y 取反）
    Horiz,
    /// 沿垂直轴镜像（x 取反）
    Vert,
}

/// 朝向：旋转 + 可选镜像，8 元群
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Orientation {
    pub reflected: bool,
    pub rotation: Rotation,
}

impl Orientation {
    pub fn new(reflected: bool, rotation: Rotation) -> Self {
        Self { reflected, rotation }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    /// 顺时针旋转 90 度后的朝向
    ///
    /// 等价于左乘 R90 矩阵；镜像标志不变，旋转角 +90。
    pub fn rotated(self) -> Self {
        Self {
            reflected: self.reflected,
            rotation: self.rotation.next(),
        }
    }

    /// 镜像后的朝向
    ///
    /// 等价于左乘对应的反射矩阵。镜像标志翻转；
    /// 水平镜像旋转角取反，垂直镜像旋转角变为 180-r。
    /// 同轴镜像两次回到原朝向。
    pub fn flipped(self, dir: FlipDir) -> Self {
        let rotation = match dir {
            FlipDir::Horiz => self.rotation.negated(),
            FlipDir::Vert => self.rotation.negated().next().next(),
        };
        Self {
            reflected: !self.reflected,
            rotation,
        }
    }

    /// 合成朝向：先施加 other，再施加 self
    pub fn compose(self, other: Self) -> Self {
        let m = self.matrix().multiply(other.matrix());
        match Orientation::try_from(m) {
            Ok(o) => o,
            // 符号置换矩阵群对乘法封闭
            Err(_) => unreachable!("orientation group is closed under composition"),
        }
    }

    /// 对应的 2x2 变换矩阵
    pub fn matrix(self) -> OrientationMatrix {
        OrientationMatrix::from_orientation(self)
    }

    /// 将元件局部坐标点按该朝向变换（不含平移）
    pub fn transform(self, p: Point2) -> Point2 {
        let m = self.matrix();
        Point2::new(
            m.a as f64 * p.x + m.c as f64 * p.y,
            m.b as f64 * p.x + m.d as f64 * p.y,
        )
    }

    /// 将向量按该朝向变换
    pub fn transform_vec(self, v: Vector2) -> Vector2 {
        let m = self.matrix();
        Vector2::new(
            m.a as f64 * v.x + m.c as f64 * v.y,
            m.b as f64 * v.x + m.d as f64 * v.y,
        )
    }
}

/// 非法的朝向矩阵
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid orientation matrix ({a} {b} {c} {d}): not one of the 8 canonical matrices")]
pub struct InvalidMatrix {
    pub a: i8,
    pub b: i8,
    pub c: i8,
    pub d: i8,
}

/// SVG `matrix(a b c d e f)` 的 2x2 线性部分
///
/// 合法值限定为 8 个符号置换矩阵，与 [`Orientation`] 一一对应。
/// 列向量约定：(x, y) -> (a*x + c*y, b*x + d*y)。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrientationMatrix {
    pub a: i8,
    pub b: i8,
    pub c: i8,
    pub d: i8,
}

/// 朝向与矩阵的 8 项对照表
const MATRIX_TABLE: [(Orientation, OrientationMatrix); 8] = [
    (orient(false, Rotation::R0), mat(1, 0, 0, 1)),
    (orient(false, Rotation::R90), mat(0, 1, -1, 0)),
    (orient(false, Rotation::R180), mat(-1, 0, 0, -1)),
    (orient(false, Rotation::R270), mat(0, -1, 1, 0)),
    (orient(true, Rotation::R0), mat(1, 0, 0, -1)),
    (orient(true, Rotation::R90), mat(0, 1, 1, 0)),
    (orient(true, Rotation::R180), mat(-1, 0, 0, 1)),
    (orient(true, Rotation::R270), mat(0, -1, -1, 0)),
];

const fn orient(reflected: bool, rotation: Rotation) -> Orientation {
    Orientation { reflected, rotation }
}

const fn mat(a: i8, b: i8, c: i8, d: i8) -> OrientationMatrix {
    OrientationMatrix { a, b, c, d }
}

impl OrientationMatrix {
    pub fn identity() -> Self {
        mat(1, 0, 0, 1)
    }

    pub fn from_orientation(o: Orientation) -> Self {
        for (cand, m) in MATRIX_TABLE {
            if cand == o {
                return m;
            }
        }
        unreachable!("orientation table covers all 8 states")
    }

    /// 矩阵乘法 self * rhs（均为符号置换矩阵，积仍在群内）
    pub fn multiply(self, rhs: Self) -> Self {
        mat(
            self.a * rhs.a + self.c * rhs.b,
            self.b * rhs.a + self.d * rhs.b,
            self.a * rhs.c + self.c * rhs.d,
            self.b * rhs.c + self.d * rhs.d,
        )
    }
}

impl TryFrom<OrientationMatrix> for Orientation {
    type Error = InvalidMatrix;

    fn try_from(m: OrientationMatrix) -> Result<Self, Self::Error> {
        for (o, cand) in MATRIX_TABLE {
            if cand == m {
                return Ok(o);
            }
        }
        Err(InvalidMatrix {
            a: m.a,
            b: m.b,
            c: m.c,
            d: m.d,
        })
    }
}
