//! 原理图实体模型
//!
//! 实体种类是封闭枚举：Instance / Port / Wire / Label / Dot / InstancePort。
//! 命中测试等分派通过穷举 match 实现，新增种类时编译器强制补全。
//!
//! Label、Dot、InstancePort 是派生实体：Label 随 Instance/Port 创建，
//! Dot 由导线交汇推导，InstancePort 由元件连接点推导。

use crate::element::{Element, PortElement, PortKind};
use crate::math::{Place, Point2, EPSILON};
use crate::orientation::{FlipDir, Orientation};
use crate::registry::ElementRegistry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 实体唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// 未分配标记；加入原理图时替换为有效 ID
    pub const UNASSIGNED: EntityId = EntityId(0);

    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

/// 渲染线宽；命中测试容差取其一半
pub const WIRE_STROKE: f64 = 10.0;

/// 标签文字高度（用于命中测试的包围盒估算）
pub const TEXT_HEIGHT: f64 = 16.0;

/// 交点标记半径
pub const DOT_RADIUS: f64 = 4.0;

/// 数据模型错误
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("duplicate name '{0}'")]
    DuplicateName(String),

    #[error("entity {0} not found")]
    EntityNotFound(u64),

    #[error("wire must contain at least one point")]
    EmptyWire,

    #[error("wire segment {index} is not axis-aligned: ({x0}, {y0}) -> ({x1}, {y1})")]
    NonManhattanWire {
        index: usize,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
    },

    #[error("unknown element kind '{0}'")]
    UnknownElement(String),

    #[error("invalid change: {0}")]
    InvalidChange(String),
}

/// 标签种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabelKind {
    InstanceName,
    InstanceOf,
    PortName,
}

/// 附着于父实体的文本标签
///
/// 不可单独创建，由父实体的锚点与朝向派生；文本可原地编辑。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub parent: EntityId,
    pub kind: LabelKind,
    pub text: String,
    pub loc: Point2,
    pub orientation: Orientation,
}

impl Label {
    /// 文本包围盒估算命中（按等宽近似，参考字符宽 0.6 倍字高）
    pub fn hit_test(&self, pos: &Point2, tol: f64) -> bool {
        let width = self.text.chars().count() as f64 * TEXT_HEIGHT * 0.6;
        pos.x >= self.loc.x - tol
            && pos.x <= self.loc.x + width + tol
            && pos.y >= self.loc.y - TEXT_HEIGHT - tol
            && pos.y <= self.loc.y + tol
    }
}

/// 元件实例
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: EntityId,
    /// 实例名，在原理图内唯一
    pub name: String,
    /// 器件定义表达式，如 `Nmos(w=1u,l=20n)`
    pub of: String,
    /// 元件种类标识（注册表键 / SVG class 后缀）
    pub kind: String,
    pub loc: Point2,
    pub orientation: Orientation,
}

impl Instance {
    pub fn new(
        name: impl Into<String>,
        of: impl Into<String>,
        kind: impl Into<String>,
        loc: Point2,
        orientation: Orientation,
    ) -> Self {
        Self {
            id: EntityId::UNASSIGNED,
            name: name.into(),
            of: of.into(),
            kind: kind.into(),
            loc,
            orientation,
        }
    }

    /// 顺时针旋转 90 度
    pub fn rotate(&mut self) {
        self.orientation = self.orientation.rotated();
    }

    /// 镜像
    pub fn flip(&mut self, dir: FlipDir) {
        self.orientation = self.orientation.flipped(dir);
    }

    pub fn place(&self) -> Place {
        Place::new(self.loc, self.orientation)
    }

    /// 将元件局部坐标变换到原理图坐标
    pub fn to_schematic(&self, local: Point2) -> Point2 {
        let t = self.orientation.transform(local);
        Point2::new(self.loc.x + t.x, self.loc.y + t.y)
    }

    /// 两个派生标签（名称、of）
    pub fn labels(&self, elem: &Element) -> [Label; 2] {
        [
            Label {
                parent: self.id,
                kind: LabelKind::InstanceName,
                text: self.name.clone(),
                loc: self.to_schematic(elem.symbol.name_loc),
                orientation: self.orientation,
            },
            Label {
                parent: self.id,
                kind: LabelKind::InstanceOf,
                text: self.of.clone(),
                loc: self.to_schematic(elem.symbol.of_loc),
                orientation: self.orientation,
            },
        ]
    }

    /// 派生的元件连接点
    pub fn ports(&self, elem: &Element) -> Vec<InstancePort> {
        elem.symbol
            .ports
            .iter()
            .map(|p| InstancePort {
                parent: self.id,
                port: p.name.clone(),
                loc: self.to_schematic(p.loc),
            })
            .collect()
    }

    fn hit_test(&self, pos: &Point2, tol: f64, elem: &Element) -> bool {
        bbox_hit(self.loc, self.orientation, elem.symbol.bbox, pos, tol)
    }
}

/// 外部接口端口
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchPort {
    pub id: EntityId,
    pub kind: PortKind,
    /// 端口名；隐名种类（gnd/vdd）由种类固定
    pub name: String,
    pub loc: Point2,
    pub orientation: Orientation,
}

impl SchPort {
    pub fn new(kind: PortKind, name: impl Into<String>, loc: Point2, orientation: Orientation) -> Self {
        let name = match kind.implicit_name() {
            Some(fixed) => fixed.to_string(),
            None => name.into(),
        };
        Self {
            id: EntityId::UNASSIGNED,
            kind,
            name,
            loc,
            orientation,
        }
    }

    pub fn rotate(&mut self) {
        self.orientation = self.orientation.rotated();
    }

    pub fn flip(&mut self, dir: FlipDir) {
        self.orientation = self.orientation.flipped(dir);
    }

    pub fn place(&self) -> Place {
        Place::new(self.loc, self.orientation)
    }

    /// 是否携带名称标签
    pub fn has_label(&self) -> bool {
        self.kind.implicit_name().is_none()
    }

    /// 派生的名称标签（隐名端口无标签）
    pub fn label(&self, elem: &PortElement) -> Option<Label> {
        let anchor = elem.name_loc?;
        let t = self.orientation.transform(anchor);
        Some(Label {
            parent: self.id,
            kind: LabelKind::PortName,
            text: self.name.clone(),
            loc: Point2::new(self.loc.x + t.x, self.loc.y + t.y),
            orientation: self.orientation,
        })
    }

    fn hit_test(&self, pos: &Point2, tol: f64, elem: &PortElement) -> bool {
        bbox_hit(self.loc, self.orientation, elem.bbox, pos, tol)
    }
}

/// 曼哈顿线段
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub a: Point2,
    pub b: Point2,
}

impl Segment {
    /// 点到线段的命中：垂直距离在容差内且投影落在线段范围内
    pub fn hit_test(&self, pos: &Point2, tol: f64) -> bool {
        let (min_x, max_x) = ordered(self.a.x, self.b.x);
        let (min_y, max_y) = ordered(self.a.y, self.b.y);
        if (self.a.y - self.b.y).abs() < EPSILON {
            // 水平段
            (pos.y - self.a.y).abs() <= tol && pos.x >= min_x - tol && pos.x <= max_x + tol
        } else {
            // 垂直段
            (pos.x - self.a.x).abs() <= tol && pos.y >= min_y - tol && pos.y <= max_y + tol
        }
    }
}

fn ordered(u: f64, v: f64) -> (f64, f64) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

/// 导线：非空的曼哈顿点序列
///
/// 线名标注是不透明的可视文本，只随线格式往返；
/// 连接性推导不读它。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wire {
    pub id: EntityId,
    pub points: Vec<Point2>,
    /// 可选的线名标注文本
    pub name: Option<String>,
}

impl Wire {
    /// 创建导线，拒绝空序列与非轴对齐的相邻点对
    pub fn new(points: Vec<Point2>) -> Result<Self, ModelError> {
        validate_manhattan(&points)?;
        Ok(Self {
            id: EntityId::UNASSIGNED,
            points,
            name: None,
        })
    }

    /// 相邻点对构成的线段
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points.windows(2).map(|w| Segment { a: w[0], b: w[1] })
    }

    /// 终端端点（首尾点；单点导线两者相同）
    pub fn endpoints(&self) -> Vec<Point2> {
        match self.points.as_slice() {
            [] => vec![],
            [p] => vec![*p],
            [first, .., last] => vec![*first, *last],
        }
    }

    /// 点是否落在导线路径上（严格几何，容差 EPSILON）
    pub fn on_path(&self, p: &Point2) -> bool {
        if self.points.len() == 1 {
            return (self.points[0] - p).norm() < EPSILON;
        }
        self.segments().any(|s| s.hit_test(p, EPSILON))
    }

    /// 点是否为终端端点
    pub fn is_endpoint(&self, p: &Point2) -> bool {
        self.endpoints().iter().any(|e| (e - p).norm() < EPSILON)
    }

    /// 整条导线的命中测试：各线段命中的逻辑或
    pub fn hit_test(&self, pos: &Point2, tol: f64) -> bool {
        if self.points.len() == 1 {
            return (self.points[0] - pos).norm() <= tol;
        }
        self.segments().any(|s| s.hit_test(pos, tol))
    }
}

/// 校验点序列的曼哈顿性质：相邻点对恰有一个坐标不同
pub fn validate_manhattan(points: &[Point2]) -> Result<(), ModelError> {
    if points.is_empty() {
        return Err(ModelError::EmptyWire);
    }
    for (index, w) in points.windows(2).enumerate() {
        let dx = (w[1].x - w[0].x).abs() > EPSILON;
        let dy = (w[1].y - w[0].y).abs() > EPSILON;
        if dx == dy {
            // 对角段或零长段
            return Err(ModelError::NonManhattanWire {
                index,
                x0: w[0].x,
                y0: w[0].y,
                x1: w[1].x,
                y1: w[1].y,
            });
        }
    }
    Ok(())
}

/// 交点标记：纯派生，可随时从导线集合重建
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dot {
    pub loc: Point2,
}

impl Dot {
    pub fn hit_test(&self, pos: &Point2, tol: f64) -> bool {
        (self.loc - pos).norm() <= DOT_RADIUS + tol
    }
}

/// 派生的元件连接点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstancePort {
    pub parent: EntityId,
    pub port: String,
    pub loc: Point2,
}

impl InstancePort {
    pub fn hit_test(&self, pos: &Point2, tol: f64) -> bool {
        (self.loc - pos).norm() <= tol
    }
}

/// 实体联合，封闭枚举
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Instance(Instance),
    Port(SchPort),
    Wire(Wire),
    Label(Label),
    Dot(Dot),
    InstancePort(InstancePort),
}

impl Entity {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Entity::Instance(_) => "Instance",
            Entity::Port(_) => "Port",
            Entity::Wire(_) => "Wire",
            Entity::Label(_) => "Label",
            Entity::Dot(_) => "Dot",
            Entity::InstancePort(_) => "InstancePort",
        }
    }

    /// 实体自身的 ID（派生实体没有独立 ID）
    pub fn id(&self) -> Option<EntityId> {
        match self {
            Entity::Instance(i) => Some(i.id),
            Entity::Port(p) => Some(p.id),
            Entity::Wire(w) => Some(w.id),
            Entity::Label(l) => Some(l.parent),
            Entity::Dot(_) => None,
            Entity::InstancePort(p) => Some(p.parent),
        }
    }

    /// 可放置实体的位置与朝向
    pub fn place(&self) -> Option<Place> {
        match self {
            Entity::Instance(i) => Some(i.place()),
            Entity::Port(p) => Some(p.place()),
            Entity::Wire(_) | Entity::Label(_) | Entity::Dot(_) | Entity::InstancePort(_) => None,
        }
    }

    /// 命中测试，容差为线宽之半
    ///
    /// Instance/Port 需要从注册表解析符号包围盒；未知种类视为未命中。
    pub fn hit_test(&self, pos: &Point2, registry: &ElementRegistry) -> bool {
        let tol = WIRE_STROKE / 2.0;
        match self {
            Entity::Instance(i) => registry
                .element(&i.kind)
                .map(|e| i.hit_test(pos, tol, e))
                .unwrap_or(false),
            Entity::Port(p) => registry
                .port_element(p.kind)
                .map(|e| p.hit_test(pos, tol, e))
                .unwrap_or(false),
            Entity::Wire(w) => w.hit_test(pos, tol),
            Entity::Label(l) => l.hit_test(pos, tol),
            Entity::Dot(d) => d.hit_test(pos, tol),
            Entity::InstancePort(p) => p.hit_test(pos, tol),
        }
    }
}

/// 包围盒按朝向变换后的命中测试
fn bbox_hit(
    loc: Point2,
    orientation: Orientation,
    bbox: (Point2, Point2),
    pos: &Point2,
    tol: f64,
) -> bool {
    let c1 = orientation.transform(bbox.0);
    let c2 = orientation.transform(bbox.1);
    let min_x = loc.x + c1.x.min(c2.x) - tol;
    let max_x = loc.x + c1.x.max(c2.x) + tol;
    let min_y = loc.y + c1.y.min(c2.y) - tol;
    let max_y = loc.y + c1.y.max(c2.y) + tol;
    pos.x >= min_x && pos.x <= max_x && pos.y >= min_y && pos.y <= max_y
}
