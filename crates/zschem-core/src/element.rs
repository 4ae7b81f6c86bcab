//! 元件目录描述符
//!
//! `Element` 与 `PortElement` 是不可变的"种类"描述，不属于原理图内容：
//! - 符号图形（SVG path 数据 + 命名连接点）
//! - 默认实例名前缀与默认 of 字符串
//! - 名称/of 标签的锚点
//!
//! 内建目录覆盖常用晶体管/无源器件/源；PDK 器件与自定义符号
//! 在运行时由注册表构建（见 registry 模块）。

use crate::math::Point2;
use serde::{Deserialize, Serialize};

/// 符号上的命名连接点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolPort {
    pub name: String,
    pub loc: Point2,
}

impl SymbolPort {
    pub fn new(name: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            name: name.into(),
            loc: Point2::new(x, y),
        }
    }
}

/// 符号图形：绘制图元、连接点与标签锚点
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// SVG path 的 d 数据，逐条绘制
    pub paths: Vec<String>,
    /// 命名连接点（局部坐标）
    pub ports: Vec<SymbolPort>,
    /// 局部坐标包围盒 (min, max)，用于命中测试
    pub bbox: (Point2, Point2),
    /// 名称标签锚点
    pub name_loc: Point2,
    /// of 标签锚点
    pub of_loc: Point2,
}

/// 元件种类描述符
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// 种类标识，同时是 SVG class 后缀（如 "nmos"、"pdk.gf180.nfet_03v3"）
    pub id: String,
    /// 默认实例名前缀
    pub name_prefix: String,
    /// 默认 of 字符串
    pub default_of: String,
    pub symbol: Symbol,
}

impl Element {
    pub fn new(
        id: impl Into<String>,
        name_prefix: impl Into<String>,
        default_of: impl Into<String>,
        symbol: Symbol,
    ) -> Self {
        Self {
            id: id.into(),
            name_prefix: name_prefix.into(),
            default_of: default_of.into(),
            symbol,
        }
    }
}

/// 端口种类（外部接口端子），封闭枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    Input,
    Output,
    Inout,
    Gnd,
    Vdd,
}

impl PortKind {
    /// SVG class 后缀
    pub fn tag(self) -> &'static str {
        match self {
            PortKind::Input => "input",
            PortKind::Output => "output",
            PortKind::Inout => "inout",
            PortKind::Gnd => "gnd",
            PortKind::Vdd => "vdd",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "input" => Some(PortKind::Input),
            "output" => Some(PortKind::Output),
            "inout" => Some(PortKind::Inout),
            "gnd" => Some(PortKind::Gnd),
            "vdd" => Some(PortKind::Vdd),
            _ => None,
        }
    }

    /// 隐含固定名称的端口种类（如地）不携带名称标签
    pub fn implicit_name(self) -> Option<&'static str> {
        match self {
            PortKind::Gnd => Some("gnd"),
            PortKind::Vdd => Some("vdd"),
            _ => None,
        }
    }
}

/// 端口符号描述符
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortElement {
    pub kind: PortKind,
    /// SVG path 的 d 数据
    pub paths: Vec<String>,
    /// 局部坐标包围盒 (min, max)
    pub bbox: (Point2, Point2),
    /// 名称标签锚点（隐名端口为 None）
    pub name_loc: Option<Point2>,
}

fn symbol(
    paths: &[&str],
    ports: Vec<SymbolPort>,
    bbox: ((f64, f64), (f64, f64)),
    name_loc: (f64, f64),
    of_loc: (f64, f64),
) -> Symbol {
    Symbol {
        paths: paths.iter().map(|s| s.to_string()).collect(),
        ports,
        bbox: (
            Point2::new(bbox.0 .0, bbox.0 .1),
            Point2::new(bbox.1 .0, bbox.1 .1),
        ),
        name_loc: Point2::new(name_loc.0, name_loc.1),
        of_loc: Point2::new(of_loc.0, of_loc.1),
    }
}

/// 内建元件目录
///
/// 顺序即注册顺序；id 与线格式中的 class 后缀一致。
pub fn builtin_elements() -> Vec<Element> {
    vec![
        Element::new(
            "nmos",
            "n",
            "Nmos()",
            symbol(
                &[
                    "M 0 0 L 0 28 L -28 28 L -28 52 L 0 52 L 0 80",
                    "M -40 20 L -40 60",
                    "M 0 52 L 20 52 L 20 80",
                    "M -10 60 L -4 52 L -10 44",
                ],
                vec![
                    SymbolPort::new("d", 0.0, 0.0),
                    SymbolPort::new("g", -40.0, 40.0),
                    SymbolPort::new("s", 0.0, 80.0),
                    SymbolPort::new("b", 20.0, 80.0),
                ],
                ((-40.0, 0.0), (20.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "pmos",
            "p",
            "Pmos()",
            symbol(
                &[
                    "M 0 0 L 0 28 L -28 28 L -28 52 L 0 52 L 0 80",
                    "M -40 20 L -40 60",
                    "M 0 28 L 20 28 L 20 0",
                    "M -36 40 A 4 4 0 1 0 -28 40 A 4 4 0 1 0 -36 40",
                ],
                vec![
                    SymbolPort::new("d", 0.0, 80.0),
                    SymbolPort::new("g", -40.0, 40.0),
                    SymbolPort::new("s", 0.0, 0.0),
                    SymbolPort::new("b", 20.0, 0.0),
                ],
                ((-40.0, 0.0), (20.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "npn",
            "q",
            "Npn()",
            symbol(
                &[
                    "M 0 0 L 0 24 L -20 36 M -20 44 L 0 56 L 0 80",
                    "M -20 24 L -20 56",
                    "M -40 40 L -20 40",
                    "M -8 50 L 0 56 L -6 62",
                ],
                vec![
                    SymbolPort::new("c", 0.0, 0.0),
                    SymbolPort::new("b", -40.0, 40.0),
                    SymbolPort::new("e", 0.0, 80.0),
                ],
                ((-40.0, 0.0), (0.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "pnp",
            "q",
            "Pnp()",
            symbol(
                &[
                    "M 0 0 L 0 24 L -20 36 M -20 44 L 0 56 L 0 80",
                    "M -20 24 L -20 56",
                    "M -40 40 L -20 40",
                    "M -14 32 L -20 36 L -12 40",
                ],
                vec![
                    SymbolPort::new("c", 0.0, 80.0),
                    SymbolPort::new("b", -40.0, 40.0),
                    SymbolPort::new("e", 0.0, 0.0),
                ],
                ((-40.0, 0.0), (0.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "res",
            "r",
            "Res()",
            symbol(
                &["M 0 0 L 0 20 L 10 25 L -10 35 L 10 45 L -10 55 L 0 60 L 0 80"],
                vec![
                    SymbolPort::new("p", 0.0, 0.0),
                    SymbolPort::new("n", 0.0, 80.0),
                ],
                ((-10.0, 0.0), (10.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "res3",
            "r",
            "Res3()",
            symbol(
                &[
                    "M 0 0 L 0 20 L 10 25 L -10 35 L 10 45 L -10 55 L 0 60 L 0 80",
                    "M -10 40 L -20 40",
                ],
                vec![
                    SymbolPort::new("p", 0.0, 0.0),
                    SymbolPort::new("n", 0.0, 80.0),
                    SymbolPort::new("b", -20.0, 40.0),
                ],
                ((-20.0, 0.0), (10.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "cap",
            "c",
            "Cap()",
            symbol(
                &["M 0 0 L 0 34 M -16 34 L 16 34 M -16 46 L 16 46 M 0 46 L 0 80"],
                vec![
                    SymbolPort::new("p", 0.0, 0.0),
                    SymbolPort::new("n", 0.0, 80.0),
                ],
                ((-16.0, 0.0), (16.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "ind",
            "l",
            "Ind()",
            symbol(
                &["M 0 0 L 0 20 A 8 8 0 0 1 0 36 A 8 8 0 0 1 0 52 A 8 8 0 0 1 0 60 L 0 80"],
                vec![
                    SymbolPort::new("p", 0.0, 0.0),
                    SymbolPort::new("n", 0.0, 80.0),
                ],
                ((-8.0, 0.0), (8.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "diode",
            "d",
            "Diode()",
            symbol(
                &[
                    "M 0 0 L 0 30 M -16 30 L 16 30 L 0 50 L -16 30 M -16 50 L 16 50 M 0 50 L 0 80",
                ],
                vec![
                    SymbolPort::new("p", 0.0, 0.0),
                    SymbolPort::new("n", 0.0, 80.0),
                ],
                ((-16.0, 0.0), (16.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "vsource",
            "v",
            "Vdc()",
            symbol(
                &[
                    "M 0 0 L 0 20 M 0 60 L 0 80",
                    "M 0 20 A 20 20 0 1 0 0 60 A 20 20 0 1 0 0 20",
                    "M 0 28 L 0 38 M -5 33 L 5 33 M -5 48 L 5 48",
                ],
                vec![
                    SymbolPort::new("p", 0.0, 0.0),
                    SymbolPort::new("n", 0.0, 80.0),
                ],
                ((-20.0, 0.0), (20.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
        Element::new(
            "isource",
            "i",
            "Idc()",
            symbol(
                &[
                    "M 0 0 L 0 20 M 0 60 L 0 80",
                    "M 0 20 A 20 20 0 1 0 0 60 A 20 20 0 1 0 0 20",
                    "M 0 50 L 0 30 M -4 36 L 0 30 L 4 36",
                ],
                vec![
                    SymbolPort::new("p", 0.0, 0.0),
                    SymbolPort::new("n", 0.0, 80.0),
                ],
                ((-20.0, 0.0), (20.0, 80.0)),
                (10.0, 20.0),
                (10.0, 60.0),
            ),
        ),
    ]
}

/// 内建端口符号目录
pub fn builtin_port_elements() -> Vec<PortElement> {
    vec![
        PortElement {
            kind: PortKind::Input,
            paths: vec!["M -50 -10 L -20 -10 L 0 0 L -20 10 L -50 10 Z".to_string()],
            bbox: (Point2::new(-50.0, -10.0), Point2::new(0.0, 10.0)),
            name_loc: Some(Point2::new(-50.0, -15.0)),
        },
        PortElement {
            kind: PortKind::Output,
            paths: vec!["M 0 0 L 20 -10 L 50 -10 L 50 10 L 20 10 Z".to_string()],
            bbox: (Point2::new(0.0, -10.0), Point2::new(50.0, 10.0)),
            name_loc: Some(Point2::new(20.0, -15.0)),
        },
        PortElement {
            kind: PortKind::Inout,
            paths: vec!["M 0 0 L 20 -10 L 40 -10 L 60 0 L 40 10 L 20 10 Z".to_string()],
            bbox: (Point2::new(0.0, -10.0), Point2::new(60.0, 10.0)),
            name_loc: Some(Point2::new(20.0, -15.0)),
        },
        PortElement {
            kind: PortKind::Gnd,
            paths: vec!["M 0 0 L 0 20 M -16 20 L 16 20 M -10 26 L 10 26 M -4 32 L 4 32".to_string()],
            bbox: (Point2::new(-16.0, 0.0), Point2::new(16.0, 32.0)),
            name_loc: None,
        },
        PortElement {
            kind: PortKind::Vdd,
            paths: vec!["M 0 0 L 0 -20 M -16 -20 L 16 -20 M -6 -26 L 0 -20 L 6 -26".to_string()],
            bbox: (Point2::new(-16.0, -26.0), Point2::new(16.0, 0.0)),
            name_loc: None,
        },
    ]
}
