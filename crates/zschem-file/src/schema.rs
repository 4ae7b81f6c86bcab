//! SVG 线格式的模式常量与基础编解码
//!
//! class 名与 8 项朝向矩阵表是线格式的逐位契约；
//! 坐标统一格式化为最短无损文本（整数坐标不带小数点）。

use crate::error::FileError;
use zschem_core::math::{Place, Point2, EPSILON};
use zschem_core::orientation::{Orientation, OrientationMatrix};

pub const CLASS_DEFS: &str = "hdl21-schematic-defs";
pub const CLASS_METADATA: &str = "hdl21-schematic-metadata";
pub const CLASS_SCH_NAME: &str = "hdl21-schematic-name";
pub const CLASS_SCH_PRELUDE: &str = "hdl21-schematic-prelude";
pub const CLASS_BACKGROUND: &str = "hdl21-schematic-background";

pub const CLASS_INSTANCE: &str = "hdl21-instance";
pub const CLASS_INSTANCE_NAME: &str = "hdl21-instance-name";
pub const CLASS_INSTANCE_OF: &str = "hdl21-instance-of";
pub const CLASS_PORT: &str = "hdl21-port";
pub const CLASS_PORT_NAME: &str = "hdl21-port-name";
pub const CLASS_WIRE: &str = "hdl21-wire";
pub const CLASS_WIRE_NAME: &str = "hdl21-wire-name";
pub const CLASS_DOT: &str = "hdl21-dot";
/// 自定义符号文件中的连接点标记
pub const CLASS_SYMBOL_PORT: &str = "hdl21-symbol-port";

/// 符号子组的 class 前缀，后缀为元件种类标识
pub const PREFIX_ELEMENTS: &str = "hdl21-elements-";
/// 端口符号子组的 class 前缀，后缀为端口种类标签
pub const PREFIX_PORTS: &str = "hdl21-ports-";

/// 格式化坐标：整数值不带小数点，保证逐字节确定性输出
pub fn fmt_coord(v: f64) -> String {
    if (v - v.round()).abs() < EPSILON {
        format!("{}", v.round() as i64)
    } else {
        format!("{}", v)
    }
}

fn parse_number(token: &str, raw: &str, context: &str) -> Result<f64, FileError> {
    token.parse::<f64>().map_err(|_| match context {
        "transform" => FileError::InvalidTransform(raw.to_string(), format!("bad number '{}'", token)),
        _ => FileError::InvalidPath(raw.to_string(), format!("bad number '{}'", token)),
    })
}

/// 编码位置与朝向为 `matrix(a b c d e f)`
pub fn format_transform(place: &Place) -> String {
    let m = place.orientation.matrix();
    format!(
        "matrix({} {} {} {} {} {})",
        m.a,
        m.b,
        m.c,
        m.d,
        fmt_coord(place.loc.x),
        fmt_coord(place.loc.y)
    )
}

/// 解析 `matrix(a b c d e f)` 为位置与朝向
///
/// 2x2 部分必须是 8 个规范矩阵之一；其余任何矩阵都是错误，
/// 绝不静默回退到默认朝向。
pub fn parse_transform(raw: &str) -> Result<Place, FileError> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("matrix(")
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| {
            FileError::InvalidTransform(raw.to_string(), "expected matrix(a b c d e f)".to_string())
        })?;

    // SVG 允许逗号或空白作为分隔符
    let nums: Vec<f64> = inner
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| parse_number(t, raw, "transform"))
        .collect::<Result<_, _>>()?;
    if nums.len() != 6 {
        return Err(FileError::InvalidTransform(
            raw.to_string(),
            format!("expected 6 numbers, got {}", nums.len()),
        ));
    }

    let to_int = |v: f64| -> Result<i8, FileError> {
        if (v - v.round()).abs() > EPSILON || !(-1.0..=1.0).contains(&v.round()) {
            return Err(FileError::InvalidTransform(
                raw.to_string(),
                format!("matrix entry {} is not in {{-1, 0, 1}}", v),
            ));
        }
        Ok(v.round() as i8)
    };
    let m = OrientationMatrix {
        a: to_int(nums[0])?,
        b: to_int(nums[1])?,
        c: to_int(nums[2])?,
        d: to_int(nums[3])?,
    };
    let orientation = Orientation::try_from(m)
        .map_err(|e| FileError::InvalidTransform(raw.to_string(), e.to_string()))?;

    Ok(Place::new(Point2::new(nums[4], nums[5]), orientation))
}

/// 编码点序列为 `M x y L x y ...`
pub fn format_path(points: &[Point2]) -> String {
    let mut out = String::new();
    for (i, p) in points.iter().enumerate() {
        let cmd = if i == 0 { "M" } else { "L" };
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{} {} {}", cmd, fmt_coord(p.x), fmt_coord(p.y)));
    }
    out
}

/// 解析 `M x y L x y ...` 为点序列
///
/// 只接受绝对 Move/Line 指令；其他指令或残缺坐标对都是错误。
pub fn parse_path(raw: &str) -> Result<Vec<Point2>, FileError> {
    let tokens: Vec<&str> = raw
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Err(FileError::InvalidPath(raw.to_string(), "empty path".to_string()));
    }

    let mut points = Vec::new();
    let mut iter = tokens.iter();
    let mut first = true;
    while let Some(cmd) = iter.next() {
        let expected = if first { "M" } else { "L" };
        if *cmd != expected {
            return Err(FileError::InvalidPath(
                raw.to_string(),
                format!("expected '{}' command, got '{}'", expected, cmd),
            ));
        }
        first = false;
        let (x, y) = match (iter.next(), iter.next()) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(FileError::InvalidPath(
                    raw.to_string(),
                    "truncated coordinate pair".to_string(),
                ))
            }
        };
        points.push(Point2::new(
            parse_number(x, raw, "path")?,
            parse_number(y, raw, "path")?,
        ));
    }
    Ok(points)
}
