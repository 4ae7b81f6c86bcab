//! SVG 线格式导入
//!
//! 将完整 SVG 文档文本解析为原理图。解析基于真实 XML 事件流，
//! 不做正则文本匹配。任何结构性错误（非法矩阵、缺失子节点、
//! 非曼哈顿导线、未知元件种类）都使整次导入失败，不返回
//! 部分解析结果。
//!
//! 无语义的顶层片段（手绘符号图形等）按原文切片保留，
//! 保证往返不丢失视觉内容。交点标记与背景在导入时丢弃，
//! 由导出端重新生成。

use crate::error::FileError;
use crate::schema;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zschem_core::element::{Element, PortKind, Symbol, SymbolPort};
use zschem_core::entity::{Instance, SchPort, Wire};
use zschem_core::math::Point2;
use zschem_core::registry::ElementRegistry;
use zschem_core::schematic::Schematic;

/// 解析 SVG 文本为原理图
pub fn import_svg(text: &str, registry: &ElementRegistry) -> Result<Schematic, FileError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Decl(_) | Event::Comment(_) | Event::DocType(_) | Event::PI(_) => continue,
            Event::Start(start) if start.local_name().as_ref() == b"svg" => {
                return parse_document(&mut reader, &start, text, registry);
            }
            Event::Eof => {
                return Err(FileError::InvalidFormat("missing <svg> root element".to_string()))
            }
            _ => {
                return Err(FileError::InvalidFormat(
                    "unexpected markup before <svg> root".to_string(),
                ))
            }
        }
    }
}

fn parse_document(
    reader: &mut Reader<&[u8]>,
    root: &BytesStart,
    text: &str,
    registry: &ElementRegistry,
) -> Result<Schematic, FileError> {
    let mut sch = Schematic::new("");
    sch.width = parse_dim(root, "width")?;
    sch.height = parse_dim(root, "height")?;
    let mut saw_metadata = false;

    loop {
        let start_pos = reader.buffer_position() as usize;
        match reader.read_event()? {
            Event::End(e) if e.local_name().as_ref() == b"svg" => break,
            Event::Eof => {
                return Err(FileError::InvalidFormat("unclosed <svg> root".to_string()))
            }
            Event::Comment(_) => {}
            Event::Start(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                match (e.local_name().as_ref(), class.as_str()) {
                    (b"defs", schema::CLASS_DEFS) => {
                        parse_metadata(reader, &mut sch)?;
                        saw_metadata = true;
                    }
                    (b"g", schema::CLASS_INSTANCE) => {
                        let inst = parse_instance(reader, &e, registry)?;
                        sch.add_instance(inst)?;
                    }
                    (b"g", schema::CLASS_PORT) => {
                        let port = parse_port(reader, &e)?;
                        sch.add_port(port)?;
                    }
                    (b"g", schema::CLASS_WIRE) => {
                        let wire = parse_wire(reader)?;
                        sch.add_wire(wire)?;
                    }
                    // 背景与交点标记是派生输出，导入时丢弃
                    (b"rect", schema::CLASS_BACKGROUND) | (b"circle", schema::CLASS_DOT) => {
                        reader.read_to_end(e.name())?;
                    }
                    _ => {
                        reader.read_to_end(e.name())?;
                        push_other(&mut sch, text, start_pos, reader.buffer_position() as usize);
                    }
                }
            }
            Event::Empty(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                match (e.local_name().as_ref(), class.as_str()) {
                    (b"rect", schema::CLASS_BACKGROUND) | (b"circle", schema::CLASS_DOT) => {}
                    _ => push_other(&mut sch, text, start_pos, reader.buffer_position() as usize),
                }
            }
            // 顶层游离文本等也按原文保留
            _ => push_other(&mut sch, text, start_pos, reader.buffer_position() as usize),
        }
    }

    if !saw_metadata {
        return Err(FileError::MissingMetadata);
    }
    sch.recompute_dots();
    Ok(sch)
}

fn parse_dim(root: &BytesStart, name: &str) -> Result<f64, FileError> {
    let raw = attr_value(root, name)?.ok_or(FileError::MissingChild {
        context: "svg root",
        what: "width/height attributes",
    })?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| FileError::InvalidFormat(format!("bad svg {} '{}'", name, raw)))
}

/// 解析 defs 内的元数据块（原理图名与前导代码）
fn parse_metadata(reader: &mut Reader<&[u8]>, sch: &mut Schematic) -> Result<(), FileError> {
    loop {
        match reader.read_event()? {
            Event::End(e) if e.local_name().as_ref() == b"defs" => return Ok(()),
            Event::Eof => {
                return Err(FileError::InvalidFormat("unclosed <defs> block".to_string()))
            }
            Event::Start(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                match (e.local_name().as_ref(), class.as_str()) {
                    // 下探到元数据组内部
                    (b"metadata", schema::CLASS_METADATA) => {}
                    (b"text", schema::CLASS_SCH_NAME) => {
                        sch.name = read_unescaped(reader, &e)?;
                    }
                    (b"text", schema::CLASS_SCH_PRELUDE) => {
                        sch.prelude = read_unescaped(reader, &e)?;
                    }
                    _ => {
                        reader.read_to_end(e.name())?;
                    }
                }
            }
            Event::Empty(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                match class.as_str() {
                    schema::CLASS_SCH_NAME => sch.name = String::new(),
                    schema::CLASS_SCH_PRELUDE => sch.prelude = String::new(),
                    _ => {}
                }
            }
            _ => {}
        }
    }
}

fn parse_instance(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    registry: &ElementRegistry,
) -> Result<Instance, FileError> {
    let transform = attr_value(start, "transform")?.ok_or(FileError::MissingChild {
        context: "instance",
        what: "transform attribute",
    })?;
    let place = schema::parse_transform(&transform)?;

    let mut kind: Option<String> = None;
    let mut name: Option<String> = None;
    let mut of: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::End(_) => break,
            Event::Eof => {
                return Err(FileError::InvalidFormat("unclosed instance group".to_string()))
            }
            Event::Start(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                match (e.local_name().as_ref(), class.as_str()) {
                    (b"text", schema::CLASS_INSTANCE_NAME) => {
                        name = Some(read_unescaped(reader, &e)?);
                    }
                    (b"text", schema::CLASS_INSTANCE_OF) => {
                        of = Some(read_unescaped(reader, &e)?);
                    }
                    _ => {
                        // 符号子组：种类取自 class 后缀，图形本身由目录重建
                        if let Some(suffix) = class.strip_prefix(schema::PREFIX_ELEMENTS) {
                            kind = Some(suffix.to_string());
                        }
                        reader.read_to_end(e.name())?;
                    }
                }
            }
            Event::Empty(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                if let Some(suffix) = class.strip_prefix(schema::PREFIX_ELEMENTS) {
                    kind = Some(suffix.to_string());
                }
            }
            _ => {}
        }
    }

    let kind = kind.ok_or(FileError::MissingChild {
        context: "instance",
        what: "symbol sub-group",
    })?;
    // 未知种类是硬错误，绝不静默替换为默认元件
    registry.element(&kind)?;
    let name = name.ok_or(FileError::MissingChild {
        context: "instance",
        what: "name text",
    })?;
    let of = of.ok_or(FileError::MissingChild {
        context: "instance",
        what: "of text",
    })?;

    Ok(Instance::new(name, of, kind, place.loc, place.orientation))
}

fn parse_port(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<SchPort, FileError> {
    let transform = attr_value(start, "transform")?.ok_or(FileError::MissingChild {
        context: "port",
        what: "transform attribute",
    })?;
    let place = schema::parse_transform(&transform)?;

    let mut kind: Option<PortKind> = None;
    let mut name: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::End(_) => break,
            Event::Eof => {
                return Err(FileError::InvalidFormat("unclosed port group".to_string()))
            }
            Event::Start(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                if e.local_name().as_ref() == b"text" && class == schema::CLASS_PORT_NAME {
                    name = Some(read_unescaped(reader, &e)?);
                } else {
                    if let Some(tag) = class.strip_prefix(schema::PREFIX_PORTS) {
                        kind = Some(port_kind_from_tag(tag)?);
                    }
                    reader.read_to_end(e.name())?;
                }
            }
            Event::Empty(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                if let Some(tag) = class.strip_prefix(schema::PREFIX_PORTS) {
                    kind = Some(port_kind_from_tag(tag)?);
                }
            }
            _ => {}
        }
    }

    let kind = kind.ok_or(FileError::MissingChild {
        context: "port",
        what: "direction sub-group",
    })?;
    // 隐名端口（gnd/vdd）没有名称标签
    let name = match (name, kind.implicit_name()) {
        (Some(n), _) => n,
        (None, Some(_)) => String::new(),
        (None, None) => {
            return Err(FileError::MissingChild {
                context: "port",
                what: "name text",
            })
        }
    };

    Ok(SchPort::new(kind, name, place.loc, place.orientation))
}

fn port_kind_from_tag(tag: &str) -> Result<PortKind, FileError> {
    PortKind::from_tag(tag).ok_or_else(|| FileError::UnknownPortKind(tag.to_string()))
}

fn parse_wire(reader: &mut Reader<&[u8]>) -> Result<Wire, FileError> {
    let mut points: Option<Vec<Point2>> = None;
    let mut name: Option<String> = None;

    loop {
        match reader.read_event()? {
            Event::End(_) => break,
            Event::Eof => {
                return Err(FileError::InvalidFormat("unclosed wire group".to_string()))
            }
            Event::Empty(e) if e.local_name().as_ref() == b"path" => {
                points = Some(parse_wire_path(&e)?);
            }
            Event::Start(e) => {
                let class = attr_value(&e, "class")?.unwrap_or_default();
                if e.local_name().as_ref() == b"path" {
                    points = Some(parse_wire_path(&e)?);
                    reader.read_to_end(e.name())?;
                } else if e.local_name().as_ref() == b"text" && class == schema::CLASS_WIRE_NAME {
                    // 线名标注是不透明文本，原样随格式往返
                    name = Some(read_unescaped(reader, &e)?);
                } else {
                    reader.read_to_end(e.name())?;
                }
            }
            _ => {}
        }
    }

    let points = points.ok_or(FileError::MissingChild {
        context: "wire",
        what: "path",
    })?;
    // 曼哈顿校验在构造时执行，对角段在此失败
    let mut wire = Wire::new(points)?;
    wire.name = name;
    Ok(wire)
}

fn parse_wire_path(e: &BytesStart) -> Result<Vec<Point2>, FileError> {
    let d = attr_value(e, "d")?.ok_or(FileError::MissingChild {
        context: "wire",
        what: "path d attribute",
    })?;
    schema::parse_path(&d)
}

/// 解析自定义符号 SVG（`.sym.svg`）为元件描述符
///
/// 文档中任意深度的 `<path d>` 收集为符号图形；连接点是
/// `<circle class="hdl21-symbol-port">`，端口名取自其 `id` 属性。
/// 注册键为 `sym.<key>`，由调用方注册进注册表。
pub fn parse_symbol_svg(key: &str, text: &str) -> Result<Element, FileError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut paths: Vec<String> = Vec::new();
    let mut ports: Vec<SymbolPort> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(e) | Event::Empty(e) => match e.local_name().as_ref() {
                b"path" => {
                    if let Some(d) = attr_value(&e, "d")? {
                        paths.push(d);
                    }
                }
                b"circle" => {
                    let class = attr_value(&e, "class")?.unwrap_or_default();
                    if class == schema::CLASS_SYMBOL_PORT {
                        ports.push(parse_symbol_port(&e)?);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    if paths.is_empty() {
        return Err(FileError::MissingChild {
            context: "symbol",
            what: "path",
        });
    }
    if ports.is_empty() {
        return Err(FileError::MissingChild {
            context: "symbol",
            what: "port circle",
        });
    }

    // 包围盒由连接点外扩一个符号宽度估算
    let pad = 20.0;
    let min_x = ports.iter().map(|p| p.loc.x).fold(f64::INFINITY, f64::min);
    let min_y = ports.iter().map(|p| p.loc.y).fold(f64::INFINITY, f64::min);
    let max_x = ports.iter().map(|p| p.loc.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = ports.iter().map(|p| p.loc.y).fold(f64::NEG_INFINITY, f64::max);

    let stem = key.rsplit('/').next().unwrap_or(key);
    let symbol = Symbol {
        paths,
        ports,
        bbox: (
            Point2::new(min_x - pad, min_y - pad),
            Point2::new(max_x + pad, max_y + pad),
        ),
        name_loc: Point2::new(10.0, 20.0),
        of_loc: Point2::new(10.0, 60.0),
    };
    Ok(Element::new(
        format!("sym.{}", key),
        "x",
        format!("{}()", stem),
        symbol,
    ))
}

fn parse_symbol_port(e: &BytesStart) -> Result<SymbolPort, FileError> {
    let name = attr_value(e, "id")?.ok_or(FileError::MissingChild {
        context: "symbol port",
        what: "id attribute",
    })?;
    let coord = |attr: &str| -> Result<f64, FileError> {
        let raw = attr_value(e, attr)?.ok_or(FileError::MissingChild {
            context: "symbol port",
            what: "cx/cy attributes",
        })?;
        raw.trim()
            .parse::<f64>()
            .map_err(|_| FileError::InvalidFormat(format!("bad symbol port {} '{}'", attr, raw)))
    };
    let x = coord("cx")?;
    let y = coord("cy")?;
    Ok(SymbolPort::new(name, x, y))
}

/// 读取元素的文本内容并还原 XML 实体（&lt; &amp; 等）
///
/// `read_text` 返回原始标记片段，实体不在其中解码；
/// 不还原会让每次加载/保存循环叠加一层转义。
fn read_unescaped(reader: &mut Reader<&[u8]>, e: &BytesStart) -> Result<String, FileError> {
    let raw = reader.read_text(e.name())?.into_owned();
    let text = quick_xml::escape::unescape(&raw)
        .map_err(|err| FileError::InvalidFormat(format!("bad text content: {}", err)))?;
    Ok(text.into_owned())
}

fn attr_value(e: &BytesStart, name: &str) -> Result<Option<String>, FileError> {
    match e.try_get_attribute(name)? {
        Some(attr) => {
            let value = attr.unescape_value().map_err(|err| {
                FileError::InvalidFormat(format!("bad attribute '{}': {}", name, err))
            })?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

/// 原文切片保留一段无语义标记
fn push_other(sch: &mut Schematic, text: &str, start: usize, end: usize) {
    let fragment = text[start..end.min(text.len())].trim();
    if !fragment.is_empty() {
        sch.others.push(fragment.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zschem_core::entity::ModelError;
    use zschem_core::orientation::{Orientation, Rotation};

    fn doc(body: &str) -> String {
        format!(
            concat!(
                "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
                "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1600\" height=\"800\">\n",
                "<defs class=\"hdl21-schematic-defs\">\n",
                "<metadata class=\"hdl21-schematic-metadata\">\n",
                "<text class=\"hdl21-schematic-name\">test</text>\n",
                "<text class=\"hdl21-schematic-prelude\">import hdl21 as h</text>\n",
                "</metadata>\n",
                "</defs>\n",
                "{}\n",
                "</svg>\n"
            ),
            body
        )
    }

    fn registry() -> ElementRegistry {
        ElementRegistry::new()
    }

    #[test]
    fn test_minimal_instance() {
        let svg = doc(concat!(
            "<g class=\"hdl21-instance\" transform=\"matrix(1 0 0 1 100 100)\">\n",
            "<g class=\"hdl21-elements-nmos\"><path d=\"M 0 0 L 0 28\"/></g>\n",
            "<text class=\"hdl21-instance-name\" x=\"10\" y=\"20\">m1</text>\n",
            "<text class=\"hdl21-instance-of\" x=\"10\" y=\"60\">Nmos(w=1u,l=20n)</text>\n",
            "</g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.name, "test");
        assert_eq!(sch.prelude, "import hdl21 as h");
        assert_eq!(sch.instances.len(), 1);

        let inst = &sch.instances[0];
        assert_eq!(inst.name, "m1");
        assert_eq!(inst.of, "Nmos(w=1u,l=20n)");
        assert_eq!(inst.kind, "nmos");
        assert_eq!(inst.loc, Point2::new(100.0, 100.0));
        assert_eq!(inst.orientation, Orientation::identity());
    }

    #[test]
    fn test_reflected_instance_matrix() {
        let svg = doc(concat!(
            "<g class=\"hdl21-instance\" transform=\"matrix(0 1 1 0 40 60)\">\n",
            "<g class=\"hdl21-elements-pmos\"><path d=\"M 0 0\"/></g>\n",
            "<text class=\"hdl21-instance-name\">p1</text>\n",
            "<text class=\"hdl21-instance-of\">Pmos()</text>\n",
            "</g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(
            sch.instances[0].orientation,
            Orientation::new(true, Rotation::R90)
        );
    }

    #[test]
    fn test_unknown_kind_is_error() {
        let svg = doc(concat!(
            "<g class=\"hdl21-instance\" transform=\"matrix(1 0 0 1 0 0)\">\n",
            "<g class=\"hdl21-elements-flying-saucer\"/>\n",
            "<text class=\"hdl21-instance-name\">x1</text>\n",
            "<text class=\"hdl21-instance-of\">Saucer()</text>\n",
            "</g>"
        ));
        assert!(matches!(
            import_svg(&svg, &registry()),
            Err(FileError::Model(ModelError::UnknownElement(k))) if k == "flying-saucer"
        ));
    }

    #[test]
    fn test_bad_matrix_is_error() {
        let svg = doc(concat!(
            "<g class=\"hdl21-instance\" transform=\"matrix(2 0 0 2 0 0)\">\n",
            "<g class=\"hdl21-elements-nmos\"/>\n",
            "<text class=\"hdl21-instance-name\">m1</text>\n",
            "<text class=\"hdl21-instance-of\">Nmos()</text>\n",
            "</g>"
        ));
        assert!(matches!(
            import_svg(&svg, &registry()),
            Err(FileError::InvalidTransform(..))
        ));
    }

    #[test]
    fn test_missing_name_is_error() {
        let svg = doc(concat!(
            "<g class=\"hdl21-instance\" transform=\"matrix(1 0 0 1 0 0)\">\n",
            "<g class=\"hdl21-elements-nmos\"/>\n",
            "<text class=\"hdl21-instance-of\">Nmos()</text>\n",
            "</g>"
        ));
        assert!(matches!(
            import_svg(&svg, &registry()),
            Err(FileError::MissingChild { context: "instance", what: "name text" })
        ));
    }

    #[test]
    fn test_wire_parse() {
        let svg = doc(concat!(
            "<g class=\"hdl21-wire\">\n",
            "<path class=\"hdl21-wire\" d=\"M 0 0 L 0 50 L 50 50\" fill=\"none\"/>\n",
            "</g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.wires.len(), 1);
        assert_eq!(
            sch.wires[0].points,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 50.0),
                Point2::new(50.0, 50.0)
            ]
        );
    }

    #[test]
    fn test_diagonal_wire_is_error() {
        let svg = doc(concat!(
            "<g class=\"hdl21-wire\">\n",
            "<path class=\"hdl21-wire\" d=\"M 0 0 L 10 10\"/>\n",
            "</g>"
        ));
        assert!(matches!(
            import_svg(&svg, &registry()),
            Err(FileError::Model(ModelError::NonManhattanWire { .. }))
        ));
    }

    #[test]
    fn test_wire_name_text_carried() {
        let svg = doc(concat!(
            "<g class=\"hdl21-wire\">\n",
            "<path class=\"hdl21-wire\" d=\"M 0 0 L 0 50\"/>\n",
            "<text class=\"hdl21-wire-name\">vout</text>\n",
            "</g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.wires.len(), 1);
        assert_eq!(sch.wires[0].name.as_deref(), Some("vout"));
        assert!(sch.others.is_empty());
    }

    #[test]
    fn test_text_entities_resolved() {
        // 转义实体必须还原为字面字符，否则每轮往返叠加一层转义
        let svg = concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"1600\" height=\"800\">\n",
            "<defs class=\"hdl21-schematic-defs\">\n",
            "<metadata class=\"hdl21-schematic-metadata\">\n",
            "<text class=\"hdl21-schematic-name\">a &amp; b</text>\n",
            "<text class=\"hdl21-schematic-prelude\">if a &lt; b &amp; c</text>\n",
            "</metadata>\n",
            "</defs>\n",
            "<g class=\"hdl21-instance\" transform=\"matrix(1 0 0 1 0 0)\">\n",
            "<g class=\"hdl21-elements-nmos\"/>\n",
            "<text class=\"hdl21-instance-name\">m1</text>\n",
            "<text class=\"hdl21-instance-of\">Nmos(w=1u &amp; l=20n)</text>\n",
            "</g>\n",
            "</svg>\n"
        );
        let sch = import_svg(svg, &registry()).unwrap();
        assert_eq!(sch.name, "a & b");
        assert_eq!(sch.prelude, "if a < b & c");
        assert_eq!(sch.instances[0].of, "Nmos(w=1u & l=20n)");
    }

    #[test]
    fn test_two_ground_ports_import() {
        let svg = doc(concat!(
            "<g class=\"hdl21-port\" transform=\"matrix(1 0 0 1 100 500)\">\n",
            "<g class=\"hdl21-ports-gnd\"><path d=\"M 0 0\"/></g>\n",
            "</g>\n",
            "<g class=\"hdl21-port\" transform=\"matrix(1 0 0 1 300 500)\">\n",
            "<g class=\"hdl21-ports-gnd\"><path d=\"M 0 0\"/></g>\n",
            "</g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.ports.len(), 2);
        assert!(sch.ports.iter().all(|p| p.name == "gnd"));
    }

    #[test]
    fn test_port_parse() {
        let svg = doc(concat!(
            "<g class=\"hdl21-port\" transform=\"matrix(1 0 0 1 200 300)\">\n",
            "<g class=\"hdl21-ports-input\"><path d=\"M 0 0\"/></g>\n",
            "<text class=\"hdl21-port-name\">vin</text>\n",
            "</g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.ports.len(), 1);
        assert_eq!(sch.ports[0].kind, PortKind::Input);
        assert_eq!(sch.ports[0].name, "vin");
        assert_eq!(sch.ports[0].loc, Point2::new(200.0, 300.0));
    }

    #[test]
    fn test_implicit_port_needs_no_name() {
        let svg = doc(concat!(
            "<g class=\"hdl21-port\" transform=\"matrix(1 0 0 1 0 0)\">\n",
            "<g class=\"hdl21-ports-gnd\"><path d=\"M 0 0\"/></g>\n",
            "</g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.ports[0].name, "gnd");
    }

    #[test]
    fn test_unknown_port_kind_is_error() {
        let svg = doc(concat!(
            "<g class=\"hdl21-port\" transform=\"matrix(1 0 0 1 0 0)\">\n",
            "<g class=\"hdl21-ports-sideways\"/>\n",
            "<text class=\"hdl21-port-name\">x</text>\n",
            "</g>"
        ));
        assert!(matches!(
            import_svg(&svg, &registry()),
            Err(FileError::UnknownPortKind(k)) if k == "sideways"
        ));
    }

    #[test]
    fn test_missing_metadata_is_error() {
        let svg = concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"100\">\n",
            "</svg>\n"
        );
        assert!(matches!(
            import_svg(svg, &registry()),
            Err(FileError::MissingMetadata)
        ));
    }

    #[test]
    fn test_dots_discarded_and_recomputed() {
        // 源文件带一个过时的交点标记，位置上并无交汇
        let svg = doc(concat!(
            "<circle class=\"hdl21-dot\" cx=\"500\" cy=\"500\" r=\"4\"/>\n",
            "<g class=\"hdl21-wire\"><path class=\"hdl21-wire\" d=\"M 100 100 L 100 200\"/></g>\n",
            "<g class=\"hdl21-wire\"><path class=\"hdl21-wire\" d=\"M 100 100 L 200 100\"/></g>\n",
            "<g class=\"hdl21-wire\"><path class=\"hdl21-wire\" d=\"M 100 100 L 0 100\"/></g>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.dots.len(), 1);
        assert_eq!(sch.dots[0].loc, Point2::new(100.0, 100.0));
    }

    #[test]
    fn test_unknown_markup_preserved_verbatim() {
        let svg = doc(concat!(
            "<g class=\"freehand\"><rect x=\"1\" y=\"2\" width=\"3\" height=\"4\"/></g>\n",
            "<line x1=\"0\" y1=\"0\" x2=\"10\" y2=\"0\"/>"
        ));
        let sch = import_svg(&svg, &registry()).unwrap();
        assert_eq!(sch.others.len(), 2);
        assert!(sch.others[0].starts_with("<g class=\"freehand\">"));
        assert!(sch.others[0].ends_with("</g>"));
        assert_eq!(sch.others[1], "<line x1=\"0\" y1=\"0\" x2=\"10\" y2=\"0\"/>");
    }

    #[test]
    fn test_size_parsed() {
        let sch = import_svg(&doc(""), &registry()).unwrap();
        assert_eq!(sch.width, 1600.0);
        assert_eq!(sch.height, 800.0);
    }

    #[test]
    fn test_parse_symbol_svg() {
        let svg = concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100\" height=\"100\">\n",
            "<g class=\"hdl21-symbol\">\n",
            "<path d=\"M 0 0 L 0 80\"/>\n",
            "<path d=\"M -40 40 L 0 40\"/>\n",
            "<circle class=\"hdl21-symbol-port\" id=\"in\" cx=\"-40\" cy=\"40\" r=\"4\"/>\n",
            "<circle class=\"hdl21-symbol-port\" id=\"out\" cx=\"0\" cy=\"0\" r=\"4\"/>\n",
            "</g>\n",
            "</svg>\n"
        );
        let elem = parse_symbol_svg("lib/myamp", svg).unwrap();
        assert_eq!(elem.id, "sym.lib/myamp");
        assert_eq!(elem.default_of, "myamp()");
        assert_eq!(elem.symbol.paths.len(), 2);
        let names: Vec<&str> = elem.symbol.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["in", "out"]);
        assert_eq!(elem.symbol.ports[0].loc, Point2::new(-40.0, 40.0));

        // 注册后可作为实例种类使用
        let mut reg = registry();
        reg.register(elem).unwrap();
        assert!(reg.element("sym.lib/myamp").is_ok());
    }

    #[test]
    fn test_symbol_without_ports_is_error() {
        let svg = concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\">\n",
            "<path d=\"M 0 0 L 0 80\"/>\n",
            "</svg>\n"
        );
        assert!(matches!(
            parse_symbol_svg("k", svg),
            Err(FileError::MissingChild { context: "symbol", what: "port circle" })
        ));
    }

    #[test]
    fn test_duplicate_instance_names_rejected() {
        let inst = concat!(
            "<g class=\"hdl21-instance\" transform=\"matrix(1 0 0 1 0 0)\">\n",
            "<g class=\"hdl21-elements-nmos\"/>\n",
            "<text class=\"hdl21-instance-name\">m1</text>\n",
            "<text class=\"hdl21-instance-of\">Nmos()</text>\n",
            "</g>\n"
        );
        let svg = doc(&format!("{}{}", inst, inst));
        assert!(matches!(
            import_svg(&svg, &registry()),
            Err(FileError::Model(ModelError::DuplicateName(_)))
        ));
    }
}
