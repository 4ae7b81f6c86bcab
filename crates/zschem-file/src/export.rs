//! SVG 线格式导出
//!
//! 将原理图序列化为可渲染、可重新导入的 SVG 文本。
//! 输出对同一状态逐字节确定：实体按插入顺序，坐标按统一格式，
//! 便于版本控制做最小 diff。交点标记每次导出时从导线集合
//! 重新推导，绝不信任先前状态。

use crate::error::FileError;
use crate::schema::{
    self, fmt_coord, format_path, format_transform, CLASS_BACKGROUND, CLASS_DOT, CLASS_INSTANCE,
    CLASS_INSTANCE_NAME, CLASS_INSTANCE_OF, CLASS_PORT, CLASS_PORT_NAME, CLASS_WIRE,
};
use quick_xml::escape::escape;
use zschem_core::entity::{Instance, ModelError, SchPort, Wire, DOT_RADIUS, WIRE_STROKE};
use zschem_core::math::Place;
use zschem_core::registry::ElementRegistry;
use zschem_core::schematic::{infer_dots, Schematic};

/// 序列化原理图为 SVG 文本
pub fn export_svg(sch: &Schematic, registry: &ElementRegistry) -> Result<String, FileError> {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\">\n",
        fmt_coord(sch.width),
        fmt_coord(sch.height)
    ));

    out.push_str(&format!("  <defs class=\"{}\">\n", schema::CLASS_DEFS));
    out.push_str(&format!("    <metadata class=\"{}\">\n", schema::CLASS_METADATA));
    out.push_str(&format!(
        "      <text class=\"{}\">{}</text>\n",
        schema::CLASS_SCH_NAME,
        escape(sch.name.as_str())
    ));
    out.push_str(&format!(
        "      <text class=\"{}\">{}</text>\n",
        schema::CLASS_SCH_PRELUDE,
        escape(sch.prelude.as_str())
    ));
    out.push_str("    </metadata>\n  </defs>\n");

    out.push_str(&format!(
        "  <rect class=\"{}\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"white\"/>\n",
        CLASS_BACKGROUND,
        fmt_coord(sch.width),
        fmt_coord(sch.height)
    ));

    for inst in &sch.instances {
        write_instance(&mut out, inst, registry)?;
    }
    for port in &sch.ports {
        write_port(&mut out, port, registry)?;
    }
    for wire in &sch.wires {
        write_wire(&mut out, wire);
    }
    // 交点标记从导线集合重新推导
    for dot in infer_dots(&sch.wires) {
        out.push_str(&format!(
            "  <circle class=\"{}\" cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"blue\"/>\n",
            CLASS_DOT,
            fmt_coord(dot.loc.x),
            fmt_coord(dot.loc.y),
            fmt_coord(DOT_RADIUS)
        ));
    }
    for other in &sch.others {
        out.push_str("  ");
        out.push_str(other);
        out.push('\n');
    }

    out.push_str("</svg>\n");
    Ok(out)
}

fn write_instance(
    out: &mut String,
    inst: &Instance,
    registry: &ElementRegistry,
) -> Result<(), FileError> {
    let elem = registry.element(&inst.kind)?;
    out.push_str(&format!(
        "  <g class=\"{}\" transform=\"{}\">\n",
        CLASS_INSTANCE,
        format_transform(&Place::new(inst.loc, inst.orientation))
    ));
    out.push_str(&format!(
        "    <g class=\"{}{}\">\n",
        schema::PREFIX_ELEMENTS,
        escape(inst.kind.as_str())
    ));
    for d in &elem.symbol.paths {
        out.push_str(&format!(
            "      <path d=\"{}\" fill=\"none\" stroke=\"black\" stroke-width=\"4\"/>\n",
            escape(d.as_str())
        ));
    }
    for port in &elem.symbol.ports {
        out.push_str(&format!(
            "      <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"blue\"/>\n",
            fmt_coord(port.loc.x),
            fmt_coord(port.loc.y),
            fmt_coord(DOT_RADIUS)
        ));
    }
    out.push_str("    </g>\n");
    out.push_str(&format!(
        "    <text class=\"{}\" x=\"{}\" y=\"{}\">{}</text>\n",
        CLASS_INSTANCE_NAME,
        fmt_coord(elem.symbol.name_loc.x),
        fmt_coord(elem.symbol.name_loc.y),
        escape(inst.name.as_str())
    ));
    out.push_str(&format!(
        "    <text class=\"{}\" x=\"{}\" y=\"{}\">{}</text>\n",
        CLASS_INSTANCE_OF,
        fmt_coord(elem.symbol.of_loc.x),
        fmt_coord(elem.symbol.of_loc.y),
        escape(inst.of.as_str())
    ));
    out.push_str("  </g>\n");
    Ok(())
}

fn write_port(out: &mut String, port: &SchPort, registry: &ElementRegistry) -> Result<(), FileError> {
    let elem = registry
        .port_element(port.kind)
        .ok_or_else(|| FileError::Model(ModelError::UnknownElement(port.kind.tag().to_string())))?;
    out.push_str(&format!(
        "  <g class=\"{}\" transform=\"{}\">\n",
        CLASS_PORT,
        format_transform(&Place::new(port.loc, port.orientation))
    ));
    out.push_str(&format!(
        "    <g class=\"{}{}\">\n",
        schema::PREFIX_PORTS,
        port.kind.tag()
    ));
    for d in &elem.paths {
        out.push_str(&format!(
            "      <path d=\"{}\" fill=\"none\" stroke=\"black\" stroke-width=\"4\"/>\n",
            escape(d.as_str())
        ));
    }
    out.push_str("    </g>\n");
    // 隐名端口（gnd/vdd）不携带名称标签
    if let Some(anchor) = elem.name_loc {
        if port.has_label() {
            out.push_str(&format!(
                "    <text class=\"{}\" x=\"{}\" y=\"{}\">{}</text>\n",
                CLASS_PORT_NAME,
                fmt_coord(anchor.x),
                fmt_coord(anchor.y),
                escape(port.name.as_str())
            ));
        }
    }
    out.push_str("  </g>\n");
    Ok(())
}

fn write_wire(out: &mut String, wire: &Wire) {
    out.push_str(&format!(
        "  <g class=\"{}\">\n    <path class=\"{}\" d=\"{}\" fill=\"none\" stroke=\"blue\" stroke-width=\"{}\"/>\n",
        CLASS_WIRE,
        CLASS_WIRE,
        format_path(&wire.points),
        fmt_coord(WIRE_STROKE)
    ));
    if let Some(name) = &wire.name {
        // 线名标注锚在起点上方；点序列非空由构造保证
        let anchor = wire.points[0];
        out.push_str(&format!(
            "    <text class=\"{}\" x=\"{}\" y=\"{}\">{}</text>\n",
            schema::CLASS_WIRE_NAME,
            fmt_coord(anchor.x),
            fmt_coord(anchor.y - 10.0),
            escape(name.as_str())
        ));
    }
    out.push_str("  </g>\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::import_svg;
    use zschem_core::element::PortKind;
    use zschem_core::entity::Wire;
    use zschem_core::math::Point2;
    use zschem_core::orientation::Orientation;

    fn registry() -> ElementRegistry {
        ElementRegistry::new()
    }

    fn sample_schematic() -> Schematic {
        let mut sch = Schematic::new("inverter");
        sch.prelude = "import hdl21 as h".to_string();

        let nmos = Instance::new(
            "n0",
            "Nmos(w=1u,l=20n)",
            "nmos",
            Point2::new(200.0, 400.0),
            Orientation::identity(),
        );
        sch.add_instance(nmos).unwrap();

        let pmos = Instance::new(
            "p0",
            "Pmos(w=2u,l=20n)",
            "pmos",
            Point2::new(200.0, 200.0),
            Orientation::new(true, zschem_core::orientation::Rotation::R90),
        );
        sch.add_instance(pmos).unwrap();

        sch.add_port(SchPort::new(
            PortKind::Input,
            "vin",
            Point2::new(100.0, 300.0),
            Orientation::identity(),
        ))
        .unwrap();
        sch.add_port(SchPort::new(
            PortKind::Gnd,
            "",
            Point2::new(200.0, 500.0),
            Orientation::identity(),
        ))
        .unwrap();

        sch.add_wire(Wire::new(vec![Point2::new(200.0, 280.0), Point2::new(200.0, 400.0)]).unwrap())
            .unwrap();
        sch
    }

    #[test]
    fn test_export_is_deterministic() {
        let sch = sample_schematic();
        let reg = registry();
        let a = export_svg(&sch, &reg).unwrap();
        let b = export_svg(&sch, &reg).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_roundtrip_full_schematic() {
        let sch = sample_schematic();
        let reg = registry();
        let text = export_svg(&sch, &reg).unwrap();
        let back = import_svg(&text, &reg).unwrap();
        assert!(back.equivalent(&sch), "roundtrip mismatch:\n{}", text);
    }

    #[test]
    fn test_roundtrip_wire_points() {
        let mut sch = Schematic::new("wires");
        sch.add_wire(
            Wire::new(vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 50.0),
                Point2::new(50.0, 50.0),
            ])
            .unwrap(),
        )
        .unwrap();

        let reg = registry();
        let back = import_svg(&export_svg(&sch, &reg).unwrap(), &reg).unwrap();
        assert_eq!(back.wires.len(), 1);
        assert_eq!(
            back.wires[0].points,
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(0.0, 50.0),
                Point2::new(50.0, 50.0)
            ]
        );
    }

    #[test]
    fn test_dots_recomputed_on_export() {
        let mut sch = Schematic::new("junction");
        sch.add_wire(Wire::new(vec![Point2::new(100.0, 100.0), Point2::new(100.0, 200.0)]).unwrap())
            .unwrap();
        sch.add_wire(Wire::new(vec![Point2::new(100.0, 100.0), Point2::new(200.0, 100.0)]).unwrap())
            .unwrap();
        sch.add_wire(Wire::new(vec![Point2::new(100.0, 100.0), Point2::new(0.0, 100.0)]).unwrap())
            .unwrap();
        // 人为塞入过时标记：导出必须无视它
        sch.dots.clear();

        let text = export_svg(&sch, &registry()).unwrap();
        let dot_count = text.matches("hdl21-dot").count();
        assert_eq!(dot_count, 1);
        assert!(text.contains("cx=\"100\" cy=\"100\""));
    }

    #[test]
    fn test_others_preserved_through_roundtrip() {
        let mut sch = Schematic::new("freehand");
        sch.others
            .push("<line x1=\"0\" y1=\"0\" x2=\"10\" y2=\"0\"/>".to_string());

        let reg = registry();
        let back = import_svg(&export_svg(&sch, &reg).unwrap(), &reg).unwrap();
        assert_eq!(back.others, sch.others);
    }

    #[test]
    fn test_wire_name_survives_roundtrip() {
        let mut sch = Schematic::new("named");
        let mut named =
            Wire::new(vec![Point2::new(100.0, 100.0), Point2::new(100.0, 200.0)]).unwrap();
        named.name = Some("vout".to_string());
        sch.add_wire(named).unwrap();
        sch.add_wire(Wire::new(vec![Point2::new(0.0, 0.0), Point2::new(50.0, 0.0)]).unwrap())
            .unwrap();

        let reg = registry();
        let back = import_svg(&export_svg(&sch, &reg).unwrap(), &reg).unwrap();
        assert_eq!(back.wires[0].name.as_deref(), Some("vout"));
        assert_eq!(back.wires[1].name, None);
        assert!(back.equivalent(&sch));
    }

    #[test]
    fn test_text_content_escaped() {
        let mut sch = Schematic::new("esc");
        sch.prelude = "if a < b & c".to_string();
        sch.add_instance(Instance::new(
            "m1",
            "Nmos(w=1u)",
            "nmos",
            Point2::new(0.0, 0.0),
            Orientation::identity(),
        ))
        .unwrap();

        let reg = registry();
        let text = export_svg(&sch, &reg).unwrap();
        assert!(text.contains("if a &lt; b &amp; c"));

        let back = import_svg(&text, &reg).unwrap();
        assert_eq!(back.prelude, "if a < b & c");
    }

    #[test]
    fn test_unknown_kind_fails_export() {
        let mut sch = Schematic::new("bad");
        sch.add_instance(Instance::new(
            "x1",
            "Mystery()",
            "mystery",
            Point2::new(0.0, 0.0),
            Orientation::identity(),
        ))
        .unwrap();
        assert!(matches!(
            export_svg(&sch, &registry()),
            Err(FileError::Model(ModelError::UnknownElement(_)))
        ));
    }

    #[test]
    fn test_orientation_roundtrip_through_svg() {
        use zschem_core::orientation::Rotation;
        let reg = registry();
        for reflected in [false, true] {
            for rotation in [Rotation::R0, Rotation::R90, Rotation::R180, Rotation::R270] {
                let mut sch = Schematic::new("o");
                sch.add_instance(Instance::new(
                    "m1",
                    "Nmos()",
                    "nmos",
                    Point2::new(100.0, 100.0),
                    Orientation::new(reflected, rotation),
                ))
                .unwrap();
                let back = import_svg(&export_svg(&sch, &reg).unwrap(), &reg).unwrap();
                assert_eq!(
                    back.instances[0].orientation,
                    Orientation::new(reflected, rotation)
                );
            }
        }
    }
}
