//! ZSCHEM 文件格式处理
//!
//! 原理图的持久化格式是带领域标记的 SVG（`.sch.svg`）：
//! 同一份文本既是可渲染的图片，也是机器可读的电路描述。
//!
//! 支持：
//! - `.sch.svg` 原理图导入/导出（无损往返）
//! - `.sym.svg` 自定义符号解析

pub mod error;
pub mod export;
pub mod import;
pub mod schema;

pub use error::FileError;
pub use export::export_svg;
pub use import::{import_svg, parse_symbol_svg};

use std::path::Path;
use zschem_core::registry::ElementRegistry;
use zschem_core::schematic::Schematic;

/// 从文件加载原理图
pub fn load(path: &Path, registry: &ElementRegistry) -> Result<Schematic, FileError> {
    let text = std::fs::read_to_string(path)?;
    let sch = import_svg(&text, registry)?;
    tracing::info!(
        "Loaded schematic '{}' from {}: {} instances, {} ports, {} wires",
        sch.name,
        path.display(),
        sch.instances.len(),
        sch.ports.len(),
        sch.wires.len()
    );
    Ok(sch)
}

/// 保存原理图到文件
pub fn save(path: &Path, sch: &Schematic, registry: &ElementRegistry) -> Result<(), FileError> {
    let text = export_svg(sch, registry)?;
    std::fs::write(path, &text)?;
    tracing::info!(
        "Saved schematic '{}' to {} ({} bytes)",
        sch.name,
        path.display(),
        text.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use zschem_core::entity::{Instance, Wire};
    use zschem_core::math::Point2;
    use zschem_core::orientation::Orientation;

    #[test]
    fn test_save_load_roundtrip() {
        let registry = ElementRegistry::new();
        let mut sch = Schematic::new("roundtrip");
        sch.add_instance(Instance::new(
            "m1",
            "Nmos()",
            "nmos",
            Point2::new(100.0, 100.0),
            Orientation::identity(),
        ))
        .unwrap();
        sch.add_wire(Wire::new(vec![Point2::new(100.0, 100.0), Point2::new(100.0, 200.0)]).unwrap())
            .unwrap();

        let dir = std::env::temp_dir().join("zschem-file-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("roundtrip.sch.svg");

        save(&path, &sch, &registry).unwrap();
        let back = load(&path, &registry).unwrap();
        assert!(back.equivalent(&sch));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let registry = ElementRegistry::new();
        let result = load(Path::new("/nonexistent/zschem/file.sch.svg"), &registry);
        assert!(matches!(result, Err(FileError::Io(_))));
    }
}
