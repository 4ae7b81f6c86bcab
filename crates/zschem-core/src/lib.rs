//! ZSCHEM 核心数据模型
//!
//! 提供原理图编辑器的几何代数、实体模型与变更历史。
//!
//! # 架构设计
//!
//! 原理图是持有实体的聚合根：
//! - `Instance` / `SchPort`: 可放置实体（位置 + 朝向）
//! - `Wire`: 曼哈顿折线
//! - `Dot`: 从导线集合派生的交点标记，不持久化编辑
//!
//! 所有坐标吸附到统一网格；朝向是八元素群（四旋转 × 镜像），
//! 与持久化格式中的 2x2 变换矩阵一一对应。
//!
//! # 示例
//!
//! ```rust
//! use zschem_core::prelude::*;
//!
//! let mut sch = Schematic::new("inverter");
//! let inst = Instance::new(
//!     "n0",
//!     "Nmos()",
//!     "nmos",
//!     Point2::new(100.0, 100.0),
//!     Orientation::identity(),
//! );
//! sch.add_instance(inst).unwrap();
//! ```

pub mod element;
pub mod entity;
pub mod history;
pub mod math;
pub mod orientation;
pub mod pdk;
pub mod registry;
pub mod schematic;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::element::{
        builtin_elements, builtin_port_elements, Element, PortElement, PortKind, Symbol,
        SymbolPort,
    };
    pub use crate::entity::{
        Dot, Entity, EntityId, Instance, InstancePort, Label, LabelKind, ModelError, SchPort,
        Segment, Wire,
    };
    pub use crate::history::{Change, ChangeLog};
    pub use crate::math::{is_on_grid, nearest_on_grid, Place, Point2, Vector2, EPSILON, GRID};
    pub use crate::orientation::{FlipDir, Orientation, OrientationMatrix, Rotation};
    pub use crate::pdk::{category_for, symbol_kind_for, DeviceInfo, ParamInfo, PdkInfo, PortInfo};
    pub use crate::registry::ElementRegistry;
    pub use crate::schematic::{infer_dots, Schematic};
}
