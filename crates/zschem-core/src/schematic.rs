//! 原理图聚合根
//!
//! 持有全部实体集合（插入有序）、画布尺寸、前导代码块与
//! 导入时原样保留的其他 SVG 片段。
//!
//! 不变量：
//! - 实例名在实例集合内唯一；有标签端口的名称在有标签端口间唯一
//!   （隐名端口 gnd/vdd 可出现任意多次）
//! - 导线始终满足曼哈顿性质（构造时校验）
//! - 交点标记纯派生，可随时从导线集合整体重建

use crate::entity::{
    validate_manhattan, Dot, Entity, EntityId, Instance, LabelKind, ModelError, SchPort, Wire,
};
use crate::history::Change;
use crate::math::{Place, Point2, EPSILON};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 默认画布尺寸
pub const DEFAULT_SIZE: (f64, f64) = (1600.0, 800.0);

/// 原理图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schematic {
    pub name: String,
    pub width: f64,
    pub height: f64,
    /// 前导代码块（如 import 语句），原样保存
    pub prelude: String,
    pub instances: Vec<Instance>,
    pub ports: Vec<SchPort>,
    pub wires: Vec<Wire>,
    /// 无语义的其他 SVG 片段，导入时原样保留
    pub others: Vec<String>,
    /// 派生的交点标记，按位置排序
    pub dots: Vec<Dot>,
    next_id: u64,
}

impl Schematic {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            width: DEFAULT_SIZE.0,
            height: DEFAULT_SIZE.1,
            prelude: String::new(),
            instances: Vec::new(),
            ports: Vec::new(),
            wires: Vec::new(),
            others: Vec::new(),
            dots: Vec::new(),
            next_id: 1,
        }
    }

    /// 分配新实体 ID，或登记外部给定的 ID（重放快照时）
    fn claim_id(&mut self, id: EntityId) -> Result<EntityId, ModelError> {
        if id.is_assigned() {
            if self.entity(id).is_some() {
                return Err(ModelError::InvalidChange(format!(
                    "entity {} already present",
                    id.0
                )));
            }
            self.next_id = self.next_id.max(id.0 + 1);
            Ok(id)
        } else {
            let id = EntityId(self.next_id);
            self.next_id += 1;
            Ok(id)
        }
    }

    /// 加入实例；实例名重复是立即错误
    pub fn add_instance(&mut self, mut inst: Instance) -> Result<EntityId, ModelError> {
        if self.instances.iter().any(|i| i.name == inst.name) {
            return Err(ModelError::DuplicateName(inst.name));
        }
        inst.id = self.claim_id(inst.id)?;
        let id = inst.id;
        self.instances.push(inst);
        Ok(id)
    }

    /// 加入端口；有标签端口的名称重复是立即错误
    ///
    /// 隐名端口（gnd/vdd）名称由种类固定，不参与唯一性约束，
    /// 同一原理图可接任意多处地或电源。
    pub fn add_port(&mut self, mut port: SchPort) -> Result<EntityId, ModelError> {
        if port.kind.implicit_name().is_none()
            && self
                .ports
                .iter()
                .any(|p| p.kind.implicit_name().is_none() && p.name == port.name)
        {
            return Err(ModelError::DuplicateName(port.name));
        }
        port.id = self.claim_id(port.id)?;
        let id = port.id;
        self.ports.push(port);
        Ok(id)
    }

    /// 加入导线并重建交点标记
    pub fn add_wire(&mut self, mut wire: Wire) -> Result<EntityId, ModelError> {
        wire.id = self.claim_id(wire.id)?;
        let id = wire.id;
        self.wires.push(wire);
        self.recompute_dots();
        Ok(id)
    }

    /// 移除实体并返回其快照
    pub fn remove(&mut self, id: EntityId) -> Result<Entity, ModelError> {
        if let Some(pos) = self.instances.iter().position(|i| i.id == id) {
            return Ok(Entity::Instance(self.instances.remove(pos)));
        }
        if let Some(pos) = self.ports.iter().position(|p| p.id == id) {
            return Ok(Entity::Port(self.ports.remove(pos)));
        }
        if let Some(pos) = self.wires.iter().position(|w| w.id == id) {
            let wire = self.wires.remove(pos);
            self.recompute_dots();
            return Ok(Entity::Wire(wire));
        }
        Err(ModelError::EntityNotFound(id.0))
    }

    pub fn instance(&self, id: EntityId) -> Option<&Instance> {
        self.instances.iter().find(|i| i.id == id)
    }

    pub fn port(&self, id: EntityId) -> Option<&SchPort> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn wire(&self, id: EntityId) -> Option<&Wire> {
        self.wires.iter().find(|w| w.id == id)
    }

    /// 按 ID 查找任意持有实体的快照
    pub fn entity(&self, id: EntityId) -> Option<Entity> {
        if let Some(i) = self.instance(id) {
            return Some(Entity::Instance(i.clone()));
        }
        if let Some(p) = self.port(id) {
            return Some(Entity::Port(p.clone()));
        }
        self.wire(id).map(|w| Entity::Wire(w.clone()))
    }

    pub fn instance_by_name(&self, name: &str) -> Option<&Instance> {
        self.instances.iter().find(|i| i.name == name)
    }

    /// 建议不冲突的实例名，如前缀 "n" -> "n0"、"n1"…
    pub fn suggest_name(&self, prefix: &str) -> String {
        let mut counter = 0usize;
        loop {
            let candidate = format!("{}{}", prefix, counter);
            if self.instance_by_name(&candidate).is_none() {
                return candidate;
            }
            counter += 1;
        }
    }

    /// 移动可放置实体（实例或端口）
    pub fn move_placed(&mut self, id: EntityId, place: Place) -> Result<(), ModelError> {
        if let Some(inst) = self.instances.iter_mut().find(|i| i.id == id) {
            inst.loc = place.loc;
            inst.orientation = place.orientation;
            return Ok(());
        }
        if let Some(port) = self.ports.iter_mut().find(|p| p.id == id) {
            port.loc = place.loc;
            port.orientation = place.orientation;
            return Ok(());
        }
        Err(ModelError::EntityNotFound(id.0))
    }

    /// 改写导线点序列并重建交点标记
    pub fn move_wire(&mut self, id: EntityId, points: Vec<Point2>) -> Result<(), ModelError> {
        validate_manhattan(&points)?;
        let wire = self
            .wires
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or(ModelError::EntityNotFound(id.0))?;
        wire.points = points;
        self.recompute_dots();
        Ok(())
    }

    /// 编辑标签文本（实例名/of、端口名）
    pub fn edit_text(&mut self, id: EntityId, label: LabelKind, text: &str) -> Result<(), ModelError> {
        match label {
            LabelKind::InstanceName => {
                if self.instances.iter().any(|i| i.id != id && i.name == text) {
                    return Err(ModelError::DuplicateName(text.to_string()));
                }
                let inst = self
                    .instances
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or(ModelError::EntityNotFound(id.0))?;
                inst.name = text.to_string();
            }
            LabelKind::InstanceOf => {
                let inst = self
                    .instances
                    .iter_mut()
                    .find(|i| i.id == id)
                    .ok_or(ModelError::EntityNotFound(id.0))?;
                inst.of = text.to_string();
            }
            LabelKind::PortName => {
                if self
                    .ports
                    .iter()
                    .any(|p| p.id != id && p.kind.implicit_name().is_none() && p.name == text)
                {
                    return Err(ModelError::DuplicateName(text.to_string()));
                }
                let port = self
                    .ports
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or(ModelError::EntityNotFound(id.0))?;
                if port.kind.implicit_name().is_some() {
                    return Err(ModelError::InvalidChange(format!(
                        "port kind '{}' has a fixed name",
                        port.kind.tag()
                    )));
                }
                port.name = text.to_string();
            }
        }
        Ok(())
    }

    /// 从导线集合整体重建交点标记
    pub fn recompute_dots(&mut self) {
        self.dots = infer_dots(&self.wires);
    }

    /// 施加一次变更（正向或由撤销引擎合成的逆变更）
    ///
    /// Add/Remove 只接受持有实体（实例/端口/导线）；派生实体不可增删。
    pub fn apply(&mut self, change: &Change) -> Result<(), ModelError> {
        match change {
            Change::Add(Entity::Instance(inst)) => {
                self.add_instance(inst.clone()).map(|_| ())
            }
            Change::Add(Entity::Port(port)) => self.add_port(port.clone()).map(|_| ()),
            Change::Add(Entity::Wire(wire)) => self.add_wire(wire.clone()).map(|_| ()),
            Change::Add(other) => Err(ModelError::InvalidChange(format!(
                "cannot add derived entity kind {}",
                other.kind_name()
            ))),
            Change::Remove(entity) => {
                let id = entity.id().ok_or_else(|| {
                    ModelError::InvalidChange("remove target has no id".to_string())
                })?;
                self.remove(id).map(|_| ())
            }
            Change::Move { id, to, .. } => self.move_placed(*id, *to),
            Change::MoveWire { id, to, .. } => self.move_wire(*id, to.clone()),
            Change::EditText { id, label, to, .. } => self.edit_text(*id, *label, to),
            Change::Batch(changes) => {
                for change in changes {
                    self.apply(change)?;
                }
                Ok(())
            }
        }
    }

    /// 两个原理图在实体层面等价（忽略 ID 分配器状态）
    pub fn equivalent(&self, other: &Schematic) -> bool {
        self.name == other.name
            && (self.width - other.width).abs() < EPSILON
            && (self.height - other.height).abs() < EPSILON
            && self.prelude == other.prelude
            && self.instances.len() == other.instances.len()
            && self
                .instances
                .iter()
                .zip(&other.instances)
                .all(|(a, b)| {
                    a.name == b.name
                        && a.of == b.of
                        && a.kind == b.kind
                        && a.loc == b.loc
                        && a.orientation == b.orientation
                })
            && self.ports.len() == other.ports.len()
            && self
                .ports
                .iter()
                .zip(&other.ports)
                .all(|(a, b)| {
                    a.kind == b.kind
                        && a.name == b.name
                        && a.loc == b.loc
                        && a.orientation == b.orientation
                })
            && self.wires.len() == other.wires.len()
            && self
                .wires
                .iter()
                .zip(&other.wires)
                .all(|(a, b)| a.points == b.points && a.name == b.name)
            && self.others == other.others
            && self.dots == other.dots
    }
}

impl Default for Schematic {
    fn default() -> Self {
        Self::new("schematic")
    }
}

/// 从导线集合推导交点标记
///
/// 对每个不同位置统计：终端端点数 e 与"路径经过但非端点"的导线数 m。
/// e >= 3 时为多路交汇；e >= 1 且 m >= 1 时为 T 形交汇。
/// 结果按 (x, y) 排序，与导线遍历顺序无关。
pub fn infer_dots(wires: &[Wire]) -> Vec<Dot> {
    // 网格对齐坐标用整数键聚合
    let key = |p: &Point2| (p.x.round() as i64, p.y.round() as i64);

    let mut endpoints: BTreeMap<(i64, i64), (Point2, u32)> = BTreeMap::new();
    for wire in wires {
        for ep in wire.endpoints() {
            let entry = endpoints.entry(key(&ep)).or_insert((ep, 0));
            entry.1 += 1;
        }
    }

    let mut dots = Vec::new();
    for (loc, e_count) in endpoints.values() {
        let mid_count = wires
            .iter()
            .filter(|w| !w.is_endpoint(loc) && w.on_path(loc))
            .count() as u32;
        if *e_count >= 3 || (*e_count >= 1 && mid_count >= 1) {
            dots.push(Dot { loc: *loc });
        }
    }
    dots
}
