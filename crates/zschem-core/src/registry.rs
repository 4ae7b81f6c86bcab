//! 元件注册表
//!
//! 编辑会话持有的显式注册对象，取代模块级全局缓存：
//! - 内建元件按种类标识注册
//! - PDK 器件按 `pdk.<pdk>.<device>` 注册
//! - 自定义符号按 `sym.<路径键>` 注册
//!
//! 未知种类是硬错误，不做静默回退。

use crate::element::{builtin_elements, builtin_port_elements, Element, PortElement, PortKind};
use crate::entity::ModelError;
use crate::pdk::{symbol_kind_for, DeviceInfo, PdkInfo};
use std::collections::BTreeMap;

/// 会话级元件注册表
#[derive(Debug, Clone)]
pub struct ElementRegistry {
    /// 种类标识 -> 描述符，BTreeMap 保证枚举顺序稳定
    elements: BTreeMap<String, Element>,
    port_elements: Vec<PortElement>,
    /// 内建种类集合，清理外部注册时保留
    builtin_ids: Vec<String>,
}

impl ElementRegistry {
    /// 创建并播种内建目录
    pub fn new() -> Self {
        let builtins = builtin_elements();
        let builtin_ids = builtins.iter().map(|e| e.id.clone()).collect();
        Self {
            elements: builtins.into_iter().map(|e| (e.id.clone(), e)).collect(),
            port_elements: builtin_port_elements(),
            builtin_ids,
        }
    }

    /// 按种类标识查找元件；未知种类是错误而非默认值
    pub fn element(&self, kind: &str) -> Result<&Element, ModelError> {
        self.elements
            .get(kind)
            .ok_or_else(|| ModelError::UnknownElement(kind.to_string()))
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.elements.contains_key(kind)
    }

    /// 端口符号查找；种类封闭，内建目录覆盖全部
    pub fn port_element(&self, kind: PortKind) -> Option<&PortElement> {
        self.port_elements.iter().find(|p| p.kind == kind)
    }

    /// 注册外部元件（自定义符号等）；种类标识冲突是错误
    pub fn register(&mut self, element: Element) -> Result<(), ModelError> {
        if self.elements.contains_key(&element.id) {
            return Err(ModelError::DuplicateName(element.id));
        }
        self.elements.insert(element.id.clone(), element);
        Ok(())
    }

    /// 注册一个 PDK 的全部器件，返回注册数量
    pub fn register_pdk(&mut self, pdk: &PdkInfo) -> Result<usize, ModelError> {
        let mut count = 0;
        for dev in &pdk.devices {
            let element = self.element_for_device(&pdk.name, dev)?;
            self.register(element)?;
            count += 1;
        }
        tracing::info!("registered {} devices from pdk '{}'", count, pdk.name);
        Ok(count)
    }

    /// 由器件记录构建元件描述符
    ///
    /// 符号图形借用匹配的内建符号；器件端口按序映射到符号连接点，
    /// 超出符号连接点数量的端口被忽略并告警。
    fn element_for_device(&self, pdk_name: &str, dev: &DeviceInfo) -> Result<Element, ModelError> {
        let base_kind = match &dev.symbol_type {
            Some(kind) => kind.clone(),
            None => symbol_kind_for(&dev.name, dev.ports.len())
                .ok_or_else(|| ModelError::UnknownElement(dev.name.clone()))?
                .to_string(),
        };
        let base = self.element(&base_kind)?;

        let mut symbol = base.symbol.clone();
        if dev.ports.len() > symbol.ports.len() {
            tracing::warn!(
                "device '{}' has {} ports but symbol '{}' has {}; extras ignored",
                dev.name,
                dev.ports.len(),
                base_kind,
                symbol.ports.len()
            );
        }
        for (slot, port) in symbol.ports.iter_mut().zip(dev.ports.iter()) {
            slot.name = port.name.clone();
        }
        symbol.ports.truncate(dev.ports.len().min(symbol.ports.len()).max(1));

        Ok(Element::new(
            format!("pdk.{}.{}", pdk_name, dev.name),
            base.name_prefix.clone(),
            format!("{}()", dev.module_path),
            symbol,
        ))
    }

    /// 清除所有外部注册（PDK 器件、自定义符号），保留内建目录
    pub fn clear_external(&mut self) {
        let keep = std::mem::take(&mut self.builtin_ids);
        self.elements.retain(|id, _| keep.contains(id));
        self.builtin_ids = keep;
    }

    /// 按种类标识排序的全部元件
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdk::PortInfo;

    fn device(name: &str, ports: &[&str]) -> DeviceInfo {
        DeviceInfo {
            name: name.to_string(),
            module_path: format!("gf180.{}", name),
            category: "transistors".to_string(),
            ports: ports
                .iter()
                .map(|p| PortInfo {
                    name: p.to_string(),
                    direction: "inout".to_string(),
                })
                .collect(),
            params: vec![],
            symbol_type: None,
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let reg = ElementRegistry::new();
        assert!(reg.element("nmos").is_ok());
        assert!(reg.element("pmos").is_ok());
        assert_eq!(
            reg.element("nonexistent"),
            Err(ModelError::UnknownElement("nonexistent".to_string()))
        );
    }

    #[test]
    fn test_port_elements_cover_all_kinds() {
        let reg = ElementRegistry::new();
        for kind in [
            PortKind::Input,
            PortKind::Output,
            PortKind::Inout,
            PortKind::Gnd,
            PortKind::Vdd,
        ] {
            assert!(reg.port_element(kind).is_some());
        }
    }

    #[test]
    fn test_register_pdk() {
        let mut reg = ElementRegistry::new();
        let pdk = PdkInfo {
            name: "gf180".to_string(),
            version: "0.1".to_string(),
            description: String::new(),
            devices: vec![device("nfet_03v3", &["d", "g", "s", "b"])],
        };
        assert_eq!(reg.register_pdk(&pdk).unwrap(), 1);

        let elem = reg.element("pdk.gf180.nfet_03v3").unwrap();
        assert_eq!(elem.default_of, "gf180.nfet_03v3()");
        let names: Vec<&str> = elem.symbol.ports.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["d", "g", "s", "b"]);
    }

    #[test]
    fn test_unmatchable_device_is_error() {
        let mut reg = ElementRegistry::new();
        let pdk = PdkInfo {
            name: "x".to_string(),
            version: "0.1".to_string(),
            description: String::new(),
            devices: vec![device("mystery_device", &["a", "b"])],
        };
        assert!(matches!(
            reg.register_pdk(&pdk),
            Err(ModelError::UnknownElement(_))
        ));
    }

    #[test]
    fn test_clear_external() {
        let mut reg = ElementRegistry::new();
        let pdk = PdkInfo {
            name: "gf180".to_string(),
            version: "0.1".to_string(),
            description: String::new(),
            devices: vec![device("nfet_03v3", &["d", "g", "s", "b"])],
        };
        reg.register_pdk(&pdk).unwrap();
        assert!(reg.contains("pdk.gf180.nfet_03v3"));

        reg.clear_external();
        assert!(!reg.contains("pdk.gf180.nfet_03v3"));
        assert!(reg.contains("nmos"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut reg = ElementRegistry::new();
        let elems = builtin_elements();
        let clash = elems.into_iter().next().unwrap();
        assert!(matches!(
            reg.register(clash),
            Err(ModelError::DuplicateName(_))
        ));
    }
}
