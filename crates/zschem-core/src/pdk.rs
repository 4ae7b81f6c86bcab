//! PDK 器件元数据
//!
//! 器件发现桥以 JSON 形式交付的结构化记录。核心不执行发现本身，
//! 只消费已验证的记录并将其映射到符号种类/分类。

use serde::{Deserialize, Serialize};

/// 器件端口信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortInfo {
    pub name: String,
    /// "input" / "output" / "inout"
    #[serde(default = "default_direction")]
    pub direction: String,
}

fn default_direction() -> String {
    "inout".to_string()
}

/// 器件参数信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    #[serde(default)]
    pub dtype: String,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub description: String,
}

/// 完整的器件信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    /// 如 "gf180.nmos"
    pub module_path: String,
    pub category: String,
    #[serde(default)]
    pub ports: Vec<PortInfo>,
    #[serde(default)]
    pub params: Vec<ParamInfo>,
    /// 映射到的内建符号种类
    #[serde(default)]
    pub symbol_type: Option<String>,
}

/// PDK 包信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdkInfo {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub devices: Vec<DeviceInfo>,
}

/// 器件名模式 -> 符号种类。顺序敏感，更具体的模式在前。
const SYMBOL_PATTERNS: &[(&[&str], &str)] = &[
    (&["nfet", "nmos", "nch"], "nmos"),
    (&["pfet", "pmos", "pch"], "pmos"),
    (&["npn"], "npn"),
    (&["pnp"], "pnp"),
    (&["mim", "cap_", "cap"], "cap"),
    (
        &[
            "nplus", "pplus", "nwell", "polyf", "rm1", "rm2", "rm3", "tm6k", "tm9k", "tm11k",
            "tm30k", "res",
        ],
        "res3",
    ),
    (&["ind", "inductor"], "ind"),
    (
        &[
            "diode", "nd2ps", "pd2nw", "nw2ps", "pw2dw", "dw2ps", "schottky", "sc_diode",
        ],
        "diode",
    ),
    (&["vsource", "vdc", "vpulse"], "vsource"),
    (&["isource", "idc", "ipulse"], "isource"),
];

/// 分类模式，顺序敏感
const CATEGORY_PATTERNS: &[(&[&str], &str)] = &[
    (&["npn", "pnp", "bjt"], "transistors"),
    (
        &["nfet", "pfet", "nmos", "pmos", "nch", "pch", "fet"],
        "transistors",
    ),
    (
        &[
            "diode", "nd2ps", "pd2nw", "nw2ps", "pw2dw", "dw2ps", "schottky", "sc_diode",
        ],
        "diodes",
    ),
    (&["mim", "cap_", "cap"], "passives"),
    (
        &[
            "nplus", "pplus", "nwell", "polyf", "rm1", "rm2", "rm3", "tm6k", "tm9k", "tm11k",
            "tm30k", "res",
        ],
        "passives",
    ),
    (&["ind", "inductor"], "passives"),
    (&["vsource", "isource", "vdc", "idc"], "sources"),
];

/// 根据器件名（与端口数）推断使用的符号种类
///
/// 电阻特殊处理：两端口用 "res"，三端及以上用 "res3"。
/// 无匹配时返回 None，由调用方决定是报错还是回退。
pub fn symbol_kind_for(name: &str, num_ports: usize) -> Option<&'static str> {
    let lower = name.to_lowercase();
    for (patterns, symbol) in SYMBOL_PATTERNS {
        if patterns.iter().any(|p| lower.contains(p)) {
            if *symbol == "res3" && num_ports <= 2 {
                return Some("res");
            }
            return Some(symbol);
        }
    }
    None
}

/// 根据器件名推断分类
pub fn category_for(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    for (patterns, category) in CATEGORY_PATTERNS {
        if patterns.iter().any(|p| lower.contains(p)) {
            return category;
        }
    }
    "other"
}
