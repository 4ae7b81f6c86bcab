//! 变更与撤销引擎
//!
//! 每个 [`Change`] 记录一次可逆编辑；其逆变更必须把原理图
//! 恢复到编辑前的逐位相同状态（相同实体 ID、相同字段值）。
//!
//! [`ChangeLog`] 是带游标的线性历史：游标之前为已应用，之后为可重做。
//! 游标处追加新变更会丢弃尚未重做的尾部（标准线性撤销语义）。

use crate::entity::{Entity, EntityId, LabelKind};
use crate::math::{Place, Point2};
use serde::{Deserialize, Serialize};

/// 一次可逆编辑
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Change {
    /// 加入实体（携带完整快照，含 ID）
    Add(Entity),
    /// 移除实体（携带被移除时的完整快照）
    Remove(Entity),
    /// 移动可放置实体
    Move {
        id: EntityId,
        from: Place,
        to: Place,
    },
    /// 整体改写导线点序列
    MoveWire {
        id: EntityId,
        from: Vec<Point2>,
        to: Vec<Point2>,
    },
    /// 编辑标签文本
    EditText {
        id: EntityId,
        label: LabelKind,
        from: String,
        to: String,
    },
    /// 原子批次：撤销/重做作为单步
    Batch(Vec<Change>),
}

impl Change {
    /// 合成逆变更
    ///
    /// Add 与 Remove 互逆；Move/MoveWire/EditText 交换 from/to；
    /// Batch 的子变更逐个取逆并整体倒序，以正确回退相互依赖的编辑。
    pub fn inverted(&self) -> Change {
        match self {
            Change::Add(entity) => Change::Remove(entity.clone()),
            Change::Remove(entity) => Change::Add(entity.clone()),
            Change::Move { id, from, to } => Change::Move {
                id: *id,
                from: *to,
                to: *from,
            },
            Change::MoveWire { id, from, to } => Change::MoveWire {
                id: *id,
                from: to.clone(),
                to: from.clone(),
            },
            Change::EditText {
                id,
                label,
                from,
                to,
            } => Change::EditText {
                id: *id,
                label: *label,
                from: to.clone(),
                to: from.clone(),
            },
            Change::Batch(changes) => {
                Change::Batch(changes.iter().rev().map(Change::inverted).collect())
            }
        }
    }
}

/// 带游标的变更历史
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChangeLog {
    entries: Vec<Change>,
    /// 游标：entries[..cursor] 已应用，entries[cursor..] 可重做
    cursor: usize,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次已由调用方施加的变更
    ///
    /// 只记录历史，不重放变更本身。游标之后的重做尾部被丢弃。
    pub fn add(&mut self, change: Change) {
        self.entries.truncate(self.cursor);
        self.entries.push(change);
        self.cursor = self.entries.len();
    }

    /// 后退一步，返回应施加的逆变更；历史起点处为无操作
    pub fn undo(&mut self) -> Option<Change> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.entries[self.cursor].inverted())
    }

    /// 前进一步，返回应施加的正向变更；历史终点处为无操作
    pub fn redo(&mut self) -> Option<Change> {
        if self.cursor == self.entries.len() {
            return None;
        }
        let change = self.entries[self.cursor].clone();
        self.cursor += 1;
        Some(change)
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
