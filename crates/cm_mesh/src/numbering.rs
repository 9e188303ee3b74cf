// crates/cm_mesh/src/numbering.rs

//! 记录编号管理
//!
//! 网格文件中的节点/单元编号允许稀疏、乱序，但绝大多数文件是
//! 从 1 开始的连续编号。[`Numbering`] 对两种情况分别建模：
//! 连续编号用 O(1) 算术求位置，乱序编号退化为查找表。
//!
//! 编号是否连续在解析时增量判定（每条记录一次比较），
//! 发现乱序后再整体建表，不会中途切换出部分状态。

use crate::error::{MeshError, MeshResult};
use std::collections::HashMap;

/// 编号到存储位置的映射
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Numbering {
    /// 编号为 1..=n 的连续序列，位置 = 编号 - 1
    Sequential,
    /// 稀疏/乱序编号，显式查找表
    Indexed(HashMap<usize, usize>),
}

impl Numbering {
    /// 从编号序列构建
    ///
    /// 先按顺序逐个比较判定是否为 1..=n 连续编号，
    /// 不连续时再做第二遍建表。编号必须唯一。
    ///
    /// # Errors
    /// 出现重复编号时返回错误，不做后者覆盖前者的静默处理。
    pub fn from_ids(ids: &[usize]) -> MeshResult<Self> {
        let sequential = ids.iter().enumerate().all(|(i, &id)| id == i + 1);
        if sequential {
            return Ok(Self::Sequential);
        }
        let mut map = HashMap::with_capacity(ids.len());
        for (i, &id) in ids.iter().enumerate() {
            if map.insert(id, i).is_some() {
                return Err(MeshError::invalid_topology(
                    "numbering",
                    format!("编号 {id} 重复出现"),
                ));
            }
        }
        Ok(Self::Indexed(map))
    }

    /// 查询编号对应的存储位置
    #[must_use]
    pub fn position_of(&self, id: usize, len: usize) -> Option<usize> {
        match self {
            Self::Sequential => {
                if id >= 1 && id <= len {
                    Some(id - 1)
                } else {
                    None
                }
            }
            Self::Indexed(map) => map.get(&id).copied(),
        }
    }

    /// 是否为连续编号
    #[must_use]
    pub fn is_sequential(&self) -> bool {
        matches!(self, Self::Sequential)
    }
}

impl Default for Numbering {
    fn default() -> Self {
        Self::Sequential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_detection() {
        let numbering = Numbering::from_ids(&[1, 2, 3, 4]).unwrap();
        assert!(numbering.is_sequential());
        assert_eq!(numbering.position_of(1, 4), Some(0));
        assert_eq!(numbering.position_of(4, 4), Some(3));
        assert_eq!(numbering.position_of(5, 4), None);
        assert_eq!(numbering.position_of(0, 4), None);
    }

    #[test]
    fn test_sparse_ids_build_lookup_table() {
        let numbering = Numbering::from_ids(&[10, 20, 5]).unwrap();
        assert!(!numbering.is_sequential());
        assert_eq!(numbering.position_of(10, 3), Some(0));
        assert_eq!(numbering.position_of(20, 3), Some(1));
        assert_eq!(numbering.position_of(5, 3), Some(2));
        assert_eq!(numbering.position_of(1, 3), None);
    }

    #[test]
    fn test_shifted_sequence_is_not_sequential() {
        // 2..=5 连续但不从 1 开始
        let numbering = Numbering::from_ids(&[2, 3, 4, 5]).unwrap();
        assert!(!numbering.is_sequential());
        assert_eq!(numbering.position_of(2, 4), Some(0));
    }

    #[test]
    fn test_empty_ids() {
        let numbering = Numbering::from_ids(&[]).unwrap();
        assert!(numbering.is_sequential());
        assert_eq!(numbering.position_of(1, 0), None);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = Numbering::from_ids(&[10, 20, 10]).unwrap_err();
        assert!(err.to_string().contains("10"));
        // 连续段内的重复同样被拒绝
        assert!(Numbering::from_ids(&[1, 2, 2]).is_err());
    }
}
