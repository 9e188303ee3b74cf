// crates/cm_mesh/src/boundary.rs

//! 边界记录
//!
//! 开边界只是节点串；陆地边界带类型码，类型码决定每个节点
//! 携带的附加属性列。附加属性按类型码建模为带标签枚举，
//! 不同类型之间不可能出现属性错配。
//!
//! # 陆地边界类型码
//!
//! | 代码 | 含义 | 每节点属性 |
//! |---|---|---|
//! | 3, 13, 23 | 外堰 | 堰顶高程, 超临界流系数 |
//! | 4, 24 | 内堰（成对节点） | 对侧节点, 堰顶, 亚临界, 超临界 |
//! | 5, 25 | 带涵管的内堰 | 同上 + 涵管高程, 系数, 管径 |
//! | 其余 | 普通陆地/岛屿 | 无 |

use crate::error::{MeshError, MeshResult};
use crate::node::Node;
use serde::{Deserialize, Serialize};

/// 开边界（潮位驱动边界）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenBoundary {
    /// 节点存储位置序列
    pub nodes: Vec<usize>,
}

impl OpenBoundary {
    /// 创建开边界
    #[must_use]
    pub fn new(nodes: Vec<usize>) -> Self {
        Self { nodes }
    }

    /// 节点数
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// 陆地边界的类型码相关附加属性
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LandPayload {
    /// 普通陆地/岛屿边界，无附加属性
    Simple,
    /// 外堰：堰顶高程 + 超临界流系数
    SingleWeir {
        /// 每节点堰顶高程
        crest: Vec<f64>,
        /// 每节点超临界流系数
        supercritical: Vec<f64>,
    },
    /// 内堰：对侧节点串 + 堰顶 + 亚/超临界流系数
    PairedWeir {
        /// 对侧节点存储位置（与主节点串等长）
        paired_nodes: Vec<usize>,
        /// 每节点堰顶高程
        crest: Vec<f64>,
        /// 每节点亚临界流系数
        subcritical: Vec<f64>,
        /// 每节点超临界流系数
        supercritical: Vec<f64>,
    },
    /// 带涵管的内堰
    Pipe {
        /// 对侧节点存储位置
        paired_nodes: Vec<usize>,
        /// 每节点堰顶高程
        crest: Vec<f64>,
        /// 每节点亚临界流系数
        subcritical: Vec<f64>,
        /// 每节点超临界流系数
        supercritical: Vec<f64>,
        /// 涵管中心高程
        pipe_height: Vec<f64>,
        /// 涵管流量系数
        pipe_coefficient: Vec<f64>,
        /// 涵管直径
        pipe_diameter: Vec<f64>,
    },
}

/// 陆地边界
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandBoundary {
    /// 类型码
    pub code: u32,
    /// 主节点存储位置序列
    pub nodes: Vec<usize>,
    /// 类型码决定的附加属性
    pub payload: LandPayload,
}

impl LandBoundary {
    /// 按类型码创建空边界
    #[must_use]
    pub fn new(code: u32) -> Self {
        let payload = match code {
            3 | 13 | 23 => LandPayload::SingleWeir {
                crest: Vec::new(),
                supercritical: Vec::new(),
            },
            4 | 24 => LandPayload::PairedWeir {
                paired_nodes: Vec::new(),
                crest: Vec::new(),
                subcritical: Vec::new(),
                supercritical: Vec::new(),
            },
            5 | 25 => LandPayload::Pipe {
                paired_nodes: Vec::new(),
                crest: Vec::new(),
                subcritical: Vec::new(),
                supercritical: Vec::new(),
                pipe_height: Vec::new(),
                pipe_coefficient: Vec::new(),
                pipe_diameter: Vec::new(),
            },
            _ => LandPayload::Simple,
        };
        Self {
            code,
            nodes: Vec::new(),
            payload,
        }
    }

    /// 节点数
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 是否为外堰
    #[must_use]
    pub fn is_single_weir(&self) -> bool {
        matches!(self.code, 3 | 13 | 23)
    }

    /// 是否为内堰
    #[must_use]
    pub fn is_paired_weir(&self) -> bool {
        matches!(self.code, 4 | 24)
    }

    /// 是否为带涵管的内堰
    #[must_use]
    pub fn is_pipe(&self) -> bool {
        matches!(self.code, 5 | 25)
    }

    /// 追加普通节点
    ///
    /// # Errors
    /// 类型码要求附加属性时返回错误。
    pub fn push_simple(&mut self, node: usize) -> MeshResult<()> {
        match &mut self.payload {
            LandPayload::Simple => {
                self.nodes.push(node);
                Ok(())
            }
            _ => Err(MeshError::invalid_boundary(
                "land",
                self.code as usize,
                "该类型码要求附加属性",
            )),
        }
    }

    /// 追加外堰节点
    ///
    /// # Errors
    /// 类型码不是外堰时返回错误。
    pub fn push_single_weir(
        &mut self,
        node: usize,
        crest_height: f64,
        supercritical_coef: f64,
    ) -> MeshResult<()> {
        match &mut self.payload {
            LandPayload::SingleWeir {
                crest,
                supercritical,
            } => {
                self.nodes.push(node);
                crest.push(crest_height);
                supercritical.push(supercritical_coef);
                Ok(())
            }
            _ => Err(MeshError::invalid_boundary(
                "land",
                self.code as usize,
                "类型码不是外堰",
            )),
        }
    }

    /// 追加内堰节点对
    ///
    /// # Errors
    /// 类型码不是内堰时返回错误。
    pub fn push_paired_weir(
        &mut self,
        node: usize,
        paired: usize,
        crest_height: f64,
        subcritical_coef: f64,
        supercritical_coef: f64,
    ) -> MeshResult<()> {
        match &mut self.payload {
            LandPayload::PairedWeir {
                paired_nodes,
                crest,
                subcritical,
                supercritical,
            } => {
                self.nodes.push(node);
                paired_nodes.push(paired);
                crest.push(crest_height);
                subcritical.push(subcritical_coef);
                supercritical.push(supercritical_coef);
                Ok(())
            }
            _ => Err(MeshError::invalid_boundary(
                "land",
                self.code as usize,
                "类型码不是内堰",
            )),
        }
    }

    /// 追加带涵管的内堰节点对
    ///
    /// # Errors
    /// 类型码不是涵管内堰时返回错误。
    #[allow(clippy::too_many_arguments)]
    pub fn push_pipe(
        &mut self,
        node: usize,
        paired: usize,
        crest_height: f64,
        subcritical_coef: f64,
        supercritical_coef: f64,
        height: f64,
        coefficient: f64,
        diameter: f64,
    ) -> MeshResult<()> {
        match &mut self.payload {
            LandPayload::Pipe {
                paired_nodes,
                crest,
                subcritical,
                supercritical,
                pipe_height,
                pipe_coefficient,
                pipe_diameter,
            } => {
                self.nodes.push(node);
                paired_nodes.push(paired);
                crest.push(crest_height);
                subcritical.push(subcritical_coef);
                supercritical.push(supercritical_coef);
                pipe_height.push(height);
                pipe_coefficient.push(coefficient);
                pipe_diameter.push(diameter);
                Ok(())
            }
            _ => Err(MeshError::invalid_boundary(
                "land",
                self.code as usize,
                "类型码不是涵管内堰",
            )),
        }
    }

    /// 校验附加属性列与主节点串等长
    ///
    /// # Errors
    /// 任一属性列长度不符时返回错误。
    pub fn validate(&self, index: usize) -> MeshResult<()> {
        let n = self.nodes.len();
        let check = |len: usize, name: &str| -> MeshResult<()> {
            if len != n {
                Err(MeshError::invalid_boundary(
                    "land",
                    index,
                    format!("属性列 {name} 长度 {len} != 节点数 {n}"),
                ))
            } else {
                Ok(())
            }
        };
        match &self.payload {
            LandPayload::Simple => Ok(()),
            LandPayload::SingleWeir {
                crest,
                supercritical,
            } => {
                check(crest.len(), "crest")?;
                check(supercritical.len(), "supercritical")
            }
            LandPayload::PairedWeir {
                paired_nodes,
                crest,
                subcritical,
                supercritical,
            } => {
                check(paired_nodes.len(), "paired_nodes")?;
                check(crest.len(), "crest")?;
                check(subcritical.len(), "subcritical")?;
                check(supercritical.len(), "supercritical")
            }
            LandPayload::Pipe {
                paired_nodes,
                crest,
                subcritical,
                supercritical,
                pipe_height,
                pipe_coefficient,
                pipe_diameter,
            } => {
                check(paired_nodes.len(), "paired_nodes")?;
                check(crest.len(), "crest")?;
                check(subcritical.len(), "subcritical")?;
                check(supercritical.len(), "supercritical")?;
                check(pipe_height.len(), "pipe_height")?;
                check(pipe_coefficient.len(), "pipe_coefficient")?;
                check(pipe_diameter.len(), "pipe_diameter")
            }
        }
    }

    /// 输出原生 ASCII 的每节点记录行（不含 `count code` 头行）
    ///
    /// # Errors
    /// 节点位置越界或属性列长度不符时返回错误。
    pub fn to_adcirc_records(&self, nodes: &[Node]) -> MeshResult<Vec<String>> {
        self.validate(0)?;
        let node_id = |pos: usize| -> MeshResult<usize> {
            nodes.get(pos).map(|n| n.id).ok_or_else(|| {
                MeshError::invalid_topology(
                    "write_boundary",
                    format!("边界引用越界节点位置 {pos}"),
                )
            })
        };
        let mut records = Vec::with_capacity(self.nodes.len());
        match &self.payload {
            LandPayload::Simple => {
                for &pos in &self.nodes {
                    records.push(format!("{:11}", node_id(pos)?));
                }
            }
            LandPayload::SingleWeir {
                crest,
                supercritical,
            } => {
                for (i, &pos) in self.nodes.iter().enumerate() {
                    records.push(format!(
                        "{:11} {:18.10} {:18.10}",
                        node_id(pos)?,
                        crest[i],
                        supercritical[i]
                    ));
                }
            }
            LandPayload::PairedWeir {
                paired_nodes,
                crest,
                subcritical,
                supercritical,
            } => {
                for (i, &pos) in self.nodes.iter().enumerate() {
                    records.push(format!(
                        "{:11} {:11} {:18.10} {:18.10} {:18.10}",
                        node_id(pos)?,
                        node_id(paired_nodes[i])?,
                        crest[i],
                        subcritical[i],
                        supercritical[i]
                    ));
                }
            }
            LandPayload::Pipe {
                paired_nodes,
                crest,
                subcritical,
                supercritical,
                pipe_height,
                pipe_coefficient,
                pipe_diameter,
            } => {
                for (i, &pos) in self.nodes.iter().enumerate() {
                    records.push(format!(
                        "{:11} {:11} {:18.10} {:18.10} {:18.10} {:18.10} {:18.10} {:18.10}",
                        node_id(pos)?,
                        node_id(paired_nodes[i])?,
                        crest[i],
                        subcritical[i],
                        supercritical[i],
                        pipe_height[i],
                        pipe_coefficient[i],
                        pipe_diameter[i]
                    ));
                }
            }
        }
        Ok(records)
    }
}
