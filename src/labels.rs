use serde::{Deserialize, Serialize};

use crate::correlation::AcceptedCorrelations;
use crate::error::{Result, RoiError};
use crate::neighbors::NeighborMap;
use crate::voxel_grid::{VoxelCoordinate, voxel_count};

/// 体素标签，数值即 LabelVolume 中存储的整数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Label {
    /// 从未被任何中心或邻居写入
    Background = 0,
    /// 某个合格中心的相关邻居
    Member = 1,
    /// 合格中心
    Center = 2,
}

impl Label {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(value: u8) -> Self {
        match value {
            2 => Label::Center,
            1 => Label::Member,
            _ => Label::Background,
        }
    }
}

/// 各标签的体素数量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCounts {
    pub background: usize,
    pub member: usize,
    pub center: usize,
}

/// 与输入体数据同形状的标签体，初始全为 0
/// 只有 ClusterAccumulator 能写入，对外只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVolume {
    shape: [usize; 3],
    data: Vec<u8>,
}

impl LabelVolume {
    pub(crate) fn zeros(shape: [usize; 3]) -> Result<Self> {
        Ok(Self {
            shape,
            data: vec![Label::Background.as_u8(); voxel_count(shape)?],
        })
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// 读取坐标处的标签，越界返回 None
    pub fn get(&self, coordinate: VoxelCoordinate) -> Option<Label> {
        if !coordinate.within(self.shape) {
            return None;
        }
        Some(Label::from_u8(self.data[coordinate.flat_index(self.shape)]))
    }

    /// 扁平标签数组，布局与 VoxelGrid 相同（x 变化最快）
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn counts(&self) -> LabelCounts {
        self.data
            .iter()
            .fold(LabelCounts::default(), |mut counts, &value| {
                match Label::from_u8(value) {
                    Label::Background => counts.background += 1,
                    Label::Member => counts.member += 1,
                    Label::Center => counts.center += 1,
                }
                counts
            })
    }

    /// 所有非背景体素的坐标及标签，按扁平索引顺序
    pub fn nonzero(&self) -> Vec<(VoxelCoordinate, Label)> {
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value != Label::Background.as_u8())
            .map(|(index, &value)| {
                (
                    VoxelCoordinate::from_flat_index(index, self.shape),
                    Label::from_u8(value),
                )
            })
            .collect()
    }

    fn check_bounds(&self, coordinate: VoxelCoordinate) -> Result<()> {
        if coordinate.within(self.shape) {
            Ok(())
        } else {
            Err(RoiError::bounds(coordinate, self.shape))
        }
    }

    /// 调用方需先用 `check_bounds` 校验坐标
    fn slot_mut(&mut self, coordinate: VoxelCoordinate) -> &mut u8 {
        let index = coordinate.flat_index(self.shape);
        &mut self.data[index]
    }
}

/// 持有标签体，并按最小聚类规则写入标签
///
/// 写入规则: 中心总是写 2；邻居只在当前值不是 2 时写 1。
/// 因此最终结果与中心的处理顺序无关。
#[derive(Debug, Clone)]
pub struct ClusterAccumulator {
    labels: LabelVolume,
    min_cluster_size: usize,
}

impl ClusterAccumulator {
    pub fn new(shape: [usize; 3], min_cluster_size: usize) -> Result<Self> {
        Ok(Self {
            labels: LabelVolume::zeros(shape)?,
            min_cluster_size,
        })
    }

    pub fn min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    /// 通过的方向数少于 min_cluster_size 时不做任何写入，返回 Ok(false)
    ///
    /// 写入前先校验全部坐标：中心或邻居越界返回 BoundsViolation，
    /// `accepted` 中的方向在 `neighbors` 里缺失返回 MissingNeighbor。
    /// 出错时标签体保持不变。
    pub fn update_cluster_array(
        &mut self,
        accepted: &AcceptedCorrelations,
        center: VoxelCoordinate,
        neighbors: &NeighborMap,
    ) -> Result<bool> {
        self.labels.check_bounds(center)?;
        if accepted.len() < self.min_cluster_size {
            return Ok(false);
        }

        let members = accepted
            .iter()
            .map(|(direction, _)| -> Result<VoxelCoordinate> {
                let &neighbor = neighbors
                    .get(direction)
                    .ok_or(RoiError::MissingNeighbor { center, direction })?;
                self.labels.check_bounds(neighbor)?;
                Ok(neighbor)
            })
            .collect::<Result<Vec<_>>>()?;

        for neighbor in members {
            let slot = self.labels.slot_mut(neighbor);
            if *slot != Label::Center.as_u8() {
                *slot = Label::Member.as_u8();
            }
        }
        *self.labels.slot_mut(center) = Label::Center.as_u8();
        Ok(true)
    }

    pub fn labels(&self) -> &LabelVolume {
        &self.labels
    }

    pub fn into_labels(self) -> LabelVolume {
        self.labels
    }
}
