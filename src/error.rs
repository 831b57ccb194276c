use thiserror::Error;

use crate::neighbors::Direction;
use crate::voxel_grid::VoxelCoordinate;

/// 体素 ROI 计算过程中可能出现的错误
#[derive(Debug, Error)]
pub enum RoiError {
    /// 输入体数据或阈值配置不合法，运行前即失败
    #[error("配置错误: {message}")]
    Configuration { message: String },

    /// JSON 配置文档无法解析
    #[error("配置解析失败: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// 坐标超出体数据范围（不做截断）
    #[error("坐标 {coordinate} 超出体数据范围 {shape:?}")]
    BoundsViolation {
        coordinate: VoxelCoordinate,
        shape: [usize; 3],
    },

    /// 通过检验的方向在邻居映射中没有对应坐标
    #[error("中心 {center} 的 {direction} 方向通过检验，但邻居映射中没有该方向")]
    MissingNeighbor {
        center: VoxelCoordinate,
        direction: Direction,
    },

    /// 并行线程池创建失败
    #[error("线程池创建失败: {message}")]
    WorkerPool { message: String },
}

impl RoiError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn bounds(coordinate: VoxelCoordinate, shape: [usize; 3]) -> Self {
        Self::BoundsViolation { coordinate, shape }
    }
}

pub type Result<T> = std::result::Result<T, RoiError>;
