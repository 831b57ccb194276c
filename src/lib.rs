//! 多受试者体数据的邻域相关 ROI 查找
//!
//! 对每个体素，计算其跨受试者取值向量与 6 邻域体素的 Pearson 相关，
//! 通过阈值且数量达到最小聚类规模的中心标记为 2，其相关邻居标记为 1。

pub mod config;
pub mod correlation;
pub mod error;
pub mod finder;
pub mod labels;
pub mod neighbors;
pub mod performance;
pub mod profile;
pub mod synthetic;
pub mod task;
pub mod volume_set;
pub mod voxel_grid;

pub use config::{RoiConfig, Thresholds};
pub use correlation::{AcceptedCorrelations, CorrelationGate, CorrelationResult, pearson};
pub use error::{Result, RoiError};
pub use finder::{CenterOutcome, RoiFinder, RoiRun};
pub use labels::{ClusterAccumulator, Label, LabelCounts, LabelVolume};
pub use neighbors::{Direction, DirectionMap, NeighborMap, NeighborResolver};
pub use performance::RunReport;
pub use profile::{NeighborProfiles, Profile, ProfileExtractor};
pub use synthetic::ToyVolumes;
pub use volume_set::{VolumeSet, VolumeSource};
pub use voxel_grid::{VoxelCoordinate, VoxelGrid};
