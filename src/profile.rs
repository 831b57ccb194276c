use crate::error::{Result, RoiError};
use crate::neighbors::{DirectionMap, NeighborMap};
use crate::volume_set::VolumeSet;
use crate::voxel_grid::VoxelCoordinate;

/// 同一坐标在各受试者体数据中的取值，按受试者顺序排列
pub type Profile = Vec<f64>;

/// 方向 -> 邻居 Profile
pub type NeighborProfiles = DirectionMap<Profile>;

/// 从 VolumeSet 中按坐标抽取跨受试者的取值向量
#[derive(Debug, Clone, Copy)]
pub struct ProfileExtractor<'a> {
    volumes: &'a VolumeSet,
}

impl<'a> ProfileExtractor<'a> {
    pub fn new(volumes: &'a VolumeSet) -> Self {
        Self { volumes }
    }

    pub fn get_voxels(&self, coordinate: VoxelCoordinate) -> Result<Profile> {
        let shape = self.volumes.shape();
        if !coordinate.within(shape) {
            return Err(RoiError::bounds(coordinate, shape));
        }
        let index = coordinate.flat_index(shape);
        Ok(self
            .volumes
            .volumes()
            .iter()
            .map(|volume| volume.data()[index])
            .collect())
    }

    pub fn get_neighbor_voxels(&self, neighbors: &NeighborMap) -> Result<NeighborProfiles> {
        neighbors
            .iter()
            .map(|(direction, &coordinate)| Ok((direction, self.get_voxels(coordinate)?)))
            .collect()
    }
}
