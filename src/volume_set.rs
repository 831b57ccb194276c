use crate::error::{Result, RoiError};
use crate::synthetic::ToyVolumes;
use crate::voxel_grid::{VoxelCoordinate, VoxelGrid, voxel_count};

/// 至少需要两个受试者才能计算相关系数
pub const MIN_SUBJECTS: usize = 2;

/// N 个形状一致的三维体数据（每个受试者一个），构造后不可变
#[derive(Debug, Clone)]
pub struct VolumeSet {
    volumes: Vec<VoxelGrid>,
    shape: [usize; 3],
}

impl VolumeSet {
    /// 由一组体数据构造，检查数量与形状一致性
    pub fn new(volumes: Vec<VoxelGrid>) -> Result<Self> {
        let Some(first) = volumes.first() else {
            return Err(RoiError::configuration("未提供任何体数据"));
        };
        let shape = first.shape();

        if volumes.len() < MIN_SUBJECTS {
            return Err(RoiError::configuration(format!(
                "至少需要 {} 个体数据，但只提供了 {} 个",
                MIN_SUBJECTS,
                volumes.len()
            )));
        }

        if let Some((subject, volume)) = volumes
            .iter()
            .enumerate()
            .find(|(_, v)| v.shape() != shape)
        {
            return Err(RoiError::configuration(format!(
                "体数据形状不一致: 第 0 个为 {:?}，第 {} 个为 {:?}",
                shape,
                subject,
                volume.shape()
            )));
        }

        Ok(Self { volumes, shape })
    }

    /// 由预先排列好的批数据构造（受试者 × 体素，受试者维最慢）
    pub fn from_batch(n_subjects: usize, shape: [usize; 3], data: Vec<f64>) -> Result<Self> {
        let per_volume = voxel_count(shape)?;
        let expected = n_subjects.checked_mul(per_volume).ok_or_else(|| {
            RoiError::configuration(format!(
                "批数据规模过大: {} 个受试者 × shape {:?} 溢出",
                n_subjects, shape
            ))
        })?;
        if data.len() != expected {
            return Err(RoiError::configuration(format!(
                "批数据长度不匹配: {} 个受试者 × shape {:?} 需要 {} 个元素，但提供了 {} 个",
                n_subjects,
                shape,
                expected,
                data.len()
            )));
        }
        if per_volume == 0 {
            return Err(RoiError::configuration(format!(
                "体数据维度不能为 0: shape {:?}",
                shape
            )));
        }

        let volumes = data
            .chunks(per_volume)
            .map(|chunk| VoxelGrid::new(shape, chunk.to_vec()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(volumes)
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    pub fn subject_count(&self) -> usize {
        self.volumes.len()
    }

    pub fn volumes(&self) -> &[VoxelGrid] {
        &self.volumes
    }

    pub fn contains(&self, coordinate: VoxelCoordinate) -> bool {
        coordinate.within(self.shape)
    }
}

/// 体数据来源：批数据、体数据列表，或请求合成数据
#[derive(Debug, Clone)]
pub enum VolumeSource {
    Batch {
        n_subjects: usize,
        shape: [usize; 3],
        data: Vec<f64>,
    },
    Volumes(Vec<VoxelGrid>),
    Synthetic(ToyVolumes),
}

impl VolumeSource {
    /// 解析为 VolumeSet；`seed` 只作用于合成数据
    pub fn into_volume_set(self, seed: Option<u64>) -> Result<VolumeSet> {
        match self {
            VolumeSource::Batch {
                n_subjects,
                shape,
                data,
            } => VolumeSet::from_batch(n_subjects, shape, data),
            VolumeSource::Volumes(volumes) => VolumeSet::new(volumes),
            VolumeSource::Synthetic(toy) => toy.generate(seed),
        }
    }
}
