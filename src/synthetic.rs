use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::error::{Result, RoiError};
use crate::volume_set::VolumeSet;
use crate::voxel_grid::{VoxelGrid, voxel_count};

/// 合成数据的立方体边长
pub const TOY_DIM: usize = 10;
pub const N_TOY_SUBJECTS: usize = 5;
pub const TOY_LOW: f64 = -10.0;
pub const TOY_UP: f64 = 10.0;

/// 随机立方体体数据生成器，每个体素取 [low, up) 内的均匀随机值
#[derive(Debug, Clone, PartialEq)]
pub struct ToyVolumes {
    pub dim: usize,
    pub n_subjects: usize,
    pub low: f64,
    pub up: f64,
}

impl Default for ToyVolumes {
    fn default() -> Self {
        Self {
            dim: TOY_DIM,
            n_subjects: N_TOY_SUBJECTS,
            low: TOY_LOW,
            up: TOY_UP,
        }
    }
}

impl ToyVolumes {
    pub fn with_dim(mut self, dim: usize) -> Self {
        self.dim = dim;
        self
    }

    pub fn with_subjects(mut self, n_subjects: usize) -> Self {
        self.n_subjects = n_subjects;
        self
    }

    pub fn with_bounds(mut self, low: f64, up: f64) -> Self {
        self.low = low;
        self.up = up;
        self
    }

    /// 生成体数据；给定 seed 时结果可复现
    pub fn generate(&self, seed: Option<u64>) -> Result<VolumeSet> {
        if !self.low.is_finite() || !self.up.is_finite() || self.low >= self.up {
            return Err(RoiError::configuration(format!(
                "合成数据取值区间无效: [{}, {})",
                self.low, self.up
            )));
        }

        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let shape = [self.dim; 3];
        let count = voxel_count(shape)?;
        let volumes = (0..self.n_subjects)
            .map(|_| {
                let data = (0..count)
                    .map(|_| rng.gen_range(self.low..self.up))
                    .collect();
                VoxelGrid::new(shape, data)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            dim = self.dim,
            subjects = self.n_subjects,
            seeded = seed.is_some(),
            "合成体数据已生成"
        );
        VolumeSet::new(volumes)
    }
}
