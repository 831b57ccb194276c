use std::time::Instant;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::config::RoiConfig;
use crate::correlation::{AcceptedCorrelations, CorrelationGate};
use crate::error::{Result, RoiError};
use crate::labels::{ClusterAccumulator, LabelVolume};
use crate::neighbors::{NeighborMap, NeighborResolver};
use crate::performance::{RunReport, get_unix_timestamp_ms};
use crate::profile::ProfileExtractor;
use crate::task::{ChunkDescriptor, partition_for_jobs};
use crate::volume_set::{VolumeSet, VolumeSource};
use crate::voxel_grid::{VoxelCoordinate, voxel_count};

/// 单个中心体素的只读计算结果，尚未写入标签体
#[derive(Debug, Clone)]
pub struct CenterOutcome {
    pub center: VoxelCoordinate,
    pub neighbors: NeighborMap,
    pub accepted: AcceptedCorrelations,
}

/// 一次完整运行的输出
#[derive(Debug, Clone)]
pub struct RoiRun {
    pub labels: LabelVolume,
    pub report: RunReport,
}

/// 遍历所有体素，串联 邻居解析 → Profile 抽取 → 相关检验 → 标签写入
#[derive(Debug)]
pub struct RoiFinder {
    volumes: VolumeSet,
    config: RoiConfig,
    resolver: NeighborResolver,
    gate: CorrelationGate,
}

impl RoiFinder {
    /// 校验配置并接管体数据；配置错误在遍历开始前返回
    pub fn new(volumes: VolumeSet, config: RoiConfig) -> Result<Self> {
        config.validate()?;
        let resolver = NeighborResolver::new(volumes.shape());
        let gate = CorrelationGate::new(config.thresholds());
        Ok(Self {
            volumes,
            config,
            resolver,
            gate,
        })
    }

    /// 从任意数据来源构造，合成数据使用配置中的随机种子
    pub fn from_source(source: VolumeSource, config: RoiConfig) -> Result<Self> {
        config.validate()?;
        let volumes = source.into_volume_set(config.random_seed)?;
        Self::new(volumes, config)
    }

    pub fn volume_shape(&self) -> [usize; 3] {
        self.volumes.shape()
    }

    pub fn volumes(&self) -> &VolumeSet {
        &self.volumes
    }

    pub fn config(&self) -> &RoiConfig {
        &self.config
    }

    /// 计算一个中心体素通过检验的邻居，不读写标签体
    pub fn evaluate_center(&self, center: VoxelCoordinate) -> Result<CenterOutcome> {
        let extractor = ProfileExtractor::new(&self.volumes);
        let center_voxels = extractor.get_voxels(center)?;
        let neighbors = self.resolver.get_neighbor_indices(center)?;
        let neighbor_voxels = extractor.get_neighbor_voxels(&neighbors)?;
        let accepted = self.gate.compute_correlation(&center_voxels, &neighbor_voxels);
        Ok(CenterOutcome {
            center,
            neighbors,
            accepted,
        })
    }

    /// 对每个体素恰好作为中心访问一次，返回完成的标签体
    ///
    /// 遍历期间不读取标签体，因此串行与并行模式的结果一致。
    pub fn find_clusters(&self) -> Result<RoiRun> {
        let shape = self.volume_shape();
        let jobs = self.config.effective_jobs();
        let start_time = get_unix_timestamp_ms();
        let started = Instant::now();

        tracing::info!(
            shape = ?shape,
            subjects = self.volumes.subject_count(),
            jobs,
            r_threshold = self.config.r_threshold,
            p_threshold = self.config.p_threshold,
            min_cluster_size = self.config.min_cluster_size,
            "开始查找聚类"
        );

        let accumulator = ClusterAccumulator::new(shape, self.config.min_cluster_size)?;
        let (accumulator, qualifying_centers) = if jobs > 1 {
            self.run_parallel(jobs, accumulator)?
        } else {
            self.run_sequential(accumulator)?
        };

        let labels = accumulator.into_labels();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        let report = RunReport {
            start_time,
            end_time: get_unix_timestamp_ms(),
            elapsed_ms,
            jobs,
            voxels_visited: voxel_count(shape)?,
            qualifying_centers,
            counts: labels.counts(),
        };

        tracing::info!(
            elapsed_ms,
            qualifying_centers,
            centers = report.counts.center,
            members = report.counts.member,
            "聚类查找完成"
        );

        Ok(RoiRun { labels, report })
    }

    fn evaluate_chunk(&self, chunk: &ChunkDescriptor) -> Result<Vec<CenterOutcome>> {
        let shape = self.volume_shape();
        (chunk.start..chunk.end)
            .map(|index| self.evaluate_center(VoxelCoordinate::from_flat_index(index, shape)))
            .collect()
    }

    fn run_sequential(
        &self,
        mut accumulator: ClusterAccumulator,
    ) -> Result<(ClusterAccumulator, usize)> {
        let shape = self.volume_shape();
        let mut qualifying = 0;
        for index in 0..voxel_count(shape)? {
            let outcome = self.evaluate_center(VoxelCoordinate::from_flat_index(index, shape))?;
            if accumulator.update_cluster_array(
                &outcome.accepted,
                outcome.center,
                &outcome.neighbors,
            )? {
                qualifying += 1;
            }
        }
        Ok((accumulator, qualifying))
    }

    /// 读侧按 chunk 并行计算；写侧每个 chunk 只加一次锁，批量写入共享累加器
    fn run_parallel(
        &self,
        jobs: usize,
        accumulator: ClusterAccumulator,
    ) -> Result<(ClusterAccumulator, usize)> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| RoiError::WorkerPool {
                message: e.to_string(),
            })?;

        let chunks = partition_for_jobs(voxel_count(self.volume_shape())?, jobs);
        let shared = Mutex::new(accumulator);

        let qualifying = pool.install(|| {
            chunks
                .par_iter()
                .map(|chunk| -> Result<usize> {
                    let outcomes = self.evaluate_chunk(chunk)?;

                    let mut accumulator = shared.lock();
                    let mut written = 0;
                    for o in &outcomes {
                        if accumulator.update_cluster_array(&o.accepted, o.center, &o.neighbors)? {
                            written += 1;
                        }
                    }
                    drop(accumulator);

                    tracing::debug!(
                        chunk = chunk.index,
                        start = chunk.start,
                        end = chunk.end,
                        written,
                        "chunk 写入完成"
                    );
                    Ok(written)
                })
                .try_reduce(|| 0, |a, b| Ok(a + b))
        })?;

        Ok((shared.into_inner(), qualifying))
    }
}
