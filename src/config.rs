use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};

/// 相关系数阈值默认值（|r| 必须严格大于该值）
pub const DEFAULT_R_THRESHOLD: f64 = 0.5;
/// 显著性阈值默认值（p 小于等于该值即通过）
pub const DEFAULT_P_THRESHOLD: f64 = 0.005;
/// 通过相关检验的邻居数少于该值时，不做任何标记
pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 2;

fn default_r_threshold() -> f64 {
    DEFAULT_R_THRESHOLD
}

fn default_p_threshold() -> f64 {
    DEFAULT_P_THRESHOLD
}

fn default_min_cluster_size() -> usize {
    DEFAULT_MIN_CLUSTER_SIZE
}

fn default_n_jobs() -> usize {
    1
}

/// ROI 查找的运行配置，构造后在整个运行期间不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiConfig {
    #[serde(default = "default_r_threshold")]
    pub r_threshold: f64,
    #[serde(default = "default_p_threshold")]
    pub p_threshold: f64,
    #[serde(default = "default_min_cluster_size")]
    pub min_cluster_size: usize,
    /// 并行任务数，实际使用时会被截断到可用的处理器数量
    #[serde(default = "default_n_jobs")]
    pub n_jobs: usize,
    /// 只影响合成数据生成，不影响聚类算法本身
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl Default for RoiConfig {
    fn default() -> Self {
        Self {
            r_threshold: DEFAULT_R_THRESHOLD,
            p_threshold: DEFAULT_P_THRESHOLD,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            n_jobs: default_n_jobs(),
            random_seed: None,
        }
    }
}

impl RoiConfig {
    /// 从 JSON 文档解析配置，缺省字段使用默认值
    pub fn from_json(text: &str) -> Result<Self> {
        let config: RoiConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_r_threshold(mut self, r_threshold: f64) -> Self {
        self.r_threshold = r_threshold;
        self
    }

    pub fn with_p_threshold(mut self, p_threshold: f64) -> Self {
        self.p_threshold = p_threshold;
        self
    }

    pub fn with_min_cluster_size(mut self, min_cluster_size: usize) -> Self {
        self.min_cluster_size = min_cluster_size;
        self
    }

    pub fn with_n_jobs(mut self, n_jobs: usize) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.r_threshold.is_finite() || !(0.0..=1.0).contains(&self.r_threshold) {
            return Err(RoiError::configuration(format!(
                "r_threshold 必须在 [0, 1] 内，当前为 {}",
                self.r_threshold
            )));
        }
        if !self.p_threshold.is_finite() || !(0.0..=1.0).contains(&self.p_threshold) {
            return Err(RoiError::configuration(format!(
                "p_threshold 必须在 [0, 1] 内，当前为 {}",
                self.p_threshold
            )));
        }
        if self.min_cluster_size == 0 {
            return Err(RoiError::configuration("min_cluster_size 必须至少为 1"));
        }
        if self.n_jobs == 0 {
            return Err(RoiError::configuration("n_jobs 必须至少为 1"));
        }
        Ok(())
    }

    /// 截断到可用处理器数量后的任务数
    pub fn effective_jobs(&self) -> usize {
        let available = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        if self.n_jobs > available {
            tracing::warn!(
                requested = self.n_jobs,
                available,
                "请求的任务数超过可用处理器数量，已截断"
            );
        }
        self.n_jobs.clamp(1, available)
    }

    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            r_threshold: self.r_threshold,
            p_threshold: self.p_threshold,
        }
    }
}

/// 相关检验使用的两个联合阈值
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub r_threshold: f64,
    pub p_threshold: f64,
}
