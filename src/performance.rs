use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::labels::LabelCounts;

/// 一次 find_clusters 运行的性能与结果摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// 开始时间 (Unix 时间戳，毫秒)
    pub start_time: u64,
    /// 结束时间 (Unix 时间戳，毫秒)
    pub end_time: u64,
    pub elapsed_ms: u64,
    /// 实际使用的任务数（已截断）
    pub jobs: usize,
    /// 作为中心访问过的体素数，等于体素总数
    pub voxels_visited: usize,
    /// 通过最小聚类规则、发生写入的中心数
    pub qualifying_centers: usize,
    pub counts: LabelCounts,
}

/// 获取 Unix 时间戳（毫秒），系统时钟早于 1970 时返回 0
pub fn get_unix_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes() {
        let report = RunReport {
            start_time: 1,
            end_time: 5,
            elapsed_ms: 4,
            jobs: 2,
            voxels_visited: 8,
            qualifying_centers: 8,
            counts: LabelCounts {
                background: 0,
                member: 0,
                center: 8,
            },
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["counts"]["center"], 8);
        let back: RunReport = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }

    #[test]
    fn test_timestamp_is_after_2020() {
        assert!(get_unix_timestamp_ms() > 1_577_836_800_000);
    }
}
