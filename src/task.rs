use serde::Serialize;

/// 并行模式下每个 worker 分到的连续体素区间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChunkDescriptor {
    pub index: usize,
    /// 开始位置（包含），单位：扁平体素索引
    pub start: usize,
    /// 结束位置（不包含），单位：扁平体素索引
    pub end: usize,
}

impl ChunkDescriptor {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// 每个 worker 大约分到的 chunk 数，用于平衡负载
pub const CHUNKS_PER_JOB: usize = 4;

/// 按 chunk_size 把 [0, data_length) 切成连续区间
pub fn partition(data_length: usize, chunk_size: usize) -> Vec<ChunkDescriptor> {
    // 确保分块大小至少为 1，避免死循环
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut index = 0usize;
    while start < data_length {
        let end = (start + chunk_size).min(data_length);
        chunks.push(ChunkDescriptor { index, start, end });
        start = end;
        index += 1;
    }
    chunks
}

/// 根据任务数计算分块：约 `jobs * CHUNKS_PER_JOB` 块
pub fn partition_for_jobs(data_length: usize, jobs: usize) -> Vec<ChunkDescriptor> {
    let target = (jobs.max(1) * CHUNKS_PER_JOB).max(1);
    partition(data_length, data_length.div_ceil(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partition_covers_range_without_gaps() {
        let chunks = partition(10, 4);
        assert_eq!(
            chunks,
            vec![
                ChunkDescriptor { index: 0, start: 0, end: 4 },
                ChunkDescriptor { index: 1, start: 4, end: 8 },
                ChunkDescriptor { index: 2, start: 8, end: 10 },
            ]
        );
    }

    #[test]
    fn test_partition_edge_cases() {
        assert!(partition(0, 4).is_empty());
        assert_eq!(partition(3, 0).len(), 3);
    }

    #[test]
    fn test_partition_for_jobs() {
        let chunks = partition_for_jobs(1000, 4);
        assert_eq!(chunks.len(), 16);
        assert_eq!(chunks.iter().map(ChunkDescriptor::len).sum::<usize>(), 1000);
        assert_eq!(chunks.last().map(|c| c.end), Some(1000));

        let tiny = partition_for_jobs(3, 8);
        assert_eq!(tiny.len(), 3);
        assert!(tiny.iter().all(|c| !c.is_empty()));
    }
}
