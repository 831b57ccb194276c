//! Pearson 相关检验与阈值门控
//!
//! 显著性使用双侧 t 检验（自由度 N-2）。t 分布的双侧尾概率可以写成
//! 正则化不完全 Beta 函数: p = I_x(df/2, 1/2)，其中 x = df / (df + t²)。
//! 代入 t² = r² · df / (1 - r²) 后 x 化简为 1 - r²，因此不需要显式求 t。

use serde::{Deserialize, Serialize};
use statrs::function::beta::beta_reg;

use crate::config::Thresholds;
use crate::neighbors::DirectionMap;
use crate::profile::NeighborProfiles;

/// 一对 Profile 的相关系数 r ∈ [-1, 1] 与显著性 p ∈ [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub r: f64,
    pub p: f64,
}

/// 方向 -> 通过阈值检验的相关结果
pub type AcceptedCorrelations = DirectionMap<CorrelationResult>;

/// 计算 Pearson 相关系数及双侧 p 值
///
/// 以下情况返回 `None`（视为退化输入，由调用方按"未通过"处理）:
/// - 长度不一致或少于 2 个观测
/// - 任一 Profile 为常数（方差为 0，r 无定义）
/// - 含有非有限值
pub fn pearson(x: &[f64], y: &[f64]) -> Option<CorrelationResult> {
    let n = x.len();
    if n != y.len() || n < 2 {
        return None;
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return None;
    }
    if is_constant(x) || is_constant(y) {
        return None;
    }

    let nf = n as f64;
    let mean_x = x.iter().sum::<f64>() / nf;
    let mean_y = y.iter().sum::<f64>() / nf;

    let (sxy, sxx, syy) = x
        .iter()
        .zip(y.iter())
        .fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), (&xi, &yi)| {
            let dx = xi - mean_x;
            let dy = yi - mean_y;
            (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
        });

    let denominator = (sxx * syy).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    let r = (sxy / denominator).clamp(-1.0, 1.0);
    if !r.is_finite() {
        return None;
    }

    Some(CorrelationResult {
        r,
        p: two_sided_p_value(r, n - 2),
    })
}

/// r = 0 零假设下的双侧 p 值，df = N - 2
///
/// |r| = 1 时关系是精确的，p 取 0；这也覆盖了 df = 0（两个受试者）的情况，
/// 此时任何有定义的 r 都是 ±1。
pub fn two_sided_p_value(r: f64, df: usize) -> f64 {
    let x = (1.0 - r * r).clamp(0.0, 1.0);
    if x == 0.0 || df == 0 {
        return 0.0;
    }
    beta_reg(df as f64 / 2.0, 0.5, x).clamp(0.0, 1.0)
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// 按配置阈值判断相关结果是否通过
#[derive(Debug, Clone, Copy)]
pub struct CorrelationGate {
    thresholds: Thresholds,
}

impl CorrelationGate {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// |r| 严格大于 r_threshold，且 p 小于等于 p_threshold
    pub fn accepts(&self, result: &CorrelationResult) -> bool {
        result.r.abs() > self.thresholds.r_threshold && result.p <= self.thresholds.p_threshold
    }

    /// 对每个邻居方向做相关检验，只保留通过的方向
    pub fn compute_correlation(
        &self,
        center: &[f64],
        neighbors: &NeighborProfiles,
    ) -> AcceptedCorrelations {
        neighbors
            .iter()
            .filter_map(|(direction, profile)| {
                let result = pearson(center, profile)?;
                self.accepts(&result).then_some((direction, result))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighbors::Direction;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_pearson_known_values() {
        let result = pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 5.0, 4.0, 5.0]).unwrap();
        assert!((result.r - 0.774_596_669_241_483_4).abs() < EPS);
        assert!((result.p - 0.124_027_062_657_554_6).abs() < 1e-6);

        // df = 1 时 p = 1 - 2/π · atan(|t|)，r = 0.5 对应 p = 2/3
        let result = pearson(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap();
        assert!((result.r - 0.5).abs() < EPS);
        assert!((result.p - 2.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_pearson_perfect_and_inverse() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let up = pearson(&x, &[3.0, 5.0, 7.0, 9.0]).unwrap();
        assert!((up.r - 1.0).abs() < EPS);
        assert!(up.p < 1e-6);

        let down = pearson(&x, &[-1.0, -2.0, -3.0, -4.0]).unwrap();
        assert!((down.r + 1.0).abs() < EPS);
        assert!(down.p < 1e-6);
    }

    #[test]
    fn test_two_subjects_are_exact() {
        let result = pearson(&[1.0, 2.0], &[5.0, 9.0]).unwrap();
        assert_eq!(result.r, 1.0);
        assert_eq!(result.p, 0.0);
    }

    #[test]
    fn test_uncorrelated_has_p_one() {
        let result = pearson(&[1.0, 2.0, 3.0], &[1.0, 0.0, 1.0]).unwrap();
        assert!(result.r.abs() < EPS);
        assert!((result.p - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetry() {
        let a = [0.3, -1.2, 4.4, 2.0, 0.9, -3.1];
        let b = [1.1, -0.2, 3.9, 1.7, 0.1, -2.0];
        assert_eq!(pearson(&a, &b), pearson(&b, &a));
    }

    #[test]
    fn test_degenerate_inputs_are_none() {
        assert!(pearson(&[2.0, 2.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(pearson(&[1.0, 2.0, 3.0], &[0.1, 0.1, 0.1]).is_none());
        assert!(pearson(&[1.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(pearson(&[1.0], &[1.0]).is_none());
        assert!(pearson(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_threshold_boundaries() {
        let gate = CorrelationGate::new(Thresholds {
            r_threshold: 0.5,
            p_threshold: 0.005,
        });
        assert!(!gate.accepts(&CorrelationResult { r: 0.5, p: 0.0 }));
        assert!(!gate.accepts(&CorrelationResult { r: -0.5, p: 0.0 }));
        assert!(gate.accepts(&CorrelationResult { r: 0.500_001, p: 0.005 }));
        assert!(gate.accepts(&CorrelationResult { r: -0.9, p: 0.005 }));
        assert!(!gate.accepts(&CorrelationResult { r: 0.9, p: 0.005_000_1 }));
    }

    #[test]
    fn test_threshold_boundaries_on_computed_pair() {
        let center = [1.0, 2.0, 3.0, 4.0, 5.0];
        let neighbor = vec![2.0, 4.0, 5.0, 4.0, 5.0];
        let result = pearson(&center, &neighbor).unwrap();
        let neighbors: NeighborProfiles = [(Direction::Top, neighbor)].into_iter().collect();

        let exact_p = CorrelationGate::new(Thresholds {
            r_threshold: 0.5,
            p_threshold: result.p,
        });
        assert_eq!(exact_p.compute_correlation(&center, &neighbors).len(), 1);

        let exact_r = CorrelationGate::new(Thresholds {
            r_threshold: result.r.abs(),
            p_threshold: 1.0,
        });
        assert!(exact_r.compute_correlation(&center, &neighbors).is_empty());
    }

    #[test]
    fn test_compute_correlation_drops_failures() {
        let gate = CorrelationGate::new(Thresholds {
            r_threshold: 0.5,
            p_threshold: 0.05,
        });
        let center = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let neighbors: NeighborProfiles = [
            (Direction::Front, vec![2.0, 4.0, 6.0, 8.0, 10.0, 12.0]),
            (Direction::Back, vec![7.0, 7.0, 7.0, 7.0, 7.0, 7.0]),
            (Direction::Left, vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0]),
            (Direction::Right, vec![-6.0, -5.0, -4.0, -3.0, -2.0, -1.0]),
        ]
        .into_iter()
        .collect();

        let accepted = gate.compute_correlation(&center, &neighbors);
        assert_eq!(accepted.len(), 2);
        assert!(accepted.contains(Direction::Front));
        assert!(accepted.contains(Direction::Right));
        assert!(!accepted.contains(Direction::Back));
        assert!(!accepted.contains(Direction::Left));
    }
}
