use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RoiError};

/// 体素坐标 (x, y, z)，既用作数组索引，也用作聚类单元的标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelCoordinate {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl VoxelCoordinate {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }

    /// 按轴顺序返回 [x, y, z]
    pub fn axes(&self) -> [usize; 3] {
        [self.x, self.y, self.z]
    }

    /// 检查坐标的每个轴是否都落在 [0, dim-1] 内
    pub fn within(&self, shape: [usize; 3]) -> bool {
        self.x < shape[0] && self.y < shape[1] && self.z < shape[2]
    }

    /// 扁平索引，x 变化最快: index = z * nx * ny + y * nx + x
    /// 调用方需先保证坐标在范围内
    pub fn flat_index(&self, shape: [usize; 3]) -> usize {
        self.z * shape[0] * shape[1] + self.y * shape[0] + self.x
    }

    /// 由扁平索引还原坐标，与 `flat_index` 互逆
    pub fn from_flat_index(index: usize, shape: [usize; 3]) -> Self {
        let plane = shape[0] * shape[1];
        let z = index / plane;
        let rest = index % plane;
        Self::new(rest % shape[0], rest / shape[0], z)
    }
}

impl fmt::Display for VoxelCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<[usize; 3]> for VoxelCoordinate {
    fn from(axes: [usize; 3]) -> Self {
        Self::new(axes[0], axes[1], axes[2])
    }
}

/// 网格的体素总数，乘积溢出时返回配置错误
pub fn voxel_count(shape: [usize; 3]) -> Result<usize> {
    shape[0]
        .checked_mul(shape[1])
        .and_then(|plane| plane.checked_mul(shape[2]))
        .ok_or_else(|| RoiError::configuration(format!("体数据维度过大: shape {:?} 溢出", shape)))
}

/// 体素网格数据结构
/// 表示一个受试者在三维规则网格上的标量场数据
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    /// 网格维度 [nx, ny, nz]
    shape: [usize; 3],
    /// 数据数组，x 变化最快，y 其次，z 最慢
    data: Vec<f64>,
}

impl VoxelGrid {
    /// 创建新的体素网格，数据量必须与 shape 一致且每个维度非零
    pub fn new(shape: [usize; 3], data: Vec<f64>) -> Result<Self> {
        if shape.contains(&0) {
            return Err(RoiError::configuration(format!(
                "体数据维度不能为 0: shape {:?}",
                shape
            )));
        }

        let total_elements = voxel_count(shape)?;
        if data.len() != total_elements {
            return Err(RoiError::configuration(format!(
                "数据量不匹配: shape {:?} 需要 {} 个元素，但提供了 {} 个",
                shape,
                total_elements,
                data.len()
            )));
        }

        Ok(VoxelGrid { shape, data })
    }

    /// 用函数按坐标填充网格
    pub fn from_fn(shape: [usize; 3], mut f: impl FnMut(VoxelCoordinate) -> f64) -> Result<Self> {
        let data = (0..voxel_count(shape)?)
            .map(|index| f(VoxelCoordinate::from_flat_index(index, shape)))
            .collect();
        Self::new(shape, data)
    }

    /// 获取整个数据向量的引用
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// 读取坐标处的值，越界返回 BoundsViolation
    pub fn value_at(&self, coordinate: VoxelCoordinate) -> Result<f64> {
        if !coordinate.within(self.shape) {
            return Err(RoiError::bounds(coordinate, self.shape));
        }
        Ok(self.data[coordinate.flat_index(self.shape)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_index_x_fastest() {
        let shape = [2, 3, 4];
        assert_eq!(VoxelCoordinate::new(1, 0, 0).flat_index(shape), 1);
        assert_eq!(VoxelCoordinate::new(0, 1, 0).flat_index(shape), 2);
        assert_eq!(VoxelCoordinate::new(0, 0, 1).flat_index(shape), 6);

        for index in 0..voxel_count(shape).unwrap() {
            let coord = VoxelCoordinate::from_flat_index(index, shape);
            assert!(coord.within(shape));
            assert_eq!(coord.flat_index(shape), index);
        }
    }

    #[test]
    fn test_new_rejects_length_mismatch() {
        let err = VoxelGrid::new([2, 2, 2], vec![0.0; 7]).unwrap_err();
        assert!(matches!(err, RoiError::Configuration { .. }));
    }

    #[test]
    fn test_new_rejects_zero_dimension() {
        let err = VoxelGrid::new([2, 0, 2], Vec::new()).unwrap_err();
        assert!(matches!(err, RoiError::Configuration { .. }));
    }

    #[test]
    fn test_oversized_shape_is_a_configuration_error() {
        assert!(matches!(
            voxel_count([usize::MAX, 2, 1]),
            Err(RoiError::Configuration { .. })
        ));
        let err = VoxelGrid::new([usize::MAX, 2, 1], Vec::new()).unwrap_err();
        assert!(matches!(err, RoiError::Configuration { .. }));
        assert!(VoxelGrid::from_fn([2, usize::MAX, 3], |_| 0.0).is_err());
    }

    #[test]
    fn test_value_at_fails_loudly_out_of_bounds() {
        let grid = VoxelGrid::from_fn([2, 2, 2], |c| (c.x + 10 * c.y + 100 * c.z) as f64).unwrap();
        assert_eq!(grid.value_at(VoxelCoordinate::new(1, 1, 1)).unwrap(), 111.0);

        let err = grid.value_at(VoxelCoordinate::new(0, 2, 0)).unwrap_err();
        assert!(matches!(err, RoiError::BoundsViolation { .. }));
    }
}
