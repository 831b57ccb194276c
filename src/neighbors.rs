use std::fmt;

use serde::Serialize;

use crate::error::{Result, RoiError};
use crate::voxel_grid::VoxelCoordinate;

/// 六个固定的轴向邻居方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Direction {
    /// -x
    Front,
    /// +x
    Back,
    /// -y
    Top,
    /// +y
    Bottom,
    /// -z
    Left,
    /// +z
    Right,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Front,
        Direction::Back,
        Direction::Top,
        Direction::Bottom,
        Direction::Left,
        Direction::Right,
    ];

    /// 单位偏移量 [dx, dy, dz]
    pub const fn offset(self) -> [isize; 3] {
        match self {
            Direction::Front => [-1, 0, 0],
            Direction::Back => [1, 0, 0],
            Direction::Top => [0, -1, 0],
            Direction::Bottom => [0, 1, 0],
            Direction::Left => [0, 0, -1],
            Direction::Right => [0, 0, 1],
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Front => "front",
            Direction::Back => "back",
            Direction::Top => "top",
            Direction::Bottom => "bottom",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 以方向为键的定长映射，最多 6 项，按 `Direction::ALL` 顺序迭代
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionMap<T> {
    slots: [Option<T>; 6],
}

impl<T> Default for DirectionMap<T> {
    fn default() -> Self {
        Self {
            slots: [None, None, None, None, None, None],
        }
    }
}

impl<T> DirectionMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, direction: Direction, value: T) {
        self.slots[direction.index()] = Some(value);
    }

    pub fn get(&self, direction: Direction) -> Option<&T> {
        self.slots[direction.index()].as_ref()
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.slots[direction.index()].is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &T)> + '_ {
        Direction::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(direction, slot)| slot.as_ref().map(|value| (direction, value)))
    }
}

impl<T> FromIterator<(Direction, T)> for DirectionMap<T> {
    fn from_iter<I: IntoIterator<Item = (Direction, T)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (direction, value) in iter {
            map.insert(direction, value);
        }
        map
    }
}

/// 方向 -> 邻居坐标，只包含落在体数据范围内的方向
pub type NeighborMap = DirectionMap<VoxelCoordinate>;

/// 根据体数据范围计算 6 邻域
#[derive(Debug, Clone, Copy)]
pub struct NeighborResolver {
    shape: [usize; 3],
}

impl NeighborResolver {
    pub fn new(shape: [usize; 3]) -> Self {
        Self { shape }
    }

    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// 返回 center 的有效邻居坐标，越界的方向直接丢弃
    /// center 本身越界时返回 BoundsViolation
    pub fn get_neighbor_indices(&self, center: VoxelCoordinate) -> Result<NeighborMap> {
        if !center.within(self.shape) {
            return Err(RoiError::bounds(center, self.shape));
        }

        let axes = center.axes();
        let neighbors = Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                let offset = direction.offset();
                let mut shifted = [0usize; 3];
                for axis in 0..3 {
                    let moved = axes[axis].checked_add_signed(offset[axis])?;
                    if moved >= self.shape[axis] {
                        return None;
                    }
                    shifted[axis] = moved;
                }
                Some((direction, VoxelCoordinate::from(shifted)))
            })
            .collect();

        Ok(neighbors)
    }
}
