//! 邻域几何特征提取.
//!
//! 对每个原子列位置, 在固定搜索半径与 k 近邻上限下统计其邻居的
//! 距离分布与角度排布, 得到一行 8 维特征. 特征整批重算, 不做增量维护.

mod kdtree;

pub use kdtree::KdTree2;

use crate::consts::{DEFAULT_MAX_NEIGHBOR_DISTANCE, DEFAULT_NEIGHBOR_CAP};
use crate::Pos2d;
use itertools::{Itertools, MinMaxResult};
use ndarray::Array2;
use std::f64::consts::TAU;

/// 特征维数.
pub const FEATURE_DIM: usize = 8;

/// 特征列编号.
pub mod col {
    /// 邻居距离均值.
    pub const DIST_MEAN: usize = 0;

    /// 邻居距离标准差.
    pub const DIST_STD: usize = 1;

    /// 相邻 (按角度排序) 邻居间角度增量均值.
    pub const DTHETA_MEAN: usize = 2;

    /// 角度增量标准差.
    pub const DTHETA_STD: usize = 3;

    /// 最小角 (相对水平轴, `[0, 2π)`). 局部晶胞取向的代理量.
    pub const MIN_ANGLE: usize = 4;

    /// 保留邻居个数 ("顶点数").
    pub const VERTICES: usize = 5;

    /// 最小邻居距离.
    pub const DIST_MIN: usize = 6;

    /// 最大邻居距离.
    pub const DIST_MAX: usize = 7;
}

/// 特征提取配置.
#[derive(Copy, Clone, Debug)]
pub struct FeatureConfig {
    /// 搜索半径 (像素). 距离大于等于该值的邻居被丢弃.
    pub max_distance: f64,

    /// k 近邻查询容量 (含点自身).
    pub neighbor_cap: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_NEIGHBOR_DISTANCE,
            neighbor_cap: DEFAULT_NEIGHBOR_CAP,
        }
    }
}

/// 计算 `points` 的 `N×8` 特征数组.
///
/// `tree` 必须是对同一 `points` 构建的索引, 由调用方构建一次并显式传入.
/// 每个点查询 `cfg.neighbor_cap` 个近邻, 过滤哨兵槽位、点自身以及
/// 距离超出 `cfg.max_distance` 的邻居, 剩余邻居进入统计.
///
/// 没有有效邻居的点得到全 0 行; 空点集返回 `0×8` 数组. 纯计算, 无 I/O.
pub fn neighbor_features(points: &[Pos2d], tree: &KdTree2, cfg: &FeatureConfig) -> Array2<f64> {
    debug_assert_eq!(tree.len(), points.len());

    let mut features = Array2::<f64>::zeros((points.len(), FEATURE_DIM));

    for (i, &p) in points.iter().enumerate() {
        let knn = tree.knn(p, cfg.neighbor_cap);

        let mut dists: Vec<f64> = Vec::with_capacity(cfg.neighbor_cap);
        let mut angles: Vec<f64> = Vec::with_capacity(cfg.neighbor_cap);
        for (j, d) in knn {
            // 哨兵槽位与点自身都不是邻居.
            if j == tree.sentinel() || j == i {
                continue;
            }
            if d >= cfg.max_distance {
                continue;
            }
            let q = points[j];
            dists.push(d);
            angles.push(angle_to_horizontal(q.0 - p.0, q.1 - p.1));
        }

        let mut row = features.row_mut(i);
        row[col::VERTICES] = dists.len() as f64;
        if dists.is_empty() {
            continue;
        }

        let d_mean = mean(&dists);
        row[col::DIST_MEAN] = d_mean;
        row[col::DIST_STD] = pop_std(&dists, d_mean);
        let (d_min, d_max) = match dists.iter().copied().minmax() {
            MinMaxResult::OneElement(v) => (v, v),
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
            MinMaxResult::NoElements => unreachable!(),
        };
        row[col::DIST_MIN] = d_min;
        row[col::DIST_MAX] = d_max;

        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        row[col::MIN_ANGLE] = angles[0];

        let increments = angular_increments(&angles);
        let t_mean = mean(&increments);
        row[col::DTHETA_MEAN] = t_mean;
        row[col::DTHETA_STD] = pop_std(&increments, t_mean);
    }

    features
}

/// 位移 `(dr, dc)` 相对水平轴的角度, 映射到 `[0, 2π)`.
#[inline]
fn angle_to_horizontal(dr: f64, dc: f64) -> f64 {
    let a = dr.atan2(dc);
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// 环形角度增量: 升序角度的逐对差, 末尾补 `first + 2π - last` 完成回绕.
///
/// `n` 个角度产生 `n` 个增量, 其和恒为 `2π`.
fn angular_increments(sorted: &[f64]) -> Vec<f64> {
    debug_assert!(!sorted.is_empty());
    let mut ans: Vec<f64> = sorted.windows(2).map(|w| w[1] - w[0]).collect();
    ans.push(sorted[0] + TAU - sorted[sorted.len() - 1]);
    ans
}

fn mean<T: num::Float>(xs: &[T]) -> T {
    let sum = xs.iter().fold(T::zero(), |acc, &v| acc + v);
    sum / T::from(xs.len()).unwrap()
}

/// 总体标准差 (除以 n).
fn pop_std<T: num::Float>(xs: &[T], mean: T) -> T {
    let var = xs
        .iter()
        .fold(T::zero(), |acc, &v| acc + (v - mean) * (v - mean))
        / T::from(xs.len()).unwrap();
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    /// 以 `(50, 50)` 为中心, 按给定角度 (度) 与半径放置邻居环.
    fn ring(angles_deg: &[f64], radius: f64) -> Vec<Pos2d> {
        let mut pts = vec![(50.0, 50.0)];
        for &deg in angles_deg {
            let rad = deg.to_radians();
            pts.push((50.0 + radius * rad.sin(), 50.0 + radius * rad.cos()));
        }
        pts
    }

    #[test]
    fn test_hexagonal_ring_statistics() {
        // 完整六邻居环: 0°, 60°, ..., 300°.
        let pts = ring(&[0.0, 60.0, 120.0, 180.0, 240.0, 300.0], 10.0);
        let tree = KdTree2::build(&pts);
        let cfg = FeatureConfig {
            max_distance: 11.0,
            neighbor_cap: 12,
        };
        let f = neighbor_features(&pts, &tree, &cfg);

        // 中心点: 顶点数 6, 增量均值 60°, 增量标准差 0.
        assert!(float_eq(f[[0, col::VERTICES]], 6.0));
        assert!(float_eq(f[[0, col::DTHETA_MEAN]], 60.0_f64.to_radians()));
        assert!(f[[0, col::DTHETA_STD]].abs() < 1e-9);
        assert!(float_eq(f[[0, col::MIN_ANGLE]], 0.0));
        assert!(float_eq(f[[0, col::DIST_MEAN]], 10.0));
        assert!(f[[0, col::DIST_STD]].abs() < 1e-9);
        assert!(float_eq(f[[0, col::DIST_MIN]], 10.0));
        assert!(float_eq(f[[0, col::DIST_MAX]], 10.0));
    }

    #[test]
    fn test_increments_wrap_to_full_turn() {
        // 不规则邻居环: 增量之和仍是整圈.
        let pts = ring(&[10.0, 75.0, 160.0, 200.0, 318.0], 8.0);
        let tree = KdTree2::build(&pts);
        let f = neighbor_features(&pts, &tree, &FeatureConfig::default());

        let n = f[[0, col::VERTICES]];
        assert!(float_eq(n, 5.0));
        // mean * n == 2π.
        assert!(float_eq(f[[0, col::DTHETA_MEAN]] * n, TAU));
        assert!(float_eq(f[[0, col::MIN_ANGLE]], 10.0_f64.to_radians()));
    }

    #[test]
    fn test_vertices_strictly_within_radius() {
        // 距离恰为搜索半径的邻居必须被排除.
        let pts = vec![(0.0, 0.0), (0.0, 11.0), (0.0, 10.9), (7.0, 0.0)];
        let tree = KdTree2::build(&pts);
        let cfg = FeatureConfig {
            max_distance: 11.0,
            neighbor_cap: 12,
        };
        let f = neighbor_features(&pts, &tree, &cfg);
        assert!(float_eq(f[[0, col::VERTICES]], 2.0));
        assert!(float_eq(f[[0, col::DIST_MAX]], 10.9));
    }

    #[test]
    fn test_vertices_capped_by_neighbor_cap() {
        // 密集点云下, 顶点数最多为 neighbor_cap - 1 (自身占一个槽位).
        let mut pts = Vec::new();
        for r in 0..5 {
            for c in 0..5 {
                pts.push((r as f64, c as f64));
            }
        }
        let tree = KdTree2::build(&pts);
        let cfg = FeatureConfig {
            max_distance: 100.0,
            neighbor_cap: 12,
        };
        let f = neighbor_features(&pts, &tree, &cfg);
        for i in 0..pts.len() {
            assert!(float_eq(f[[i, col::VERTICES]], 11.0));
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        // 空点集: 0×8.
        let f = neighbor_features(&[], &KdTree2::build(&[]), &FeatureConfig::default());
        assert_eq!(f.dim(), (0, FEATURE_DIM));

        // 孤立点: 全 0 行.
        let pts = vec![(1.0, 1.0), (500.0, 500.0)];
        let tree = KdTree2::build(&pts);
        let f = neighbor_features(&pts, &tree, &FeatureConfig::default());
        assert!(f.iter().all(|&v| v == 0.0));
    }
}
