//! 原子列定位.
//!
//! 给定二维强度帧, 经过平滑、对比度归一化、局部极大值检测、
//! 最小间隔去重与局部质心精化, 得到亚像素精度的原子列中心位置序列.
//!
//! 定位结果一经计算即不可变, 由下游特征提取消费.

mod filters;
mod peaks;

pub use filters::{gaussian_smooth, rescale_unit};
pub use peaks::{locate_columns, PeakConfig};

use crate::Pos2d;
use ndarray::Array2;
use ndarray_npy::WriteNpyExt;
use std::fs::File;
use std::io;
use std::path::Path;

/// 将位置序列打平为 `N×2` 数组 (`(行, 列)` 各占一列), 便于 `.npy` 导出.
pub fn positions_to_array(points: &[Pos2d]) -> Array2<f64> {
    let mut ans = Array2::<f64>::zeros((points.len(), 2));
    for (i, &(r, c)) in points.iter().enumerate() {
        ans[[i, 0]] = r;
        ans[[i, 1]] = c;
    }
    ans
}

/// 将位置序列导出为 `N×2` 的 `.npy` 文件.
pub fn save_positions_npy<P: AsRef<Path>>(points: &[Pos2d], path: P) -> io::Result<()> {
    let file = File::create(path)?;
    positions_to_array(points)
        .write_npy(file)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
