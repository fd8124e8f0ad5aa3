//! 局部极大值检测与亚像素精化.

use super::filters::{gaussian_smooth, rescale_unit};
use crate::consts::DEFAULT_PEAK_SEPARATION;
use crate::{Idx2d, Pos2d};
use ndarray::ArrayView2;
use ordered_float::NotNan;

/// 峰检测配置.
#[derive(Copy, Clone, Debug)]
pub struct PeakConfig {
    /// 预平滑的高斯 sigma (像素). 取 0 可关闭平滑.
    pub smooth_sigma: f64,

    /// 去重最小间隔 (像素). 候选峰距已接受峰小于该值时被丢弃.
    pub min_separation: f64,

    /// 归一化后的强度下限. 低于该值的像素不作为候选峰.
    pub intensity_floor: f32,

    /// 质心精化的窗口半径 (像素).
    pub com_radius: usize,
}

impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            smooth_sigma: 2.0,
            min_separation: DEFAULT_PEAK_SEPARATION,
            intensity_floor: 0.1,
            com_radius: 3,
        }
    }
}

/// 在强度帧中定位原子列中心.
///
/// 流程: 高斯平滑 -> `[0, 1]` 归一化 -> 8-邻域严格极大值检测 ->
/// 按亮度降序的最小间隔去重 -> 局部质心亚像素精化.
///
/// 空帧或无候选峰时返回空序列, 不报错.
pub fn locate_columns(frame: ArrayView2<f32>, cfg: &PeakConfig) -> Vec<Pos2d> {
    let smoothed = gaussian_smooth(frame, cfg.smooth_sigma);
    let rescaled = rescale_unit(smoothed.view());

    let mut candidates = local_maxima(rescaled.view(), cfg.intensity_floor);

    // 亮度降序, 同亮度时按索引序保证确定性.
    candidates.sort_by_key(|&(pos, v)| (std::cmp::Reverse(NotNan::new(v).unwrap()), pos));

    let accepted = suppress_close(&candidates, cfg.min_separation);

    accepted
        .into_iter()
        .map(|pos| center_of_mass(rescaled.view(), pos, cfg.com_radius))
        .collect()
}

/// 8-邻域严格局部极大值 (不含图像最外圈), 附带归一化亮度.
fn local_maxima(img: ArrayView2<f32>, floor: f32) -> Vec<(Idx2d, f32)> {
    let (h, w) = img.dim();
    let mut ans = Vec::new();
    if h < 3 || w < 3 {
        return ans;
    }

    for r in 1..h - 1 {
        for c in 1..w - 1 {
            let v = img[[r, c]];
            if v < floor {
                continue;
            }
            let is_max = (r - 1..=r + 1)
                .flat_map(|rr| (c - 1..=c + 1).map(move |cc| (rr, cc)))
                .filter(|&p| p != (r, c))
                .all(|(rr, cc)| img[[rr, cc]] < v);
            if is_max {
                ans.push(((r, c), v));
            }
        }
    }
    ans
}

/// 依次接受候选峰 (入参须已按亮度降序), 丢弃与已接受峰距离小于
/// `min_separation` 的候选.
fn suppress_close(sorted: &[(Idx2d, f32)], min_separation: f64) -> Vec<Idx2d> {
    let sep2 = min_separation * min_separation;
    let mut accepted: Vec<Idx2d> = Vec::with_capacity(sorted.len());

    'outer: for &((r, c), _) in sorted {
        for &(ar, ac) in &accepted {
            let dr = r as f64 - ar as f64;
            let dc = c as f64 - ac as f64;
            if dr * dr + dc * dc < sep2 {
                continue 'outer;
            }
        }
        accepted.push((r, c));
    }
    accepted
}

/// 以 `(r, c)` 为中心、`radius` 为半径 (越界截断) 的强度加权质心.
///
/// 窗口内总权重为 0 时退回整数位置.
fn center_of_mass(img: ArrayView2<f32>, (r, c): Idx2d, radius: usize) -> Pos2d {
    let (h, w) = img.dim();
    let r0 = r.saturating_sub(radius);
    let c0 = c.saturating_sub(radius);
    let r1 = (r + radius).min(h - 1);
    let c1 = (c + radius).min(w - 1);

    let mut mass = 0.0f64;
    let mut acc_r = 0.0f64;
    let mut acc_c = 0.0f64;
    for rr in r0..=r1 {
        for cc in c0..=c1 {
            let v = img[[rr, cc]] as f64;
            mass += v;
            acc_r += v * rr as f64;
            acc_c += v * cc as f64;
        }
    }

    if mass <= 0.0 {
        (r as f64, c as f64)
    } else {
        (acc_r / mass, acc_c / mass)
    }
}
