//! 强度帧预处理: 高斯平滑与对比度归一化.

use ndarray::{Array2, ArrayView2};

/// 可分离高斯平滑. 核半径取 `ceil(3 * sigma)`, 边界按复制填充.
///
/// `sigma <= 0` 时原样返回拷贝.
pub fn gaussian_smooth(img: ArrayView2<f32>, sigma: f64) -> Array2<f32> {
    if sigma <= 0.0 {
        return img.to_owned();
    }

    let kernel = gaussian_kernel(sigma);
    let radius = kernel.len() / 2;
    let (h, w) = img.dim();

    // 水平方向.
    let mut pass1 = Array2::<f32>::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let mut acc = 0.0f64;
            for (t, &k) in kernel.iter().enumerate() {
                let cc = clamp_index(c as isize + t as isize - radius as isize, w);
                acc += k * img[[r, cc]] as f64;
            }
            pass1[[r, c]] = acc as f32;
        }
    }

    // 垂直方向.
    let mut pass2 = Array2::<f32>::zeros((h, w));
    for r in 0..h {
        for c in 0..w {
            let mut acc = 0.0f64;
            for (t, &k) in kernel.iter().enumerate() {
                let rr = clamp_index(r as isize + t as isize - radius as isize, h);
                acc += k * pass1[[rr, c]] as f64;
            }
            pass2[[r, c]] = acc as f32;
        }
    }

    pass2
}

/// min-max 对比度归一化到 `[0, 1]`. 常数帧 (含空帧) 归一化为全 0.
pub fn rescale_unit(img: ArrayView2<f32>) -> Array2<f32> {
    let mut min_val = f32::MAX;
    let mut max_val = f32::MIN;
    for &v in img.iter() {
        if v < min_val {
            min_val = v;
        }
        if v > max_val {
            max_val = v;
        }
    }

    let span = max_val - min_val;
    if img.is_empty() || span <= 0.0 {
        return Array2::zeros(img.dim());
    }
    img.map(|&v| (v - min_val) / span)
}

/// 归一化的一维高斯核.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (3.0 * sigma).ceil() as usize;
    let mut kernel = Vec::with_capacity(2 * radius + 1);
    for t in -(radius as isize)..=(radius as isize) {
        let x = t as f64;
        kernel.push((-x * x / (2.0 * sigma * sigma)).exp());
    }
    let total: f64 = kernel.iter().sum();
    for k in &mut kernel {
        *k /= total;
    }
    kernel
}

#[inline]
fn clamp_index(i: isize, len: usize) -> usize {
    i.clamp(0, len as isize - 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_rescale_unit_range() {
        let img = array![[2.0_f32, 4.0], [6.0, 10.0]];
        let out = rescale_unit(img.view());
        assert!(float_eq(out[[0, 0]], 0.0));
        assert!(float_eq(out[[1, 1]], 1.0));
        assert!(float_eq(out[[0, 1]], 0.25));
    }

    #[test]
    fn test_rescale_unit_constant() {
        let img = Array2::<f32>::from_elem((3, 3), 7.0);
        let out = rescale_unit(img.view());
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_gaussian_smooth_preserves_mass_center() {
        // 单点脉冲平滑后仍关于脉冲位置对称.
        let mut img = Array2::<f32>::zeros((11, 11));
        img[[5, 5]] = 1.0;
        let out = gaussian_smooth(img.view(), 1.0);
        assert!(out[[5, 5]] > out[[5, 6]]);
        assert!(float_eq(out[[5, 4]], out[[5, 6]]));
        assert!(float_eq(out[[4, 5]], out[[6, 5]]));
        // 归一化核: 内部区域质量守恒.
        let total: f32 = out.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_gaussian_smooth_zero_sigma_identity() {
        let img = array![[1.0_f32, 2.0], [3.0, 4.0]];
        assert_eq!(gaussian_smooth(img.view(), 0.0), img);
    }
}
