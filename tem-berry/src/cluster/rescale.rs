//! 特征划分与归一化.
//!
//! 邻居数不足的点 (边缘点) 的邻居环不完整, 特征在结构上欠定,
//! 必须在聚类前排除; 保留的内部点特征按列做 min-max 归一化,
//! 使像素距离、弧度、计数等异质单位在距离型聚类下可比.

use crate::feature::col;
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// 点集按邻居数划分的结果. 两个索引集按原点序升序, 互不相交.
#[derive(Debug, Clone)]
pub struct Partition {
    /// 内部点 (邻居数达到阈值) 的行索引.
    pub interior: Vec<usize>,

    /// 边缘点 (邻居数不足) 的行索引.
    pub edge: Vec<usize>,
}

/// 按 "顶点数" 列把特征行划分为内部点与边缘点.
///
/// 顶点数大于等于 `min_vertices` 的行是内部点.
pub fn partition_by_vertices(features: ArrayView2<f64>, min_vertices: usize) -> Partition {
    let threshold = min_vertices as f64;
    let mut interior = Vec::new();
    let mut edge = Vec::new();

    for (i, row) in features.axis_iter(Axis(0)).enumerate() {
        if row[col::VERTICES] >= threshold {
            interior.push(i);
        } else {
            edge.push(i);
        }
    }

    Partition { interior, edge }
}

/// 取出给定行子集, 拷贝为新数组.
pub fn take_rows(features: ArrayView2<f64>, rows: &[usize]) -> Array2<f64> {
    features.select(Axis(0), rows)
}

/// 低于该值的列跨度视为零方差. 避免把浮点噪声级别的差异放大到满量程.
const SPAN_EPS: f64 = 1e-9;

/// 每列独立的 min-max 归一化器.
///
/// 纯统计意义上的 fit-and-transform, 每次分析运行重新拟合,
/// 不存在跨运行持久化的归一化状态.
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    mins: Array1<f64>,
    spans: Array1<f64>,
}

impl MinMaxScaler {
    /// 在 `x` 上拟合每列的最小值与跨度.
    ///
    /// `x` 不能为空, 否则程序 panic.
    pub fn fit(x: ArrayView2<f64>) -> Self {
        assert!(x.nrows() > 0, "归一化器不能在空数组上拟合");

        let mut mins = Array1::<f64>::from_elem(x.ncols(), f64::MAX);
        let mut maxs = Array1::<f64>::from_elem(x.ncols(), f64::MIN);
        for row in x.axis_iter(Axis(0)) {
            for (j, &v) in row.iter().enumerate() {
                if v < mins[j] {
                    mins[j] = v;
                }
                if v > maxs[j] {
                    maxs[j] = v;
                }
            }
        }

        let spans = &maxs - &mins;
        Self { mins, spans }
    }

    /// 把 `x` 的每列映射到 `[0, 1]`. 零方差列 (跨度低于噪声阈值) 映射为全 0.
    ///
    /// `x` 的列数必须与拟合时一致, 否则程序 panic.
    pub fn transform(&self, x: ArrayView2<f64>) -> Array2<f64> {
        assert_eq!(x.ncols(), self.mins.len(), "列数与拟合时不一致");

        Array2::from_shape_fn(x.dim(), |(i, j)| {
            if self.spans[j] > SPAN_EPS {
                (x[[i, j]] - self.mins[j]) / self.spans[j]
            } else {
                0.0
            }
        })
    }

    /// 拟合并立即变换.
    #[inline]
    pub fn fit_transform(x: ArrayView2<f64>) -> Array2<f64> {
        Self::fit(x).transform(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FEATURE_DIM;
    use ndarray::array;

    fn float_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_minmax_round_trip() {
        let x = array![[2.0, -1.0], [4.0, 0.5], [10.0, 3.0]];
        let out = MinMaxScaler::fit_transform(x.view());

        // 每列变换后的最小/最大值恰为 0 和 1.
        for j in 0..2 {
            let col: Vec<f64> = out.column(j).to_vec();
            let lo = col.iter().copied().fold(f64::MAX, f64::min);
            let hi = col.iter().copied().fold(f64::MIN, f64::max);
            assert!(float_eq(lo, 0.0));
            assert!(float_eq(hi, 1.0));
        }
    }

    #[test]
    fn test_minmax_zero_variance_column() {
        let x = array![[5.0, 1.0], [5.0, 2.0]];
        let out = MinMaxScaler::fit_transform(x.view());
        assert!(float_eq(out[[0, 0]], 0.0));
        assert!(float_eq(out[[1, 0]], 0.0));
        assert!(float_eq(out[[1, 1]], 1.0));
    }

    #[test]
    fn test_partition_boundary_at_five() {
        // 顶点数恰为 4 的点被排除, 恰为 5 的点被保留.
        let mut x = Array2::<f64>::zeros((3, FEATURE_DIM));
        x[[0, col::VERTICES]] = 4.0;
        x[[1, col::VERTICES]] = 5.0;
        x[[2, col::VERTICES]] = 6.0;

        let part = partition_by_vertices(x.view(), 5);
        assert_eq!(part.interior, [1, 2]);
        assert_eq!(part.edge, [0]);
    }

    #[test]
    fn test_take_rows() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let sub = take_rows(x.view(), &[2, 0]);
        assert_eq!(sub, array![[5.0, 6.0], [1.0, 2.0]]);
    }
}
