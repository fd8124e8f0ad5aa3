//! 聚类指派.
//!
//! 在归一化后的特征 (可选列子集降维) 上把内部点分为固定个数的簇.
//! 聚类算法是可替换的策略 ([`ClusterModel`]); 标签是不透明整数 ID,
//! 不保证取值顺序有物理意义.

mod rescale;

pub use rescale::{partition_by_vertices, take_rows, MinMaxScaler, Partition};

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

/// 聚类运行时错误.
#[derive(Debug, Clone)]
pub enum ClusterError {
    /// 请求的簇数多于样本数.
    ///
    /// 第一个参数是样本数, 第二个参数是请求的簇数.
    TooFewPoints(usize, usize),
}

/// 可替换的聚类策略.
///
/// 任何基于距离/相似度的算法 (谱聚类、mean-shift、密度聚类等)
/// 都可以实现该接口而不影响数据模型约定.
pub trait ClusterModel {
    /// 对 `x` 的每一行给出一个簇标签.
    fn fit_predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClusterError>;
}

/// 确定性 Lloyd k-means.
///
/// 质心播种用最远点法 (首个质心取第 0 行, 之后每次取距已有质心最远的行),
/// 不依赖随机数, 相同输入的重复运行结果逐位一致.
#[derive(Copy, Clone, Debug)]
pub struct KMeans {
    /// 簇数.
    pub clusters: usize,

    /// 最大迭代轮数.
    pub max_iter: usize,

    /// 收敛阈值: 所有质心单轮移动距离平方的最大值低于该值时停止.
    pub tol: f64,
}

impl KMeans {
    /// 以给定簇数初始化, 其余参数取默认.
    pub fn with_clusters(clusters: usize) -> Self {
        Self {
            clusters,
            max_iter: 300,
            tol: 1e-12,
        }
    }

    /// 最远点播种.
    fn seed(&self, x: ArrayView2<f64>) -> Array2<f64> {
        let n = x.nrows();
        let d = x.ncols();
        let mut centroids = Array2::<f64>::zeros((self.clusters, d));
        centroids.row_mut(0).assign(&x.row(0));

        let mut min_dist2 = vec![f64::MAX; n];
        for k in 1..self.clusters {
            let last = centroids.row(k - 1);
            for (i, row) in x.axis_iter(Axis(0)).enumerate() {
                let dd = dist2(row, last);
                if dd < min_dist2[i] {
                    min_dist2[i] = dd;
                }
            }
            // 平局时取最小索引, 保证确定性.
            let mut far = 0;
            for (i, &dd) in min_dist2.iter().enumerate() {
                if dd > min_dist2[far] {
                    far = i;
                }
            }
            centroids.row_mut(k).assign(&x.row(far));
        }
        centroids
    }

    /// 每行指派到最近质心 (平局取最小质心索引).
    fn assign(x: ArrayView2<f64>, centroids: ArrayView2<f64>, labels: &mut [usize]) {
        for (i, row) in x.axis_iter(Axis(0)).enumerate() {
            let mut best = 0;
            let mut best_d = f64::MAX;
            for (k, c) in centroids.axis_iter(Axis(0)).enumerate() {
                let dd = dist2(row, c);
                if dd < best_d {
                    best_d = dd;
                    best = k;
                }
            }
            labels[i] = best;
        }
    }
}

impl ClusterModel for KMeans {
    fn fit_predict(&self, x: ArrayView2<f64>) -> Result<Vec<usize>, ClusterError> {
        let n = x.nrows();
        if n < self.clusters {
            return Err(ClusterError::TooFewPoints(n, self.clusters));
        }
        let d = x.ncols();

        let mut centroids = self.seed(x);
        let mut labels = vec![0usize; n];

        for _ in 0..self.max_iter {
            Self::assign(x, centroids.view(), &mut labels);

            // 重算质心; 空簇保留旧质心.
            let mut sums = Array2::<f64>::zeros((self.clusters, d));
            let mut counts = vec![0usize; self.clusters];
            for (i, row) in x.axis_iter(Axis(0)).enumerate() {
                counts[labels[i]] += 1;
                let mut acc = sums.row_mut(labels[i]);
                acc += &row;
            }

            let mut shift2_max = 0.0f64;
            for k in 0..self.clusters {
                if counts[k] == 0 {
                    continue;
                }
                let new_c = sums.row(k).mapv(|v| v / counts[k] as f64);
                let shift2 = dist2(new_c.view(), centroids.row(k));
                if shift2 > shift2_max {
                    shift2_max = shift2;
                }
                centroids.row_mut(k).assign(&new_c);
            }

            if shift2_max < self.tol {
                break;
            }
        }

        Self::assign(x, centroids.view(), &mut labels);
        Ok(labels)
    }
}

/// 取出给定列子集 (降维), 拷贝为新数组.
pub fn select_features(x: ArrayView2<f64>, cols: &[usize]) -> Array2<f64> {
    x.select(Axis(1), cols)
}

fn dist2(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x - y) * (x - y))
        .sum()
}
