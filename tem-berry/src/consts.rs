//! 通用常量与默认调参.
//!
//! 这里集中存放针对晶界 HAADF 数据集人工实验得到的默认参数.
//! 它们不是推导出来的常量, 换数据集时应当由调用方显式覆盖.

/// 峰检测去重的最小间隔 (像素). 两个候选峰距离小于该值时只保留较亮者.
pub const DEFAULT_PEAK_SEPARATION: f64 = 1.0;

/// 内部点的最少有效邻居数. 邻居数小于该值的点视为边缘点, 不参与聚类.
pub const MIN_INTERIOR_VERTICES: usize = 5;

/// 邻域搜索半径 (像素). 距离大于等于该值的邻居会被丢弃.
pub const DEFAULT_MAX_NEIGHBOR_DISTANCE: f64 = 11.0;

/// k-d 树 k 近邻查询的查询容量. 查询结果包含点自身, 因此
/// 每个点最多保留 `DEFAULT_NEIGHBOR_CAP - 1` 个邻居.
pub const DEFAULT_NEIGHBOR_CAP: usize = 12;

/// 聚类个数.
pub const DEFAULT_CLUSTER_COUNT: usize = 5;

/// 参与聚类的特征列子集 (降维): 距离标准差、最小角、邻居数.
///
/// 列编号见 [`crate::feature::col`].
pub const DEFAULT_FEATURE_SUBSET: [usize; 3] = [1, 4, 5];
