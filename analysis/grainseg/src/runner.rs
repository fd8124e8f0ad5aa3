//! 程序运行函数: 端到端的晶界分割流程.
//!
//! 下载并校验信号包 -> 选取 DCFI 对齐帧 -> 原子列定位 -> 邻域特征 ->
//! 划分/归一化/降维/聚类 -> 标签传播 -> 写出产物.
//!
//! 流程是线性单趟的: 任一阶段失败即整体终止, 没有重试与部分结果落盘.

use crate::report::RunReport;
use std::fs;
use tem_berry::bundle::{BundleError, MetaError, SignalBundle};
use tem_berry::cluster::ClusterError;
use tem_berry::localize::save_positions_npy;
use tem_berry::prelude::*;

/// 固定的远端数据集 (转换后的信号包).
pub const DATASET_URL: &str = "https://storage.googleapis.com/tem-berry-data/gb_dcfi_bundle.zip";

/// 信号包的期望 SHA-256 摘要.
pub const DATASET_SHA256: &str = "718a1f454ae6652b49feba4778c25632dbd87336196a197172aaad8261f16aad";

/// 端到端运行错误. 所有错误都是致命的.
#[derive(Debug)]
pub enum RunError {
    /// 数据获取/校验失败.
    Acquire(tem_berry::acquire::AcquireError),

    /// 信号包读取失败.
    Bundle(BundleError),

    /// 仪器元数据缺失或类型不符.
    Meta(MetaError),

    /// 内部点不足, 无法聚类或传播标签.
    NoInteriorPoints,

    /// 聚类失败.
    Cluster(ClusterError),

    /// 产物写出等 I/O 失败.
    Io(std::io::Error),

    /// 可视化图像编码失败.
    Render(image::ImageError),
}

impl From<tem_berry::acquire::AcquireError> for RunError {
    fn from(e: tem_berry::acquire::AcquireError) -> Self {
        Self::Acquire(e)
    }
}

impl From<BundleError> for RunError {
    fn from(e: BundleError) -> Self {
        Self::Bundle(e)
    }
}

impl From<MetaError> for RunError {
    fn from(e: MetaError) -> Self {
        Self::Meta(e)
    }
}

impl From<ClusterError> for RunError {
    fn from(e: ClusterError) -> Self {
        Self::Cluster(e)
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<image::ImageError> for RunError {
    fn from(e: image::ImageError) -> Self {
        Self::Render(e)
    }
}

/// 实际运行.
pub fn run() -> Result<RunReport, RunError> {
    // 获取并校验数据. 摘要不匹配按硬失败处理.
    let bundle_path = utils::loader::bundle_path();
    let spec = FetchSpec {
        url: DATASET_URL,
        sha256: DATASET_SHA256,
        policy: HashPolicy::Enforce,
    };
    fetch_verified(&spec, &bundle_path)?;

    // 选取对齐帧并记录仪器参数.
    let mut bundle = SignalBundle::open(&bundle_path)?;
    let (signal, frame) = bundle.dcfi_frame()?;
    log::info!("选用信号 `{signal}`, 帧尺寸 {:?}", frame.dim());

    let entry = bundle.dcfi_entry()?;
    let optics = entry.optics();
    log::info!(
        "束会聚半角 {:.2} mrad, 光阑直径 {:.1} um",
        optics.convergence_semi_angle_mrad()?,
        optics.aperture_diameter_um()?,
    );
    if let Some(ax) = entry.axis("x") {
        log::info!("像素尺度 {} {}/px", ax.scale, ax.units);
    }

    // 原子列定位.
    let peaks = locate_columns(frame.view(), &PeakConfig::default());
    log::info!("检测到 {} 个原子列", peaks.len());

    // 邻域特征: 索引一次构建, 显式传入.
    let tree = KdTree2::build(&peaks);
    let features = neighbor_features(&peaks, &tree, &FeatureConfig::default());

    let part = partition_by_vertices(features.view(), MIN_INTERIOR_VERTICES);
    log::info!("内部点 {} 个, 边缘点 {} 个", part.interior.len(), part.edge.len());
    if part.interior.is_empty() {
        return Err(RunError::NoInteriorPoints);
    }

    // 归一化 (每次运行重新拟合) -> 列子集降维 -> 聚类.
    let interior_rows = take_rows(features.view(), &part.interior);
    let scaled = MinMaxScaler::fit_transform(interior_rows.view());
    let reduced = select_features(scaled.view(), &DEFAULT_FEATURE_SUBSET);
    let labels = KMeans::with_clusters(DEFAULT_CLUSTER_COUNT).fit_predict(reduced.view())?;

    // 标签传播到整幅帧.
    let interior_pts: Vec<Pos2d> = part.interior.iter().map(|&i| peaks[i]).collect();
    let edge_pts: Vec<Pos2d> = part.edge.iter().map(|&i| peaks[i]).collect();
    let labels_u8: Vec<u8> = labels.iter().map(|&l| l as u8).collect();
    let map = propagate_labels(&interior_pts, &labels_u8, frame.dim());

    // 写出产物.
    let out_dir = utils::loader::out_dir_from_env_or_cwd();
    fs::create_dir_all(&out_dir)?;
    map.save_overlay(out_dir.join("segmentation.png"), &interior_pts, &edge_pts)?;
    map.save_npy(out_dir.join("segmentation.npy"))?;
    save_positions_npy(&peaks, out_dir.join("positions.npy"))?;
    log::info!("产物已写入 {}", out_dir.display());

    Ok(RunReport {
        signal,
        frame_shape: frame.dim(),
        columns: peaks.len(),
        interior: part.interior.len(),
        edge: part.edge.len(),
        clusters: DEFAULT_CLUSTER_COUNT,
        out_dir,
    })
}
