#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供晶界 STEM (扫描透射电镜) 图像的原子列定位、邻域几何特征提取
//! 与聚类分割的结构化信息和基础处理算法.
//!
//! 该 crate 目前仅提供 `safe` 接口. 将来可能为部分高性能场景关键路径提供 `unsafe` 接口.
//!
//! # 注意
//!
//! 1. 该 crate 目前主要处理转换后的信号包 (zip 内含 `manifest.json` 与若干
//!   `.npy` 信号帧), 没有对仪器原始容器格式进行直接适配
//!   (但如果新数据按照该模式组织, 也可以工作).
//! 2. 在非期望情况下, 程序会直接 panic, 而不会导致内存错误. As what Rust promises.
//!
//! # 开发计划
//!
//! ### 数据获取与完整性校验 ✅
//!
//! 单次 HTTP 下载 + SHA-256 摘要校验, 校验失败策略可配置 (警告或硬失败).
//!
//! 实现位于 `tem-berry/src/acquire.rs`.
//!
//! ### 信号包读取与类型化元数据 ✅
//!
//! 打开信号包, 枚举信号条目, 读取 DCFI (漂移校正帧积分) 对齐帧,
//! 并以显式缺键处理的方式访问仪器参数 (束会聚半角、光阑直径、像素尺度).
//!
//! 实现位于 `tem-berry/src/bundle`.
//!
//! ### 原子列定位 ✅
//!
//! 高斯平滑, 对比度归一化, 8-邻域局部极大值检测, 最小间隔去重,
//! 局部质心亚像素精化.
//!
//! 实现位于 `tem-berry/src/localize`.
//!
//! ### 邻域几何特征提取 ✅
//!
//! 静态 2-d k-d 树 (一次构建, 显式传参, 无隐藏全局状态) + 每点 8 维特征:
//! 邻居距离统计与角度排布统计.
//!
//! 实现位于 `tem-berry/src/feature`.
//!
//! ### 特征划分、归一化与聚类 ✅
//!
//! 内部点/边缘点划分 (邻居数阈值), 每列 min-max 归一化 (每次运行重新拟合),
//! 列子集降维, 可替换策略的确定性 k-means 聚类.
//!
//! 实现位于 `tem-berry/src/cluster`.
//!
//! ### 标签传播 (像素级分割) ✅
//!
//! 对内部点建 k-d 树, 将每个像素赋予最近内部点的聚类标签,
//! 得到与原图同尺寸的标签图. 支持调色板 PNG 可视化与 `.npy` 导出.
//!
//! 实现位于 `tem-berry/src/segment`.
//!
//! ### 完善代码文档 ✅
//!
//! 给每个 public API 提供文档, 并视情况给 private API 提供文档.

/// 二维索引, 同时也可一定程度上用作非负整数向量. 格式为 `(行, 列)`.
pub type Idx2d = (usize, usize);

/// 高精度二维坐标, 格式为 `(行, 列)`. 用于亚像素位置.
pub type Pos2d = (f64, f64);

pub mod consts;

pub mod acquire;
pub mod bundle;
pub mod cluster;
pub mod feature;
pub mod localize;
pub mod prelude;
pub mod segment;
