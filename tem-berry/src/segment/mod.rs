//! 标签传播 (像素级分割) 与分割结果的持久化.
//!
//! 对已标注的内部点建 k-d 树, 把每个像素赋予最近内部点的簇标签,
//! 得到与源图同尺寸的标签图 (Voronoi 式最近邻指派). 等距平局由树的
//! 遍历顺序决定, 相同输入的重复运行结果逐位一致.

use crate::feature::KdTree2;
use crate::{Idx2d, Pos2d};
use image::{GrayImage, ImageResult, Rgb, RgbImage};
use ndarray::Array2;
use ndarray_npy::WriteNpyExt;
use std::fs::File;
use std::io;
use std::path::Path;

/// 簇标签可视化调色板 (标签按模数循环取色).
pub const PALETTE: [[u8; 3]; 8] = [
    [66, 135, 245],  // 蓝
    [245, 130, 48],  // 橙
    [60, 180, 75],   // 绿
    [230, 25, 75],   // 红
    [145, 30, 180],  // 紫
    [255, 225, 25],  // 黄
    [70, 240, 240],  // 青
    [240, 50, 230],  // 品红
];

/// 内部点叠加标记色 (白).
pub const INTERIOR_MARK: [u8; 3] = [255, 255, 255];

/// 边缘点叠加标记色 (深灰). 边缘点不参与聚类, 单独渲染.
pub const EDGE_MARK: [u8; 3] = [64, 64, 64];

/// 把每个像素赋予最近已标注点的标签, 生成 `shape` 尺寸的标签图.
///
/// 空间索引在本函数内对 `points` 构建一次, 不依赖任何全局状态.
///
/// # 注意
///
/// `points` 非空且与 `labels` 等长, 否则程序 panic.
pub fn propagate_labels(points: &[Pos2d], labels: &[u8], shape: Idx2d) -> SegmentMap {
    assert!(!points.is_empty(), "标签传播需要至少一个已标注点");
    assert_eq!(points.len(), labels.len(), "点与标签必须一一对应");

    let tree = KdTree2::build(points);
    let mut out = Array2::<u8>::zeros(shape);

    let fill = |(r, c): Idx2d, lab: &mut u8| {
        // 树非空, 最近点必然存在.
        let (idx, _) = tree.nearest((r as f64, c as f64)).unwrap();
        *lab = labels[idx];
    };

    #[cfg(feature = "rayon")]
    ndarray::Zip::indexed(&mut out).par_for_each(fill);

    #[cfg(not(feature = "rayon"))]
    ndarray::Zip::indexed(&mut out).for_each(fill);

    SegmentMap { labels: out }
}

/// 像素级分割结果: 与源图同尺寸的簇标签图.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentMap {
    labels: Array2<u8>,
}

impl SegmentMap {
    /// `(高, 宽)`.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.labels.dim()
    }

    /// 标签数组视图.
    #[inline]
    pub fn labels(&self) -> &Array2<u8> {
        &self.labels
    }

    /// 渲染为调色板着色的 RGB 图像.
    pub fn render(&self) -> RgbImage {
        let (height, width) = self.shape();
        let mut buf = RgbImage::new(width as u32, height as u32);
        for ((r, c), &lab) in self.labels.indexed_iter() {
            buf.put_pixel(c as u32, r as u32, Rgb(PALETTE[lab as usize % PALETTE.len()]));
        }
        buf
    }

    /// 按调色板着色保存为图片 (可视化友好模式).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.render().save(path)
    }

    /// 渲染并叠加检测位置后保存: 内部点与边缘点以不同标记色单独渲染.
    pub fn save_overlay<P: AsRef<Path>>(
        &self,
        path: P,
        interior: &[Pos2d],
        edge: &[Pos2d],
    ) -> ImageResult<()> {
        let mut buf = self.render();
        overlay_positions(&mut buf, interior, INTERIOR_MARK);
        overlay_positions(&mut buf, edge, EDGE_MARK);
        buf.save(path)
    }

    /// 按原样 (标签原始值为灰度) 保存为图片.
    pub fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        let (height, width) = self.shape();
        let mut buf = GrayImage::new(width as u32, height as u32);
        for ((r, c), &lab) in self.labels.indexed_iter() {
            buf.put_pixel(c as u32, r as u32, image::Luma([lab]));
        }
        buf.save(path)
    }

    /// 导出标签数组为 `.npy`.
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        self.labels
            .write_npy(file)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }
}

/// 把一组亚像素位置以单像素标记画到图上. 越界位置忽略.
fn overlay_positions(img: &mut RgbImage, points: &[Pos2d], color: [u8; 3]) {
    for &(r, c) in points {
        let (rr, cc) = (r.round(), c.round());
        if rr < 0.0 || cc < 0.0 || rr as u32 >= img.height() || cc as u32 >= img.width() {
            continue;
        }
        img.put_pixel(cc as u32, rr as u32, Rgb(color));
    }
}
