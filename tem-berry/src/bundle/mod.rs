//! 信号包读取.
//!
//! 信号包是转换后的显微镜数据容器: 一个 zip 归档, 内含描述信号列表的
//! `manifest.json` 与每个信号一个的 `.npy` 二维强度帧. 每个信号条目带有
//! 名称、嵌套字符串键元数据映射和坐标轴尺度映射.
//!
//! 该模块把容器当作不透明的外部协作者: 只做只读的键查找, 不解析
//! 仪器原始格式本身.

mod meta;

pub use meta::{MetaError, OpticsMeta};

use ndarray::Array2;
use ndarray_npy::{ReadNpyError, ReadNpyExt};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

/// 打开或读取信号包的错误.
#[derive(Debug)]
pub enum BundleError {
    /// 底层 I/O 错误.
    Io(std::io::Error),

    /// zip 归档结构错误 (含成员缺失).
    Zip(zip::result::ZipError),

    /// `manifest.json` 解析错误.
    Manifest(serde_json::Error),

    /// 清单中不存在该名称的信号.
    MissingSignal(String),

    /// 清单中不存在 DCFI (漂移校正帧积分) 信号.
    MissingDcfi,

    /// `.npy` 成员解码错误.
    Npy(ReadNpyError),
}

impl From<std::io::Error> for BundleError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<zip::result::ZipError> for BundleError {
    fn from(e: zip::result::ZipError) -> Self {
        Self::Zip(e)
    }
}

/// 信号包清单: 信号条目列表.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// 按容器内原始顺序排列的信号条目.
    pub signals: Vec<SignalEntry>,
}

/// 单个信号条目.
#[derive(Debug, Deserialize)]
pub struct SignalEntry {
    /// 信号名, 如 `"HAADF"`, `"DCFI"`.
    pub name: String,

    /// 归档内数据成员路径, 如 `"signals/0/data.npy"`.
    pub data: String,

    /// 嵌套字符串键元数据映射. 经 [`OpticsMeta`] 做类型化访问.
    #[serde(default)]
    pub metadata: serde_json::Value,

    /// 坐标轴尺度映射, 键为轴名 (如 `"x"`, `"y"`).
    #[serde(default)]
    pub axes: BTreeMap<String, AxisScale>,
}

impl SignalEntry {
    /// 该信号的类型化仪器元数据视图.
    #[inline]
    pub fn optics(&self) -> OpticsMeta<'_> {
        OpticsMeta::new(&self.metadata)
    }

    /// `axis` 轴的物理尺度. 轴缺失时返回 `None`.
    #[inline]
    pub fn axis(&self, axis: &str) -> Option<&AxisScale> {
        self.axes.get(axis)
    }
}

/// 单个坐标轴的物理尺度描述.
#[derive(Debug, Clone, Deserialize)]
pub struct AxisScale {
    /// 每像素物理尺度.
    pub scale: f64,

    /// 轴原点偏移.
    #[serde(default)]
    pub offset: f64,

    /// 物理单位, 如 `"nm"`.
    #[serde(default)]
    pub units: String,
}

/// 已打开的信号包.
///
/// 读取数据成员需要 `&mut self` (底层 zip 读取器是游标式的),
/// 清单访问则是只读的.
pub struct SignalBundle {
    archive: zip::ZipArchive<File>,
    manifest: Manifest,
}

impl SignalBundle {
    /// 从 `path` 打开信号包并解析清单.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BundleError> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)?;

        let manifest: Manifest = {
            let member = archive.by_name("manifest.json")?;
            serde_json::from_reader(member).map_err(BundleError::Manifest)?
        };

        Ok(Self { archive, manifest })
    }

    /// 信号个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.manifest.signals.len()
    }

    /// 信号包是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.manifest.signals.is_empty()
    }

    /// 按清单顺序列出所有信号名.
    pub fn signal_names(&self) -> Vec<&str> {
        self.manifest.signals.iter().map(|s| s.name.as_str()).collect()
    }

    /// 按名称查找信号条目.
    pub fn entry(&self, name: &str) -> Option<&SignalEntry> {
        self.manifest.signals.iter().find(|s| s.name == name)
    }

    /// 查找 DCFI (漂移校正帧积分) 对齐帧条目: 名称包含 `"DCFI"` 的首个信号.
    pub fn dcfi_entry(&self) -> Result<&SignalEntry, BundleError> {
        self.manifest
            .signals
            .iter()
            .find(|s| s.name.contains("DCFI"))
            .ok_or(BundleError::MissingDcfi)
    }

    /// 读取名为 `name` 的信号的二维强度帧.
    pub fn frame(&mut self, name: &str) -> Result<Array2<f32>, BundleError> {
        let data_path = self
            .entry(name)
            .ok_or_else(|| BundleError::MissingSignal(name.to_owned()))?
            .data
            .clone();

        let member = self.archive.by_name(&data_path)?;
        Array2::<f32>::read_npy(member).map_err(BundleError::Npy)
    }

    /// 读取 DCFI 对齐帧. 返回 (信号名, 帧).
    pub fn dcfi_frame(&mut self) -> Result<(String, Array2<f32>), BundleError> {
        let name = self.dcfi_entry()?.name.clone();
        let frame = self.frame(&name)?;
        Ok((name, frame))
    }
}
