//! 仪器元数据的类型化访问层.
//!
//! 原始元数据是嵌套字符串键映射 (数值常以字符串存储). 这里不做无检查的
//! 链式索引, 而是以显式的缺键/类型错误返回.

use serde_json::Value;

/// 元数据访问错误.
#[derive(Debug, Clone)]
pub enum MetaError {
    /// 键路径缺失. 参数为 `.` 连接的完整路径.
    MissingKey(String),

    /// 键存在但无法解释为数值. 参数为 `.` 连接的完整路径.
    NotANumber(String),
}

/// 单个信号元数据映射上的类型化只读视图.
///
/// 单位约定:
///
/// - 束会聚半角以弧度存储, 对外换算为毫弧度 (×1000);
/// - 光阑直径以米存储, 对外换算为微米 (×1e6).
#[derive(Copy, Clone, Debug)]
pub struct OpticsMeta<'a> {
    root: &'a Value,
}

impl<'a> OpticsMeta<'a> {
    /// 初始化.
    #[inline]
    pub fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// 束会聚半角 (毫弧度). 存储键: `Optics.BeamConvergence` (弧度).
    pub fn convergence_semi_angle_mrad(&self) -> Result<f64, MetaError> {
        self.number(&["Optics", "BeamConvergence"]).map(|v| v * 1e3)
    }

    /// 探针成形光阑直径 (微米). 存储键: `Optics.Apertures.C2.Diameter` (米).
    pub fn aperture_diameter_um(&self) -> Result<f64, MetaError> {
        self.number(&["Optics", "Apertures", "C2", "Diameter"])
            .map(|v| v * 1e6)
    }

    /// 按路径查找数值. 数值可以直接是 JSON number, 也可以是十进制字符串.
    pub fn number(&self, path: &[&str]) -> Result<f64, MetaError> {
        let v = self.lookup(path)?;
        match v {
            Value::Number(n) => n.as_f64().ok_or_else(|| Self::not_a_number(path)),
            Value::String(s) => s.parse::<f64>().map_err(|_| Self::not_a_number(path)),
            _ => Err(Self::not_a_number(path)),
        }
    }

    /// 按路径逐层下探. 任一层缺失即返回 [`MetaError::MissingKey`].
    pub fn lookup(&self, path: &[&str]) -> Result<&'a Value, MetaError> {
        let mut cur = self.root;
        for (depth, key) in path.iter().enumerate() {
            cur = cur
                .get(key)
                .ok_or_else(|| MetaError::MissingKey(path[..=depth].join(".")))?;
        }
        Ok(cur)
    }

    fn not_a_number(path: &[&str]) -> MetaError {
        MetaError::NotANumber(path.join("."))
    }
}
