//! 运行结果报告.

use std::io::{self, Write};
use std::path::PathBuf;

/// 端到端运行的汇总信息.
pub struct RunReport {
    /// 所用信号名.
    pub signal: String,

    /// 帧尺寸 `(高, 宽)`.
    pub frame_shape: (usize, usize),

    /// 检测到的原子列总数.
    pub columns: usize,

    /// 参与聚类的内部点数.
    pub interior: usize,

    /// 被排除的边缘点数.
    pub edge: usize,

    /// 聚类簇数.
    pub clusters: usize,

    /// 产物输出目录.
    pub out_dir: PathBuf,
}

impl RunReport {
    /// 将汇总写进 `w` 中.
    fn describe_into<W: Write>(&self, w: &mut W) -> io::Result<()> {
        const S4: &str = "    ";

        writeln!(w, "Grain boundary segmentation `{}`:", self.signal)?;
        writeln!(
            w,
            "{S4}Frame: {} x {} px",
            self.frame_shape.0, self.frame_shape.1
        )?;
        writeln!(w, "{S4}Atomic columns: {}", self.columns)?;
        writeln!(w, "{S4}Interior points: {}", self.interior)?;
        writeln!(w, "{S4}Edge points (excluded): {}", self.edge)?;
        writeln!(w, "{S4}Clusters: {}", self.clusters)?;
        write!(w, "{S4}Artifacts: {}", self.out_dir.display())?;
        Ok(())
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);
        self.describe_into(&mut buf).unwrap();
        println!("{}", std::str::from_utf8(&buf).unwrap());
        utils::sep();
    }
}
