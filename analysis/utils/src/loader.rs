//! 对 `tem-berry::acquire` 的更上一层封装. 提供更直接的数据与输出路径解析.

use std::env;
use std::path::PathBuf;

/// 数据集文件名 (信号包).
pub const BUNDLE_FILENAME: &str = "gb_dcfi_bundle.zip";

/// 获取晶界数据集基本路径.
///
/// 1. 若环境变量 `$GRAINSEG_DATA_DIR` 非空, 则返回其值;
/// 2. 否则, 返回 `$HOME/dataset/tem`.
pub fn data_dir_from_env_or_home() -> PathBuf {
    if let Ok(d) = env::var("GRAINSEG_DATA_DIR") {
        PathBuf::from(d)
    } else {
        tem_berry::acquire::home_dataset_dir_with(["tem"]).unwrap()
    }
}

/// 信号包在本地的全路径.
pub fn bundle_path() -> PathBuf {
    let mut p = data_dir_from_env_or_home();
    p.push(BUNDLE_FILENAME);
    p
}

/// 获取分析产物输出目录.
///
/// 1. 若环境变量 `$GRAINSEG_OUT_DIR` 非空, 则返回其值;
/// 2. 否则, 返回当前目录下的 `grainseg-out`.
pub fn out_dir_from_env_or_cwd() -> PathBuf {
    if let Ok(d) = env::var("GRAINSEG_OUT_DIR") {
        PathBuf::from(d)
    } else {
        PathBuf::from("grainseg-out")
    }
}
