//! 数据获取: 单次 HTTP 下载 + SHA-256 完整性校验.
//!
//! 下载是阻塞、顺序的, 不做自动重试. 若目标文件已存在则跳过下载,
//! 但校验总是执行.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// 摘要不匹配时的处理策略.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum HashPolicy {
    /// 仅记录一条警告日志, 运行继续. 即 "尽力校验" 模式.
    Warn,

    /// 返回 [`AcquireError::HashMismatch`], 运行终止.
    Enforce,
}

/// 数据获取的运行时错误.
#[derive(Debug)]
pub enum AcquireError {
    /// 底层 I/O 错误.
    Io(io::Error),

    /// HTTP 请求错误.
    Http(Box<ureq::Error>),

    /// 文件摘要与期望值不匹配 (仅 [`HashPolicy::Enforce`] 下产生).
    HashMismatch {
        /// 期望的十六进制 SHA-256 摘要.
        expected: String,

        /// 实际算得的十六进制 SHA-256 摘要.
        actual: String,
    },
}

impl From<io::Error> for AcquireError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ureq::Error> for AcquireError {
    fn from(e: ureq::Error) -> Self {
        Self::Http(Box::new(e))
    }
}

/// 描述一次固定的远端数据获取.
#[derive(Copy, Clone, Debug)]
pub struct FetchSpec<'a> {
    /// 远端文件 URL.
    pub url: &'a str,

    /// 期望的十六进制 SHA-256 摘要 (不区分大小写).
    pub sha256: &'a str,

    /// 摘要不匹配时的处理策略.
    pub policy: HashPolicy,
}

/// 确保 `dest` 处存在通过校验的数据文件, 必要时先从 `spec.url` 下载.
///
/// 1. 若 `dest` 已存在, 跳过下载;
/// 2. 否则创建父目录并以 1 MiB 缓冲流式写盘;
/// 3. 计算整个文件的 SHA-256, 按 `spec.policy` 处理不匹配.
///
/// 成功时返回 `dest` 的拥有路径.
pub fn fetch_verified<P: AsRef<Path>>(spec: &FetchSpec, dest: P) -> Result<PathBuf, AcquireError> {
    let dest = dest.as_ref();

    if !dest.exists() {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        download(spec.url, dest)?;
    }

    let actual = sha256_file(dest)?;
    if !actual.eq_ignore_ascii_case(spec.sha256) {
        match spec.policy {
            HashPolicy::Warn => {
                log::warn!(
                    "{} 摘要不匹配: 期望 {}, 实际 {}. 按当前策略继续运行",
                    dest.display(),
                    spec.sha256,
                    actual
                );
            }
            HashPolicy::Enforce => {
                return Err(AcquireError::HashMismatch {
                    expected: spec.sha256.to_ascii_lowercase(),
                    actual,
                });
            }
        }
    }

    Ok(dest.to_owned())
}

/// 单次 GET, 响应体流式写入 `dest`.
fn download(url: &str, dest: &Path) -> Result<(), AcquireError> {
    log::info!("下载 {url} -> {}", dest.display());

    let resp = ureq::get(url).call()?;
    let mut reader = resp.into_reader();
    let mut file = File::create(dest)?;
    io::copy(&mut reader, &mut file)?;
    Ok(())
}

/// 计算 `path` 处文件的十六进制 (小写) SHA-256 摘要.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1024 * 1024]; // 1MB buffer

    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    let mut hex = String::with_capacity(64);
    for byte in digest {
        write!(hex, "{byte:02x}").unwrap();
    }
    Ok(hex)
}

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定后继项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = home_dataset_dir()?;
    ans.extend(it);
    Some(ans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// "abc" 的标准 SHA-256 测试向量.
    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    fn write_tmp(name: &str, content: &[u8]) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(name);
        let mut f = File::create(&p).unwrap();
        f.write_all(content).unwrap();
        p
    }

    #[test]
    fn test_sha256_known_vector() {
        let p = write_tmp("tem_berry_sha_abc.bin", b"abc");
        assert_eq!(sha256_file(&p).unwrap(), ABC_SHA256);
    }

    #[test]
    fn test_fetch_existing_file_enforce_ok() {
        let p = write_tmp("tem_berry_fetch_ok.bin", b"abc");
        let spec = FetchSpec {
            url: "http://invalid.invalid/never-contacted",
            sha256: ABC_SHA256,
            policy: HashPolicy::Enforce,
        };
        // 文件已存在, 不触发网络.
        let got = fetch_verified(&spec, &p).unwrap();
        assert_eq!(got, p);
    }

    #[test]
    fn test_fetch_mismatch_enforce_fails() {
        let p = write_tmp("tem_berry_fetch_bad.bin", b"not abc");
        let spec = FetchSpec {
            url: "http://invalid.invalid/never-contacted",
            sha256: ABC_SHA256,
            policy: HashPolicy::Enforce,
        };
        match fetch_verified(&spec, &p) {
            Err(AcquireError::HashMismatch { expected, actual }) => {
                assert_eq!(expected, ABC_SHA256);
                assert_ne!(actual, ABC_SHA256);
            }
            other => panic!("期望 HashMismatch, 得到 {other:?}"),
        }
    }

    #[test]
    fn test_fetch_mismatch_warn_tolerated() {
        let p = write_tmp("tem_berry_fetch_warn.bin", b"not abc");
        let spec = FetchSpec {
            url: "http://invalid.invalid/never-contacted",
            sha256: ABC_SHA256,
            policy: HashPolicy::Warn,
        };
        assert!(fetch_verified(&spec, &p).is_ok());
    }
}
