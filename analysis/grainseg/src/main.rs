//! 晶界 STEM 图像分割分析入口.

mod report;
mod runner;

use simple_logger::SimpleLogger;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Info)
        .init()
        .unwrap();

    match runner::run() {
        Ok(report) => report.analyze(),
        Err(e) => {
            log::error!("分析失败: {e:?}");
            std::process::exit(1);
        }
    }
}
