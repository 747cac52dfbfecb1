//! 启动时的日志保留处理.
//!
//! 只处理 `<prefix>.<YYYY-MM-DD>.log` 与对应的 `.log.gz`, 目录中的其他文件不受影响.

use super::LoggingConfig;
use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, TimeDelta};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 按给定日期确定的保留策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    prefix: String,
    today: NaiveDate,
    /// 早于该日期的日志被删除
    cutoff: NaiveDate,
    compress_history: bool,
}

/// 对单个日志文件的处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Keep,
    Remove,
    Compress,
}

/// 一次清理的结果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupSummary {
    pub removed: usize,
    pub compressed: usize,
    /// 处理失败的文件及原因, 不中断其余文件
    pub failed: Vec<(PathBuf, String)>,
}

#[derive(Debug)]
struct LogFile {
    path: PathBuf,
    date: NaiveDate,
    compressed: bool,
}

impl RetentionPolicy {
    pub fn new(config: &LoggingConfig, today: NaiveDate) -> Result<Self> {
        if config.retention_days < 0 {
            bail!("retention_days 不能为负数: {}", config.retention_days);
        }
        let cutoff = TimeDelta::try_days(config.retention_days)
            .and_then(|keep| today.checked_sub_signed(keep))
            .with_context(|| {
                format!("retention_days 超出日期范围: {}", config.retention_days)
            })?;
        Ok(Self {
            prefix: config.file_prefix.clone(),
            today,
            cutoff,
            compress_history: config.compress_history,
        })
    }

    fn action_for(&self, file: &LogFile) -> Action {
        if file.date < self.cutoff {
            Action::Remove
        } else if self.compress_history && !file.compressed && file.date < self.today {
            Action::Compress
        } else {
            Action::Keep
        }
    }

    /// 处理目录中的日志文件, 目录不存在时什么也不做
    pub fn apply(&self, directory: &Path) -> Result<CleanupSummary> {
        let mut summary = CleanupSummary::default();
        if !directory.exists() {
            return Ok(summary);
        }

        let entries = fs::read_dir(directory)
            .with_context(|| format!("读取日志目录失败, path={}", directory.display()))?;
        for entry in entries {
            let path = entry?.path();
            let Some(file) = LogFile::parse(path, &self.prefix) else {
                continue;
            };
            let outcome = match self.action_for(&file) {
                Action::Keep => continue,
                Action::Remove => fs::remove_file(&file.path)
                    .map(|()| summary.removed += 1)
                    .map_err(anyhow::Error::from),
                Action::Compress => {
                    compress_to_gz(&file.path).map(|()| summary.compressed += 1)
                }
            };
            if let Err(err) = outcome {
                summary.failed.push((file.path, format!("{err:#}")));
            }
        }
        Ok(summary)
    }
}

impl LogFile {
    /// 识别 `<prefix>.<YYYY-MM-DD>.log[.gz]`
    fn parse(path: PathBuf, prefix: &str) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (stem, compressed) = match name.strip_suffix(".gz") {
            Some(stem) => (stem, true),
            None => (name, false),
        };
        let date = stem
            .strip_suffix(".log")?
            .strip_prefix(prefix)?
            .strip_prefix('.')?;
        // chrono 接受不补零的月日, 这里只认滚动写出的固定宽度格式
        if date.len() != 10 {
            return None;
        }
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        Some(Self {
            path,
            date,
            compressed,
        })
    }
}

/// 以当天日期清理配置指定的日志目录
pub fn cleanup_logs(config: &LoggingConfig) -> Result<CleanupSummary> {
    let policy = RetentionPolicy::new(config, Local::now().date_naive())?;
    policy.apply(Path::new(&config.directory))
}

/// 压缩为 `<name>.gz` 并删除原文件
///
/// 先写入 `.gz.part` 再改名, 中途失败不会留下截断的 `.gz`.
fn compress_to_gz(path: &Path) -> Result<()> {
    let gz_path = PathBuf::from(format!("{}.gz", path.display()));
    if gz_path.exists() {
        // 已有压缩副本, 原文件是上次压缩后未删除的残留
        return fs::remove_file(path)
            .with_context(|| format!("删除已压缩日志失败, path={}", path.display()));
    }
    let part_path = PathBuf::from(format!("{}.part", gz_path.display()));

    let result = (|| -> Result<()> {
        let mut input = BufReader::new(
            File::open(path)
                .with_context(|| format!("打开待压缩日志失败, path={}", path.display()))?,
        );
        let output = File::create(&part_path)
            .with_context(|| format!("创建压缩日志失败, path={}", part_path.display()))?;
        let mut encoder = GzEncoder::new(BufWriter::new(output), Compression::default());
        io::copy(&mut input, &mut encoder)?;
        encoder.finish()?.flush()?;
        fs::rename(&part_path, &gz_path)?;
        Ok(())
    })();
    if result.is_err() {
        let _ = fs::remove_file(&part_path);
    }
    result?;

    fs::remove_file(path).with_context(|| format!("删除已压缩日志失败, path={}", path.display()))
}
