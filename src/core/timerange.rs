//! 时间窗解析 - 把文本时间戳/时长解析为采样窗口

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeRangeError {
    #[error("时间戳格式错误: {0} (应为 SS / MM:SS / HH:MM:SS)")]
    BadTimestamp(String),
    #[error("时间范围格式错误: {0} (应为 START-END)")]
    BadRange(String),
    #[error("时长格式错误: {0} (例如 10s)")]
    BadDuration(String),
    #[error("--extract-for 需要同时指定 --start-at")]
    MissingStartAt,
}

/// 采样时间窗。`end_sec = None` 表示一直取到流结束。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start_sec: f64,
    pub end_sec: Option<f64>,
}

impl TimeRange {
    /// 整个视频
    pub fn full() -> Self {
        Self {
            start_sec: 0.0,
            end_sec: None,
        }
    }

    /// 解析 "START-END" 形式的范围
    pub fn from_range_str(range: &str) -> Result<Self, TimeRangeError> {
        let (start, end) = range
            .split_once('-')
            .ok_or_else(|| TimeRangeError::BadRange(range.to_string()))?;
        Ok(Self {
            start_sec: parse_timestamp(start)? as f64,
            end_sec: Some(parse_timestamp(end)? as f64),
        })
    }

    /// 从起点 + 时长构造窗口
    pub fn from_duration(start_at: Option<&str>, duration: &str) -> Result<Self, TimeRangeError> {
        let start_at = start_at.ok_or(TimeRangeError::MissingStartAt)?;
        let start_sec = parse_timestamp(start_at)? as f64;
        Ok(Self {
            start_sec,
            end_sec: Some(start_sec + parse_duration(duration)?),
        })
    }

    pub fn start_ms(&self) -> u64 {
        (self.start_sec * 1000.0) as u64
    }

    /// 时间戳（毫秒）是否已越过窗口右端
    pub fn is_past_end(&self, timestamp_ms: u64) -> bool {
        match self.end_sec {
            Some(end) => timestamp_ms as f64 / 1000.0 > end,
            None => false,
        }
    }
}

/// 解析 `SS` / `MM:SS` / `HH:MM:SS` 时间戳为秒数
pub fn parse_timestamp(ts: &str) -> Result<u64, TimeRangeError> {
    let parts: Vec<u64> = ts
        .split(':')
        .map(|p| p.parse::<u64>())
        .collect::<Result<_, _>>()
        .map_err(|_| TimeRangeError::BadTimestamp(ts.to_string()))?;

    match parts.as_slice() {
        [s] => Ok(*s),
        [m, s] => Ok(m * 60 + s),
        [h, m, s] => Ok(h * 3600 + m * 60 + s),
        _ => Err(TimeRangeError::BadTimestamp(ts.to_string())),
    }
}

/// 解析时长，允许 `10s` 或纯数字秒数
pub fn parse_duration(duration: &str) -> Result<f64, TimeRangeError> {
    let trimmed = duration.strip_suffix('s').unwrap_or(duration);
    let secs: f64 = trimmed
        .parse()
        .map_err(|_| TimeRangeError::BadDuration(duration.to_string()))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(TimeRangeError::BadDuration(duration.to_string()));
    }
    Ok(secs)
}
