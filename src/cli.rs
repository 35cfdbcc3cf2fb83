//! 命令行参数定义与时间窗解析

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

use crate::core::audio::AudioFormat;
use crate::core::timerange::{TimeRange, TimeRangeError};

/// 媒体归档工具：按时间窗采样视频帧并去重落盘，可同时提取音频切片
#[derive(Debug, Parser)]
#[command(name = "clip-archiver", version)]
#[command(group = ArgGroup::new("window").required(true))]
pub struct Cli {
    /// 视频 URL
    pub url: String,

    /// 处理整个视频
    #[arg(long, group = "window")]
    pub full: bool,

    /// 时间范围，例如 0:03-0:05
    #[arg(long, group = "window")]
    pub range: Option<String>,

    /// 固定时长，例如 10s（需要 --start-at）
    #[arg(long, group = "window")]
    pub extract_for: Option<String>,

    /// --extract-for 的起点
    #[arg(long)]
    pub start_at: Option<String>,

    /// 提取内容
    #[arg(long, value_enum, default_value_t = Mode::Frame)]
    pub mode: Mode,

    /// 0=逐帧分析，10=每 11 帧分析一帧
    #[arg(long, default_value_t = 10)]
    pub frameskip: u32,

    /// 感知哈希汉明距离阈值，小于等于该值视为重复
    #[arg(long, default_value_t = 2)]
    pub sensitivity: u32,

    /// 静态帧平均像素差阈值
    #[arg(long, default_value_t = 5.0)]
    pub scene_threshold: f32,

    /// 音频格式
    #[arg(long, value_enum, default_value_t = AudioFormatArg::Native)]
    pub audio_format: AudioFormatArg,

    /// 输出根目录
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    Frame,
    Audio,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AudioFormatArg {
    Native,
    Mp3,
    Wav,
}

impl From<AudioFormatArg> for AudioFormat {
    fn from(arg: AudioFormatArg) -> Self {
        match arg {
            AudioFormatArg::Native => AudioFormat::Native,
            AudioFormatArg::Mp3 => AudioFormat::Mp3,
            AudioFormatArg::Wav => AudioFormat::Wav,
        }
    }
}

impl Cli {
    /// 三种互斥的窗口模式解析为 TimeRange
    pub fn resolve_range(&self) -> Result<TimeRange, TimeRangeError> {
        if let Some(range) = &self.range {
            TimeRange::from_range_str(range)
        } else if let Some(duration) = &self.extract_for {
            TimeRange::from_duration(self.start_at.as_deref(), duration)
        } else {
            Ok(TimeRange::full())
        }
    }
}
