//! 音频提取 - yt-dlp 子进程按时间窗下载音频切片
//!
//! 文件名由切片起止标记决定（audio_START-END.ext），
//! `--no-overwrites` 保证已有切片不会被覆盖。

use std::path::Path;
use std::process::Command;

use log::info;
use thiserror::Error;

use crate::core::timerange::TimeRange;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("启动 yt-dlp 失败: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("yt-dlp 音频下载失败: {0}")]
    Exit(String),
}

/// 音频输出格式：native 保留源编码，mp3/wav 走转码后处理
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Native,
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Native => "native",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }
}

/// 时间窗写法: `*start-end`，开区间右端用 inf
fn section_spec(range: &TimeRange) -> String {
    match range.end_sec {
        Some(end) => format!("*{}-{}", range.start_sec, end),
        None => format!("*{}-inf", range.start_sec),
    }
}

/// 下载窗口内的音频到输出目录。窗口作为显式参数结构传入。
pub fn extract_audio(
    url: &str,
    range: &TimeRange,
    format: AudioFormat,
    out_dir: &Path,
) -> Result<(), AudioError> {
    info!("--- 音频提取 ({}) ---", format.as_str());

    let template = out_dir.join("audio_%(section_start)s-%(section_end)s.%(ext)s");
    let mut cmd = Command::new("yt-dlp");
    cmd.arg("--quiet")
        .arg("--no-warnings")
        .arg("-f")
        .arg("bestaudio/best")
        .arg("--no-overwrites")
        .arg("-o")
        .arg(&template);

    match format {
        AudioFormat::Mp3 => {
            cmd.arg("-x")
                .arg("--audio-format")
                .arg("mp3")
                .arg("--audio-quality")
                .arg("192K");
        }
        AudioFormat::Wav => {
            cmd.arg("-x").arg("--audio-format").arg("wav");
        }
        AudioFormat::Native => {}
    }

    if range.start_sec > 0.0 || range.end_sec.is_some() {
        cmd.arg("--download-sections").arg(section_spec(range));
    }

    cmd.arg(url);

    let output = cmd.output()?;
    if !output.status.success() {
        return Err(AudioError::Exit(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    info!("🎵 音频已保存到: {}", out_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_spec() {
        let bounded = TimeRange {
            start_sec: 3.0,
            end_sec: Some(5.0),
        };
        assert_eq!(section_spec(&bounded), "*3-5");

        let open = TimeRange {
            start_sec: 320.0,
            end_sec: None,
        };
        assert_eq!(section_spec(&open), "*320-inf");
    }

    #[test]
    fn test_format_names() {
        assert_eq!(AudioFormat::Native.as_str(), "native");
        assert_eq!(AudioFormat::Mp3.as_str(), "mp3");
        assert_eq!(AudioFormat::Wav.as_str(), "wav");
    }
}
