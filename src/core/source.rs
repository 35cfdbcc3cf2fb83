//! 视频源解析 - 通过 yt-dlp 获取元数据与可解码的直链流
//!
//! 这里不做任何重试/退避，网络韧性完全交给 yt-dlp 自己处理。

use std::process::Command;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("启动 yt-dlp 失败: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("yt-dlp 退出异常: {0}")]
    Exit(String),
    #[error("yt-dlp 输出解析失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("yt-dlp 输出缺少字段: {0}")]
    MissingField(&'static str),
}

/// 视频元数据（输出目录命名与 manifest 用）
#[derive(Debug, Clone)]
pub struct VideoMetadata {
    pub uploader: String,
    pub title: String,
    pub upload_date: String,
}

/// 可解码流参数，reader 据此计算帧大小与时间戳
#[derive(Debug, Clone)]
pub struct StreamInfo {
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
}

#[derive(Debug, Deserialize)]
struct ProbeDump {
    uploader: Option<String>,
    title: Option<String>,
    upload_date: Option<String>,
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    fps: Option<f64>,
}

/// yt-dlp 驱动的源提供者
pub struct YtDlpSource {
    binary: String,
}

impl YtDlpSource {
    pub fn new() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// 获取 uploader / title / upload_date
    pub fn fetch_metadata(&self, url: &str) -> Result<VideoMetadata, SourceError> {
        info!("--- 获取元数据 ---");
        let dump = self.probe(url, None)?;
        Ok(VideoMetadata {
            uploader: dump.uploader.unwrap_or_else(|| "Unknown_Channel".to_string()),
            title: dump.title.unwrap_or_else(|| "Unknown_Video".to_string()),
            upload_date: dump.upload_date.unwrap_or_default(),
        })
    }

    /// 解析 bestvideo 直链与流参数
    pub fn resolve_stream(&self, url: &str) -> Result<StreamInfo, SourceError> {
        let dump = self.probe(url, Some("bestvideo"))?;
        let info = StreamInfo {
            url: dump.url.ok_or(SourceError::MissingField("url"))?,
            width: dump.width.ok_or(SourceError::MissingField("width"))?,
            height: dump.height.ok_or(SourceError::MissingField("height"))?,
            fps: dump.fps.ok_or(SourceError::MissingField("fps"))?,
        };
        debug!(
            "视频流: {}x{} @ {:.2}fps",
            info.width, info.height, info.fps
        );
        Ok(info)
    }

    fn probe(&self, url: &str, format: Option<&str>) -> Result<ProbeDump, SourceError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--quiet").arg("--no-warnings").arg("-j");
        if let Some(f) = format {
            cmd.arg("-f").arg(f);
        }
        cmd.arg(url);

        let output = cmd.output()?;
        if !output.status.success() {
            return Err(SourceError::Exit(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_dump_deserialize() {
        let json = r#"{
            "uploader": "SomeChannel",
            "title": "A Video",
            "upload_date": "20240102",
            "url": "https://example.com/stream",
            "width": 1920,
            "height": 1080,
            "fps": 29.97,
            "extra_field": true
        }"#;
        let dump: ProbeDump = serde_json::from_str(json).unwrap();
        assert_eq!(dump.uploader.as_deref(), Some("SomeChannel"));
        assert_eq!(dump.width, Some(1920));
        assert_eq!(dump.fps, Some(29.97));
    }

    #[test]
    fn test_probe_dump_tolerates_missing_fields() {
        let dump: ProbeDump = serde_json::from_str("{}").unwrap();
        assert!(dump.uploader.is_none());
        assert!(dump.url.is_none());
    }

    #[test]
    fn test_missing_binary_is_spawn_error() {
        let source = YtDlpSource::with_binary("/nonexistent/yt-dlp-test-binary");
        assert!(matches!(
            source.fetch_metadata("https://example.com"),
            Err(SourceError::Spawn(_))
        ));
    }
}
