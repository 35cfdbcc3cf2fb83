//! 帧落盘 - 时间戳派生确定性文件名，已存在即跳过
//!
//! 文件名是时间戳的纯函数，同一时间戳永远得到同一个文件名，
//! 重复运行天然幂等。磁盘上的文件就是唯一的持久状态，没有索引文件。

use std::path::PathBuf;

use image::RgbImage;
use log::debug;
use thiserror::Error;

use super::frame::Frame;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),
    #[error("PNG 编码失败: {0}")]
    Encode(#[from] image::ImageError),
    #[error("帧缓冲尺寸不合法: {width}x{height}")]
    InvalidBuffer { width: u32, height: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadyExists,
}

/// `H:MM:SS.mmm`（毫秒截断）→ `H-MM-SS_mmm`
pub fn timestamp_label(ms: u64) -> String {
    let millis = ms % 1000;
    let total_secs = ms / 1000;
    let secs = total_secs % 60;
    let mins = (total_secs / 60) % 60;
    let hours = total_secs / 3600;
    format!("{}-{:02}-{:02}_{:03}", hours, mins, secs, millis)
}

pub struct FrameStore {
    out_dir: PathBuf,
}

impl FrameStore {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn frame_path(&self, timestamp_ms: u64) -> PathBuf {
        self.out_dir
            .join(format!("frame_{}.png", timestamp_label(timestamp_ms)))
    }

    /// 无损写入 PNG。同名文件已存在时视为已归档过该时刻，不重写。
    pub fn save(&self, frame: &Frame) -> Result<SaveOutcome, PersistError> {
        let path = self.frame_path(frame.timestamp_ms());
        if path.exists() {
            debug!("帧已归档，跳过: {}", path.display());
            return Ok(SaveOutcome::AlreadyExists);
        }

        let img = RgbImage::from_raw(frame.width, frame.height, frame.data.clone()).ok_or(
            PersistError::InvalidBuffer {
                width: frame.width,
                height: frame.height,
            },
        )?;
        img.save(&path)?;
        Ok(SaveOutcome::Saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_out_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clip_archiver_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("无法创建测试目录");
        dir
    }

    fn create_test_frame(fill: u8, timestamp_ms: u64) -> Frame {
        Frame::new(16, 16, vec![fill; 16 * 16 * 3], timestamp_ms)
    }

    #[test]
    fn test_timestamp_label_format() {
        assert_eq!(timestamp_label(0), "0-00-00_000");
        assert_eq!(timestamp_label(3500), "0-00-03_500");
        assert_eq!(timestamp_label(3723456), "1-02-03_456");
        assert_eq!(timestamp_label(36_000_000), "10-00-00_000");
    }

    #[test]
    fn test_frame_path_is_deterministic() {
        let store = FrameStore::new("/out");
        assert_eq!(store.frame_path(3500), store.frame_path(3500));
        assert_eq!(
            store.frame_path(3500),
            PathBuf::from("/out/frame_0-00-03_500.png")
        );
    }

    #[test]
    fn test_save_then_collision() {
        let dir = temp_out_dir("persist_collision");
        let store = FrameStore::new(&dir);
        let frame = create_test_frame(128, 2500);

        assert_eq!(store.save(&frame).unwrap(), SaveOutcome::Saved);
        assert!(store.frame_path(2500).exists());

        // 同一时间戳的第二次写入必须被跳过，内容不被改动
        let before = fs::read(store.frame_path(2500)).unwrap();
        let other = create_test_frame(0, 2500);
        assert_eq!(store.save(&other).unwrap(), SaveOutcome::AlreadyExists);
        assert_eq!(fs::read(store.frame_path(2500)).unwrap(), before);
    }

    #[test]
    fn test_save_rejects_bad_buffer() {
        let dir = temp_out_dir("persist_bad_buffer");
        let store = FrameStore::new(&dir);
        let frame = Frame::new(16, 16, vec![0u8; 10], 0);
        assert!(matches!(
            store.save(&frame),
            Err(PersistError::InvalidBuffer { .. })
        ));
    }
}
