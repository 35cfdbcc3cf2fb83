//! 帧流读取 - ffmpeg 子进程解码为 RGB24 裸流
//!
//! 先 seek 到窗口起点再产出任何帧；产出的序列惰性、有限、
//! 时间戳单调不减。解码失败与 EOF 都按流的正常结束处理。
//! 读取器不可复用，每轮采样需要一个新实例。

use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use log::debug;
use thiserror::Error;

use crate::core::source::StreamInfo;
use crate::core::timerange::TimeRange;

use super::frame::Frame;

#[derive(Debug, Error)]
pub enum ReaderError {
    #[error("启动 ffmpeg 失败: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("ffmpeg 没有可读的输出管道")]
    NoStdout,
    #[error("流参数不合法: {0}")]
    BadStream(String),
}

/// 帧来源抽象，采样器只面对这个接口，测试用合成帧序列替换
pub trait FrameSource {
    /// 取下一帧；`None` 表示流正常结束（含解码失败与越过时间窗右端）
    fn next_frame(&mut self) -> Option<Frame>;
}

pub struct FfmpegFrameReader {
    child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    fps: f64,
    range: TimeRange,
    frame_n: u64,
    finished: bool,
}

impl FfmpegFrameReader {
    /// 打开流并 seek 到窗口起点。失败即致命，整轮运行中止。
    pub fn open(stream: &StreamInfo, range: TimeRange) -> Result<Self, ReaderError> {
        if stream.width == 0 || stream.height == 0 || !(stream.fps > 0.0) {
            return Err(ReaderError::BadStream(format!(
                "{}x{} @ {}fps",
                stream.width, stream.height, stream.fps
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.arg("-loglevel").arg("error");
        if range.start_sec > 0.0 {
            cmd.arg("-ss").arg(format!("{:.3}", range.start_sec));
        }
        cmd.arg("-i")
            .arg(&stream.url)
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("-")
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        let mut child = cmd.spawn()?;
        let stdout = child.stdout.take().ok_or(ReaderError::NoStdout)?;

        Ok(Self {
            child,
            stdout,
            width: stream.width,
            height: stream.height,
            fps: stream.fps,
            range,
            frame_n: 0,
            finished: false,
        })
    }
}

/// 裸流里没有时间戳，按帧序号和帧率推算
fn frame_timestamp_ms(start_ms: u64, frame_n: u64, fps: f64) -> u64 {
    start_ms + (frame_n as f64 * 1000.0 / fps) as u64
}

impl FrameSource for FfmpegFrameReader {
    fn next_frame(&mut self) -> Option<Frame> {
        if self.finished {
            return None;
        }

        let mut buf = vec![0u8; self.width as usize * self.height as usize * 3];
        if let Err(e) = self.stdout.read_exact(&mut buf) {
            // EOF 和解码中断一视同仁，都是流的正常结束
            debug!("帧流结束: {}", e);
            self.finished = true;
            return None;
        }

        let ts = frame_timestamp_ms(self.range.start_ms(), self.frame_n, self.fps);
        if self.range.is_past_end(ts) {
            self.finished = true;
            return None;
        }

        self.frame_n += 1;
        Some(Frame::new(self.width, self.height, buf, ts))
    }
}

impl Drop for FfmpegFrameReader {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_timestamp_derivation() {
        assert_eq!(frame_timestamp_ms(0, 0, 25.0), 0);
        assert_eq!(frame_timestamp_ms(0, 1, 25.0), 40);
        assert_eq!(frame_timestamp_ms(3000, 25, 25.0), 4000);
        // 30fps: 每帧 33.33ms，截断到毫秒
        assert_eq!(frame_timestamp_ms(0, 1, 30.0), 33);
    }

    #[test]
    fn test_timestamps_non_decreasing() {
        let mut prev = 0;
        for n in 0..300 {
            let ts = frame_timestamp_ms(5000, n, 29.97);
            assert!(ts >= prev);
            prev = ts;
        }
    }

    #[test]
    fn test_open_rejects_bad_stream_params() {
        let stream = StreamInfo {
            url: "https://example.com/stream".to_string(),
            width: 0,
            height: 1080,
            fps: 30.0,
        };
        assert!(matches!(
            FfmpegFrameReader::open(&stream, TimeRange::full()),
            Err(ReaderError::BadStream(_))
        ));
    }
}
