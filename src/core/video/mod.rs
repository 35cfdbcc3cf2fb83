//! 帧采样与去重引擎
//!
//! 处理链（严格单向）：
//! 1. 帧流读取 - ffmpeg 子进程按时间窗产出 RGB 帧
//! 2. 采样步长 - 每 frameskip+1 帧分析一帧
//! 3. 静态过滤 - 与上一原始帧的平均像素差
//! 4. 感知哈希去重 - dHash + 汉明距离
//! 5. 落盘 - 时间戳文件名，已存在即跳过

pub mod dhash;
pub mod frame;
pub mod persist;
pub mod reader;
pub mod sampler;
pub mod static_filter;

pub use dhash::{dhash, hamming_distance, HashDeduper};
pub use frame::Frame;
pub use persist::{FrameStore, PersistError, SaveOutcome};
pub use reader::{FfmpegFrameReader, FrameSource, ReaderError};
pub use sampler::{FrameSampler, SampleError, SampleState, SamplerConfig, ScanReport};
pub use static_filter::StaticFrameFilter;
