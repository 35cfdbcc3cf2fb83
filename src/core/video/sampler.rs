//! 采样调度 - 驱动 步长 → 静态过滤 → 感知哈希去重 → 落盘 的单线程扫描
//!
//! 跨帧状态只有两处，更新时机各自独立：
//! - 静态过滤的基准帧：每一帧输入都推进（含未被分析的帧）
//! - 去重基准哈希：只在 NOVEL 判定时推进（与落盘是否冲突无关）

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info};
use thiserror::Error;

use super::dhash::{dhash, HashDeduper};
use super::persist::{FrameStore, PersistError, SaveOutcome};
use super::reader::FrameSource;
use super::static_filter::StaticFrameFilter;

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("帧落盘失败: {0}")]
    Persist(#[from] PersistError),
    #[error("采样已结束，不能复用同一个采样器")]
    AlreadyDone,
}

/// 采样参数，构造时一次性传入，运行期不可变
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// 每 frameskip+1 帧分析一帧；0 表示逐帧分析
    pub frameskip: u32,
    /// 感知哈希汉明距离阈值，小于等于该值视为重复
    pub sensitivity: u32,
    /// 静态帧平均像素差阈值
    pub scene_threshold: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            frameskip: 10,
            sensitivity: 2,
            scene_threshold: 5.0,
        }
    }
}

/// 一轮扫描的统计结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub frames_seen: u64,
    pub analyzed: u64,
    pub saved: u64,
    pub skipped_existing: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleState {
    Init,
    Seeked,
    Scanning,
    Done,
}

pub struct FrameSampler {
    config: SamplerConfig,
    static_filter: StaticFrameFilter,
    deduper: HashDeduper,
    state: SampleState,
    cancel: Option<Arc<AtomicBool>>,
}

impl FrameSampler {
    pub fn new(config: SamplerConfig) -> Self {
        Self {
            static_filter: StaticFrameFilter::new(config.scene_threshold),
            deduper: HashDeduper::new(config.sensitivity),
            config,
            state: SampleState::Init,
            cancel: None,
        }
    }

    /// 协作式取消标志，每轮循环开头检查一次，绝不在阶段中途退出
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn state(&self) -> SampleState {
        self.state
    }

    /// 扫描一个帧流。source 必须已经 seek 到窗口起点，
    /// 时间窗右端由 source 自己收口。每个采样器只能运行一轮。
    pub fn run(
        &mut self,
        source: &mut dyn FrameSource,
        store: &FrameStore,
    ) -> Result<ScanReport, SampleError> {
        if self.state == SampleState::Done {
            return Err(SampleError::AlreadyDone);
        }
        // source 构造成功即代表 open + seek 完成
        self.state = SampleState::Seeked;

        let stride = self.config.frameskip as u64 + 1;
        let mut report = ScanReport::default();
        let mut frame_index: u64 = 0;

        self.state = SampleState::Scanning;
        loop {
            if let Some(flag) = &self.cancel {
                if flag.load(Ordering::Relaxed) {
                    info!("⏹ 收到取消信号，停止扫描");
                    break;
                }
            }

            let frame = match source.next_frame() {
                Some(f) => f,
                None => break, // 流正常结束
            };
            report.frames_seen += 1;

            let on_stride = frame_index % stride == 0;
            frame_index += 1;

            if !on_stride {
                // 未分析的帧也要推进静态过滤的基准帧
                self.static_filter.observe(&frame);
                continue;
            }
            report.analyzed += 1;

            if self.static_filter.check(&frame) {
                debug!("静态帧，跳过 @{}ms", frame.timestamp_ms());
                continue;
            }

            let hash = dhash(&frame);
            if !self.deduper.is_novel(hash) {
                debug!("感知哈希重复，跳过 @{}ms", frame.timestamp_ms());
                continue;
            }

            // 落盘失败会向上传播并中止整轮，计数不会被污染
            match store.save(&frame)? {
                SaveOutcome::Saved => {
                    report.saved += 1;
                    info!(
                        "📸 已保存 {} | 已存在跳过 {} | @{}ms",
                        report.saved,
                        report.skipped_existing,
                        frame.timestamp_ms()
                    );
                }
                SaveOutcome::AlreadyExists => report.skipped_existing += 1,
            }
        }

        self.state = SampleState::Done;
        info!(
            "✅ 扫描完成: 新增 {} 帧, 已存在跳过 {} 帧 (共 {} 帧, 分析 {})",
            report.saved, report.skipped_existing, report.frames_seen, report.analyzed
        );
        Ok(report)
    }
}
