//! 命令行入口：参数解析、退出码映射、帧/音频两条流水线的驱动
//!
//! 退出码约定：配置错误与元数据获取失败退出 1，其余情况退出 0
//! （视频流打开/扫描失败会中止本轮并记录日志，但不改变退出码）。

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;
use log::{error, info, warn};

use clip_archiver::cli::{Cli, Mode};
use clip_archiver::core::audio;
use clip_archiver::core::manifest;
use clip_archiver::core::source::YtDlpSource;
use clip_archiver::core::timerange::TimeRange;
use clip_archiver::core::video::{FfmpegFrameReader, FrameSampler, FrameStore, SamplerConfig};

fn banner() {
    println!(
        r#"
   ┌──────────────────────────────────────┐
   │   clip-archiver · 视频帧归档工具     │
   └──────────────────────────────────────┘
"#
    );
}

fn print_usage() {
    println!(
        r#"    Usage: clip-archiver [URL] [OPTIONS]

    示例:
    ---------------------
    1. 提取帧（默认）:
       clip-archiver "https://youtu.be/..." --range 0:03-0:05

    2. 只提取音频（源编码）:
       clip-archiver "https://youtu.be/..." --range 0:00-1:30 --mode audio

    3. 同时归档音频和帧:
       clip-archiver "https://youtu.be/..." --start-at 5:20 --extract-for 10s --mode both

    4. 高精度补跑（保留已有帧，只补新帧）:
       clip-archiver "https://youtu.be/..." --full --frameskip 2

    OPTIONS:
    --------
    --mode [frame|audio|both]   : 提取内容（默认 frame）
    --range [start-end]         : 时间范围，例如 0:03-0:05
    --full                      : 处理整个视频
    --start-at [time]           : --extract-for 的起点
    --extract-for [duration]    : 时长，例如 10s
    --frameskip [int]           : 0=逐帧分析，10=每 11 帧一帧（默认 10）
    --sensitivity [int]         : 感知哈希汉明距离阈值（默认 2）
    --scene-threshold [float]   : 静态帧像素差阈值（默认 5.0）
    --audio-format [type]       : native（最佳）/ mp3 / wav
    --output-dir [path]         : 输出根目录（默认当前目录）
"#
    );
}

fn main() {
    banner();

    if std::env::args().len() == 1 {
        print_usage();
        std::process::exit(0);
    }

    let args = Cli::parse();
    clip_archiver::init_logging();

    // 配置错误在引擎启动前暴露
    let range = match args.resolve_range() {
        Ok(r) => r,
        Err(e) => {
            error!("配置错误: {}", e);
            std::process::exit(1);
        }
    };

    let provider = YtDlpSource::new();
    let meta = match provider.fetch_metadata(&args.url) {
        Ok(m) => m,
        Err(e) => {
            error!("获取元数据失败: {}", e);
            std::process::exit(1);
        }
    };

    let out_dir = match manifest::prepare_output_dir(&args.output_dir, &args.url, &meta) {
        Ok(p) => p,
        Err(e) => {
            error!("创建输出目录失败: {}", e);
            std::process::exit(1);
        }
    };
    info!("📂 输出目录: {}", out_dir.display());

    if matches!(args.mode, Mode::Audio | Mode::Both) {
        // 音频失败不阻塞帧提取
        if let Err(e) = audio::extract_audio(&args.url, &range, args.audio_format.into(), &out_dir)
        {
            warn!("音频提取失败: {}", e);
        }
    }

    if matches!(args.mode, Mode::Frame | Mode::Both) {
        run_frames(&provider, &args, range, &out_dir);
    }
}

fn run_frames(provider: &YtDlpSource, args: &Cli, range: TimeRange, out_dir: &Path) {
    let stream = match provider.resolve_stream(&args.url) {
        Ok(s) => s,
        Err(e) => {
            error!("解析视频流失败: {}", e);
            return;
        }
    };

    let mut reader = match FfmpegFrameReader::open(&stream, range) {
        Ok(r) => r,
        Err(e) => {
            error!("打开视频流失败: {}", e);
            return;
        }
    };

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let flag = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed)) {
            warn!("注册 Ctrl-C 处理失败: {}", e);
        }
    }

    let config = SamplerConfig {
        frameskip: args.frameskip,
        sensitivity: args.sensitivity,
        scene_threshold: args.scene_threshold,
    };
    let store = FrameStore::new(out_dir);
    let mut sampler = FrameSampler::new(config).with_cancel_flag(cancel);

    info!("--- 帧提取 ---");
    info!("扫描 {} ...", out_dir.display());
    match sampler.run(&mut reader, &store) {
        Ok(report) => info!(
            "完成。新增 {} 帧，已存在跳过 {} 帧（扫描 {} 帧，分析 {} 帧）",
            report.saved, report.skipped_existing, report.frames_seen, report.analyzed
        ),
        Err(e) => error!("帧扫描失败: {}", e),
    }
}
