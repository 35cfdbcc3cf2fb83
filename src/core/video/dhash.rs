//! dHash 感知哈希与去重判定
//!
//! 差分哈希：灰度 → 缩放到 (HASH_SIZE+1)×HASH_SIZE → 每行相邻像素比较，
//! 行优先展开，第 i 个比较结果对应哈希的第 i 位。
//! 纯像素内容的确定性函数，同一帧多次计算、跨运行计算结果一致。

use image::imageops::{self, FilterType};

use super::frame::Frame;

pub const HASH_SIZE: u32 = 8;

pub fn dhash(frame: &Frame) -> u64 {
    let gray = frame.to_gray();
    let resized = imageops::resize(&gray, HASH_SIZE + 1, HASH_SIZE, FilterType::Triangle);

    let mut hash = 0u64;
    let mut bit = 0u32;
    for y in 0..HASH_SIZE {
        for x in 0..HASH_SIZE {
            if resized.get_pixel(x + 1, y)[0] > resized.get_pixel(x, y)[0] {
                hash |= 1 << bit;
            }
            bit += 1;
        }
    }
    hash
}

pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// 感知哈希去重器 - 候选哈希只与最近一次 NOVEL 判定的哈希比较。
///
/// 判定为 NOVEL 时无条件推进基准哈希，即使之后落盘发现文件名已存在，
/// 基准也保持推进。
pub struct HashDeduper {
    sensitivity: u32,
    last_accepted: Option<u64>,
}

impl HashDeduper {
    pub fn new(sensitivity: u32) -> Self {
        Self {
            sensitivity,
            last_accepted: None,
        }
    }

    /// 汉明距离大于 sensitivity 才算新颖；没有基准时永远新颖
    pub fn is_novel(&mut self, hash: u64) -> bool {
        let novel = match self.last_accepted {
            Some(last) => hamming_distance(hash, last) > self.sensitivity,
            None => true,
        };
        if novel {
            self.last_accepted = Some(hash);
        }
        novel
    }

    pub fn last_accepted(&self) -> Option<u64> {
        self.last_accepted
    }

    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}
