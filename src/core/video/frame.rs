use std::time::Duration;

use image::GrayImage;

/// 帧数据结构（RGB24，由 reader 产出后不再修改）
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>, // RGB 格式
    pub timestamp: Duration,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>, timestamp_ms: u64) -> Self {
        Self {
            width,
            height,
            data,
            timestamp: Duration::from_millis(timestamp_ms),
        }
    }

    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn timestamp_ms(&self) -> u64 {
        self.timestamp.as_millis() as u64
    }

    /// 转灰度（静态过滤与 dHash 共用的加权公式）
    pub fn to_gray(&self) -> GrayImage {
        let gray: Vec<u8> = self
            .data
            .chunks_exact(3)
            .map(|rgb| {
                ((rgb[0] as u32 * 299 + rgb[1] as u32 * 587 + rgb[2] as u32 * 114) / 1000) as u8
            })
            .collect();
        GrayImage::from_raw(self.width, self.height, gray).expect("Invalid frame data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let data = vec![255u8; 100 * 100 * 3]; // 100x100 white image
        let frame = Frame::new(100, 100, data, 1000);

        assert_eq!(frame.width, 100);
        assert_eq!(frame.height, 100);
        assert_eq!(frame.pixel_count(), 10000);
        assert_eq!(frame.timestamp_ms(), 1000);
    }

    #[test]
    fn test_to_gray_weighted() {
        // 纯红: (255*299)/1000 = 76
        let data = [255u8, 0, 0].repeat(16);
        let frame = Frame::new(4, 4, data, 0);
        let gray = frame.to_gray();
        assert_eq!(gray.dimensions(), (4, 4));
        assert!(gray.pixels().all(|p| p[0] == 76));
    }
}
