use super::frame::Frame;

/// 静态帧过滤 - 与上一原始帧做逐像素绝对差的均值比较
///
/// 基准帧在每一帧输入时都要推进（包括未命中采样步长的帧），
/// 所以比较对象永远是流里紧邻的上一帧，而不是上一个被分析的帧。
pub struct StaticFrameFilter {
    threshold: f32,
    previous: Option<Frame>,
}

impl StaticFrameFilter {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            previous: None,
        }
    }

    /// 只推进基准帧，不做判定（给未被分析的帧用）
    pub fn observe(&mut self, frame: &Frame) {
        self.previous = Some(frame.clone());
    }

    /// 判定当前帧是否静态，同时把基准帧推进到当前帧。
    /// 没有基准帧时（本轮第一帧）永远不算静态。
    pub fn check(&mut self, frame: &Frame) -> bool {
        let is_static = match &self.previous {
            Some(prev) => mean_abs_diff(prev, frame) < self.threshold,
            None => false,
        };
        self.previous = Some(frame.clone());
        is_static
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}

/// 所有像素/通道上的平均绝对差。尺寸不一致按完全不同处理。
fn mean_abs_diff(a: &Frame, b: &Frame) -> f32 {
    if a.data.len() != b.data.len() || a.data.is_empty() {
        return f32::MAX;
    }
    let sum: u64 = a
        .data
        .iter()
        .zip(b.data.iter())
        .map(|(x, y)| (*x as i16 - *y as i16).unsigned_abs() as u64)
        .sum();
    sum as f32 / a.data.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_frame(width: u32, height: u32, fill: u8) -> Frame {
        let data = vec![fill; (width * height * 3) as usize];
        Frame::new(width, height, data, 0)
    }

    #[test]
    fn test_first_frame_never_static() {
        let mut filter = StaticFrameFilter::new(5.0);
        assert!(!filter.check(&create_test_frame(100, 100, 128)));
    }

    #[test]
    fn test_identical_frames_are_static() {
        let mut filter = StaticFrameFilter::new(5.0);
        filter.check(&create_test_frame(100, 100, 128));
        assert!(filter.check(&create_test_frame(100, 100, 128)));
    }

    #[test]
    fn test_different_frames_not_static() {
        let mut filter = StaticFrameFilter::new(5.0);
        filter.check(&create_test_frame(100, 100, 0));
        assert!(!filter.check(&create_test_frame(100, 100, 255)));
    }

    #[test]
    fn test_observe_advances_baseline() {
        // observe 推进基准后，与该帧相同的帧应被判为静态
        let mut filter = StaticFrameFilter::new(5.0);
        filter.observe(&create_test_frame(100, 100, 200));
        assert!(filter.check(&create_test_frame(100, 100, 200)));
    }

    #[test]
    fn test_threshold_boundary() {
        // 均匀差 4 < 5.0 算静态，均匀差 6 不算
        let mut filter = StaticFrameFilter::new(5.0);
        filter.check(&create_test_frame(10, 10, 100));
        assert!(filter.check(&create_test_frame(10, 10, 104)));
        assert!(!filter.check(&create_test_frame(10, 10, 110)));
    }

    #[test]
    fn test_dimension_mismatch_not_static() {
        let mut filter = StaticFrameFilter::new(5.0);
        filter.check(&create_test_frame(100, 100, 128));
        assert!(!filter.check(&create_test_frame(50, 50, 128)));
    }

    #[test]
    fn test_reset_clears_baseline() {
        let mut filter = StaticFrameFilter::new(5.0);
        filter.check(&create_test_frame(100, 100, 128));
        filter.reset();
        assert!(!filter.check(&create_test_frame(100, 100, 128)));
    }
}
