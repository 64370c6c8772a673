use crate::frame::LumaFrame;

// Centered square ROI: half-side is min(width, height) / ROI_DIVISOR, so
// the square spans roughly two thirds of the smaller frame dimension.
const ROI_DIVISOR: usize = 3;

/// Reduces raw frames to scalar intensity samples.
///
/// Only every `frame_skip`-th frame is sampled to bound CPU cost; the rest
/// contribute nothing. The effective rate of the produced series is the
/// camera rate divided by `frame_skip` and must match the
/// `sampling_rate_hz` the estimator is configured with.
#[derive(Debug)]
pub struct FrameSampler {
    frame_skip: u32,
    frame_counter: u32,
}

impl FrameSampler {
    pub fn new(frame_skip: u32) -> Self {
        Self {
            frame_skip: frame_skip.max(1),
            frame_counter: 0,
        }
    }

    /// Returns the mean ROI luminance for sampled frames, `None` for
    /// skipped ones.
    pub fn sample(&mut self, frame: &LumaFrame) -> Option<f32> {
        self.frame_counter = (self.frame_counter + 1) % self.frame_skip;
        if self.frame_counter != 0 {
            return None;
        }
        Some(self.roi_mean(frame))
    }

    /// Mean luma over the centered ROI. Positions that land outside the
    /// plane's backing buffer are skipped rather than failing the frame,
    /// so a malformed frame still yields a (degraded) sample; the divisor
    /// stays the full ROI area.
    fn roi_mean(&self, frame: &LumaFrame) -> f32 {
        let width = frame.width();
        let height = frame.height();
        let center_x = width / 2;
        let center_y = height / 2;
        let half_side = width.min(height) / ROI_DIVISOR;

        let mut total: u64 = 0;
        for y in center_y.saturating_sub(half_side)..(center_y + half_side).min(height) {
            for x in center_x.saturating_sub(half_side)..(center_x + half_side).min(width) {
                if let Some(luma) = frame.luma_at(x, y) {
                    total += u64::from(luma);
                }
            }
        }

        let roi_area = (half_side * 2) * (half_side * 2);
        if roi_area > 0 {
            total as f32 / roi_area as f32
        } else {
            0.0
        }
    }
}
