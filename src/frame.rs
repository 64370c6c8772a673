use bytes::Bytes;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// One camera frame reduced to its luminance plane.
///
/// The plane is addressed as `y * row_stride + x * pixel_stride`; the row
/// stride may exceed `width * pixel_stride` when the camera pads rows.
/// Cloning is cheap: the pixel data is shared, not copied.
#[derive(Debug, Clone)]
pub struct LumaFrame {
    data: Bytes,
    width: usize,
    height: usize,
    row_stride: usize,
    pixel_stride: usize,
    captured_at: DateTime<Utc>,
    id: Uuid,
}

impl LumaFrame {
    pub fn new(
        data: Bytes,
        width: usize,
        height: usize,
        row_stride: usize,
        pixel_stride: usize,
    ) -> Self {
        Self {
            data,
            width,
            height,
            row_stride,
            pixel_stride,
            captured_at: Utc::now(),
            id: Uuid::new_v4(),
        }
    }

    /// Builds a frame from a tightly packed plane (no row padding).
    pub fn from_packed(data: Bytes, width: usize, height: usize) -> Self {
        Self::new(data, width, height, width, 1)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn pixel_stride(&self) -> usize {
        self.pixel_stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Luma value at pixel coordinates, or `None` when the computed plane
    /// position falls outside the backing buffer.
    pub fn luma_at(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let position = y * self.row_stride + x * self.pixel_stride;
        self.data.get(position).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloning_frame_shares_pixel_data() {
        let f1 = LumaFrame::from_packed(Bytes::from(vec![7u8; 16 * 16]), 16, 16);
        let f2 = f1.clone();
        assert_eq!(f1.data().as_ptr(), f2.data().as_ptr());
        assert_eq!(f1.id(), f2.id());
    }

    #[test]
    fn luma_at_respects_strides() {
        // 2x2 image with pixel stride 2 and row stride 5.
        let data = Bytes::from(vec![10u8, 0, 11, 0, 99, 20, 0, 21, 0, 99]);
        let frame = LumaFrame::new(data, 2, 2, 5, 2);
        assert_eq!(frame.luma_at(0, 0), Some(10));
        assert_eq!(frame.luma_at(1, 0), Some(11));
        assert_eq!(frame.luma_at(0, 1), Some(20));
        assert_eq!(frame.luma_at(1, 1), Some(21));
        assert_eq!(frame.luma_at(2, 0), None);
    }

    #[test]
    fn truncated_plane_yields_none_not_panic() {
        let frame = LumaFrame::from_packed(Bytes::from(vec![1u8; 4]), 4, 4);
        assert_eq!(frame.luma_at(0, 0), Some(1));
        assert_eq!(frame.luma_at(3, 3), None);
    }
}
