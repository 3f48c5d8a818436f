use ndarray::ArrayView3;

/// Pixel layout of a raw camera frame.
///
/// The feature extractor keys channel handling off this: BGRA sources need
/// their color channels reversed before entering the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    Bgra8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 | PixelFormat::Bgra8 => 4,
        }
    }

    /// True when the red and blue channels are swapped relative to RGB.
    pub fn reversed_channels(&self) -> bool {
        matches!(self, PixelFormat::Bgra8)
    }
}

/// A single camera frame: contiguous pixel bytes in row-major order.
///
/// Frames are consumed once per pipeline iteration and never retained
/// afterwards; the object stage clones the frame it dispatches.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: PixelFormat, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * format.channels(),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            format,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.format.channels(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2, PixelFormat::Rgb8, 5);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.format(), PixelFormat::Rgb8);
        assert_eq!(frame.index(), 5);
        assert_eq!(frame.data(), &data[..]);
    }

    #[test]
    fn test_channel_counts() {
        assert_eq!(PixelFormat::Rgb8.channels(), 3);
        assert_eq!(PixelFormat::Rgba8.channels(), 4);
        assert_eq!(PixelFormat::Bgra8.channels(), 4);
    }

    #[test]
    fn test_only_bgra_reverses_channels() {
        assert!(PixelFormat::Bgra8.reversed_channels());
        assert!(!PixelFormat::Rgba8.reversed_channels());
        assert!(!PixelFormat::Rgb8.reversed_channels());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * channels")]
    fn test_mismatched_data_length_panics_in_debug() {
        let data = vec![0u8; 10]; // wrong size for 2x2x3
        Frame::new(data, 2, 2, PixelFormat::Rgb8, 0);
    }

    #[test]
    fn test_as_ndarray_shape() {
        let data = vec![0u8; 24]; // 2x4x3
        let frame = Frame::new(data, 4, 2, PixelFormat::Rgb8, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]); // (height, width, channels)
    }

    #[test]
    fn test_as_ndarray_pixel_access() {
        // 2x2 RGB: set pixel (row=1, col=0) to red
        let mut data = vec![0u8; 12];
        data[6] = 255;
        let frame = Frame::new(data, 2, 2, PixelFormat::Rgb8, 0);
        let arr = frame.as_ndarray();
        assert_eq!(arr[[1, 0, 0]], 255);
        assert_eq!(arr[[1, 0, 1]], 0);
        assert_eq!(arr[[1, 0, 2]], 0);
    }

    #[test]
    fn test_clone_is_independent() {
        let data = vec![100u8; 12];
        let frame = Frame::new(data, 2, 2, PixelFormat::Rgb8, 0);
        let cloned = frame.clone();
        drop(frame);
        assert_eq!(cloned.data()[0], 100);
    }
}
