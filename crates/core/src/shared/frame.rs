use ndarray::{ArrayView3, ArrayViewMut3};

/// One decoded frame: contiguous RGB bytes in row-major order.
///
/// Every pipeline stage that changes pixels produces a new `Frame`;
/// encoding/decoding happens only at I/O boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "frame data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Position of this frame within its source sequence (0 for still images).
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let frame = Frame::new(vec![7u8; 2 * 3 * 3], 3, 2, 3, 4);
        assert_eq!(frame.width(), 3);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.index(), 4);
        assert_eq!(frame.data().len(), 18);
    }

    #[test]
    fn test_clone_is_independent() {
        let frame = Frame::new(vec![50u8; 12], 2, 2, 3, 0);
        let mut other = frame.clone();
        other.data_mut()[0] = 0;
        assert_eq!(frame.data()[0], 50);
        assert_eq!(other.data()[0], 0);
    }

    #[test]
    fn test_ndarray_view_is_height_width_channels() {
        let mut data = vec![0u8; 2 * 4 * 3];
        data[(1 * 4 + 2) * 3 + 1] = 200; // row 1, col 2, G
        let frame = Frame::new(data, 4, 2, 3, 0);
        let view = frame.as_ndarray();
        assert_eq!(view.shape(), &[2, 4, 3]);
        assert_eq!(view[[1, 2, 1]], 200);
    }

    #[test]
    fn test_ndarray_mut_writes_through() {
        let mut frame = Frame::new(vec![0u8; 12], 2, 2, 3, 0);
        frame.as_ndarray_mut()[[0, 1, 2]] = 99;
        assert_eq!(frame.data()[(0 * 2 + 1) * 3 + 2], 99);
    }

    #[test]
    #[should_panic(expected = "frame data length must equal width * height * channels")]
    fn test_wrong_length_panics_in_debug() {
        Frame::new(vec![0u8; 5], 2, 2, 3, 0);
    }
}
