/// Kernel size for a region, derived from the request intensity.
///
/// Forced odd and >= 1, and clamped so the kernel never exceeds the region's
/// smaller side.
pub fn kernel_size_for(intensity: u32, region_width: usize, region_height: usize) -> usize {
    let side = region_width.min(region_height).max(1);
    let mut k = (intensity as usize).min(side);
    if k % 2 == 0 {
        k = k.saturating_sub(1);
    }
    k.max(1)
}

/// Precompute a normalized 1D Gaussian kernel.
///
/// `kernel_size` must be odd and >= 1. Sigma follows the OpenCV sigma=0
/// convention, `kernel_size / 6.0`.
pub fn gaussian_kernel_1d(kernel_size: usize) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = kernel_size as f64 / 6.0;
    let half = (kernel_size / 2) as f64;
    let mut kernel: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel.iter().sum();
    for v in &mut kernel {
        *v /= sum;
    }
    kernel.iter().map(|&v| v as f32).collect()
}

/// Separable Gaussian blur over an interleaved pixel buffer, in place.
///
/// Edge pixels are handled by clamping sample coordinates to the buffer.
pub fn separable_gaussian_blur(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = kernel_size / 2;
    let mut temp = vec![0.0f32; width * height * channels];

    // Horizontal pass: data -> temp
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - half as isize)
                        .clamp(0, (width - 1) as isize) as usize;
                    sum += data[(y * width + sx) * channels + c] as f32 * w;
                }
                temp[(y * width + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp -> data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sy = (y as isize + k as isize - half as isize)
                        .clamp(0, (height - 1) as isize) as usize;
                    sum += temp[(sy * width + x) * channels + c] * w;
                }
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn variance(data: &[u8]) -> f64 {
        let mean = data.iter().map(|&v| v as f64).sum::<f64>() / data.len() as f64;
        data.iter()
            .map(|&v| (v as f64 - mean).powi(2))
            .sum::<f64>()
            / data.len() as f64
    }

    /// Deterministic noisy buffer so variance checks have something to reduce.
    fn noisy(len: usize) -> Vec<u8> {
        (0..len).map(|i| ((i * 73 + 31) % 251) as u8).collect()
    }

    #[rstest]
    #[case(30, 100, 80, 29)] // forced odd
    #[case(31, 100, 80, 31)]
    #[case(1, 100, 80, 1)]
    #[case(99, 10, 40, 9)] // clamped to smaller side, then odd
    #[case(99, 4, 4, 3)]
    #[case(5, 0, 0, 1)]
    fn test_kernel_size_for(
        #[case] intensity: u32,
        #[case] w: usize,
        #[case] h: usize,
        #[case] expected: usize,
    ) {
        let k = kernel_size_for(intensity, w, h);
        assert_eq!(k, expected);
        assert_eq!(k % 2, 1);
    }

    #[test]
    fn test_kernel_normalized_and_symmetric() {
        let k = gaussian_kernel_1d(9);
        let sum: f32 = k.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        for i in 0..k.len() / 2 {
            assert!((k[i] - k[k.len() - 1 - i]).abs() < 1e-6);
        }
        assert!(k[4] >= *k.first().unwrap());
    }

    #[test]
    fn test_kernel_size_one_is_identity() {
        let mut data = noisy(6 * 6 * 3);
        let original = data.clone();
        separable_gaussian_blur(&mut data, 6, 6, 3, &gaussian_kernel_1d(1));
        assert_eq!(data, original);
    }

    #[test]
    fn test_uniform_buffer_unchanged() {
        let mut data = vec![90u8; 8 * 8 * 3];
        separable_gaussian_blur(&mut data, 8, 8, 3, &gaussian_kernel_1d(5));
        assert!(data.iter().all(|&v| (v as i32 - 90).abs() <= 1));
    }

    #[test]
    fn test_blur_reduces_variance() {
        let mut data = noisy(16 * 16 * 3);
        let before = variance(&data);
        separable_gaussian_blur(&mut data, 16, 16, 3, &gaussian_kernel_1d(7));
        assert!(variance(&data) < before);
    }

    #[test]
    fn test_blur_spreads_bright_pixel() {
        let mut data = vec![0u8; 9 * 9 * 3];
        let center = (4 * 9 + 4) * 3;
        data[center] = 255;
        separable_gaussian_blur(&mut data, 9, 9, 3, &gaussian_kernel_1d(5));
        assert!(data[center] < 255);
        assert!(data[(4 * 9 + 5) * 3] > 0);
    }
}
