/// Pixelation cell size for the request intensity.
///
/// Higher intensity means fewer, larger cells; a cell size of 1 leaves the
/// region unchanged.
pub fn cell_size_for(intensity: u32) -> usize {
    ((intensity / 10) as usize).max(1)
}

/// Pixelate an interleaved pixel buffer in place: area-average each
/// `cell x cell` block down to one value, then nearest-neighbor expand it
/// back, producing visible blocking.
pub fn pixelate(data: &mut [u8], width: usize, height: usize, channels: usize, cell: usize) {
    if cell <= 1 || width == 0 || height == 0 {
        return;
    }

    let (small, sw, sh) = downscale(data, width, height, channels, cell);
    upscale_nearest(&small, sw, sh, channels, data, width, height);
}

/// Integer-factor downscale by area averaging. The output is at least 1x1
/// even when the factor exceeds the input dimensions.
pub fn downscale(
    data: &[u8],
    width: usize,
    height: usize,
    channels: usize,
    factor: usize,
) -> (Vec<u8>, usize, usize) {
    let new_w = (width / factor).max(1);
    let new_h = (height / factor).max(1);
    let mut out = vec![0u8; new_w * new_h * channels];

    for y in 0..new_h {
        for x in 0..new_w {
            for c in 0..channels {
                let mut sum = 0u32;
                let mut count = 0u32;
                for dy in 0..factor {
                    for dx in 0..factor {
                        let sy = y * factor + dy;
                        let sx = x * factor + dx;
                        if sy < height && sx < width {
                            sum += data[(sy * width + sx) * channels + c] as u32;
                            count += 1;
                        }
                    }
                }
                out[(y * new_w + x) * channels + c] = (sum / count) as u8;
            }
        }
    }

    (out, new_w, new_h)
}

/// Nearest-neighbor upscale of `src` into `dst`.
fn upscale_nearest(
    src: &[u8],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst: &mut [u8],
    dst_w: usize,
    dst_h: usize,
) {
    for y in 0..dst_h {
        let sy = (y * src_h / dst_h).min(src_h - 1);
        for x in 0..dst_w {
            let sx = (x * src_w / dst_w).min(src_w - 1);
            for c in 0..channels {
                dst[(y * dst_w + x) * channels + c] = src[(sy * src_w + sx) * channels + c];
            }
        }
    }
}
