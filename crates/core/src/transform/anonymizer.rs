use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;
use crate::shared::settings::{AnonymizationSettings, Method};
use crate::transform::gaussian::{gaussian_kernel_1d, kernel_size_for, separable_gaussian_blur};
use crate::transform::pixelate::{cell_size_for, pixelate};

/// ROI rectangle inside a frame, in frame pixel coordinates.
#[derive(Clone, Copy, Debug)]
pub struct RoiRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl From<FaceRegion> for RoiRect {
    /// Assumes the region has already been clipped to frame bounds.
    fn from(r: FaceRegion) -> Self {
        RoiRect {
            x: r.x as usize,
            y: r.y as usize,
            w: r.width as usize,
            h: r.height as usize,
        }
    }
}

/// Overwrites each detected region with the configured transform.
///
/// Pure with respect to the input: returns a new frame together with the
/// number of regions actually rendered. Regions are clipped to frame bounds
/// first; regions that clip to zero area are skipped and excluded from the
/// count. Overlapping regions are each transformed in full, so the anonymized
/// area is the union of the boxes.
pub fn anonymize(
    frame: &Frame,
    regions: &[FaceRegion],
    settings: &AnonymizationSettings,
) -> (Frame, usize) {
    let mut out = frame.clone();
    let mut rendered = 0usize;

    for region in regions {
        let Some(clipped) = region.clip(frame.width(), frame.height()) else {
            continue;
        };
        apply_to_roi(&mut out, clipped.into(), settings);
        rendered += 1;
    }

    (out, rendered)
}

fn apply_to_roi(frame: &mut Frame, rect: RoiRect, settings: &AnonymizationSettings) {
    let channels = frame.channels() as usize;
    let frame_width = frame.width() as usize;

    let mut roi = extract_roi(frame.data(), frame_width, channels, rect);
    match settings.method {
        Method::Gaussian => {
            let kernel_size = kernel_size_for(settings.intensity(), rect.w, rect.h);
            let kernel = gaussian_kernel_1d(kernel_size);
            separable_gaussian_blur(&mut roi, rect.w, rect.h, channels, &kernel);
        }
        Method::Pixelate => {
            pixelate(&mut roi, rect.w, rect.h, channels, cell_size_for(settings.intensity()));
        }
    }
    write_roi_back(frame.data_mut(), &roi, frame_width, channels, rect);
}

fn extract_roi(data: &[u8], frame_width: usize, channels: usize, rect: RoiRect) -> Vec<u8> {
    let mut roi = vec![0u8; rect.w * rect.h * channels];
    for row in 0..rect.h {
        let src = ((rect.y + row) * frame_width + rect.x) * channels;
        let dst = row * rect.w * channels;
        roi[dst..dst + rect.w * channels].copy_from_slice(&data[src..src + rect.w * channels]);
    }
    roi
}

fn write_roi_back(data: &mut [u8], roi: &[u8], frame_width: usize, channels: usize, rect: RoiRect) {
    for row in 0..rect.h {
        let dst = ((rect.y + row) * frame_width + rect.x) * channels;
        let src = row * rect.w * channels;
        data[dst..dst + rect.w * channels].copy_from_slice(&roi[src..src + rect.w * channels]);
    }
}
