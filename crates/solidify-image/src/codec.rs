use image::Rgba;
use solidify_types::{Field, FieldError};

use crate::raster::{Raster, Rect};

/// Size of the header preceding the pixel blob.
pub const HEADER_LEN: usize = 5;

/// A raster image that encodes as a [`Field`] for layer storages.
///
/// The blob follows raw BMP row and channel ordering, cropped to the frame
/// that contains non-transparent pixels:
///
/// ```text
/// | hasAlpha (1) | frame (4) | blob [(A)BGR (4 or 3 bytes) | ...] |
/// ```
///
/// The frame bytes are `minX`, `height - maxY`, `maxX`, `height - minY`
/// relative to the image bounds; the y offsets are measured from the bottom
/// because rows are stored bottom to top. The alpha channel is dropped when
/// every remaining pixel is opaque.
#[derive(Clone, Debug)]
pub struct Image<R> {
    raster: R,
    ignore_alpha_threshold: Option<u8>,
}

impl<R: Raster> Image<R> {
    pub fn new(raster: R) -> Self {
        Self {
            raster,
            ignore_alpha_threshold: None,
        }
    }

    /// Treat the image as opaque if its lowest alpha value is at least
    /// `threshold`, i.e. map all alpha values to 255 before encoding.
    pub fn ignore_spurious_alpha(&mut self, threshold: u8) {
        self.ignore_alpha_threshold = Some(threshold);
    }

    /// Builder form of [`Image::ignore_spurious_alpha`].
    pub fn with_ignore_alpha_threshold(mut self, threshold: u8) -> Self {
        self.ignore_spurious_alpha(threshold);
        self
    }

    pub fn ignore_alpha_threshold(&self) -> Option<u8> {
        self.ignore_alpha_threshold
    }

    pub fn raster(&self) -> &R {
        &self.raster
    }
}

impl<R: Raster> Field for Image<R> {
    fn encode(&self) -> Result<Vec<u8>, FieldError> {
        let (width, height) = self.raster.size();
        let frame = shrink_bounds(&self.raster);
        let mut pix = abgr_rows(&self.raster, frame);

        if let Some(threshold) = self.ignore_alpha_threshold {
            clean_spurious_alpha_above(&mut pix, threshold);
        }

        let has_alpha = remove_alpha_if_possible(&mut pix);

        let offset =
            |v: u32| u8::try_from(v).map_err(|_| FieldError::ImageTooLarge { width, height });

        let mut buf = Vec::with_capacity(HEADER_LEN + pix.len());
        buf.push(u8::from(has_alpha));
        buf.push(offset(frame.min_x)?);
        buf.push(offset(height - frame.max_y)?);
        buf.push(offset(frame.max_x)?);
        buf.push(offset(height - frame.min_y)?);
        buf.extend_from_slice(&pix);

        tracing::trace!(
            width = frame.width(),
            height = frame.height(),
            has_alpha,
            size = buf.len(),
            "encoded image"
        );
        Ok(buf)
    }
}

/// The smallest rectangle containing every pixel with non-zero alpha.
///
/// For a fully transparent image this is the inverted rectangle
/// `(width, height, 0, 0)`, which yields no rows and the frame bytes
/// `[w, h, 0, 0]`.
pub fn shrink_bounds<R: Raster + ?Sized>(raster: &R) -> Rect {
    let (w, h) = raster.size();
    let mut r = Rect::new(w, h, 0, 0);

    for y in 0..h {
        for x in 0..w {
            if raster.pixel(x, y)[3] > 0 {
                r.min_x = r.min_x.min(x);
                r.min_y = r.min_y.min(y);
                r.max_x = r.max_x.max(x + 1);
                r.max_y = r.max_y.max(y + 1);
            }
        }
    }

    r
}

/// Pixels within `frame`, rows bottom to top, channels as A, B, G, R.
fn abgr_rows<R: Raster + ?Sized>(raster: &R, frame: Rect) -> Vec<u8> {
    let mut pix = Vec::with_capacity(frame.width() as usize * frame.height() as usize * 4);
    for y in (frame.min_y..frame.max_y).rev() {
        for x in frame.min_x..frame.max_x {
            let Rgba([r, g, b, a]) = raster.pixel(x, y);
            pix.extend_from_slice(&[a, b, g, r]);
        }
    }
    pix
}

/// Set every alpha to 255 if the lowest alpha is at least `threshold`.
fn clean_spurious_alpha_above(abgr: &mut [u8], threshold: u8) {
    let min_alpha = abgr.iter().step_by(4).copied().min().unwrap_or(255);

    if min_alpha >= threshold {
        for a in abgr.iter_mut().step_by(4) {
            *a = 255;
        }
    }
}

/// Drop the alpha channel in place if all pixels are opaque. Returns whether
/// the alpha channel was kept.
fn remove_alpha_if_possible(abgr: &mut Vec<u8>) -> bool {
    if abgr.iter().step_by(4).any(|&a| a < 255) {
        return true;
    }

    let mut j = 0;
    for i in (0..abgr.len()).step_by(4) {
        abgr.copy_within(i + 1..i + 4, j);
        j += 3;
    }
    abgr.truncate(j);
    false
}
