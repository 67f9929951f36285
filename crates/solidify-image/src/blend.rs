use image::{Rgba, RgbaImage};

use crate::raster::Raster;

/// Alpha-blend `foreground` over `background` into an opaque layer.
///
/// Pixels where the foreground is fully transparent (or outside it) stay
/// transparent, so the result can still be cropped by the codec. Everywhere
/// else the output is opaque: `out = bg * (255 - a) + fg * a`, rounded as
/// `(x + (x >> 8)) >> 8` after adding `0x80`. The result has the
/// background's size.
pub fn composite_over<B: Raster + ?Sized, F: Raster + ?Sized>(
    background: &B,
    foreground: &F,
) -> RgbaImage {
    let (width, height) = background.size();
    let fg_rect = foreground.rect();

    RgbaImage::from_fn(width, height, |x, y| {
        if !fg_rect.contains(x, y) {
            return Rgba([0, 0, 0, 0]);
        }
        let Rgba([fr, fg, fb, fa]) = foreground.pixel(x, y);
        if fa == 0 {
            return Rgba([0, 0, 0, 0]);
        }

        let Rgba([br, bg, bb, _]) = background.pixel(x, y);
        let na = u32::from(255 - fa);
        let fa = u32::from(fa);
        let mix = |bc: u8, fc: u8| {
            let v = u32::from(bc) * na + u32::from(fc) * fa + 0x80;
            (((v >> 8) + v) >> 8) as u8
        };

        Rgba([mix(br, fr), mix(bg, fg), mix(bb, fb), 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PremultipliedImage;

    #[test]
    fn transparent_foreground_leaves_hole() {
        let bg = RgbaImage::from_pixel(2, 2, Rgba([10, 10, 10, 255]));
        let fg = RgbaImage::new(2, 2);
        let out = composite_over(&bg, &fg);
        assert!(out.as_raw().iter().all(|&b| b == 0));
    }

    #[test]
    fn opaque_foreground_wins() {
        let bg = RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 255]));
        let fg = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 50, 255]));
        let out = composite_over(&bg, &fg);
        assert_eq!(*out.get_pixel(0, 0), Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn half_alpha_mixes() {
        let bg = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let fg = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 128]));
        let out = composite_over(&bg, &fg);
        assert_eq!(*out.get_pixel(0, 0), Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn smaller_foreground_is_transparent_outside() {
        let bg = RgbaImage::from_pixel(2, 1, Rgba([1, 2, 3, 255]));
        let fg = RgbaImage::from_pixel(1, 1, Rgba([9, 9, 9, 255]));
        let out = composite_over(&bg, &fg);
        assert_eq!(out.dimensions(), (2, 1));
        assert_eq!(*out.get_pixel(0, 0), Rgba([9, 9, 9, 255]));
        assert_eq!(*out.get_pixel(1, 0), Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn premultiplied_foreground_is_unpremultiplied_first() {
        let bg = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let mut fg = PremultipliedImage::new(1, 1);
        fg.set(0, 0, [128, 128, 128, 128]);
        let out = composite_over(&bg, &fg);
        assert_eq!(*out.get_pixel(0, 0), Rgba([128, 128, 128, 255]));
    }
}
