use image::{GenericImageView, Rgba, RgbaImage};

use crate::error::{ImageError, ImageResult};

/// Pixel rectangle with the origin at the image's top-left corner; `min` is
/// inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl Rect {
    pub const fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// A `width` x `height` rectangle at the origin.
    pub const fn with_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    pub fn is_empty(&self) -> bool {
        self.min_x >= self.max_x || self.min_y >= self.max_y
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }
}

/// A decoded image as seen by the layer codec.
///
/// Any `image` view with 8-bit straight-alpha RGBA pixels (`RgbaImage`,
/// `DynamicImage`, sub-image views) is a raster as is. Buffers holding
/// premultiplied colors go through [`PremultipliedImage`].
pub trait Raster {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// The straight-alpha pixel at `(x, y)`, which lies within
    /// [`Raster::size`].
    fn pixel(&self, x: u32, y: u32) -> Rgba<u8>;

    fn rect(&self) -> Rect {
        let (w, h) = self.size();
        Rect::with_size(w, h)
    }
}

impl<I> Raster for I
where
    I: GenericImageView<Pixel = Rgba<u8>>,
{
    fn size(&self) -> (u32, u32) {
        self.dimensions()
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        self.get_pixel(x, y)
    }
}

/// Undo alpha premultiplication of an 8-bit premultiplied color.
///
/// Works in 16-bit space (`c * 0x101`), dividing by alpha and truncating
/// back to 8 bits, so results match Go's `color.NRGBAModel` bit for bit.
pub fn unpremultiply(Rgba([r, g, b, a]): Rgba<u8>) -> Rgba<u8> {
    match a {
        0 => Rgba([0, 0, 0, 0]),
        255 => Rgba([r, g, b, 255]),
        _ => {
            let a16 = u32::from(a) * 0x101;
            let channel = |c: u8| ((u32::from(c) * 0x101 * 0xffff / a16) >> 8) as u8;
            Rgba([channel(r), channel(g), channel(b), a])
        }
    }
}

/// An RGBA8 buffer whose colors are premultiplied by alpha, as produced by
/// compositing pipelines. Pixels are read back with straight alpha.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PremultipliedImage(RgbaImage);

impl PremultipliedImage {
    /// A fully transparent image.
    pub fn new(width: u32, height: u32) -> Self {
        Self(RgbaImage::new(width, height))
    }

    /// Wrap row-major premultiplied RGBA bytes.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> ImageResult<Self> {
        let expected = width as usize * height as usize * 4;
        let actual = data.len();
        RgbaImage::from_raw(width, height, data)
            .filter(|_| actual == expected)
            .map(Self)
            .ok_or(ImageError::InvalidBuffer { expected, actual })
    }

    /// Set the premultiplied color at `(x, y)`. Points outside the image are
    /// ignored.
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x < self.0.width() && y < self.0.height() {
            self.0.put_pixel(x, y, Rgba(rgba));
        }
    }

    /// The stored premultiplied color at `(x, y)`.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.0.get_pixel_checked(x, y).map(|p| p.0)
    }

    pub fn as_raw(&self) -> &[u8] {
        self.0.as_raw()
    }

    pub fn into_inner(self) -> RgbaImage {
        self.0
    }
}

impl From<RgbaImage> for PremultipliedImage {
    fn from(buf: RgbaImage) -> Self {
        Self(buf)
    }
}

impl Raster for PremultipliedImage {
    fn size(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        unpremultiply(*self.0.get_pixel(x, y))
    }
}
