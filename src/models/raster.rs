use anyhow::{Result, bail};

/// One RGBA8 sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// ITU-R 601 luma
    pub fn luma(&self) -> f64 {
        self.r as f64 * 0.299 + self.g as f64 * 0.587 + self.b as f64 * 0.114
    }
}

/// Axis-aligned sampling rectangle in image coordinates (x right, y down)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Rectangle spanning `[x0, x1) x [y0, y1)`; empty if the bounds are inverted
    pub fn from_bounds(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0),
            height: y1.saturating_sub(y0),
        }
    }

    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with a `width x height` image
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        Self::from_bounds(
            self.x.min(width),
            self.y.min(height),
            self.right().min(width),
            self.bottom().min(height),
        )
    }
}

/// A decoded raster the engine can sample. Decoding itself happens outside the crate.
pub trait RasterImage {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Sample at `(x, y)`; callers stay within `width() x height()`
    fn pixel(&self, x: u32, y: u32) -> Rgba;
}

/// Owned, row-major RGBA8 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaBuffer {
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            data.extend_from_slice(&[color.r, color.g, color.b, color.a]);
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap raw RGBA8 bytes (as produced by any decoder)
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            bail!(
                "RGBA buffer for {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            );
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Out-of-bounds writes are ignored
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.offset(x, y);
        self.data[idx..idx + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        let rect = rect.clamp_to(self.width, self.height);
        for y in rect.y..rect.bottom() {
            for x in rect.x..rect.right() {
                self.put_pixel(x, y, color);
            }
        }
    }

    /// Copy of the area under `rect` (clamped to the image)
    pub fn crop<I: RasterImage + ?Sized>(image: &I, rect: PixelRect) -> Self {
        let rect = rect.clamp_to(image.width(), image.height());
        let mut out = Self::filled(rect.width, rect.height, Rgba::default());
        for y in 0..rect.height {
            for x in 0..rect.width {
                out.put_pixel(x, y, image.pixel(rect.x + x, rect.y + y));
            }
        }
        out
    }

    pub fn map_pixels(&mut self, f: impl Fn(Rgba) -> Rgba) {
        for chunk in self.data.chunks_exact_mut(4) {
            let px = f(Rgba::new(chunk[0], chunk[1], chunk[2], chunk[3]));
            chunk.copy_from_slice(&[px.r, px.g, px.b, px.a]);
        }
    }
}

impl RasterImage for RgbaBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Rgba {
        let idx = self.offset(x, y);
        Rgba::new(
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }
}
