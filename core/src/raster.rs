use std::io::Cursor;

use ndarray::{Array2, ArrayView2, s};

use crate::*;

/// Drawing port for the visible puzzle surface.
///
/// Implementations clip every operation to their own bounds, so callers may
/// pass rectangles that extend past the edge.
pub trait Surface {
    /// `(width, height)` in pixels.
    fn size(&self) -> (u32, u32);

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) -> Result<()>;

    /// Copies `pixels` verbatim with its top-left corner at `(x, y)`.
    fn put_pixels(&mut self, pixels: &PixelBuffer, x: u32, y: u32) -> Result<()>;

    fn read_pixels(&self, rect: PixelRect) -> Result<PixelBuffer>;
}

/// Owned RGB raster indexed as `[x, y]`.
///
/// Serves as the hidden buffer holding the puzzle image, and as an in-memory
/// [`Surface`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    pixels: Array2<Rgb>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgb::BLACK)
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        Self {
            pixels: Array2::from_elem((width as usize, height as usize), color),
        }
    }

    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> Rgb) -> Self {
        Self {
            pixels: Array2::from_shape_fn((width as usize, height as usize), |(x, y)| {
                f(x as u32, y as u32)
            }),
        }
    }

    /// Builds a buffer from row-major RGBA bytes, dropping alpha.
    pub fn from_rgba(width: u32, height: u32, data: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(GameError::Surface(format!(
                "expected {} RGBA bytes, got {}",
                expected,
                data.len()
            )));
        }
        Ok(Self::from_fn(width, height, |x, y| {
            let i = (y as usize * width as usize + x as usize) * 4;
            Rgb::new(data[i], data[i + 1], data[i + 2])
        }))
    }

    /// Decodes an encoded image (JPEG or PNG) at its natural size.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|err| GameError::ImageDecode(err.to_string()))?
            .to_rgb8();
        let (width, height) = decoded.dimensions();
        Ok(Self::from_fn(width, height, |x, y| {
            let [r, g, b] = decoded.get_pixel(x, y).0;
            Rgb::new(r, g, b)
        }))
    }

    /// Decodes the day's image into a square hidden buffer, drawn unscaled
    /// at the origin. Uncovered pixels stay black.
    pub fn decode_puzzle(bytes: &[u8]) -> Result<Self> {
        let decoded = Self::decode(bytes)?;
        if decoded.size() != (SURFACE_SIZE, SURFACE_SIZE) {
            log::warn!(
                "puzzle image is {:?}, expected {}x{}",
                decoded.size(),
                SURFACE_SIZE,
                SURFACE_SIZE
            );
        }
        let mut hidden = Self::new(SURFACE_SIZE, SURFACE_SIZE);
        hidden.blit(&decoded, 0, 0);
        Ok(hidden)
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let encoded = image::RgbImage::from_fn(self.width(), self.height(), |x, y| {
            let Rgb { r, g, b } = self.pixel(x, y);
            image::Rgb([r, g, b])
        });
        let mut bytes = Vec::new();
        encoded
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .map_err(|err| GameError::SnapshotEncode(err.to_string()))?;
        Ok(bytes)
    }

    /// Row-major RGBA bytes with opaque alpha.
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for y in 0..self.height() {
            for x in 0..self.width() {
                let Rgb { r, g, b } = self.pixel(x, y);
                data.extend_from_slice(&[r, g, b, u8::MAX]);
            }
        }
        data
    }

    pub fn width(&self) -> u32 {
        self.pixels.dim().0 as u32
    }

    pub fn height(&self) -> u32 {
        self.pixels.dim().1 as u32
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[[x as usize, y as usize]]
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        self.pixels[[x as usize, y as usize]] = color;
    }

    /// Root-mean-square of each channel over `rect`, rounded to the nearest
    /// integer. Brighter pixels weigh more than under an arithmetic mean.
    pub fn rms_color(&self, rect: PixelRect) -> Rgb {
        let Some(rect) = rect.clip(self.width(), self.height()) else {
            return Rgb::BLACK;
        };

        let (mut r, mut g, mut b) = (0u64, 0u64, 0u64);
        for px in self.view(rect).iter() {
            r += u64::from(px.r).pow(2);
            g += u64::from(px.g).pow(2);
            b += u64::from(px.b).pow(2);
        }

        let count = rect.area() as f64;
        let average = |sum: u64| (sum as f64 / count).sqrt().round() as u8;
        Rgb::new(average(r), average(g), average(b))
    }

    /// Copy of the pixels under `rect`, clipped to this buffer.
    pub fn crop(&self, rect: PixelRect) -> Self {
        match rect.clip(self.width(), self.height()) {
            Some(rect) => Self {
                pixels: self.view(rect).to_owned(),
            },
            None => Self::new(0, 0),
        }
    }

    pub fn fill(&mut self, rect: PixelRect, color: Rgb) {
        if let Some(rect) = rect.clip(self.width(), self.height()) {
            let (x0, y0, x1, y1) = bounds(rect);
            self.pixels.slice_mut(s![x0..x1, y0..y1]).fill(color);
        }
    }

    pub fn blit(&mut self, src: &Self, x: u32, y: u32) {
        let target = PixelRect::new(x, y, src.width(), src.height());
        if let Some(rect) = target.clip(self.width(), self.height()) {
            let (x0, y0, x1, y1) = bounds(rect);
            let (w, h) = (rect.width as usize, rect.height as usize);
            self.pixels
                .slice_mut(s![x0..x1, y0..y1])
                .assign(&src.pixels.slice(s![0..w, 0..h]));
        }
    }

    fn view(&self, rect: PixelRect) -> ArrayView2<'_, Rgb> {
        let (x0, y0, x1, y1) = bounds(rect);
        self.pixels.slice(s![x0..x1, y0..y1])
    }
}

fn bounds(rect: PixelRect) -> (usize, usize, usize, usize) {
    (
        rect.x as usize,
        rect.y as usize,
        rect.right() as usize,
        rect.bottom() as usize,
    )
}

impl Surface for PixelBuffer {
    fn size(&self) -> (u32, u32) {
        PixelBuffer::size(self)
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) -> Result<()> {
        self.fill(rect, color);
        Ok(())
    }

    fn put_pixels(&mut self, pixels: &PixelBuffer, x: u32, y: u32) -> Result<()> {
        self.blit(pixels, x, y);
        Ok(())
    }

    fn read_pixels(&self, rect: PixelRect) -> Result<PixelBuffer> {
        Ok(self.crop(rect))
    }
}
