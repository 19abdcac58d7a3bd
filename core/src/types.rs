use core::fmt;
use serde::{Deserialize, Serialize};

/// Single logical grid coordinate, 1-based.
pub type Coord = u8;

/// Inclusive coordinate range `(lo, hi)` along one grid axis.
pub type CoordRange = (Coord, Coord);

/// Number of logical cells along each side of the grid.
pub const GRID_SIZE: Coord = 16;

/// Width and height of one atomic grid cell in pixels.
pub const CELL_PIXELS: u32 = 64;

/// Side length of the square drawing surface and hidden buffer.
pub const SURFACE_SIZE: u32 = GRID_SIZE as u32 * CELL_PIXELS;

/// 24-bit color.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A fill counts as bright when every channel is above 200.
    pub const fn is_bright(self) -> bool {
        self.r > 200 && self.g > 200 && self.b > 200
    }

    /// Border color that stays visible on top of this fill.
    pub const fn contrast(self) -> Self {
        if self.is_bright() {
            Self::BLACK
        } else {
            Self::WHITE
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub const fn square(size: u32) -> Self {
        Self::new(0, 0, size, size)
    }

    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Intersection with a `width` x `height` area anchored at the origin.
    pub fn clip(&self, width: u32, height: u32) -> Option<Self> {
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        if self.x >= right || self.y >= bottom {
            return None;
        }
        Some(Self::new(self.x, self.y, right - self.x, bottom - self.y))
    }
}

/// Pointer position mapped onto the logical grid. May lie outside of it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    /// A point that no region contains.
    pub const OUTSIDE: Self = Self::new(0, 0);

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Maps a position relative to the surface's top-left corner, given the
    /// surface's displayed width, to 1-based grid coordinates.
    pub fn from_surface(local_x: f64, local_y: f64, surface_width: f64) -> Self {
        let cell_width = surface_width / f64::from(GRID_SIZE);
        if !(cell_width > 0.0) || !local_x.is_finite() || !local_y.is_finite() {
            return Self::OUTSIDE;
        }
        let to_grid = |pos: f64| (pos / cell_width).floor() as i32 + 1;
        Self::new(to_grid(local_x), to_grid(local_y))
    }

    pub fn is_inside_grid(&self) -> bool {
        let range = 1..=i32::from(GRID_SIZE);
        range.contains(&self.x) && range.contains(&self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_position_maps_to_one_based_cells() {
        assert_eq!(GridPoint::from_surface(0.0, 0.0, 512.0), GridPoint::new(1, 1));
        assert_eq!(GridPoint::from_surface(31.9, 32.0, 512.0), GridPoint::new(1, 2));
        assert_eq!(
            GridPoint::from_surface(511.0, 1023.0, 1024.0),
            GridPoint::new(8, 16)
        );
    }

    #[test]
    fn positions_off_the_surface_fall_outside_the_grid() {
        assert!(!GridPoint::from_surface(-1.0, 10.0, 1024.0).is_inside_grid());
        assert!(!GridPoint::from_surface(1024.0, 10.0, 1024.0).is_inside_grid());
        assert_eq!(GridPoint::from_surface(10.0, 10.0, 0.0), GridPoint::OUTSIDE);
    }

    #[test]
    fn contrast_uses_strict_brightness_threshold() {
        assert_eq!(Rgb::new(201, 201, 201).contrast(), Rgb::BLACK);
        assert_eq!(Rgb::new(255, 255, 200).contrast(), Rgb::WHITE);
        assert_eq!(Rgb::new(12, 250, 250).contrast(), Rgb::WHITE);
    }

    #[test]
    fn color_formats_as_css_hex() {
        assert_eq!(Rgb::new(0x0a, 0xff, 0x3c).to_string(), "#0aff3c");
    }

    #[test]
    fn clip_trims_to_bounds_and_drops_disjoint_rects() {
        let rect = PixelRect::new(1016, 0, 16, 1024);
        assert_eq!(rect.clip(1024, 1024), Some(PixelRect::new(1016, 0, 8, 1024)));
        assert_eq!(PixelRect::new(1024, 0, 8, 1024).clip(1024, 1024), None);
    }
}
