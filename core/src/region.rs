use serde::{Deserialize, Serialize};

use crate::*;

/// Width of the hover highlight border in pixels.
pub const HIGHLIGHT_WIDTH: u32 = 4;

/// Grid footprint of a region: inclusive ranges on both axes.
///
/// This is the only part of a region that gets persisted.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionSpan {
    x: CoordRange,
    y: CoordRange,
}

impl RegionSpan {
    pub const FULL_GRID: Self = Self::new_unchecked((1, GRID_SIZE), (1, GRID_SIZE));

    pub const fn new_unchecked(x: CoordRange, y: CoordRange) -> Self {
        Self { x, y }
    }

    pub fn new(x: CoordRange, y: CoordRange) -> Result<Self> {
        let valid = |(lo, hi): CoordRange| 1 <= lo && lo <= hi && hi <= GRID_SIZE;
        if valid(x) && valid(y) {
            Ok(Self::new_unchecked(x, y))
        } else {
            Err(GameError::InvalidRegion)
        }
    }

    /// The four 8x8 quadrants a puzzle starts with.
    pub const fn seed_quadrants() -> [Self; 4] {
        [
            Self::new_unchecked((1, 8), (1, 8)),
            Self::new_unchecked((1, 8), (9, 16)),
            Self::new_unchecked((9, 16), (9, 16)),
            Self::new_unchecked((9, 16), (1, 8)),
        ]
    }

    pub const fn x_range(&self) -> CoordRange {
        self.x
    }

    pub const fn y_range(&self) -> CoordRange {
        self.y
    }

    pub const fn width(&self) -> u8 {
        self.x.1 - self.x.0 + 1
    }

    pub const fn height(&self) -> u8 {
        self.y.1 - self.y.0 + 1
    }

    pub const fn cell_count(&self) -> u16 {
        self.width() as u16 * self.height() as u16
    }

    pub const fn is_atomic(&self) -> bool {
        self.x.0 == self.x.1 && self.y.0 == self.y.1
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        let within = |(lo, hi): CoordRange, pos: i32| i32::from(lo) <= pos && pos <= i32::from(hi);
        within(self.x, point.x) && within(self.y, point.y)
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        let intersects = |a: CoordRange, b: CoordRange| a.0 <= b.1 && b.0 <= a.1;
        intersects(self.x, other.x) && intersects(self.y, other.y)
    }

    /// Bounds on the drawing surface, one grid cell being [`CELL_PIXELS`]
    /// wide.
    pub const fn pixel_rect(&self) -> PixelRect {
        PixelRect::new(
            (self.x.0 as u32 - 1) * CELL_PIXELS,
            (self.y.0 as u32 - 1) * CELL_PIXELS,
            self.width() as u32 * CELL_PIXELS,
            self.height() as u32 * CELL_PIXELS,
        )
    }

    /// A span subdivision can produce: square, power-of-two sized and
    /// aligned to its own size.
    pub fn is_well_formed(&self) -> bool {
        if Self::new(self.x, self.y).is_err() {
            return false;
        }
        let size = self.width();
        size == self.height()
            && size.is_power_of_two()
            && (self.x.0 - 1) % size == 0
            && (self.y.0 - 1) % size == 0
    }

    /// Splits into four mutually exclusive quadrants around the midpoint
    /// `lo + (hi - lo) / 2`, or `None` for an atomic span.
    ///
    /// Quadrant order: top-left, bottom-left, bottom-right, top-right.
    pub fn split(self) -> Option<[Self; 4]> {
        if self.is_atomic() {
            return None;
        }

        let (x_lo, x_hi) = self.x;
        let (y_lo, y_hi) = self.y;
        let x_mid = x_lo + (x_hi - x_lo) / 2;
        let y_mid = y_lo + (y_hi - y_lo) / 2;

        Some([
            Self::new_unchecked((x_lo, x_mid), (y_lo, y_mid)),
            Self::new_unchecked((x_lo, x_mid), (y_mid + 1, y_hi)),
            Self::new_unchecked((x_mid + 1, x_hi), (y_mid + 1, y_hi)),
            Self::new_unchecked((x_mid + 1, x_hi), (y_lo, y_mid)),
        ])
    }
}

/// A live, clickable tile covering part of the hidden image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Region {
    span: RegionSpan,
    rect: PixelRect,
    fill_color: Rgb,
    is_selected: bool,
}

impl Region {
    /// Samples the fill color from `hidden` once; it never changes after.
    pub fn new(span: RegionSpan, hidden: &PixelBuffer) -> Self {
        let rect = span.pixel_rect();
        Self {
            span,
            rect,
            fill_color: hidden.rms_color(rect),
            is_selected: false,
        }
    }

    pub fn span(&self) -> RegionSpan {
        self.span
    }

    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    pub fn fill_color(&self) -> Rgb {
        self.fill_color
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    pub fn is_atomic(&self) -> bool {
        self.span.is_atomic()
    }

    pub fn contains(&self, point: GridPoint) -> bool {
        self.span.contains(point)
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.is_selected = selected;
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        surface.fill_rect(self.rect, self.fill_color)
    }

    /// Paints a border along the inside edge in the fill's contrast color.
    pub fn draw_highlight<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        let PixelRect {
            x,
            y,
            width,
            height,
        } = self.rect;
        let w = HIGHLIGHT_WIDTH;
        let color = self.fill_color.contrast();

        surface.fill_rect(PixelRect::new(x, y, width - w, w), color)?;
        surface.fill_rect(PixelRect::new(x, y, w, height - w), color)?;
        surface.fill_rect(PixelRect::new(x, y + height - w, width, w), color)?;
        surface.fill_rect(PixelRect::new(x + width - w, y, w, height), color)
    }
}
