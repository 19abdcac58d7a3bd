use crate::*;

/// Width of the image strip copied behind the leading edge each step.
pub const WIPE_STRIP_WIDTH: u32 = 16;

/// Width of the white leading edge, which is also the per-step advance.
pub const WIPE_EDGE_WIDTH: u32 = 8;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WipeProgress {
    Running,
    Finished,
}

/// Left-to-right reveal of the hidden image with a white leading edge,
/// advanced one step per display refresh.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RevealWipe {
    column: u32,
}

impl RevealWipe {
    pub const fn new() -> Self {
        Self { column: 0 }
    }

    pub const fn column(&self) -> u32 {
        self.column
    }

    pub fn step<S: Surface + ?Sized>(
        &mut self,
        hidden: &PixelBuffer,
        surface: &mut S,
    ) -> Result<WipeProgress> {
        let (width, height) = surface.size();
        if self.column > width {
            return Ok(WipeProgress::Finished);
        }

        if self.column > 0 {
            let start = self.column.saturating_sub(WIPE_STRIP_WIDTH);
            let strip = PixelRect::new(start, 0, self.column - start, height);
            surface.put_pixels(&hidden.crop(strip), start, 0)?;
        }
        surface.fill_rect(
            PixelRect::new(self.column, 0, WIPE_EDGE_WIDTH, height),
            Rgb::WHITE,
        )?;
        self.column += WIPE_EDGE_WIDTH;

        Ok(if self.column > width {
            WipeProgress::Finished
        } else {
            WipeProgress::Running
        })
    }
}
