use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::*;

/// Encoded picture of the visible surface: base64 text of a PNG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn capture<S: Surface + ?Sized>(surface: &S) -> Result<Self> {
        let (width, height) = surface.size();
        let pixels = surface.read_pixels(PixelRect::new(0, 0, width, height))?;
        Self::encode(&pixels)
    }

    pub fn encode(pixels: &PixelBuffer) -> Result<Self> {
        Ok(Self(STANDARD.encode(pixels.encode_png()?)))
    }

    pub fn decode(&self) -> Result<PixelBuffer> {
        let bytes = STANDARD
            .decode(&self.0)
            .map_err(|err| GameError::ImageDecode(err.to_string()))?;
        PixelBuffer::decode(&bytes)
    }

    /// Paints the snapshot over the surface from its top-left corner.
    pub fn restore<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<()> {
        surface.put_pixels(&self.decode()?, 0, 0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
