use unveil_core::{GameError, PixelBuffer, PixelRect, Result, Rgb, Surface};
use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

fn surface_error(err: JsValue) -> GameError {
    GameError::Surface(format!("{:?}", err))
}

/// [`Surface`] backed by a 2D canvas context. The canvas keeps its intrinsic
/// size regardless of how large it is displayed.
#[derive(Clone, Debug)]
pub(crate) struct CanvasSurface {
    context: CanvasRenderingContext2d,
    width: u32,
    height: u32,
}

impl CanvasSurface {
    pub(crate) fn new(canvas: &HtmlCanvasElement) -> anyhow::Result<Self> {
        let context = canvas
            .get_context("2d")
            .map_err(|err| anyhow::anyhow!("canvas context: {:?}", err))?
            .ok_or_else(|| anyhow::anyhow!("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| anyhow::anyhow!("2d context has an unexpected type"))?;
        Ok(Self {
            context,
            width: canvas.width(),
            height: canvas.height(),
        })
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgb) -> Result<()> {
        self.context.set_fill_style_str(&color.to_string());
        self.context.fill_rect(
            rect.x.into(),
            rect.y.into(),
            rect.width.into(),
            rect.height.into(),
        );
        Ok(())
    }

    fn put_pixels(&mut self, pixels: &PixelBuffer, x: u32, y: u32) -> Result<()> {
        let (width, height) = pixels.size();
        if width == 0 || height == 0 {
            return Ok(());
        }
        let rgba = pixels.to_rgba();
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(&rgba), width, height)
            .map_err(surface_error)?;
        self.context
            .put_image_data(&data, x.into(), y.into())
            .map_err(surface_error)
    }

    fn read_pixels(&self, rect: PixelRect) -> Result<PixelBuffer> {
        let Some(rect) = rect.clip(self.width, self.height) else {
            return Ok(PixelBuffer::new(0, 0));
        };
        let data = self
            .context
            .get_image_data(
                rect.x.into(),
                rect.y.into(),
                rect.width.into(),
                rect.height.into(),
            )
            .map_err(surface_error)?;
        PixelBuffer::from_rgba(data.width(), data.height(), &data.data().0)
    }
}
