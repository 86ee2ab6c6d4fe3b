use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::foundation::error::{AvatarError, AvatarResult};

/// Premultiplied RGBA8 pixels of a fixed size.
///
/// A surface can be released early with [`Surface::dispose`]; pixel access on a
/// released surface is an error, and disposing twice is a no-op.
#[derive(Clone, Debug, PartialEq)]
pub struct Surface {
    canvas: Canvas,
    data: Option<Vec<u8>>,
}

impl Surface {
    /// A surface filled with `clear`.
    pub fn new(canvas: Canvas, clear: Rgba8Premul) -> Self {
        let px = clear.to_array();
        let mut data = Vec::with_capacity(canvas.pixel_count() * 4);
        for _ in 0..canvas.pixel_count() {
            data.extend_from_slice(&px);
        }
        Self {
            canvas,
            data: Some(data),
        }
    }

    /// A fully transparent surface.
    pub fn transparent(canvas: Canvas) -> Self {
        Self::new(canvas, Rgba8Premul::transparent())
    }

    /// Wraps row-major premultiplied pixels; the length must match `canvas`.
    pub fn from_premul_rgba8(canvas: Canvas, data: Vec<u8>) -> AvatarResult<Self> {
        if data.len() != canvas.pixel_count() * 4 {
            return Err(AvatarError::render(format!(
                "surface data has {} bytes, expected {} for {}x{}",
                data.len(),
                canvas.pixel_count() * 4,
                canvas.width,
                canvas.height
            )));
        }
        Ok(Self {
            canvas,
            data: Some(data),
        })
    }

    /// Size in pixels.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// `true` after [`Surface::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.data.is_none()
    }

    /// Releases the pixel buffer.
    pub fn dispose(&mut self) {
        if self.data.take().is_some() {
            tracing::debug!(
                width = self.canvas.width,
                height = self.canvas.height,
                "surface released"
            );
        }
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn data(&self) -> AvatarResult<&[u8]> {
        self.data
            .as_deref()
            .ok_or_else(|| AvatarError::render("surface has been disposed"))
    }

    /// Mutable access to the pixel bytes.
    pub fn data_mut(&mut self) -> AvatarResult<&mut [u8]> {
        self.data
            .as_deref_mut()
            .ok_or_else(|| AvatarError::render("surface has been disposed"))
    }

    /// Premultiplied pixel at `(x, y)`; `None` outside the surface or once disposed.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let data = self.data.as_deref()?;
        let i = ((y as usize) * (self.canvas.width as usize) + (x as usize)) * 4;
        Some([data[i], data[i + 1], data[i + 2], data[i + 3]])
    }

    /// Straight-alpha copy of the pixels, as image files expect.
    pub fn to_straight_rgba8(&self) -> AvatarResult<Vec<u8>> {
        let data = self.data()?;
        let mut out = Vec::with_capacity(data.len());
        for px in data.chunks_exact(4) {
            out.extend_from_slice(&unpremultiply(px[0], px[1], px[2], px[3]));
        }
        Ok(out)
    }

    /// Encodes the surface as an RGBA PNG.
    pub fn to_png_bytes(&self) -> AvatarResult<Vec<u8>> {
        let rgba = self.to_straight_rgba8()?;
        let img = image::RgbaImage::from_raw(self.canvas.width, self.canvas.height, rgba)
            .ok_or_else(|| AvatarError::render("surface buffer does not match its size"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    /// Writes a PNG to `path`, creating parent directories.
    pub fn write_png(&self, path: &Path) -> AvatarResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        let rgba = self.to_straight_rgba8()?;
        image::save_buffer_with_format(
            path,
            &rgba,
            self.canvas.width,
            self.canvas.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }

    /// PNG bytes encoded as standard base64, ready for a `data:image/png;base64,` URL.
    pub fn to_base64_png(&self) -> AvatarResult<String> {
        Ok(BASE64.encode(self.to_png_bytes()?))
    }
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let a16 = u16::from(a);
    let un = |c: u8| -> u8 { ((u16::from(c) * 255 + a16 / 2) / a16).min(255) as u8 };
    [un(r), un(g), un(b), a]
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
