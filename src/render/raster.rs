use crate::avatar::resolve::Primitive;
use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rgb, Rgba8Premul};
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::render::surface::Surface;
use crate::scene::graph::SceneNode;

/// Flattening tolerance for curved primitives, in avatar units.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// CPU rasterizer for the 2D avatar scene.
///
/// Every call draws a complete frame: the surface is cleared, then each primitive is
/// filled and stroked in document order.
#[derive(Clone, Debug)]
pub struct Rasterizer {
    canvas: Canvas,
    width: u16,
    height: u16,
    clear_rgba: Option<[u8; 4]>,
}

impl Rasterizer {
    /// `clear_rgba` is straight-alpha; `None` leaves the background transparent.
    pub fn new(canvas: Canvas, clear_rgba: Option<[u8; 4]>) -> AvatarResult<Self> {
        let width: u16 = canvas
            .width
            .try_into()
            .map_err(|_| AvatarError::render("surface width exceeds u16"))?;
        let height: u16 = canvas
            .height
            .try_into()
            .map_err(|_| AvatarError::render("surface height exceeds u16"))?;
        Ok(Self {
            canvas,
            width,
            height,
            clear_rgba,
        })
    }

    /// Size of every surface this rasterizer draws.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Draws `root` and its descendants in pre-order.
    #[tracing::instrument(level = "trace", skip(self, root), fields(w = self.width, h = self.height))]
    pub fn draw(&self, root: &SceneNode) -> AvatarResult<Surface> {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        if let Some([r, g, b, a]) = self.clear_rgba.filter(|c| c[3] > 0) {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(self.width),
                f64::from(self.height),
            ));
        }

        for d in root.drawables() {
            draw_primitive(&mut ctx, d.transform, d.primitive, DEFAULT_TOLERANCE);
        }

        let mut pixmap = vello_cpu::Pixmap::new(self.width, self.height);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        Surface::from_premul_rgba8(self.canvas, pixmap.data_as_u8_slice().to_vec())
    }
}

/// Something that turns a scene graph into pixels.
pub trait FrameRenderer {
    /// Draws one complete frame of `root`.
    fn render(&mut self, root: &SceneNode) -> AvatarResult<Surface>;

    /// Size of the surfaces [`FrameRenderer::render`] returns.
    fn canvas(&self) -> Canvas;
}

impl FrameRenderer for Rasterizer {
    fn render(&mut self, root: &SceneNode) -> AvatarResult<Surface> {
        self.draw(root)
    }

    fn canvas(&self) -> Canvas {
        self.canvas
    }
}

/// Draws `root` onto a fresh transparent surface of `canvas` size.
pub fn rasterize(root: &SceneNode, canvas: Canvas) -> AvatarResult<Surface> {
    Rasterizer::new(canvas, None)?.draw(root)
}

/// Straight-alpha clear color as a premultiplied pixel.
pub fn clear_pixel(clear_rgba: Option<[u8; 4]>) -> Rgba8Premul {
    clear_rgba
        .map(|[r, g, b, a]| Rgba8Premul::from_straight_rgba(r, g, b, a))
        .unwrap_or_else(Rgba8Premul::transparent)
}

fn draw_primitive(
    ctx: &mut vello_cpu::RenderContext,
    transform: Affine,
    primitive: &Primitive,
    tolerance: f64,
) {
    let path = bezpath_to_cpu(&primitive.shape.to_path(tolerance));
    ctx.set_transform(affine_to_cpu(transform));

    if let Some(fill) = primitive.paint.fill.filter(|_| primitive.shape.is_closed()) {
        ctx.set_paint(color_to_cpu(fill));
        ctx.fill_path(&path);
    }
    if let Some(stroke) = primitive.paint.stroke {
        ctx.set_paint(color_to_cpu(stroke.color));
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke.width));
        ctx.stroke_path(&path);
    }
}

fn color_to_cpu(c: Rgb) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, 255)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
