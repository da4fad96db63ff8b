//! Shape nodes
//!
//! A [`ShapeNode`] owns a path, its fill and stroke, and the backend handle
//! the renderer handed out for it. Every mutation raises the matching
//! [`DirtyFlags`] bit; [`ShapeNode::update`] forwards the accumulated bits
//! to the renderer and clears them once the renderer accepts.

use smallvec::SmallVec;
use strata_paint::{
    Color, Command, Fill, PathData, Point, Rect, StrokeCap, StrokeJoin, StrokeStyle,
};

use crate::error::{Result, SceneError};
use crate::flags::DirtyFlags;
use crate::render::{RenderHandle, Renderer};
use crate::transform::Matrix;

/// Control point distance for a quarter circle made of one cubic
pub const PATH_KAPPA: f32 = 0.552_284;

/// A filled and/or stroked vector path
#[derive(Debug, Default)]
pub struct ShapeNode {
    path: PathData,
    fill: Option<Fill>,
    stroke: Option<StrokeStyle>,
    color: Color,
    flags: DirtyFlags,
    handle: Option<RenderHandle>,
}

impl ShapeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> &PathData {
        &self.path
    }

    pub fn fill(&self) -> Option<&Fill> {
        self.fill.as_ref()
    }

    pub fn stroke(&self) -> Option<&StrokeStyle> {
        self.stroke.as_ref()
    }

    pub fn fill_color(&self) -> Color {
        self.color
    }

    /// Changes not yet consumed by an update
    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    pub fn handle(&self) -> Option<RenderHandle> {
        self.handle
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> Result<()> {
        self.path.move_to(x, y)?;
        self.flags |= DirtyFlags::PATH;
        Ok(())
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> Result<()> {
        self.path.line_to(x, y)?;
        self.flags |= DirtyFlags::PATH;
        Ok(())
    }

    pub fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> Result<()> {
        self.path.cubic_to(c1x, c1y, c2x, c2y, x, y)?;
        self.flags |= DirtyFlags::PATH;
        Ok(())
    }

    pub fn close(&mut self) -> Result<()> {
        self.path.close()?;
        self.flags |= DirtyFlags::PATH;
        Ok(())
    }

    pub fn append(&mut self, commands: &[Command], points: &[Point]) -> Result<()> {
        self.path.append(commands, points)?;
        self.flags |= DirtyFlags::PATH;
        Ok(())
    }

    /// Append a closed rectangle. Corner radii are clamped to half the
    /// size; radii at half the size on both axes make an ellipse.
    pub fn append_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Result<()> {
        let rx = rx.clamp(0.0, w * 0.5);
        let ry = ry.clamp(0.0, h * 0.5);

        if rx == 0.0 && ry == 0.0 {
            return self.append(
                &[
                    Command::MoveTo,
                    Command::LineTo,
                    Command::LineTo,
                    Command::LineTo,
                    Command::Close,
                ],
                &[
                    Point::new(x, y),
                    Point::new(x + w, y),
                    Point::new(x + w, y + h),
                    Point::new(x, y + h),
                    Point::new(x, y),
                ],
            );
        }
        if rx == w * 0.5 && ry == h * 0.5 {
            return self.append_circle(x + rx, y + ry, rx, ry);
        }

        let hrx = rx * PATH_KAPPA;
        let hry = ry * PATH_KAPPA;
        let start = Point::new(x + rx, y);
        let mut points: SmallVec<[Point; 18]> = SmallVec::new();
        points.extend([
            start,
            Point::new(x + w - rx, y),
            Point::new(x + w - rx + hrx, y),
            Point::new(x + w, y + ry - hry),
            Point::new(x + w, y + ry),
            Point::new(x + w, y + h - ry),
            Point::new(x + w, y + h - ry + hry),
            Point::new(x + w - rx + hrx, y + h),
            Point::new(x + w - rx, y + h),
            Point::new(x + rx, y + h),
            Point::new(x + rx - hrx, y + h),
            Point::new(x, y + h - ry + hry),
            Point::new(x, y + h - ry),
            Point::new(x, y + ry),
            Point::new(x, y + ry - hry),
            Point::new(x + rx - hrx, y),
            start,
            start,
        ]);
        self.append(
            &[
                Command::MoveTo,
                Command::LineTo,
                Command::CubicTo,
                Command::LineTo,
                Command::CubicTo,
                Command::LineTo,
                Command::CubicTo,
                Command::LineTo,
                Command::CubicTo,
                Command::Close,
            ],
            &points,
        )
    }

    /// Append a closed ellipse built from four cubics
    pub fn append_circle(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> Result<()> {
        let kx = rx * PATH_KAPPA;
        let ky = ry * PATH_KAPPA;
        let start = Point::new(cx + rx, cy);
        self.append(
            &[
                Command::MoveTo,
                Command::CubicTo,
                Command::CubicTo,
                Command::CubicTo,
                Command::CubicTo,
                Command::Close,
            ],
            &[
                start,
                Point::new(cx + rx, cy + ky),
                Point::new(cx + kx, cy + ry),
                Point::new(cx, cy + ry),
                Point::new(cx - kx, cy + ry),
                Point::new(cx - rx, cy + ky),
                Point::new(cx - rx, cy),
                Point::new(cx - rx, cy - ky),
                Point::new(cx - kx, cy - ry),
                Point::new(cx, cy - ry),
                Point::new(cx + kx, cy - ry),
                Point::new(cx + rx, cy - ky),
                start,
                start,
            ],
        )
    }

    /// Solid fill. Drops any gradient fill.
    pub fn set_fill_color(&mut self, color: Color) {
        self.color = color;
        self.flags |= DirtyFlags::COLOR;
        if self.fill.take().is_some() {
            self.flags |= DirtyFlags::GRADIENT;
        }
    }

    pub fn set_fill(&mut self, fill: Fill) {
        self.fill = Some(fill);
        self.flags |= DirtyFlags::GRADIENT;
    }

    fn stroke_mut(&mut self) -> &mut StrokeStyle {
        self.flags |= DirtyFlags::STROKE;
        self.stroke.get_or_insert_with(StrokeStyle::new)
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_mut().width = width;
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        self.stroke_mut().color = color;
    }

    pub fn set_stroke_cap(&mut self, cap: StrokeCap) {
        self.stroke_mut().cap = cap;
    }

    pub fn set_stroke_join(&mut self, join: StrokeJoin) {
        self.stroke_mut().join = join;
    }

    pub fn set_stroke_dash(&mut self, pattern: &[f32]) -> Result<()> {
        match &mut self.stroke {
            Some(stroke) => stroke.set_dash(pattern)?,
            None => {
                let mut stroke = StrokeStyle::new();
                stroke.set_dash(pattern)?;
                self.stroke = Some(stroke);
            }
        }
        self.flags |= DirtyFlags::STROKE;
        Ok(())
    }

    /// Merge the last contour of `contour` into the stroke outline cache.
    /// The first call seeds the cache with the whole path.
    pub fn stencil(&mut self, contour: &PathData) -> Result<()> {
        match &mut self.stroke {
            Some(stroke) => stroke.stencil(contour)?,
            None => {
                let mut stroke = StrokeStyle::new();
                stroke.stencil(contour)?;
                self.stroke = Some(stroke);
            }
        }
        self.flags |= DirtyFlags::STROKE;
        Ok(())
    }

    /// Clear path (keeping its storage), fill and stroke
    pub fn reset(&mut self) {
        self.path.reset();
        self.fill = None;
        self.stroke = None;
        self.color = Color::TRANSPARENT;
        self.flags = DirtyFlags::ALL;
    }

    /// Independent deep copy without a backend handle
    pub fn duplicate(&self) -> Result<ShapeNode> {
        let mut flags = DirtyFlags::COLOR;
        if !self.path.is_empty() {
            flags |= DirtyFlags::PATH;
        }
        let stroke = match &self.stroke {
            Some(stroke) => {
                flags |= DirtyFlags::STROKE;
                Some(stroke.try_clone()?)
            }
            None => None,
        };
        let fill = match &self.fill {
            Some(fill) => {
                flags |= DirtyFlags::GRADIENT;
                Some(fill.duplicate()?)
            }
            None => None,
        };
        Ok(ShapeNode {
            path: self.path.try_clone()?,
            fill,
            stroke,
            color: self.color,
            flags,
            handle: None,
        })
    }

    pub fn bounds(&self) -> Result<Rect> {
        self.path
            .bounds()
            .ok_or(SceneError::InsufficientCondition("shape path has no points"))
    }

    /// Hand the pending changes to the renderer. Flags are only cleared
    /// when the renderer accepts.
    pub fn update(
        &mut self,
        renderer: &mut dyn Renderer,
        transform: Option<&Matrix>,
        flags: DirtyFlags,
    ) -> Result<RenderHandle> {
        let flags = flags | self.flags;
        let handle = renderer
            .prepare(self, self.handle, transform, flags)
            .ok_or(SceneError::Backend("prepare"))?;
        self.handle = Some(handle);
        self.flags = DirtyFlags::NONE;
        Ok(handle)
    }

    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        if renderer.render(self, self.handle) {
            Ok(())
        } else {
            Err(SceneError::Backend("render"))
        }
    }

    /// Release the backend handle. It is kept if the renderer refuses.
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let handle = self.handle.take();
        if renderer.dispose(self, handle) {
            Ok(())
        } else {
            self.handle = handle;
            Err(SceneError::Backend("dispose"))
        }
    }
}

impl Drop for ShapeNode {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            tracing::warn!(
                handle = handle.raw(),
                "Shape dropped without dispose, backend handle leaked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(shape: &mut ShapeNode) {
        shape.move_to(0.0, 0.0).unwrap();
        shape.line_to(10.0, 0.0).unwrap();
        shape.line_to(5.0, 8.0).unwrap();
        shape.close().unwrap();
    }

    #[test]
    fn test_path_edits_raise_path() {
        let mut shape = ShapeNode::new();
        assert_eq!(shape.flags(), DirtyFlags::NONE);
        triangle(&mut shape);
        assert_eq!(shape.flags(), DirtyFlags::PATH);
        assert_eq!(shape.path().commands().len(), 4);
    }

    #[test]
    fn test_fill_color_drops_gradient() {
        let mut shape = ShapeNode::new();
        shape.set_fill(Fill::linear_simple(
            Point::ZERO,
            Point::new(1.0, 0.0),
            Color::RED,
            Color::BLUE,
        ));
        assert_eq!(shape.flags(), DirtyFlags::GRADIENT);

        shape.set_fill_color(Color::GREEN);
        assert!(shape.fill().is_none());
        assert_eq!(shape.fill_color(), Color::GREEN);
        assert!(shape.flags().contains(DirtyFlags::COLOR | DirtyFlags::GRADIENT));
    }

    #[test]
    fn test_stroke_setters_allocate_lazily() {
        let mut shape = ShapeNode::new();
        assert!(shape.stroke().is_none());
        shape.set_stroke_width(3.0);
        shape.set_stroke_cap(StrokeCap::Round);
        let stroke = shape.stroke().unwrap();
        assert_eq!(stroke.width, 3.0);
        assert_eq!(stroke.cap, StrokeCap::Round);
        assert_eq!(stroke.join, StrokeJoin::Bevel);
        assert_eq!(shape.flags(), DirtyFlags::STROKE);
    }

    #[test]
    fn test_stencil_raises_stroke() {
        let mut contour = PathData::new();
        contour.move_to(0.0, 0.0).unwrap();
        contour.line_to(4.0, 0.0).unwrap();
        contour.line_to(4.0, 4.0).unwrap();
        contour.close().unwrap();

        let mut shape = ShapeNode::new();
        shape.stencil(&contour).unwrap();
        assert_eq!(shape.flags(), DirtyFlags::STROKE);
        let outline = shape.stroke().and_then(StrokeStyle::outline).unwrap();
        assert_eq!(outline.outline(), &contour);

        // An empty seed is rejected and leaves no stroke behind
        let mut fresh = ShapeNode::new();
        assert!(fresh.stencil(&PathData::new()).is_err());
        assert!(fresh.stroke().is_none());
        assert_eq!(fresh.flags(), DirtyFlags::NONE);
    }

    #[test]
    fn test_reset() {
        let mut shape = ShapeNode::new();
        triangle(&mut shape);
        shape.set_stroke_width(2.0);
        shape.set_fill_color(Color::RED);
        let capacity = shape.path().command_capacity();

        shape.reset();
        assert!(shape.path().is_empty());
        assert_eq!(shape.path().command_capacity(), capacity);
        assert!(shape.stroke().is_none());
        assert_eq!(shape.fill_color(), Color::TRANSPARENT);
        assert_eq!(shape.flags(), DirtyFlags::ALL);
    }

    #[test]
    fn test_duplicate_is_independent() {
        let mut shape = ShapeNode::new();
        triangle(&mut shape);
        shape.set_stroke_width(2.0);
        shape.set_stroke_dash(&[1.0, 2.0]).unwrap();

        let mut copy = shape.duplicate().unwrap();
        assert_eq!(copy.path(), shape.path());
        assert_eq!(
            copy.flags(),
            DirtyFlags::COLOR | DirtyFlags::PATH | DirtyFlags::STROKE
        );
        assert!(copy.handle().is_none());

        copy.line_to(20.0, 20.0).unwrap();
        copy.set_stroke_dash(&[5.0, 5.0]).unwrap();
        assert_eq!(shape.path().commands().len(), 4);
        assert_eq!(shape.stroke().unwrap().dash(), &[1.0, 2.0]);
    }

    #[test]
    fn test_append_rect_variants() {
        let mut shape = ShapeNode::new();
        shape.append_rect(0.0, 0.0, 10.0, 4.0, 0.0, 0.0).unwrap();
        assert_eq!(shape.path().commands().len(), 5);

        let mut rounded = ShapeNode::new();
        rounded.append_rect(0.0, 0.0, 10.0, 4.0, 1.0, 1.0).unwrap();
        assert_eq!(rounded.path().commands().len(), 10);
        assert_eq!(rounded.path().points().len(), 18);
        assert_eq!(rounded.bounds().unwrap(), Rect::new(0.0, 0.0, 10.0, 4.0));

        let mut pill = ShapeNode::new();
        pill.append_rect(0.0, 0.0, 10.0, 4.0, 5.0, 2.0).unwrap();
        assert_eq!(pill.path().commands().len(), 6);
    }

    #[test]
    fn test_append_circle() {
        let mut shape = ShapeNode::new();
        shape.append_circle(5.0, 5.0, 5.0, 3.0).unwrap();
        assert_eq!(shape.path().points().len(), 14);
        assert_eq!(shape.bounds().unwrap(), Rect::new(0.0, 2.0, 10.0, 6.0));
        assert_eq!(shape.path().points().last(), Some(&Point::new(10.0, 5.0)));
    }

    #[test]
    fn test_bounds_of_empty_shape() {
        assert_eq!(
            ShapeNode::new().bounds(),
            Err(SceneError::InsufficientCondition("shape path has no points"))
        );
    }
}
