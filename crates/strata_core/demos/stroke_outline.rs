//! Stroke Outline Demo
//!
//! Stencils three overlapping squares into one shape's stroke outline and
//! drives the shape through a logging renderer.
//!
//! Run with: RUST_LOG=debug cargo run -p strata_core --example stroke_outline

use strata_core::{DirtyFlags, Matrix, Paint, RenderHandle, Renderer, Result, ShapeNode};
use strata_paint::{Color, PathData, StrokeJoin};
use tracing_subscriber::EnvFilter;

struct LogRenderer {
    next: u64,
}

impl Renderer for LogRenderer {
    fn prepare(
        &mut self,
        shape: &ShapeNode,
        handle: Option<RenderHandle>,
        transform: Option<&Matrix>,
        flags: DirtyFlags,
    ) -> Option<RenderHandle> {
        let handle = handle.unwrap_or_else(|| {
            self.next += 1;
            RenderHandle::new(self.next)
        });
        println!(
            "prepare #{} flags={:?} transform={:?} commands={}",
            handle.raw(),
            flags,
            transform.map(|m| m.elements),
            shape.path().commands().len(),
        );
        Some(handle)
    }

    fn render(&mut self, _shape: &ShapeNode, handle: Option<RenderHandle>) -> bool {
        handle.is_some()
    }

    fn dispose(&mut self, _shape: &ShapeNode, handle: Option<RenderHandle>) -> bool {
        println!("dispose {:?}", handle.map(RenderHandle::raw));
        true
    }
}

fn square(x: f32, y: f32, size: f32) -> strata_paint::Result<PathData> {
    let mut path = PathData::new();
    path.move_to(x, y)?;
    path.line_to(x + size, y)?;
    path.line_to(x + size, y + size)?;
    path.line_to(x, y + size)?;
    path.close()?;
    Ok(path)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut shape = ShapeNode::new();
    shape.set_stroke_width(2.0);
    shape.set_stroke_color(Color::from_hex(0x3366cc));
    shape.set_stroke_join(StrokeJoin::Round);

    for (i, offset) in [0.0, 6.0, 12.0].into_iter().enumerate() {
        shape.stencil(&square(offset, offset, 10.0)?)?;
        if let Some(outline) = shape.stroke().and_then(|s| s.outline()) {
            println!(
                "contour {}: {} intersections, outline has {} commands",
                i + 1,
                outline.intersections().len(),
                outline.outline().commands().len(),
            );
        }
    }

    let mut paint = Paint::from(shape);
    paint.rotate(15.0);

    let mut renderer = LogRenderer { next: 0 };
    paint.update(&mut renderer, None, DirtyFlags::NONE)?;
    paint.render(&mut renderer)?;
    paint.dispose(&mut renderer)?;
    Ok(())
}
