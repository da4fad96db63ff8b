//! Scene nodes: ordered groups of paints

use strata_paint::Rect;

use crate::error::{Result, SceneError};
use crate::flags::DirtyFlags;
use crate::paint::Paint;
use crate::render::Renderer;
use crate::transform::Matrix;

#[derive(Debug, Default)]
pub struct SceneNode {
    children: Vec<Paint>,
}

impl SceneNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, paint: impl Into<Paint>) -> Result<()> {
        self.children
            .try_reserve(1)
            .map_err(strata_paint::PaintError::from)?;
        self.children.push(paint.into());
        Ok(())
    }

    pub fn children(&self) -> &[Paint] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Paint] {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn update(
        &mut self,
        renderer: &mut dyn Renderer,
        transform: Option<&Matrix>,
        flags: DirtyFlags,
    ) -> Result<()> {
        for child in &mut self.children {
            child.update(renderer, transform, flags)?;
        }
        Ok(())
    }

    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        for child in &self.children {
            child.render(renderer)?;
        }
        Ok(())
    }

    /// Dispose every child, reporting the first failure
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        let mut result = Ok(());
        for child in &mut self.children {
            if let Err(err) = child.dispose(renderer) {
                tracing::warn!(%err, "Failed to dispose scene child");
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        result
    }

    /// Union of the children that have bounds
    pub fn bounds(&self) -> Result<Rect> {
        self.children
            .iter()
            .filter_map(|child| child.bounds().ok())
            .reduce(|acc, r| acc.union(&r))
            .ok_or(SceneError::InsufficientCondition("scene has no bounded children"))
    }
}
