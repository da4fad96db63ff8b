//! Stroke styling

use crate::color::Color;
use crate::error::Result;
use crate::outline::StrokeOutline;
use crate::path::PathData;

/// Line cap style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeCap {
    #[default]
    Square,
    Round,
    Butt,
}

/// Line join style
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeJoin {
    #[default]
    Bevel,
    Round,
    Miter,
}

/// Stroke properties of a shape, plus its cached outline
#[derive(Debug, Default)]
pub struct StrokeStyle {
    pub width: f32,
    pub color: Color,
    pub cap: StrokeCap,
    pub join: StrokeJoin,
    dash: Vec<f32>,
    outline: Option<StrokeOutline>,
}

impl StrokeStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dash(&self) -> &[f32] {
        &self.dash
    }

    /// Replace the dash pattern. Storage is only reallocated when the
    /// pattern length changes; on failure the old pattern is kept.
    pub fn set_dash(&mut self, pattern: &[f32]) -> Result<()> {
        if pattern.len() == self.dash.len() {
            self.dash.copy_from_slice(pattern);
            return Ok(());
        }
        let mut dash = Vec::new();
        dash.try_reserve_exact(pattern.len())?;
        dash.extend_from_slice(pattern);
        self.dash = dash;
        Ok(())
    }

    pub fn outline(&self) -> Option<&StrokeOutline> {
        self.outline.as_ref()
    }

    /// Feed a contour to the outline cache. The first call seeds it with
    /// `path`, later calls merge the last contour of `path`.
    pub fn stencil(&mut self, path: &PathData) -> Result<()> {
        match &mut self.outline {
            Some(outline) => outline.update(path),
            None => {
                self.outline = Some(StrokeOutline::new(path)?);
                Ok(())
            }
        }
    }

    /// Deep copy, outline cache included
    pub fn try_clone(&self) -> Result<Self> {
        let mut dash = Vec::new();
        dash.try_reserve_exact(self.dash.len())?;
        dash.extend_from_slice(&self.dash);
        Ok(Self {
            width: self.width,
            color: self.color,
            cap: self.cap,
            join: self.join,
            dash,
            outline: self.outline.as_ref().map(StrokeOutline::try_clone).transpose()?,
        })
    }
}
