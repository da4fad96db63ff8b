//! Gradient fills

use crate::color::Color;
use crate::error::Result;
use crate::path::Point;

/// A gradient stop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub offset: f32, // 0.0 to 1.0
    pub color: Color,
}

impl ColorStop {
    pub const fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Gradient fill of a shape
#[derive(Debug, PartialEq)]
pub enum Fill {
    Linear {
        start: Point,
        end: Point,
        stops: Vec<ColorStop>,
    },
    Radial {
        center: Point,
        radius: f32,
        stops: Vec<ColorStop>,
    },
}

impl Fill {
    /// Create a simple linear gradient between two colors
    pub fn linear_simple(start: Point, end: Point, from: Color, to: Color) -> Self {
        Fill::Linear {
            start,
            end,
            stops: vec![ColorStop::new(0.0, from), ColorStop::new(1.0, to)],
        }
    }

    /// Create a simple radial gradient between two colors
    pub fn radial_simple(center: Point, radius: f32, from: Color, to: Color) -> Self {
        Fill::Radial {
            center,
            radius,
            stops: vec![ColorStop::new(0.0, from), ColorStop::new(1.0, to)],
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        match self {
            Fill::Linear { stops, .. } | Fill::Radial { stops, .. } => stops,
        }
    }

    /// Deep copy, reporting allocation failure instead of aborting
    pub fn duplicate(&self) -> Result<Self> {
        let copy_stops = |stops: &[ColorStop]| -> Result<Vec<ColorStop>> {
            let mut out = Vec::new();
            out.try_reserve_exact(stops.len())?;
            out.extend_from_slice(stops);
            Ok(out)
        };
        Ok(match self {
            Fill::Linear { start, end, stops } => Fill::Linear {
                start: *start,
                end: *end,
                stops: copy_stops(stops)?,
            },
            Fill::Radial {
                center,
                radius,
                stops,
            } => Fill::Radial {
                center: *center,
                radius: *radius,
                stops: copy_stops(stops)?,
            },
        })
    }
}
