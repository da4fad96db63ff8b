//! Strata path and paint primitives
//!
//! Geometry and styling data shared by scene nodes and renderers.
//!
//! # Features
//!
//! - Growable buffers with a fixed doubling contract
//! - Paths made of move, line, cubic and close commands
//! - Fill colors, gradient fills and stroke styles
//! - Segment intersection (line and cubic Bezier)
//! - Incremental stroke outline merging

pub mod bezier;
pub mod buffer;
pub mod color;
pub mod config;
pub mod error;
pub mod gradient;
pub mod intersect;
pub mod outline;
pub mod path;
pub mod primitives;
pub mod stroke;

pub use bezier::CubicBez;
pub use buffer::{DynamicBuffer, GROWTH_FACTOR};
pub use color::Color;
pub use config::OutlineConfig;
pub use error::{PaintError, Result};
pub use gradient::{ColorStop, Fill};
pub use outline::{Intersection, SegmentRef, StrokeOutline};
pub use path::{Command, ContourRange, PathData, Point, Segment, SegmentShape};
pub use primitives::*;
pub use stroke::{StrokeCap, StrokeJoin, StrokeStyle};
