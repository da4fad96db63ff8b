//! Strata Scene Core
//!
//! This crate provides the retained scene nodes of the Strata vector engine:
//!
//! - **Paints**: shapes, pictures and scenes behind one node type
//! - **Transforms**: incremental translate/rotate/scale records with override
//! - **Dirty Tracking**: per-node change flags consumed by a renderer backend
//!
//! # Example
//!
//! ```rust
//! use strata_core::{DirtyFlags, Paint, ShapeNode};
//!
//! let mut shape = ShapeNode::new();
//! shape.append_rect(0.0, 0.0, 100.0, 50.0, 8.0, 8.0).unwrap();
//! assert!(shape.flags().contains(DirtyFlags::PATH));
//!
//! let mut paint = Paint::from(shape);
//! paint.rotate(45.0);
//! assert!(paint.flags().contains(DirtyFlags::TRANSFORM));
//! ```

pub mod error;
pub mod flags;
pub mod loader;
pub mod paint;
pub mod picture;
pub mod render;
pub mod scene;
pub mod shape;
pub mod transform;

pub use error::{Result, SceneError};
pub use flags::DirtyFlags;
pub use loader::{LoadSource, Loader, LoaderRegistry};
pub use paint::{Node, Paint};
pub use picture::PictureNode;
pub use render::{RenderHandle, Renderer};
pub use scene::SceneNode;
pub use shape::{ShapeNode, PATH_KAPPA};
pub use transform::{compose, Matrix, Transform, TRANSFORM_EPSILON};
