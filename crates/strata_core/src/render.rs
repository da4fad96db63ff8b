//! Renderer backend interface

use crate::flags::DirtyFlags;
use crate::shape::ShapeNode;
use crate::transform::Matrix;

/// Opaque token for backend-side resources of one node
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RenderHandle(u64);

impl RenderHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Backend that turns shapes into drawable resources
pub trait Renderer {
    /// Upload or refresh the resources of `shape`. `flags` says which parts
    /// changed since the handle was last prepared. `None` means failure.
    fn prepare(
        &mut self,
        shape: &ShapeNode,
        handle: Option<RenderHandle>,
        transform: Option<&Matrix>,
        flags: DirtyFlags,
    ) -> Option<RenderHandle>;

    fn render(&mut self, shape: &ShapeNode, handle: Option<RenderHandle>) -> bool;

    /// Release the resources behind `handle`
    fn dispose(&mut self, shape: &ShapeNode, handle: Option<RenderHandle>) -> bool;
}
