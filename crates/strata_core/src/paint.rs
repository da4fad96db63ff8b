//! Paint nodes
//!
//! [`Paint`] is the common wrapper of every scene node. It owns the node's
//! transform record and the transform dirty bit, and dispatches the rest to
//! the concrete [`Node`].

use strata_paint::Rect;

use crate::error::{Result, SceneError};
use crate::flags::DirtyFlags;
use crate::picture::PictureNode;
use crate::render::Renderer;
use crate::scene::SceneNode;
use crate::shape::ShapeNode;
use crate::transform::{compose, Matrix, Transform, TRANSFORM_EPSILON};

/// The concrete kind of a paint
#[derive(Debug)]
pub enum Node {
    Shape(ShapeNode),
    Picture(PictureNode),
    Scene(SceneNode),
}

/// A scene node with an optional transform
#[derive(Debug)]
pub struct Paint {
    node: Node,
    transform: Option<Transform>,
    flags: DirtyFlags,
}

impl From<ShapeNode> for Paint {
    fn from(shape: ShapeNode) -> Self {
        Self::new(Node::Shape(shape))
    }
}

impl From<PictureNode> for Paint {
    fn from(picture: PictureNode) -> Self {
        Self::new(Node::Picture(picture))
    }
}

impl From<SceneNode> for Paint {
    fn from(scene: SceneNode) -> Self {
        Self::new(Node::Scene(scene))
    }
}

fn changed(current: f32, value: f32) -> bool {
    (current - value).abs() > TRANSFORM_EPSILON
}

impl Paint {
    pub fn new(node: Node) -> Self {
        Self {
            node,
            transform: None,
            flags: DirtyFlags::NONE,
        }
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn as_shape(&self) -> Option<&ShapeNode> {
        match &self.node {
            Node::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_shape_mut(&mut self) -> Option<&mut ShapeNode> {
        match &mut self.node {
            Node::Shape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_picture(&self) -> Option<&PictureNode> {
        match &self.node {
            Node::Picture(picture) => Some(picture),
            _ => None,
        }
    }

    pub fn as_picture_mut(&mut self) -> Option<&mut PictureNode> {
        match &mut self.node {
            Node::Picture(picture) => Some(picture),
            _ => None,
        }
    }

    pub fn as_scene(&self) -> Option<&SceneNode> {
        match &self.node {
            Node::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn as_scene_mut(&mut self) -> Option<&mut SceneNode> {
        match &mut self.node {
            Node::Scene(scene) => Some(scene),
            _ => None,
        }
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    /// Pending transform changes
    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    /// Store a changed transform field, raising TRANSFORM unless an
    /// explicit matrix is in charge
    fn edit_transform(&mut self, edit: impl FnOnce(&mut Transform)) {
        let transform = self.transform.get_or_insert_with(Transform::default);
        edit(transform);
        if !transform.is_overriding() {
            self.flags |= DirtyFlags::TRANSFORM;
        }
    }

    pub fn rotate(&mut self, degrees: f32) {
        let current = self.transform.as_ref().map_or(0.0, |t| t.degrees);
        if changed(current, degrees) {
            self.edit_transform(|t| t.degrees = degrees);
        }
    }

    pub fn scale(&mut self, factor: f32) {
        let current = self.transform.as_ref().map_or(1.0, |t| t.factor);
        if changed(current, factor) {
            self.edit_transform(|t| t.factor = factor);
        }
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        let (cx, cy) = self.transform.as_ref().map_or((0.0, 0.0), |t| (t.x, t.y));
        if changed(cx, x) || changed(cy, y) {
            self.edit_transform(|t| {
                t.x = x;
                t.y = y;
            });
        }
    }

    /// Override the incremental fields with an explicit matrix
    pub fn set_transform(&mut self, matrix: Matrix) {
        self.transform
            .get_or_insert_with(Transform::default)
            .set_matrix(matrix);
        self.flags |= DirtyFlags::TRANSFORM;
    }

    /// Bring the node and its backend resources up to date.
    ///
    /// `transform` and `flags` are what the parent passes down. Pending
    /// changes are restored if the node fails to update.
    pub fn update(
        &mut self,
        renderer: &mut dyn Renderer,
        transform: Option<&Matrix>,
        flags: DirtyFlags,
    ) -> Result<()> {
        if self.flags.contains(DirtyFlags::TRANSFORM) {
            if let Some(record) = &mut self.transform {
                if !record.recompute() {
                    self.transform = None;
                }
            }
        }

        let own = self.flags.take();
        let effective = flags | own;
        let matrix = compose(transform, self.transform.as_ref().map(Transform::matrix));

        let result = match &mut self.node {
            Node::Shape(shape) => shape.update(renderer, matrix.as_ref(), effective).map(|_| ()),
            Node::Picture(picture) => picture.update(renderer, matrix.as_ref(), effective),
            Node::Scene(scene) => scene.update(renderer, matrix.as_ref(), effective),
        };
        if result.is_err() {
            self.flags |= own;
        }
        result
    }

    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        match &self.node {
            Node::Shape(shape) => shape.render(renderer),
            Node::Picture(picture) => picture.render(renderer),
            Node::Scene(scene) => scene.render(renderer),
        }
    }

    pub fn dispose(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        match &mut self.node {
            Node::Shape(shape) => shape.dispose(renderer),
            Node::Picture(picture) => picture.dispose(renderer),
            Node::Scene(scene) => scene.dispose(renderer),
        }
    }

    pub fn bounds(&self) -> Result<Rect> {
        match &self.node {
            Node::Shape(shape) => shape.bounds(),
            Node::Picture(picture) => picture.bounds(),
            Node::Scene(scene) => scene.bounds(),
        }
    }

    /// Deep copy. Only shapes can be duplicated.
    pub fn duplicate(&self) -> Result<Paint> {
        let Node::Shape(shape) = &self.node else {
            return Err(SceneError::NonSupport);
        };
        let mut copy = Paint::from(shape.duplicate()?);
        if let Some(transform) = self.transform {
            copy.transform = Some(transform);
            copy.flags |= DirtyFlags::TRANSFORM;
        }
        Ok(copy)
    }
}
