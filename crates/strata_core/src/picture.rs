//! Picture nodes
//!
//! A [`PictureNode`] wraps content decoded by a [`Loader`]. Loading only
//! opens and reads the input; the decoded root [`Paint`] is taken from the
//! loader on the next update, after which the loader is closed and dropped.
//! Loading again replaces the content: the current root stays in place until
//! that update disposes it and adopts the new one.

use std::fmt;
use std::path::Path;

use strata_paint::Rect;

use crate::error::{Result, SceneError};
use crate::flags::DirtyFlags;
use crate::loader::{LoadSource, Loader, LoaderRegistry};
use crate::paint::Paint;
use crate::render::Renderer;
use crate::transform::Matrix;

#[derive(Default)]
pub struct PictureNode {
    loader: Option<Box<dyn Loader>>,
    root: Option<Box<Paint>>,
    viewbox: Option<Rect>,
}

impl fmt::Debug for PictureNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PictureNode")
            .field("loading", &self.loader.is_some())
            .field("root", &self.root)
            .field("viewbox", &self.viewbox)
            .finish()
    }
}

impl PictureNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, registry: &dyn LoaderRegistry, path: &Path) -> Result<()> {
        self.load_source(registry, LoadSource::Path(path))
    }

    pub fn load_data(&mut self, registry: &dyn LoaderRegistry, data: &[u8]) -> Result<()> {
        self.load_source(registry, LoadSource::Data(data))
    }

    fn load_source(&mut self, registry: &dyn LoaderRegistry, source: LoadSource<'_>) -> Result<()> {
        self.close_loader();
        self.viewbox = None;

        let Some(mut loader) = registry.resolve(source) else {
            tracing::warn!(%source, "No loader accepts picture input");
            return Err(SceneError::NonSupport);
        };
        if !loader.open(source) {
            tracing::warn!(%source, "Loader rejected picture input");
            return Err(SceneError::NonSupport);
        }
        if !loader.read() {
            loader.close();
            tracing::warn!(%source, "Failed to read picture input");
            return Err(SceneError::Unknown);
        }

        self.viewbox = Some(loader.viewbox());
        self.loader = Some(loader);
        Ok(())
    }

    fn close_loader(&mut self) {
        if let Some(mut loader) = self.loader.take() {
            loader.close();
        }
    }

    /// Whether a decoded root is in place
    pub fn is_resolved(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Paint> {
        self.root.as_deref()
    }

    pub fn viewbox(&self) -> Result<Rect> {
        self.viewbox
            .ok_or(SceneError::InsufficientCondition("no picture loaded"))
    }

    pub fn bounds(&self) -> Result<Rect> {
        match &self.root {
            Some(root) => root.bounds(),
            None => Err(SceneError::InsufficientCondition("picture content not resolved")),
        }
    }

    pub fn update(
        &mut self,
        renderer: &mut dyn Renderer,
        transform: Option<&Matrix>,
        flags: DirtyFlags,
    ) -> Result<()> {
        if let Some(mut loader) = self.loader.take() {
            if let Some(previous) = &mut self.root {
                if let Err(err) = previous.dispose(renderer) {
                    self.loader = Some(loader);
                    return Err(err);
                }
                tracing::debug!("Disposed replaced picture content");
            }
            let data = loader.data();
            loader.close();
            let Some(root) = data else {
                self.root = None;
                tracing::warn!("Loader produced no picture content");
                return Err(SceneError::Unknown);
            };
            tracing::debug!("Picture content resolved");
            self.root = Some(Box::new(root));
        }
        match &mut self.root {
            Some(root) => root.update(renderer, transform, flags),
            None => Err(SceneError::InsufficientCondition("no picture loaded")),
        }
    }

    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        match &self.root {
            Some(root) => root.render(renderer),
            None => Err(SceneError::InsufficientCondition("picture content not resolved")),
        }
    }

    /// Release backend resources of the content and drop it
    pub fn dispose(&mut self, renderer: &mut dyn Renderer) -> Result<()> {
        if let Some(root) = &mut self.root {
            root.dispose(renderer)?;
        }
        self.root = None;
        Ok(())
    }
}

impl Drop for PictureNode {
    fn drop(&mut self) {
        self.close_loader();
    }
}
