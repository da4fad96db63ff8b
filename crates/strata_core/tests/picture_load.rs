use std::cell::Cell;
use std::path::Path;
use std::rc::Rc;

use strata_core::{
    DirtyFlags, LoadSource, Loader, LoaderRegistry, Matrix, Paint, PictureNode, RenderHandle,
    Renderer, SceneError, ShapeNode,
};
use strata_paint::Rect;

/// Loads `RECT x y w h` documents into a single rectangle shape
struct RectLoader {
    text: String,
    rect: Option<Rect>,
    closes: Rc<Cell<u32>>,
}

impl Loader for RectLoader {
    fn open(&mut self, source: LoadSource<'_>) -> bool {
        match source {
            LoadSource::Data(data) => match std::str::from_utf8(data) {
                Ok(text) => {
                    self.text = text.to_owned();
                    true
                }
                Err(_) => false,
            },
            // Fixture paths stand in for files on disk
            LoadSource::Path(path) => {
                self.text = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default()
                    .replace('_', " ");
                true
            }
        }
    }

    fn read(&mut self) -> bool {
        let mut words = self.text.split_whitespace();
        if words.next() != Some("RECT") {
            return false;
        }
        let values = match words.map(str::parse::<f32>).collect::<Result<Vec<_>, _>>() {
            Ok(values) => values,
            Err(_) => return false,
        };
        let [x, y, w, h] = values[..] else {
            return false;
        };
        self.rect = Some(Rect::new(x, y, w, h));
        true
    }

    fn data(&mut self) -> Option<Paint> {
        let rect = self.rect.take()?;
        let mut shape = ShapeNode::new();
        shape
            .append_rect(rect.x, rect.y, rect.width, rect.height, 0.0, 0.0)
            .ok()?;
        Some(Paint::from(shape))
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
    }

    fn viewbox(&self) -> Rect {
        self.rect
            .map(|r| Rect::new(0.0, 0.0, r.x + r.width, r.y + r.height))
            .unwrap_or_default()
    }
}

#[derive(Default)]
struct RectRegistry {
    closes: Rc<Cell<u32>>,
}

impl LoaderRegistry for RectRegistry {
    fn resolve(&self, source: LoadSource<'_>) -> Option<Box<dyn Loader>> {
        let known = match source {
            LoadSource::Data(data) => data.starts_with(b"RECT"),
            LoadSource::Path(path) => path.extension().is_some_and(|ext| ext == "rect"),
        };
        known.then(|| {
            Box::new(RectLoader {
                text: String::new(),
                rect: None,
                closes: Rc::clone(&self.closes),
            }) as Box<dyn Loader>
        })
    }
}

#[derive(Default)]
struct CountingRenderer {
    prepared: u32,
    disposed: u32,
}

impl Renderer for CountingRenderer {
    fn prepare(
        &mut self,
        _shape: &ShapeNode,
        handle: Option<RenderHandle>,
        _transform: Option<&Matrix>,
        _flags: DirtyFlags,
    ) -> Option<RenderHandle> {
        self.prepared += 1;
        Some(handle.unwrap_or(RenderHandle::new(u64::from(self.prepared))))
    }

    fn render(&mut self, _shape: &ShapeNode, _handle: Option<RenderHandle>) -> bool {
        true
    }

    fn dispose(&mut self, _shape: &ShapeNode, _handle: Option<RenderHandle>) -> bool {
        self.disposed += 1;
        true
    }
}

#[test]
fn unrecognized_input_is_not_supported() {
    let registry = RectRegistry::default();
    let mut picture = PictureNode::new();
    assert_eq!(
        picture.load_data(&registry, b"<svg/>"),
        Err(SceneError::NonSupport)
    );
    assert_eq!(
        picture.load(&registry, Path::new("drawing.png")),
        Err(SceneError::NonSupport)
    );
    assert!(picture.viewbox().is_err());
    assert!(picture.bounds().is_err());
}

#[test]
fn corrupt_input_is_unknown_and_closed() {
    let registry = RectRegistry::default();
    let mut picture = PictureNode::new();
    assert_eq!(
        picture.load_data(&registry, b"RECT 1 2 three"),
        Err(SceneError::Unknown)
    );
    assert_eq!(registry.closes.get(), 1);
    assert!(picture.viewbox().is_err());
}

#[test]
fn valid_input_resolves_on_first_update() {
    let registry = RectRegistry::default();
    let mut renderer = CountingRenderer::default();
    let mut picture = PictureNode::new();

    picture.load_data(&registry, b"RECT 2 4 10 20").unwrap();
    assert_eq!(picture.viewbox(), Ok(Rect::new(0.0, 0.0, 12.0, 24.0)));
    // Content is only taken from the loader by update
    assert!(!picture.is_resolved());
    assert!(picture.bounds().is_err());

    picture
        .update(&mut renderer, None, DirtyFlags::NONE)
        .unwrap();
    assert!(picture.is_resolved());
    assert_eq!(registry.closes.get(), 1);
    assert_eq!(picture.bounds(), Ok(Rect::new(2.0, 4.0, 10.0, 20.0)));

    picture
        .update(&mut renderer, None, DirtyFlags::NONE)
        .unwrap();
    assert_eq!(renderer.prepared, 2);
    assert_eq!(registry.closes.get(), 1);

    picture.dispose(&mut renderer).unwrap();
    assert_eq!(renderer.disposed, 1);
    assert!(!picture.is_resolved());
}

#[test]
fn reload_after_resolve_replaces_content_on_update() {
    let registry = RectRegistry::default();
    let mut renderer = CountingRenderer::default();
    let mut picture = PictureNode::new();
    picture.load_data(&registry, b"RECT 2 4 10 20").unwrap();
    picture
        .update(&mut renderer, None, DirtyFlags::NONE)
        .unwrap();

    picture.load_data(&registry, b"RECT 0 0 1 1").unwrap();
    assert_eq!(picture.viewbox(), Ok(Rect::new(0.0, 0.0, 1.0, 1.0)));
    // The old content stays until the next update swaps it
    assert_eq!(picture.bounds(), Ok(Rect::new(2.0, 4.0, 10.0, 20.0)));
    assert_eq!(renderer.disposed, 0);

    picture
        .update(&mut renderer, None, DirtyFlags::NONE)
        .unwrap();
    assert_eq!(renderer.disposed, 1);
    assert_eq!(registry.closes.get(), 2);
    assert_eq!(picture.bounds(), Ok(Rect::new(0.0, 0.0, 1.0, 1.0)));
    assert_eq!(renderer.prepared, 2);

    picture.dispose(&mut renderer).unwrap();
    assert_eq!(renderer.disposed, 2);
}

#[test]
fn reloading_closes_the_pending_loader() {
    let registry = RectRegistry::default();
    let mut picture = PictureNode::new();
    picture.load_data(&registry, b"RECT 0 0 1 1").unwrap();
    picture.load(&registry, Path::new("RECT_0_0_5_5.rect")).unwrap();
    assert_eq!(registry.closes.get(), 1);
    assert_eq!(picture.viewbox(), Ok(Rect::new(0.0, 0.0, 5.0, 5.0)));

    drop(picture);
    assert_eq!(registry.closes.get(), 2);
}

#[test]
fn picture_paint_updates_through_paint() {
    let registry = RectRegistry::default();
    let mut renderer = CountingRenderer::default();
    let mut picture = PictureNode::new();
    picture.load_data(&registry, b"RECT 0 0 8 8").unwrap();

    let mut paint = Paint::from(picture);
    paint.translate(5.0, 5.0);
    paint.update(&mut renderer, None, DirtyFlags::NONE).unwrap();
    paint.render(&mut renderer).unwrap();
    assert_eq!(paint.bounds(), Ok(Rect::new(0.0, 0.0, 8.0, 8.0)));
    assert!(paint.as_picture().unwrap().root().is_some());
    paint.dispose(&mut renderer).unwrap();
}

#[test]
fn update_without_content_fails() {
    let mut renderer = CountingRenderer::default();
    let mut picture = PictureNode::new();
    assert!(matches!(
        picture.update(&mut renderer, None, DirtyFlags::NONE),
        Err(SceneError::InsufficientCondition(_))
    ));
}
