//! Picture loader interface
//!
//! Decoding lives outside this crate. A [`LoaderRegistry`] picks a
//! [`Loader`] for an input, and a [`PictureNode`](crate::PictureNode) drives
//! it through open, read, data and close.

use std::fmt;
use std::path::Path;

use strata_paint::Rect;

use crate::paint::Paint;

/// Input handed to loaders
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource<'a> {
    Path(&'a Path),
    Data(&'a [u8]),
}

impl fmt::Display for LoadSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadSource::Path(path) => write!(f, "{}", path.display()),
            LoadSource::Data(data) => write!(f, "<{} bytes>", data.len()),
        }
    }
}

/// Decoder for one picture format
pub trait Loader {
    /// Accept or reject the input
    fn open(&mut self, source: LoadSource<'_>) -> bool;

    /// Decode the opened input
    fn read(&mut self) -> bool;

    /// Take the decoded root node. Yields `Some` at most once per read.
    fn data(&mut self) -> Option<Paint>;

    fn close(&mut self);

    /// Picture viewbox as declared by the input
    fn viewbox(&self) -> Rect;
}

/// Picks a loader able to handle an input
pub trait LoaderRegistry {
    fn resolve(&self, source: LoadSource<'_>) -> Option<Box<dyn Loader>>;
}
