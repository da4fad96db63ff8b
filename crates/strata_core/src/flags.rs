//! Dirty tracking

bitflags::bitflags! {
    /// Aspects of a node changed since its last update
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DirtyFlags: u8 {
        const PATH = 1 << 0;
        const COLOR = 1 << 1;
        const GRADIENT = 1 << 2;
        const STROKE = 1 << 3;
        const TRANSFORM = 1 << 4;
        const ALL = Self::PATH.bits()
            | Self::COLOR.bits()
            | Self::GRADIENT.bits()
            | Self::STROKE.bits()
            | Self::TRANSFORM.bits();
    }
}

impl DirtyFlags {
    pub const NONE: Self = Self::empty();

    /// Hand out the accumulated flags and reset to `NONE`
    pub fn take(&mut self) -> Self {
        std::mem::replace(self, Self::NONE)
    }
}
