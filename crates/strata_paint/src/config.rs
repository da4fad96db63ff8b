//! Tolerances for the outline engine

/// Numeric tolerances used when intersecting and merging stroke contours
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutlineConfig {
    /// Below this a determinant or denominator counts as zero
    pub epsilon: f32,
    /// Parameter slack when accepting a hit inside `[0, 1]`, and the minimum
    /// distance from a segment end before a cut is inserted
    pub param_tolerance: f32,
    /// Hits closer than this (in path units) are treated as one
    pub merge_tolerance: f32,
    /// A cubic piece is flat enough to treat as its chord below this deviation
    pub flatness_tolerance: f32,
    /// Hard stop for cubic/cubic subdivision
    pub max_subdivision_depth: u32,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-6,
            param_tolerance: 1e-4,
            merge_tolerance: 1e-3,
            flatness_tolerance: 1e-3,
            max_subdivision_depth: 24,
        }
    }
}

impl OutlineConfig {
    pub fn with_epsilon(mut self, epsilon: f32) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_param_tolerance(mut self, tolerance: f32) -> Self {
        self.param_tolerance = tolerance;
        self
    }

    pub fn with_merge_tolerance(mut self, tolerance: f32) -> Self {
        self.merge_tolerance = tolerance;
        self
    }

    pub fn with_flatness_tolerance(mut self, tolerance: f32) -> Self {
        self.flatness_tolerance = tolerance;
        self
    }

    pub fn with_max_subdivision_depth(mut self, depth: u32) -> Self {
        self.max_subdivision_depth = depth;
        self
    }
}
