//! Node transforms
//!
//! A [`Transform`] keeps translate, rotate and scale as separate fields so
//! setters can detect no-op writes, and derives its [`Matrix`] on demand.
//! An explicit matrix set through [`Transform::set_matrix`] overrides the
//! fields until the record is dropped.

use strata_paint::Point;

/// Below this difference a transform field counts as unchanged
pub const TRANSFORM_EPSILON: f32 = f32::EPSILON;

/// 3x3 transformation matrix (row-major)
///
/// ```text
/// | e11 e12 e13 |
/// | e21 e22 e23 |
/// | e31 e32 e33 |
/// ```
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Matrix {
    pub elements: [f32; 9],
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        elements: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    pub const fn new(elements: [f32; 9]) -> Self {
        Self { elements }
    }

    pub fn translation(x: f32, y: f32) -> Self {
        Self {
            elements: [1.0, 0.0, x, 0.0, 1.0, y, 0.0, 0.0, 1.0],
        }
    }

    pub fn scale(factor: f32) -> Self {
        Self {
            elements: [factor, 0.0, 0.0, 0.0, factor, 0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn rotation_degrees(degrees: f32) -> Self {
        let (s, c) = degrees.to_radians().sin_cos();
        Self {
            elements: [c, -s, 0.0, s, c, 0.0, 0.0, 0.0, 1.0],
        }
    }

    /// Multiply two matrices (self * other).
    /// The result first applies `other`, then `self`.
    pub fn mul(&self, other: &Matrix) -> Matrix {
        let a = &self.elements;
        let b = &other.elements;
        let mut result = [0.0f32; 9];
        for row in 0..3 {
            for col in 0..3 {
                for k in 0..3 {
                    result[row * 3 + col] += a[row * 3 + k] * b[k * 3 + col];
                }
            }
        }
        Matrix { elements: result }
    }

    pub fn transform_point(&self, point: Point) -> Point {
        let [a, b, tx, c, d, ty, ..] = self.elements;
        Point::new(a * point.x + b * point.y + tx, c * point.x + d * point.y + ty)
    }

    pub fn is_identity(&self) -> bool {
        self.elements
            .iter()
            .zip(Self::IDENTITY.elements.iter())
            .all(|(a, b)| (a - b).abs() <= TRANSFORM_EPSILON)
    }
}

/// Combine an inherited matrix with a node's own.
///
/// Both present gives `parent * child`; one present gives that one; none
/// means identity and is returned as `None`.
pub fn compose(parent: Option<&Matrix>, child: Option<&Matrix>) -> Option<Matrix> {
    match (parent, child) {
        (Some(p), Some(c)) => Some(p.mul(c)),
        (Some(m), None) | (None, Some(m)) => Some(*m),
        (None, None) => None,
    }
}

/// Per-node transform record
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub x: f32,
    pub y: f32,
    pub degrees: f32,
    pub factor: f32,
    matrix: Matrix,
    overriding: bool,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            degrees: 0.0,
            factor: 1.0,
            matrix: Matrix::IDENTITY,
            overriding: false,
        }
    }
}

impl Transform {
    pub fn matrix(&self) -> &Matrix {
        &self.matrix
    }

    pub fn is_overriding(&self) -> bool {
        self.overriding
    }

    /// Replace the derived matrix with an explicit one
    pub fn set_matrix(&mut self, matrix: Matrix) {
        self.matrix = matrix;
        self.overriding = true;
    }

    /// Rebuild the matrix from the fields as scale, then rotate, then
    /// translate. An overriding matrix is kept as is.
    ///
    /// Returns `false` when the record amounts to identity.
    pub fn recompute(&mut self) -> bool {
        if self.overriding {
            return true;
        }
        let near = |a: f32, b: f32| (a - b).abs() <= TRANSFORM_EPSILON;
        if near(self.x, 0.0) && near(self.y, 0.0) && near(self.degrees, 0.0) && near(self.factor, 1.0) {
            self.matrix = Matrix::IDENTITY;
            return false;
        }
        self.matrix = Matrix::translation(self.x, self.y)
            .mul(&Matrix::rotation_degrees(self.degrees))
            .mul(&Matrix::scale(self.factor));
        true
    }
}
