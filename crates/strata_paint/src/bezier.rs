//! Cubic Bezier helpers and polynomial root solving

use smallvec::SmallVec;

use crate::path::Point;
use crate::primitives::Rect;

/// A cubic Bezier segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CubicBez {
    pub p0: Point,
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl CubicBez {
    pub const fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self { p0, p1, p2, p3 }
    }

    pub fn eval(&self, t: f32) -> Point {
        let mt = 1.0 - t;
        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;
        Point::new(
            a * self.p0.x + b * self.p1.x + c * self.p2.x + d * self.p3.x,
            a * self.p0.y + b * self.p1.y + c * self.p2.y + d * self.p3.y,
        )
    }

    /// De Casteljau split at `t`
    pub fn split(&self, t: f32) -> (CubicBez, CubicBez) {
        let p01 = self.p0.lerp(self.p1, t);
        let p12 = self.p1.lerp(self.p2, t);
        let p23 = self.p2.lerp(self.p3, t);
        let p012 = p01.lerp(p12, t);
        let p123 = p12.lerp(p23, t);
        let mid = p012.lerp(p123, t);
        (
            CubicBez::new(self.p0, p01, p012, mid),
            CubicBez::new(mid, p123, p23, self.p3),
        )
    }

    pub fn control_bounds(&self) -> Rect {
        Rect::bounding(&[self.p0, self.p1, self.p2, self.p3]).unwrap_or_default()
    }

    /// Largest distance of the control points from the chord
    pub fn flatness(&self) -> f32 {
        let chord = self.p3 - self.p0;
        let len = (chord.x * chord.x + chord.y * chord.y).sqrt();
        if len <= f32::EPSILON {
            return self.p0.distance(self.p1).max(self.p0.distance(self.p2));
        }
        let dist = |p: Point| {
            let v = p - self.p0;
            (v.x * chord.y - v.y * chord.x).abs() / len
        };
        dist(self.p1).max(dist(self.p2))
    }

    pub fn is_flat(&self, tolerance: f32) -> bool {
        self.flatness() <= tolerance
    }

    /// Power-basis coefficients `[a, b, c, d]` for x(t) and y(t), where
    /// `v(t) = a t^3 + b t^2 + c t + d`
    pub fn coefficients(&self) -> ([f64; 4], [f64; 4]) {
        let axis = |p0: f32, p1: f32, p2: f32, p3: f32| {
            let (p0, p1, p2, p3) = (p0 as f64, p1 as f64, p2 as f64, p3 as f64);
            [
                -p0 + 3.0 * p1 - 3.0 * p2 + p3,
                3.0 * p0 - 6.0 * p1 + 3.0 * p2,
                -3.0 * p0 + 3.0 * p1,
                p0,
            ]
        };
        (
            axis(self.p0.x, self.p1.x, self.p2.x, self.p3.x),
            axis(self.p0.y, self.p1.y, self.p2.y, self.p3.y),
        )
    }
}

/// Real roots of `a x^2 + b x + c`
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> SmallVec<[f64; 3]> {
    let mut roots = SmallVec::new();
    let scale = a.abs().max(b.abs()).max(c.abs());
    if scale == 0.0 {
        return roots;
    }
    if a.abs() <= 1e-12 * scale {
        if b.abs() > 1e-12 * scale {
            roots.push(-c / b);
        }
        return roots;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return roots;
    }
    if disc == 0.0 {
        roots.push(-b / (2.0 * a));
        return roots;
    }
    // Numerically stable form, avoids cancellation between b and sqrt(disc)
    let q = -0.5 * (b + b.signum() * disc.sqrt());
    roots.push(q / a);
    if q != 0.0 {
        roots.push(c / q);
    }
    roots
}

/// Real roots of `a x^3 + b x^2 + c x + d`, polished with Newton steps
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> SmallVec<[f64; 3]> {
    let scale = a.abs().max(b.abs()).max(c.abs()).max(d.abs());
    if scale == 0.0 {
        return SmallVec::new();
    }
    if a.abs() <= 1e-12 * scale {
        return solve_quadratic(b, c, d);
    }

    let (b, c, d) = (b / a, c / a, d / a);
    let shift = -b / 3.0;
    let p = c - b * b / 3.0;
    let q = 2.0 * b * b * b / 27.0 - b * c / 3.0 + d;
    let disc = q * q / 4.0 + p * p * p / 27.0;

    let mut roots: SmallVec<[f64; 3]> = SmallVec::new();
    if disc > 1e-14 {
        let sq = disc.sqrt();
        let u = (-q / 2.0 + sq).cbrt();
        let v = (-q / 2.0 - sq).cbrt();
        roots.push(u + v + shift);
    } else if disc < -1e-14 {
        let r = (-p / 3.0).sqrt();
        let cos_phi = (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0);
        let phi = cos_phi.acos();
        for k in 0..3 {
            let angle = (phi - 2.0 * std::f64::consts::PI * k as f64) / 3.0;
            roots.push(2.0 * r * angle.cos() + shift);
        }
    } else {
        let u = (-q / 2.0).cbrt();
        roots.push(2.0 * u + shift);
        roots.push(-u + shift);
    }

    for root in roots.iter_mut() {
        for _ in 0..2 {
            let f = ((*root + b) * *root + c) * *root + d;
            let df = (3.0 * *root + 2.0 * b) * *root + c;
            if df.abs() > f64::EPSILON {
                *root -= f / df;
            }
        }
    }
    roots
}
