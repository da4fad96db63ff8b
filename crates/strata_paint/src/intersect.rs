//! Segment intersection
//!
//! Lines are intersected in implicit `a*x + b*y = c` form. A line against a
//! cubic substitutes the cubic into the line's signed distance and solves the
//! resulting cubic polynomial. Two cubics are subdivided with bounding box
//! rejection until both pieces are flat, and the remaining chords are
//! intersected as lines.
//!
//! All parameters returned in a [`Hit`] are clamped to `[0, 1]`.

use smallvec::SmallVec;

use crate::bezier::{solve_cubic, CubicBez};
use crate::config::OutlineConfig;
use crate::path::{Point, SegmentShape};

/// Upper bound on cubic/cubic intersections (Bezout)
pub const MAX_CUBIC_HITS: usize = 9;

/// One intersection between segment `a` and segment `b`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub point: Point,
    /// Parameter along the first segment
    pub t_a: f32,
    /// Parameter along the second segment
    pub t_b: f32,
}

/// Outcome of intersecting two line segments
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LineHit {
    /// The lines cross outside one of the segments, or a segment is degenerate
    None,
    /// Same direction, different offset
    Parallel,
    /// Collinear; shared stretches are not reported as intersections
    Overlap,
    Point(Hit),
}

pub type Hits = SmallVec<[Hit; MAX_CUBIC_HITS]>;

/// Line in implicit form, normalized so `(a, b)` has unit length
#[derive(Clone, Copy, Debug)]
struct Implicit {
    a: f32,
    b: f32,
    c: f32,
}

impl Implicit {
    fn through(p0: Point, p1: Point, epsilon: f32) -> Option<Self> {
        let a = p1.y - p0.y;
        let b = p0.x - p1.x;
        let len = (a * a + b * b).sqrt();
        if len <= epsilon {
            return None;
        }
        let (a, b) = (a / len, b / len);
        Some(Self {
            a,
            b,
            c: a * p0.x + b * p0.y,
        })
    }
}

/// Parameter of `p` projected onto the segment `p0 -> p1`
fn project(p: Point, p0: Point, p1: Point) -> f32 {
    let d = p1 - p0;
    let len2 = d.x * d.x + d.y * d.y;
    if len2 == 0.0 {
        return 0.0;
    }
    let v = p - p0;
    (v.x * d.x + v.y * d.y) / len2
}

fn accept(t: f32, tolerance: f32) -> Option<f32> {
    (t >= -tolerance && t <= 1.0 + tolerance).then(|| t.clamp(0.0, 1.0))
}

/// Intersect segment `a0 -> a1` with segment `b0 -> b1`
pub fn line_line(a0: Point, a1: Point, b0: Point, b1: Point, config: &OutlineConfig) -> LineHit {
    let (Some(la), Some(lb)) = (
        Implicit::through(a0, a1, config.epsilon),
        Implicit::through(b0, b1, config.epsilon),
    ) else {
        return LineHit::None;
    };

    let det = la.a * lb.b - lb.a * la.b;
    let scale = 1.0 + la.c.abs().max(lb.c.abs());
    if det.abs() <= config.epsilon {
        let dx = la.a * lb.c - lb.a * la.c;
        let dy = la.b * lb.c - lb.b * la.c;
        if dx.abs() <= config.epsilon * scale && dy.abs() <= config.epsilon * scale {
            return LineHit::Overlap;
        }
        return LineHit::Parallel;
    }

    let x = (lb.b * la.c - la.b * lb.c) / det;
    let y = (la.a * lb.c - lb.a * la.c) / det;
    let point = Point::new(x, y);

    let tol = config.param_tolerance;
    match (accept(project(point, a0, a1), tol), accept(project(point, b0, b1), tol)) {
        (Some(t_a), Some(t_b)) => LineHit::Point(Hit { point, t_a, t_b }),
        _ => LineHit::None,
    }
}

/// Raw `(line, cubic)` parameter pairs where the infinite line through
/// `p0 -> p1` meets the cubic. Nothing is filtered or clamped.
pub fn line_cubic_params(
    p0: Point,
    p1: Point,
    cubic: &CubicBez,
    epsilon: f32,
) -> SmallVec<[(f32, f32); 3]> {
    let mut out = SmallVec::new();
    let Some(line) = Implicit::through(p0, p1, epsilon) else {
        return out;
    };
    let (cx, cy) = cubic.coefficients();
    let (a, b) = (line.a as f64, line.b as f64);
    let poly = [
        a * cx[0] + b * cy[0],
        a * cx[1] + b * cy[1],
        a * cx[2] + b * cy[2],
        a * cx[3] + b * cy[3] - line.c as f64,
    ];
    for root in solve_cubic(poly[0], poly[1], poly[2], poly[3]) {
        let t = root as f32;
        let s = project(cubic.eval(t), p0, p1);
        out.push((s, t));
    }
    out
}

/// Intersect the segment `p0 -> p1` with a cubic. `t_a` is along the line.
pub fn line_cubic(p0: Point, p1: Point, cubic: &CubicBez, config: &OutlineConfig) -> Hits {
    let tol = config.param_tolerance;
    let mut hits = Hits::new();
    for (s, t) in line_cubic_params(p0, p1, cubic, config.epsilon) {
        let (Some(t_a), Some(t_b)) = (accept(s, tol), accept(t, tol)) else {
            continue;
        };
        // A double root can surface twice from the solver
        if hits.iter().any(|h: &Hit| (h.t_b - t_b).abs() <= tol) {
            continue;
        }
        hits.push(Hit {
            point: cubic.eval(t_b),
            t_a,
            t_b,
        });
    }
    hits
}

/// Intersect two cubics by recursive subdivision
pub fn cubic_cubic(a: &CubicBez, b: &CubicBez, config: &OutlineConfig) -> Hits {
    let mut hits = Hits::new();
    subdivide(a, (0.0, 1.0), b, (0.0, 1.0), 0, config, &mut hits);
    hits
}

fn subdivide(
    a: &CubicBez,
    a_range: (f32, f32),
    b: &CubicBez,
    b_range: (f32, f32),
    depth: u32,
    config: &OutlineConfig,
    hits: &mut Hits,
) {
    if hits.len() >= MAX_CUBIC_HITS {
        return;
    }
    if !a
        .control_bounds()
        .overlaps(&b.control_bounds(), config.merge_tolerance)
    {
        return;
    }

    let a_flat = a.is_flat(config.flatness_tolerance);
    let b_flat = b.is_flat(config.flatness_tolerance);
    if (a_flat && b_flat) || depth >= config.max_subdivision_depth {
        if let LineHit::Point(hit) = line_line(a.p0, a.p3, b.p0, b.p3, config) {
            let t_a = a_range.0 + hit.t_a * (a_range.1 - a_range.0);
            let t_b = b_range.0 + hit.t_b * (b_range.1 - b_range.0);
            // Neighboring pieces share end points and report the same crossing
            let duplicate = hits
                .iter()
                .any(|h| h.point.distance(hit.point) <= config.merge_tolerance);
            if !duplicate {
                hits.push(Hit {
                    point: hit.point,
                    t_a,
                    t_b,
                });
            }
        }
        return;
    }

    let mid = |r: (f32, f32)| 0.5 * (r.0 + r.1);
    match (a_flat, b_flat) {
        (false, false) => {
            let (a0, a1) = a.split(0.5);
            let (b0, b1) = b.split(0.5);
            let (am, bm) = (mid(a_range), mid(b_range));
            subdivide(&a0, (a_range.0, am), &b0, (b_range.0, bm), depth + 1, config, hits);
            subdivide(&a0, (a_range.0, am), &b1, (bm, b_range.1), depth + 1, config, hits);
            subdivide(&a1, (am, a_range.1), &b0, (b_range.0, bm), depth + 1, config, hits);
            subdivide(&a1, (am, a_range.1), &b1, (bm, b_range.1), depth + 1, config, hits);
        }
        (false, true) => {
            let (a0, a1) = a.split(0.5);
            let am = mid(a_range);
            subdivide(&a0, (a_range.0, am), b, b_range, depth + 1, config, hits);
            subdivide(&a1, (am, a_range.1), b, b_range, depth + 1, config, hits);
        }
        (true, _) => {
            let (b0, b1) = b.split(0.5);
            let bm = mid(b_range);
            subdivide(a, a_range, &b0, (b_range.0, bm), depth + 1, config, hits);
            subdivide(a, a_range, &b1, (bm, b_range.1), depth + 1, config, hits);
        }
    }
}

/// Intersect any two drawable segments. `t_a` belongs to `a`.
pub fn segments(a: &SegmentShape, b: &SegmentShape, config: &OutlineConfig) -> Hits {
    match (a, b) {
        (SegmentShape::Line(a0, a1), SegmentShape::Line(b0, b1)) => {
            let mut hits = Hits::new();
            if let LineHit::Point(hit) = line_line(*a0, *a1, *b0, *b1, config) {
                hits.push(hit);
            }
            hits
        }
        (SegmentShape::Line(p0, p1), SegmentShape::Cubic(c)) => line_cubic(*p0, *p1, c, config),
        (SegmentShape::Cubic(c), SegmentShape::Line(p0, p1)) => line_cubic(*p0, *p1, c, config)
            .into_iter()
            .map(|h| Hit {
                point: h.point,
                t_a: h.t_b,
                t_b: h.t_a,
            })
            .collect(),
        (SegmentShape::Cubic(a), SegmentShape::Cubic(b)) => cubic_cubic(a, b, config),
    }
}
