//! Incremental stroke outline merging
//!
//! A [`StrokeOutline`] folds successive closed contours into one outline.
//! Each update runs three phases:
//!
//! 1. **Scan**: every drawable segment of the accumulated outline is
//!    intersected with every drawable segment of the incoming contour. A
//!    crossing contour wound against the outline is reversed and rescanned.
//! 2. **Splice**: both paths are cut at the recorded intersections, so every
//!    crossing becomes a shared vertex. Cuts are applied from the highest
//!    command index down, which keeps the indexes of pending cuts valid.
//! 3. **Walk**: each edge is classified as inside or outside the other path
//!    with a parity ray cast, and outside edges are chained into closed
//!    contours, switching paths at shared vertices.
//!
//! If the scan finds nothing, the outline is the plain union of both paths.

use smallvec::SmallVec;

use crate::bezier::CubicBez;
use crate::config::OutlineConfig;
use crate::error::{PaintError, Result};
use crate::intersect::{self, line_cubic_params};
use crate::path::{Command, PathData, Point, Segment, SegmentShape};
use crate::primitives::Rect;

/// Where an intersection sits on one of the two paths
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentRef {
    /// Index of the command drawing the segment
    pub command: usize,
    /// Index of that command's first point
    pub point: usize,
    /// Parameter along the segment
    pub t: f32,
}

/// A crossing between the accumulated outline and the incoming contour
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub point: Point,
    pub accumulated: SegmentRef,
    pub incoming: SegmentRef,
}

/// Incremental outline state for one stroked shape
#[derive(Debug)]
pub struct StrokeOutline {
    config: OutlineConfig,
    accumulated: PathData,
    incoming: PathData,
    outline: PathData,
    intersections: Vec<Intersection>,
}

impl StrokeOutline {
    /// Seed the outline with `first`, taken verbatim
    pub fn new(first: &PathData) -> Result<Self> {
        Self::with_config(first, OutlineConfig::default())
    }

    pub fn with_config(first: &PathData, config: OutlineConfig) -> Result<Self> {
        if first.is_empty() {
            return Err(PaintError::EmptyPath);
        }
        Ok(Self {
            config,
            accumulated: first.try_clone()?,
            incoming: PathData::new(),
            outline: first.try_clone()?,
            intersections: Vec::new(),
        })
    }

    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// The running outline as of the last update, after splicing
    pub fn accumulated(&self) -> &PathData {
        &self.accumulated
    }

    /// The contour merged by the last update, after splicing
    pub fn incoming(&self) -> &PathData {
        &self.incoming
    }

    /// The merged result
    pub fn outline(&self) -> &PathData {
        &self.outline
    }

    /// Crossings recorded by the last update
    pub fn intersections(&self) -> &[Intersection] {
        &self.intersections
    }

    /// Merge the last contour of `path` into the outline.
    ///
    /// On error the previous outline is kept.
    pub fn update(&mut self, path: &PathData) -> Result<()> {
        self.extract_last_contour(path)?;
        self.accumulated.copy_from(&self.outline)?;
        self.scan()?;
        if !self.intersections.is_empty() && self.match_winding()? {
            self.scan()?;
        }

        if self.intersections.is_empty() {
            let merged = self.plain_union()?;
            tracing::debug!(
                commands = merged.commands().len(),
                "Outline has no crossings, appending contour"
            );
            self.outline = merged;
            return Ok(());
        }

        let mut cuts = Vec::new();
        cuts.try_reserve_exact(self.intersections.len())?;
        cuts.extend(self.intersections.iter().map(|i| Cut::new(&i.accumulated, i.point)));
        let added_accumulated = splice(&mut self.accumulated, &mut cuts, &self.config)?;

        cuts.clear();
        cuts.extend(self.intersections.iter().map(|i| Cut::new(&i.incoming, i.point)));
        let added_incoming = splice(&mut self.incoming, &mut cuts, &self.config)?;

        tracing::debug!(
            intersections = self.intersections.len(),
            added_accumulated,
            added_incoming,
            "Spliced outline paths"
        );

        let mut merged = self.walk()?;
        if merged.is_empty() {
            tracing::debug!("Outline walk produced nothing, falling back to union");
            merged = self.plain_union()?;
        }
        self.outline = merged;
        Ok(())
    }

    /// Copy the last closed contour of `path` into the incoming scratch path
    pub fn extract_last_contour(&mut self, path: &PathData) -> Result<()> {
        let range = path.last_contour()?;
        let commands = &path.commands()[range.commands];
        let points = &path.points()[range.points];

        self.incoming.reset();
        // A contour drawn on after a close starts at the recorded close point
        if commands.first() != Some(&Command::MoveTo) {
            if let Some(start) = points.last() {
                self.incoming.move_to(start.x, start.y)?;
            }
        }
        self.incoming.append(commands, points)
    }

    /// Trace the incoming contour in the accumulated outline's direction so
    /// kept edges of both paths chain head to tail. Returns whether it flipped.
    fn match_winding(&mut self) -> Result<bool> {
        let accumulated = self.accumulated.signed_area();
        let incoming = self.incoming.signed_area();
        if accumulated * incoming >= 0.0 {
            return Ok(false);
        }
        tracing::debug!(accumulated, incoming, "Reversing incoming contour");
        self.incoming = self.incoming.reversed()?;
        Ok(true)
    }

    fn scan(&mut self) -> Result<()> {
        self.intersections.clear();
        let config = self.config;
        for a in self.accumulated.segments() {
            let a_bounds = a.shape.control_bounds();
            for b in self.incoming.segments() {
                if !a_bounds.overlaps(&b.shape.control_bounds(), config.merge_tolerance) {
                    continue;
                }
                let hits = intersect::segments(&a.shape, &b.shape, &config);
                tracing::trace!(
                    accumulated = a.command,
                    incoming = b.command,
                    hits = hits.len(),
                    "Compared segments"
                );
                for hit in hits {
                    record(&mut self.intersections, &config, hit, &a, &b)?;
                }
            }
        }
        tracing::debug!(count = self.intersections.len(), "Intersection scan done");
        Ok(())
    }

    fn plain_union(&self) -> Result<PathData> {
        let mut merged = self.accumulated.try_clone()?;
        merged.append_path(&self.incoming)?;
        Ok(merged)
    }

    fn walk(&self) -> Result<PathData> {
        let mut edges: Vec<Edge> = Vec::new();
        collect_edges(&mut edges, Owner::Accumulated, &self.accumulated, &self.incoming, &self.config)?;
        collect_edges(&mut edges, Owner::Incoming, &self.incoming, &self.accumulated, &self.config)?;

        let mut visited = Vec::new();
        visited.try_reserve_exact(edges.len())?;
        visited.resize(edges.len(), false);

        let tol = self.config.merge_tolerance;
        let mut merged = PathData::new();
        for start in 0..edges.len() {
            if !edges[start].keep || visited[start] {
                continue;
            }
            let origin = edges[start].shape.from();
            merged.move_to(origin.x, origin.y)?;

            let mut current = start;
            loop {
                visited[current] = true;
                let shape = edges[current].shape;
                let end = shape.to();
                let closes = end.approx_eq(origin, tol);
                match shape {
                    SegmentShape::Line(..) if closes => merged.close()?,
                    SegmentShape::Line(..) => merged.line_to(end.x, end.y)?,
                    SegmentShape::Cubic(c) => {
                        merged.cubic_to(c.p1.x, c.p1.y, c.p2.x, c.p2.y, end.x, end.y)?;
                        if closes {
                            merged.close()?;
                        }
                    }
                }
                if closes {
                    break;
                }
                match next_edge(&edges, &visited, current, end, tol) {
                    Some(next) => current = next,
                    None => {
                        merged.close()?;
                        break;
                    }
                }
            }
        }
        tracing::debug!(
            edges = edges.len(),
            commands = merged.commands().len(),
            "Outline walk done"
        );
        Ok(merged)
    }

    pub fn try_clone(&self) -> Result<Self> {
        let mut intersections = Vec::new();
        intersections.try_reserve_exact(self.intersections.len())?;
        intersections.extend_from_slice(&self.intersections);
        Ok(Self {
            config: self.config,
            accumulated: self.accumulated.try_clone()?,
            incoming: self.incoming.try_clone()?,
            outline: self.outline.try_clone()?,
            intersections,
        })
    }
}

fn record(
    list: &mut Vec<Intersection>,
    config: &OutlineConfig,
    hit: intersect::Hit,
    a: &Segment,
    b: &Segment,
) -> Result<()> {
    if list
        .iter()
        .any(|i| i.point.distance(hit.point) <= config.merge_tolerance)
    {
        return Ok(());
    }
    list.try_reserve(1)?;
    list.push(Intersection {
        point: hit.point,
        accumulated: SegmentRef {
            command: a.command,
            point: a.point,
            t: hit.t_a,
        },
        incoming: SegmentRef {
            command: b.command,
            point: b.point,
            t: hit.t_b,
        },
    });
    Ok(())
}

/// A pending cut of one segment
#[derive(Clone, Copy, Debug)]
struct Cut {
    command: usize,
    point: usize,
    t: f32,
    at: Point,
}

impl Cut {
    fn new(segment: &SegmentRef, at: Point) -> Self {
        Self {
            command: segment.command,
            point: segment.point,
            t: segment.t,
            at,
        }
    }
}

/// Cut `path` at every entry of `cuts`, returning the number of commands added
fn splice(path: &mut PathData, cuts: &mut [Cut], config: &OutlineConfig) -> Result<usize> {
    cuts.sort_by(|a, b| b.command.cmp(&a.command).then(a.t.total_cmp(&b.t)));

    let tol = config.param_tolerance;
    let mut added = 0;
    let mut i = 0;
    while i < cuts.len() {
        let command = cuts[i].command;
        let point = cuts[i].point;
        let mut j = i;
        while j < cuts.len() && cuts[j].command == command {
            j += 1;
        }

        // Ends already are vertices, and near-equal cuts collapse into one
        let mut group: SmallVec<[Cut; 4]> = SmallVec::new();
        for cut in &cuts[i..j] {
            if cut.t <= tol || cut.t >= 1.0 - tol {
                continue;
            }
            if group.last().is_some_and(|last: &Cut| cut.t - last.t <= tol) {
                continue;
            }
            group.push(*cut);
        }
        i = j;
        if group.is_empty() {
            continue;
        }

        let kind = path.commands()[command];
        match kind {
            Command::LineTo | Command::Close => {
                let commands: SmallVec<[Command; 4]> =
                    group.iter().map(|_| Command::LineTo).collect();
                let points: SmallVec<[Point; 4]> = group.iter().map(|c| c.at).collect();
                path.insert_run(command, &commands, point, &points)?;
            }
            Command::CubicTo => {
                let from = point.checked_sub(1).map_or(Point::ZERO, |p| path.points()[p]);
                let pts = path.points();
                let mut rest = CubicBez::new(from, pts[point], pts[point + 1], pts[point + 2]);
                let mut prev = 0.0;
                let mut points: SmallVec<[Point; 12]> = SmallVec::new();
                for cut in &group {
                    let local = (cut.t - prev) / (1.0 - prev);
                    let (mut head, mut tail) = rest.split(local);
                    head.p3 = cut.at;
                    tail.p0 = cut.at;
                    points.extend([head.p1, head.p2, head.p3]);
                    rest = tail;
                    prev = cut.t;
                }
                let commands: SmallVec<[Command; 4]> =
                    group.iter().map(|_| Command::CubicTo).collect();
                path.insert_run(command, &commands, point, &points)?;
                let tail_at = point + points.len();
                let pts = path.points_mut();
                pts[tail_at] = rest.p1;
                pts[tail_at + 1] = rest.p2;
            }
            Command::MoveTo => {
                tracing::warn!(command, "Ignoring cut on a move command");
                continue;
            }
        }
        added += group.len();
    }
    Ok(added)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Owner {
    Accumulated,
    Incoming,
}

#[derive(Clone, Copy, Debug)]
struct Edge {
    owner: Owner,
    shape: SegmentShape,
    /// Index of the first edge of this edge's contour
    first: usize,
    /// One past the last edge of this edge's contour
    last: usize,
    keep: bool,
}

/// Push the edges of `path`, classified against `other`
fn collect_edges(
    edges: &mut Vec<Edge>,
    owner: Owner,
    path: &PathData,
    other: &PathData,
    config: &OutlineConfig,
) -> Result<()> {
    let Some(other_bounds) = other.bounds() else {
        return Ok(());
    };
    let reference = reference_point(&other_bounds);

    let mut contour = None;
    let mut first = edges.len();
    for segment in path.segments() {
        if contour != Some(segment.contour) {
            let len = edges.len();
            seal_contour(&mut edges[first..], len);
            contour = Some(segment.contour);
            first = edges.len();
        }
        let mid = segment.shape.eval(0.5);
        let keep = if on_boundary(mid, other, config.merge_tolerance) {
            // Shared boundary is emitted once, from the accumulated side
            owner == Owner::Accumulated
        } else {
            !inside(mid, other, reference)
        };
        edges.try_reserve(1)?;
        edges.push(Edge {
            owner,
            shape: segment.shape,
            first,
            last: first,
            keep,
        });
    }
    let len = edges.len();
    seal_contour(&mut edges[first..], len);
    Ok(())
}

fn seal_contour(edges: &mut [Edge], last: usize) {
    for edge in edges {
        edge.last = last;
    }
}

fn successor(edges: &[Edge], index: usize) -> usize {
    let edge = &edges[index];
    if index + 1 < edge.last {
        index + 1
    } else {
        edge.first
    }
}

fn next_edge(edges: &[Edge], visited: &[bool], current: usize, end: Point, tol: f32) -> Option<usize> {
    let owner = edges[current].owner;
    let open = |i: usize| edges[i].keep && !visited[i] && edges[i].shape.from().approx_eq(end, tol);

    // Switch paths at a shared vertex
    if let Some(other) = (0..edges.len()).find(|&i| edges[i].owner != owner && open(i)) {
        return Some(other);
    }
    let next = successor(edges, current);
    if open(next) {
        return Some(next);
    }
    (0..edges.len()).find(|&i| open(i))
}

/// A point outside `bounds`, offset unevenly so rays rarely graze vertices
fn reference_point(bounds: &Rect) -> Point {
    Point::new(
        bounds.x - 1.0 - 0.5 * bounds.width,
        bounds.y - 1.0 - 0.37 * bounds.height - 0.013,
    )
}

/// Parity test: odd crossings between `point -> reference` and `path` mean inside.
///
/// Edge parameters count on `[0, 1)` so a ray through a shared vertex is
/// counted once.
fn inside(point: Point, path: &PathData, reference: Point) -> bool {
    let mut crossings = 0usize;
    for segment in path.segments() {
        match segment.shape {
            SegmentShape::Line(q0, q1) => {
                if ray_crosses_line(point, reference, q0, q1) {
                    crossings += 1;
                }
            }
            SegmentShape::Cubic(c) => {
                crossings += line_cubic_params(point, reference, &c, f32::EPSILON)
                    .iter()
                    .filter(|(s, t)| (0.0..=1.0).contains(s) && (0.0..1.0).contains(t))
                    .count();
            }
        }
    }
    crossings % 2 == 1
}

fn ray_crosses_line(from: Point, to: Point, q0: Point, q1: Point) -> bool {
    let r = to - from;
    let e = q1 - q0;
    let denom = r.cross(e);
    if denom == 0.0 {
        return false;
    }
    let w = q0 - from;
    let s = w.cross(e) / denom;
    let t = w.cross(r) / denom;
    (0.0..=1.0).contains(&s) && (0.0..1.0).contains(&t)
}

fn distance_to_line(p: Point, a: Point, b: Point) -> f32 {
    let d = b - a;
    let len2 = d.x * d.x + d.y * d.y;
    if len2 == 0.0 {
        return p.distance(a);
    }
    let v = p - a;
    let t = ((v.x * d.x + v.y * d.y) / len2).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}

/// Whether `point` lies on any segment of `path`, within `tolerance`
fn on_boundary(point: Point, path: &PathData, tolerance: f32) -> bool {
    const CUBIC_STEPS: usize = 16;
    path.segments().any(|segment| match segment.shape {
        SegmentShape::Line(a, b) => distance_to_line(point, a, b) <= tolerance,
        SegmentShape::Cubic(c) => {
            if !c.control_bounds().contains(point) {
                return false;
            }
            let mut prev = c.p0;
            (1..=CUBIC_STEPS).any(|i| {
                let next = c.eval(i as f32 / CUBIC_STEPS as f32);
                let hit = distance_to_line(point, prev, next) <= tolerance;
                prev = next;
                hit
            })
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> PathData {
        let mut path = PathData::new();
        path.move_to(x, y).unwrap();
        path.line_to(x + size, y).unwrap();
        path.line_to(x + size, y + size).unwrap();
        path.line_to(x, y + size).unwrap();
        path.close().unwrap();
        path
    }

    #[test]
    fn test_new_rejects_empty_seed() {
        assert_eq!(
            StrokeOutline::new(&PathData::new()).unwrap_err(),
            PaintError::EmptyPath
        );
    }

    #[test]
    fn test_seed_is_verbatim() {
        let first = square(0.0, 0.0, 10.0);
        let outline = StrokeOutline::new(&first).unwrap();
        assert_eq!(outline.outline(), &first);
        assert_eq!(outline.accumulated(), &first);
        assert!(outline.intersections().is_empty());
    }

    #[test]
    fn test_unterminated_contour_keeps_outline() {
        let first = square(0.0, 0.0, 10.0);
        let mut outline = StrokeOutline::new(&first).unwrap();
        let mut open = PathData::new();
        open.move_to(5.0, 5.0).unwrap();
        open.line_to(20.0, 5.0).unwrap();
        assert_eq!(outline.update(&open), Err(PaintError::UnterminatedContour));
        assert_eq!(outline.outline(), &first);
    }

    #[test]
    fn test_extract_last_contour_only() {
        let mut path = square(0.0, 0.0, 1.0);
        path.append_path(&square(5.0, 5.0, 2.0)).unwrap();
        let mut outline = StrokeOutline::new(&square(0.0, 0.0, 1.0)).unwrap();
        outline.extract_last_contour(&path).unwrap();
        assert_eq!(outline.incoming(), &square(5.0, 5.0, 2.0));
    }

    #[test]
    fn test_extract_contour_without_move() {
        let mut path = square(0.0, 0.0, 4.0);
        path.line_to(2.0, -3.0).unwrap();
        path.close().unwrap();
        let mut outline = StrokeOutline::new(&path).unwrap();
        outline.extract_last_contour(&path).unwrap();
        assert_eq!(
            outline.incoming().commands(),
            &[Command::MoveTo, Command::LineTo, Command::Close]
        );
        assert_eq!(outline.incoming().points()[0], Point::new(0.0, 0.0));
    }

    #[test]
    fn test_splice_line_inserts_in_order() {
        let mut path = square(0.0, 0.0, 10.0);
        let mut cuts = [
            Cut {
                command: 1,
                point: 1,
                t: 0.7,
                at: Point::new(7.0, 0.0),
            },
            Cut {
                command: 1,
                point: 1,
                t: 0.2,
                at: Point::new(2.0, 0.0),
            },
            Cut {
                command: 3,
                point: 3,
                t: 0.5,
                at: Point::new(5.0, 10.0),
            },
        ];
        let added = splice(&mut path, &mut cuts, &OutlineConfig::default()).unwrap();
        assert_eq!(added, 3);
        assert_eq!(path.commands().len(), 8);
        assert_eq!(
            path.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(7.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 10.0),
                Point::new(5.0, 10.0),
                Point::new(0.0, 10.0),
                Point::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_splice_skips_end_cuts() {
        let mut path = square(0.0, 0.0, 10.0);
        let mut cuts = [Cut {
            command: 2,
            point: 2,
            t: 1.0,
            at: Point::new(10.0, 10.0),
        }];
        assert_eq!(splice(&mut path, &mut cuts, &OutlineConfig::default()).unwrap(), 0);
        assert_eq!(path, square(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_splice_cubic_keeps_shape() {
        let mut path = PathData::new();
        path.move_to(0.0, 0.0).unwrap();
        path.cubic_to(0.0, 10.0, 10.0, 10.0, 10.0, 0.0).unwrap();
        path.close().unwrap();
        let curve = CubicBez::new(
            Point::new(0.0, 0.0),
            Point::new(0.0, 10.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
        );

        let mut cuts = [
            Cut {
                command: 1,
                point: 1,
                t: 0.75,
                at: curve.eval(0.75),
            },
            Cut {
                command: 1,
                point: 1,
                t: 0.25,
                at: curve.eval(0.25),
            },
        ];
        splice(&mut path, &mut cuts, &OutlineConfig::default()).unwrap();
        assert_eq!(
            path.commands(),
            &[
                Command::MoveTo,
                Command::CubicTo,
                Command::CubicTo,
                Command::CubicTo,
                Command::Close
            ]
        );
        assert_eq!(path.points().len(), 1 + 9 + 1);
        assert_eq!(path.points()[3], curve.eval(0.25));
        assert_eq!(path.points()[6], curve.eval(0.75));
        assert_eq!(path.points()[9], Point::new(10.0, 0.0));

        // The middle piece still traces the original curve
        let pts = path.points();
        let middle = CubicBez::new(pts[3], pts[4], pts[5], pts[6]);
        assert!(middle.eval(0.5).approx_eq(curve.eval(0.5), 1e-4));
    }

    #[test]
    fn test_parity() {
        let sq = square(0.0, 0.0, 10.0);
        let reference = reference_point(&sq.bounds().unwrap());
        assert!(inside(Point::new(5.0, 5.0), &sq, reference));
        assert!(inside(Point::new(9.9, 0.1), &sq, reference));
        assert!(!inside(Point::new(15.0, 5.0), &sq, reference));
        assert!(!inside(Point::new(-1.0, 5.0), &sq, reference));
        assert!(on_boundary(Point::new(10.0, 5.0), &sq, 1e-3));
        assert!(!on_boundary(Point::new(9.0, 5.0), &sq, 1e-3));
    }

    #[test]
    fn test_overlapping_squares_merge() {
        let mut outline = StrokeOutline::new(&square(0.0, 0.0, 10.0)).unwrap();
        outline.update(&square(5.0, 5.0, 10.0)).unwrap();
        assert_eq!(outline.intersections().len(), 2);

        let merged = outline.outline();
        assert_eq!(merged.commands().len(), 9);
        assert_eq!(merged.commands()[0], Command::MoveTo);
        assert_eq!(merged.commands()[8], Command::Close);
        let expected = [
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (15.0, 5.0),
            (15.0, 15.0),
            (5.0, 15.0),
            (5.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ];
        for (got, (x, y)) in merged.points().iter().zip(expected) {
            assert!(got.approx_eq(Point::new(x, y), 1e-4), "{got:?} vs ({x}, {y})");
        }
    }

    #[test]
    fn test_contained_contour_is_absorbed() {
        let mut outline = StrokeOutline::new(&square(0.0, 0.0, 10.0)).unwrap();
        // Crosses the right edge, so the scan has work to do
        outline.update(&square(8.0, 2.0, 4.0)).unwrap();
        let merged = outline.outline();
        assert_eq!(merged.contours().count(), 1);
        let bounds = merged.bounds().unwrap();
        assert_eq!(bounds, Rect::new(0.0, 0.0, 12.0, 10.0));
    }

    #[test]
    fn test_try_clone_is_independent() {
        let mut outline = StrokeOutline::new(&square(0.0, 0.0, 10.0)).unwrap();
        let copy = outline.try_clone().unwrap();
        outline.update(&square(5.0, 5.0, 10.0)).unwrap();
        assert_eq!(copy.outline(), &square(0.0, 0.0, 10.0));
        assert!(copy.intersections().is_empty());
    }
}
