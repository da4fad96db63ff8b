//! Path storage and representation
//!
//! A [`PathData`] keeps commands and points in two parallel buffers. Each
//! command owns a fixed number of points (see [`Command::point_count`]), so
//! the point index of any command is the sum of the counts before it.
//! `Close` stores the start point of the contour it closes, which makes the
//! closing edge explicit for geometry code.

use std::ops::{Add, Mul, Range, Sub};

use crate::bezier::CubicBez;
use crate::buffer::DynamicBuffer;
use crate::error::{PaintError, Result};
use crate::primitives::Rect;

/// A 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// z component of the 3D cross product
    pub fn cross(self, other: Point) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn approx_eq(self, other: Point, tolerance: f32) -> bool {
        (self.x - other.x).abs() <= tolerance && (self.y - other.y).abs() <= tolerance
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// Path command
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Command {
    MoveTo,
    LineTo,
    /// Two control points followed by the end point
    CubicTo,
    /// Closes the current contour; stores the contour's start point
    Close,
}

impl Command {
    /// Number of points this command consumes
    pub const fn point_count(self) -> usize {
        match self {
            Command::CubicTo => 3,
            Command::MoveTo | Command::LineTo | Command::Close => 1,
        }
    }

    /// Total points consumed by a command sequence
    pub fn points_for(commands: &[Command]) -> usize {
        commands.iter().map(|c| c.point_count()).sum()
    }
}

/// Command and point ranges of one contour inside a path
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContourRange {
    pub commands: Range<usize>,
    pub points: Range<usize>,
}

/// A vector path: ordered commands plus the points they consume
#[derive(Debug, Default, PartialEq)]
pub struct PathData {
    commands: DynamicBuffer<Command>,
    points: DynamicBuffer<Point>,
}

impl PathData {
    pub const fn new() -> Self {
        Self {
            commands: DynamicBuffer::new(),
            points: DynamicBuffer::new(),
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Raw point data, laid out as consecutive `f32` pairs
    pub fn point_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn command_capacity(&self) -> usize {
        self.commands.capacity()
    }

    pub fn point_capacity(&self) -> usize {
        self.points.capacity()
    }

    fn push(&mut self, command: Command, points: &[Point]) -> Result<()> {
        // Grow both buffers before writing either so a failure leaves no trace
        self.commands.reserve(1)?;
        self.points.reserve(points.len())?;
        self.commands.push(command)?;
        for p in points {
            self.points.push(*p)?;
        }
        Ok(())
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> Result<()> {
        self.push(Command::MoveTo, &[Point::new(x, y)])
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> Result<()> {
        self.push(Command::LineTo, &[Point::new(x, y)])
    }

    pub fn cubic_to(&mut self, c1x: f32, c1y: f32, c2x: f32, c2y: f32, x: f32, y: f32) -> Result<()> {
        self.push(
            Command::CubicTo,
            &[Point::new(c1x, c1y), Point::new(c2x, c2y), Point::new(x, y)],
        )
    }

    /// Close the current contour. A close right after a close is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.commands.last() == Some(&Command::Close) {
            return Ok(());
        }
        let start = self.current_contour_start();
        self.push(Command::Close, &[start])
    }

    /// Start point of the contour currently being built
    fn current_contour_start(&self) -> Point {
        let mut end = self.points.len();
        for cmd in self.commands.iter().rev() {
            let start = end - cmd.point_count();
            match cmd {
                // A close remembers its contour start, and drawing after a
                // close without a move continues from that same start
                Command::MoveTo | Command::Close => return self.points[start],
                Command::LineTo | Command::CubicTo => {}
            }
            end = start;
        }
        Point::ZERO
    }

    /// Append raw commands and points in one step.
    ///
    /// The points must match the commands' consumption exactly.
    pub fn append(&mut self, commands: &[Command], points: &[Point]) -> Result<()> {
        let expected = Command::points_for(commands);
        if expected != points.len() {
            return Err(PaintError::InvalidArguments(format!(
                "{} commands consume {} points, got {}",
                commands.len(),
                expected,
                points.len()
            )));
        }
        self.commands
            .reserve_exact(self.commands.len() + commands.len())?;
        self.points.reserve_exact(self.points.len() + points.len())?;
        self.commands.extend_from_slice(commands)?;
        self.points.extend_from_slice(points)?;
        Ok(())
    }

    /// Append the whole of another path
    pub fn append_path(&mut self, other: &PathData) -> Result<()> {
        self.append(other.commands(), other.points())
    }

    /// Replace the contents with a copy of `other`, reusing storage
    pub fn copy_from(&mut self, other: &PathData) -> Result<()> {
        self.commands.reserve_exact(other.commands.len())?;
        self.points.reserve_exact(other.points.len())?;
        self.commands.copy_from_slice_growing(&other.commands)?;
        self.points.copy_from_slice_growing(&other.points)?;
        Ok(())
    }

    /// Clear the content but keep the allocated storage
    pub fn reset(&mut self) {
        self.commands.truncate_to_empty();
        self.points.truncate_to_empty();
    }

    /// Axis-aligned bounds over every recorded point, control points included
    pub fn bounds(&self) -> Option<Rect> {
        Rect::bounding(&self.points)
    }

    pub fn try_clone(&self) -> Result<Self> {
        Ok(Self {
            commands: self.commands.try_clone()?,
            points: self.points.try_clone()?,
        })
    }

    /// Signed area enclosed by the drawable segments, positive for
    /// counter-clockwise contours in a y-up frame.
    pub fn signed_area(&self) -> f32 {
        let twice: f32 = self
            .segments()
            .map(|segment| match segment.shape {
                SegmentShape::Line(a, b) => a.cross(b),
                SegmentShape::Cubic(c) => {
                    (6.0 * c.p0.cross(c.p1)
                        + 3.0 * c.p0.cross(c.p2)
                        + c.p0.cross(c.p3)
                        + 3.0 * c.p1.cross(c.p2)
                        + 3.0 * c.p1.cross(c.p3)
                        + 6.0 * c.p2.cross(c.p3))
                        / 10.0
                }
            })
            .sum();
        twice / 2.0
    }

    /// Copy of the path with every contour traced the other way round.
    ///
    /// Contours keep their order and start point, and always come out closed.
    pub fn reversed(&self) -> Result<PathData> {
        let mut segments = Vec::new();
        segments.try_reserve_exact(self.commands.len())?;
        segments.extend(self.segments());

        let mut out = PathData::new();
        out.commands.reserve_exact(self.commands.len())?;
        out.points.reserve_exact(self.points.len())?;
        let mut first = 0;
        while first < segments.len() {
            let contour = segments[first].contour;
            let mut last = first;
            while last < segments.len() && segments[last].contour == contour {
                last += 1;
            }
            let run = &segments[first..last];
            let origin = run[0].shape.from();
            out.move_to(origin.x, origin.y)?;
            for (i, segment) in run.iter().enumerate().rev() {
                match segment.shape {
                    // The edge back to the origin becomes the closing edge
                    SegmentShape::Line(..) if i == 0 => {}
                    SegmentShape::Line(from, _) => out.line_to(from.x, from.y)?,
                    SegmentShape::Cubic(c) => {
                        out.cubic_to(c.p2.x, c.p2.y, c.p1.x, c.p1.y, c.p0.x, c.p0.y)?
                    }
                }
            }
            out.close()?;
            first = last;
        }
        Ok(out)
    }

    /// Ranges of the last contour: everything after the previous close.
    ///
    /// Fails with `UnterminatedContour` unless the path ends with `Close`.
    pub fn last_contour(&self) -> Result<ContourRange> {
        if self.commands.last() != Some(&Command::Close) {
            return Err(PaintError::UnterminatedContour);
        }
        let cmd_end = self.commands.len();
        let pts_end = self.points.len();
        let mut cmd_start = cmd_end - 1;
        let mut pts_start = pts_end - Command::Close.point_count();
        while cmd_start > 0 {
            let prev = self.commands[cmd_start - 1];
            if prev == Command::Close {
                break;
            }
            cmd_start -= 1;
            pts_start -= prev.point_count();
        }
        Ok(ContourRange {
            commands: cmd_start..cmd_end,
            points: pts_start..pts_end,
        })
    }

    /// Iterate over contour ranges in order
    pub fn contours(&self) -> Contours<'_> {
        Contours {
            path: self,
            command: 0,
            point: 0,
        }
    }

    /// Iterate over drawable segments (lines, cubics and non-empty closing edges)
    pub fn segments(&self) -> Segments<'_> {
        Segments {
            path: self,
            command: 0,
            point: 0,
            contour: 0,
            start: Point::ZERO,
            current: Point::ZERO,
        }
    }

    /// Insert a run of commands and points in one step.
    ///
    /// Used by splicing; callers keep the point-count invariant.
    pub(crate) fn insert_run(
        &mut self,
        command_at: usize,
        commands: &[Command],
        point_at: usize,
        points: &[Point],
    ) -> Result<()> {
        debug_assert_eq!(Command::points_for(commands), points.len());
        self.commands.reserve(commands.len())?;
        self.points.reserve(points.len())?;
        self.commands.insert_slice(command_at, commands)?;
        self.points.insert_slice(point_at, points)?;
        Ok(())
    }

    pub(crate) fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }
}

/// Iterator over [`ContourRange`]s, see [`PathData::contours`]
pub struct Contours<'a> {
    path: &'a PathData,
    command: usize,
    point: usize,
}

impl Iterator for Contours<'_> {
    type Item = ContourRange;

    fn next(&mut self) -> Option<ContourRange> {
        let commands = self.path.commands();
        if self.command >= commands.len() {
            return None;
        }
        let cmd_start = self.command;
        let pts_start = self.point;
        while self.command < commands.len() {
            let cmd = commands[self.command];
            // A move starts a new contour unless it is the first command of this one
            if cmd == Command::MoveTo && self.command != cmd_start {
                break;
            }
            self.command += 1;
            self.point += cmd.point_count();
            if cmd == Command::Close {
                break;
            }
        }
        Some(ContourRange {
            commands: cmd_start..self.command,
            points: pts_start..self.point,
        })
    }
}

/// Geometry of one drawable segment
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentShape {
    Line(Point, Point),
    Cubic(CubicBez),
}

impl SegmentShape {
    pub fn from(&self) -> Point {
        match self {
            SegmentShape::Line(from, _) => *from,
            SegmentShape::Cubic(c) => c.p0,
        }
    }

    pub fn to(&self) -> Point {
        match self {
            SegmentShape::Line(_, to) => *to,
            SegmentShape::Cubic(c) => c.p3,
        }
    }

    pub fn eval(&self, t: f32) -> Point {
        match self {
            SegmentShape::Line(from, to) => from.lerp(*to, t),
            SegmentShape::Cubic(c) => c.eval(t),
        }
    }

    /// Bounds of the defining points (control points included)
    pub fn control_bounds(&self) -> Rect {
        match self {
            SegmentShape::Line(from, to) => Rect::from_points(*from, *to),
            SegmentShape::Cubic(c) => c.control_bounds(),
        }
    }
}

/// A drawable segment and where it lives in its path
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    /// Index of the command that draws this segment
    pub command: usize,
    /// Index of that command's first point
    pub point: usize,
    /// Ordinal of the contour the segment belongs to
    pub contour: usize,
    pub shape: SegmentShape,
}

/// Iterator over [`Segment`]s, see [`PathData::segments`]
pub struct Segments<'a> {
    path: &'a PathData,
    command: usize,
    point: usize,
    contour: usize,
    start: Point,
    current: Point,
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let commands = self.path.commands();
        let points = self.path.points();
        while self.command < commands.len() {
            let index = self.command;
            let p = self.point;
            let cmd = commands[index];
            self.command += 1;
            self.point += cmd.point_count();

            let shape = match cmd {
                Command::MoveTo => {
                    if index > 0 && commands[index - 1] != Command::Close {
                        self.contour += 1;
                    }
                    self.start = points[p];
                    self.current = self.start;
                    continue;
                }
                Command::LineTo => {
                    let shape = SegmentShape::Line(self.current, points[p]);
                    self.current = points[p];
                    shape
                }
                Command::CubicTo => {
                    let shape = SegmentShape::Cubic(CubicBez::new(
                        self.current,
                        points[p],
                        points[p + 1],
                        points[p + 2],
                    ));
                    self.current = points[p + 2];
                    shape
                }
                Command::Close => {
                    let from = self.current;
                    let to = points[p];
                    self.current = to;
                    self.start = to;
                    let contour = self.contour;
                    self.contour += 1;
                    // The implicit closing edge only counts when it has length
                    if from == to {
                        continue;
                    }
                    return Some(Segment {
                        command: index,
                        point: p,
                        contour,
                        shape: SegmentShape::Line(from, to),
                    });
                }
            };
            return Some(Segment {
                command: index,
                point: p,
                contour: self.contour,
                shape,
            });
        }
        None
    }
}
