use strata_paint::{Command, OutlineConfig, PathData, Point, Rect, StrokeOutline};

fn rect(path: &mut PathData, x0: f32, y0: f32, x1: f32, y1: f32) {
    path.move_to(x0, y0).unwrap();
    path.line_to(x1, y0).unwrap();
    path.line_to(x1, y1).unwrap();
    path.line_to(x0, y1).unwrap();
    path.close().unwrap();
}

fn rect_path(x0: f32, y0: f32, x1: f32, y1: f32) -> PathData {
    let mut path = PathData::new();
    rect(&mut path, x0, y0, x1, y1);
    path
}

#[test]
fn disjoint_contours_record_no_intersections() {
    let first = rect_path(0.0, 0.0, 10.0, 10.0);
    let second = rect_path(100.0, 100.0, 110.0, 110.0);

    let mut outline = StrokeOutline::new(&first).unwrap();
    outline.update(&second).unwrap();

    assert!(outline.intersections().is_empty());
    assert_eq!(outline.accumulated(), &first);
    assert_eq!(outline.incoming(), &second);

    let merged = outline.outline();
    assert_eq!(merged.commands().len(), 10);
    assert_eq!(&merged.commands()[..5], first.commands());
    assert_eq!(&merged.points()[5..], second.points());
}

#[test]
fn single_crossing_adds_one_vertex_per_path() {
    let mut horizontal = PathData::new();
    horizontal.move_to(0.0, 5.0).unwrap();
    horizontal.line_to(10.0, 5.0).unwrap();
    horizontal.close().unwrap();

    let mut vertical = PathData::new();
    vertical.move_to(5.0, 0.0).unwrap();
    vertical.line_to(5.0, 10.0).unwrap();
    vertical.close().unwrap();

    let mut outline = StrokeOutline::new(&horizontal).unwrap();
    outline.update(&vertical).unwrap();

    assert_eq!(outline.intersections().len(), 1);
    let crossing = outline.intersections()[0];
    assert!(crossing.point.approx_eq(Point::new(5.0, 5.0), 1e-5));
    assert!((crossing.accumulated.t - 0.5).abs() < 1e-5);
    assert!((crossing.incoming.t - 0.5).abs() < 1e-5);

    for (spliced, original) in [
        (outline.accumulated(), &horizontal),
        (outline.incoming(), &vertical),
    ] {
        assert_eq!(spliced.commands().len(), original.commands().len() + 1);
        assert_eq!(spliced.points().len(), original.points().len() + 1);
        assert!(spliced.points()[1].approx_eq(Point::new(5.0, 5.0), 1e-5));
    }
}

#[test]
fn overlapping_squares_merge_into_one_contour() {
    let mut outline = StrokeOutline::new(&rect_path(0.0, 0.0, 10.0, 10.0)).unwrap();
    outline.update(&rect_path(5.0, 5.0, 15.0, 15.0)).unwrap();

    let merged = outline.outline();
    assert_eq!(merged.contours().count(), 1);
    assert_eq!(merged.bounds(), Some(Rect::new(0.0, 0.0, 15.0, 15.0)));
    // Interior corners of both squares are gone
    assert!(!merged.points().contains(&Point::new(10.0, 10.0)));
    assert!(!merged.points().contains(&Point::new(5.0, 5.0)));
}

#[test]
fn updates_chain_through_the_previous_outline() {
    // The stencil sequence of a stroke: each call passes the whole path so far
    let mut path = rect_path(0.0, 0.0, 10.0, 10.0);
    let mut outline = StrokeOutline::new(&path).unwrap();

    rect(&mut path, 5.0, 5.0, 15.0, 15.0);
    outline.update(&path).unwrap();
    rect(&mut path, 12.0, 12.0, 20.0, 20.0);
    outline.update(&path).unwrap();

    let merged = outline.outline();
    assert_eq!(merged.contours().count(), 1);
    assert_eq!(merged.bounds(), Some(Rect::new(0.0, 0.0, 20.0, 20.0)));
    assert_eq!(merged.commands().last(), Some(&Command::Close));
}

#[test]
fn curved_contours_merge() {
    let mut circle = PathData::new();
    // Circle of radius 5 around (10, 5) from four cubics
    let k = 5.0 * 0.552_284;
    circle.move_to(15.0, 5.0).unwrap();
    circle.cubic_to(15.0, 5.0 + k, 10.0 + k, 10.0, 10.0, 10.0).unwrap();
    circle.cubic_to(10.0 - k, 10.0, 5.0, 5.0 + k, 5.0, 5.0).unwrap();
    circle.cubic_to(5.0, 5.0 - k, 10.0 - k, 0.0, 10.0, 0.0).unwrap();
    circle.cubic_to(10.0 + k, 0.0, 15.0, 5.0 - k, 15.0, 5.0).unwrap();
    circle.close().unwrap();

    let config = OutlineConfig::default().with_flatness_tolerance(1e-3);
    let mut outline = StrokeOutline::with_config(&rect_path(0.0, 0.0, 8.0, 10.0), config).unwrap();
    outline.update(&circle).unwrap();

    assert_eq!(outline.intersections().len(), 2);
    let merged = outline.outline();
    assert_eq!(merged.contours().count(), 1);
    let bounds = merged.bounds().unwrap();
    assert!((bounds.x - 0.0).abs() < 1e-4);
    assert!((bounds.max().x - 15.0).abs() < 1e-4);
    assert!(merged.commands().contains(&Command::CubicTo));
}

#[test]
fn opposite_winding_contours_merge_into_one_contour() {
    let mut outline = StrokeOutline::new(&rect_path(0.0, 0.0, 10.0, 10.0)).unwrap();

    // Same square as the overlapping case, traced the other way round
    let mut clockwise = PathData::new();
    clockwise.move_to(5.0, 5.0).unwrap();
    clockwise.line_to(5.0, 15.0).unwrap();
    clockwise.line_to(15.0, 15.0).unwrap();
    clockwise.line_to(15.0, 5.0).unwrap();
    clockwise.close().unwrap();
    outline.update(&clockwise).unwrap();

    assert_eq!(outline.intersections().len(), 2);
    let merged = outline.outline();
    assert_eq!(merged.contours().count(), 1);
    assert_eq!(merged.commands().len(), 9);
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
