use kurbo::Shape as _;

use super::*;

fn spot() -> Rect {
    Rect::from_origin_size((100.0, 200.0), (50.0, 50.0))
}

#[test]
fn circle_uses_larger_side_and_margin() {
    let SpotGeometry::Circle { center, radius } =
        spot_geometry(spot(), Shape::Spotlight, &ShapeProperties::default())
    else {
        panic!("expected circle");
    };
    assert_eq!(center, Point::new(125.0, 225.0));
    assert!((radius - 28.75).abs() < 1e-9);

    let wide = Rect::from_origin_size((0.0, 0.0), (80.0, 20.0));
    let SpotGeometry::Circle { radius, .. } =
        spot_geometry(wide, Shape::Spotlight, &ShapeProperties::default())
    else {
        panic!("expected circle");
    };
    assert!((radius - 46.0).abs() < 1e-9);
}

#[test]
fn rectangle_grows_by_border_and_passes_radii() {
    let props = ShapeProperties {
        border_width: 5.0,
        horizontal_radius: 8.0,
        vertical_radius: 4.0,
    };
    let g = spot_geometry(spot(), Shape::Rectangle, &props);
    assert_eq!(
        g,
        SpotGeometry::Rect {
            rect: Rect::new(95.0, 195.0, 155.0, 255.0),
            horizontal_radius: 8.0,
            vertical_radius: 4.0,
        }
    );
    assert_eq!(g.bounds().width(), 60.0);
    assert_eq!(g.shape(), Shape::Rectangle);
}

#[test]
fn geometry_is_deterministic() {
    let props = ShapeProperties {
        border_width: 3.0,
        ..ShapeProperties::default()
    };
    for shape in [Shape::Spotlight, Shape::Rectangle] {
        assert_eq!(
            spot_geometry(spot(), shape, &props),
            spot_geometry(spot(), shape, &props)
        );
    }
}

#[test]
fn mask_path_contains_viewport_and_cutout() {
    let vp = Viewport::new(360.0, 640.0).unwrap();
    let g = spot_geometry(spot(), Shape::Spotlight, &ShapeProperties::default());
    let mask = g.mask_path(vp);
    let bbox = mask.bounding_box();
    assert_eq!(bbox, vp.rect());
    let closes = mask
        .elements()
        .iter()
        .filter(|el| matches!(el, kurbo::PathEl::ClosePath))
        .count();
    assert_eq!(closes, 2);
}

#[test]
fn rounded_outline_stays_inside_rect() {
    let g = SpotGeometry::Rect {
        rect: Rect::new(0.0, 0.0, 100.0, 40.0),
        horizontal_radius: 30.0,
        vertical_radius: 50.0,
    };
    let bbox = g.outline().bounding_box();
    assert!((bbox.x0 - 0.0).abs() < 1e-9 && (bbox.x1 - 100.0).abs() < 1e-9);
    assert!((bbox.y0 - 0.0).abs() < 1e-9 && (bbox.y1 - 40.0).abs() < 1e-9);
    assert!(!g.outline().contains(Point::new(0.5, 0.5)));
    assert!(g.outline().contains(Point::new(50.0, 20.0)));
}
