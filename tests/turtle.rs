//! End-to-end session tests.
//!
//! These drive the public command surface and verify the geometric and
//! scene-accumulation contracts: motion math, heading conventions, fill
//! capture, stamp ordering, and export composition.

use svg_turtle::renderer::Renderer;
use svg_turtle::scene::{Fragment, PathCmd};
use svg_turtle::{
    MemorySink, Mode, Shape, StampLayer, Turtle, WindowConfig,
};

// ============================================================================
// Helpers
// ============================================================================

/// A default 800×600 session with animation off.
fn turtle() -> Turtle {
    turtle_in(Mode::Standard)
}

fn turtle_in(mode: Mode) -> Turtle {
    Turtle::new(WindowConfig {
        mode,
        speed: 0,
        ..WindowConfig::default()
    })
    .unwrap()
}

fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() < tol, "expected {b}, got {a}");
}

// ============================================================================
// Motion
// ============================================================================

#[test]
fn forward_moves_by_the_requested_distance() {
    for d in [100.0, 37.5, -60.0, 0.0] {
        let mut t = turtle();
        t.right(33.0).unwrap();
        let (x0, y0) = t.position();
        t.forward(d).unwrap();
        let (x1, y1) = t.position();
        let moved = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        assert_close(moved, d.abs(), 1e-2);
    }
}

#[test]
fn backward_is_forward_reversed() {
    let mut t = turtle();
    t.forward(50.0).unwrap();
    t.backward(50.0).unwrap();
    let (x, y) = t.position();
    assert_close(x, 0.0, 1e-6);
    assert_close(y, 0.0, 1e-6);
}

#[test]
fn square_walk_in_standard_mode() {
    let mut t = turtle();
    t.forward(100.0).unwrap();
    t.right(90.0).unwrap();
    t.forward(100.0).unwrap();
    let (x, y) = t.position();
    assert_close(x, 100.0, 1e-6);
    assert_close(y, -100.0, 1e-6);
    assert_close(t.heading(), 270.0, 1e-9);
}

#[test]
fn turn_and_counterturn_restore_heading() {
    for a in [30.0, 90.0, 123.456, 400.0] {
        let mut t = turtle();
        let before = t.heading();
        t.right(a).unwrap();
        t.left(a).unwrap();
        assert_close(t.heading().rem_euclid(360.0), before, 1e-9);
    }
}

#[test]
fn goto_preserves_heading_and_tilt() {
    let mut t = turtle();
    t.set_heading(37.0).unwrap();
    t.tilt(12.0).unwrap();
    let heading = t.heading();
    let tilt = t.tilt_angle();
    t.goto(55.0, -20.0).unwrap();
    assert_close(t.heading(), heading, 1e-9);
    assert_close(t.tilt_angle(), tilt, 1e-9);
    let (x, y) = t.position();
    assert_close(x, 55.0, 1e-3);
    assert_close(y, -20.0, 1e-3);
}

#[test]
fn set_xy_move_one_axis_at_a_time() {
    let mut t = turtle();
    t.set_x(40.0).unwrap();
    t.set_y(-25.0).unwrap();
    let (x, y) = t.position();
    assert_close(x, 40.0, 1e-3);
    assert_close(y, -25.0, 1e-3);
}

#[test]
fn home_restores_origin_and_orientation() {
    let mut t = turtle();
    t.forward(120.0).unwrap();
    t.right(200.0).unwrap();
    t.home().unwrap();
    let (x, y) = t.position();
    assert_close(x, 0.0, 1e-3);
    assert_close(y, 0.0, 1e-3);
    assert_close(t.heading(), 0.0, 1e-9);
}

#[test]
fn pen_up_motion_leaves_no_trail() {
    let mut t = turtle();
    t.pen_up();
    t.forward(100.0).unwrap();
    assert!(t.scene().lines().is_empty());
    t.pen_down();
    t.forward(10.0).unwrap();
    assert_eq!(t.scene().lines().len(), 1);
}

#[test]
fn motion_rejects_non_finite_input_without_moving() {
    let mut t = turtle();
    assert!(t.forward(f64::NAN).is_err());
    assert!(t.goto(f64::INFINITY, 0.0).is_err());
    assert!(t.right(f64::NAN).is_err());
    let (x, y) = t.position();
    assert_close(x, 0.0, 1e-9);
    assert_close(y, 0.0, 1e-9);
    assert!(t.scene().lines().is_empty());
}

// ============================================================================
// Heading conventions
// ============================================================================

#[test]
fn logo_mode_starts_facing_up_and_turns_clockwise() {
    let mut t = turtle_in(Mode::Logo);
    assert_close(t.heading(), 0.0, 1e-9);
    t.right(90.0).unwrap();
    assert_close(t.heading(), 90.0, 1e-9);
    // Facing east now: forward increases logical x.
    t.forward(50.0).unwrap();
    let (x, y) = t.position();
    assert_close(x, 50.0, 1e-6);
    assert_close(y, 0.0, 1e-6);
}

#[test]
fn svg_mode_uses_device_coordinates() {
    let mut t = turtle_in(Mode::Svg);
    let (x, y) = t.position();
    assert_close(x, 400.0, 1e-9);
    assert_close(y, 300.0, 1e-9);
    t.set_heading(0.0).unwrap();
    t.forward(50.0).unwrap();
    let (x, y) = t.position();
    assert_close(x, 450.0, 1e-6);
    assert_close(y, 300.0, 1e-6);
}

#[test]
fn towards_and_distance_follow_the_mode() {
    let t = turtle();
    assert_close(t.towards(10.0, 10.0).unwrap(), 45.0, 1e-9);
    assert_close(t.distance(3.0, 4.0).unwrap(), 5.0, 1e-9);

    let t = turtle_in(Mode::Logo);
    assert_close(t.towards(0.0, 10.0).unwrap(), 0.0, 1e-9);
    assert_close(t.towards(10.0, 0.0).unwrap(), 90.0, 1e-9);
}

// ============================================================================
// World coordinates
// ============================================================================

#[test]
fn world_window_center_maps_to_viewport_center() {
    let mut t = turtle();
    t.set_world_coordinates(0.0, 0.0, 10.0, 10.0).unwrap();
    assert_eq!(t.mode(), Mode::World);
    t.goto(5.0, 5.0).unwrap();
    match t.scene().lines().last().unwrap() {
        Fragment::Line { x2, y2, .. } => {
            assert_close(*x2, 400.0, 1e-9);
            assert_close(*y2, 300.0, 1e-9);
        }
        other => panic!("expected a line fragment, got {other:?}"),
    }
}

#[test]
fn degenerate_world_window_is_rejected() {
    let mut t = turtle();
    assert!(t.set_world_coordinates(10.0, 0.0, 10.0, 5.0).is_err());
    assert_eq!(t.mode(), Mode::Standard);
}

// ============================================================================
// Circles & arcs
// ============================================================================

#[test]
fn full_circle_is_four_quarter_arcs() {
    let mut t = turtle();
    let (x0, y0) = t.position();
    t.circle(50.0, 360.0).unwrap();
    let arcs = t
        .scene()
        .lines()
        .iter()
        .filter(|f| matches!(f, Fragment::Arc { .. }))
        .count();
    assert_eq!(arcs, 4);
    assert_close(t.heading(), 0.0, 1e-9);
    let (x1, y1) = t.position();
    assert_close(x1, x0, 1e-2);
    assert_close(y1, y0, 1e-2);
}

#[test]
fn arc_sweep_side_follows_radius_sign() {
    let mut t = turtle();
    t.circle(50.0, 90.0).unwrap();
    match t.scene().lines().last().unwrap() {
        Fragment::Arc { sweep, .. } => assert!(!sweep),
        other => panic!("expected an arc fragment, got {other:?}"),
    }
    let mut t = turtle();
    t.circle(-50.0, 90.0).unwrap();
    match t.scene().lines().last().unwrap() {
        Fragment::Arc { sweep, .. } => assert!(sweep),
        other => panic!("expected an arc fragment, got {other:?}"),
    }
}

#[test]
fn partial_extent_splits_at_ninety_degrees() {
    let mut t = turtle();
    t.circle(50.0, 100.0).unwrap();
    assert_eq!(t.scene().lines().len(), 2);
    // 100° counterclockwise from external 0.
    assert_close(t.heading(), 100.0, 1e-9);
}

#[test]
fn circle_rejects_zero_radius_and_negative_extent() {
    let mut t = turtle();
    assert!(t.circle(0.0, 90.0).is_err());
    assert!(t.circle(50.0, -10.0).is_err());
    assert!(t.scene().lines().is_empty());
}

// ============================================================================
// Fill regions
// ============================================================================

#[test]
fn degenerate_fill_produces_an_empty_closed_path() {
    let mut t = turtle();
    t.begin_fill(None, None).unwrap();
    t.end_fill().unwrap();
    match t.scene().lines().last().unwrap() {
        Fragment::Fill { path, .. } => {
            assert_eq!(path.len(), 1);
            assert!(matches!(path[0], PathCmd::MoveTo { .. }));
        }
        other => panic!("expected a fill fragment, got {other:?}"),
    }
}

#[test]
fn fill_replaces_strokes_traced_while_open() {
    let mut t = turtle();
    t.forward(10.0).unwrap(); // survives: drawn before the fill
    t.begin_fill(None, None).unwrap();
    t.forward(100.0).unwrap();
    t.right(90.0).unwrap();
    t.forward(100.0).unwrap();
    t.end_fill().unwrap();

    let lines = t.scene().lines();
    assert_eq!(lines.len(), 2);
    assert!(matches!(lines[0], Fragment::Line { .. }));
    match &lines[1] {
        Fragment::Fill { path, .. } => {
            // Seed move plus one line-to per stroke.
            assert_eq!(path.len(), 3);
        }
        other => panic!("expected a fill fragment, got {other:?}"),
    }
}

#[test]
fn begin_fill_is_idempotent_and_end_fill_is_safe() {
    let mut t = turtle();
    t.begin_fill(Some(svg_turtle::FillRule::NonZero), Some(0.5)).unwrap();
    t.forward(10.0).unwrap();
    // Second begin: validated no-op; the region keeps its rule.
    t.begin_fill(None, None).unwrap();
    t.end_fill().unwrap();
    match t.scene().lines().last().unwrap() {
        Fragment::Fill { rule, opacity, .. } => {
            assert_eq!(*rule, svg_turtle::FillRule::NonZero);
            assert_close(*opacity, 0.5, 1e-9);
        }
        other => panic!("expected a fill fragment, got {other:?}"),
    }
    // Extra end with no region: no-op, no new fragment.
    let before = t.scene().lines().len();
    t.end_fill().unwrap();
    assert_eq!(t.scene().lines().len(), before);
}

#[test]
fn fill_opacity_is_validated_before_any_capture() {
    let mut t = turtle();
    assert!(t.begin_fill(None, Some(1.5)).is_err());
    assert!(!t.filling());
}

#[test]
fn circle_inside_fill_records_arc_commands() {
    let mut t = turtle();
    t.begin_fill(None, None).unwrap();
    t.circle(30.0, 180.0).unwrap();
    t.end_fill().unwrap();
    match t.scene().lines().last().unwrap() {
        Fragment::Fill { path, .. } => {
            let arcs = path
                .iter()
                .filter(|c| matches!(c, PathCmd::Arc { .. }))
                .count();
            assert_eq!(arcs, 2);
        }
        other => panic!("expected a fill fragment, got {other:?}"),
    }
}

// ============================================================================
// Stamps
// ============================================================================

#[test]
fn clear_stamps_follows_creation_order_across_layers() {
    let mut t = turtle();
    let mut ids = Vec::new();
    for i in 0..5 {
        let layer = if i % 2 == 0 { StampLayer::Below } else { StampLayer::Above };
        ids.push(t.stamp(layer).unwrap());
    }
    t.clear_stamps(Some(2)).unwrap();
    assert_eq!(t.scene().stamp_ids(), &ids[2..]);
    t.clear_stamps(Some(-2)).unwrap();
    assert_eq!(t.scene().stamp_ids(), &ids[2..3]);
    t.clear_stamps(None).unwrap();
    assert_eq!(t.scene().stamp_count(), 0);
}

#[test]
fn clear_stamp_ignores_unknown_ids() {
    let mut t = turtle();
    let id = t.stamp(StampLayer::Below).unwrap();
    t.clear_stamp(9999).unwrap();
    assert_eq!(t.scene().stamp_ids(), &[id]);
}

#[test]
fn clear_keeps_stamps_but_reset_does_not() {
    let mut t = turtle();
    t.forward(10.0).unwrap();
    t.dot(None, None).unwrap();
    t.stamp(StampLayer::Above).unwrap();

    t.clear().unwrap();
    assert!(t.scene().lines().is_empty());
    assert!(t.scene().dots().is_empty());
    assert_eq!(t.scene().stamp_count(), 1);

    t.reset().unwrap();
    assert_eq!(t.scene().stamp_count(), 0);
}

// ============================================================================
// Style & validation
// ============================================================================

#[test]
fn invalid_pen_color_leaves_state_unchanged() {
    let mut t = turtle();
    assert!(t.set_pen_color("notacolor").is_err());
    assert_eq!(t.pen_color().as_str(), "black");
}

#[test]
fn color_inputs_normalize_to_canonical_forms() {
    let mut t = turtle();
    t.set_pen_color("  CRIMSON ").unwrap();
    assert_eq!(t.pen_color().as_str(), "crimson");
    t.set_fill_color((255, 0, 10)).unwrap();
    assert_eq!(t.fill_color().as_str(), "rgb(255,0,10)");
    t.set_background_color("#ABC").unwrap();
    assert_eq!(t.background_color().as_str(), "#abc");
}

#[test]
fn set_color_sets_pen_and_fill_together() {
    let mut t = turtle();
    t.set_color("teal").unwrap();
    assert_eq!(t.pen_color().as_str(), "teal");
    assert_eq!(t.fill_color().as_str(), "teal");
}

#[test]
fn pen_width_and_speed_ranges_are_enforced() {
    let mut t = turtle();
    assert!(t.set_pen_width(0).is_err());
    assert!(t.set_speed(14).is_err());
    t.set_pen_width(3).unwrap();
    t.set_speed(13).unwrap();
    assert_eq!(t.pen_width(), 3);
    assert_eq!(t.speed(), 13);
}

#[test]
fn pen_bundle_validates_before_applying_anything() {
    let mut t = turtle();
    let bad = svg_turtle::PenSettings {
        pencolor: Some("navy".into()),
        pensize: Some(0),
        ..Default::default()
    };
    assert!(t.set_pen(bad).is_err());
    // The valid field must not have been applied either.
    assert_eq!(t.pen_color().as_str(), "black");

    let good = svg_turtle::PenSettings {
        pencolor: Some("navy".into()),
        tilt: Some(15.0),
        stretchfactor: Some((2.0, 3.0)),
        ..Default::default()
    };
    t.set_pen(good).unwrap();
    assert_eq!(t.pen_color().as_str(), "navy");
    assert_close(t.tilt_angle(), 15.0, 1e-9);
    assert_eq!(t.shapesize(), (2.0, 3.0, 1.0));
}

#[test]
fn reset_restores_defaults_but_keeps_shape_and_mode() {
    let mut t = turtle();
    t.set_shape(Shape::Turtle2).unwrap();
    t.set_pen_color("red").unwrap();
    t.set_pen_width(7).unwrap();
    t.forward(40.0).unwrap();
    t.reset().unwrap();
    assert_eq!(t.pen_color().as_str(), "black");
    assert_eq!(t.pen_width(), 1);
    assert_eq!(t.shape(), Shape::Turtle2);
    assert_eq!(t.mode(), Mode::Standard);
    assert!(t.scene().lines().is_empty());
    let (x, y) = t.position();
    assert_close(x, 0.0, 1e-9);
    assert_close(y, 0.0, 1e-9);
}

// ============================================================================
// Snapshots, export, and the sink
// ============================================================================

#[test]
fn speed_zero_suppresses_updates_until_done() {
    let sink = MemorySink::new();
    let mut t = Turtle::with_sink(
        WindowConfig {
            speed: 0,
            ..WindowConfig::default()
        },
        Box::new(sink.clone()),
    )
    .unwrap();
    t.forward(100.0).unwrap();
    t.right(90.0).unwrap();
    // Only the initial display so far.
    assert_eq!(sink.frame_count(), 1);
    t.done().unwrap();
    assert_eq!(sink.frame_count(), 2);
    assert!(sink.last_frame().unwrap().contains("<line"));
}

#[test]
fn animated_moves_step_but_emit_one_fragment() {
    let sink = MemorySink::new();
    let mut t = Turtle::with_sink(
        WindowConfig {
            speed: 13,
            ..WindowConfig::default()
        },
        Box::new(sink.clone()),
    )
    .unwrap();
    t.forward(25.0).unwrap();
    // Initial display plus one update per ~10-unit step.
    assert_eq!(sink.frame_count(), 4);
    assert_eq!(t.scene().lines().len(), 1);
    match t.scene().lines().last().unwrap() {
        Fragment::Line { x2, y2, .. } => {
            assert_close(*x2, 425.0, 1e-9);
            assert_close(*y2, 300.0, 1e-9);
        }
        other => panic!("expected a line fragment, got {other:?}"),
    }
}

#[test]
fn uniform_stretch_turn_spins_continuously() {
    let sink = MemorySink::new();
    let mut t = Turtle::with_sink(
        WindowConfig {
            speed: 13,
            ..WindowConfig::default()
        },
        Box::new(sink.clone()),
    )
    .unwrap();
    t.right(90.0).unwrap();
    assert_eq!(sink.frame_count(), 2);
    assert!(sink.last_frame().unwrap().contains("animateTransform"));
    assert_close(t.heading(), 270.0, 1e-9);
}

#[test]
fn uneven_stretch_turn_steps_in_thirty_degree_chunks() {
    let sink = MemorySink::new();
    let mut t = Turtle::with_sink(
        WindowConfig {
            speed: 13,
            ..WindowConfig::default()
        },
        Box::new(sink.clone()),
    )
    .unwrap();
    t.set_shapesize(Some(2.0), Some(3.0), None).unwrap();
    t.right(75.0).unwrap();
    // Initial display plus 30+30+15 steps.
    assert_eq!(sink.frame_count(), 4);
    assert!(!sink.last_frame().unwrap().contains("animateTransform"));
    assert_close(t.heading(), 285.0, 1e-9);
}

#[test]
fn export_round_trips_every_fragment() {
    let mut t = turtle();
    t.forward(50.0).unwrap();
    t.circle(30.0, 90.0).unwrap();
    t.dot(Some(8.0), None).unwrap();
    t.write("hello", svg_turtle::TextAlign::Center, Default::default())
        .unwrap();
    t.stamp(StampLayer::Below).unwrap();
    t.stamp(StampLayer::Above).unwrap();

    for include_glyph in [false, true] {
        let doc = t.to_svg(include_glyph);
        for fragment in t.scene().lines().iter().chain(t.scene().dots()) {
            assert!(
                doc.contains(&Renderer::fragment(fragment)),
                "document missing fragment {fragment:?}"
            );
        }
        let groups = doc.matches("<g ").count();
        let expected = t.scene().stamp_count() + usize::from(include_glyph);
        assert_eq!(groups, expected);
    }
}

#[test]
fn save_svg_appends_the_extension() {
    let mut t = turtle();
    t.forward(10.0).unwrap();
    let base = std::env::temp_dir().join(format!("svg-turtle-test-{}", std::process::id()));
    let base = base.to_str().unwrap().to_owned();
    t.save_svg(&base, false).unwrap();
    let written = format!("{base}.svg");
    let contents = std::fs::read_to_string(&written).unwrap();
    assert!(contents.starts_with("<svg"));
    assert!(contents.contains("xmlns=\"http://www.w3.org/2000/svg\""));
    assert!(contents.ends_with("</svg>"));
    std::fs::remove_file(&written).unwrap();
}

#[test]
fn snapshot_always_carries_the_canvas_rect_and_glyph() {
    let t = turtle();
    let snapshot = t.snapshot();
    assert!(snapshot.starts_with(r#"<svg width="800" height="600">"#));
    assert!(snapshot.contains("fill:white"));
    assert!(snapshot.contains("<polygon")); // default classic glyph
    // Exports exclude the glyph unless asked.
    assert!(!t.to_svg(false).contains("<polygon"));
    assert!(t.to_svg(true).contains("<polygon"));
}

#[test]
fn hidden_glyph_is_marked_hidden_not_removed() {
    let mut t = turtle();
    t.hide().unwrap();
    assert!(t.snapshot().contains(r#"visibility="hidden""#));
}

#[test]
fn mode_change_resets_the_scene() {
    let mut t = turtle();
    t.forward(25.0).unwrap();
    t.set_mode(Mode::Logo).unwrap();
    assert!(t.scene().lines().is_empty());
    assert_eq!(t.mode(), Mode::Logo);
    assert_close(t.heading(), 0.0, 1e-9);
}
