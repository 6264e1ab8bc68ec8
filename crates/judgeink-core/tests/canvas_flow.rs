//! Full input → commit → persist → reload cycle against file-backed stores.

use judgeink_core::{
    Canvas, CanvasOptions, FileDefaults, FileStorage, InputClass, InputEvent, InputMode,
    InputOutcome, Layer, ManualScheduler, SerializableColor, StrokeStore, ToolType,
};
use kurbo::{Point, Size};
use pollster::block_on;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

const QUIET: Duration = Duration::from_millis(500);

fn gesture(canvas: &mut Canvas, class: InputClass, points: &[Point]) -> InputOutcome {
    let (first, rest) = points.split_first().unwrap();
    canvas.handle_input(InputEvent::down(*first, class));
    let (last, middle) = rest.split_last().unwrap();
    for p in middle {
        canvas.handle_input(InputEvent::moved(*p, class));
    }
    canvas.handle_input(InputEvent::up(*last, class))
}

#[test]
fn annotation_session_survives_remount() {
    let dir = tempdir().unwrap();
    let store = Arc::new(FileStorage::new(dir.path().join("strokes")).unwrap());
    let defaults = Arc::new(FileDefaults::new(dir.path().join("tool_defaults.json")));
    let scheduler = Arc::new(ManualScheduler::new());
    let options = CanvasOptions::new("event-9/judge-2", Size::new(400.0, 300.0))
        .with_quiet_period(QUIET)
        .with_full_reference();

    let mut canvas = block_on(Canvas::mount(
        options.clone(),
        store.clone(),
        scheduler.clone(),
        defaults.clone(),
    ));
    canvas.set_input_mode(InputMode::StylusOnly);
    canvas.set_color(SerializableColor::new(0, 90, 200, 255));
    canvas.set_width(6.0);

    let sketch = [
        Point::new(20.0, 20.0),
        Point::new(80.0, 40.0),
        Point::new(120.0, 90.0),
    ];
    assert_eq!(
        gesture(&mut canvas, InputClass::Stylus, &sketch),
        InputOutcome::Committed
    );
    // Finger input is rejected under the stylus policy.
    assert_eq!(
        gesture(&mut canvas, InputClass::Finger, &sketch),
        InputOutcome::Ignored
    );

    canvas.select_tool(ToolType::Telestrator);
    gesture(
        &mut canvas,
        InputClass::Stylus,
        &[Point::new(200.0, 50.0), Point::new(260.0, 50.0)],
    );
    canvas.select_tool(ToolType::Highlighter);
    gesture(
        &mut canvas,
        InputClass::Stylus,
        &[
            Point::new(300.0, 200.0),
            Point::new(340.0, 200.0),
            Point::new(340.0, 240.0),
        ],
    );
    canvas.select_tool(ToolType::Normal);
    canvas.toggle_eraser();
    gesture(
        &mut canvas,
        InputClass::Stylus,
        &[Point::new(30.0, 30.0), Point::new(60.0, 30.0)],
    );
    canvas.toggle_eraser();
    assert!((canvas.tool_config().active_width - 6.0).abs() < f64::EPSILON);

    assert!(canvas.undo());
    assert!(canvas.redo());
    assert_eq!(canvas.history().len(), 4);

    // Still inside the quiet period: nothing written yet.
    scheduler.advance(QUIET - Duration::from_millis(1));
    assert_eq!(block_on(store.get("event-9/judge-2")).unwrap(), None);
    scheduler.advance(Duration::from_millis(1));
    assert!(block_on(store.get("event-9/judge-2")).unwrap().is_some());

    let frame = canvas.frame();
    assert_eq!(frame.layer(Layer::Base).len(), 2);
    assert_eq!(frame.layer(Layer::Reference).len(), 1);
    assert_eq!(frame.layer(Layer::Telestrator).len(), 1);
    assert_eq!(frame.layer(Layer::Highlighter).len(), 2);

    let before: Vec<_> = canvas.strokes().cloned().collect();
    block_on(canvas.unmount());

    // A fresh process: new defaults handle on the same file.
    let defaults = Arc::new(FileDefaults::new(dir.path().join("tool_defaults.json")));
    let reopened = block_on(Canvas::mount(options, store, scheduler, defaults));
    let after: Vec<_> = reopened.strokes().cloned().collect();
    assert_eq!(after, before);
    assert_eq!(reopened.input_mode(), InputMode::StylusOnly);
    assert_eq!(
        reopened.tool_config().active_color,
        SerializableColor::new(0, 90, 200, 255)
    );
    assert!((reopened.tool_config().active_width - 6.0).abs() < f64::EPSILON);

    let highlighter = after
        .iter()
        .find(|s| s.tool() == ToolType::Highlighter)
        .unwrap();
    assert!(highlighter.path().is_closed());
}

#[test]
fn export_reproduces_strokes_at_new_size() {
    let scheduler = Arc::new(ManualScheduler::new());
    let store = Arc::new(judgeink_core::MemoryStorage::new());
    let defaults = Arc::new(judgeink_core::MemoryDefaults::default());
    let mut canvas = block_on(Canvas::mount(
        CanvasOptions::new("judge", Size::new(100.0, 100.0)),
        store,
        scheduler,
        defaults,
    ));
    gesture(
        &mut canvas,
        InputClass::Finger,
        &[Point::new(10.0, 10.0), Point::new(20.0, 10.0)],
    );

    let frame = canvas.export_frame(Size::new(300.0, 200.0), SerializableColor::white());
    let stroke = canvas.strokes().next().unwrap();
    let exported = &frame.layer(Layer::Base)[0];
    match exported {
        judgeink_core::DrawOp::Stroke { path, width, .. } => {
            // Scale 2, centered horizontally with a 50px margin.
            assert_eq!(path.first_point(), Some(Point::new(70.0, 20.0)));
            assert!((width - stroke.stroke_width() * 2.0).abs() < 1e-9);
        }
        other => panic!("unexpected op {:?}", other),
    }
}
