use std::cell::Cell;
use std::rc::Rc;

use super::*;

fn fixed(x: f64) -> Arc<dyn MeasureTarget> {
    Arc::new(Rect::new(x, 0.0, x + 10.0, 10.0))
}

#[test]
fn measure_without_handle_is_unregistered() {
    let mut reg = TargetRegistry::new();
    assert!(matches!(
        reg.measure(3),
        Err(TourError::UnregisteredTarget(3))
    ));
    assert!(reg.is_empty());
}

#[test]
fn last_registration_wins() {
    let mut reg = TargetRegistry::new();
    reg.register(1, fixed(0.0));
    reg.register(1, fixed(50.0));
    assert_eq!(reg.measure(1).unwrap().x0, 50.0);
    assert_eq!(reg.measure(1).unwrap().x0, 50.0);
    assert_eq!(reg.len(), 1);
}

#[test]
fn repeated_measurement_tracks_moving_target() {
    let calls = Rc::new(Cell::new(0u32));
    let c = Rc::clone(&calls);
    let mut reg = TargetRegistry::new();
    reg.register(
        0,
        Arc::new(move || {
            c.set(c.get() + 1);
            let x = f64::from(c.get()) * 10.0;
            Ok(Rect::new(x, 0.0, x + 5.0, 5.0))
        }),
    );
    assert_eq!(reg.measure(0).unwrap().x0, 10.0);
    assert_eq!(reg.measure(0).unwrap().x0, 20.0);
    assert_eq!(calls.get(), 2);
    assert_eq!(reg.last_bounds(0).unwrap().x0, 20.0);
}

#[test]
fn unregister_keeps_last_bounds() {
    let mut reg = TargetRegistry::new();
    reg.register(2, fixed(7.0));
    reg.measure(2).unwrap();
    assert!(reg.unregister(2));
    assert!(!reg.unregister(2));
    assert!(!reg.is_registered(2));
    assert_eq!(reg.last_bounds(2).unwrap().x0, 7.0);
    assert!(reg.measure(2).is_err());
}

#[test]
fn failing_handle_does_not_overwrite_last_bounds() {
    let mut reg = TargetRegistry::new();
    reg.register(0, fixed(1.0));
    reg.measure(0).unwrap();
    reg.register(
        0,
        Arc::new(|| -> TourResult<Rect> { Err(TourError::validation("not laid out")) }),
    );
    assert!(reg.measure(0).is_err());
    assert_eq!(reg.last_bounds(0).unwrap().x0, 1.0);
}
