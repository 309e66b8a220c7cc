use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::foundation::error::TourError;
use crate::model::step::Position;

fn target(x: f64) -> Arc<dyn MeasureTarget> {
    Arc::new(Rect::from_origin_size((x, 200.0), (50.0, 50.0)))
}

fn tour(n: usize) -> SpotlightTour {
    let steps = (0..n)
        .map(|i| Step::new(Position::Bottom).text(format!("Step {i}"), "body"))
        .collect();
    SpotlightTour::new(TourConfig::new(steps), Viewport::default()).unwrap()
}

fn registered(n: usize) -> SpotlightTour {
    let mut t = tour(n);
    for i in 0..n {
        t.register(i, target(100.0 + i as f64 * 10.0));
    }
    t
}

fn record(t: &mut SpotlightTour) -> Rc<RefCell<Vec<TourEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    t.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    events
}

/// Play every queued effect to completion, the way a host would.
fn pump(t: &mut SpotlightTour) {
    loop {
        let effects = t.take_effects();
        if effects.is_empty() {
            return;
        }
        for effect in effects {
            match effect {
                Effect::HideTip { transition, .. } => t.on_animation_finished(
                    transition,
                    AnimationKind::HideTip,
                    AnimationOutcome::Completed,
                ),
                Effect::Measure { transition, .. } => t.resolve_measurement(transition),
                Effect::RetryMeasure { transition, .. } => t.on_retry_due(transition),
                Effect::MoveSpot { transition, .. } => t.on_animation_finished(
                    transition,
                    AnimationKind::MoveSpot,
                    AnimationOutcome::Completed,
                ),
                Effect::RevealTip { transition, .. } => t.on_animation_finished(
                    transition,
                    AnimationKind::RevealTip,
                    AnimationOutcome::Completed,
                ),
                Effect::CancelAnimations { .. } => {}
            }
        }
    }
}

#[test]
fn new_rejects_empty_tour() {
    let err = SpotlightTour::new(TourConfig::new(vec![]), Viewport::default()).unwrap_err();
    assert!(matches!(err, TourError::Validation(_)));
}

#[test]
fn start_runs_first_step_and_settles() {
    let mut t = registered(3);
    let events = record(&mut t);
    t.start().unwrap();

    assert_eq!(t.status(), TourStatus::Running);
    assert_eq!(t.current(), Some(0));
    assert_eq!(t.spot(), None);
    assert!(matches!(
        events.borrow().last(),
        Some(TourEvent::Changed(s)) if s.current == Some(0) && s.spot.is_none()
    ));

    pump(&mut t);
    assert_eq!(t.spot(), Some(Rect::new(100.0, 200.0, 150.0, 250.0)));
    assert_eq!(t.phase(), TransitionPhase::Settled);
    assert!(t.mask_path().is_some());
    assert_eq!(t.snapshot(), match events.borrow().last() {
        Some(TourEvent::Changed(s)) => s.clone(),
        other => panic!("unexpected last event {other:?}"),
    });
}

#[test]
fn start_at_out_of_range_is_rejected() {
    let mut t = registered(2);
    assert!(matches!(
        t.start_at(2),
        Err(TourError::InvalidIndex { index: 2, len: 2 })
    ));
    assert_eq!(t.status(), TourStatus::Idle);
}

#[test]
fn next_and_previous_walk_the_steps() {
    let mut t = registered(3);
    t.start().unwrap();
    pump(&mut t);

    t.previous();
    assert_eq!(t.current(), Some(0));
    assert!(t.take_effects().is_empty());

    t.next();
    assert_eq!(t.current(), Some(1));
    // The previous step's bounds stay on screen until the new ones resolve.
    assert_eq!(t.spot(), Some(Rect::new(100.0, 200.0, 150.0, 250.0)));
    pump(&mut t);
    assert_eq!(t.spot(), Some(Rect::new(110.0, 200.0, 160.0, 250.0)));

    t.previous();
    pump(&mut t);
    assert_eq!(t.current(), Some(0));
}

#[test]
fn next_on_last_step_finishes() {
    let mut t = registered(2);
    t.start_at(1).unwrap();
    pump(&mut t);
    let events = record(&mut t);

    t.next();
    assert_eq!(t.status(), TourStatus::Stopped);
    assert_eq!((t.current(), t.spot()), (None, None));
    let events = events.borrow();
    assert_eq!(events[0], TourEvent::Finished { last_index: 1 });
    assert!(matches!(&events[1], TourEvent::Changed(s) if s.status == TourStatus::Stopped));
}

#[test]
fn go_to_jumps_and_validates() {
    let mut t = registered(4);
    assert!(t.go_to(3).is_ok());
    assert_eq!(t.current(), None);
    assert!(t.go_to(4).is_err());

    t.start().unwrap();
    pump(&mut t);
    t.go_to(3).unwrap();
    pump(&mut t);
    assert_eq!(t.current(), Some(3));
    assert_eq!(t.spot(), Some(Rect::new(130.0, 200.0, 180.0, 250.0)));
}

#[test]
fn stop_is_noop_when_idle() {
    let mut t = registered(2);
    let events = record(&mut t);
    t.stop();
    assert!(events.borrow().is_empty());
    assert_eq!(t.status(), TourStatus::Idle);
}

#[test]
fn stop_mid_transition_cancels_and_keeps_registrations() {
    let mut t = registered(2);
    t.start().unwrap();
    let pending = t.take_effects();
    let events = record(&mut t);

    t.stop();
    assert_eq!(events.borrow()[0], TourEvent::Stopped);
    assert_eq!(t.phase(), TransitionPhase::Cancelled);
    assert!(t.registry().is_registered(0));

    // A late host callback for the cancelled transition is dropped.
    for effect in pending {
        if let Effect::Measure { transition, .. } = effect {
            t.on_measured(transition, Ok(Rect::new(0.0, 0.0, 1.0, 1.0)));
        }
    }
    assert_eq!(t.spot(), None);
    assert_eq!(t.status(), TourStatus::Stopped);
}

#[test]
fn dispatch_routes_tip_actions() {
    let mut t = registered(3);
    t.start().unwrap();
    pump(&mut t);
    t.dispatch(TipAction::Next);
    assert_eq!(t.current(), Some(1));
    t.dispatch(TipAction::Previous);
    assert_eq!(t.current(), Some(0));
    t.dispatch(TipAction::Stop);
    assert_eq!(t.status(), TourStatus::Stopped);
}

#[test]
fn backdrop_press_follows_config() {
    let mut t = registered(2);
    t.start().unwrap();
    pump(&mut t);
    t.on_backdrop_press();
    assert_eq!(t.current(), Some(0));

    let mut config = TourConfig::new(vec![Step::new(Position::Top); 2]);
    config.should_continue_on_backdrop_press = true;
    let mut t = SpotlightTour::new(config, Viewport::default()).unwrap();
    t.register(0, target(0.0));
    t.start().unwrap();
    t.on_backdrop_press();
    assert_eq!(t.current(), Some(1));
}

#[test]
fn missing_target_gives_up_after_retry_budget() {
    let mut t = tour(2);
    let events = record(&mut t);
    t.start().unwrap();
    pump(&mut t);

    let never = events
        .borrow()
        .iter()
        .filter_map(|e| match e {
            TourEvent::TargetNeverMeasured { index, attempts } => Some((*index, *attempts)),
            _ => None,
        })
        .collect::<Vec<_>>();
    assert_eq!(never, vec![(0, 10)]);
    assert_eq!(t.status(), TourStatus::Running);
    assert_eq!(t.spot(), None);
    assert_eq!(t.phase(), TransitionPhase::Settled);
}

#[test]
fn late_registration_is_measured_immediately() {
    let mut t = tour(2);
    t.start().unwrap();
    let Some(Effect::Measure { transition, .. }) = t.take_effects().pop() else {
        panic!("expected a measure effect");
    };
    t.resolve_measurement(transition);
    assert!(matches!(
        t.take_effects()[..],
        [Effect::RetryMeasure { attempt: 2, .. }]
    ));

    t.register(0, target(40.0));
    assert!(matches!(
        t.take_effects()[..],
        [Effect::Measure { index: 0, .. }]
    ));
    t.resolve_measurement(transition);
    assert_eq!(t.spot(), Some(Rect::new(40.0, 200.0, 90.0, 250.0)));
}

#[test]
fn last_registration_wins() {
    let mut t = tour(1);
    t.register(0, target(10.0));
    t.register(0, target(20.0));
    t.start().unwrap();
    pump(&mut t);
    assert_eq!(t.spot(), Some(Rect::new(20.0, 200.0, 70.0, 250.0)));
}

#[test]
fn tip_layout_places_tooltip_and_follows_viewport() {
    let mut t = registered(1);
    t.start().unwrap();
    pump(&mut t);
    assert_eq!(t.tip_placement(), None);

    t.on_tip_layout(Size::new(120.0, 40.0));
    let tip = t.tip_placement().unwrap();
    assert_eq!((tip.left, tip.top), (65.0, 254.0));

    t.set_viewport(Viewport::new(500.0, 800.0).unwrap());
    assert_eq!(t.viewport().width, 500.0);
    assert!(t.tip_placement().is_some());
}

#[test]
fn unsubscribe_stops_delivery() {
    let mut t = registered(2);
    let events = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&events);
    let id = t.subscribe(move |_| *sink.borrow_mut() += 1);
    t.start().unwrap();
    let seen = *events.borrow();
    assert!(seen > 0);

    assert!(t.unsubscribe(id));
    assert!(!t.unsubscribe(id));
    pump(&mut t);
    t.next();
    assert_eq!(*events.borrow(), seen);
}

#[test]
fn unchanged_state_does_not_notify() {
    let mut t = registered(2);
    t.start().unwrap();
    pump(&mut t);
    let events = record(&mut t);
    t.previous();
    t.on_backdrop_press();
    t.on_tip_layout(Size::new(10.0, 10.0));
    t.on_tip_layout(Size::new(10.0, 10.0));
    assert_eq!(events.borrow().len(), 1);
}

#[test]
fn render_current_tip_uses_step_props() {
    let mut t = registered(2);
    assert!(t.render_current_tip().is_none());
    t.start_at(1).unwrap();
    let props = t.tip_props().unwrap();
    assert!(props.is_last && !props.is_first);
    let content = t.render_current_tip().unwrap();
    assert_eq!(content.title, "Step 1");
    assert_eq!(
        content.actions,
        vec![
            (TipAction::Previous, "Previous".to_owned()),
            (TipAction::Next, "Finish".to_owned()),
        ]
    );
}

#[test]
fn viewport_change_mid_transition_keeps_old_placement() {
    let steps = vec![
        Step::new(Position::Bottom),
        Step::new(Position::Bottom),
        Step::new(Position::Right),
    ];
    let mut t = SpotlightTour::new(TourConfig::new(steps), Viewport::default()).unwrap();
    for i in 0..3 {
        t.register(i, target(100.0 + i as f64 * 10.0));
    }
    t.start().unwrap();
    pump(&mut t);
    t.on_tip_layout(Size::new(120.0, 40.0));
    let settled = t.tip_placement();
    assert_eq!(settled.map(|p| (p.left, p.top)), Some((65.0, 254.0)));

    t.go_to(2).unwrap();
    let Some(Effect::HideTip { transition, .. }) = t.take_effects().pop() else {
        panic!("expected the tooltip to hide first");
    };
    t.on_animation_finished(transition, AnimationKind::HideTip, AnimationOutcome::Completed);
    assert!(matches!(
        t.phase(),
        TransitionPhase::AwaitingMeasurement { attempt: 1, .. }
    ));

    // Step 2 sits to the right, but its target is not measured yet.
    t.set_viewport(Viewport::new(400.0, 700.0).unwrap());
    assert_eq!(t.tip_placement(), settled);

    pump(&mut t);
    assert_eq!(t.tip_placement(), None);
    t.on_tip_layout(Size::new(120.0, 40.0));
    let tip = t.tip_placement().unwrap();
    // circle centre (145, 225), r = 28.75
    assert_eq!((tip.left, tip.top), (174.0, 205.0));
}

#[test]
fn registration_during_retry_notifies_subscribers() {
    let mut t = tour(2);
    t.start().unwrap();
    let Some(Effect::Measure { transition, .. }) = t.take_effects().pop() else {
        panic!("expected a measure effect");
    };
    t.resolve_measurement(transition);
    t.take_effects();
    let events = record(&mut t);

    t.register(0, target(40.0));
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        TourEvent::Changed(s) if s.phase == TransitionPhase::AwaitingMeasurement {
            attempt: 2,
            retry_pending: false,
        }
    ));
}
