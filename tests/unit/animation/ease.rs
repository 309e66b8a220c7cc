use super::*;

const ALL: [Ease; 5] = [
    Ease::Linear,
    Ease::InOutQuad,
    Ease::OutCubic,
    Ease::InOutCubic,
    Ease::OutBack,
];

#[test]
fn endpoints_are_stable() {
    for ease in ALL {
        assert!(ease.apply(0.0).abs() < 1e-12, "{ease:?}");
        assert!((ease.apply(1.0) - 1.0).abs() < 1e-12, "{ease:?}");
    }
}

#[test]
fn input_is_clamped() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), ease.apply(0.0));
        assert_eq!(ease.apply(7.0), ease.apply(1.0));
    }
}

#[test]
fn out_back_overshoots() {
    let peak = (1..100)
        .map(|i| Ease::OutBack.apply(f64::from(i) / 100.0))
        .fold(0.0, f64::max);
    assert!(peak > 1.0);
}

#[test]
fn monotonic_curves_spot_check() {
    for ease in [Ease::Linear, Ease::InOutQuad, Ease::OutCubic, Ease::InOutCubic] {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
}
