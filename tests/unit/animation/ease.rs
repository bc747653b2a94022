use super::*;

#[test]
fn endpoints_are_fixed() {
    for e in [Ease::Linear, Ease::InQuad, Ease::OutQuad, Ease::InOutQuad] {
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(1.0), 1.0);
        assert_eq!(e.apply(-3.0), 0.0);
        assert_eq!(e.apply(7.0), 1.0);
        assert_eq!(e.apply(f64::NAN), 0.0);
    }
}

#[test]
fn in_out_quad_is_symmetric_at_midpoint() {
    assert!((Ease::InOutQuad.apply(0.5) - 0.5).abs() < 1e-12);
    assert!(Ease::InOutQuad.apply(0.25) < 0.25);
    assert!(Ease::InOutQuad.apply(0.75) > 0.75);
}
