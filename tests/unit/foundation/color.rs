use super::*;

fn approx(a: [f64; 3], b: [f64; 3]) -> bool {
    a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
}

#[test]
fn primary_hues_convert() {
    assert!(approx(Hsb::new(0.0, 1.0, 1.0).to_rgb(), [1.0, 0.0, 0.0]));
    assert!(approx(Hsb::new(120.0, 1.0, 1.0).to_rgb(), [0.0, 1.0, 0.0]));
    assert!(approx(Hsb::new(240.0, 1.0, 1.0).to_rgb(), [0.0, 0.0, 1.0]));
    assert!(approx(Hsb::new(360.0, 1.0, 1.0).to_rgb(), [1.0, 0.0, 0.0]));
}

#[test]
fn zero_saturation_is_gray_at_brightness() {
    assert!(approx(Hsb::new(200.0, 0.0, 0.25).to_rgb(), [0.25, 0.25, 0.25]));
}

#[test]
fn premul_output_is_opaque_by_default() {
    let c = Hsb::new(0.0, 1.0, 1.0).to_rgba8_premul();
    assert_eq!(c, Rgba8Premul::from_straight_rgba(255, 0, 0, 255));
}

#[test]
fn parses_hex_rgb_and_rgba() {
    assert_eq!(parse_hex("#ff0000").unwrap(), [255, 0, 0, 255]);
    assert_eq!(parse_hex(" 0000FF80").unwrap(), [0, 0, 255, 128]);
    assert!(parse_hex("#fff").is_err());
    assert!(parse_hex("#gg0000").is_err());
}
