use super::*;

#[test]
fn glyph_documents_parse() {
    for g in [BuiltinGlyph::Person, BuiltinGlyph::Failure] {
        let doc = g.svg_document(Rgba8Premul::from_straight_rgba(120, 120, 128, 255));
        let tree = usvg::Tree::from_data(doc.as_bytes(), &usvg::Options::default()).unwrap();
        assert_eq!(tree.size().width(), 24.0);
        assert_eq!(tree.size().height(), 24.0);
    }
}

#[test]
fn hex_unpremultiplies() {
    let (hex, a) = straight_rgb_hex(Rgba8Premul::from_straight_rgba(255, 0, 0, 128));
    assert_eq!(hex, "#ff0000");
    assert!((a - 128.0 / 255.0).abs() < 1e-9);

    let (_, a) = straight_rgb_hex(Rgba8Premul::transparent());
    assert_eq!(a, 0.0);
}
