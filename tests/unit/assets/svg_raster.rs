use super::*;

#[test]
fn glyph_raster_has_requested_size_and_coverage() {
    let r = SvgRasterizer::new(&[], None);
    let px = r
        .glyph(BuiltinGlyph::Failure, Rgba8Premul::white(), 32, 32)
        .unwrap();
    assert_eq!(px.len(), 32 * 32 * 4);
    // Left of the exclamation bar, inside the disc.
    let inside = (16 * 32 + 8) * 4;
    assert!(px[inside + 3] > 0);
    // Corners are outside the disc.
    assert_eq!(px[3], 0);
}

#[test]
fn oversized_raster_is_rejected() {
    let tree = usvg::Tree::from_data(
        br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"></svg>"#,
        &usvg::Options::default(),
    )
    .unwrap();
    assert!(rasterize_svg_to_premul_rgba8(&tree, MAX_DIM + 1, 1).is_err());
}

#[test]
fn text_raster_escapes_markup() {
    let r = SvgRasterizer::new(&[], None);
    let px = r
        .centered_text("<&>", 10.0, Rgba8Premul::white(), 20.0, 20.0, 20, 20)
        .unwrap();
    assert_eq!(px.len(), 20 * 20 * 4);
}

#[test]
fn escape_covers_quotes() {
    assert_eq!(escape_xml(r#"a"b'c"#), "a&quot;b&apos;c");
}
