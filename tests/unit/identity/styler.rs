use super::*;

#[test]
fn initials_from_two_words() {
    assert_eq!(initials("Anderson Huang"), "AH");
    assert_eq!(initials("ada  lovelace  byron"), "AL");
    assert_eq!(initials("\tgrace\nhopper"), "GH");
}

#[test]
fn initials_fall_back_to_name_prefix() {
    assert_eq!(initials("Jason"), "JA");
    assert_eq!(initials("X"), "X");
    assert_eq!(initials(""), "");
    // Prefix of the raw string, whitespace included.
    assert_eq!(initials(" q"), " Q");
}

#[test]
fn initials_are_deterministic() {
    for name in ["Anderson Huang", "Jason", "", "名 前", "x y z"] {
        assert_eq!(initials(name), initials(name));
    }
}

#[test]
fn colors_share_hue_and_text_is_darker() {
    for name in ["Anderson Huang", "Jason", "", "Zoë Ørsted", "42"] {
        let bg = background_color(name);
        let fg = text_color(name);
        assert_eq!(bg.hue, fg.hue);
        assert!((0.0..360.0).contains(&bg.hue));
        assert!(fg.brightness < bg.brightness);
        assert_eq!(bg.saturation, 0.5);
        assert_eq!(bg.brightness, 0.9);
        assert_eq!(fg.saturation, 0.7);
        assert_eq!(fg.brightness, 0.3);
    }
}

#[test]
fn hue_follows_documented_hash() {
    let mut h = Fnv1a64::new_default();
    h.write_bytes("Jason".as_bytes());
    let expected = ((h.finish() as i64).unsigned_abs() % 360) as f64;
    assert_eq!(IdentityStyler::new().hue("Jason"), expected);
    // Empty input hashes to the offset basis.
    let basis = (Fnv1a64::OFFSET_BASIS as i64).unsigned_abs() % 360;
    assert_eq!(IdentityStyler::new().hue(""), basis as f64);
}

#[test]
fn injected_hasher_controls_hue() {
    struct Fixed(i64);
    impl NameHasher for Fixed {
        fn hash_name(&self, _name: &str) -> i64 {
            self.0
        }
    }

    assert_eq!(IdentityStyler::with_hasher(Fixed(-725)).hue("anything"), 5.0);
    assert_eq!(IdentityStyler::with_hasher(Fixed(i64::MIN)).hue("x"), 8.0);

    let style = IdentityStyler::with_hasher(Fixed(90)).style("Anderson Huang");
    assert_eq!(style.initials, "AH");
    assert_eq!(style.background.hue, 90.0);
    assert_eq!(style.text.hue, 90.0);
}
