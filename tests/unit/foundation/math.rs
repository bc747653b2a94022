use super::*;

#[test]
fn fnv_chunking_does_not_change_the_hash() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"avatar");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"a");
    b.write_bytes(b"vatar");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn fnv_matches_reference_vectors() {
    assert_eq!(Fnv1a64::new_default().finish(), 0xcbf2_9ce4_8422_2325);

    let mut h = Fnv1a64::new_default();
    h.write_bytes(b"a");
    assert_eq!(h.finish(), 0xaf63_dc4c_8601_ec8c);
}

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}
