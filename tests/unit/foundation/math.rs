use super::*;

#[test]
fn mul_div255_identities() {
    assert_eq!(mul_div255_u8(200, 255), 200);
    assert_eq!(mul_div255_u8(200, 0), 0);
    assert_eq!(mul_div255_u8(255, 128), 128);
}

#[test]
fn div_alpha_inverts_opaque_and_half() {
    assert_eq!(div_alpha_u8(77, 255), 77);
    assert_eq!(div_alpha_u8(64, 128), 128);
    assert_eq!(div_alpha_u8(5, 0), 0);
}

#[test]
fn div_alpha_saturates() {
    assert_eq!(div_alpha_u8(200, 100), 255);
}
