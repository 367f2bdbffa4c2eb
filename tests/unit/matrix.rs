use super::*;

fn empty(side: usize) -> ModuleMatrix {
    ModuleMatrix::from_fn(side, |_, _| false).unwrap()
}

#[test]
fn finder_corners_for_minimal_symbol() {
    let m = empty(21);
    assert!(m.is_finder(0, 0));
    assert!(m.is_finder(0, 20));
    assert!(m.is_finder(20, 0));
    assert!(!m.is_finder(20, 20));

    assert!(m.is_finder(6, 6));
    assert!(!m.is_finder(7, 6));
    assert!(!m.is_finder(6, 7));
    assert!(m.is_finder(6, 14));
    assert!(!m.is_finder(6, 13));
    assert!(m.is_finder(14, 6));
    assert!(!m.is_finder(10, 10));
    assert_eq!(m.region(10, 10), CellRegion::Data);
    assert_eq!(m.region(0, 0), CellRegion::Finder);
}

#[test]
fn from_rows_rejects_ragged_and_empty() {
    assert!(matches!(
        ModuleMatrix::from_rows(&[]),
        Err(QrloomError::MatrixEncoding(_))
    ));

    let ragged = vec![vec![true, false], vec![true]];
    let err = ModuleMatrix::from_rows(&ragged).unwrap_err();
    assert!(err.to_string().contains("row 1"));
}

#[test]
fn from_rows_is_row_major() {
    let m = ModuleMatrix::from_rows(&[vec![true, false], vec![false, false]]).unwrap();
    assert_eq!(m.side(), 2);
    assert!(m.is_dark(0, 0));
    assert!(!m.is_dark(1, 0));
    assert!(!m.is_dark(5, 5));
    assert_eq!(m.dark_count(), 1);

    let cells: Vec<_> = m.cells().collect();
    assert_eq!(cells[1], (1, 0, false));
    assert_eq!(cells[2], (0, 1, false));
}

#[test]
fn qrcode_encoder_produces_valid_symbol() {
    let m = QrCodeEncoder
        .encode("https://example.com", EcLevel::H)
        .unwrap();
    assert!(m.side() >= 21);
    assert_eq!((m.side() - 17) % 4, 0);
    // Top-left finder: dark outer ring, light inner ring, dark 3x3 core.
    assert!(m.is_dark(0, 0));
    assert!(m.is_dark(6, 0));
    assert!(!m.is_dark(1, 1));
    assert!(m.is_dark(3, 3));
    // Separator next to the finder is always light.
    assert!(!m.is_dark(7, 0));
}

#[test]
fn higher_ec_never_shrinks_symbol() {
    let low = QrCodeEncoder.encode("https://example.com/a/b/c", EcLevel::L).unwrap();
    let high = QrCodeEncoder.encode("https://example.com/a/b/c", EcLevel::H).unwrap();
    assert!(high.side() >= low.side());
}

#[test]
fn oversized_payload_surfaces_matrix_error() {
    let data = "x".repeat(4000);
    let err = QrCodeEncoder.encode(&data, EcLevel::H).unwrap_err();
    assert!(matches!(err, QrloomError::MatrixEncoding(_)));
}
