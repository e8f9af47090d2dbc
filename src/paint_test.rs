use super::*;

// =============================================================
// decode_png_data_url
// =============================================================

#[test]
fn decodes_png_payload() {
    // "\x89PNG" base64-encoded
    let bytes = decode_png_data_url("data:image/png;base64,iVBORw==").expect("decode");
    assert_eq!(bytes, vec![0x89, b'P', b'N', b'G']);
}

#[test]
fn empty_payload_is_empty_bytes() {
    assert_eq!(decode_png_data_url("data:image/png;base64,").expect("decode"), Vec::<u8>::new());
}

#[test]
fn rejects_other_formats() {
    let err = decode_png_data_url("data:image/jpeg;base64,AAAA").expect_err("should fail");
    assert!(matches!(err, ExportError::Encode(_)));
}

#[test]
fn rejects_blank_canvas_marker() {
    // Browsers return "data:," for zero-sized canvases.
    assert!(matches!(decode_png_data_url("data:,"), Err(ExportError::Encode(_))));
}

#[test]
fn rejects_invalid_base64() {
    assert!(matches!(decode_png_data_url("data:image/png;base64,@@@@"), Err(ExportError::Encode(_))));
}

// =============================================================
// ExportError
// =============================================================

#[test]
fn export_error_messages() {
    assert_eq!(ExportError::Canvas("no document".to_owned()).to_string(), "canvas unavailable: no document");
    assert_eq!(ExportError::Paint("boom".to_owned()).to_string(), "paint failed: boom");
}
