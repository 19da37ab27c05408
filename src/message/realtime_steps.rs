/// Decode a realtime step-counter frame: exactly 4 bytes, little endian.
pub fn decode_step_frame(data: &[u8]) -> Option<u32> {
    let bytes: [u8; 4] = data.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

#[test]
fn test_decode_step_frame() {
    assert_eq!(decode_step_frame(&[1, 0, 0, 0]), Some(1));
    assert_eq!(decode_step_frame(&[0, 1, 0, 0]), Some(256));
    assert_eq!(decode_step_frame(&[0x10, 0x27, 0, 0]), Some(10_000));
}

#[test]
fn test_decode_step_frame_wrong_length() {
    assert_eq!(decode_step_frame(&[1, 0, 0]), None);
    assert_eq!(decode_step_frame(&[1, 0, 0, 0, 0]), None);
    assert_eq!(decode_step_frame(&[]), None);
}
