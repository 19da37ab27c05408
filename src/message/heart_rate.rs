/// Expected value of the first byte of a heart-rate frame.
///
/// Band generations disagree on it, so it is part of the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartRateTag(pub u8);

impl HeartRateTag {
    pub const MI_BAND_1S: HeartRateTag = HeartRateTag(6);
    pub const MI_BAND_2: HeartRateTag = HeartRateTag(0);
}

impl Default for HeartRateTag {
    fn default() -> Self {
        Self::MI_BAND_1S
    }
}

/// Decode a heart-rate frame `[tag, bpm]`. Frames of another length or tag are ignored.
pub fn decode_heart_rate_frame(data: &[u8], expected: HeartRateTag) -> Option<u8> {
    match data {
        [tag, bpm] if *tag == expected.0 => Some(*bpm),
        _ => None,
    }
}

#[test]
fn test_decode_heart_rate_frame() {
    assert_eq!(decode_heart_rate_frame(&[6, 75], HeartRateTag::MI_BAND_1S), Some(75));
    assert_eq!(decode_heart_rate_frame(&[0, 75], HeartRateTag::MI_BAND_2), Some(75));
    assert_eq!(decode_heart_rate_frame(&[6, 200], HeartRateTag(6)), Some(200));
}

#[test]
fn test_decode_heart_rate_frame_rejected() {
    assert_eq!(decode_heart_rate_frame(&[0, 75], HeartRateTag::MI_BAND_1S), None);
    assert_eq!(decode_heart_rate_frame(&[6, 75, 0], HeartRateTag::MI_BAND_1S), None);
    assert_eq!(decode_heart_rate_frame(&[6], HeartRateTag::MI_BAND_1S), None);
}
