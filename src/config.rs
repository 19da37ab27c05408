//! Tunable engine parameters.

use std::time::Duration;

use crate::message::HeartRateTag;

#[derive(Debug, Clone, Default)]
pub struct BandConfig {
    /// First byte expected in heart-rate frames, depends on the band generation
    pub heart_rate_tag: HeartRateTag,
    /// How long a logical operation waits for its completion. `None` waits forever.
    ///
    /// Expiry does not withdraw the transport call; the operation slot stays
    /// taken until the transport reports back or the link goes down.
    pub operation_timeout: Option<Duration>,
    /// How long `connect` waits for the link to become ready. `None` waits forever.
    pub connect_timeout: Option<Duration>,
}

impl BandConfig {
    pub fn with_heart_rate_tag(mut self, tag: HeartRateTag) -> Self {
        self.heart_rate_tag = tag;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }
}

#[test]
fn test_default_config() {
    let config = BandConfig::default();
    assert_eq!(config.heart_rate_tag, HeartRateTag::MI_BAND_1S);
    assert_eq!(config.operation_timeout, None);

    let config = config
        .with_heart_rate_tag(HeartRateTag::MI_BAND_2)
        .with_operation_timeout(Duration::from_secs(5));
    assert_eq!(config.heart_rate_tag, HeartRateTag(0));
    assert_eq!(config.operation_timeout, Some(Duration::from_secs(5)));
}
