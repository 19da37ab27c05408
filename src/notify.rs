//! Standing handlers for unsolicited notifications, keyed by characteristic.
//!
//! Handlers run on the transport's callback context and must not block.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};

use crate::message::{decode_heart_rate_frame, decode_step_frame, HeartRateTag};
use crate::profile::CharacteristicId;

pub type NotifyHandler = Arc<dyn Fn(&[u8]) + Send + Sync>;

#[derive(Default)]
pub(crate) struct NotificationRegistry {
    handlers: HashMap<CharacteristicId, NotifyHandler>,
}

impl NotificationRegistry {
    /// Install a handler, replacing any previous one for the same characteristic.
    pub fn insert(&mut self, id: CharacteristicId, handler: NotifyHandler) {
        if self.handlers.insert(id, handler).is_some() {
            debug!("Replaced notification handler for {id}");
        }
    }

    pub fn remove(&mut self, id: &CharacteristicId) -> bool {
        self.handlers.remove(id).is_some()
    }

    pub fn get(&self, id: &CharacteristicId) -> Option<NotifyHandler> {
        self.handlers.get(id).cloned()
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}

/// Pass the payload through untouched.
pub fn raw_handler<F>(listener: F) -> NotifyHandler
where
    F: Fn(&[u8]) + Send + Sync + 'static,
{
    Arc::new(listener)
}

/// Decode realtime step frames; malformed frames are dropped.
pub fn steps_handler<F>(listener: F) -> NotifyHandler
where
    F: Fn(u32) + Send + Sync + 'static,
{
    Arc::new(move |data: &[u8]| {
        trace!("Steps frame: {}", hex::encode(data));
        if let Some(steps) = decode_step_frame(data) {
            listener(steps);
        }
    })
}

/// Decode heart-rate frames carrying `tag`; anything else is dropped.
pub fn heart_rate_handler<F>(tag: HeartRateTag, listener: F) -> NotifyHandler
where
    F: Fn(u8) + Send + Sync + 'static,
{
    Arc::new(move |data: &[u8]| {
        trace!("Heart rate frame: {}", hex::encode(data));
        if let Some(bpm) = decode_heart_rate_frame(data, tag) {
            listener(bpm);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{HEART_RATE_MEASUREMENT, REALTIME_STEPS};
    use std::sync::Mutex;

    #[test]
    fn test_steps_handler_filters_length() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = steps_handler(move |steps| sink.lock().unwrap().push(steps));

        handler(&[1, 0, 0, 0]);
        handler(&[1, 0, 0]);
        handler(&[0, 1, 0, 0]);

        assert_eq!(*seen.lock().unwrap(), vec![1, 256]);
    }

    #[test]
    fn test_heart_rate_handler_filters_tag() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler = heart_rate_handler(HeartRateTag::MI_BAND_2, move |bpm| {
            sink.lock().unwrap().push(bpm)
        });

        handler(&[6, 75]);
        handler(&[0, 72]);

        assert_eq!(*seen.lock().unwrap(), vec![72]);
    }

    #[test]
    fn test_registry_replace_and_remove() {
        let mut registry = NotificationRegistry::default();
        registry.insert(REALTIME_STEPS, raw_handler(|_| {}));
        registry.insert(REALTIME_STEPS, raw_handler(|_| {}));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(&HEART_RATE_MEASUREMENT).is_none());

        assert!(registry.remove(&REALTIME_STEPS));
        assert!(!registry.remove(&REALTIME_STEPS));
        assert!(registry.get(&REALTIME_STEPS).is_none());
    }
}
