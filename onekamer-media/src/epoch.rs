//! Generation guard for in-flight resolutions.
//!
//! Inputs can change while a resolution is mid-flight (sequential awaits,
//! no cancellation), so each attempt takes an epoch token and a stale
//! attempt is refused at commit time instead of clobbering a newer result.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::resolver::ResolvedMedia;

#[derive(Default)]
pub struct ResolutionSlot {
    epoch: AtomicU64,
    current: Mutex<Option<ResolvedMedia>>,
}

impl ResolutionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new resolution attempt. Any token handed out earlier is
    /// stale from this point on.
    pub fn begin(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Publish a result. Returns false (and drops the result) when a newer
    /// attempt has started since `token` was issued.
    pub fn commit(&self, token: u64, resolved: ResolvedMedia) -> bool {
        if self.epoch.load(Ordering::SeqCst) != token {
            tracing::debug!(token, "stale media resolution dropped");
            return false;
        }
        let mut current = self.current.lock().expect("resolution slot lock poisoned");
        *current = Some(resolved);
        true
    }

    pub fn latest(&self) -> Option<ResolvedMedia> {
        self.current
            .lock()
            .expect("resolution slot lock poisoned")
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MediaKind;

    fn resolved(url: &str) -> ResolvedMedia {
        ResolvedMedia {
            url: Some(url.to_string()),
            kind: MediaKind::Image,
            error: false,
            backup_url: None,
        }
    }

    #[test]
    fn test_commit_current_token() {
        let slot = ResolutionSlot::new();
        let token = slot.begin();
        assert!(slot.commit(token, resolved("https://cdn.test/a.jpg")));
        assert_eq!(
            slot.latest().and_then(|r| r.url),
            Some("https://cdn.test/a.jpg".to_string())
        );
    }

    #[test]
    fn test_superseded_commit_is_dropped() {
        let slot = ResolutionSlot::new();
        let first = slot.begin();
        let second = slot.begin();

        // The newer attempt lands first; the older one must not overwrite it.
        assert!(slot.commit(second, resolved("https://cdn.test/new.jpg")));
        assert!(!slot.commit(first, resolved("https://cdn.test/old.jpg")));

        assert_eq!(
            slot.latest().and_then(|r| r.url),
            Some("https://cdn.test/new.jpg".to_string())
        );
    }
}
