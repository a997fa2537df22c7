//! Per-user memory of videos presented in a format menu.

use std::collections::{HashMap, VecDeque};

/// What the bot knows about a video it offered to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RememberedVideo {
    /// Title used as caption or audio title on upload.
    pub title: String,

    /// Canonical page URL reported by the extractor.
    pub webpage_url: Option<String>,
}

type Key = (i64, String);

/// Bounded map from `(user, video id)` to the video's details.
///
/// When full, the oldest inserted entry is evicted first.
#[derive(Debug)]
pub struct VideoMemory {
    capacity: usize,
    entries: HashMap<Key, RememberedVideo>,
    order: VecDeque<Key>,
}

impl VideoMemory {
    /// Creates an empty memory holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    /// Stores or refreshes what the user was shown for a video.
    pub fn remember(&mut self, user_id: i64, video_id: &str, video: RememberedVideo) {
        let key = (user_id, video_id.to_owned());

        if self.entries.insert(key.clone(), video).is_some() {
            self.order.retain(|k| k != &key);
        }
        self.order.push_back(key);

        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    /// Looks up a previously presented video.
    #[must_use]
    pub fn recall(&self, user_id: i64, video_id: &str) -> Option<&RememberedVideo> {
        self.entries.get(&(user_id, video_id.to_owned()))
    }

    /// Number of remembered videos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str) -> RememberedVideo {
        RememberedVideo {
            title: title.to_owned(),
            webpage_url: None,
        }
    }

    #[test]
    fn test_remember_and_recall() {
        let mut memory = VideoMemory::new(10);
        memory.remember(1, "abc", video("First"));

        assert_eq!(memory.recall(1, "abc").map(|v| v.title.as_str()), Some("First"));
        assert!(memory.recall(2, "abc").is_none());
        assert!(memory.recall(1, "xyz").is_none());
    }

    #[test]
    fn test_titles_are_kept_per_video() {
        let mut memory = VideoMemory::new(10);
        memory.remember(1, "abc", video("First"));
        memory.remember(1, "def", video("Second"));

        assert_eq!(memory.recall(1, "abc").map(|v| v.title.as_str()), Some("First"));
        assert_eq!(memory.recall(1, "def").map(|v| v.title.as_str()), Some("Second"));
    }

    #[test]
    fn test_evicts_oldest() {
        let mut memory = VideoMemory::new(2);
        memory.remember(1, "a", video("A"));
        memory.remember(1, "b", video("B"));
        memory.remember(1, "c", video("C"));

        assert_eq!(memory.len(), 2);
        assert!(memory.recall(1, "a").is_none());
        assert!(memory.recall(1, "c").is_some());
    }

    #[test]
    fn test_refresh_moves_entry_to_back() {
        let mut memory = VideoMemory::new(2);
        memory.remember(1, "a", video("A"));
        memory.remember(1, "b", video("B"));
        memory.remember(1, "a", video("A2"));
        memory.remember(1, "c", video("C"));

        assert!(memory.recall(1, "b").is_none());
        assert_eq!(memory.recall(1, "a").map(|v| v.title.as_str()), Some("A2"));
    }

    #[test]
    fn test_zero_capacity_still_holds_latest() {
        let mut memory = VideoMemory::new(0);
        memory.remember(1, "a", video("A"));
        assert_eq!(memory.len(), 1);
    }
}
