//! Outgoing message pacing for the Telegram API.
//!
//! Telegram allows roughly one message per second per chat and answers
//! bursts with FLOOD_WAIT. The limiter spaces messages per destination
//! chat, whoever triggered them, and pauses everything while a flood wait
//! is in effect. Chats are keyed by their Bot API dialog id.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Default)]
struct Slots {
    /// Earliest instant the next message to each chat may go out.
    next_allowed: HashMap<i64, Instant>,

    /// Global pause after a flood wait.
    paused_until: Option<Instant>,
}

/// Rate limiter that enforces minimum intervals between messages to a chat.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum duration between messages to the same chat.
    min_interval: Duration,

    slots: Mutex<Slots>,
}

impl RateLimiter {
    /// Creates a new rate limiter with the specified minimum interval.
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            slots: Mutex::new(Slots::default()),
        }
    }

    /// Waits until a message to `chat` is allowed and reserves the slot.
    ///
    /// Returns the duration waited (0 if no wait was needed).
    pub async fn wait_and_acquire(&self, chat: i64) -> Duration {
        let wait_duration = {
            let mut slots = self.slots.lock().await;
            let now = Instant::now();

            let chat_ready = slots.next_allowed.get(&chat).copied().unwrap_or(now);
            let global_ready = slots.paused_until.unwrap_or(now);
            let send_at = chat_ready.max(global_ready).max(now);

            slots.next_allowed.insert(chat, send_at + self.min_interval);
            slots.next_allowed.retain(|_, at| *at > now);
            send_at - now
        };

        if !wait_duration.is_zero() {
            debug!(
                "Rate limiter: waiting {:?} before next message to {}",
                wait_duration, chat
            );
            tokio::time::sleep(wait_duration).await;
        }

        wait_duration
    }

    /// Checks if a message to `chat` is currently allowed without blocking.
    pub async fn is_allowed(&self, chat: i64) -> bool {
        self.time_until_allowed(chat).await.is_zero()
    }

    /// Returns the time remaining until a message to `chat` is allowed.
    pub async fn time_until_allowed(&self, chat: i64) -> Duration {
        let slots = self.slots.lock().await;
        let now = Instant::now();

        let chat_ready = slots.next_allowed.get(&chat).copied().unwrap_or(now);
        let global_ready = slots.paused_until.unwrap_or(now);
        chat_ready.max(global_ready).saturating_duration_since(now)
    }

    /// Pauses all chats after a flood wait error from Telegram.
    pub async fn handle_flood_wait(&self, wait_seconds: u32) {
        warn!(
            "Received flood wait from Telegram: {} seconds",
            wait_seconds
        );
        let until = Instant::now() + Duration::from_secs(u64::from(wait_seconds));

        let mut slots = self.slots.lock().await;
        slots.paused_until = Some(slots.paused_until.map_or(until, |current| current.max(until)));
    }

    /// Resets the rate limiter, allowing immediate messages.
    pub async fn reset(&self) {
        let mut slots = self.slots.lock().await;
        *slots = Slots::default();
    }
}
