use std::sync::{Arc, Weak};
use tokio::sync::Semaphore;

/// Token-bucket pacing for outbound requests.
pub struct RateLimiter {
    sem: Arc<Semaphore>,
}

impl Clone for RateLimiter {
    fn clone(&self) -> Self { RateLimiter { sem: self.sem.clone() } }
}

impl RateLimiter {
    /// Must be called from within a tokio runtime.
    pub fn new(tokens_per_sec: u32) -> Self {
        let rate = tokens_per_sec.max(1);
        let sem = Arc::new(Semaphore::new(0));
        let sem_bg: Weak<Semaphore> = Arc::downgrade(&sem);
        let burst = rate as usize;
        let interval_us = (1_000_000u64 / rate as u64).max(1);
        // Refill in a background task; stops once every handle is dropped
        tokio::spawn(async move {
            let mut t = tokio::time::interval(std::time::Duration::from_micros(interval_us));
            t.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                t.tick().await;
                let Some(sem) = sem_bg.upgrade() else { break };
                if sem.available_permits() < burst {
                    sem.add_permits(1);
                }
            }
        });
        RateLimiter { sem }
    }

    pub async fn acquire(&self) {
        if let Ok(permit) = self.sem.acquire().await {
            permit.forget();
        }
    }
}
