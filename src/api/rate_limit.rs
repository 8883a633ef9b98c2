use crate::config::RateLimit;
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Above this many tracked clients the table is reset rather than grown.
const MAX_VISITORS: usize = 1000;

/// Token bucket rate limiter keyed by client IP.
#[derive(Debug)]
pub(super) struct RateLimiter {
    settings: RateLimit,
    visitors: Mutex<HashMap<IpAddr, Bucket>>,
}

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: f64,
    updated: Instant,
}

impl RateLimiter {
    pub fn new(settings: RateLimit) -> Self {
        Self {
            settings,
            visitors: Mutex::new(HashMap::new()),
        }
    }

    /// Take a token for `client`, returning `false` if its bucket is empty.
    pub fn allow(&self, client: IpAddr) -> bool {
        self.allow_at(client, Instant::now())
    }

    fn allow_at(&self, client: IpAddr, now: Instant) -> bool {
        if self.settings.requests_per_second == 0 {
            return true;
        }
        let burst = f64::from(self.settings.burst.max(1));
        let rate = f64::from(self.settings.requests_per_second);

        let mut visitors = self.visitors.lock().unwrap_or_else(PoisonError::into_inner);
        if visitors.len() >= MAX_VISITORS && !visitors.contains_key(&client) {
            tracing::debug!("rate limiter tracking {} clients, resetting", visitors.len());
            visitors.clear();
        }
        let bucket = visitors.entry(client).or_insert(Bucket {
            tokens: burst,
            updated: now,
        });

        let elapsed = now.saturating_duration_since(bucket.updated).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * rate).min(burst);
        bucket.updated = now;
        if bucket.tokens < 1.0 {
            return false;
        }
        bucket.tokens -= 1.0;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    const CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 10));
    const OTHER: IpAddr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 11));

    fn limiter(requests_per_second: u32, burst: u32) -> RateLimiter {
        RateLimiter::new(RateLimit {
            requests_per_second,
            burst,
        })
    }

    #[test]
    fn allows_a_burst_then_refills() {
        let limiter = limiter(2, 3);
        let start = Instant::now();

        assert!((0..3).all(|_| limiter.allow_at(CLIENT, start)));
        assert!(!limiter.allow_at(CLIENT, start));
        assert!(limiter.allow_at(OTHER, start));

        let later = start + Duration::from_millis(500);
        assert!(limiter.allow_at(CLIENT, later));
        assert!(!limiter.allow_at(CLIENT, later));
    }

    #[test]
    fn zero_rate_disables_limiting() {
        let limiter = limiter(0, 0);
        let now = Instant::now();

        assert!((0..100).all(|_| limiter.allow_at(CLIENT, now)));
    }

    #[test]
    fn resets_when_tracking_too_many_clients() {
        let limiter = limiter(1, 1);
        let now = Instant::now();
        assert!(limiter.allow_at(CLIENT, now));
        assert!(!limiter.allow_at(CLIENT, now));

        for i in 0..MAX_VISITORS {
            let octets = u32::try_from(i).unwrap().to_be_bytes();
            limiter.allow_at(IpAddr::V4(Ipv4Addr::new(10, octets[1], octets[2], octets[3])), now);
        }

        assert!(limiter.allow_at(CLIENT, now));
    }
}
