use std::{num::NonZeroU32, time::Duration};

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};

// The mirror throttles bursts harder than a steady trickle.
const MS_BETWEEN_REQ: Duration = Duration::from_millis(100);

pub struct RateLimiter {
    req_per_sec: DefaultDirectRateLimiter,
    ms_between_req: Option<DefaultDirectRateLimiter>,
}

impl RateLimiter {
    pub fn new(req_per_sec: NonZeroU32) -> Self {
        // Limit to X total req/sec on average.
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(req_per_sec));

        // No two requests closer than Y ms.
        let ms_between_req = Quota::with_period(MS_BETWEEN_REQ).map(GovernorRateLimiter::direct);

        RateLimiter {
            req_per_sec,
            ms_between_req,
        }
    }

    pub async fn wait_until_ready(&self) {
        // Per-second budget first, so callers queued on the spacing limiter
        // can't all cross the per-second boundary together.
        self.req_per_sec.until_ready().await;
        if let Some(ms_between_req) = &self.ms_between_req {
            ms_between_req.until_ready().await;
        }
    }
}
