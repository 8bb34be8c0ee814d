use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Jitter, Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

type InnerLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Request budget shared by every call of a run.
#[derive(Clone)]
pub struct BitstampLimiter {
    limiter: Arc<InnerLimiter>,
}

impl BitstampLimiter {
    pub fn new(requests_per_minute: NonZeroU32) -> Self {
        let quota = Quota::per_minute(requests_per_minute);
        Self {
            limiter: Arc::new(RateLimiter::direct(quota)),
        }
    }

    /// 异步等待令牌（含抖动）
    pub async fn acquire(&self) {
        let jitter = Jitter::up_to(Duration::from_millis(30));
        self.limiter.until_ready_with_jitter(jitter).await;
    }

    /// 非阻塞尝试获取令牌，返回是否成功
    #[cfg(test)]
    fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl std::fmt::Debug for BitstampLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitstampLimiter").finish_non_exhaustive()
    }
}
