/// Rate Limiting System
use crate::{
    config::RateLimitSettings,
    error::{DirectoryError, DirectoryResult},
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

const RETRY_AFTER: std::time::Duration = std::time::Duration::from_secs(1);

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    public: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    admin: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitSettings) -> Self {
        let public_quota = Quota::per_second(non_zero(config.public_rps))
            .allow_burst(non_zero(config.burst_size));

        // Admins get twice the burst
        let admin_quota = Quota::per_second(non_zero(config.admin_rps))
            .allow_burst(non_zero(config.burst_size.saturating_mul(2)));

        Self {
            enabled: config.enabled,
            public: Arc::new(GovernorLimiter::direct(public_quota)),
            admin: Arc::new(GovernorLimiter::direct(admin_quota)),
        }
    }

    /// Check rate limit for public endpoints
    pub fn check_public(&self) -> DirectoryResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.public
            .check()
            .map_err(|_| DirectoryError::RateLimitExceeded { retry_after: RETRY_AFTER })
    }

    /// Check rate limit for admin endpoints
    pub fn check_admin(&self) -> DirectoryResult<()> {
        if !self.enabled {
            return Ok(());
        }
        self.admin
            .check()
            .map_err(|_| DirectoryError::RateLimitExceeded { retry_after: RETRY_AFTER })
    }
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(ctx): State<crate::context::AppContext>,
    request: Request,
    next: Next,
) -> Response {
    let result = if request.uri().path().starts_with("/admin") {
        ctx.rate_limiter.check_admin()
    } else {
        ctx.rate_limiter.check_public()
    };

    match result {
        Ok(()) => next.run(request).await,
        Err(e) => {
            tracing::warn!(path = %request.uri().path(), "Rate limit exceeded");
            e.into_response()
        }
    }
}
