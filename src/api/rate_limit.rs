//! Rate Limiting
//!
//! Fixed-window request budgets per client, applied as axum middleware.
//!
//! `/fibonacci` carries its own per-minute budget. Every other route shares the default
//! hourly and daily budgets.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use tokio::sync::Mutex;
use tracing::debug;

use super::handlers::AppState;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

// == Rate Limiter ==
/// Counts requests per client key inside fixed windows.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    /// A `max_requests` of zero disables limiting.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.max_requests > 0
    }

    // == Check ==
    /// Records one request for `client`.
    ///
    /// Returns the time until the window resets when the budget is already spent.
    pub async fn check(&self, client: &str) -> std::result::Result<(), Duration> {
        if !self.is_enabled() {
            return Ok(());
        }

        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        let window = clients.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            return Err(self.window.saturating_sub(now.duration_since(window.started)));
        }

        window.count += 1;
        Ok(())
    }

    // == Cleanup ==
    /// Forgets clients whose window has ended, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut clients = self.clients.lock().await;
        let before = clients.len();
        clients.retain(|_, window| now.duration_since(window.started) < self.window);
        before - clients.len()
    }

    pub async fn tracked_clients(&self) -> usize {
        self.clients.lock().await.len()
    }

    /// Like [`check`](Self::check), but turns a spent budget into a 429 error.
    pub async fn enforce(&self, client: &str) -> Result<()> {
        self.check(client).await.map_err(|retry_after| {
            debug!("Rate limited client {}", client);
            AppError::RateLimited(format!(
                "{} requests per {}s, retry in {}s",
                self.max_requests,
                self.window.as_secs(),
                retry_after.as_secs().max(1)
            ))
        })
    }
}

// == Middleware ==
/// Rejects `/fibonacci` requests from clients that exceeded the endpoint budget with 429.
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let client = client_key(&request);
    state.rate_limiter.enforce(&client).await?;
    Ok(next.run(request).await)
}

/// Applies the default budgets to routes without a limit of their own.
pub async fn default_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    let client = client_key(&request);
    for limiter in state.default_limits.iter() {
        limiter.enforce(&client).await?;
    }
    Ok(next.run(request).await)
}

/// Identifies the caller: peer address, then first `X-Forwarded-For` hop, then "unknown".
fn client_key(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }

    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;

    #[tokio::test]
    async fn test_allows_up_to_limit() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.check("10.0.0.1").await.is_ok());
        }
        assert!(limiter.check("10.0.0.1").await.is_err());
    }

    #[tokio::test]
    async fn test_clients_are_independent() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("a").await.is_err());
        assert!(limiter.check("b").await.is_ok());
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(1, Duration::from_millis(50));
        assert!(limiter.check("a").await.is_ok());
        assert!(limiter.check("a").await.is_err());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert!(limiter.check("a").await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_limiter() {
        let limiter = RateLimiter::new(0, Duration::from_secs(60));
        for _ in 0..100 {
            assert!(limiter.check("a").await.is_ok());
        }
        assert_eq!(limiter.tracked_clients().await, 0);
    }

    #[tokio::test]
    async fn test_cleanup_drops_finished_windows() {
        let limiter = RateLimiter::new(5, Duration::from_millis(50));
        limiter.check("a").await.unwrap();
        limiter.check("b").await.unwrap();
        assert_eq!(limiter.cleanup_expired().await, 0);

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(limiter.cleanup_expired().await, 2);
        assert_eq!(limiter.tracked_clients().await, 0);
    }

    #[tokio::test]
    async fn test_enforce_reports_budget() {
        let limiter = RateLimiter::new(1, Duration::from_secs(3600));
        assert!(limiter.enforce("a").await.is_ok());

        match limiter.enforce("a").await {
            Err(AppError::RateLimited(message)) => {
                assert!(message.starts_with("1 requests per 3600s"), "{}", message)
            }
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }

    #[test]
    fn test_client_key_sources() {
        let mut request = http::Request::builder()
            .uri("/fibonacci")
            .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_key(&request), "203.0.113.7");

        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 168, 1, 2], 4000))));
        assert_eq!(client_key(&request), "192.168.1.2");

        let anonymous = http::Request::builder().body(Body::empty()).unwrap();
        assert_eq!(client_key(&anonymous), "unknown");
    }
}
