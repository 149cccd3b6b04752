//! Observability guide: metrics, tracing and the structured log line format
//! as they actually appear across the `ccp-*` crates.

/// Metrics documentation.
pub mod metrics {
    //! # Metrics Guide
    //!
    //! Every crate that carries per-key or per-call state exposes its
    //! counters behind the `metrics` feature (`metrics = "0.24"`), an
    //! optional, zero-cost-when-disabled metrics dependency rather than a
    //! bespoke reporting API.
    //!
    //! ```toml
    //! [dependencies]
    //! ccp-retry = { version = "0.8", features = ["metrics"] }
    //! ccp-ratelimiter = { version = "0.8", features = ["metrics"] }
    //! metrics = "0.24"
    //! metrics-exporter-prometheus = "0.16"
    //! ```
    //!
    //! ## Available metrics by subsystem
    //!
    //! ### Retry (`ccp-retry`)
    //!
    //! - `retry_calls_total{result}` — terminal outcomes (success/exhausted/cancelled)
    //! - `retry_attempts_total` — individual attempts across all calls
    //! - `retry_budget_exhausted_total` — calls refused because the shared budget ran out
    //!
    //! ### Rate limiter (`ccp-ratelimiter`)
    //!
    //! - `ratelimiter_checks_total{key, result}` — admitted/rejected per key
    //! - `ratelimiter_wait_duration_seconds{key}` — `waitForToken` wait time histogram
    //! - `ratelimiter_concurrency{key}` — current concurrency gauge per key
    //! - `ratelimiter_tokens{key}` — current token stock gauge per key
    //!
    //! ### Cache (`ccp-cache`, reused by `ccp-jobqueue`'s result cache)
    //!
    //! - `cache_requests_total{result}` — hit/miss counts
    //! - `cache_evictions_total` — entries evicted on size cap
    //! - `cache_hit_count{key}` — per-entry hit counter mirrored from the entry's `hit_count`
    //!
    //! ## Instance naming
    //!
    //! Every metric that can have more than one live instance in a process
    //! (a rate limiter per shop, a retry budget per client) carries its key
    //! or client name as a label, so a single Prometheus query can break
    //! down by shop or by upstream without separate metric names per
    //! instance.
    //!
    //! ## Example queries
    //!
    //! ```promql
    //! # Rate-limiter rejection rate per shop
    //! rate(ratelimiter_checks_total{result="rejected"}[5m])
    //!   / rate(ratelimiter_checks_total[5m])
    //!
    //! # Average retry attempts per call
    //! rate(retry_attempts_total[5m]) / rate(retry_calls_total[5m])
    //!
    //! # Result-cache hit rate
    //! rate(cache_requests_total{result="hit"}[5m]) / rate(cache_requests_total[5m])
    //! ```
}

/// Tracing documentation.
pub mod tracing_guide {
    //! # Tracing Guide
    //!
    //! Enable the `tracing` feature on any subsystem crate to get structured
    //! spans and events at the decision points that matter — lock
    //! acquisition, quota decisions, retry attempts, rate-limiter admits and
    //! rejects, batch operation outcomes:
    //!
    //! ```toml
    //! [dependencies]
    //! ccp-quota = { version = "0.8", features = ["tracing"] }
    //! tracing-subscriber = { version = "0.3", features = ["json"] }
    //! ```
    //!
    //! ```text
    //! DEBUG ccp_quota: lock acquired store_id="store_1" operation="quota_check" correlation_id="c-7f2a"
    //! WARN  ccp_quota: store_paused_trial_expired store_id="store_1" correlation_id="c-7f2a"
    //! INFO  ccp_retry: call succeeded after retries attempts=3 correlation_id="c-7f2a"
    //! DEBUG ccp_ratelimiter: token bucket admitted key="shop_1:rest" tokens_remaining=12.0
    //! ```
    //!
    //! The structured log line format is the line-delimited JSON object
    //! `{level, service, message, timestamp, ...context}` — errors to
    //! stderr, everything else to stdout; see [`ccp_core::store::LogLine`]
    //! for the type every crate's `tracing` feature ultimately renders
    //! through a `tracing-subscriber` JSON formatter.
}

/// Event system documentation.
pub mod events {
    //! # Event System Guide
    //!
    //! Independent of `tracing`/`metrics`, every subsystem that needs
    //! caller-supplied observability hooks implements
    //! [`ccp_core::events::ResilienceEvent`] /
    //! [`ccp_core::events::EventListener`] — the retry engine's
    //! `on_retry`, the rate limiter's admit/reject events, the batch
    //! executor's progress callback. A listener that panics is caught and
    //! logged rather than propagated, so a broken alerting hook never takes
    //! down the call it's observing: best-effort paths are swallowed,
    //! not surfaced.
    //!
    //! ```rust,ignore
    //! let retry = RetryLayer::builder()
    //!     .on_retry(|attempt, err| {
    //!         // custom handling, e.g. forward to an alerting system
    //!     })
    //!     .build();
    //! ```
}
