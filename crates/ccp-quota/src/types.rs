//! Typed views over the loosely-typed store rows the quota manager reads
//! and patches, plus the domain results it returns. Parsing clamps/defaults
//! rather than failing hard on an unexpected row shape — callers always
//! get a usable (if conservative) value.

use ccp_core::store::Row;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

fn parse_dt(row: &Row, key: &str) -> Option<DateTime<Utc>> {
    row.get(key)?.as_str().and_then(|s| DateTime::parse_from_rfc3339(s).ok()).map(|d| d.with_timezone(&Utc))
}

fn parse_bool(row: &Row, key: &str, default: bool) -> bool {
    row.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
}

fn parse_str(row: &Row, key: &str) -> Option<String> {
    row.get(key).and_then(|v| v.as_str()).map(str::to_string)
}

/// A parsed snapshot of a `stores` row, as read for quota/trial/plan
/// decisions. Never constructed by hand in non-test code — always via
/// [`StoreSnapshot::from_row`].
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub store_id: String,
    pub is_active: bool,
    pub is_paused: bool,
    pub plan_id: Option<String>,
    pub subscription_id: Option<String>,
    pub trial_started_at: Option<DateTime<Utc>>,
    pub trial_ends_at: Option<DateTime<Utc>>,
    pub grace_period_ends_at: Option<DateTime<Utc>>,
    pub articles_remaining: Option<i64>,
}

impl StoreSnapshot {
    pub fn from_row(row: &Row) -> Self {
        Self {
            store_id: parse_str(row, "store_id").unwrap_or_default(),
            is_active: parse_bool(row, "is_active", true),
            is_paused: parse_bool(row, "is_paused", false),
            plan_id: parse_str(row, "plan_id"),
            subscription_id: parse_str(row, "subscription_id"),
            trial_started_at: parse_dt(row, "trial_started_at"),
            trial_ends_at: parse_dt(row, "trial_ends_at"),
            grace_period_ends_at: parse_dt(row, "grace_period_ends_at"),
            articles_remaining: row.get("articles_remaining").and_then(|v| v.as_i64()),
        }
    }

    pub fn trial_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.trial_ends_at, Some(ends_at) if ends_at < now)
    }
}

/// The outcome of `enforceQuotaWithLock`: always a normal return value,
/// never an exception — control flow stays in the type, not in panics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    pub lock_acquired: bool,
    pub articles_remaining: Option<i64>,
}

impl QuotaDecision {
    pub fn denied(reason: impl Into<String>, lock_acquired: bool) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
            lock_acquired,
            articles_remaining: None,
        }
    }

    pub fn allowed(articles_remaining: i64) -> Self {
        Self {
            allowed: true,
            reason: None,
            lock_acquired: true,
            articles_remaining: Some(articles_remaining),
        }
    }
}

/// The six valid reasons a plan transition may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    Upgrade,
    Downgrade,
    TrialStart,
    TrialExpired,
    SubscriptionCancelled,
    SubscriptionActivated,
}

#[derive(Debug, Clone)]
pub struct TransitionRequest {
    pub from_plan_id: Option<String>,
    pub to_plan_id: String,
    pub reason: TransitionReason,
    pub subscription_id: Option<String>,
    pub metadata: Option<Value>,
    /// Trial length for the destination plan; falls back to 14 days
    /// (`plan.trial_days || 14d`) when unset.
    pub plan_trial_days: Option<i64>,
}
