//! crates/mentor_core/src/dashboard.rs
//!
//! Read-only aggregations for the dashboard, the public leaderboard and
//! platform analytics.

use chrono::{Datelike, Duration, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::{
    Caller, DashboardStats, LeaderboardEntry, MonthlyActivity, PlatformAnalytics, SessionDigest,
};
use crate::ports::{DashboardStore, PortResult};

pub const RECENT_SESSIONS_LIMIT: i64 = 10;
pub const LEADERBOARD_LIMIT: i64 = 20;
/// Months covered by the analytics view, current month included.
pub const ANALYTICS_MONTHS: u32 = 6;

#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn DashboardStore>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn DashboardStore>) -> Self {
        Self { store }
    }

    pub async fn stats(&self, caller: &Caller) -> PortResult<DashboardStats> {
        self.store.dashboard_stats(caller.user_id).await
    }

    pub async fn recent_sessions(&self, caller: &Caller) -> PortResult<Vec<SessionDigest>> {
        self.store
            .recent_sessions(caller.user_id, caller.role, RECENT_SESSIONS_LIMIT)
            .await
    }

    pub async fn upcoming_sessions(&self, caller: &Caller) -> PortResult<Vec<SessionDigest>> {
        self.store
            .upcoming_sessions(caller.user_id, caller.role, Utc::now())
            .await
    }

    pub async fn analytics(&self, caller: &Caller) -> PortResult<Vec<MonthlyActivity>> {
        let now = Utc::now();
        // First day of the oldest month in the window.
        let mut year = now.year();
        let mut month = now.month() as i32 - (ANALYTICS_MONTHS as i32 - 1);
        while month < 1 {
            month += 12;
            year -= 1;
        }
        let since = Utc
            .with_ymd_and_hms(year, month as u32, 1, 0, 0, 0)
            .single()
            .unwrap_or_else(|| now - Duration::days(31 * ANALYTICS_MONTHS as i64));
        self.store.monthly_activity(caller.user_id, since).await
    }

    pub async fn leaderboard(&self) -> PortResult<Vec<LeaderboardEntry>> {
        self.store.leaderboard(LEADERBOARD_LIMIT).await
    }

    pub async fn platform(&self) -> PortResult<PlatformAnalytics> {
        self.store.platform_analytics().await
    }
}
