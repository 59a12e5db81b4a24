//! Dashboard read models.

use gigledger_core::dashboard::ACTIVITY_FEED_LIMIT;
use gigledger_core::status::PaymentType;
use gigledger_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::payment::PaymentWithNames;

/// Headline counters for `/dashboard/stats`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub active_clients: i64,
    pub active_projects: i64,
    pub pending_tasks: i64,
    pub total_workers: i64,
    pub total_revenue: f64,
    pub pending_payments: f64,
    pub monthly_revenue: f64,
    pub tasks_completed_this_month: i64,
}

/// Paid totals for one calendar month.
#[derive(Debug, Clone, Default, FromRow)]
pub struct MonthTotals {
    pub revenue: f64,
    pub expenses: f64,
}

/// One point on the revenue chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub month: String,
    pub revenue: f64,
    pub expenses: f64,
    pub profit: f64,
}

impl ChartPoint {
    pub fn new(month: String, totals: MonthTotals) -> Self {
        Self {
            month,
            revenue: totals.revenue,
            expenses: totals.expenses,
            profit: totals.revenue - totals.expenses,
        }
    }
}

/// A recently created client, project or task.
#[derive(Debug, Clone, FromRow)]
pub struct RecentEntry {
    pub id: DbId,
    pub name: String,
    /// Client name for projects, project name for tasks.
    pub context: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Client,
    Project,
    Task,
    Payment,
}

/// One entry of the merged activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub title: String,
    pub description: String,
    pub timestamp: Timestamp,
}

impl ActivityItem {
    pub fn client(entry: RecentEntry) -> Self {
        Self {
            id: format!("client-{}", entry.id),
            kind: ActivityKind::Client,
            title: "New client added".into(),
            description: format!("{} was added to your client list", entry.name),
            timestamp: entry.created_at,
        }
    }

    pub fn project(entry: RecentEntry) -> Self {
        let description = match entry.context {
            Some(client) => format!("{} for {client}", entry.name),
            None => entry.name,
        };
        Self {
            id: format!("project-{}", entry.id),
            kind: ActivityKind::Project,
            title: "New project created".into(),
            description,
            timestamp: entry.created_at,
        }
    }

    pub fn task(entry: RecentEntry) -> Self {
        let description = match entry.context {
            Some(project) => format!("{} in {project}", entry.name),
            None => entry.name,
        };
        Self {
            id: format!("task-{}", entry.id),
            kind: ActivityKind::Task,
            title: "New task created".into(),
            description,
            timestamp: entry.created_at,
        }
    }

    pub fn payment(row: PaymentWithNames) -> Self {
        let counterparty = row
            .client_name
            .or(row.worker_name)
            .or(row.project_name)
            .unwrap_or_else(|| "Unknown".into());
        let direction = match row.payment.payment_type {
            PaymentType::Incoming => "received from",
            PaymentType::Outgoing => "paid to",
        };
        Self {
            id: format!("payment-{}", row.payment.id),
            kind: ActivityKind::Payment,
            title: format!(
                "Payment {}",
                row.payment.status.as_str().to_ascii_lowercase()
            ),
            description: format!("{:.2} {direction} {counterparty}", row.payment.amount),
            timestamp: row.payment.created_at,
        }
    }
}

/// Merge per-entity items into the feed: newest first, capped.
pub fn merge_activity(items: impl IntoIterator<Item = ActivityItem>) -> Vec<ActivityItem> {
    let mut feed: Vec<_> = items.into_iter().collect();
    feed.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    feed.truncate(ACTIVITY_FEED_LIMIT);
    feed
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    fn entry(id: DbId, minutes_ago: i64) -> RecentEntry {
        RecentEntry {
            id,
            name: format!("item {id}"),
            context: Some("Acme".into()),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn feed_is_newest_first_and_capped() {
        let items = (0..12).map(|i| ActivityItem::client(entry(i, i)));
        let feed = merge_activity(items);
        assert_eq!(feed.len(), ACTIVITY_FEED_LIMIT);
        assert_eq!(feed[0].id, "client-0");
        assert!(feed.windows(2).all(|w| w[0].timestamp >= w[1].timestamp));
    }

    #[test]
    fn project_description_names_client() {
        let item = ActivityItem::project(entry(4, 0));
        assert_eq!(item.description, "item 4 for Acme");
        assert_eq!(item.kind, ActivityKind::Project);
    }

    #[test]
    fn chart_point_profit_is_revenue_minus_expenses() {
        let point = ChartPoint::new(
            "Jan 2026".into(),
            MonthTotals {
                revenue: 900.0,
                expenses: 250.0,
            },
        );
        assert_eq!(point.profit, 650.0);
    }
}
