//! Alerts view over the notification list.
//!
//! Alerts are not stored separately: each one is a projection of a
//! [`Notification`] carrying its id, so resolving or deleting an alert acts
//! on the underlying notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Notification, NotificationCategory, NotificationKind};

// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Moisture,
    Temperature,
    Light,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub plant_name: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub resolved: bool,
    /// Relative age, e.g. "5m ago".
    pub age: String,
}

impl Alert {
    pub fn from_notification(notification: &Notification, now: DateTime<Utc>) -> Self {
        // ---
        let alert_type = match notification.category {
            NotificationCategory::Moisture => AlertType::Moisture,
            _ => AlertType::General,
        };

        let severity = match (notification.kind, notification.category) {
            (NotificationKind::Danger, _) => Severity::Critical,
            (NotificationKind::Warning, NotificationCategory::Moisture) => Severity::High,
            (NotificationKind::Warning, _) => Severity::Medium,
            (NotificationKind::Info, _) => Severity::Low,
        };

        Self {
            id: notification.id.clone(),
            plant_name: notification.plant_name.clone(),
            alert_type,
            severity,
            message: notification.message.clone(),
            timestamp: notification.timestamp,
            resolved: notification.resolved,
            age: format_age(notification.timestamp, now),
        }
    }
}

/// Optional type and severity constraints; `None` matches everything.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AlertFilter {
    #[serde(rename = "type")]
    pub alert_type: Option<AlertType>,
    pub severity: Option<Severity>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        self.alert_type.map_or(true, |t| alert.alert_type == t)
            && self.severity.map_or(true, |s| alert.severity == s)
    }
}

/// Filtered alerts split into the active and resolved tabs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertBoard {
    pub active: Vec<Alert>,
    pub resolved: Vec<Alert>,
    pub active_count: usize,
    pub critical_count: usize,
    pub resolved_count: usize,
}

/// Project, filter and group notifications. Order follows the input
/// (newest first).
pub fn board(notifications: &[Notification], filter: &AlertFilter, now: DateTime<Utc>) -> AlertBoard {
    // ---
    let (resolved, active): (Vec<Alert>, Vec<Alert>) = notifications
        .iter()
        .map(|n| Alert::from_notification(n, now))
        .filter(|a| filter.matches(a))
        .partition(|a| a.resolved);

    AlertBoard {
        critical_count: active
            .iter()
            .filter(|a| a.severity == Severity::Critical)
            .count(),
        active_count: active.len(),
        resolved_count: resolved.len(),
        active,
        resolved,
    }
}

/// Coarse relative age: "Just now", "12m ago", "3h ago", "2d ago".
pub fn format_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    // ---
    let minutes = (now - timestamp).num_minutes();
    let hours = minutes / 60;
    let days = hours / 24;

    if days > 0 {
        format!("{days}d ago")
    } else if hours > 0 {
        format!("{hours}h ago")
    } else if minutes > 0 {
        format!("{minutes}m ago")
    } else {
        "Just now".to_string()
    }
}
