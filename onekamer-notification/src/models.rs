use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use onekamer_shared::types::notification::{
    NotificationRecord, RawNotification, RawNotificationData,
};

use crate::schema::notifications;

#[derive(Debug, Queryable, Identifiable, Serialize)]
#[diesel(table_name = notifications)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
    pub deeplink: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = notifications)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub notification_type: String,
    pub title: String,
    pub body: String,
    pub data: Option<serde_json::Value>,
    pub deeplink: Option<String>,
}

impl Notification {
    /// Build the canonical record the router and formatter consume. The
    /// stored `data` column keeps whatever shape the dispatcher sent, so it
    /// goes through the same boundary normalization as a live payload.
    pub fn to_record(&self) -> NotificationRecord {
        let data = self
            .data
            .clone()
            .and_then(|value| serde_json::from_value::<RawNotificationData>(value).ok())
            .unwrap_or_default();

        NotificationRecord::from_raw(RawNotification {
            id: Some(self.id.to_string()),
            created_at: Some(self.created_at),
            is_read: Some(self.is_read),
            kind: Some(self.notification_type.clone()),
            deeplink: self.deeplink.clone(),
            title: Some(self.title.clone()),
            body: Some(self.body.clone()),
            data,
            ..RawNotification::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onekamer_shared::types::notification::NotificationType;

    fn row(notification_type: &str, data: Option<serde_json::Value>) -> Notification {
        Notification {
            id: Uuid::now_v7(),
            user_id: Uuid::now_v7(),
            notification_type: notification_type.to_string(),
            title: "title".to_string(),
            body: "body".to_string(),
            data,
            deeplink: None,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_record_classifies_type() {
        let record = row("rencontre_match", None).to_record();
        assert_eq!(record.kind, NotificationType::RencontreMatch);
        assert_eq!(record.title.as_deref(), Some("title"));
    }

    #[test]
    fn test_to_record_normalizes_data_ids() {
        let record = row(
            "post_comment",
            Some(serde_json::json!({ "postId": 42, "comment_id": "7" })),
        )
        .to_record();
        assert_eq!(record.post_id.as_deref(), Some("42"));
        assert_eq!(record.comment_id.as_deref(), Some("7"));
    }
}
