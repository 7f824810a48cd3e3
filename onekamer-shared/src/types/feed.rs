use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping every message on the dispatcher feed.
///
/// Routing key format: `onekamer.{domain}.{entity}.{action}`
/// Example: `onekamer.rencontre.match.created`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEvent<T: Serialize> {
    pub id: Uuid,
    pub source: String,
    pub event_type: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub data: T,
}

impl<T: Serialize> FeedEvent<T> {
    pub fn new(source: impl Into<String>, event_type: impl Into<String>, data: T) -> Self {
        Self {
            id: Uuid::now_v7(),
            source: source.into(),
            event_type: event_type.into(),
            timestamp: Utc::now(),
            user_id: None,
            data,
        }
    }

    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Dispatcher feed routing keys. The notification service only consumes
/// these; nothing in this workspace publishes.
pub mod routing_keys {
    // Social feed (échange)
    pub const ECHANGE_POST_LIKED: &str = "onekamer.echange.post.liked";
    pub const ECHANGE_POST_COMMENTED: &str = "onekamer.echange.post.commented";
    pub const ECHANGE_MENTION_CREATED: &str = "onekamer.echange.mention.created";
    pub const ECHANGE_AUDIO_COMMENTED: &str = "onekamer.echange.audio.commented";

    // Groups
    pub const GROUPES_MESSAGE_SENT: &str = "onekamer.groupes.message.sent";

    // Rencontre
    pub const RENCONTRE_MATCH_CREATED: &str = "onekamer.rencontre.match.created";
    pub const RENCONTRE_MESSAGE_SENT: &str = "onekamer.rencontre.message.sent";
    pub const RENCONTRE_LIKE_SENT: &str = "onekamer.rencontre.like.sent";

    // Marketplace
    pub const MARKET_ORDER_UPDATED: &str = "onekamer.market.order.updated";

    // OK Coins
    pub const DONATION_RECEIVED: &str = "onekamer.donation.received";

    // Back-office
    pub const SYSTEME_ANNOUNCEMENT: &str = "onekamer.systeme.announcement";
}

/// Feed event payloads, one per routing key family.
pub mod payloads {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PostLiked {
        pub post_id: Uuid,
        pub author_id: Uuid,
        pub liker_id: Uuid,
        pub liker_display_name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct PostCommented {
        pub post_id: Uuid,
        pub author_id: Uuid,
        pub comment_id: Uuid,
        pub commenter_id: Uuid,
        pub commenter_display_name: String,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MentionCreated {
        pub post_id: Uuid,
        pub mentioned_id: Uuid,
        pub author_id: Uuid,
        pub author_display_name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AudioCommented {
        pub audio_id: Uuid,
        pub author_id: Uuid,
        pub comment_id: Uuid,
        pub commenter_id: Uuid,
        pub commenter_display_name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct GroupMessageSent {
        pub group_id: Uuid,
        pub group_name: String,
        pub message_id: Uuid,
        pub sender_id: Uuid,
        pub sender_display_name: String,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct MatchCreated {
        pub match_id: Uuid,
        pub user_a_id: Uuid,
        pub user_a_display_name: String,
        pub user_b_id: Uuid,
        pub user_b_display_name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RencontreMessageSent {
        pub match_id: Uuid,
        pub message_id: Uuid,
        pub sender_id: Uuid,
        pub recipient_id: Uuid,
        pub sender_display_name: String,
        pub content_preview: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct RencontreLikeSent {
        pub liker_id: Uuid,
        pub liked_id: Uuid,
        pub liker_display_name: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct OrderUpdated {
        pub order_id: Uuid,
        pub buyer_id: Uuid,
        pub seller_id: Uuid,
        pub status: String,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct DonationReceived {
        pub donor_id: Uuid,
        pub recipient_id: Uuid,
        pub donor_display_name: String,
        pub amount_coins: i64,
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct SystemAnnouncement {
        pub recipient_id: Uuid,
        pub title: String,
        pub body: String,
        pub deeplink: Option<String>,
    }
}
