use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Raw notification payload as emitted by the backend dispatcher.
///
/// Producers disagree on field names and nesting: identifiers show up at the
/// top level, inside `data`, in camelCase and in snake_case, sometimes as
/// JSON numbers. Everything here is optional and lenient so that any
/// syntactically valid JSON object deserializes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNotification {
    #[serde(deserialize_with = "de_loose_id")]
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_read: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub deeplink: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    #[serde(alias = "actorName")]
    pub actor_name: Option<String>,
    #[serde(alias = "contentId", deserialize_with = "de_loose_id")]
    pub content_id: Option<String>,
    #[serde(alias = "postId", deserialize_with = "de_loose_id")]
    pub post_id: Option<String>,
    #[serde(alias = "audioId", deserialize_with = "de_loose_id")]
    pub audio_id: Option<String>,
    #[serde(alias = "commentId", deserialize_with = "de_loose_id")]
    pub comment_id: Option<String>,
    #[serde(alias = "replyId", deserialize_with = "de_loose_id")]
    pub reply_id: Option<String>,
    #[serde(alias = "groupId", deserialize_with = "de_loose_id")]
    pub group_id: Option<String>,
    #[serde(alias = "messageId", deserialize_with = "de_loose_id")]
    pub message_id: Option<String>,
    #[serde(alias = "matchId", deserialize_with = "de_loose_id")]
    pub match_id: Option<String>,
    #[serde(alias = "orderId", deserialize_with = "de_loose_id")]
    pub order_id: Option<String>,
    #[serde(alias = "likerUserId", deserialize_with = "de_loose_id")]
    pub liker_user_id: Option<String>,
    #[serde(deserialize_with = "de_lenient_data")]
    pub data: RawNotificationData,
}

/// Nested `data` object. Carries the same identifiers as the top level,
/// duplicated in both casings, plus the optional precomputed preview.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawNotificationData {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub deeplink: Option<String>,
    pub url: Option<String>,
    #[serde(alias = "actorName")]
    pub actor_name: Option<String>,
    #[serde(alias = "contentType")]
    pub content_type: Option<String>,
    #[serde(alias = "contentId", deserialize_with = "de_loose_id")]
    pub content_id: Option<String>,
    #[serde(alias = "postId", deserialize_with = "de_loose_id")]
    pub post_id: Option<String>,
    #[serde(alias = "audioId", deserialize_with = "de_loose_id")]
    pub audio_id: Option<String>,
    #[serde(alias = "commentId", deserialize_with = "de_loose_id")]
    pub comment_id: Option<String>,
    #[serde(alias = "replyId", deserialize_with = "de_loose_id")]
    pub reply_id: Option<String>,
    #[serde(alias = "groupId", deserialize_with = "de_loose_id")]
    pub group_id: Option<String>,
    #[serde(alias = "messageId", deserialize_with = "de_loose_id")]
    pub message_id: Option<String>,
    #[serde(alias = "matchId", deserialize_with = "de_loose_id")]
    pub match_id: Option<String>,
    #[serde(alias = "orderId", deserialize_with = "de_loose_id")]
    pub order_id: Option<String>,
    #[serde(alias = "likerUserId", deserialize_with = "de_loose_id")]
    pub liker_user_id: Option<String>,
    pub preview: Option<RawPreview>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPreview {
    pub text80: Option<String>,
    #[serde(alias = "mediaType")]
    pub media_type: Option<String>,
    #[serde(alias = "mediaUrl")]
    pub media_url: Option<String>,
}

/// Accept JSON strings and numbers as identifiers; anything else is None.
fn de_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// A `data` field that is null or not even an object must not sink the
/// record; the rest of the payload still routes.
fn de_lenient_data<'de, D>(deserializer: D) -> Result<RawNotificationData, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default())
}

/// Notification classification over the dispatcher's freeform `type` tokens.
///
/// Matching priority mirrors the producers: the social-feed vocabulary is an
/// exact token set (plus the `audio_*` producers), marketplace/review/group
/// are substring families, the rest is an exact switch. Anything else is
/// `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    SocialPost,
    SocialAudio,
    MarketOrder,
    Review,
    Group,
    Annonce,
    Evenement,
    Systeme,
    Partenaire,
    FaitDivers,
    Rencontre,
    RencontreMatch,
    RencontreMessage,
    RencontreLike,
    Donation,
    #[default]
    Unknown,
}

impl NotificationType {
    pub fn from_token(token: &str) -> Self {
        let t = token.trim().to_lowercase();
        if t.is_empty() {
            return Self::Unknown;
        }

        match t.as_str() {
            "echange" | "post" | "post_like" | "post_comment" | "comment" | "like"
            | "mention" | "mentions" => return Self::SocialPost,
            "echange_audio" => return Self::SocialAudio,
            _ => {}
        }
        if t.starts_with("audio_") {
            return Self::SocialAudio;
        }
        if t.contains("market") || t.contains("commande") || t.contains("order") {
            return Self::MarketOrder;
        }
        if t.contains("review") || t.contains("avis") {
            return Self::Review;
        }
        // Exact rencontre tokens would be swallowed by none of the families
        // above; plain "groupes" and "group_message" both land here.
        if t.contains("group") || t.contains("groupe") {
            return Self::Group;
        }

        match t.as_str() {
            "annonce" | "annonces" => Self::Annonce,
            "evenement" | "evenements" => Self::Evenement,
            "systeme" => Self::Systeme,
            "partenaire" | "partenaires" => Self::Partenaire,
            "fait_divers" | "faits_divers" => Self::FaitDivers,
            "rencontre" => Self::Rencontre,
            "rencontre_match" => Self::RencontreMatch,
            "rencontre_message" => Self::RencontreMessage,
            "rencontre_like" => Self::RencontreLike,
            "donation" => Self::Donation,
            _ => Self::Unknown,
        }
    }

    pub fn is_social(self) -> bool {
        matches!(self, Self::SocialPost | Self::SocialAudio)
    }

    pub fn is_rencontre(self) -> bool {
        matches!(
            self,
            Self::Rencontre | Self::RencontreMatch | Self::RencontreMessage | Self::RencontreLike
        )
    }
}

/// Media flavor of a precomputed preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMedia {
    Image,
    Video,
    Audio,
}

impl PreviewMedia {
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "image" | "photo" => Some(Self::Image),
            "video" => Some(Self::Video),
            "audio" => Some(Self::Audio),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PreviewData {
    pub text: Option<String>,
    pub media: Option<PreviewMedia>,
    pub media_url: Option<String>,
}

/// Canonical notification record consumed by the router and formatter.
///
/// Every field cascade the dispatcher forces on consumers (top level →
/// `data` camelCase → `data` snake_case → content-type-tagged `contentId`)
/// is resolved here, once, at the boundary. Downstream code never probes
/// the raw payload again.
#[derive(Debug, Clone, Default)]
pub struct NotificationRecord {
    pub id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_read: bool,
    pub kind: NotificationType,
    /// Pre-resolved navigation target, returned verbatim when usable.
    pub deeplink: Option<String>,
    /// Remaining navigation candidates in producer priority order:
    /// top-level `url`, then `data.deeplink`, then `data.url`. Each is
    /// re-parsed against the app origin before use.
    pub link_candidates: Vec<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub actor_name: Option<String>,
    pub content_id: Option<String>,
    pub post_id: Option<String>,
    pub audio_id: Option<String>,
    pub comment_id: Option<String>,
    pub reply_id: Option<String>,
    pub group_id: Option<String>,
    pub message_id: Option<String>,
    pub match_id: Option<String>,
    pub order_id: Option<String>,
    pub liker_user_id: Option<String>,
    pub preview: Option<PreviewData>,
}

impl NotificationRecord {
    pub fn from_raw(raw: RawNotification) -> Self {
        let RawNotificationData {
            kind: data_kind,
            deeplink: data_deeplink,
            url: data_url,
            actor_name: data_actor_name,
            content_type,
            content_id: data_content_id,
            post_id: data_post_id,
            audio_id: data_audio_id,
            comment_id: data_comment_id,
            reply_id: data_reply_id,
            group_id: data_group_id,
            message_id: data_message_id,
            match_id: data_match_id,
            order_id: data_order_id,
            liker_user_id: data_liker_user_id,
            preview,
        } = raw.data;

        let token = non_empty(raw.kind).or_else(|| non_empty(data_kind));
        let kind = token
            .as_deref()
            .map(NotificationType::from_token)
            .unwrap_or_default();

        let content_id = non_empty(raw.content_id).or_else(|| non_empty(data_content_id));
        let content_type = non_empty(content_type).map(|c| c.to_lowercase());
        let tagged = |want: &str| -> Option<String> {
            if content_type.as_deref() == Some(want) {
                content_id.clone()
            } else {
                None
            }
        };

        let post_id = non_empty(raw.post_id)
            .or_else(|| non_empty(data_post_id))
            .or_else(|| tagged("post"));
        let audio_id = non_empty(raw.audio_id)
            .or_else(|| non_empty(data_audio_id))
            .or_else(|| tagged("audio"));
        let comment_id = non_empty(raw.comment_id)
            .or_else(|| non_empty(data_comment_id))
            .or_else(|| tagged("comment"));

        let link_candidates = [non_empty(raw.url), non_empty(data_deeplink), non_empty(data_url)]
            .into_iter()
            .flatten()
            .collect();

        Self {
            id: raw.id,
            created_at: raw.created_at,
            is_read: raw.is_read.unwrap_or(false),
            kind,
            deeplink: non_empty(raw.deeplink),
            link_candidates,
            title: non_empty(raw.title),
            body: non_empty(raw.body),
            actor_name: non_empty(data_actor_name).or_else(|| non_empty(raw.actor_name)),
            content_id,
            post_id,
            audio_id,
            comment_id,
            reply_id: non_empty(raw.reply_id).or_else(|| non_empty(data_reply_id)),
            group_id: non_empty(raw.group_id).or_else(|| non_empty(data_group_id)),
            message_id: non_empty(raw.message_id).or_else(|| non_empty(data_message_id)),
            match_id: non_empty(raw.match_id).or_else(|| non_empty(data_match_id)),
            order_id: non_empty(raw.order_id).or_else(|| non_empty(data_order_id)),
            liker_user_id: non_empty(raw.liker_user_id).or_else(|| non_empty(data_liker_user_id)),
            preview: preview.map(|p| PreviewData {
                text: non_empty(p.text80),
                media: p.media_type.as_deref().and_then(PreviewMedia::from_token),
                media_url: non_empty(p.media_url),
            }),
        }
    }

    /// Normalize an arbitrary JSON value. A payload that is not even an
    /// object degrades to an all-empty record rather than failing the feed.
    pub fn from_value(value: serde_json::Value) -> Self {
        serde_json::from_value::<RawNotification>(value)
            .map(Self::from_raw)
            .unwrap_or_default()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_token_social_family() {
        for token in ["post", "post_like", "comment", "mention", "echange"] {
            assert_eq!(NotificationType::from_token(token), NotificationType::SocialPost);
        }
        assert_eq!(
            NotificationType::from_token("echange_audio"),
            NotificationType::SocialAudio
        );
        assert_eq!(
            NotificationType::from_token("audio_comment"),
            NotificationType::SocialAudio
        );
    }

    #[test]
    fn test_from_token_families_before_exact_switch() {
        assert_eq!(
            NotificationType::from_token("market_commande"),
            NotificationType::MarketOrder
        );
        assert_eq!(NotificationType::from_token("avis_client"), NotificationType::Review);
        assert_eq!(NotificationType::from_token("groupes_message"), NotificationType::Group);
        assert_eq!(NotificationType::from_token("groupes"), NotificationType::Group);
    }

    #[test]
    fn test_from_token_rencontre_not_swallowed_by_families() {
        assert_eq!(
            NotificationType::from_token("rencontre_like"),
            NotificationType::RencontreLike
        );
        assert_eq!(
            NotificationType::from_token("RENCONTRE_MATCH"),
            NotificationType::RencontreMatch
        );
    }

    #[test]
    fn test_from_token_unknown() {
        assert_eq!(NotificationType::from_token(""), NotificationType::Unknown);
        assert_eq!(NotificationType::from_token("mystery"), NotificationType::Unknown);
    }

    #[test]
    fn test_normalize_id_cascade_prefers_top_level() {
        let record = NotificationRecord::from_value(json!({
            "type": "post",
            "postId": "top",
            "data": { "post_id": "nested" }
        }));
        assert_eq!(record.post_id.as_deref(), Some("top"));
    }

    #[test]
    fn test_normalize_snake_case_in_data() {
        let record = NotificationRecord::from_value(json!({
            "type": "group_message",
            "data": { "group_id": "g1", "messageId": "m1" }
        }));
        assert_eq!(record.group_id.as_deref(), Some("g1"));
        assert_eq!(record.message_id.as_deref(), Some("m1"));
    }

    #[test]
    fn test_normalize_content_type_tagged_fallback() {
        let record = NotificationRecord::from_value(json!({
            "type": "comment",
            "data": { "contentType": "post", "contentId": "42" }
        }));
        assert_eq!(record.post_id.as_deref(), Some("42"));
        assert_eq!(record.audio_id, None);
    }

    #[test]
    fn test_normalize_numeric_ids() {
        let record = NotificationRecord::from_value(json!({
            "type": "post",
            "postId": 42
        }));
        assert_eq!(record.post_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_normalize_link_candidate_order() {
        let record = NotificationRecord::from_value(json!({
            "url": "https://onekamer.co/a",
            "data": { "deeplink": "/b", "url": "/c" }
        }));
        assert_eq!(record.link_candidates, vec!["https://onekamer.co/a", "/b", "/c"]);
    }

    #[test]
    fn test_normalize_empty_object() {
        let record = NotificationRecord::from_value(json!({}));
        assert_eq!(record.kind, NotificationType::Unknown);
        assert!(record.deeplink.is_none());
        assert!(record.link_candidates.is_empty());
    }

    #[test]
    fn test_normalize_non_object_degrades() {
        let record = NotificationRecord::from_value(json!("not an object"));
        assert_eq!(record.kind, NotificationType::Unknown);
    }

    #[test]
    fn test_normalize_null_data_keeps_the_rest() {
        let record = NotificationRecord::from_value(json!({
            "type": "post",
            "postId": "42",
            "data": null
        }));
        assert_eq!(record.kind, NotificationType::SocialPost);
        assert_eq!(record.post_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_preview_media_tokens() {
        assert_eq!(PreviewMedia::from_token("IMAGE"), Some(PreviewMedia::Image));
        assert_eq!(PreviewMedia::from_token("video"), Some(PreviewMedia::Video));
        assert_eq!(PreviewMedia::from_token("gif"), None);
    }
}
