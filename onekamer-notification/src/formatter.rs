//! Compact drawer summaries for notifications.
//!
//! Three notification families (groups, social feed, dating) get a rich
//! 3-4 line summary with an optional thumbnail. Everything else returns
//! `None` and the caller renders the plain title/body pair.

use serde::Serialize;

use onekamer_shared::types::notification::{
    NotificationRecord, NotificationType, PreviewMedia,
};

const PREVIEW_MAX_CHARS: usize = 80;
const DEFAULT_ACTOR: &str = "Un membre";

#[derive(Debug, Clone, Serialize)]
pub struct NotificationSummary {
    pub l1: String,
    pub l2: String,
    pub l3: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumb: Option<Thumb>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Thumb {
    Image { url: String },
    Emoji { ch: char },
}

/// Build the rich drawer summary for a notification, or `None` when no
/// template applies.
pub fn format_summary(record: &NotificationRecord) -> Option<NotificationSummary> {
    match record.kind {
        NotificationType::Group => Some(group_summary(record)),
        NotificationType::SocialPost | NotificationType::SocialAudio => {
            Some(social_summary(record))
        }
        NotificationType::RencontreMatch => Some(match_summary(record)),
        NotificationType::RencontreMessage => Some(message_summary(record)),
        NotificationType::RencontreLike => Some(like_summary(record)),
        _ => None,
    }
}

fn group_summary(record: &NotificationRecord) -> NotificationSummary {
    NotificationSummary {
        l1: "Groupes".to_string(),
        l2: actor(record),
        l3: truncate_preview(&preview_text(record)),
        l4: None,
        thumb: preview_thumb(record),
    }
}

fn social_summary(record: &NotificationRecord) -> NotificationSummary {
    NotificationSummary {
        l1: "Échange".to_string(),
        l2: actor(record),
        l3: truncate_preview(&preview_text(record)),
        l4: None,
        thumb: preview_thumb(record),
    }
}

// -- Dating templates -------------------------------------------------------
//
// The dispatcher still encodes who-did-what in free text ("A & B, c'est un
// match !", "sender : message"), so these templates parse the body lines.
// Compatibility shim: goes away once the dispatcher emits structured
// preview fields for rencontre notifications.

fn like_summary(record: &NotificationRecord) -> NotificationSummary {
    let name = record
        .actor_name
        .clone()
        .or_else(|| {
            first_line(record).map(|line| {
                line.trim_start_matches(|c: char| !c.is_alphanumeric())
                    .trim()
                    .to_string()
            })
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

    NotificationSummary {
        l1: "Rencontre".to_string(),
        l2: format!("{name} vous a liké 🧡"),
        l3: "Découvrez son profil dans l'onglet Likes".to_string(),
        l4: None,
        thumb: None,
    }
}

fn match_summary(record: &NotificationRecord) -> NotificationSummary {
    let name = counterpart_name(record).unwrap_or_else(|| DEFAULT_ACTOR.to_string());

    NotificationSummary {
        l1: "Rencontre".to_string(),
        l2: format!("Vous avez matché avec {name} 💖"),
        l3: "Envoyez le premier message !".to_string(),
        l4: None,
        thumb: None,
    }
}

fn message_summary(record: &NotificationRecord) -> NotificationSummary {
    let parsed = second_line(record).and_then(|line| parse_sender_message(&line));
    let (sender, message) = match parsed {
        Some((sender, message)) => (Some(sender), Some(message)),
        None => (None, None),
    };

    let sender = sender
        .or_else(|| record.actor_name.clone())
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string());

    let (l3, thumb) = match message.as_deref().and_then(media_keyword) {
        Some(PreviewMedia::Image) => ("📷 Photo".to_string(), Some(Thumb::Emoji { ch: '📷' })),
        Some(PreviewMedia::Video) => ("🎬 Vidéo".to_string(), Some(Thumb::Emoji { ch: '🎬' })),
        Some(PreviewMedia::Audio) => ("🎧 Message vocal".to_string(), Some(Thumb::Emoji { ch: '🎧' })),
        None => (
            truncate_preview(message.as_deref().unwrap_or("Nouveau message")),
            None,
        ),
    };

    NotificationSummary {
        l1: "Rencontre".to_string(),
        l2: format!("{sender} vous a écrit"),
        l3,
        l4: None,
        thumb,
    }
}

/// Recover the counterpart's name from an "A & B, c'est un match !" first
/// line, skipping the actor's own name when it is known.
fn counterpart_name(record: &NotificationRecord) -> Option<String> {
    let line = first_line(record)?;
    let before_comma = line.split(',').next()?;
    let names: Vec<String> = before_comma
        .split('&')
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }

    if let Some(own) = record.actor_name.as_deref() {
        if let Some(other) = names.iter().find(|n| !n.eq_ignore_ascii_case(own)) {
            return Some(other.clone());
        }
    }
    names.last().cloned()
}

/// Parse a "sender : message" second line.
fn parse_sender_message(line: &str) -> Option<(String, String)> {
    let (sender, message) = line.split_once(':')?;
    let sender = sender.trim();
    let message = message.trim();
    if sender.is_empty() || message.is_empty() {
        return None;
    }
    Some((sender.to_string(), message.to_string()))
}

fn media_keyword(message: &str) -> Option<PreviewMedia> {
    let lower = message.to_lowercase();
    if lower.contains("photo") || lower.contains("image") {
        Some(PreviewMedia::Image)
    } else if lower.contains("vidéo") || lower.contains("video") {
        Some(PreviewMedia::Video)
    } else if lower.contains("audio") || lower.contains("vocal") {
        Some(PreviewMedia::Audio)
    } else {
        None
    }
}

// -- Shared extraction ------------------------------------------------------

fn actor(record: &NotificationRecord) -> String {
    record
        .actor_name
        .clone()
        .or_else(|| first_line(record))
        .unwrap_or_else(|| DEFAULT_ACTOR.to_string())
}

fn first_line(record: &NotificationRecord) -> Option<String> {
    record
        .body
        .as_deref()
        .and_then(|body| body.lines().next())
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

fn second_line(record: &NotificationRecord) -> Option<String> {
    record
        .body
        .as_deref()
        .and_then(|body| body.lines().nth(1))
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
}

/// Preview text for the summary line: the precomputed preview when the
/// dispatcher sent one, otherwise the body detail lines, otherwise the
/// headline itself.
fn preview_text(record: &NotificationRecord) -> String {
    if let Some(text) = record.preview.as_ref().and_then(|p| p.text.clone()) {
        return text;
    }

    let detail = record
        .body
        .as_deref()
        .map(|body| {
            body.lines()
                .skip(1)
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|detail| !detail.is_empty());

    detail
        .or_else(|| first_line(record))
        .unwrap_or_default()
}

fn preview_thumb(record: &NotificationRecord) -> Option<Thumb> {
    let preview = record.preview.as_ref()?;
    match preview.media? {
        PreviewMedia::Image => preview
            .media_url
            .clone()
            .map(|url| Thumb::Image { url }),
        PreviewMedia::Video => Some(Thumb::Emoji { ch: '🎬' }),
        PreviewMedia::Audio => Some(Thumb::Emoji { ch: '🎧' }),
    }
}

/// Cap at 80 characters; append an ellipsis only when one is not already
/// there.
fn truncate_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_MAX_CHARS {
        return text.to_string();
    }

    let mut out: String = text.chars().take(PREVIEW_MAX_CHARS).collect();
    out = out.trim_end().to_string();
    if !out.ends_with('…') && !out.ends_with("...") {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use onekamer_shared::types::notification::NotificationRecord;
    use serde_json::json;

    fn record(value: serde_json::Value) -> NotificationRecord {
        NotificationRecord::from_value(value)
    }

    #[test]
    fn test_unknown_type_gets_no_summary() {
        assert!(format_summary(&record(json!({ "type": "unknown_type" }))).is_none());
        assert!(format_summary(&record(json!({ "type": "annonce" }))).is_none());
        assert!(format_summary(&record(json!({}))).is_none());
    }

    #[test]
    fn test_rencontre_like_summary() {
        let summary = format_summary(&record(json!({
            "type": "rencontre_like",
            "body": "🧡 Awa"
        })))
        .expect("like template applies");

        assert!(summary.l2.contains("Awa vous a liké"));
        assert_eq!(summary.l3, "Découvrez son profil dans l'onglet Likes");
    }

    #[test]
    fn test_rencontre_like_falls_back_to_default_actor() {
        let summary = format_summary(&record(json!({ "type": "rencontre_like" })))
            .expect("like template applies");
        assert!(summary.l2.contains(DEFAULT_ACTOR));
    }

    #[test]
    fn test_match_summary_picks_counterpart() {
        let summary = format_summary(&record(json!({
            "type": "rencontre_match",
            "body": "Awa & Karim, c'est un match !",
            "data": { "actorName": "Awa" }
        })))
        .expect("match template applies");

        assert!(summary.l2.contains("Karim"));
        assert!(!summary.l2.contains("Awa"));
    }

    #[test]
    fn test_message_summary_parses_sender_line() {
        let summary = format_summary(&record(json!({
            "type": "rencontre_message",
            "body": "Nouveau message\nKarim : Salut, bien ou bien ?"
        })))
        .expect("message template applies");

        assert_eq!(summary.l2, "Karim vous a écrit");
        assert_eq!(summary.l3, "Salut, bien ou bien ?");
    }

    #[test]
    fn test_message_summary_media_keyword() {
        let summary = format_summary(&record(json!({
            "type": "rencontre_message",
            "body": "Nouveau message\nKarim : Photo"
        })))
        .expect("message template applies");

        assert_eq!(summary.l3, "📷 Photo");
        assert!(matches!(summary.thumb, Some(Thumb::Emoji { ch: '📷' })));
    }

    #[test]
    fn test_group_summary_uses_preview() {
        let summary = format_summary(&record(json!({
            "type": "group_message",
            "data": {
                "actorName": "Mireille",
                "preview": {
                    "text80": "On se retrouve où samedi ?",
                    "mediaType": "image",
                    "mediaUrl": "https://cdn.test/groupes/thumb.jpg"
                }
            }
        })))
        .expect("group template applies");

        assert_eq!(summary.l1, "Groupes");
        assert_eq!(summary.l2, "Mireille");
        assert_eq!(summary.l3, "On se retrouve où samedi ?");
        assert!(matches!(summary.thumb, Some(Thumb::Image { .. })));
    }

    #[test]
    fn test_social_summary_actor_cascade() {
        let summary = format_summary(&record(json!({
            "type": "post_comment",
            "body": "Jean-Pierre\na commenté votre publication"
        })))
        .expect("social template applies");

        assert_eq!(summary.l1, "Échange");
        assert_eq!(summary.l2, "Jean-Pierre");
        assert_eq!(summary.l3, "a commenté votre publication");

        let summary = format_summary(&record(json!({ "type": "post_like" })))
            .expect("social template applies");
        assert_eq!(summary.l2, DEFAULT_ACTOR);
    }

    #[test]
    fn test_video_preview_becomes_emoji_thumb() {
        let summary = format_summary(&record(json!({
            "type": "group_message",
            "data": { "preview": { "mediaType": "video" } }
        })))
        .expect("group template applies");

        assert!(matches!(summary.thumb, Some(Thumb::Emoji { ch: '🎬' })));
    }

    #[test]
    fn test_truncate_preview_at_80_chars() {
        let long = "a".repeat(100);
        let out = truncate_preview(&long);
        assert_eq!(out.chars().count(), 81);
        assert!(out.ends_with('…'));

        let short = "ça va";
        assert_eq!(truncate_preview(short), "ça va");
    }

    #[test]
    fn test_truncate_preview_no_double_ellipsis() {
        let mut long = "b".repeat(79);
        long.push('…');
        long.push_str("tail");
        let out = truncate_preview(&long);
        assert_eq!(out.chars().count(), 80);
        assert!(out.ends_with('…'));
        assert!(!out.ends_with("……"));
    }
}
