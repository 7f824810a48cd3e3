//! Deep-link routing for notifications.
//!
//! Given a canonical record, produce the in-app destination to open when the
//! user taps it. Total function: any record maps to a non-empty route, all
//! the way down to `/` for shapes nothing recognizes.

use url::Url;

use onekamer_shared::types::notification::{NotificationRecord, NotificationType};

/// Resolve the navigation target for a notification.
///
/// Priority order: producer deeplink verbatim, then each remaining link
/// candidate reduced against the app origin, then the type dispatch table.
pub fn route_for(record: &NotificationRecord, app_origin: &str) -> String {
    if let Some(deeplink) = record.deeplink.as_deref() {
        if deeplink != "/" {
            return deeplink.to_string();
        }
    }

    for candidate in &record.link_candidates {
        if candidate == "/" {
            continue;
        }
        if let Some(route) = reduce_to_route(candidate, app_origin) {
            return route;
        }
    }

    match record.kind {
        NotificationType::SocialPost => social_route(record, false),
        NotificationType::SocialAudio => social_route(record, true),
        NotificationType::MarketOrder => match record.order_id.as_deref() {
            Some(order_id) => format!("/market/orders/{order_id}"),
            None => "/market/orders".to_string(),
        },
        NotificationType::Review => "/marketplace/ma-boutique".to_string(),
        NotificationType::Group => group_route(record),
        NotificationType::Annonce => detail_route("/annonces", record.content_id.as_deref()),
        NotificationType::Evenement => detail_route("/evenements", record.content_id.as_deref()),
        NotificationType::Partenaire => detail_route("/partenaires", record.content_id.as_deref()),
        NotificationType::FaitDivers => detail_route("/faits-divers", record.content_id.as_deref()),
        NotificationType::Systeme => "/".to_string(),
        NotificationType::Rencontre => "/rencontre".to_string(),
        NotificationType::RencontreMatch | NotificationType::RencontreMessage => {
            match record.match_id.as_deref() {
                Some(match_id) => format!("/rencontre?matchId={}", urlencoding::encode(match_id)),
                None => "/rencontre".to_string(),
            }
        }
        NotificationType::RencontreLike => match record.liker_user_id.as_deref() {
            Some(liker) => format!("/rencontre?likerUserId={}", urlencoding::encode(liker)),
            None => "/rencontre".to_string(),
        },
        NotificationType::Donation => "/donations".to_string(),
        NotificationType::Unknown => "/".to_string(),
    }
}

/// Reduce a stored navigation target to something the client router can
/// open: same-origin URLs collapse to their app-relative part, foreign URLs
/// stay absolute, and bare paths pass through.
fn reduce_to_route(candidate: &str, app_origin: &str) -> Option<String> {
    match Url::parse(candidate) {
        Ok(parsed) => {
            if same_origin(&parsed, app_origin) {
                let mut route = parsed.path().to_string();
                if let Some(query) = parsed.query() {
                    route.push('?');
                    route.push_str(query);
                }
                if let Some(fragment) = parsed.fragment() {
                    route.push('#');
                    route.push_str(fragment);
                }
                Some(route)
            } else {
                Some(candidate.to_string())
            }
        }
        Err(_) if candidate.starts_with('/') => Some(candidate.to_string()),
        Err(_) => None,
    }
}

fn same_origin(parsed: &Url, app_origin: &str) -> bool {
    let Ok(origin) = Url::parse(app_origin) else {
        return false;
    };
    parsed.scheme() == origin.scheme()
        && parsed.host_str() == origin.host_str()
        && parsed.port_or_known_default() == origin.port_or_known_default()
}

fn social_route(record: &NotificationRecord, audio_first: bool) -> String {
    let post = record.post_id.as_deref().map(|id| ("postId", id));
    let audio = record.audio_id.as_deref().map(|id| ("audioId", id));
    let target = if audio_first {
        audio.or(post)
    } else {
        post.or(audio)
    };

    match target {
        Some((param, id)) => {
            let mut route = format!("/echange?{param}={}", urlencoding::encode(id));
            if let Some(comment_id) = record.comment_id.as_deref() {
                route.push_str("&commentId=");
                route.push_str(&urlencoding::encode(comment_id));
            }
            route
        }
        None => "/echange".to_string(),
    }
}

fn group_route(record: &NotificationRecord) -> String {
    match record.group_id.as_deref() {
        Some(group_id) => {
            let mut route = format!("/groupes/{group_id}");
            if let Some(message_id) = record.message_id.as_deref() {
                route.push_str("?messageId=");
                route.push_str(&urlencoding::encode(message_id));
            }
            route
        }
        None => "/groupes".to_string(),
    }
}

fn detail_route(prefix: &str, id: Option<&str>) -> String {
    match id {
        Some(id) => format!("{prefix}/{id}"),
        None => prefix.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use onekamer_shared::types::notification::NotificationRecord;
    use serde_json::json;

    const ORIGIN: &str = "https://onekamer.co";

    fn record(value: serde_json::Value) -> NotificationRecord {
        NotificationRecord::from_value(value)
    }

    #[test]
    fn test_empty_record_routes_home() {
        assert_eq!(route_for(&record(json!({})), ORIGIN), "/");
    }

    #[test]
    fn test_deeplink_always_wins() {
        let r = record(json!({ "deeplink": "/custom", "type": "post", "postId": "42" }));
        assert_eq!(route_for(&r, ORIGIN), "/custom");
    }

    #[test]
    fn test_root_deeplink_is_ignored() {
        let r = record(json!({ "deeplink": "/", "type": "post", "postId": "42" }));
        assert_eq!(route_for(&r, ORIGIN), "/echange?postId=42");
    }

    #[test]
    fn test_same_origin_url_collapses_to_path() {
        let r = record(json!({ "url": "https://onekamer.co/annonces/5?ref=push#top" }));
        assert_eq!(route_for(&r, ORIGIN), "/annonces/5?ref=push#top");
    }

    #[test]
    fn test_cross_origin_url_stays_absolute() {
        let r = record(json!({ "url": "https://partner.example.com/offer" }));
        assert_eq!(route_for(&r, ORIGIN), "https://partner.example.com/offer");
    }

    #[test]
    fn test_data_deeplink_path_passes_through() {
        let r = record(json!({ "data": { "deeplink": "/market/orders" } }));
        assert_eq!(route_for(&r, ORIGIN), "/market/orders");
    }

    #[test]
    fn test_unusable_candidate_falls_through_to_type() {
        let r = record(json!({ "url": "not a url", "type": "evenement", "contentId": "9" }));
        assert_eq!(route_for(&r, ORIGIN), "/evenements/9");
    }

    #[test]
    fn test_social_post_route_with_comment() {
        let r = record(json!({ "type": "post", "postId": "42" }));
        assert_eq!(route_for(&r, ORIGIN), "/echange?postId=42");

        let r = record(json!({ "type": "post", "postId": "42", "commentId": "7" }));
        assert_eq!(route_for(&r, ORIGIN), "/echange?postId=42&commentId=7");
    }

    #[test]
    fn test_social_audio_prefers_audio_id() {
        let r = record(json!({ "type": "echange_audio", "audioId": "a1", "postId": "p1" }));
        assert_eq!(route_for(&r, ORIGIN), "/echange?audioId=a1");
    }

    #[test]
    fn test_social_route_bare_when_no_ids() {
        let r = record(json!({ "type": "mention" }));
        assert_eq!(route_for(&r, ORIGIN), "/echange");
    }

    #[test]
    fn test_market_order_routes() {
        let r = record(json!({ "type": "commande", "orderId": "o7" }));
        assert_eq!(route_for(&r, ORIGIN), "/market/orders/o7");

        let r = record(json!({ "type": "order_update" }));
        assert_eq!(route_for(&r, ORIGIN), "/market/orders");
    }

    #[test]
    fn test_review_routes_to_shop() {
        let r = record(json!({ "type": "avis" }));
        assert_eq!(route_for(&r, ORIGIN), "/marketplace/ma-boutique");
    }

    #[test]
    fn test_group_routes() {
        let r = record(json!({ "type": "group_message", "groupId": "g1", "messageId": "m1" }));
        assert_eq!(route_for(&r, ORIGIN), "/groupes/g1?messageId=m1");

        let r = record(json!({ "type": "groupes" }));
        assert_eq!(route_for(&r, ORIGIN), "/groupes");
    }

    #[test]
    fn test_rencontre_routes() {
        let r = record(json!({ "type": "rencontre_match", "matchId": "m9" }));
        assert_eq!(route_for(&r, ORIGIN), "/rencontre?matchId=m9");

        let r = record(json!({ "type": "rencontre_like", "likerUserId": "u3" }));
        assert_eq!(route_for(&r, ORIGIN), "/rencontre?likerUserId=u3");

        let r = record(json!({ "type": "rencontre" }));
        assert_eq!(route_for(&r, ORIGIN), "/rencontre");
    }

    #[test]
    fn test_content_type_tagged_id_feeds_social_route() {
        let r = record(json!({
            "type": "comment",
            "data": { "contentType": "post", "contentId": "42" }
        }));
        assert_eq!(route_for(&r, ORIGIN), "/echange?postId=42");
    }

    #[test]
    fn test_every_known_token_yields_a_usable_route() {
        let tokens = [
            "echange", "post", "post_like", "post_comment", "comment", "like", "mention",
            "mentions", "echange_audio", "audio_comment", "market", "commande", "order",
            "review", "avis", "group_message", "groupes_message", "groupes", "annonce",
            "annonces", "evenement", "evenements", "systeme", "partenaire", "partenaires",
            "fait_divers", "faits_divers", "rencontre", "rencontre_match",
            "rencontre_message", "rencontre_like", "donation", "definitely_unknown",
        ];
        for token in tokens {
            let route = route_for(&record(json!({ "type": token })), ORIGIN);
            assert!(
                route.starts_with('/') || Url::parse(&route).is_ok(),
                "token {token} produced unusable route {route}"
            );
            assert!(!route.is_empty());
        }
    }
}
