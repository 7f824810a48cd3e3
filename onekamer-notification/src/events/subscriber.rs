//! Dispatcher feed consumers. Inbound only: every listener turns feed
//! events into stored notification rows; nothing here publishes.

use std::sync::Arc;

use futures_lite::StreamExt;
use lapin::options::BasicAckOptions;
use serde::de::DeserializeOwned;
use serde::Serialize;

use onekamer_shared::types::feed::{payloads, routing_keys, FeedEvent};

use crate::services::notification_service;
use crate::AppState;

fn decode<T: Serialize + DeserializeOwned>(data: &[u8], routing_key: &str) -> Option<FeedEvent<T>> {
    match serde_json::from_slice(data) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::error!(routing_key = %routing_key, error = %e, "failed to deserialize feed event");
            None
        }
    }
}

/// Listen for social feed events (post likes, comments, mentions, audio).
pub async fn listen_echange_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "onekamer-notification.echange",
            &[
                routing_keys::ECHANGE_POST_LIKED,
                routing_keys::ECHANGE_POST_COMMENTED,
                routing_keys::ECHANGE_MENTION_CREATED,
                routing_keys::ECHANGE_AUDIO_COMMENTED,
            ],
        )
        .await?;

    tracing::info!("listening for echange events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::ECHANGE_POST_LIKED {
                    if let Some(event) =
                        decode::<payloads::PostLiked>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.author_id,
                            "post_like",
                            "Nouveau j'aime",
                            &format!("{} a aimé votre publication", data.liker_display_name),
                            Some(serde_json::json!({
                                "postId": data.post_id,
                                "actorName": data.liker_display_name,
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create post_like notification");
                        }
                    }
                } else if routing_key == routing_keys::ECHANGE_POST_COMMENTED {
                    if let Some(event) =
                        decode::<payloads::PostCommented>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.author_id,
                            "post_comment",
                            "Nouveau commentaire",
                            &format!("{}\n{}", data.commenter_display_name, data.content_preview),
                            Some(serde_json::json!({
                                "postId": data.post_id,
                                "commentId": data.comment_id,
                                "actorName": data.commenter_display_name,
                                "preview": { "text80": data.content_preview },
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create post_comment notification");
                        }
                    }
                } else if routing_key == routing_keys::ECHANGE_MENTION_CREATED {
                    if let Some(event) =
                        decode::<payloads::MentionCreated>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.mentioned_id,
                            "mention",
                            "Vous avez été mentionné",
                            &format!("{} vous a mentionné dans une publication", data.author_display_name),
                            Some(serde_json::json!({
                                "postId": data.post_id,
                                "actorName": data.author_display_name,
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create mention notification");
                        }
                    }
                } else if routing_key == routing_keys::ECHANGE_AUDIO_COMMENTED {
                    if let Some(event) =
                        decode::<payloads::AudioCommented>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.author_id,
                            "audio_comment",
                            "Nouveau commentaire",
                            &format!("{} a commenté votre audio", data.commenter_display_name),
                            Some(serde_json::json!({
                                "audioId": data.audio_id,
                                "commentId": data.comment_id,
                                "actorName": data.commenter_display_name,
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create audio_comment notification");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "echange consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for group chat events (message.sent).
pub async fn listen_groupes_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "onekamer-notification.groupes",
            &[routing_keys::GROUPES_MESSAGE_SENT],
        )
        .await?;

    tracing::info!("listening for groupes events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();
                if let Some(event) =
                    decode::<payloads::GroupMessageSent>(&delivery.data, &routing_key)
                {
                    let data = &event.data;

                    // The publisher sets user_id to the member being
                    // notified; without it there is no recipient to store
                    // the row against.
                    if let Some(recipient_id) = event.user_id {
                        if recipient_id != data.sender_id {
                            if let Err(e) = notification_service::create_notification(
                                &state.db,
                                recipient_id,
                                "group_message",
                                &data.group_name,
                                &format!("{}\n{}", data.sender_display_name, data.content_preview),
                                Some(serde_json::json!({
                                    "groupId": data.group_id,
                                    "messageId": data.message_id,
                                    "actorName": data.sender_display_name,
                                    "preview": { "text80": data.content_preview },
                                })),
                                None,
                            ) {
                                tracing::error!(error = %e, "failed to create group_message notification");
                            }
                        }
                    } else {
                        tracing::warn!(
                            group_id = %data.group_id,
                            "group message event missing user_id, skipping notification"
                        );
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "groupes consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for rencontre events (match.created, message.sent, like.sent).
pub async fn listen_rencontre_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "onekamer-notification.rencontre",
            &[
                routing_keys::RENCONTRE_MATCH_CREATED,
                routing_keys::RENCONTRE_MESSAGE_SENT,
                routing_keys::RENCONTRE_LIKE_SENT,
            ],
        )
        .await?;

    tracing::info!("listening for rencontre events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::RENCONTRE_MATCH_CREATED {
                    if let Some(event) =
                        decode::<payloads::MatchCreated>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        let body = format!(
                            "{} & {}, c'est un match !",
                            data.user_a_display_name, data.user_b_display_name
                        );
                        // One row per side; actorName marks the recipient so
                        // the formatter can pick out the counterpart.
                        let sides = [
                            (data.user_a_id, &data.user_a_display_name),
                            (data.user_b_id, &data.user_b_display_name),
                        ];
                        for (recipient_id, own_name) in sides {
                            if let Err(e) = notification_service::create_notification(
                                &state.db,
                                recipient_id,
                                "rencontre_match",
                                "C'est un match !",
                                &body,
                                Some(serde_json::json!({
                                    "matchId": data.match_id,
                                    "actorName": own_name,
                                })),
                                None,
                            ) {
                                tracing::error!(error = %e, "failed to create rencontre_match notification");
                            }
                        }
                    }
                } else if routing_key == routing_keys::RENCONTRE_MESSAGE_SENT {
                    if let Some(event) =
                        decode::<payloads::RencontreMessageSent>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.recipient_id,
                            "rencontre_message",
                            "Nouveau message",
                            &format!(
                                "Nouveau message\n{} : {}",
                                data.sender_display_name, data.content_preview
                            ),
                            Some(serde_json::json!({
                                "matchId": data.match_id,
                                "messageId": data.message_id,
                                "actorName": data.sender_display_name,
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create rencontre_message notification");
                        }
                    }
                } else if routing_key == routing_keys::RENCONTRE_LIKE_SENT {
                    if let Some(event) =
                        decode::<payloads::RencontreLikeSent>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.liked_id,
                            "rencontre_like",
                            "Quelqu'un vous a liké",
                            &format!("🧡 {}", data.liker_display_name),
                            Some(serde_json::json!({
                                "likerUserId": data.liker_id,
                                "actorName": data.liker_display_name,
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create rencontre_like notification");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "rencontre consumer error");
            }
        }
    }

    Ok(())
}

/// Listen for commerce and back-office events (orders, donations, system).
pub async fn listen_commerce_events(state: Arc<AppState>) -> anyhow::Result<()> {
    let mut consumer = state
        .rabbitmq
        .subscribe(
            "onekamer-notification.commerce",
            &[
                routing_keys::MARKET_ORDER_UPDATED,
                routing_keys::DONATION_RECEIVED,
                routing_keys::SYSTEME_ANNOUNCEMENT,
            ],
        )
        .await?;

    tracing::info!("listening for commerce events");

    while let Some(delivery) = consumer.next().await {
        match delivery {
            Ok(delivery) => {
                let routing_key = delivery.routing_key.to_string();

                if routing_key == routing_keys::MARKET_ORDER_UPDATED {
                    if let Some(event) =
                        decode::<payloads::OrderUpdated>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.buyer_id,
                            "commande",
                            "Commande mise à jour",
                            &format!("Votre commande est maintenant : {}", data.status),
                            Some(serde_json::json!({
                                "orderId": data.order_id,
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create commande notification");
                        }
                    }
                } else if routing_key == routing_keys::DONATION_RECEIVED {
                    if let Some(event) =
                        decode::<payloads::DonationReceived>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.recipient_id,
                            "donation",
                            "Don reçu",
                            &format!(
                                "{} vous a envoyé {} OK Coins",
                                data.donor_display_name, data.amount_coins
                            ),
                            Some(serde_json::json!({
                                "actorName": data.donor_display_name,
                            })),
                            None,
                        ) {
                            tracing::error!(error = %e, "failed to create donation notification");
                        }
                    }
                } else if routing_key == routing_keys::SYSTEME_ANNOUNCEMENT {
                    if let Some(event) =
                        decode::<payloads::SystemAnnouncement>(&delivery.data, &routing_key)
                    {
                        let data = &event.data;
                        if let Err(e) = notification_service::create_notification(
                            &state.db,
                            data.recipient_id,
                            "systeme",
                            &data.title,
                            &data.body,
                            None,
                            data.deeplink.clone(),
                        ) {
                            tracing::error!(error = %e, "failed to create systeme notification");
                        }
                    }
                }

                let _ = delivery.ack(BasicAckOptions::default()).await;
            }
            Err(e) => {
                tracing::error!(error = %e, "commerce consumer error");
            }
        }
    }

    Ok(())
}
