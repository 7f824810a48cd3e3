//! Resolution of stored media references into playable URLs.
//!
//! A stored `path` can be empty, an absolute URL (sometimes a long-dead
//! signed URL or stale dev data), or a storage-relative key with assorted
//! legacy prefixes. Resolution walks an ordered cascade and degrades tier
//! by tier; it never surfaces a failure beyond the final placeholder.

use async_trait::async_trait;
use serde::Serialize;
use url::Url;

use onekamer_shared::clients::storage::StorageClient;

use crate::buckets::{Bucket, GENERIC_PLACEHOLDER_URL};

/// Signed URLs are valid for one hour and are never persisted; consumers
/// re-resolve on every mount.
pub const SIGNED_URL_TTL_SECS: u64 = 3600;

/// Rows seeded with the internal default image carry this marker; they must
/// resolve to the placeholder without any network call.
const DEFAULT_SENTINEL: &str = "default_faits_divers";

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "webm", "ogg", "mov"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMedia {
    pub url: Option<String>,
    pub kind: MediaKind,
    pub error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_url: Option<String>,
}

impl ResolvedMedia {
    fn placeholder_for(bucket: Option<Bucket>) -> Self {
        let url = bucket
            .map(|b| b.placeholder_url())
            .unwrap_or(GENERIC_PLACEHOLDER_URL);
        Self {
            url: Some(url.to_string()),
            kind: MediaKind::Image,
            error: false,
            backup_url: None,
        }
    }

    /// Terminal state: no bucket, no path, nothing left to show.
    fn unavailable() -> Self {
        Self {
            url: None,
            kind: MediaKind::Image,
            error: true,
            backup_url: None,
        }
    }

    /// Runtime load-failure hook (the `onerror` equivalent): swap to the
    /// backup URL once, then to the placeholder. Returns false when there is
    /// nothing left to swap to, which callers treat as "stop retrying".
    pub fn recover(&mut self, bucket: Option<Bucket>) -> bool {
        if let Some(backup) = self.backup_url.take() {
            self.url = Some(backup);
            return true;
        }

        let placeholder = bucket
            .map(|b| b.placeholder_url())
            .unwrap_or(GENERIC_PLACEHOLDER_URL);
        if self.url.as_deref() != Some(placeholder) {
            self.url = Some(placeholder.to_string());
            self.kind = MediaKind::Image;
            self.error = false;
            return true;
        }

        false
    }
}

/// Issues short-lived signed URLs for private storage objects.
#[async_trait]
pub trait SignUrls {
    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_secs: u64,
    ) -> Result<String, String>;
}

#[async_trait]
impl SignUrls for StorageClient {
    async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_secs: u64,
    ) -> Result<String, String> {
        StorageClient::create_signed_url(self, bucket, key, expires_secs).await
    }
}

pub struct MediaResolver<S> {
    signer: S,
    cdn_base: String,
}

impl<S: SignUrls + Sync> MediaResolver<S> {
    pub fn new(signer: S, cdn_base: impl Into<String>) -> Self {
        let cdn_base = cdn_base.into().trim_end_matches('/').to_string();
        Self { signer, cdn_base }
    }

    /// Resolve a stored media reference. Total: every input maps to a
    /// displayable result, and only the no-bucket/no-path case carries the
    /// hard error flag.
    pub async fn resolve(&self, bucket: Option<Bucket>, path: Option<&str>) -> ResolvedMedia {
        let path = path.map(str::trim).unwrap_or("");

        // 1. Nothing stored.
        if path.is_empty() {
            return match bucket {
                Some(b) => ResolvedMedia::placeholder_for(Some(b)),
                None => ResolvedMedia::unavailable(),
            };
        }

        // 2. Internal sentinel rows never hit the network.
        if path.to_lowercase().contains(DEFAULT_SENTINEL) {
            return ResolvedMedia::placeholder_for(bucket);
        }

        // 3. Absolute URLs.
        if path.starts_with("http://") || path.starts_with("https://") {
            return self.resolve_absolute(bucket, path).await;
        }

        // 4. Storage-relative keys.
        self.resolve_relative(bucket, path).await
    }

    async fn resolve_absolute(&self, bucket: Option<Bucket>, raw: &str) -> ResolvedMedia {
        let parsed = match Url::parse(raw) {
            Ok(parsed) => parsed,
            // A scheme prefix but no parseable URL; nothing usable remains.
            Err(_) => return ResolvedMedia::placeholder_for(bucket),
        };

        // 3a. Stale dev data points at a machine that no longer exists.
        if matches!(parsed.host_str(), Some("localhost") | Some("127.0.0.1")) {
            return ResolvedMedia::placeholder_for(bucket);
        }

        // 3b. A previously issued signed URL: its token is long expired, so
        // dissect it and sign the underlying object afresh.
        if let Some((legacy_bucket, key)) = parse_legacy_signed(&parsed) {
            match self
                .signer
                .create_signed_url(&legacy_bucket, &key, SIGNED_URL_TTL_SECS)
                .await
            {
                Ok(url) => {
                    return ResolvedMedia {
                        kind: kind_of(&key),
                        backup_url: Some(self.cdn_url(&legacy_bucket, &key)),
                        url: Some(url),
                        error: false,
                    };
                }
                Err(e) => {
                    tracing::debug!(bucket = %legacy_bucket, error = %e, "re-sign failed, using CDN mirror");
                    return ResolvedMedia {
                        kind: kind_of(&key),
                        url: Some(self.cdn_url(&legacy_bucket, &key)),
                        error: false,
                        backup_url: bucket.map(|b| b.placeholder_url().to_string()),
                    };
                }
            }
        }

        // 3c. Any other absolute URL is used as-is, normalized by the parse.
        ResolvedMedia {
            kind: kind_of(parsed.path()),
            url: Some(parsed.to_string()),
            error: false,
            backup_url: bucket.map(|b| b.placeholder_url().to_string()),
        }
    }

    async fn resolve_relative(&self, bucket: Option<Bucket>, raw: &str) -> ResolvedMedia {
        let Some(bucket) = bucket else {
            // A bare key with no bucket cannot be signed or mirrored.
            return ResolvedMedia::placeholder_for(None);
        };

        let key = normalize_key(bucket, raw);

        match self
            .signer
            .create_signed_url(bucket.as_str(), &key, SIGNED_URL_TTL_SECS)
            .await
        {
            Ok(url) => {
                return ResolvedMedia {
                    kind: kind_of(&key),
                    backup_url: Some(self.cdn_url(bucket.as_str(), &key)),
                    url: Some(url),
                    error: false,
                };
            }
            Err(e) => {
                tracing::debug!(bucket = %bucket, key = %key, error = %e, "signing failed");
            }
        }

        // Older rencontres uploads live one folder deeper; retry once with
        // the legacy prefix before giving up on signing.
        if bucket == Bucket::Rencontres {
            let legacy_key = format!("rencontres/{key}");
            match self
                .signer
                .create_signed_url(bucket.as_str(), &legacy_key, SIGNED_URL_TTL_SECS)
                .await
            {
                Ok(url) => {
                    return ResolvedMedia {
                        kind: kind_of(&legacy_key),
                        backup_url: Some(self.cdn_url(bucket.as_str(), &legacy_key)),
                        url: Some(url),
                        error: false,
                    };
                }
                Err(e) => {
                    tracing::debug!(key = %legacy_key, error = %e, "legacy rencontres signing failed");
                }
            }
        }

        // CDN mirror, with the same legacy compensation the signing retry
        // uses. See DESIGN.md: the per-tier guards differ on purpose.
        let mirror_key = if bucket == Bucket::Rencontres {
            format!("rencontres/{key}")
        } else {
            key
        };
        ResolvedMedia {
            kind: kind_of(&mirror_key),
            url: Some(self.cdn_url(bucket.as_str(), &mirror_key)),
            error: false,
            backup_url: Some(bucket.placeholder_url().to_string()),
        }
    }

    fn cdn_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.cdn_base, bucket, key)
    }
}

/// Strip leading slashes and redundant bucket prefixes from a stored key.
/// `annonces/annonces/a.jpg` and `annonces/a.jpg` both normalize to `a.jpg`.
fn normalize_key(bucket: Bucket, raw: &str) -> String {
    let mut key = raw.trim_start_matches('/');
    let prefix = format!("{}/", bucket.as_str());
    while key.starts_with(&prefix) {
        key = &key[prefix.len()..];
    }
    key.to_string()
}

/// Recognize a previously issued signed-storage URL and recover the
/// `{bucket, key}` pair from its path segments.
fn parse_legacy_signed(url: &Url) -> Option<(String, String)> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    let pos = segments
        .windows(2)
        .position(|w| w[0] == "object" && w[1] == "sign")?;

    let bucket = segments.get(pos + 2)?;
    let key_segments = &segments[pos + 3..];
    if bucket.is_empty() || key_segments.is_empty() {
        return None;
    }

    let key = key_segments.join("/");
    let key = urlencoding::decode(&key)
        .map(|c| c.into_owned())
        .unwrap_or(key);
    Some((bucket.to_string(), key))
}

/// Video vs image by file extension of the final resolved key.
fn kind_of(path: &str) -> MediaKind {
    let clean = path
        .split(['?', '#'])
        .next()
        .unwrap_or(path);
    let ext = clean
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext) => MediaKind::Video,
        _ => MediaKind::Image,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Signs only keys accepted by the embedded predicate.
    enum StubSigner {
        AlwaysOk,
        AlwaysFail,
        OnlyPrefix(&'static str),
    }

    #[async_trait]
    impl SignUrls for StubSigner {
        async fn create_signed_url(
            &self,
            bucket: &str,
            key: &str,
            _expires_secs: u64,
        ) -> Result<String, String> {
            let accept = match self {
                StubSigner::AlwaysOk => true,
                StubSigner::AlwaysFail => false,
                StubSigner::OnlyPrefix(prefix) => key.starts_with(prefix),
            };
            if accept {
                Ok(format!("https://storage.test/object/sign/{bucket}/{key}?token=stub"))
            } else {
                Err("sign denied".to_string())
            }
        }
    }

    fn resolver(signer: StubSigner) -> MediaResolver<StubSigner> {
        MediaResolver::new(signer, "https://cdn.test")
    }

    #[tokio::test]
    async fn test_empty_path_yields_placeholder_for_every_bucket() {
        let r = resolver(StubSigner::AlwaysOk);
        for bucket in Bucket::ALL {
            for path in [None, Some("")] {
                let resolved = r.resolve(Some(bucket), path).await;
                assert_eq!(resolved.url.as_deref(), Some(bucket.placeholder_url()));
                assert_eq!(resolved.kind, MediaKind::Image);
                assert!(!resolved.error);
            }
        }
    }

    #[tokio::test]
    async fn test_no_bucket_and_no_path_is_the_only_hard_error() {
        let r = resolver(StubSigner::AlwaysOk);
        let resolved = r.resolve(None, None).await;
        assert!(resolved.error);
        assert_eq!(resolved.url, None);
    }

    #[tokio::test]
    async fn test_sentinel_path_skips_network() {
        let r = resolver(StubSigner::AlwaysFail);
        let resolved = r
            .resolve(Some(Bucket::FaitsDivers), Some("images/DEFAULT_faits_divers.png"))
            .await;
        assert_eq!(
            resolved.url.as_deref(),
            Some(Bucket::FaitsDivers.placeholder_url())
        );
    }

    #[tokio::test]
    async fn test_localhost_url_is_discarded() {
        let r = resolver(StubSigner::AlwaysOk);
        for url in [
            "http://localhost:3000/annonces/a.jpg",
            "http://127.0.0.1/whatever.mp4",
        ] {
            let resolved = r.resolve(Some(Bucket::Annonces), Some(url)).await;
            assert_eq!(
                resolved.url.as_deref(),
                Some(Bucket::Annonces.placeholder_url())
            );
            assert_eq!(resolved.kind, MediaKind::Image);
        }
    }

    #[tokio::test]
    async fn test_legacy_signed_url_is_resigned() {
        let r = resolver(StubSigner::AlwaysOk);
        let stored =
            "https://old.storage.test/storage/v1/object/sign/groupes/photos/p.jpg?token=expired";
        let resolved = r.resolve(Some(Bucket::Groupes), Some(stored)).await;
        assert_eq!(
            resolved.url.as_deref(),
            Some("https://storage.test/object/sign/groupes/photos/p.jpg?token=stub")
        );
        assert_eq!(resolved.backup_url.as_deref(), Some("https://cdn.test/groupes/photos/p.jpg"));
    }

    #[tokio::test]
    async fn test_legacy_signed_url_falls_back_to_cdn() {
        let r = resolver(StubSigner::AlwaysFail);
        let stored = "https://old.storage.test/storage/v1/object/sign/groupes/p.mp4?token=x";
        let resolved = r.resolve(Some(Bucket::Groupes), Some(stored)).await;
        assert_eq!(resolved.url.as_deref(), Some("https://cdn.test/groupes/p.mp4"));
        assert_eq!(resolved.kind, MediaKind::Video);
        assert!(!resolved.error);
    }

    #[tokio::test]
    async fn test_plain_absolute_url_passes_through() {
        let r = resolver(StubSigner::AlwaysFail);
        let resolved = r
            .resolve(Some(Bucket::Avatars), Some("https://pics.example.com/me.webm"))
            .await;
        assert_eq!(resolved.url.as_deref(), Some("https://pics.example.com/me.webm"));
        assert_eq!(resolved.kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn test_relative_key_signing() {
        let r = resolver(StubSigner::AlwaysOk);
        let resolved = r
            .resolve(Some(Bucket::Annonces), Some("/annonces/annonces/a.jpg"))
            .await;
        assert_eq!(
            resolved.url.as_deref(),
            Some("https://storage.test/object/sign/annonces/a.jpg?token=stub")
        );
        assert_eq!(resolved.kind, MediaKind::Image);
    }

    #[tokio::test]
    async fn test_rencontres_legacy_retry_decides_kind_from_final_key() {
        // Direct signing fails; only the legacy-prefixed key signs.
        let r = resolver(StubSigner::OnlyPrefix("rencontres/"));
        let resolved = r.resolve(Some(Bucket::Rencontres), Some("profil/v.mov")).await;
        assert_eq!(
            resolved.url.as_deref(),
            Some("https://storage.test/object/sign/rencontres/rencontres/profil/v.mov?token=stub")
        );
        assert_eq!(resolved.kind, MediaKind::Video);
    }

    #[tokio::test]
    async fn test_relative_key_cdn_fallback() {
        let r = resolver(StubSigner::AlwaysFail);
        let resolved = r.resolve(Some(Bucket::Evenements), Some("flyer.png")).await;
        assert_eq!(resolved.url.as_deref(), Some("https://cdn.test/evenements/flyer.png"));
        assert!(!resolved.error);
        assert_eq!(
            resolved.backup_url.as_deref(),
            Some(Bucket::Evenements.placeholder_url())
        );
    }

    #[tokio::test]
    async fn test_rencontres_cdn_fallback_keeps_legacy_prefix() {
        let r = resolver(StubSigner::AlwaysFail);
        let resolved = r.resolve(Some(Bucket::Rencontres), Some("profil/p.jpg")).await;
        assert_eq!(
            resolved.url.as_deref(),
            Some("https://cdn.test/rencontres/rencontres/profil/p.jpg")
        );
    }

    #[tokio::test]
    async fn test_recover_swaps_backup_then_placeholder_then_stops() {
        let r = resolver(StubSigner::AlwaysOk);
        let mut resolved = r.resolve(Some(Bucket::Groupes), Some("photo.jpg")).await;

        assert!(resolved.recover(Some(Bucket::Groupes)));
        assert_eq!(resolved.url.as_deref(), Some("https://cdn.test/groupes/photo.jpg"));

        assert!(resolved.recover(Some(Bucket::Groupes)));
        assert_eq!(resolved.url.as_deref(), Some(Bucket::Groupes.placeholder_url()));

        assert!(!resolved.recover(Some(Bucket::Groupes)));
    }

    #[test]
    fn test_normalize_key_prefixes() {
        assert_eq!(normalize_key(Bucket::Annonces, "a.jpg"), "a.jpg");
        assert_eq!(normalize_key(Bucket::Annonces, "/annonces/a.jpg"), "a.jpg");
        assert_eq!(normalize_key(Bucket::Annonces, "annonces/annonces/a.jpg"), "a.jpg");
    }

    #[test]
    fn test_kind_of_ignores_query() {
        assert_eq!(kind_of("clip.MP4?token=abc"), MediaKind::Video);
        assert_eq!(kind_of("pic.jpg?token=abc"), MediaKind::Image);
        assert_eq!(kind_of("no-extension"), MediaKind::Image);
    }
}
