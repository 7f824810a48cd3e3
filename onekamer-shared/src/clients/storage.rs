use serde::Deserialize;
use url::Url;

/// Client for the hosted storage backend's signing endpoint.
///
/// Buckets are private; reads go through short-lived signed URLs issued by
/// `POST {base}/object/sign/{bucket}/{key}`. The response carries a
/// storage-relative `signedURL` that must be made absolute against the base.
#[derive(Clone)]
pub struct StorageClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

#[derive(Debug, serde::Serialize)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

impl StorageClient {
    pub fn new(base_url: &str, service_key: &str) -> anyhow::Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        tracing::info!(base_url = %base_url, "storage client initialized");

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            service_key: service_key.to_string(),
        })
    }

    /// Request a signed URL for `key` in `bucket`, valid for `expires_secs`.
    ///
    /// Failures come back as plain strings: callers treat any failure as a
    /// cache-miss-like event and fall through to their next tier.
    pub async fn create_signed_url(
        &self,
        bucket: &str,
        key: &str,
        expires_secs: u64,
    ) -> Result<String, String> {
        let encoded_key = encode_key(key);
        let endpoint = format!("{}/object/sign/{}/{}", self.base_url, bucket, encoded_key);

        let response = self
            .http
            .post(&endpoint)
            .bearer_auth(&self.service_key)
            .json(&SignRequest { expires_in: expires_secs })
            .send()
            .await
            .map_err(|e| format!("sign request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("sign request returned {}", response.status()));
        }

        let body: SignResponse = response
            .json()
            .await
            .map_err(|e| format!("sign response malformed: {e}"))?;

        // The backend returns a storage-relative path like
        // `/object/sign/<bucket>/<key>?token=…`.
        let signed = body.signed_url;
        if signed.starts_with("http://") || signed.starts_with("https://") {
            Ok(signed)
        } else {
            Ok(format!("{}{}", self.base_url, ensure_leading_slash(&signed)))
        }
    }
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

/// Percent-encode each path segment of a storage key, keeping the slashes.
fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|seg| urlencoding::encode(seg).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_key_keeps_slashes() {
        assert_eq!(encode_key("rencontres/photo 1.jpg"), "rencontres/photo%201.jpg");
    }

    #[test]
    fn test_ensure_leading_slash() {
        assert_eq!(ensure_leading_slash("object/sign/a"), "/object/sign/a");
        assert_eq!(ensure_leading_slash("/object/sign/a"), "/object/sign/a");
    }
}
