use std::time::Duration;

use serde::Deserialize;

const SITEVERIFY_ENDPOINT: &str = "https://challenges.cloudflare.com/turnstile/v0/siteverify";
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Cloudflare Turnstile token verification.
///
/// Verification is fail-open on partial configuration: with no secret key, or
/// with a secret key but no site key (widget not deployed on the page), every
/// token passes. Only a fully configured verifier can reject a voter.
pub struct TurnstileVerifier {
    client: reqwest::Client,
    secret_key: Option<String>,
    site_key: Option<String>,
}

#[derive(Deserialize)]
struct SiteverifyResponse {
    #[serde(default)]
    success: bool,
}

impl TurnstileVerifier {
    pub fn new(
        secret_key: Option<String>,
        site_key: Option<String>,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(VERIFY_TIMEOUT).build()?;
        Ok(Self {
            client,
            secret_key,
            site_key,
        })
    }

    /// Whether both keys are present and verification actually runs.
    pub fn is_enforced(&self) -> bool {
        self.secret_key.is_some() && self.site_key.is_some()
    }

    /// Verify a client token. Returns `true` when the request may proceed.
    pub async fn verify(&self, token: Option<&str>, remote_ip: &str) -> bool {
        let Some(secret) = self.secret_key.as_deref() else {
            return true;
        };
        // Secret without a deployed widget: the client never had a token to send.
        if self.site_key.is_none() {
            return true;
        }

        let Some(token) = token else {
            return false;
        };

        let params = [
            ("secret", secret),
            ("response", token),
            ("remoteip", remote_ip),
        ];

        let response = match self
            .client
            .post(SITEVERIFY_ENDPOINT)
            .form(&params)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("turnstile siteverify request failed: {e}");
                return false;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "turnstile siteverify rejected");
            return false;
        }

        match response.json::<SiteverifyResponse>().await {
            Ok(body) => body.success,
            Err(e) => {
                tracing::warn!("turnstile siteverify returned invalid body: {e}");
                false
            }
        }
    }
}
