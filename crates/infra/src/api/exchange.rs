use async_trait::async_trait;
use inkstat_core::TokenExchangeApi;
use inkstat_domain::{
    AccessGrant, AccessToken, ApiError, AuthorizationCode, CodeVerifier, Identity, InkstatError,
    ProviderConfig, SessionToken, WebServiceToken,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use super::envelope::Envelope;
use crate::http::{decode_json, ApiRequest, HttpClient};

#[derive(Debug, Deserialize)]
struct SessionTokenResponse {
    #[serde(default)]
    session_token: String,
}

#[derive(Debug, Deserialize)]
struct Account {
    id: String,
    #[serde(default)]
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    #[serde(default)]
    access_token: String,
    account: Account,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebServiceResult {
    #[serde(default)]
    access_token: String,
    expires_in: u64,
}

/// [`TokenExchangeApi`] over the provider's HTTP endpoints.
///
/// Holds its own [`HttpClient`]; the login flow builds one per attempt so
/// no cookies outlive it.
#[derive(Debug, Clone)]
pub struct ProviderExchangeClient {
    http: HttpClient,
    client_id: String,
    grant_type: String,
    game_id: i64,
    session_token_url: Url,
    access_token_url: Url,
    web_service_token_url: Url,
}

impl ProviderExchangeClient {
    /// # Errors
    /// Returns [`InkstatError::Config`] if an endpoint URL does not parse.
    pub fn new(http: HttpClient, config: &ProviderConfig) -> Result<Self, InkstatError> {
        Ok(Self {
            http,
            client_id: config.client_id.clone(),
            grant_type: config.grant_type.clone(),
            game_id: config.game_id,
            session_token_url: endpoint("session token", &config.session_token_url)?,
            access_token_url: endpoint("access token", &config.access_token_url)?,
            web_service_token_url: endpoint("web service token", &config.web_service_token_url)?,
        })
    }
}

fn endpoint(name: &str, raw: &str) -> Result<Url, InkstatError> {
    Url::parse(raw).map_err(|err| InkstatError::Config(format!("invalid {name} URL '{raw}': {err}")))
}

#[async_trait]
impl TokenExchangeApi for ProviderExchangeClient {
    #[instrument(skip_all)]
    async fn exchange_session_token(
        &self,
        code: &AuthorizationCode,
        verifier: &CodeVerifier,
    ) -> Result<SessionToken, ApiError> {
        let request = ApiRequest::post(self.session_token_url.clone()).form([
            ("client_id", self.client_id.as_str()),
            ("session_token_code", code.as_str()),
            ("session_token_code_verifier", verifier.as_str()),
        ]);

        let body = self.http.send(request).await?;
        let response: SessionTokenResponse = decode_json(&body, "session token")?;
        debug!("session token received");
        Ok(SessionToken::new(response.session_token))
    }

    #[instrument(skip_all)]
    async fn exchange_access_token(
        &self,
        session_token: &SessionToken,
    ) -> Result<AccessGrant, ApiError> {
        let request = ApiRequest::post(self.access_token_url.clone()).json(json!({
            "client_id": self.client_id,
            "session_token": session_token.as_str(),
            "grant_type": self.grant_type,
        }));

        let body = self.http.send(request).await?;
        let envelope: Envelope<LoginResult> = decode_json(&body, "access token")?;
        let result = envelope.into_result("access token")?;
        debug!(account_id = %result.account.id, "access token received");

        Ok(AccessGrant {
            access_token: AccessToken::new(result.access_token),
            identity: Identity {
                account_id: result.account.id,
                nickname: result.account.nickname,
                linked_game: true,
            },
        })
    }

    #[instrument(skip_all)]
    async fn exchange_web_service_token(
        &self,
        access_token: &AccessToken,
    ) -> Result<WebServiceToken, ApiError> {
        let request = ApiRequest::post(self.web_service_token_url.clone())
            .bearer(access_token.as_str())?
            .json(json!({ "id": self.game_id }));

        let body = self.http.send(request).await?;
        let envelope: Envelope<WebServiceResult> = decode_json(&body, "web service token")?;
        let result = envelope.into_result("web service token")?;
        debug!(expires_in = result.expires_in, "web service token received");

        Ok(WebServiceToken::new(result.access_token, result.expires_in))
    }
}
