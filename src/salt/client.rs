//! HTTP client for the salt-api REST interface (rest_cherrypy / rest_tornado).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use super::{Connector, SaltApi, TargetKind};
use crate::config::SaltApiConfig;
use crate::error::SaltApiError;

const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    eauth: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(rename = "return")]
    results: Vec<LoginToken>,
}

#[derive(Debug, Deserialize)]
struct LoginToken {
    token: String,
}

/// One lowstate chunk for `POST /`.
#[derive(Debug, Serialize)]
struct LocalCommand<'a> {
    client: &'static str,
    tgt: &'a str,
    fun: &'static str,
    arg: [&'a str; 1],
    tgt_type: &'static str,
}

/// Logs in over HTTP and hands out [`HttpSaltClient`]s.
#[derive(Debug, Default)]
pub struct HttpConnector;

impl HttpConnector {
    pub fn new() -> Self {
        Self
    }

    async fn login(&self, config: &SaltApiConfig) -> Result<HttpSaltClient, String> {
        let base_url = Url::parse(&config.url).map_err(|e| format!("invalid URL: {e}"))?;
        let client = Client::builder()
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;

        let login_url = endpoint(&base_url, "login")?;
        let response = client
            .post(login_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&LoginRequest {
                username: &config.username,
                password: config.password.expose_secret(),
                eauth: &config.eauth,
            })
            .send()
            .await
            .map_err(|e| format!("login request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("login rejected with HTTP {}", response.status()));
        }

        let payload = response
            .json::<LoginResponse>()
            .await
            .map_err(|e| format!("invalid login payload: {e}"))?;
        let token = payload
            .results
            .into_iter()
            .next()
            .map(|t| t.token)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| "login payload carried no token".to_string())?;

        Ok(HttpSaltClient {
            client,
            base_url,
            token: SecretString::from(token),
        })
    }
}

#[async_trait]
impl Connector for HttpConnector {
    async fn connect(&self, config: &SaltApiConfig) -> Result<Arc<dyn SaltApi>, SaltApiError> {
        match self.login(config).await {
            Ok(client) => {
                tracing::info!(url = %config.url, user = %config.username, "Logged in to salt-api");
                Ok(Arc::new(client))
            }
            Err(reason) => {
                tracing::warn!(url = %config.url, "salt-api login failed: {reason}");
                Err(SaltApiError::Connection)
            }
        }
    }
}

/// Authenticated salt-api connection.
pub struct HttpSaltClient {
    client: Client,
    base_url: Url,
    token: SecretString,
}

impl HttpSaltClient {
    async fn read_json(response: reqwest::Response) -> Result<Value, SaltApiError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unavailable>".to_string());
            return Err(SaltApiError::request(format!("HTTP {status}: {body}")));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| SaltApiError::response(format!("body is not JSON: {e}")))
    }
}

#[async_trait]
impl SaltApi for HttpSaltClient {
    async fn list_minions(&self) -> Result<Value, SaltApiError> {
        let url = endpoint(&self.base_url, "minions").map_err(SaltApiError::request)?;
        tracing::debug!(%url, "GET minions");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(AUTH_TOKEN_HEADER, self.token.expose_secret())
            .send()
            .await
            .map_err(|e| SaltApiError::request(e.to_string()))?;

        Self::read_json(response).await
    }

    async fn run_command(
        &self,
        target: &str,
        kind: TargetKind,
        command: &str,
    ) -> Result<Value, SaltApiError> {
        let url = endpoint(&self.base_url, "").map_err(SaltApiError::request)?;
        tracing::debug!(%url, target, kind = kind.as_str(), "POST cmd.run");

        let lowstate = [LocalCommand {
            client: "local",
            tgt: target,
            fun: "cmd.run",
            arg: [command],
            tgt_type: kind.as_str(),
        }];

        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(AUTH_TOKEN_HEADER, self.token.expose_secret())
            .json(&lowstate)
            .send()
            .await
            .map_err(|e| SaltApiError::request(e.to_string()))?;

        Self::read_json(response).await
    }
}

/// Join `path` onto the base URL, keeping any path prefix the base carries.
fn endpoint(base: &Url, path: &str) -> Result<Url, String> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|e| format!("invalid endpoint '{path}': {e}"))
}
