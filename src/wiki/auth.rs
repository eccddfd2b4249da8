//! Bot-password login, logout and token retrieval.
//!
//! Login is a two-step exchange. The token request opens a session and
//! the wiki answers with a session cookie; the login request must carry
//! that cookie alongside the token or it fails with `WrongToken`. Both
//! steps go through the client's jar, so the caller never handles
//! cookies directly.

use crate::base::neterror::NetError;
use crate::client::WikiClient;
use crate::wiki::extract;
use serde::Deserialize;
use serde_json::Value;

/// The account a successful login authenticated as.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginInfo {
    #[serde(rename = "lguserid")]
    pub user_id: u64,
    #[serde(rename = "lgusername")]
    pub username: String,
}

#[derive(Deserialize)]
struct RawLogin {
    result: String,
    #[serde(default)]
    reason: Option<Value>,
    lguserid: Option<u64>,
    lgusername: Option<String>,
}

impl RawLogin {
    fn info(&self) -> Option<LoginInfo> {
        Some(LoginInfo {
            user_id: self.lguserid?,
            username: self.lgusername.clone()?,
        })
    }
}

/// `reason` is a plain string on older wikis and an object with `text` or
/// `code` on newer ones.
fn reason_text(reason: Option<Value>) -> String {
    match reason {
        Some(Value::String(s)) => s,
        Some(Value::Object(map)) => map
            .get("text")
            .or_else(|| map.get("code"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::new(),
    }
}

impl WikiClient {
    /// Log in with a bot password (`User@BotName` and its generated secret).
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginInfo, NetError> {
        if username.is_empty() {
            return Err(NetError::invalid_parameter("username", "must not be empty"));
        }

        let token = self.token("login").await?;

        let mut body = self
            .post([
                ("action", "login"),
                ("lgname", username),
                ("lgpassword", password),
                ("lgtoken", token.as_str()),
            ])
            .await?;

        let raw: RawLogin = extract(&mut body, "/login")?;
        if raw.result == "Success" {
            if let Some(info) = raw.info() {
                tracing::info!(user = %info.username, user_id = info.user_id, "logged in");
                return Ok(info);
            }
        }

        let reason = reason_text(raw.reason);
        tracing::warn!(result = %raw.result, reason = %reason, "login rejected");
        Err(NetError::LoginFailed {
            result: raw.result,
            reason,
        })
    }

    /// End the session. Session cookies the wiki expires are dropped from
    /// the jar by the response's own `Set-Cookie` headers.
    pub async fn logout(&self) -> Result<(), NetError> {
        let token = self.csrf_token().await?;
        self.post([("action", "logout"), ("token", token.as_str())])
            .await?;
        tracing::info!("logged out");
        Ok(())
    }

    /// Fetch a CSRF token for write actions.
    ///
    /// Anonymous sessions get the placeholder token `+\`, which the wiki
    /// accepts only where anonymous edits are allowed.
    pub async fn csrf_token(&self) -> Result<String, NetError> {
        self.token("csrf").await
    }

    async fn token(&self, kind: &str) -> Result<String, NetError> {
        let mut body = self
            .get([("action", "query"), ("meta", "tokens"), ("type", kind)])
            .await?;

        let pointer = format!("/query/tokens/{}token", kind);
        match extract::<String>(&mut body, &pointer) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(NetError::MissingToken),
        }
    }
}
