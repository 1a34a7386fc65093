use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::{Map, Value};

use crate::error::PlannerError;

/// How the current user signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignInKind {
    /// Username/password held by the platform's own user pool
    Password,
    /// Third-party identity provider (Google, Facebook, SAML, ...)
    Federated,
}

/// Tokens issued by the identity platform for the signed-in user.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
}

impl Session {
    pub fn new(access_token: Option<String>, id_token: Option<String>) -> Self {
        Session {
            access_token,
            id_token,
        }
    }

    /// Claims from the id token payload.
    ///
    /// The signature is not checked; the platform verifies tokens on every
    /// API call, this is only used for display and sign-in introspection.
    pub fn id_claims(&self) -> Option<Map<String, Value>> {
        let token = self.id_token.as_deref()?;
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        match serde_json::from_slice(&bytes).ok()? {
            Value::Object(claims) => Some(claims),
            _ => None,
        }
    }

    /// Subject identifier of the signed-in user, if the id token carries one.
    pub fn user_sub(&self) -> Option<String> {
        self.id_claims()?
            .get("sub")
            .and_then(Value::as_str)
            .map(String::from)
    }

    pub fn sign_in_kind(&self) -> SignInKind {
        let Some(claims) = self.id_claims() else {
            return SignInKind::Password;
        };

        let has_identities = claims
            .get("identities")
            .is_some_and(crate::decoder::is_truthy);
        let federated_amr = claims
            .get("amr")
            .and_then(Value::as_array)
            .is_some_and(|amr| amr.iter().any(|m| m.as_str() == Some("federated")));

        if has_identities || federated_amr {
            SignInKind::Federated
        } else {
            SignInKind::Password
        }
    }
}

/// Capability to look up the current session.
///
/// Token issuance and refresh belong to the identity platform; the client
/// only ever asks for whatever session is current.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Result<Session, PlannerError>;
}

/// Session fixed at startup, e.g. tokens passed through configuration.
pub struct StaticSessionProvider {
    session: Session,
}

impl StaticSessionProvider {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn anonymous() -> Self {
        Self::new(Session::default())
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Result<Session, PlannerError> {
        Ok(self.session.clone())
    }
}

#[cfg(test)]
pub(crate) fn fake_id_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.signature", header, payload)
}
