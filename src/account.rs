use async_trait::async_trait;
use log::info;
use serde_json::Value;

use crate::error::PlannerError;
use crate::session::{Session, SignInKind};

/// Minimum length the identity platform accepts for a new password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Identity platform operations the client may request but never performs
/// itself.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn change_password(&self, old_password: &str, new_password: &str)
        -> Result<(), PlannerError>;

    async fn sign_out(&self) -> Result<(), PlannerError>;
}

/// What the account page shows about the signed-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSummary {
    pub username: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub sign_in: SignInKind,
}

impl AccountSummary {
    pub fn from_session(session: &Session) -> Self {
        let claims = session.id_claims().unwrap_or_default();
        let text = |key: &str| claims.get(key).and_then(Value::as_str).map(String::from);

        let username = text("cognito:username")
            .or_else(|| text("username"))
            .or_else(|| text("sub"));
        let email_verified = match claims.get("email_verified") {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) => s == "true",
            _ => false,
        };

        AccountSummary {
            username,
            email: text("email"),
            email_verified,
            sign_in: session.sign_in_kind(),
        }
    }

    /// Federated users manage their password with their identity provider.
    pub fn can_change_password(&self) -> bool {
        self.sign_in == SignInKind::Password
    }
}

/// Password change form contents.
#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordChange {
    /// Local checks run before anything is sent to the identity platform.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.old_password.is_empty()
            || self.new_password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err(PlannerError::Validation(
                "Please fill in all fields.".to_string(),
            ));
        }
        if self.new_password != self.confirm_password {
            return Err(PlannerError::Validation(
                "New password and confirmation do not match.".to_string(),
            ));
        }
        if self.new_password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PlannerError::Validation(format!(
                "New password must be at least {} characters.",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

/// Validate `change` and hand it to the identity platform.
pub async fn change_password(
    provider: &dyn IdentityProvider,
    session: &Session,
    change: &PasswordChange,
) -> Result<(), PlannerError> {
    if session.sign_in_kind() == SignInKind::Federated {
        return Err(PlannerError::Validation(
            "Password changes are managed by your identity provider.".to_string(),
        ));
    }
    change.validate()?;

    provider
        .change_password(&change.old_password, &change.new_password)
        .await
}

/// End the session with the identity platform. Local state is the caller's
/// to reset once this returns.
pub async fn sign_out(provider: &dyn IdentityProvider) -> Result<(), PlannerError> {
    provider.sign_out().await?;
    info!("Signed out");
    Ok(())
}
