//! Account credential handle
//!
//! Acquiring and persisting tokens is the caller's business. Jobs only read
//! the access token to stamp outgoing requests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Authenticated account as seen by the job engine
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier, usually the user's email address
    pub account_name: String,
    pub access_token: String,
    pub refresh_token: String,
    /// Scopes the tokens were granted for
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Account {
    /// Create an account with an access token and no refresh token.
    pub fn new(account_name: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            access_token: access_token.into(),
            ..Self::default()
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = refresh_token.into();
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Add a scope unless it is already present.
    pub fn add_scope(&mut self, scope: impl Into<String>) {
        let scope = scope.into();
        if !self.scopes.contains(&scope) {
            self.scopes.push(scope);
        }
    }

    /// An account is usable when it names someone and carries a token.
    pub fn is_valid(&self) -> bool {
        !self.account_name.trim().is_empty() && !self.access_token.is_empty()
    }

    /// Whether requests can be authorized with this account. Jobs only need
    /// the token; the name is for bookkeeping.
    pub fn has_access_token(&self) -> bool {
        !self.access_token.is_empty()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn validity_requires_name_and_token() {
        assert!(Account::new("user@example.com", "token").is_valid());
        assert!(!Account::new("user@example.com", "").is_valid());
        assert!(!Account::new("  ", "token").is_valid());
        assert!(!Account::default().is_valid());
    }

    #[test]
    fn access_token_alone_authorizes() {
        assert!(Account::new("", "token").has_access_token());
        assert!(!Account::new("user@example.com", "").has_access_token());
    }

    #[test]
    fn add_scope_deduplicates() {
        let mut account = Account::new("user@example.com", "token");
        account.add_scope("https://www.googleapis.com/auth/tasks");
        account.add_scope("https://www.googleapis.com/auth/tasks");
        assert_eq!(account.scopes.len(), 1);
    }

    #[test]
    fn expiry_is_inclusive() {
        let now = Utc::now();
        let account = Account::new("a", "t").with_expiry(now);
        assert!(account.is_expired(now));
        assert!(!account.is_expired(now - Duration::seconds(1)));
        assert!(!Account::new("a", "t").is_expired(now));
    }
}
