use serde::{Deserialize, Serialize};

/// User information persisted in the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    email: String,
}

impl UserIdentity {
    /// Creates a user identity from authentication data.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email: email.into(),
        }
    }

    /// Returns the stable subject, which is the user id in the directory.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email the user signed in with.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }
}
