use baladiya_domain::User;

use super::types::UserIdentityResponse;

impl From<User> for UserIdentityResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id().to_string(),
            email: user.email().as_str().to_owned(),
            display_name: user.display_name().to_owned(),
            role: user.role().as_str().to_owned(),
            roles: user.role_names(),
        }
    }
}
