//! Single-identity admin gate.

use subtle::ConstantTimeEq;

/// The one credential pair accepted by the login form.
///
/// The password is held and compared as plaintext; only the comparison is
/// hardened against timing.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct SessionGate {
    admin: AdminCredentials,
}

impl SessionGate {
    pub fn new(admin: AdminCredentials) -> Self {
        Self { admin }
    }

    pub fn admin_username(&self) -> &str {
        &self.admin.username
    }

    /// Check a login attempt. Both halves are always compared.
    pub fn authenticate(&self, username: &str, password: &str) -> bool {
        let user_ok = username.as_bytes().ct_eq(self.admin.username.as_bytes());
        let pass_ok = password.as_bytes().ct_eq(self.admin.password.as_bytes());
        bool::from(user_ok & pass_ok)
    }

    /// Whether the identity recorded in a session may use gated routes.
    pub fn permits(&self, identity: Option<&str>) -> bool {
        match identity {
            Some(identity) => bool::from(identity.as_bytes().ct_eq(self.admin.username.as_bytes())),
            None => false,
        }
    }
}
