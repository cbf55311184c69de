//! Startup warnings for well-known default credentials.

use tracing::warn;

/// JWS key shipped in the stock configuration.
const DEFAULT_JWS_KEY: &str =
    "ZW7pRixehFuNUtnY5Se47IemgMryTzazPPJ9CGX5LTCmsOJpOgHAQEuPQeV9A28f";
/// Digest of the admin password shipped in the stock configuration.
const DEFAULT_ADMIN_PASSWORD: &str = "5baa61e4c9b93f3f0682250b6cf8331b7ee68fd8";

/// Detects whether a deployment still runs on the stock credentials and
/// nags about it once per check.
///
/// Only the comparison outcome is retained; the configured values are
/// never stored.
#[derive(Debug, Clone, Copy)]
pub struct CredentialGuard {
    default_jws_key: bool,
    default_admin_password: bool,
}

impl CredentialGuard {
    /// Compares the configured credentials against the stock values.
    #[must_use]
    pub fn new(jws_key: &str, admin_password: &str) -> Self {
        Self {
            default_jws_key: jws_key == DEFAULT_JWS_KEY,
            default_admin_password: admin_password == DEFAULT_ADMIN_PASSWORD,
        }
    }

    /// Whether the configured JWS key is the stock one.
    #[must_use]
    pub fn default_jws_key(&self) -> bool {
        self.default_jws_key
    }

    /// Whether the configured admin password is the stock one.
    #[must_use]
    pub fn default_admin_password(&self) -> bool {
        self.default_admin_password
    }

    /// Warns when the stock JWS key is still in use.
    pub fn check_jws_key(&self) {
        if self.default_jws_key {
            warn!(
                "The default jwsKey property is being used: this must be changed to avoid accepting JWT tokens minted by others"
            );
        }
    }

    /// Warns when the stock admin password is still in use.
    pub fn check_admin_password(&self) {
        if self.default_admin_password {
            warn!(
                "The default adminPassword property is being used: this must be changed to avoid unwanted logins"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CredentialGuard, DEFAULT_ADMIN_PASSWORD, DEFAULT_JWS_KEY};

    #[test]
    fn stock_credentials_are_detected() {
        let guard = CredentialGuard::new(DEFAULT_JWS_KEY, DEFAULT_ADMIN_PASSWORD);
        assert!(guard.default_jws_key());
        assert!(guard.default_admin_password());
    }

    #[test]
    fn rotated_credentials_pass() {
        let guard = CredentialGuard::new("freshly-generated-key", "rotated-digest");
        assert!(!guard.default_jws_key());
        assert!(!guard.default_admin_password());
    }

    #[test]
    fn detection_is_per_credential() {
        let guard = CredentialGuard::new(DEFAULT_JWS_KEY, "rotated-digest");
        assert!(guard.default_jws_key());
        assert!(!guard.default_admin_password());
    }
}
