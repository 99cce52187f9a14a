use secrecy::SecretString;

use crate::config::helpers::required;
use crate::error::ConfigError;
use crate::settings::Settings;

/// Connection parameters for salt-api.
///
/// No value is validated here beyond presence: a malformed URL or wrong
/// credentials surface when the session first logs in.
#[derive(Debug, Clone)]
pub struct SaltApiConfig {
    pub url: String,
    pub username: String,
    pub password: SecretString,
    /// External authentication backend (`pam`, `ldap`, `auto`, ...).
    pub eauth: String,
}

impl SaltApiConfig {
    pub(crate) fn resolve(settings: &Settings) -> Result<Self, ConfigError> {
        let salt = &settings.salt_api;
        Ok(Self {
            url: required(
                "SALT_API_URL",
                salt.url.as_ref(),
                "Set it to the salt-api base URL, e.g. http://127.0.0.1:8000/",
            )?,
            username: required(
                "SALT_API_USERNAME",
                salt.username.as_ref(),
                "Set it to the salt-api login user.",
            )?,
            password: SecretString::from(required(
                "SALT_API_PASSWORD",
                salt.password.as_ref(),
                "Set it to the salt-api login password.",
            )?),
            eauth: required(
                "SALT_API_EAUTH",
                salt.eauth.as_ref(),
                "Set it to the eauth backend name, e.g. pam.",
            )?,
        })
    }
}
