use crate::error::ConfigError;

/// Read an env var, treating unset and blank values the same.
pub(crate) fn optional_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(val) if val.trim().is_empty() => Ok(None),
        Ok(val) => Ok(Some(val)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Env var first, then the settings-file value, else a `MissingRequired` error.
pub(crate) fn required(
    key: &str,
    from_settings: Option<&String>,
    hint: &str,
) -> Result<String, ConfigError> {
    optional_env(key)?
        .or_else(|| from_settings.filter(|v| !v.trim().is_empty()).cloned())
        .ok_or_else(|| ConfigError::MissingRequired {
            key: key.to_string(),
            hint: hint.to_string(),
        })
}

/// Parse an optional env var into `T`, falling back to the settings value.
pub(crate) fn parsed_env<T>(key: &str, fallback: Option<T>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key)? {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            }),
        None => Ok(fallback),
    }
}
