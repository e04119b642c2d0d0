//! Bearer token lookup.
//!
//! Tokens are read from the environment variable a config section names;
//! they never pass through the config file.

use notorii_sync::RemoteError;

/// Read the secret stored under `name` using `lookup` (`std::env::var` in
/// production). Unset and blank values are both errors.
pub fn resolve<F>(name: &str, lookup: F) -> Result<String, RemoteError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| RemoteError::Secret {
            name: name.to_string(),
        })
}

/// [`resolve`] against the process environment.
pub fn from_env(name: &str) -> Result<String, RemoteError> {
    resolve(name, |key| std::env::var(key).ok())
}
