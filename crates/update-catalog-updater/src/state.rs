//! Persisted updater state.
//!
//! A flat `key=value` file next to the managed installation. The format is
//! deliberately strict: unknown keys fail the read, so a corrupted or
//! foreign file never silently degrades into a half-configured updater.

use chrono::{DateTime, Utc};
use std::path::Path;

/// Error type for state file failures
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not read state from file \"{0}\"")]
    Unreadable(String),

    #[error("could not write state to file \"{0}\": {1}")]
    Unwritable(String, std::io::Error),

    #[error("invalid state file format: unknown key \"{0}\"")]
    UnknownKey(String),

    #[error("invalid last-checked time format")]
    InvalidTimestamp,
}

/// Everything the updater remembers between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub server: String,
    pub client_id: String,
    pub vendor: String,
    pub product: String,
    pub variant: String,
    pub os: String,
    pub arch: String,
    pub with_unstable: bool,
    pub version: String,
    pub last_checked: Option<DateTime<Utc>>,
}

impl State {
    pub fn is_valid(&self) -> bool {
        !self.server.is_empty() && !self.vendor.is_empty() && !self.product.is_empty()
    }

    pub fn is_installed(&self) -> bool {
        !self.version.is_empty()
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), StateError> {
        let path = path.as_ref();

        let last_checked = self
            .last_checked
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();

        let content = format!(
            "server-address={}\n\
             client-id={}\n\
             vendor={}\n\
             product={}\n\
             variant={}\n\
             os={}\n\
             arch={}\n\
             with-unstable={}\n\
             version={}\n\
             last-checked={}\n",
            self.server,
            self.client_id,
            self.vendor,
            self.product,
            self.variant,
            self.os,
            self.arch,
            self.with_unstable,
            self.version,
            last_checked,
        );

        std::fs::write(path, content)
            .map_err(|e| StateError::Unwritable(path.display().to_string(), e))
    }

    pub fn read_from_file(path: impl AsRef<Path>) -> Result<Self, StateError> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| StateError::Unreadable(path.display().to_string()))?;
        if content.is_empty() {
            return Err(StateError::Unreadable(path.display().to_string()));
        }

        let mut state = State::default();

        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            match key {
                "server-address" => state.server = value.to_string(),
                "client-id" => state.client_id = value.to_string(),
                "vendor" => state.vendor = value.to_string(),
                "product" => state.product = value.to_string(),
                "variant" => state.variant = value.to_string(),
                "os" => state.os = value.to_string(),
                "arch" => state.arch = value.to_string(),
                "version" => state.version = value.to_string(),
                "with-unstable" => {
                    state.with_unstable = value == "yes" || value == "true";
                }
                "last-checked" => {
                    if !value.is_empty() {
                        let parsed = DateTime::parse_from_rfc3339(value)
                            .map_err(|_| StateError::InvalidTimestamp)?;
                        state.last_checked = Some(parsed.with_timezone(&Utc));
                    }
                }
                unknown => return Err(StateError::UnknownKey(unknown.to_string())),
            }
        }

        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> State {
        State {
            server: "http://localhost:8080".to_string(),
            client_id: "ee0bfdc3-2f13-4a7e-9821-0c5a72d4a1b7".to_string(),
            vendor: "acme".to_string(),
            product: "anvil".to_string(),
            variant: "Pro".to_string(),
            os: "linux".to_string(),
            arch: "amd64".to_string(),
            with_unstable: true,
            version: "v1.2.3".to_string(),
            last_checked: Some("2024-05-01T10:30:00Z".parse().unwrap()),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updater.state");

        let state = sample_state();
        state.save_to_file(&path).unwrap();

        let read = State::read_from_file(&path).unwrap();
        assert_eq!(read, state);
    }

    #[test]
    fn test_with_unstable_accepts_yes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updater.state");

        std::fs::write(&path, "vendor=acme\nproduct=anvil\nwith-unstable=yes\n").unwrap();

        let state = State::read_from_file(&path).unwrap();
        assert!(state.with_unstable);

        std::fs::write(&path, "vendor=acme\nproduct=anvil\nwith-unstable=no\n").unwrap();
        let state = State::read_from_file(&path).unwrap();
        assert!(!state.with_unstable);
    }

    #[test]
    fn test_unknown_keys_fail_the_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updater.state");

        std::fs::write(&path, "vendor=acme\nfavourite-color=green\n").unwrap();

        let result = State::read_from_file(&path);
        assert!(matches!(result, Err(StateError::UnknownKey(_))));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(State::read_from_file("/nonexistent/updater.state").is_err());
    }

    #[test]
    fn test_validity() {
        let mut state = sample_state();
        assert!(state.is_valid());
        assert!(state.is_installed());

        state.version.clear();
        assert!(!state.is_installed());

        state.server.clear();
        assert!(!state.is_valid());
    }
}
