//! Tracked accounts: the built-in list and the optional TOML override.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;

/// An account whose timeline is fetched on every run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackedAccount {
    pub handle: String,
    #[serde(rename = "name", alias = "displayName")]
    pub display_name: String,
}

impl TrackedAccount {
    #[must_use]
    pub fn new(handle: &str, display_name: &str) -> Self {
        Self {
            handle: handle.to_string(),
            display_name: display_name.to_string(),
        }
    }
}

/// Accounts tracked when no `ACCOUNTS_FILE` is configured.
const DEFAULT_ACCOUNTS: &[(&str, &str)] = &[
    ("sama", "Sam Altman"),
    ("DarioAmodei", "Dario Amodei"),
    ("karpathy", "Andrej Karpathy"),
    ("ylecun", "Yann LeCun"),
    ("demaborish", "Demis Hassabis"),
    ("elonmusk", "Elon Musk"),
    ("satikiram", "Satya Nadella"),
    ("JensenHuang", "Jensen Huang"),
    ("AravSrinivas", "Aravind Srinivas"),
    ("fchollet", "François Chollet"),
    ("swyx", "Shawn Wang"),
    ("bindureddy", "Bindu Reddy"),
    ("emaborish", "Emad Mostaque"),
];

#[must_use]
pub fn default_accounts() -> Vec<TrackedAccount> {
    DEFAULT_ACCOUNTS
        .iter()
        .map(|(handle, name)| TrackedAccount::new(handle, name))
        .collect()
}

#[derive(Debug, Deserialize)]
struct AccountsFile {
    #[serde(default)]
    accounts: Vec<TrackedAccount>,
}

/// Parse an accounts list from TOML. Handles and names are trimmed.
///
/// ```toml
/// [[accounts]]
/// handle = "karpathy"
/// name = "Andrej Karpathy"
/// ```
///
/// # Errors
///
/// Returns an error if the document is not valid TOML or does not match the
/// expected shape.
pub fn parse_accounts(path: &Path, contents: &str) -> Result<Vec<TrackedAccount>, ConfigError> {
    let file: AccountsFile = toml::from_str(contents).map_err(|e| ConfigError::AccountsParse {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(file
        .accounts
        .iter()
        .map(|a| TrackedAccount::new(a.handle.trim(), a.display_name.trim()))
        .collect())
}

/// Read and parse an accounts file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_accounts_file(path: &Path) -> Result<Vec<TrackedAccount>, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::AccountsRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_accounts(path, &contents)
}

/// Check that the account list is non-empty and has unique, non-empty handles.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] describing the first problem found.
pub fn validate_accounts(accounts: &[TrackedAccount]) -> Result<(), ConfigError> {
    if accounts.is_empty() {
        return Err(ConfigError::InvalidValue {
            name: "ACCOUNTS_FILE".to_string(),
            message: "at least one account is required".to_string(),
        });
    }

    let mut seen = HashSet::new();
    for account in accounts {
        let handle = account.handle.as_str();
        if handle.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "ACCOUNTS_FILE".to_string(),
                message: format!("account '{}' has an empty handle", account.display_name),
            });
        }
        if handle.trim() != handle {
            return Err(ConfigError::InvalidValue {
                name: "ACCOUNTS_FILE".to_string(),
                message: format!("handle '{handle}' has surrounding whitespace"),
            });
        }
        if !seen.insert(handle.to_lowercase()) {
            return Err(ConfigError::InvalidValue {
                name: "ACCOUNTS_FILE".to_string(),
                message: format!("duplicate handle '{handle}'"),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accounts_are_valid() {
        let accounts = default_accounts();
        assert_eq!(accounts.len(), DEFAULT_ACCOUNTS.len());
        assert!(validate_accounts(&accounts).is_ok());
    }

    #[test]
    fn test_parse_accounts() {
        let toml = r#"
            [[accounts]]
            handle = "karpathy"
            name = "Andrej Karpathy"

            [[accounts]]
            handle = "fchollet"
            displayName = "François Chollet"
        "#;

        let accounts = parse_accounts(Path::new("accounts.toml"), toml).unwrap();
        assert_eq!(
            accounts,
            vec![
                TrackedAccount::new("karpathy", "Andrej Karpathy"),
                TrackedAccount::new("fchollet", "François Chollet"),
            ]
        );
    }

    #[test]
    fn test_parse_accounts_trims_whitespace() {
        let toml = r#"
            [[accounts]]
            handle = " karpathy "
            name = "  Andrej Karpathy\t"
        "#;

        let accounts = parse_accounts(Path::new("accounts.toml"), toml).unwrap();
        assert_eq!(accounts, vec![TrackedAccount::new("karpathy", "Andrej Karpathy")]);
        assert!(validate_accounts(&accounts).is_ok());
    }

    #[test]
    fn test_validate_rejects_padded_handle() {
        let accounts = vec![TrackedAccount::new(" karpathy ", "Andrej Karpathy")];
        assert!(matches!(
            validate_accounts(&accounts),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_parse_accounts_rejects_bad_shape() {
        let toml = r#"
            [[accounts]]
            handle = "karpathy"
        "#;
        assert!(matches!(
            parse_accounts(Path::new("accounts.toml"), toml),
            Err(ConfigError::AccountsParse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_duplicates_case_insensitively() {
        let accounts = vec![
            TrackedAccount::new("Swyx", "Shawn Wang"),
            TrackedAccount::new("swyx", "Shawn"),
        ];
        assert!(validate_accounts(&accounts).is_err());
    }

    #[test]
    fn test_validate_rejects_empty_handle() {
        let accounts = vec![TrackedAccount::new("  ", "Nobody")];
        assert!(validate_accounts(&accounts).is_err());
        assert!(validate_accounts(&[]).is_err());
    }
}
