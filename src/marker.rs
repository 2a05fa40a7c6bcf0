//! Reference markers and the prefix matcher.
//!
//! A configuration string is a secret reference when it starts with one of
//! four literal prefixes. The prefix selects the backend and whether the
//! result is text or bytes; the rest of the string is the identifier, passed
//! to the backend untouched.

use std::fmt;
use std::str::FromStr;

/// Which backend a marker resolves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// AWS Secrets Manager (the vault)
    SecretsManager,
    /// AWS SSM Parameter Store
    ParameterStore,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecretsManager => write!(f, "secretsmanager"),
            Self::ParameterStore => write!(f, "parameterstore"),
        }
    }
}

/// Shape of the resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Resolves to a string
    String,
    /// Resolves to raw bytes
    Binary,
}

/// A recognized reference prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// `sm://` - Secrets Manager string
    SecretsManagerString,
    /// `smb://` - Secrets Manager binary
    SecretsManagerBinary,
    /// `ssm://` - Parameter Store string
    ParameterStoreString,
    /// `ssmb64://` - Parameter Store base64-encoded binary
    ParameterStoreBinary,
}

impl Marker {
    /// All markers in matching order. No prefix is a prefix of another.
    pub const ALL: [Marker; 4] = [
        Marker::SecretsManagerString,
        Marker::SecretsManagerBinary,
        Marker::ParameterStoreString,
        Marker::ParameterStoreBinary,
    ];

    /// The literal prefix.
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::SecretsManagerString => "sm://",
            Self::SecretsManagerBinary => "smb://",
            Self::ParameterStoreString => "ssm://",
            Self::ParameterStoreBinary => "ssmb64://",
        }
    }

    pub const fn backend(self) -> BackendKind {
        match self {
            Self::SecretsManagerString | Self::SecretsManagerBinary => BackendKind::SecretsManager,
            Self::ParameterStoreString | Self::ParameterStoreBinary => BackendKind::ParameterStore,
        }
    }

    pub const fn encoding(self) -> Encoding {
        match self {
            Self::SecretsManagerString | Self::ParameterStoreString => Encoding::String,
            Self::SecretsManagerBinary | Self::ParameterStoreBinary => Encoding::Binary,
        }
    }

    /// Whether the decrypt flag is forwarded for this marker.
    pub const fn decrypt_applicable(self) -> bool {
        matches!(self.backend(), BackendKind::ParameterStore)
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Marker {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Marker::ALL
            .into_iter()
            .find(|m| m.prefix() == s)
            .ok_or_else(|| format!("unknown marker: {}", s))
    }
}

/// Splits a marked value into its identifier and marker.
///
/// Only a prefix at the very start of the string counts. Exactly the marker
/// is removed; the identifier is otherwise returned as-is.
///
/// # Example
///
/// ```
/// use secretfig::marker::{strip_marker, Marker};
///
/// assert_eq!(
///     strip_marker("sm://small_foo_bar"),
///     Some(("small_foo_bar", Marker::SecretsManagerString))
/// );
/// assert_eq!(strip_marker("plain value"), None);
/// assert_eq!(strip_marker("x-sm://not-anchored"), None);
/// ```
pub fn strip_marker(value: &str) -> Option<(&str, Marker)> {
    Marker::ALL
        .into_iter()
        .find_map(|marker| value.strip_prefix(marker.prefix()).map(|id| (id, marker)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_marker_strips_exactly_its_prefix() {
        let cases = [
            ("sm://foo_bar", "foo_bar", Marker::SecretsManagerString),
            ("smb://foo_bar", "foo_bar", Marker::SecretsManagerBinary),
            ("ssm://foo_bar", "foo_bar", Marker::ParameterStoreString),
            ("ssmb64://foo_bar", "foo_bar", Marker::ParameterStoreBinary),
        ];

        for (input, id, marker) in cases {
            assert_eq!(strip_marker(input), Some((id, marker)), "input: {}", input);
        }
    }

    #[test]
    fn test_identifiers_resembling_prefixes() {
        // trimming a character set instead of a literal prefix would eat into these
        assert_eq!(
            strip_marker("sm://small_foo_bar"),
            Some(("small_foo_bar", Marker::SecretsManagerString))
        );
        assert_eq!(
            strip_marker("smb://smball_foo_bar"),
            Some(("smball_foo_bar", Marker::SecretsManagerBinary))
        );
        assert_eq!(
            strip_marker("ssm://ssmall_foo_bar"),
            Some(("ssmall_foo_bar", Marker::ParameterStoreString))
        );
        assert_eq!(
            strip_marker("ssmb64://ssmb64all_foo_bar"),
            Some(("ssmb64all_foo_bar", Marker::ParameterStoreBinary))
        );
        assert_eq!(
            strip_marker("sm://ssm://nested"),
            Some(("ssm://nested", Marker::SecretsManagerString))
        );
    }

    #[test]
    fn test_no_match() {
        assert_eq!(strip_marker(""), None);
        assert_eq!(strip_marker("postgres://localhost/db"), None);
        assert_eq!(strip_marker("value with sm://inside"), None);
        assert_eq!(strip_marker(" sm://leading-space"), None);
        assert_eq!(strip_marker("SM://upper"), None);
        assert_eq!(strip_marker("sm:/missing-slash"), None);
    }

    #[test]
    fn test_empty_identifier() {
        assert_eq!(strip_marker("ssm://"), Some(("", Marker::ParameterStoreString)));
    }

    #[test]
    fn test_marker_table() {
        assert_eq!(Marker::SecretsManagerBinary.backend(), BackendKind::SecretsManager);
        assert_eq!(Marker::SecretsManagerBinary.encoding(), Encoding::Binary);
        assert!(!Marker::SecretsManagerString.decrypt_applicable());
        assert!(Marker::ParameterStoreBinary.decrypt_applicable());
        assert_eq!(Marker::ParameterStoreString.to_string(), "ssm://");
        assert_eq!("ssmb64://".parse::<Marker>(), Ok(Marker::ParameterStoreBinary));
        assert!("s3://".parse::<Marker>().is_err());
    }
}
