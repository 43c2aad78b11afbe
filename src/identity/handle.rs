/// Handle, domain, username and DID value types
use crate::error::{HandlesError, HandlesResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain part of a handle, e.g. `example.com`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Domain(pub String);

/// Leading label of a handle, e.g. `alice`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(pub String);

/// Decentralized identifier a handle resolves to, e.g. `did:plc:...`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(pub String);

macro_rules! string_newtype {
    ($name:ident) => {
        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_newtype!(Domain);
string_newtype!(Username);
string_newtype!(Did);

/// A handle parsed from a request hostname
///
/// The canonical form is always lowercase `username.domain`; the domain may
/// itself contain dots.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Handle {
    pub domain: Domain,
    pub username: Username,
}

impl Handle {
    pub fn new(username: impl Into<Username>, domain: impl Into<Domain>) -> Self {
        Self {
            domain: domain.into(),
            username: username.into(),
        }
    }

    /// Parse a hostname into a handle
    ///
    /// Splits on the first dot only, so `alice.example.co.uk` becomes
    /// username `alice` and domain `example.co.uk`.
    pub fn parse(hostname: &str) -> HandlesResult<Self> {
        let lowered = hostname.to_lowercase();

        match lowered.split_once('.') {
            Some((username, domain)) if !username.is_empty() && !domain.is_empty() => {
                Ok(Self::new(username, domain))
            }
            _ => Err(HandlesError::InvalidHostname(hostname.to_string())),
        }
    }
}

impl FromStr for Handle {
    type Err = HandlesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}",
            self.username.as_str().to_lowercase(),
            self.domain.as_str().to_lowercase()
        )
    }
}

/// Strip the port from a `Host` header value
pub fn hostname_from_authority(authority: &str) -> &str {
    match authority.rsplit_once(':') {
        Some((host, port)) if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) => host,
        _ => authority,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_splits_on_first_dot() {
        let handle = Handle::parse("alice.example.com").unwrap();
        assert_eq!(handle.username.as_str(), "alice");
        assert_eq!(handle.domain.as_str(), "example.com");
    }

    #[test]
    fn test_parse_keeps_multi_label_domains() {
        let handle = Handle::parse("bob.social.example.co.uk").unwrap();
        assert_eq!(handle.username.as_str(), "bob");
        assert_eq!(handle.domain.as_str(), "social.example.co.uk");
    }

    #[test]
    fn test_parse_lowercases() {
        let handle = Handle::parse("Alice.Example.COM").unwrap();
        assert_eq!(handle, Handle::new("alice", "example.com"));
    }

    #[test]
    fn test_parse_rejects_single_label() {
        let result = Handle::parse("alice");
        assert!(matches!(result, Err(HandlesError::InvalidHostname(_))));
    }

    #[test]
    fn test_parse_rejects_empty_sides() {
        assert!(Handle::parse(".example.com").is_err());
        assert!(Handle::parse("alice.").is_err());
        assert!(Handle::parse("").is_err());
    }

    #[test]
    fn test_parse_does_not_validate_characters() {
        let handle: Handle = "al_ice!.exa mple".parse().unwrap();
        assert_eq!(handle.to_string(), "al_ice!.exa mple");
    }

    #[test]
    fn test_canonical_string_is_lowercase() {
        let handle = Handle::new("ALICE", "example.com");
        assert_eq!(handle.to_string(), "alice.example.com");
    }

    #[test]
    fn test_hostname_from_authority() {
        assert_eq!(hostname_from_authority("alice.example.com:8080"), "alice.example.com");
        assert_eq!(hostname_from_authority("alice.example.com"), "alice.example.com");
        assert_eq!(hostname_from_authority("alice.example.com:"), "alice.example.com:");
    }
}
