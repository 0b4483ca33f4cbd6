use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! token_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

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
    };
}

token_newtype!(ProductId);
token_newtype!(SortValue);

/// Cart mutation requested by a control. Tokens other than `add` and
/// `remove` are passed through untouched; the server decides what they mean.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CartAction {
    Add,
    Remove,
    Other(String),
}

impl CartAction {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Other(token) => token,
        }
    }
}

impl From<&str> for CartAction {
    fn from(value: &str) -> Self {
        match value {
            "add" => Self::Add,
            "remove" => Self::Remove,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for CartAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "add" => Self::Add,
            "remove" => Self::Remove,
            _ => Self::Other(value),
        }
    }
}

impl From<CartAction> for String {
    fn from(value: CartAction) -> Self {
        match value {
            CartAction::Other(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CartAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the hosting page rendered as `user` for Django's anonymous user.
pub const DEFAULT_ANONYMOUS_SENTINEL: &str = "AnonymousUser";

/// Visitor identity as rendered by the hosting page. Only ever compared with
/// the anonymous sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity(String);

impl SessionIdentity {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn anonymous() -> Self {
        Self(DEFAULT_ANONYMOUS_SENTINEL.to_string())
    }

    pub fn is_anonymous(&self, sentinel: &str) -> bool {
        self.0 == sentinel
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken(<redacted>)")
    }
}
