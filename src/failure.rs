//! Handshake failure codes reported back to the protected application.
//!
//! The short form travels as a query parameter value on the redirect back
//! to the login page, so it has no spaces. The long form is shown to users.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why an OpenID handshake did not produce an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailure {
    NoIdpFound,
    InvalidIdUrl,
    IdpNotTrusted,
    InvalidNonce,
    Canceled,
    Unspecified,
}

impl AuthFailure {
    /// Query-parameter form, e.g. `no_idp_found`.
    pub fn short_code(&self) -> &'static str {
        match self {
            AuthFailure::NoIdpFound => "no_idp_found",
            AuthFailure::InvalidIdUrl => "invalid_id_url",
            AuthFailure::IdpNotTrusted => "idp_not_trusted",
            AuthFailure::InvalidNonce => "invalid_nonce",
            AuthFailure::Canceled => "canceled",
            AuthFailure::Unspecified => "unspecified",
        }
    }

    /// Human-readable explanation.
    pub fn description(&self) -> &'static str {
        match self {
            AuthFailure::NoIdpFound => {
                "There was either no identity provider found at the identity URL given \
                 or there was trouble connecting to it."
            }
            AuthFailure::InvalidIdUrl => "The identity URL given is not a valid URL.",
            AuthFailure::IdpNotTrusted => {
                "The identity provider for the identity URL given is not trusted."
            }
            AuthFailure::InvalidNonce => "Invalid nonce; error while authenticating.",
            AuthFailure::Canceled => "Identification process has been canceled.",
            AuthFailure::Unspecified => {
                "There has been an error while attempting to authenticate."
            }
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short_code())
    }
}

impl FromStr for AuthFailure {
    type Err = std::convert::Infallible;

    /// Unknown codes map to [`AuthFailure::Unspecified`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "no_idp_found" => AuthFailure::NoIdpFound,
            "invalid_id_url" => AuthFailure::InvalidIdUrl,
            "idp_not_trusted" => AuthFailure::IdpNotTrusted,
            "invalid_nonce" => AuthFailure::InvalidNonce,
            "canceled" => AuthFailure::Canceled,
            _ => AuthFailure::Unspecified,
        })
    }
}
