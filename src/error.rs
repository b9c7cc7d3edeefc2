//! Error handling.

use core::fmt;

/// Errors that can occur while parsing and validating a compact token.
///
/// The taxonomy is flat, and every error is terminal for the operation that produced it:
/// the token must be treated as untrusted and discarded. Validation reports the first
/// violated rule and never aggregates several failures.
#[derive(Debug)]
#[non_exhaustive]
pub enum ValidationError {
    /// Compact string does not split into exactly 3 dot-separated segments.
    InvalidNumberOfSegments,
    /// Header segment is not valid base64url, or does not decode into a well-formed
    /// header object.
    MalformedHeader(anyhow::Error),
    /// Claims segment is not valid base64url, or does not decode into a well-formed
    /// claims object.
    MalformedClaims(anyhow::Error),
    /// Algorithm mentioned in the token header differs from the one configured
    /// in the [`Jwt`](crate::Jwt) context.
    AlgorithmMismatch {
        /// Expected algorithm name.
        expected: String,
        /// Actual algorithm in the token.
        actual: String,
    },
    /// Recomputed MAC differs from the received signature segment.
    InvalidSignature,
    /// `aud` claim does not match the trusted audience.
    InvalidAudience,
    /// Token has expired.
    Expired,
    /// `iat` claim is not strictly in the past.
    UsedBeforeIssued,
    /// Token is not yet valid as per its `nbf` claim.
    NotValidYet,
    /// `iss` claim does not match the trusted issuer.
    InvalidIssuer,
    /// `sub` claim does not match the trusted subject.
    InvalidSubject,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumberOfSegments => {
                formatter.write_str("token contains an invalid number of segments")
            }
            Self::MalformedHeader(e) => write!(formatter, "malformed token header: {e}"),
            Self::MalformedClaims(e) => write!(formatter, "malformed token claims: {e}"),
            Self::AlgorithmMismatch { expected, actual } => write!(
                formatter,
                "token algorithm ({actual}) differs from expected ({expected})"
            ),
            Self::InvalidSignature => formatter.write_str("signature has failed verification"),
            Self::InvalidAudience => formatter.write_str("invalid audience"),
            Self::Expired => formatter.write_str("token has expired"),
            Self::UsedBeforeIssued => formatter.write_str("token used before issued"),
            Self::NotValidYet => formatter.write_str("token is not valid yet"),
            Self::InvalidIssuer => formatter.write_str("invalid issuer"),
            Self::InvalidSubject => formatter.write_str("invalid subject"),
        }
    }
}

impl std::error::Error for ValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedHeader(e) | Self::MalformedClaims(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

/// Errors that can occur during token creation.
#[derive(Debug)]
#[non_exhaustive]
pub enum CreationError {
    /// Token header cannot be serialized.
    Header(serde_json::Error),
    /// Token claims cannot be serialized.
    Claims(serde_json::Error),
}

impl fmt::Display for CreationError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(e) => write!(formatter, "cannot serialize header: {e}"),
            Self::Claims(e) => write!(formatter, "cannot serialize claims: {e}"),
        }
    }
}

impl std::error::Error for CreationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Header(e) | Self::Claims(e) => Some(e),
        }
    }
}

/// Identifier of a claim in [`Claims`](crate::Claims).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Claim {
    /// `aud` claim (audience).
    Audience,
    /// `exp` claim (expiration time).
    Expiration,
    /// `jti` claim (token identifier).
    Id,
    /// `iat` claim (issuance time).
    IssuedAt,
    /// `iss` claim (issuer).
    Issuer,
    /// `nbf` claim (valid not before).
    NotBefore,
    /// `sub` claim (subject).
    Subject,
}

impl fmt::Display for Claim {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Audience => "aud",
            Self::Expiration => "exp",
            Self::Id => "jti",
            Self::IssuedAt => "iat",
            Self::Issuer => "iss",
            Self::NotBefore => "nbf",
            Self::Subject => "sub",
        })
    }
}

/// Structural difference between two tokens or claims sets, reported by
/// [`Token::compare()`](crate::Token::compare) and [`Claims::compare()`](crate::Claims::compare).
///
/// Comparison is a round-trip testing aid, not a security mechanism; only the first
/// difference encountered is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CompareError {
    /// `typ` header fields differ.
    TokenType,
    /// `alg` header fields differ.
    Algorithm,
    /// The specified claim differs.
    Claim(Claim),
}

impl fmt::Display for CompareError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenType => formatter.write_str("token header `typ` fields differ"),
            Self::Algorithm => formatter.write_str("token header `alg` fields differ"),
            Self::Claim(claim) => write!(formatter, "`{claim}` claims differ"),
        }
    }
}

impl std::error::Error for CompareError {}
