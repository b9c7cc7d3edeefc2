//! `Token`, `Header` and the signing / parsing pipeline.

use anyhow::anyhow;
use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

use crate::{
    alg::Algorithm,
    claims::Claims,
    error::{CompareError, CreationError, ValidationError},
    jwt::Jwt,
};

/// Value of the `typ` header field for every token this crate produces.
pub const TOKEN_TYPE: &str = "JWT";

/// Token header: the format tag plus the declared signing algorithm.
///
/// Exactly these two fields are modeled; the wire form is
/// `{"typ":"JWT","alg":"HS256"}`. The declared algorithm is informational: during
/// parsing it is compared against the algorithm configured in the [`Jwt`] context, and
/// verification never proceeds under an algorithm the context was not built with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Token format tag; always [`TOKEN_TYPE`] for minted tokens.
    #[serde(rename = "typ")]
    pub token_type: String,

    /// Name of the algorithm the token declares to be signed with.
    #[serde(rename = "alg")]
    pub algorithm: String,
}

/// Fresh or parsed token.
///
/// A fresh token produced by [`Jwt::new_token()`] carries only a header and claims;
/// its compact representation and signature do not exist until [`Jwt::signed_string()`]
/// is invoked. A token returned by [`Jwt::parse_string()`] is populated with the raw
/// compact string and the signature segment, and has passed signature verification and
/// claims validation in full; partially validated tokens are never observable.
#[derive(Debug, Clone)]
pub struct Token {
    raw: Option<String>,
    header: Header,
    claims: Claims,
    signature: Option<String>,
}

impl Token {
    pub(crate) fn new(header: Header, claims: Claims) -> Self {
        Self {
            raw: None,
            header,
            claims,
            signature: None,
        }
    }

    /// Gets the token header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Gets the token claims.
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Gets the compact representation this token was parsed from, if any.
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Gets the base64url-encoded signature segment, if the token has been parsed.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Serializes the header and claims into the two-segment signing input:
    /// `base64url(header) + "." + base64url(claims)`.
    ///
    /// The encoding is deterministic (derived struct serialization with a fixed field
    /// order), so the signing input recomputed during parsing is byte-for-byte the one
    /// produced at signing time.
    pub fn signing_string(&self) -> Result<String, CreationError> {
        let header = serde_json::to_string(&self.header).map_err(CreationError::Header)?;
        let mut buffer = Vec::new();
        encode_base64_buf(&header, &mut buffer);

        let claims = serde_json::to_string(&self.claims).map_err(CreationError::Claims)?;
        buffer.push(b'.');
        encode_base64_buf(&claims, &mut buffer);

        // SAFETY: safe by construction: base64 alphabet and `.` char are valid UTF-8.
        Ok(unsafe { String::from_utf8_unchecked(buffer) })
    }

    /// Structural comparison of two tokens: header `typ` and `alg` entries, then the
    /// claims field by field. Reports the first difference encountered.
    ///
    /// This is a round-trip testing aid, not a security check.
    pub fn compare(&self, other: &Self) -> Result<(), CompareError> {
        if self.header.token_type != other.header.token_type {
            return Err(CompareError::TokenType);
        }
        if self.header.algorithm != other.header.algorithm {
            return Err(CompareError::Algorithm);
        }
        self.claims.compare(&other.claims)
    }
}

impl<A: Algorithm, F: Fn() -> DateTime<Utc>> Jwt<A, F> {
    /// Creates a fresh, unsigned token with the specified id and TTL.
    pub fn new_token(&self, id: impl Into<String>, ttl_seconds: i64) -> Token {
        let header = Header {
            token_type: TOKEN_TYPE.to_owned(),
            algorithm: self.algorithm().name().into_owned(),
        };
        Token::new(header, self.new_claims(id, ttl_seconds))
    }

    /// Signs `token` and returns its three-segment compact representation:
    /// `base64url(header) + "." + base64url(claims) + "." + base64url(mac)`.
    pub fn signed_string(&self, token: &Token) -> Result<String, CreationError> {
        let mut buffer = token.signing_string()?.into_bytes();
        let signature = self.algorithm().sign(self.key(), &buffer);
        buffer.push(b'.');
        encode_base64_buf(&signature, &mut buffer);

        // SAFETY: safe by construction: base64 alphabet and `.` char are valid UTF-8.
        Ok(unsafe { String::from_utf8_unchecked(buffer) })
    }

    /// Parses and fully validates a compact token string.
    ///
    /// The pipeline mirrors signing in reverse: split into exactly 3 segments, decode
    /// the header, decode the claims, check the declared algorithm against the
    /// configured one (before any MAC computation), verify the signature, and finally
    /// validate the claims via [`Jwt::validate_claims()`]. The first failing step is
    /// returned and the token must be discarded; there is no partial success.
    ///
    /// Signature verification re-signs the canonical signing input recomputed from the
    /// decoded header and claims, and compares the result against the received
    /// signature segment in constant time.
    pub fn parse_string(&self, s: &str) -> Result<Token, ValidationError> {
        let segments: Vec<_> = s.splitn(4, '.').collect();
        let (header, claims, signature) = match segments.as_slice() {
            &[header, claims, signature] => (header, claims, signature),
            _ => return Err(ValidationError::InvalidNumberOfSegments),
        };

        let header = Base64UrlUnpadded::decode_vec(header)
            .map_err(|err| ValidationError::MalformedHeader(anyhow!(err)))?;
        let header: Header = serde_json::from_slice(&header)
            .map_err(|err| ValidationError::MalformedHeader(anyhow!(err)))?;

        let claims = Base64UrlUnpadded::decode_vec(claims)
            .map_err(|err| ValidationError::MalformedClaims(anyhow!(err)))?;
        let claims: Claims = serde_json::from_slice(&claims)
            .map_err(|err| ValidationError::MalformedClaims(anyhow!(err)))?;

        let expected_alg = self.algorithm().name();
        if header.algorithm != expected_alg {
            return Err(ValidationError::AlgorithmMismatch {
                expected: expected_alg.into_owned(),
                actual: header.algorithm,
            });
        }

        let token = Token::new(header, claims);
        let signing_input = token.signing_string().map_err(|err| match err {
            CreationError::Header(err) => ValidationError::MalformedHeader(anyhow!(err)),
            CreationError::Claims(err) => ValidationError::MalformedClaims(anyhow!(err)),
        })?;
        let mac = self.algorithm().sign(self.key(), signing_input.as_bytes());
        let expected_signature = Base64UrlUnpadded::encode_string(&mac);
        if !bool::from(expected_signature.as_bytes().ct_eq(signature.as_bytes())) {
            return Err(ValidationError::InvalidSignature);
        }

        self.validate_claims(token.claims())?;

        Ok(Token {
            raw: Some(s.to_owned()),
            signature: Some(signature.to_owned()),
            ..token
        })
    }
}

fn encode_base64_buf(source: impl AsRef<[u8]>, buffer: &mut Vec<u8>) {
    let source = source.as_ref();
    let previous_len = buffer.len();
    let encoded_len = Base64UrlUnpadded::encoded_len(source);
    buffer.resize(previous_len + encoded_len, 0);
    Base64UrlUnpadded::encode(source, &mut buffer[previous_len..])
        .expect("miscalculated base64-encoded length; this should never happen");
}
