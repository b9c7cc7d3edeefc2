//! Token claims and their wire encoding.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Claim, CompareError};

/// Claims carried by a token, as per [RFC 7519, Section 4.1].
///
/// The claim set is fixed: every field is mandatory and strongly typed, and there are
/// no custom claim extensions. A `Claims` value is created once, either by
/// [`Jwt::new_claims()`] from the issuer context or by parsing an incoming token,
/// and embedded in exactly one [`Token`](crate::Token) for its lifetime. A claims set
/// obtained by parsing carries no invariant (it may be stale or forged); enforcement
/// is the job of [`Jwt::validate_claims()`], not the constructor.
///
/// Timestamp fields are encoded as integer seconds since the Unix epoch.
///
/// [RFC 7519, Section 4.1]: https://tools.ietf.org/html/rfc7519#section-4.1
/// [`Jwt::new_claims()`]: crate::Jwt::new_claims
/// [`Jwt::validate_claims()`]: crate::Jwt::validate_claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Intended recipient of the token.
    #[serde(rename = "aud")]
    pub audience: String,

    /// Expiration date of the token.
    #[serde(rename = "exp", with = "serde_timestamp")]
    pub expires_at: DateTime<Utc>,

    /// Caller-supplied token identifier, opaque to this crate.
    #[serde(rename = "jti")]
    pub id: String,

    /// Date of token issuance.
    #[serde(rename = "iat", with = "serde_timestamp")]
    pub issued_at: DateTime<Utc>,

    /// Principal that issued the token.
    #[serde(rename = "iss")]
    pub issuer: String,

    /// Minimum date at which the token is valid.
    #[serde(rename = "nbf", with = "serde_timestamp")]
    pub not_before: DateTime<Utc>,

    /// Principal that is the subject of the token.
    #[serde(rename = "sub")]
    pub subject: String,
}

impl Claims {
    /// Compares two claims sets field by field, reporting the first differing claim.
    ///
    /// This is a round-trip testing aid. Unlike the checks in
    /// [`Jwt::validate_claims()`](crate::Jwt::validate_claims), the comparison is not
    /// constant-time and must not be used to validate untrusted input against
    /// trusted values.
    pub fn compare(&self, other: &Self) -> Result<(), CompareError> {
        if self.audience != other.audience {
            return Err(CompareError::Claim(Claim::Audience));
        }
        if self.expires_at != other.expires_at {
            return Err(CompareError::Claim(Claim::Expiration));
        }
        if self.id != other.id {
            return Err(CompareError::Claim(Claim::Id));
        }
        if self.issued_at != other.issued_at {
            return Err(CompareError::Claim(Claim::IssuedAt));
        }
        if self.issuer != other.issuer {
            return Err(CompareError::Claim(Claim::Issuer));
        }
        if self.not_before != other.not_before {
            return Err(CompareError::Claim(Claim::NotBefore));
        }
        if self.subject != other.subject {
            return Err(CompareError::Claim(Claim::Subject));
        }
        Ok(())
    }
}

mod serde_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{
        de::{Error as DeError, Visitor},
        Deserializer, Serializer,
    };

    use core::fmt;

    struct TimestampVisitor;

    impl Visitor<'_> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("UTC timestamp in whole seconds")
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            DateTime::from_timestamp(value, 0)
                .ok_or_else(|| E::custom("timestamp out of representable range"))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: DeError,
        {
            let value = i64::try_from(value).map_err(DeError::custom)?;
            self.visit_i64(value)
        }
    }

    pub fn serialize<S: Serializer>(
        time: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(time.timestamp())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        deserializer.deserialize_i64(TimestampVisitor)
    }
}
