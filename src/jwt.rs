//! Issuer context shared by all signing and parsing operations.

use chrono::{DateTime, Utc};
use subtle::ConstantTimeEq;

use core::fmt;

use crate::{
    alg::{Algorithm, Hs256, SigningKey},
    claims::Claims,
    error::ValidationError,
};

/// Issuing and verifying context for a single trust domain.
///
/// A `Jwt` value holds everything needed to mint and validate tokens: the expected
/// `aud` / `iss` / `sub` claim values, the signing algorithm, the shared symmetric key
/// and the time source. It is constructed once at process startup and never mutated
/// afterwards; every operation is a pure function of its inputs plus this context, so
/// the value can be shared freely across threads.
///
/// The algorithm and the clock are type parameters with sensible defaults ([`Hs256`]
/// and [`Utc::now`]). Both can be swapped with the `with_*` methods, which makes the
/// clock trivially mockable for deterministic tests.
pub struct Jwt<A = Hs256, F = fn() -> DateTime<Utc>> {
    audience: String,
    issuer: String,
    subject: String,
    algorithm: A,
    key: SigningKey,
    clock_fn: F,
}

impl<A: fmt::Debug, F> fmt::Debug for Jwt<A, F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Jwt")
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("subject", &self.subject)
            .field("algorithm", &self.algorithm)
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl Jwt {
    /// Creates a context with the [`Hs256`] algorithm and the system clock.
    pub fn new(
        audience: impl Into<String>,
        issuer: impl Into<String>,
        subject: impl Into<String>,
        key: impl AsRef<[u8]>,
    ) -> Self {
        Self {
            audience: audience.into(),
            issuer: issuer.into(),
            subject: subject.into(),
            algorithm: Hs256,
            key: SigningKey::new(key),
            clock_fn: Utc::now,
        }
    }
}

impl<A: Algorithm, F: Fn() -> DateTime<Utc>> Jwt<A, F> {
    /// Replaces the signing algorithm.
    #[must_use]
    pub fn with_algorithm<B: Algorithm>(self, algorithm: B) -> Jwt<B, F> {
        Jwt {
            audience: self.audience,
            issuer: self.issuer,
            subject: self.subject,
            algorithm,
            key: self.key,
            clock_fn: self.clock_fn,
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub fn with_clock<G: Fn() -> DateTime<Utc>>(self, clock_fn: G) -> Jwt<A, G> {
        Jwt {
            audience: self.audience,
            issuer: self.issuer,
            subject: self.subject,
            algorithm: self.algorithm,
            key: self.key,
            clock_fn,
        }
    }

    /// Gets the trusted audience.
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Gets the trusted issuer.
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Gets the trusted subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Gets the configured signing algorithm.
    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    pub(crate) fn key(&self) -> &SigningKey {
        &self.key
    }

    /// Reads the clock, truncated to whole seconds. The wire format has second
    /// resolution, so sub-second precision would make round-trips lossy and
    /// boundary comparisons inconsistent.
    pub(crate) fn now(&self) -> DateTime<Utc> {
        let now = (self.clock_fn)();
        DateTime::from_timestamp(now.timestamp(), 0)
            .expect("clock timestamps are always representable")
    }

    /// Creates a claims set for a fresh token.
    ///
    /// `issued_at` and `not_before` are set to the current time and `expires_at` to
    /// the current time plus `ttl_seconds`; audience, issuer and subject are copied
    /// from this context. The TTL is not validated: a zero or negative offset
    /// produces an already-expired claims set, which is the caller's responsibility.
    pub fn new_claims(&self, id: impl Into<String>, ttl_seconds: i64) -> Claims {
        let now = self.now();
        // Extreme TTLs saturate at the edge of the representable timestamp range.
        let expires_at = now.timestamp().saturating_add(ttl_seconds);
        let expires_at = DateTime::from_timestamp(expires_at, 0).unwrap_or(if ttl_seconds >= 0 {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        });

        Claims {
            audience: self.audience.clone(),
            expires_at,
            id: id.into(),
            issued_at: now,
            issuer: self.issuer.clone(),
            not_before: now,
            subject: self.subject.clone(),
        }
    }

    /// Validates an incoming claims set against the trusted context values and
    /// the current time.
    ///
    /// Checks are applied in a fixed order (audience, expiry, issued-at, issuer,
    /// not-before, subject) and the first violated rule is reported; failures are
    /// never aggregated. String claims are compared in constant time: in adversarial
    /// settings the trusted side of the comparison acts as a secret, and early-exit
    /// equality would leak its bytes through timing.
    ///
    /// Time comparisons are strict: a token is rejected once `now >= expires_at` and
    /// accepted only once `now > issued_at` and `now > not_before`.
    pub fn validate_claims(&self, claims: &Claims) -> Result<(), ValidationError> {
        let now = self.now();
        if !ct_str_eq(&claims.audience, &self.audience) {
            return Err(ValidationError::InvalidAudience);
        }
        if now >= claims.expires_at {
            return Err(ValidationError::Expired);
        }
        if now <= claims.issued_at {
            return Err(ValidationError::UsedBeforeIssued);
        }
        if !ct_str_eq(&claims.issuer, &self.issuer) {
            return Err(ValidationError::InvalidIssuer);
        }
        if now <= claims.not_before {
            return Err(ValidationError::NotValidYet);
        }
        if !ct_str_eq(&claims.subject, &self.subject) {
            return Err(ValidationError::InvalidSubject);
        }
        Ok(())
    }
}

fn ct_str_eq(lhs: &str, rhs: &str) -> bool {
    lhs.as_bytes().ct_eq(rhs.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const NOW: i64 = 1_600_000_000;

    fn at(ts: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(ts, 0).unwrap()
    }

    fn context() -> Jwt<Hs256, impl Fn() -> DateTime<Utc>> {
        Jwt::new("TestAudience", "TestIssuer", "TestSubject", b"TestKey")
            .with_clock(|| at(NOW))
    }

    fn valid_claims() -> Claims {
        Claims {
            audience: "TestAudience".to_owned(),
            expires_at: at(NOW + 30),
            id: "tokenID".to_owned(),
            issued_at: at(NOW - 10),
            issuer: "TestIssuer".to_owned(),
            not_before: at(NOW - 10),
            subject: "TestSubject".to_owned(),
        }
    }

    #[test]
    fn new_claims_are_bound_to_the_context() {
        let jwt = context();
        let claims = jwt.new_claims("tokenID", 30);

        assert_eq!(claims.audience, "TestAudience");
        assert_eq!(claims.issuer, "TestIssuer");
        assert_eq!(claims.subject, "TestSubject");
        assert_eq!(claims.id, "tokenID");
        assert_eq!(claims.issued_at, at(NOW));
        assert_eq!(claims.not_before, at(NOW));
        assert_eq!(claims.expires_at, at(NOW + 30));
    }

    #[test]
    fn negative_ttl_produces_expired_claims() {
        let jwt = context();
        let claims = jwt.new_claims("tokenID", -5);
        assert_eq!(claims.expires_at, at(NOW - 5));
        assert_matches!(
            jwt.validate_claims(&claims).unwrap_err(),
            ValidationError::Expired
        );
    }

    #[test]
    fn valid_claims_pass_validation() {
        context().validate_claims(&valid_claims()).unwrap();
    }

    #[test]
    fn audience_mismatch() {
        let mut claims = valid_claims();
        claims.audience = "OtherAudience".to_owned();
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::InvalidAudience
        );
    }

    #[test]
    fn issuer_mismatch() {
        let mut claims = valid_claims();
        claims.issuer = "OtherIssuer".to_owned();
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::InvalidIssuer
        );
    }

    #[test]
    fn subject_mismatch() {
        let mut claims = valid_claims();
        claims.subject = "OtherSubject".to_owned();
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::InvalidSubject
        );
    }

    #[test]
    fn expiry_boundary() {
        let mut claims = valid_claims();
        claims.expires_at = at(NOW);
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::Expired
        );

        claims.expires_at = at(NOW + 1);
        context().validate_claims(&claims).unwrap();
    }

    #[test]
    fn issued_at_boundary() {
        let mut claims = valid_claims();
        claims.issued_at = at(NOW);
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::UsedBeforeIssued
        );

        claims.issued_at = at(NOW - 1);
        context().validate_claims(&claims).unwrap();
    }

    #[test]
    fn not_before_boundary() {
        let mut claims = valid_claims();
        claims.not_before = at(NOW);
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::NotValidYet
        );

        claims.not_before = at(NOW - 1);
        context().validate_claims(&claims).unwrap();
    }

    #[test]
    fn first_failing_check_wins() {
        // Both the audience and the expiry are wrong; the audience check runs first.
        let mut claims = valid_claims();
        claims.audience = "OtherAudience".to_owned();
        claims.expires_at = at(NOW - 10);
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::InvalidAudience
        );

        // Expiry is checked before the issuer.
        let mut claims = valid_claims();
        claims.expires_at = at(NOW - 10);
        claims.issuer = "OtherIssuer".to_owned();
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::Expired
        );

        // Issuer is checked before the not-before rule.
        let mut claims = valid_claims();
        claims.issuer = "OtherIssuer".to_owned();
        claims.not_before = at(NOW + 100);
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::InvalidIssuer
        );

        // Not-before is checked before the subject.
        let mut claims = valid_claims();
        claims.not_before = at(NOW + 100);
        claims.subject = "OtherSubject".to_owned();
        assert_matches!(
            context().validate_claims(&claims).unwrap_err(),
            ValidationError::NotValidYet
        );
    }

    #[test]
    fn sub_second_clock_readings_are_truncated() {
        let jwt = Jwt::new("TestAudience", "TestIssuer", "TestSubject", b"TestKey")
            .with_clock(|| at(NOW) + chrono::Duration::milliseconds(750));
        let claims = jwt.new_claims("tokenID", 30);
        assert_eq!(claims.issued_at, at(NOW));
        assert_eq!(claims.expires_at, at(NOW + 30));
    }

    #[test]
    fn extreme_ttl_saturates() {
        let jwt = context();
        let claims = jwt.new_claims("tokenID", i64::MAX);
        assert_eq!(claims.expires_at, DateTime::<Utc>::MAX_UTC);
    }
}
