//! Compact [JSON web token (JWT)][JWT] issuing and verification for a single trust
//! domain.
//!
//! The crate targets the common setup where one service both mints and later validates
//! its own tokens using a shared symmetric key. It deliberately covers a narrow slice
//! of the JWT landscape:
//!
//! - A fixed set of registered claims (`aud`, `exp`, `jti`, `iat`, `iss`, `nbf`,
//!   `sub`), all mandatory and strongly typed; no custom claim extensions.
//! - HMAC-based signing only: [`Hs256`] by default, [`Hs384`] / [`Hs512`] via
//!   [`Jwt::with_algorithm()`]. Asymmetric algorithms, key rotation and revocation
//!   are out of scope.
//! - All configuration lives in an immutable [`Jwt`] context constructed once at
//!   startup. Every operation is a pure function of its inputs plus the context, so
//!   the context can be shared freely across threads.
//!
//! The token header records the signing algorithm, but the recorded value is only ever
//! compared against the algorithm the context was configured with; a mismatch is
//! rejected before any MAC computation. This eliminates the possibility of
//! [algorithm switching attacks][switching].
//!
//! Claim values and MACs of incoming tokens are compared against trusted values in
//! constant time (via the [`subtle`] crate); parsing either returns a fully verified
//! [`Token`] or the first failing check as a [`ValidationError`].
//!
//! [JWT]: https://jwt.io/
//! [switching]: https://auth0.com/blog/critical-vulnerabilities-in-json-web-token-libraries/
//! [`subtle`]: https://docs.rs/subtle/
//!
//! # Examples
//!
//! Basic token lifecycle:
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use jwt_mint::Jwt;
//!
//! use std::sync::{
//!     atomic::{AtomicI64, Ordering},
//!     Arc,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! // In production, `Jwt::new` uses the system clock. Injecting a clock makes
//! // timestamps deterministic for this example.
//! let base = 1_600_000_000;
//! let offset = Arc::new(AtomicI64::new(0));
//! let clock = {
//!     let offset = Arc::clone(&offset);
//!     move || DateTime::from_timestamp(base + offset.load(Ordering::Relaxed), 0).unwrap()
//! };
//! let jwt = Jwt::new("TestAudience", "TestIssuer", "TestSubject", b"TestKey")
//!     .with_clock(clock);
//!
//! // Mint a token valid for 30 seconds.
//! let token = jwt.new_token("tokenID", 30);
//! let token_string = jwt.signed_string(&token)?;
//!
//! // A token becomes valid strictly after its issuance second.
//! offset.store(1, Ordering::Relaxed);
//! let parsed = jwt.parse_string(&token_string)?;
//! assert_eq!(parsed.claims().id, "tokenID");
//! assert_eq!(parsed.claims().audience, "TestAudience");
//! token.compare(&parsed)?;
//!
//! // Once the TTL has elapsed, the same string is rejected.
//! offset.store(31, Ordering::Relaxed);
//! assert!(jwt.parse_string(&token_string).is_err());
//! # Ok(())
//! # }
//! ```

#![warn(missing_debug_implementations, missing_docs, bare_trait_objects)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]

mod alg;
mod claims;
mod error;
mod jwt;
mod token;

pub use crate::{
    alg::{Algorithm, Hs256, Hs384, Hs512, SigningKey},
    claims::Claims,
    error::{Claim, CompareError, CreationError, ValidationError},
    jwt::Jwt,
    token::{Header, Token, TOKEN_TYPE},
};
