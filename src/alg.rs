//! MAC algorithms based on HMACs, and the symmetric key they share.

use std::borrow::Cow;

use core::fmt;

use hmac::{Hmac, Mac};
use rand_core::{CryptoRng, RngCore};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Symmetric key shared between token issuance and verification. Zeroed on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SigningKey(Vec<u8>);

impl fmt::Debug for SigningKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("SigningKey").field(&"_").finish()
    }
}

impl SigningKey {
    /// Creates a key from the specified `bytes`.
    pub fn new(bytes: impl AsRef<[u8]>) -> Self {
        Self(bytes.as_ref().to_vec())
    }

    /// Generates a random 64-byte key using a cryptographically secure RNG.
    ///
    /// 64 bytes is the SHA-256 block size; HMAC keys at least as long as the block
    /// provide the full strength of the underlying hash.
    pub fn generate<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut key = Self(vec![0; 64]);
        rng.fill_bytes(&mut key.0);
        key
    }
}

impl From<&[u8]> for SigningKey {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl AsRef<[u8]> for SigningKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// MAC algorithm securing token integrity.
///
/// A [`Jwt`](crate::Jwt) context is parameterized by exactly one algorithm, fixed at
/// construction; there is no algorithm negotiation. Verification is not a separate
/// primitive: the token pipeline re-signs the received signing input and compares the
/// result to the received signature in constant time.
pub trait Algorithm {
    /// Returns the name of this algorithm, as recorded in the `alg` field of
    /// the token header.
    fn name(&self) -> Cow<'static, str>;

    /// Computes the MAC of `message` with the specified `key`.
    ///
    /// The output is deterministic: the same message, key and algorithm always
    /// produce the same MAC.
    fn sign(&self, key: &SigningKey, message: &[u8]) -> Vec<u8>;
}

macro_rules! define_hmac_alg {
    (
        $(#[$($attr:meta)+])*
        struct $name:ident<$digest:ident>($alg_name:tt);
    ) => {
        $(#[$($attr)+])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Algorithm for $name {
            fn name(&self) -> Cow<'static, str> {
                Cow::Borrowed($alg_name)
            }

            fn sign(&self, key: &SigningKey, message: &[u8]) -> Vec<u8> {
                let mut hmac = Hmac::<$digest>::new_from_slice(key.as_ref())
                    .expect("HMACs work with any key size");
                hmac.update(message);
                hmac.finalize().into_bytes().to_vec()
            }
        }
    };
}

define_hmac_alg!(
    /// `HS256` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs256<Sha256>("HS256");
);
define_hmac_alg!(
    /// `HS384` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs384<Sha384>("HS384");
);
define_hmac_alg!(
    /// `HS512` signing algorithm.
    ///
    /// See [RFC 7518] for the algorithm specification.
    ///
    /// [RFC 7518]: https://tools.ietf.org/html/rfc7518#section-3.2
    struct Hs512<Sha512>("HS512");
);
