//! PKCE (Proof Key for Code Exchange) for the loopback authorization flow
//!
//! Implements RFC 7636 with the S256 method. The installed-app flow pairs
//! this with a random `state` value that the callback must echo back.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

const RANDOM_BYTES: usize = 32;

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a code verifier: 32 random bytes as unpadded base64url (43 chars,
/// inside the 43-128 range RFC 7636 requires).
#[must_use]
pub fn generate_code_verifier() -> String {
    random_token()
}

/// BASE64URL(SHA256(ASCII(code_verifier)))
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Random CSRF token for the `state` parameter
#[must_use]
pub fn generate_state() -> String {
    random_token()
}

/// Compare the expected and received `state` without short-circuiting on the
/// first differing byte.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (expected, actual) = (expected.as_bytes(), actual.as_bytes());
    if expected.len() != actual.len() {
        return false;
    }
    expected.iter().zip(actual).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

/// PKCE verifier/challenge pair plus the CSRF state of one authorization
/// attempt.
#[derive(Debug, Clone)]
pub struct PKCEChallenge {
    /// Kept secret until the token exchange
    pub code_verifier: String,

    /// Sent in the authorization request
    pub code_challenge: String,

    /// Must match between authorization request and callback
    pub state: String,
}

impl PKCEChallenge {
    #[must_use]
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        Self { code_verifier, code_challenge, state: generate_state() }
    }

    /// Always "S256"
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verifier_length_is_within_rfc_bounds() {
        let challenge = PKCEChallenge::generate();
        assert!((43..=128).contains(&challenge.code_verifier.len()));
        assert!(!challenge.code_challenge.is_empty());
        assert!(!challenge.state.is_empty());
        assert_eq!(challenge.challenge_method(), "S256");
    }

    #[test]
    fn challenges_are_unique() {
        let first = PKCEChallenge::generate();
        let second = PKCEChallenge::generate();

        assert_ne!(first.code_verifier, second.code_verifier);
        assert_ne!(first.state, second.state);
    }

    #[test]
    fn values_are_unpadded_base64url() {
        let challenge = PKCEChallenge::generate();
        for value in [&challenge.code_verifier, &challenge.code_challenge, &challenge.state] {
            assert!(!value.contains('='));
            assert!(!value.contains('+'));
            assert!(!value.contains('/'));
        }
    }

    #[test]
    fn challenge_matches_rfc_7636_appendix_b() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            generate_code_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn state_validation() {
        assert!(validate_state("abc", "abc"));
        assert!(!validate_state("abc", "abd"));
        assert!(!validate_state("abc", "abcd"));
    }
}
