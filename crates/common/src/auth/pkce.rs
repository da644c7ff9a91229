//! PKCE (Proof Key for Code Exchange) for the provider login flow
//!
//! Implements the S256 method of RFC 7636. The verifier stays in memory for
//! the duration of one login attempt; only the challenge leaves the device
//! before the session-token exchange.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use inkstat_domain::CodeVerifier;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a verifier or state value.
pub const RANDOM_BYTES: usize = 32;

fn random_token() -> String {
    let mut bytes = [0u8; RANDOM_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a cryptographically secure code verifier
///
/// 32 random bytes encoded as unpadded base64url (43 characters).
pub fn generate_code_verifier() -> CodeVerifier {
    CodeVerifier::new(random_token())
}

/// Derive the code challenge: `BASE64URL(SHA256(ASCII(verifier)))`
pub fn generate_code_challenge(verifier: &CodeVerifier) -> String {
    let hash = Sha256::digest(verifier.as_str().as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state token sent alongside the authorization request
pub fn generate_state() -> String {
    random_token()
}

/// Verifier, challenge and state for a single login attempt.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// Kept secret until the session-token exchange
    pub code_verifier: CodeVerifier,

    /// Sent in the authorization request
    pub code_challenge: String,

    pub state: String,
}

impl PkceChallenge {
    /// Generate a fresh challenge.
    ///
    /// # Examples
    /// ```
    /// use inkstat_common::auth::pkce::PkceChallenge;
    ///
    /// let challenge = PkceChallenge::generate();
    /// assert_eq!(challenge.code_verifier.as_str().len(), 43);
    /// assert_eq!(challenge.challenge_method(), "S256");
    /// ```
    pub fn generate() -> Self {
        let code_verifier = generate_code_verifier();
        let code_challenge = generate_code_challenge(&code_verifier);
        let state = generate_state();

        Self { code_verifier, code_challenge, state }
    }

    /// Get the challenge method (always "S256" for SHA256)
    #[must_use]
    pub fn challenge_method(&self) -> &'static str {
        "S256"
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::pkce.
    use super::*;

    /// Validates that a verifier is 32 random bytes before encoding.
    ///
    /// Assertions:
    /// - Decoding the verifier yields exactly 32 bytes.
    /// - The encoded form is 43 characters without padding.
    #[test]
    fn test_verifier_is_32_bytes() {
        let verifier = generate_code_verifier();
        let decoded = URL_SAFE_NO_PAD.decode(verifier.as_str()).unwrap();
        assert_eq!(decoded.len(), RANDOM_BYTES);
        assert_eq!(verifier.as_str().len(), 43);
        assert!(!verifier.as_str().contains('='));
    }

    /// Validates `PkceChallenge::generate` for the unique challenges scenario.
    ///
    /// Assertions:
    /// - Confirms consecutive verifiers, challenges and states all differ.
    #[test]
    fn test_unique_challenges() {
        let first = PkceChallenge::generate();
        let second = PkceChallenge::generate();

        assert_ne!(first.code_verifier, second.code_verifier);
        assert_ne!(first.code_challenge, second.code_challenge);
        assert_ne!(first.state, second.state);
    }

    /// Validates the RFC 7636 appendix B test vector.
    ///
    /// Assertions:
    /// - Confirms the derived challenge equals the published value.
    #[test]
    fn test_rfc7636_vector() {
        let verifier = CodeVerifier::new("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk");
        assert_eq!(
            generate_code_challenge(&verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_code_challenge_deterministic() {
        let challenge = PkceChallenge::generate();
        assert_eq!(challenge.code_challenge, generate_code_challenge(&challenge.code_verifier));
        assert!(!challenge.code_challenge.contains('+'));
        assert!(!challenge.code_challenge.contains('/'));
    }
}
