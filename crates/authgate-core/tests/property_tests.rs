//! Property-based tests for authgate-core
//!
//! Exercises the hasher and token round trips through the public API.

use authgate_core::{
    extract_bearer_token, AuthError, CredentialHasher, SecretKey, TokenIssuer, TokenVerifier,
};
use proptest::prelude::*;

const SECRET: &str = "property-test-secret-key-0123456789";

fn hasher() -> CredentialHasher {
    CredentialHasher::new(1024, 1, 1).unwrap()
}

fn issuer() -> TokenIssuer {
    TokenIssuer::new(SecretKey::new(SECRET))
}

fn verifier() -> TokenVerifier {
    TokenVerifier::new(SecretKey::new(SECRET))
}

/// Printable ASCII passwords
fn password() -> impl Strategy<Value = String> {
    "[ -~]{1,32}"
}

/// Usernames including non-ASCII characters
fn username() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_.@\\-é]{1,24}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // ============================================================
    // Password Hasher
    // ============================================================

    #[test]
    fn hash_verifies_only_its_own_password(p in password(), p2 in password()) {
        prop_assume!(p != p2);
        let hasher = hasher();
        let digest = hasher.hash(&p).unwrap();

        prop_assert!(hasher.verify(&digest, &p));
        prop_assert!(!hasher.verify(&digest, &p2));
    }

    #[test]
    fn hashes_are_salted(p in password()) {
        let hasher = hasher();
        let first = hasher.hash(&p).unwrap();
        let second = hasher.hash(&p).unwrap();

        prop_assert_ne!(&first, &second);
        prop_assert!(hasher.verify(&first, &p));
        prop_assert!(hasher.verify(&second, &p));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // ============================================================
    // Token Issuer / Verifier
    // ============================================================

    #[test]
    fn issued_tokens_verify_with_same_claims(u in username(), r in "[a-z]{1,12}") {
        let token = issuer().issue(&u, &r).unwrap();
        let claims = verifier().verify(&token).unwrap();

        prop_assert_eq!(claims.username, u);
        prop_assert_eq!(claims.role, r);
    }

    #[test]
    fn tokens_from_another_secret_are_rejected(u in username(), other in "[a-z0-9]{1,40}") {
        prop_assume!(other != SECRET);
        let foreign = TokenIssuer::new(SecretKey::new(other)).issue(&u, "user").unwrap();

        prop_assert!(matches!(verifier().verify(&foreign), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn any_single_character_change_is_rejected(u in username(), idx in any::<prop::sample::Index>(), replacement in "[A-Za-z0-9_\\-]") {
        let token = issuer().issue(&u, "user").unwrap();
        let positions: Vec<usize> = token
            .char_indices()
            .filter(|(_, c)| *c != '.')
            .map(|(i, _)| i)
            .collect();
        let at = positions[idx.index(positions.len())];

        let original = &token[at..at + 1];
        prop_assume!(original != replacement);

        let mut tampered = token.clone();
        tampered.replace_range(at..at + 1, &replacement);

        prop_assert!(matches!(verifier().verify(&tampered), Err(AuthError::Unauthorized)));
    }

    #[test]
    fn arbitrary_strings_never_verify(garbage in ".{0,200}") {
        prop_assert!(matches!(verifier().verify(&garbage), Err(AuthError::Unauthorized)));
    }

    // ============================================================
    // Bearer extraction
    // ============================================================

    #[test]
    fn bearer_prefix_is_required(value in "[^B].{0,40}") {
        prop_assert_eq!(extract_bearer_token(Some(&value)), None);
    }

    #[test]
    fn bearer_token_is_returned_verbatim(token in "[A-Za-z0-9._\\-]{1,80}") {
        let header = format!("Bearer {}", token);
        prop_assert_eq!(extract_bearer_token(Some(&header)), Some(token.as_str()));
    }
}
