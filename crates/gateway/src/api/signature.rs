//! Payment-webhook signature verification.
//!
//! The processor signs its server-to-server callback with a SHA-512
//! hash chain: the pipe-joined reverse of the request fields, salted
//! with the merchant salt. Verification recomputes the chain and
//! compares it to the `hash` field in constant time. The result is a
//! plain bool — the webhook handler decides the trust outcome.

use std::collections::HashMap;

use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;

/// Recompute the processor's response hash for a callback payload.
///
/// Chain layout (reverse of the initiation hash, with `status`
/// inserted and the five unused udf slots left empty):
/// `salt|status||||||udf5|udf4|udf3|udf2|udf1|email|firstname|productinfo|amount|txnid|key`
pub fn response_hash(params: &HashMap<String, String>, salt: &str) -> String {
    let field = |key: &str| params.get(key).map(String::as_str).unwrap_or("");

    let chain = [
        salt,
        field("status"),
        "",
        "",
        "",
        "",
        "",
        field("udf5"),
        field("udf4"),
        field("udf3"),
        field("udf2"),
        field("udf1"),
        field("email"),
        field("firstname"),
        field("productinfo"),
        field("amount"),
        field("txnid"),
        field("key"),
    ]
    .join("|");

    hex::encode(Sha512::digest(chain.as_bytes()))
}

/// Whether the callback's `hash` field matches the recomputed chain.
/// Comparison is constant-time; a missing `hash` field never matches.
pub fn verify_signature(params: &HashMap<String, String>, salt: &str) -> bool {
    let Some(provided) = params.get("hash") else {
        return false;
    };
    let expected = response_hash(params, salt);
    expected
        .as_bytes()
        .ct_eq(provided.to_ascii_lowercase().as_bytes())
        .into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    fn callback() -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("key".into(), "merchant-key".into());
        params.insert("txnid".into(), "txn-42".into());
        params.insert("amount".into(), "499.00".into());
        params.insert("productinfo".into(), "clipflow credits".into());
        params.insert("firstname".into(), "Asha".into());
        params.insert("email".into(), "asha@example.com".into());
        params.insert("status".into(), "success".into());
        params
    }

    #[test]
    fn valid_signature_verifies() {
        let mut params = callback();
        let hash = response_hash(&params, "s4lt");
        params.insert("hash".into(), hash);
        assert!(verify_signature(&params, "s4lt"));
    }

    #[test]
    fn uppercase_hash_verifies() {
        // Some processors send the digest uppercased.
        let mut params = callback();
        let hash = response_hash(&params, "s4lt").to_ascii_uppercase();
        params.insert("hash".into(), hash);
        assert!(verify_signature(&params, "s4lt"));
    }

    #[test]
    fn tampered_amount_fails() {
        let mut params = callback();
        let hash = response_hash(&params, "s4lt");
        params.insert("hash".into(), hash);
        params.insert("amount".into(), "1.00".into());
        assert!(!verify_signature(&params, "s4lt"));
    }

    #[test]
    fn wrong_salt_fails() {
        let mut params = callback();
        let hash = response_hash(&params, "s4lt");
        params.insert("hash".into(), hash);
        assert!(!verify_signature(&params, "other-salt"));
    }

    #[test]
    fn missing_hash_field_fails() {
        assert!(!verify_signature(&callback(), "s4lt"));
    }

    #[test]
    fn udf_fields_participate_in_the_chain() {
        let mut params = callback();
        params.insert("udf1".into(), "order-7".into());
        let with_udf = response_hash(&params, "s4lt");
        params.remove("udf1");
        let without_udf = response_hash(&params, "s4lt");
        assert_ne!(with_udf, without_udf);
    }
}
