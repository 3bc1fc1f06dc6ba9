use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Payments webhook
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Settings for the payment processor's server-to-server callback.
/// The merchant key and salt feed the processor's SHA-512 hash chain;
/// both are read from the environment once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default = "d_merchant_key_env")]
    pub merchant_key_env: String,
    #[serde(default = "d_merchant_salt_env")]
    pub merchant_salt_env: String,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            merchant_key_env: d_merchant_key_env(),
            merchant_salt_env: d_merchant_salt_env(),
        }
    }
}

fn d_merchant_key_env() -> String {
    "CLIPFLOW_PAYMENT_KEY".into()
}

fn d_merchant_salt_env() -> String {
    "CLIPFLOW_PAYMENT_SALT".into()
}
