//! Gateway Configuration

/// Default storefront payment API
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000/api/v1/payment";

/// Stripe REST API root
pub const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Where the gateways send their requests
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Base URL of the payment API (`.../payment-intent`, `.../save-payment`)
    pub backend_url: String,

    /// Stripe publishable key (`pk_...`)
    pub publishable_key: Option<String>,

    /// Stripe API root, overridable for tests
    pub stripe_api_base: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            publishable_key: None,
            stripe_api_base: STRIPE_API_BASE.into(),
        }
    }
}

impl RuntimeConfig {
    /// Read `STOREFRONT_BACKEND_URL` and `STRIPE_PUBLISHABLE_KEY`
    pub fn from_env() -> Self {
        let backend_url = std::env::var("STOREFRONT_BACKEND_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.into());
        let publishable_key = std::env::var("STRIPE_PUBLISHABLE_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Self {
            backend_url,
            publishable_key,
            ..Default::default()
        }
    }

    /// Build from compile-time values, for targets without an environment
    pub fn from_parts(backend_url: Option<&str>, publishable_key: Option<&str>) -> Self {
        Self {
            backend_url: backend_url
                .filter(|url| !url.is_empty())
                .unwrap_or(DEFAULT_BACKEND_URL)
                .into(),
            publishable_key: publishable_key.filter(|key| !key.is_empty()).map(Into::into),
            ..Default::default()
        }
    }
}
