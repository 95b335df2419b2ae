//! Manually recorded purchases.

use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Stripe-specific purchase data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StripeStoreData {
    /// Stripe subscription id (`sub_...`).
    pub subscription_id: String,
    /// Qonversion product id the subscription maps to.
    pub product_id: ProductId,
}

/// A purchase recorded on behalf of a user.
///
/// Write-only: the API offers no endpoint to read purchases back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// Price as a decimal string, for example `"9.99"`.
    pub price: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Store data for Stripe purchases.
    pub stripe_store_data: StripeStoreData,
}

impl Purchase {
    /// Create a Stripe purchase.
    #[must_use]
    pub fn stripe(
        price: impl Into<String>,
        currency: impl Into<String>,
        subscription_id: impl Into<String>,
        product_id: impl Into<ProductId>,
    ) -> Self {
        Self {
            price: price.into(),
            currency: currency.into(),
            stripe_store_data: StripeStoreData {
                subscription_id: subscription_id.into(),
                product_id: product_id.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_stripe_store_data() {
        let purchase = Purchase::stripe("9.99", "USD", "sub_123", "monthly");
        let value = serde_json::to_value(&purchase).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "price": "9.99",
                "currency": "USD",
                "stripe_store_data": {
                    "subscription_id": "sub_123",
                    "product_id": "monthly"
                }
            })
        );
    }
}
