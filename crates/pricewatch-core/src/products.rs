use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A catalog item ready for price-shopping, reduced to a canonical shape
/// independent of the supplier file format it was imported from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedProduct {
    /// Supplier-side product identifier, stored as a string to avoid
    /// precision loss across heterogeneous supplier feeds.
    pub supplier_product_id: String,
    pub brand: String,
    pub product_name: String,
    /// Variant size as printed in the supplier feed, e.g. `"100ml"`.
    pub variant_size: String,
    /// European Article Number. When present, digit-only.
    pub ean: Option<String>,
    /// Wholesale purchase price. Exact decimal, never floating point.
    pub wholesale_price: Decimal,
    /// ISO 4217 currency code (e.g., `"EUR"`).
    pub currency: String,
    /// Units per wholesale pack.
    pub pack_size: u32,
    pub supplier_name: String,
    pub last_purchase_price: Option<Decimal>,
    pub is_available: bool,
}

impl NormalizedProduct {
    /// Checks the type invariants: non-negative wholesale price and a
    /// digit-only EAN when one is present.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NegativeWholesalePrice`] or
    /// [`CoreError::MalformedEan`] on the first violated invariant.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.wholesale_price < Decimal::ZERO {
            return Err(CoreError::NegativeWholesalePrice {
                supplier_product_id: self.supplier_product_id.clone(),
                price: self.wholesale_price.to_string(),
            });
        }

        if let Some(ean) = &self.ean {
            if ean.is_empty() || !ean.chars().all(|c| c.is_ascii_digit()) {
                return Err(CoreError::MalformedEan {
                    supplier_product_id: self.supplier_product_id.clone(),
                    ean: ean.clone(),
                });
            }
        }

        Ok(())
    }

    /// Returns a display label combining brand and product name.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.product_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_product() -> NormalizedProduct {
        NormalizedProduct {
            supplier_product_id: "SUP-001".to_string(),
            brand: "Chanel".to_string(),
            product_name: "N°5 Eau de Parfum".to_string(),
            variant_size: "100ml".to_string(),
            ean: Some("8901030865736".to_string()),
            wholesale_price: dec!(54.90),
            currency: "EUR".to_string(),
            pack_size: 1,
            supplier_name: "Parfum Grosshandel GmbH".to_string(),
            last_purchase_price: None,
            is_available: true,
        }
    }

    #[test]
    fn validate_accepts_well_formed_product() {
        assert!(make_product().validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_wholesale_price() {
        let mut product = make_product();
        product.wholesale_price = dec!(-0.01);
        let err = product.validate().unwrap_err();
        assert!(matches!(err, CoreError::NegativeWholesalePrice { .. }));
    }

    #[test]
    fn validate_accepts_zero_wholesale_price() {
        let mut product = make_product();
        product.wholesale_price = Decimal::ZERO;
        assert!(product.validate().is_ok());
    }

    #[test]
    fn validate_rejects_ean_with_letters() {
        let mut product = make_product();
        product.ean = Some("89010A0865736".to_string());
        let err = product.validate().unwrap_err();
        assert!(matches!(err, CoreError::MalformedEan { .. }));
    }

    #[test]
    fn validate_rejects_empty_ean() {
        let mut product = make_product();
        product.ean = Some(String::new());
        assert!(product.validate().is_err());
    }

    #[test]
    fn validate_accepts_absent_ean() {
        let mut product = make_product();
        product.ean = None;
        assert!(product.validate().is_ok());
    }

    #[test]
    fn display_name_joins_brand_and_name() {
        assert_eq!(make_product().display_name(), "Chanel N°5 Eau de Parfum");
    }

    #[test]
    fn serde_roundtrip() {
        let product = make_product();
        let json = serde_json::to_string(&product).expect("serialization failed");
        let decoded: NormalizedProduct =
            serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded.supplier_product_id, product.supplier_product_id);
        assert_eq!(decoded.wholesale_price, product.wholesale_price);
        assert_eq!(decoded.ean, product.ean);
    }
}
