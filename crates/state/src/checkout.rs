//! Order summary shown on the checkout page.
//!
//! Delivery is free at or above a threshold and a flat fee below it. Coupon
//! discounts are priced elsewhere; the code is only carried through.

use rust_decimal::Decimal;
use serde::Serialize;

use doko_core::{CouponCode, Price};

use crate::cart::CartState;

/// Delivery pricing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShippingPolicy {
    /// Subtotal at or above which delivery is free.
    pub free_threshold: Decimal,
    /// Fee charged below the threshold.
    pub flat_fee: Decimal,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Decimal::from(5000),
            flat_fee: Decimal::from(150),
        }
    }
}

impl ShippingPolicy {
    /// Delivery fee for a given subtotal.
    #[must_use]
    pub fn fee_for(&self, subtotal: &Price, item_count: u64) -> Price {
        if item_count == 0 || subtotal.amount() >= self.free_threshold {
            return Price::zero(subtotal.currency_code());
        }
        Price::new(self.flat_fee, subtotal.currency_code())
            .unwrap_or_else(|_| Price::zero(subtotal.currency_code()))
    }
}

/// Totals for the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub item_count: u64,
    pub coupon: Option<CouponCode>,
}

impl CheckoutSummary {
    #[must_use]
    pub fn from_cart(cart: &CartState, policy: &ShippingPolicy) -> Self {
        let subtotal = cart.total();
        let item_count = cart.count();
        let shipping = policy.fee_for(&subtotal, item_count);
        let total = subtotal.checked_add(&shipping).unwrap_or(subtotal);

        Self {
            subtotal,
            shipping,
            total,
            item_count,
            coupon: cart.applied_coupon().cloned(),
        }
    }

    /// "1 item" or "N items".
    #[must_use]
    pub fn item_label(&self) -> String {
        if self.item_count == 1 {
            "1 item".to_string()
        } else {
            format!("{} items", self.item_count)
        }
    }

    /// "Free delivery" or "+ Rs. 150 delivery".
    #[must_use]
    pub fn delivery_label(&self) -> String {
        if self.shipping.is_zero() {
            "Free delivery".to_string()
        } else {
            format!("+ {} delivery", self.shipping)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use doko_core::{ProductId, ProductSummary};

    use super::*;
    use crate::cart::{self, CartAction};

    fn cart_with(price: i64, quantity: u32) -> CartState {
        let product = ProductSummary::new(
            ProductId::parse("sku-1").unwrap(),
            "Lokta Paper Journal",
            Price::npr(Decimal::from(price)).unwrap(),
        );
        cart::reduce(
            &CartState::default(),
            &CartAction::AddItem { product, quantity },
        )
        .unwrap()
    }

    #[test]
    fn test_below_threshold_pays_delivery() {
        let summary = CheckoutSummary::from_cart(&cart_with(1749, 1), &ShippingPolicy::default());
        assert_eq!(summary.subtotal.amount(), Decimal::from(1749));
        assert_eq!(summary.shipping.amount(), Decimal::from(150));
        assert_eq!(summary.total.amount(), Decimal::from(1899));
        assert_eq!(summary.item_label(), "1 item");
        assert_eq!(summary.delivery_label(), "+ Rs. 150 delivery");
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let summary = CheckoutSummary::from_cart(&cart_with(2500, 2), &ShippingPolicy::default());
        assert!(summary.shipping.is_zero());
        assert_eq!(summary.total.amount(), Decimal::from(5000));
        assert_eq!(summary.item_label(), "2 items");
        assert_eq!(summary.delivery_label(), "Free delivery");
    }

    #[test]
    fn test_empty_cart_is_free() {
        let summary = CheckoutSummary::from_cart(&CartState::default(), &ShippingPolicy::default());
        assert!(summary.total.is_zero());
        assert_eq!(summary.item_label(), "0 items");
    }
}
