//! Wishlist state and reducer.
//!
//! Structurally a simpler cart: a set of saved products with no quantities
//! and no coupon. Adding a product that is already saved does nothing.

use std::convert::Infallible;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use doko_core::{Price, ProductId, ProductSummary};

use crate::store::{Reducer, Store};

/// A saved product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl WishlistItem {
    /// Catalog view of this item, for handing to the cart.
    #[must_use]
    pub fn to_product(&self) -> ProductSummary {
        ProductSummary {
            id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.price,
            image_url: self.image_url.clone(),
        }
    }
}

/// Saved products in the order they were added.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WishlistState {
    items: Vec<WishlistItem>,
}

impl WishlistState {
    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&WishlistItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    #[must_use]
    pub fn is_member(&self, product_id: &ProductId) -> bool {
        self.get(product_id).is_some()
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn without(&self, product_id: &ProductId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| &item.product_id != product_id)
                .cloned()
                .collect(),
        }
    }

    /// Check that no product is saved twice and no price is negative.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        for (index, item) in self.items.iter().enumerate() {
            if item.price.is_negative() {
                return Err(format!("{} has a negative price", item.product_id));
            }
            if self
                .items
                .iter()
                .skip(index + 1)
                .any(|other| other.product_id == item.product_id)
            {
                return Err(format!("{} appears more than once", item.product_id));
            }
        }
        Ok(())
    }
}

/// Actions accepted by the wishlist reducer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WishlistAction {
    /// Save a product. `added_at` is stamped by the caller so the reducer
    /// stays free of clocks.
    AddItem {
        product: ProductSummary,
        added_at: DateTime<Utc>,
    },
    RemoveItem {
        product_id: ProductId,
    },
    Clear,
    /// Drop the product from the wishlist. Adding it to the cart is the
    /// caller's job.
    MoveToCart {
        product_id: ProductId,
    },
    #[serde(other)]
    Unknown,
}

impl WishlistAction {
    /// `AddItem` stamped with the current time.
    #[must_use]
    pub fn add(product: ProductSummary) -> Self {
        Self::AddItem {
            product,
            added_at: Utc::now(),
        }
    }
}

/// Compute the next wishlist state. Every action is accepted.
#[must_use]
pub fn reduce(state: &WishlistState, action: &WishlistAction) -> WishlistState {
    match action {
        WishlistAction::AddItem { product, added_at } => {
            if state.is_member(&product.id) {
                return state.clone();
            }
            let mut next = state.clone();
            next.items.push(WishlistItem {
                product_id: product.id.clone(),
                name: product.name.clone(),
                price: product.price,
                image_url: product.image_url.clone(),
                added_at: *added_at,
            });
            next
        }
        WishlistAction::RemoveItem { product_id } | WishlistAction::MoveToCart { product_id } => {
            state.without(product_id)
        }
        WishlistAction::Clear => WishlistState::default(),
        WishlistAction::Unknown => state.clone(),
    }
}

/// Marker type wiring the wishlist into the generic [`Store`](crate::store::Store).
#[derive(Debug, Clone, Copy, Default)]
pub struct WishlistReducer;

impl Reducer for WishlistReducer {
    type State = WishlistState;
    type Action = WishlistAction;
    type Error = Infallible;

    fn reduce(state: &WishlistState, action: &WishlistAction) -> Result<WishlistState, Infallible> {
        Ok(reduce(state, action))
    }

    fn validate(state: &WishlistState) -> Result<(), String> {
        state.validate()
    }

    fn is_recognized(action: &WishlistAction) -> bool {
        !matches!(action, WishlistAction::Unknown)
    }

    fn announce(action: &WishlistAction) -> Option<String> {
        match action {
            WishlistAction::AddItem { product, .. } => {
                Some(format!("{} added to wishlist!", product.display_name()))
            }
            _ => None,
        }
    }
}

/// Wishlist store handed to UI components.
pub type WishlistStore = Store<WishlistReducer>;

impl Store<WishlistReducer> {
    fn apply(&mut self, action: WishlistAction) -> bool {
        self.dispatch(action).unwrap_or_else(|never| match never {})
    }

    /// Save a product, stamped with the current time. Returns `false` if it
    /// was already saved.
    pub fn add_item(&mut self, product: ProductSummary) -> bool {
        self.apply(WishlistAction::add(product))
    }

    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        self.apply(WishlistAction::RemoveItem {
            product_id: product_id.clone(),
        })
    }

    pub fn clear(&mut self) -> bool {
        self.apply(WishlistAction::Clear)
    }

    /// Remove a saved product and hand it back so the caller can add it to
    /// the cart. Returns `None` if it was not saved.
    pub fn move_to_cart(&mut self, product_id: &ProductId) -> Option<ProductSummary> {
        let product = self.state().get(product_id)?.to_product();
        self.apply(WishlistAction::MoveToCart {
            product_id: product_id.clone(),
        });
        Some(product)
    }

    #[must_use]
    pub fn items(&self) -> &[WishlistItem] {
        self.state().items()
    }

    #[must_use]
    pub fn is_member(&self, product_id: &ProductId) -> bool {
        self.state().is_member(product_id)
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.state().count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;

    fn product(id: &str) -> ProductSummary {
        ProductSummary::new(
            ProductId::parse(id).unwrap(),
            "Singing Bowl",
            Price::npr(Decimal::from(2500)).unwrap(),
        )
    }

    fn add_at(state: &WishlistState, id: &str, seconds: i64) -> WishlistState {
        reduce(
            state,
            &WishlistAction::AddItem {
                product: product(id),
                added_at: Utc.timestamp_opt(seconds, 0).unwrap(),
            },
        )
    }

    #[test]
    fn test_add_twice_is_idempotent() {
        let once = add_at(&WishlistState::default(), "sku-9", 10);
        let twice = add_at(&once, "sku-9", 20);
        assert_eq!(once, twice);
        assert_eq!(twice.count(), 1);
        assert_eq!(
            twice.items().first().unwrap().added_at,
            Utc.timestamp_opt(10, 0).unwrap()
        );
    }

    #[test]
    fn test_remove_clears_membership() {
        let state = add_at(&WishlistState::default(), "sku-9", 10);
        let id = ProductId::parse("sku-9").unwrap();
        assert!(state.is_member(&id));

        let state = reduce(&state, &WishlistAction::RemoveItem { product_id: id.clone() });
        assert!(!state.is_member(&id));
        assert_eq!(state.count(), 0);
    }

    #[test]
    fn test_move_to_cart_removes() {
        let state = add_at(&WishlistState::default(), "sku-1", 1);
        let state = add_at(&state, "sku-2", 2);
        let id = ProductId::parse("sku-1").unwrap();

        let next = reduce(&state, &WishlistAction::MoveToCart { product_id: id.clone() });
        assert!(!next.is_member(&id));
        assert_eq!(next.count(), 1);
    }

    #[test]
    fn test_clear() {
        let state = add_at(&WishlistState::default(), "sku-1", 1);
        let state = reduce(&state, &WishlistAction::Clear);
        assert!(state.is_empty());
    }

    #[test]
    fn test_to_product_keeps_price() {
        let state = add_at(&WishlistState::default(), "sku-1", 1);
        let product = state.items().first().unwrap().to_product();
        assert_eq!(product.price.amount(), Decimal::from(2500));
    }

    #[test]
    fn test_unknown_action_is_noop() {
        let state = add_at(&WishlistState::default(), "sku-1", 1);
        let action: WishlistAction = serde_json::from_str(r#"{"type": "SHARE"}"#).unwrap();
        assert_eq!(reduce(&state, &action), state);
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let state = add_at(&WishlistState::default(), "sku-1", 1);
        let item = state.items().first().unwrap().clone();
        let dup = WishlistState {
            items: vec![item.clone(), item],
        };
        assert!(dup.validate().is_err());
    }
}
