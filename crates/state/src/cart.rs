//! Cart state and reducer.
//!
//! [`reduce`] is a pure function: it never performs I/O and never mutates its
//! input. The [`Store`](crate::store::Store) wrapper takes care of
//! persistence and notifications.
//!
//! # Invariants
//!
//! - No two line items share a `product_id`
//! - Every stored quantity is at least 1
//! - Every line is priced in the same currency
//! - Every line total and the cart total fit in a decimal amount

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use doko_core::{CouponCode, CurrencyCode, Price, PriceError, ProductId, ProductSummary};

use crate::checkout::{CheckoutSummary, ShippingPolicy};
use crate::error::CartError;
use crate::store::{Reducer, Store};

/// A single product-and-quantity entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    /// Price snapshot taken when the product was first added.
    pub unit_price: Price,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl LineItem {
    fn from_product(product: &ProductSummary, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity,
            image_url: product.image_url.clone(),
        }
    }

    /// `unit_price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the product does not fit.
    pub fn line_total(&self) -> Result<Price, PriceError> {
        self.unit_price.times(self.quantity)
    }
}

/// Cart contents plus the active coupon.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartState {
    items: Vec<LineItem>,
    #[serde(default)]
    applied_coupon: Option<CouponCode>,
}

impl CartState {
    /// Line items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Look up a line by product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&LineItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    #[must_use]
    pub const fn applied_coupon(&self) -> Option<&CouponCode> {
        self.applied_coupon.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency shared by all lines, if the cart has any.
    #[must_use]
    pub fn currency(&self) -> Option<CurrencyCode> {
        self.items.first().map(|item| item.unit_price.currency_code())
    }

    /// Sum of `unit_price * quantity` over all lines. Zero for an empty cart.
    #[must_use]
    pub fn total(&self) -> Price {
        let currency = self.currency().unwrap_or_default();
        // Reducers and hydration only admit carts whose total fits.
        self.checked_total()
            .unwrap_or_else(|_| Price::zero(currency))
    }

    /// Cart total, or the arithmetic error that prevents computing it.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] or [`PriceError::CurrencyMismatch`].
    pub fn checked_total(&self) -> Result<Price, PriceError> {
        let currency = self.currency().unwrap_or_default();
        self.items
            .iter()
            .try_fold(Price::zero(currency), |sum, item| {
                sum.checked_add(&item.line_total()?)
            })
    }

    /// Sum of quantities over all lines. Zero for an empty cart.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Total for one product's line, if present.
    #[must_use]
    pub fn line_total(&self, product_id: &ProductId) -> Option<Price> {
        self.get(product_id)
            .and_then(|item| item.line_total().ok())
    }

    fn without(&self, product_id: &ProductId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| &item.product_id != product_id)
                .cloned()
                .collect(),
            applied_coupon: self.applied_coupon.clone(),
        }
    }

    /// Check the invariants listed in the module docs.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        let currency = self.currency();
        for (index, item) in self.items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(format!("{} has zero quantity", item.product_id));
            }
            if item.unit_price.is_negative() {
                return Err(format!("{} has a negative price", item.product_id));
            }
            if Some(item.unit_price.currency_code()) != currency {
                return Err(format!("{} is priced in another currency", item.product_id));
            }
            let duplicate = self
                .items
                .iter()
                .skip(index + 1)
                .any(|other| other.product_id == item.product_id);
            if duplicate {
                return Err(format!("{} appears more than once", item.product_id));
            }
        }
        self.checked_total()
            .map(|_| ())
            .map_err(|e| format!("total cannot be computed: {e}"))
    }
}

fn default_quantity() -> u32 {
    1
}

/// Actions accepted by the cart reducer.
///
/// Serialized with a `type` tag so a UI bridge can send them as JSON, e.g.
/// `{"type": "REMOVE_ITEM", "product_id": "sku-1"}`. Unrecognized tags decode
/// to [`CartAction::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartAction {
    /// Add `quantity` units, merging with an existing line.
    AddItem {
        product: ProductSummary,
        #[serde(default = "default_quantity")]
        quantity: u32,
    },
    RemoveItem {
        product_id: ProductId,
    },
    /// Set an exact quantity. Zero removes the line.
    SetQuantity {
        product_id: ProductId,
        quantity: i64,
    },
    /// Empty the items. The coupon is kept.
    Clear,
    /// Replace the active coupon.
    ApplyCoupon {
        code: CouponCode,
    },
    RemoveCoupon,
    #[serde(other)]
    Unknown,
}

/// Compute the next cart state.
///
/// # Errors
///
/// Returns [`CartError::InvalidQuantity`] for a zero add, a negative or
/// overflowing quantity, or one that would push a line or the cart total
/// past the largest representable amount, [`CartError::InvalidPrice`] for a negative price
/// snapshot, and [`CartError::CurrencyMismatch`] when a product's currency
/// differs from the cart's. The input state is never modified.
pub fn reduce(state: &CartState, action: &CartAction) -> Result<CartState, CartError> {
    match action {
        CartAction::AddItem { product, quantity } => add_item(state, product, *quantity),
        CartAction::RemoveItem { product_id } => Ok(state.without(product_id)),
        CartAction::SetQuantity {
            product_id,
            quantity,
        } => set_quantity(state, product_id, *quantity),
        CartAction::Clear => Ok(CartState {
            items: Vec::new(),
            applied_coupon: state.applied_coupon.clone(),
        }),
        CartAction::ApplyCoupon { code } => Ok(CartState {
            items: state.items.clone(),
            applied_coupon: Some(code.clone()),
        }),
        CartAction::RemoveCoupon => Ok(CartState {
            items: state.items.clone(),
            applied_coupon: None,
        }),
        CartAction::Unknown => Ok(state.clone()),
    }
}

fn add_item(
    state: &CartState,
    product: &ProductSummary,
    quantity: u32,
) -> Result<CartState, CartError> {
    if quantity == 0 {
        return Err(CartError::InvalidQuantity(
            "quantity to add must be at least 1".to_string(),
        ));
    }
    if product.price.is_negative() {
        return Err(CartError::InvalidPrice(format!(
            "{} has a negative price",
            product.id
        )));
    }
    if let Some(expected) = state.currency() {
        let found = product.price.currency_code();
        if expected != found {
            return Err(CartError::CurrencyMismatch { expected, found });
        }
    }

    let mut next = state.clone();
    match next
        .items
        .iter_mut()
        .find(|item| item.product_id == product.id)
    {
        Some(item) => {
            item.quantity = item.quantity.checked_add(quantity).ok_or_else(|| {
                CartError::InvalidQuantity(format!("{} would exceed {}", product.id, u32::MAX))
            })?;
        }
        None => next.items.push(LineItem::from_product(product, quantity)),
    }
    ensure_total(next, &product.id)
}

/// Reject a state whose total can no longer be computed.
fn ensure_total(next: CartState, product_id: &ProductId) -> Result<CartState, CartError> {
    match next.checked_total() {
        Ok(_) => Ok(next),
        Err(e) => Err(CartError::InvalidQuantity(format!(
            "{product_id} would make the cart total unrepresentable: {e}"
        ))),
    }
}

fn set_quantity(
    state: &CartState,
    product_id: &ProductId,
    quantity: i64,
) -> Result<CartState, CartError> {
    if quantity < 0 {
        return Err(CartError::InvalidQuantity(format!(
            "{quantity} is negative"
        )));
    }
    if quantity == 0 {
        return Ok(state.without(product_id));
    }
    let quantity = u32::try_from(quantity)
        .map_err(|_| CartError::InvalidQuantity(format!("{quantity} is too large")))?;

    let mut next = state.clone();
    if let Some(item) = next
        .items
        .iter_mut()
        .find(|item| &item.product_id == product_id)
    {
        item.quantity = quantity;
    }
    ensure_total(next, product_id)
}

/// Parse raw quantity input from a form field.
///
/// # Errors
///
/// Returns [`CartError::InvalidQuantity`] if the input is not a whole number.
pub fn parse_quantity(input: &str) -> Result<i64, CartError> {
    let trimmed = input.trim();
    trimmed.parse::<i64>().map_err(|_| {
        if trimmed.parse::<Decimal>().is_ok() {
            CartError::InvalidQuantity(format!("{trimmed} is not a whole number"))
        } else {
            CartError::InvalidQuantity(format!("{trimmed:?} is not a number"))
        }
    })
}

/// Marker type wiring the cart into the generic [`Store`](crate::store::Store).
#[derive(Debug, Clone, Copy, Default)]
pub struct CartReducer;

impl Reducer for CartReducer {
    type State = CartState;
    type Action = CartAction;
    type Error = CartError;

    fn reduce(state: &CartState, action: &CartAction) -> Result<CartState, CartError> {
        reduce(state, action)
    }

    fn validate(state: &CartState) -> Result<(), String> {
        state.validate()
    }

    fn is_recognized(action: &CartAction) -> bool {
        !matches!(action, CartAction::Unknown)
    }

    fn announce(action: &CartAction) -> Option<String> {
        match action {
            CartAction::AddItem { product, .. } => {
                Some(format!("{} added to cart!", product.display_name()))
            }
            _ => None,
        }
    }
}

/// Cart store handed to UI components.
pub type CartStore = Store<CartReducer>;

impl Store<CartReducer> {
    /// Add `quantity` units of a product.
    ///
    /// # Errors
    ///
    /// See [`reduce`].
    pub fn add_item(&mut self, product: ProductSummary, quantity: u32) -> Result<bool, CartError> {
        self.dispatch(CartAction::AddItem { product, quantity })
    }

    /// Remove a product's line. Absent products are ignored.
    pub fn remove_item(&mut self, product_id: &ProductId) -> bool {
        self.dispatch(CartAction::RemoveItem {
            product_id: product_id.clone(),
        })
        .unwrap_or(false)
    }

    /// Set an exact quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for negative or oversized values.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: i64) -> Result<bool, CartError> {
        self.dispatch(CartAction::SetQuantity {
            product_id: product_id.clone(),
            quantity,
        })
    }

    /// Empty the cart, keeping the coupon.
    pub fn clear(&mut self) -> bool {
        self.dispatch(CartAction::Clear).unwrap_or(false)
    }

    pub fn apply_coupon(&mut self, code: CouponCode) -> bool {
        self.dispatch(CartAction::ApplyCoupon { code }).unwrap_or(false)
    }

    pub fn remove_coupon(&mut self) -> bool {
        self.dispatch(CartAction::RemoveCoupon).unwrap_or(false)
    }

    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        self.state().items()
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.state().total()
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.state().count()
    }

    #[must_use]
    pub fn checkout_summary(&self, policy: &ShippingPolicy) -> CheckoutSummary {
        CheckoutSummary::from_cart(self.state(), policy)
    }
}
