//! Checkout service.
//!
//! Converts a cart (or a single buy-now product) into orders with pending
//! payments. An order references exactly one product, so cart checkout
//! produces one order per cart line and clears the cart in the same
//! transaction.

use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use kebuncuan_core::{Money, ProductId, Slug, UserId};

use crate::db::orders::{insert_order, insert_payment};
use crate::db::{CartRepository, NewOrder, ProductRepository, RepositoryError, StoreRepository};
use crate::db::carts::clear_cart;
use crate::models::cart::CartLine;
use crate::models::order::{Order, Payment, RecipientInfo};

/// Flat checkout tax, applied only for stores that enable it.
const TAX_RATE_PERCENT: u32 = 10;

/// Errors from checkout operations.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Store is missing or soft-deleted.
    #[error("store not found")]
    StoreNotFound,

    /// Product is missing, inactive, or belongs to a different store.
    #[error("product unavailable")]
    ProductUnavailable,

    /// Cart checkout with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// Quantity must be at least 1.
    #[error("invalid quantity")]
    InvalidQuantity,

    /// A required request field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Underlying repository failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// What the buyer is checking out.
#[derive(Debug, Clone)]
pub enum CheckoutSource {
    /// Skip the cart and order one product directly.
    BuyNow {
        product_id: ProductId,
        quantity: i32,
    },
    /// Drain the buyer's cart for the store.
    Cart,
}

/// The shipping method the buyer selected from a rate quote.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ShippingSelection {
    pub courier_company: String,
    pub courier_type: String,
    pub price: Money,
}

/// One checkout command.
#[derive(Debug, Clone)]
pub struct CheckoutCommand {
    pub source: CheckoutSource,
    /// Absent for orders that need no physical shipping.
    pub shipping: Option<ShippingSelection>,
    pub payment_method: String,
    pub recipient: RecipientInfo,
}

/// Result of a checkout: the created orders and where to send the buyer.
#[derive(Debug)]
pub struct CheckoutOutcome {
    pub orders: Vec<(Order, Payment)>,
    /// Payment page for the first created order's invoice.
    pub payment_redirect: String,
}

/// Subtotal / shipping / tax / total for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub shipping_cost: Money,
    pub tax: Money,
    pub total: Money,
}

impl OrderTotals {
    /// Compute totals: `subtotal + shipping`, plus the flat 10% tax on that
    /// sum when the store applies tax.
    #[must_use]
    pub fn compute(price: Money, quantity: u32, shipping_cost: Money, tax_enabled: bool) -> Self {
        let subtotal = price.times(quantity);
        let taxable = subtotal + shipping_cost;
        let tax = if tax_enabled {
            taxable.percent(TAX_RATE_PERCENT)
        } else {
            Money::ZERO
        };

        Self {
            subtotal,
            shipping_cost,
            tax,
            total: taxable + tax,
        }
    }
}

/// Checkout operations.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create orders (and pending payments) from the command.
    ///
    /// Orders, payments, and the cart clear all commit atomically.
    ///
    /// # Errors
    ///
    /// Returns a `CheckoutError` for validation failures, unknown stores or
    /// products, empty carts, and repository errors.
    #[instrument(skip(self, command), fields(source = ?command.source))]
    pub async fn checkout(
        &self,
        user_id: UserId,
        store_slug: &Slug,
        command: CheckoutCommand,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        validate_command(&command)?;

        let store = StoreRepository::new(self.pool)
            .find_by_slug(store_slug)
            .await?
            .ok_or(CheckoutError::StoreNotFound)?;

        // Resolve the product/quantity pairs being ordered.
        let carts = CartRepository::new(self.pool);
        let (pairs, cart_to_clear) = match command.source {
            CheckoutSource::BuyNow {
                product_id,
                quantity,
            } => {
                if quantity < 1 {
                    return Err(CheckoutError::InvalidQuantity);
                }
                let product = ProductRepository::new(self.pool)
                    .get_active_in_store(product_id, store.id)
                    .await?
                    .ok_or(CheckoutError::ProductUnavailable)?;
                (vec![(product, quantity)], None)
            }
            CheckoutSource::Cart => {
                let cart = carts.get_or_create(user_id, store.id).await?;
                let lines = carts.list_lines(cart.id).await?;
                if lines.is_empty() {
                    return Err(CheckoutError::EmptyCart);
                }
                // A product deactivated after it was added must not slip
                // through checkout.
                if lines.iter().any(|line| !line.product.active) {
                    return Err(CheckoutError::ProductUnavailable);
                }
                let pairs = lines
                    .into_iter()
                    .map(|CartLine { item, product }| (product, item.quantity))
                    .collect();
                (pairs, Some(cart.id))
            }
        };

        let shipping_required = command.shipping.is_some();
        let shipping_cost = command
            .shipping
            .as_ref()
            .map_or(Money::ZERO, |s| s.price);

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut orders = Vec::with_capacity(pairs.len());
        for (product, quantity) in pairs {
            let totals = OrderTotals::compute(
                product.price,
                u32::try_from(quantity).map_err(|_| CheckoutError::InvalidQuantity)?,
                shipping_cost,
                store.tax_enabled,
            );

            let new_order = NewOrder {
                invoice: generate_invoice(),
                user_id,
                product_id: product.id,
                quantity,
                shipping_required,
                recipient: command.recipient.clone(),
                courier_company: command
                    .shipping
                    .as_ref()
                    .map(|s| s.courier_company.clone()),
                courier_type: command.shipping.as_ref().map(|s| s.courier_type.clone()),
                subtotal: totals.subtotal,
                shipping_cost: totals.shipping_cost,
                tax: totals.tax,
                total: totals.total,
            };

            let order = insert_order(&mut tx, &new_order).await?;
            let payment =
                insert_payment(&mut tx, order.id, &command.payment_method, order.total).await?;
            orders.push((order, payment));
        }

        if let Some(cart_id) = cart_to_clear {
            clear_cart(&mut tx, cart_id).await?;
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        let payment_redirect = orders
            .first()
            .map_or_else(String::new, |(order, _)| format!("/payment/{}", order.invoice));

        Ok(CheckoutOutcome {
            orders,
            payment_redirect,
        })
    }
}

fn validate_command(command: &CheckoutCommand) -> Result<(), CheckoutError> {
    if command.payment_method.trim().is_empty() {
        return Err(CheckoutError::MissingField("payment_method"));
    }
    if command.recipient.name.trim().is_empty() {
        return Err(CheckoutError::MissingField("recipient.name"));
    }
    if command.recipient.phone.trim().is_empty() {
        return Err(CheckoutError::MissingField("recipient.phone"));
    }
    if command.shipping.is_some() && command.recipient.address.trim().is_empty() {
        return Err(CheckoutError::MissingField("recipient.address"));
    }

    Ok(())
}

/// Generate an invoice number: `KC-{YYYYMMDD}-{6 uppercase alphanumerics}`.
fn generate_invoice() -> String {
    let date = chrono::Utc::now().format("%Y%m%d");
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect::<String>()
        .to_uppercase();

    format!("KC-{date}-{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals_without_tax() {
        // 50_000 x 2 + 15_000 shipping = 115_000
        let totals = OrderTotals::compute(
            Money::from_rupiah(50_000),
            2,
            Money::from_rupiah(15_000),
            false,
        );
        assert_eq!(totals.subtotal, Money::from_rupiah(100_000));
        assert_eq!(totals.shipping_cost, Money::from_rupiah(15_000));
        assert_eq!(totals.tax, Money::ZERO);
        assert_eq!(totals.total, Money::from_rupiah(115_000));
    }

    #[test]
    fn test_totals_with_tax() {
        // Same order with the 10% tax applied: 126_500
        let totals = OrderTotals::compute(
            Money::from_rupiah(50_000),
            2,
            Money::from_rupiah(15_000),
            true,
        );
        assert_eq!(totals.tax, Money::from_rupiah(11_500));
        assert_eq!(totals.total, Money::from_rupiah(126_500));
    }

    #[test]
    fn test_totals_without_shipping() {
        let totals = OrderTotals::compute(Money::from_rupiah(25_000), 1, Money::ZERO, true);
        assert_eq!(totals.subtotal, Money::from_rupiah(25_000));
        assert_eq!(totals.total, Money::from_rupiah(27_500));
    }

    #[test]
    fn test_invoice_format() {
        let invoice = generate_invoice();
        let mut parts = invoice.split('-');
        assert_eq!(parts.next(), Some("KC"));

        let date = parts.next().expect("date segment");
        assert_eq!(date.len(), 8);
        assert!(date.chars().all(|c| c.is_ascii_digit()));

        let suffix = parts.next().expect("suffix segment");
        assert_eq!(suffix.len(), 6);
        assert!(
            suffix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        );

        assert_eq!(parts.next(), None);
    }

    #[test]
    fn test_invoices_are_unique_enough() {
        let a = generate_invoice();
        let b = generate_invoice();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_command_rejects_blank_fields() {
        let command = CheckoutCommand {
            source: CheckoutSource::Cart,
            shipping: None,
            payment_method: " ".to_string(),
            recipient: RecipientInfo {
                name: "Budi".to_string(),
                phone: "+62812".to_string(),
                address: String::new(),
                area_id: String::new(),
                postal_code: String::new(),
            },
        };
        assert!(matches!(
            validate_command(&command),
            Err(CheckoutError::MissingField("payment_method"))
        ));
    }

    #[test]
    fn test_validate_command_requires_address_for_shipping() {
        let command = CheckoutCommand {
            source: CheckoutSource::Cart,
            shipping: Some(ShippingSelection {
                courier_company: "jne".to_string(),
                courier_type: "reg".to_string(),
                price: Money::from_rupiah(15_000),
            }),
            payment_method: "transfer".to_string(),
            recipient: RecipientInfo {
                name: "Budi".to_string(),
                phone: "+62812".to_string(),
                address: String::new(),
                area_id: String::new(),
                postal_code: String::new(),
            },
        };
        assert!(matches!(
            validate_command(&command),
            Err(CheckoutError::MissingField("recipient.address"))
        ));
    }
}
