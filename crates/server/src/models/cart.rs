//! Cart models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kebuncuan_core::{CartId, CartItemId, Money, ProductId, StoreId, UserId};

use super::product::Product;

/// A buyer's in-progress purchase for one store.
///
/// At most one cart exists per (user, store) pair; the database enforces it.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub created_at: DateTime<Utc>,
}

/// A line in a cart. One line per product per cart; repeated adds fold into
/// the quantity.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with its product, as the storefront consumes it.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

impl CartLine {
    /// Price of the line: product price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        let quantity = u32::try_from(self.item.quantity).unwrap_or(0);
        self.product.price.times(quantity)
    }
}

/// Cart with its lines and computed subtotal.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart: Cart,
    pub lines: Vec<CartLine>,
    pub subtotal: Money,
}

impl CartView {
    /// Assemble a view, computing the subtotal from the lines.
    #[must_use]
    pub fn assemble(cart: Cart, lines: Vec<CartLine>) -> Self {
        let subtotal = lines.iter().map(CartLine::line_total).sum();
        Self {
            cart,
            lines,
            subtotal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kebuncuan_core::CategoryId;

    fn line(price: i64, quantity: i32) -> CartLine {
        CartLine {
            item: CartItem {
                id: CartItemId::new(1),
                cart_id: CartId::new(1),
                product_id: ProductId::new(1),
                quantity,
                created_at: Utc::now(),
            },
            product: Product {
                id: ProductId::new(1),
                store_id: StoreId::new(1),
                category_id: CategoryId::new(1),
                name: "Pupuk Organik".to_string(),
                description: String::new(),
                price: Money::from_rupiah(price),
                modal_price: Money::ZERO,
                weight_grams: 1000,
                active: true,
                images: vec![],
                created_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line(50_000, 2).line_total(), Money::from_rupiah(100_000));
    }

    #[test]
    fn test_view_subtotal() {
        let cart = Cart {
            id: CartId::new(1),
            user_id: UserId::new(1),
            store_id: StoreId::new(1),
            created_at: Utc::now(),
        };
        let view = CartView::assemble(cart, vec![line(50_000, 2), line(12_500, 1)]);
        assert_eq!(view.subtotal, Money::from_rupiah(112_500));
    }
}
