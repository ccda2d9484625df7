//! Buyer / merchant account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use kebuncuan_core::{Email, Money, UserId};

/// A platform account. The same account can buy from any store and own
/// zero or more stores as a merchant.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    /// Merchant payout balance.
    pub balance: Money,
    pub created_at: DateTime<Utc>,
}
