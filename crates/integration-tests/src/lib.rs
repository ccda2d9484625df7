//! Shared helpers for KebunCuan integration tests.
//!
//! The tests in `tests/` drive the HTTP API of a running server. They
//! require:
//! - A running `PostgreSQL` database with migrations and seed data applied
//!   (`kc-cli migrate && kc-cli seed`)
//! - The server running (`cargo run -p kebuncuan-server`)
//! - Session cookies for a buyer and a merchant, established by the auth
//!   layer, passed via `TEST_BUYER_COOKIE` / `TEST_MERCHANT_COOKIE`
//!
//! All tests are `#[ignore]`d so `cargo test` stays green without a stack.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use reqwest::Client;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SERVER_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// The demo store seeded by `kc-cli seed`.
#[must_use]
pub fn demo_store() -> String {
    std::env::var("TEST_STORE_SLUG").unwrap_or_else(|_| "toko-sayur-segar".to_string())
}

/// Create a client carrying the buyer's session cookie.
#[must_use]
pub fn buyer_client() -> Client {
    client_with_cookie("TEST_BUYER_COOKIE")
}

/// Create a client carrying the merchant's session cookie.
#[must_use]
pub fn merchant_client() -> Client {
    client_with_cookie("TEST_MERCHANT_COOKIE")
}

/// Create a client with no session at all.
#[must_use]
pub fn anonymous_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

fn client_with_cookie(env_var: &str) -> Client {
    let cookie = std::env::var(env_var)
        .unwrap_or_else(|_| panic!("{env_var} must hold a session cookie (kc_session=...)"));

    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::COOKIE,
        cookie.parse().expect("invalid cookie header value"),
    );

    Client::builder()
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}
