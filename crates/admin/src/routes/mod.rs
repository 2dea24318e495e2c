//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//!
//! # Dashboard
//! GET  /api/dashboard                 - Counts, totals, recent activity
//!
//! # Billing records (proxied to the billing API)
//! GET|POST        /api/clients
//! GET|PUT|DELETE  /api/clients/{id}
//! GET|POST        /api/products
//! GET|PUT|DELETE  /api/products/{id}
//! GET|POST        /api/invoices
//! POST            /api/invoices/preview      - Normalized rows and totals
//! GET|PUT|DELETE  /api/invoices/{id}
//! POST            /api/invoices/{id}/email
//! POST            /api/invoices/{id}/pay     - Payment intent for the balance
//! GET|POST        /api/recurring-invoices
//! GET|PUT|DELETE  /api/recurring-invoices/{id}
//! GET|POST        /api/payments
//! GET|PUT|DELETE  /api/payments/{id}
//!
//! # Store (session cart)
//! GET  /api/store/products            - Active catalog
//! GET  /api/cart                      - Cart and totals
//! POST /api/cart/add
//! POST /api/cart/update
//! POST /api/cart/remove
//! POST /api/cart/clear
//! POST /api/checkout
//! ```

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod cart;
pub mod checkout;
pub mod clients;
pub mod dashboard;
pub mod invoices;
pub mod payments;
pub mod products;
pub mod recurring_invoices;

/// Build the `/api` router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::summary))
        .nest("/clients", client_routes())
        .nest("/products", product_routes())
        .nest("/invoices", invoice_routes())
        .nest("/recurring-invoices", recurring_invoice_routes())
        .nest("/payments", payment_routes())
        .route("/store/products", get(products::store_index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::submit))
}

fn client_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(clients::index).post(clients::create))
        .route(
            "/{id}",
            get(clients::show)
                .put(clients::update)
                .delete(clients::delete),
        )
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(invoices::index).post(invoices::create))
        .route("/preview", post(invoices::preview))
        .route(
            "/{id}",
            get(invoices::show)
                .put(invoices::update)
                .delete(invoices::delete),
        )
        .route("/{id}/email", post(invoices::email))
        .route("/{id}/pay", post(invoices::pay))
}

fn recurring_invoice_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(recurring_invoices::index).post(recurring_invoices::create),
        )
        .route(
            "/{id}",
            get(recurring_invoices::show)
                .put(recurring_invoices::update)
                .delete(recurring_invoices::delete),
        )
}

fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(payments::index).post(payments::create))
        .route(
            "/{id}",
            get(payments::show)
                .put(payments::update)
                .delete(payments::delete),
        )
}

fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}
