//! HTTP surface: routes under `/api`, JSON envelope, error mapping.

pub mod handlers;
pub mod response;
pub mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use response::{ApiError, ApiResponse};
pub use state::AppState;

use handlers::{accounts, customers, health, loans, transactions};

/// Create the API router
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health::health_check))
        // Customers
        .route(
            "/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/customers/:id",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        // Accounts
        .route(
            "/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route("/accounts/create", post(accounts::create_account))
        .route("/accounts/:account_no", get(accounts::get_account))
        .route("/accounts/:account_no/balance", get(accounts::get_balance))
        .route(
            "/accounts/:account_no/status",
            put(accounts::update_account_status),
        )
        // Transactions
        .route("/transactions", get(transactions::list_transactions))
        .route("/transactions/deposit", post(transactions::deposit))
        .route("/transactions/withdraw", post(transactions::withdraw))
        .route("/transactions/transfer", post(transactions::transfer))
        .route("/transactions/:id", get(transactions::get_transaction))
        // Loans
        .route("/loans", get(loans::list_loans).post(loans::create_loan))
        .route("/loans/:id", get(loans::get_loan));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
