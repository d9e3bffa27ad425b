use axum::extract::{Path, State};

use crate::api::response::{created, done, ok, ApiResult, JsonBody};
use crate::api::state::AppState;
use crate::application::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::domain::{Customer, CustomerCreated, CustomerSummary};

pub async fn create_customer(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<CreateCustomerRequest>,
) -> ApiResult<CustomerCreated> {
    let customer = state.service.create_customer(request).await?;
    Ok(created("Customer created successfully", customer))
}

pub async fn list_customers(State(state): State<AppState>) -> ApiResult<Vec<Customer>> {
    Ok(ok(state.service.list_customers().await?))
}

/// Customer with their account count and combined balance.
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CustomerSummary> {
    Ok(ok(state.service.get_customer(&id).await?))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    JsonBody(request): JsonBody<UpdateCustomerRequest>,
) -> ApiResult<()> {
    state.service.update_customer(&id, request).await?;
    Ok(done("Customer updated successfully"))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    state.service.delete_customer(&id).await?;
    Ok(done("Customer deleted successfully"))
}
