//! services/api/src/web/wallet.rs

use axum::{
    extract::State,
    Extension, Json,
};
use mentor_core::domain::{Page, Transaction, TransferReceipt, TransferRequest, Wallet};
use mentor_core::Caller;
use std::sync::Arc;

use crate::error::ApiError;
use crate::web::rest::PageQuery;
use crate::web::{
    extract::{JsonBody, QueryParams},
    state::AppState,
};

/// GET /wallet
#[utoipa::path(
    get,
    path = "/api/v1/wallet",
    tag = "wallet",
    responses((status = 200, description = "The caller's wallet", body = Wallet)),
    security(("bearer_auth" = []))
)]
pub async fn get_wallet_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Wallet>, ApiError> {
    Ok(Json(state.wallets.get_wallet(caller.user_id).await?))
}

/// GET /wallet/transactions - Newest first
#[utoipa::path(
    get,
    path = "/api/v1/wallet/transactions",
    tag = "wallet",
    params(PageQuery),
    responses((status = 200, description = "Ledger entries", body = [Transaction])),
    security(("bearer_auth" = []))
)]
pub async fn list_transactions_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let page = Page::new(query.limit, query.offset);
    Ok(Json(state.wallets.list_transactions(caller.user_id, page).await?))
}

/// POST /wallet/transfer - Deposit into or withdraw from the caller's wallet
#[utoipa::path(
    post,
    path = "/api/v1/wallet/transfer",
    tag = "wallet",
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Transfer recorded", body = TransferReceipt),
        (status = 400, description = "Invalid amount or insufficient balance")
    ),
    security(("bearer_auth" = []))
)]
pub async fn transfer_handler(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Caller>,
    JsonBody(req): JsonBody<TransferRequest>,
) -> Result<Json<TransferReceipt>, ApiError> {
    Ok(Json(state.wallets.transfer(caller.user_id, req).await?))
}
