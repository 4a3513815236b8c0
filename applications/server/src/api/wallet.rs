/// Wallet API routes
use crate::{api::ApiJson, error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{extract::State, Json};
use remotejob_core::{Amount, StorageContext, Withdrawal};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Amount,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub amount: f64,
    pub crypto: String,
    pub address: String,
    pub pin: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawResponse {
    pub message: &'static str,
    pub wallet_balance: Amount,
}

/// GET /api/wallet
pub async fn get_wallet(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<BalanceResponse>> {
    let balance = app_state.wallet.balance(auth.user_id()).await?;
    Ok(Json(BalanceResponse { balance }))
}

/// POST /api/wallet/withdraw
pub async fn withdraw(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    ApiJson(req): ApiJson<WithdrawRequest>,
) -> Result<Json<WithdrawResponse>> {
    let amount = Amount::from_major(req.amount)?;

    let withdrawal = app_state
        .wallet
        .withdraw(auth.user_id(), amount, &req.crypto, &req.address, &req.pin)
        .await?;

    Ok(Json(WithdrawResponse {
        message: "Withdrawal processed",
        wallet_balance: withdrawal.balance_after,
    }))
}

/// GET /api/wallet/withdrawals
pub async fn list_withdrawals(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Vec<Withdrawal>>> {
    Ok(Json(app_state.db.get_withdrawals(auth.user_id()).await?))
}
