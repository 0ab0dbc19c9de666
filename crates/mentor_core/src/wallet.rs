//! crates/mentor_core/src/wallet.rs
//!
//! The wallet ledger. Balances only move through `transfer`, which records a
//! completed transaction and derives the new balance from it.

use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    Page, Transaction, TransferKind, TransferReceipt, TransferRequest, Wallet, MAX_AMOUNT,
};
use crate::ports::{PortError, PortResult, WalletStore};

/// Amounts are currency-denominated with cent precision.
pub const AMOUNT_SCALE: u32 = 2;
pub const MAX_DESCRIPTION_LEN: usize = 255;

/// Computes the balance after a transfer, refusing to overdraw or to grow the
/// balance past [`MAX_AMOUNT`].
///
/// Stores call this while holding the wallet lock so the check and the write
/// see the same balance.
pub fn settle(balance: Decimal, kind: TransferKind, amount: Decimal) -> PortResult<Decimal> {
    match kind {
        TransferKind::Deposit => balance
            .checked_add(amount)
            .filter(|total| *total < MAX_AMOUNT)
            .ok_or_else(|| PortError::validation("deposit would exceed the maximum wallet balance")),
        TransferKind::Withdraw if amount > balance => Err(PortError::InsufficientBalance {
            available: balance,
            requested: amount,
        }),
        TransferKind::Withdraw => balance
            .checked_sub(amount)
            .ok_or_else(|| PortError::validation("withdrawal amount is out of range")),
    }
}

fn validate_transfer(request: &TransferRequest) -> PortResult<()> {
    if request.amount <= Decimal::ZERO {
        return Err(PortError::validation("amount must be greater than zero"));
    }
    if request.amount >= MAX_AMOUNT {
        return Err(PortError::Validation(format!("amount must be less than {}", MAX_AMOUNT)));
    }
    if request.amount.normalize().scale() > AMOUNT_SCALE {
        return Err(PortError::Validation(format!(
            "amount supports at most {} decimal places",
            AMOUNT_SCALE
        )));
    }
    if let Some(description) = &request.description {
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(PortError::validation("description is too long"));
        }
    }
    Ok(())
}

#[derive(Clone)]
pub struct WalletLedger {
    wallets: Arc<dyn WalletStore>,
}

impl WalletLedger {
    pub fn new(wallets: Arc<dyn WalletStore>) -> Self {
        Self { wallets }
    }

    pub async fn get_wallet(&self, user_id: Uuid) -> PortResult<Wallet> {
        self.wallets.wallet_for_user(user_id).await
    }

    pub async fn list_transactions(&self, user_id: Uuid, page: Page) -> PortResult<Vec<Transaction>> {
        let wallet = self.wallets.wallet_for_user(user_id).await?;
        self.wallets.list_transactions(wallet.id, page).await
    }

    pub async fn transfer(&self, user_id: Uuid, request: TransferRequest) -> PortResult<TransferReceipt> {
        validate_transfer(&request)?;
        let receipt = self.wallets.apply_transfer(user_id, &request).await?;
        info!(
            %user_id,
            transaction_id = %receipt.transaction.id,
            kind = %receipt.transaction.kind,
            amount = %receipt.transaction.amount,
            new_balance = %receipt.new_balance,
            "Transfer completed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn deposit_adds() {
        assert_eq!(settle(dec("10.00"), TransferKind::Deposit, dec("2.50")).unwrap(), dec("12.50"));
    }

    #[test]
    fn withdraw_of_entire_balance_is_allowed() {
        assert_eq!(settle(dec("10.00"), TransferKind::Withdraw, dec("10.00")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn overdraw_is_refused() {
        let err = settle(dec("10.00"), TransferKind::Withdraw, dec("10.01")).unwrap_err();
        assert!(matches!(err, PortError::InsufficientBalance { .. }));
    }

    #[test]
    fn non_positive_and_sub_cent_amounts_are_invalid() {
        let request = |amount: &str| TransferRequest {
            amount: dec(amount),
            kind: TransferKind::Deposit,
            description: None,
        };
        assert!(validate_transfer(&request("0")).is_err());
        assert!(validate_transfer(&request("-1")).is_err());
        assert!(validate_transfer(&request("0.001")).is_err());
        assert!(validate_transfer(&request("0.010")).is_ok());
        assert!(validate_transfer(&request("25.00")).is_ok());
    }

    #[test]
    fn amounts_must_stay_below_the_cap() {
        let request = |amount: &str| TransferRequest {
            amount: dec(amount),
            kind: TransferKind::Deposit,
            description: None,
        };
        assert!(validate_transfer(&request("999999999999.99")).is_ok());
        assert!(validate_transfer(&request("1000000000000")).is_err());
        assert!(validate_transfer(&request("79228162514264337593543950335")).is_err());
    }

    #[test]
    fn oversized_deposit_is_refused_without_panicking() {
        let err = settle(Decimal::ONE, TransferKind::Deposit, Decimal::MAX).unwrap_err();
        assert!(matches!(err, PortError::Validation(_)));

        let near_cap = dec("999999999999.00");
        assert_eq!(
            settle(near_cap, TransferKind::Deposit, dec("0.99")).unwrap(),
            dec("999999999999.99")
        );
        assert!(settle(near_cap, TransferKind::Deposit, dec("1.00")).is_err());
    }
}
