//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use mentor_core::{
    AccountService, CommunityService, ContentService, DashboardService, Notifier, SessionLedger,
    Store, TokenService, WalletLedger,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub sessions: SessionLedger,
    pub wallets: WalletLedger,
    pub notifier: Notifier,
    pub content: ContentService,
    pub community: CommunityService,
    pub dashboard: DashboardService,
}

impl AppState {
    /// Wires every service onto one backing store.
    pub fn new<S>(store: Arc<S>, tokens: TokenService) -> Self
    where
        S: Store + 'static,
    {
        let notifier = Notifier::new(store.clone());
        Self {
            accounts: AccountService::new(store.clone(), tokens),
            sessions: SessionLedger::new(store.clone(), notifier.clone()),
            wallets: WalletLedger::new(store.clone()),
            notifier,
            content: ContentService::new(store.clone()),
            community: CommunityService::new(store.clone()),
            dashboard: DashboardService::new(store),
        }
    }
}
