pub mod accounts;
pub mod community;
pub mod content;
pub mod credentials;
pub mod dashboard;
pub mod domain;
pub mod notifications;
pub mod ports;
pub mod sessions;
pub mod wallet;

pub use accounts::AccountService;
pub use community::CommunityService;
pub use content::ContentService;
pub use credentials::{AuthError, Claims, TokenService};
pub use dashboard::DashboardService;
pub use domain::{Caller, Page, Role, Session, SessionPatch, SessionStatus, User, Wallet};
pub use notifications::Notifier;
pub use ports::{PortError, PortResult, Store};
pub use sessions::{CreateSessionRequest, SessionLedger};
pub use wallet::WalletLedger;
