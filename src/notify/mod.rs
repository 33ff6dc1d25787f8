//! Ledger notifications
//!
//! The ledger publishes value-typed events; audit logging, dashboards and
//! anything else that cares subscribes independently. A subscriber that goes
//! away is dropped on the next publish and never affects ledger state.

pub mod events;
pub mod notifier;

pub use events::LedgerEvent;
pub use notifier::Notifier;
