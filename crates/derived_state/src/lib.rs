//! Derived state: cached results of domain access functions with loading
//! and error flags, refreshed on demand.

pub mod derived;
pub mod hooks;
pub mod version;

pub use derived::{Derived, LoadState, Snapshot};
pub use hooks::{ecowatt_hook, payments_hook, reviews_hook, EcowattHook};
pub use version::AppVersion;
