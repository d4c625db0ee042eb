//! Turn coordination, per-session gating, and orchestration.

pub mod config;
pub mod coordinator;
pub mod gate;
pub mod manager;

pub use config::CoordinationConfig;
pub use coordinator::TurnCoordinator;
pub use gate::SessionGate;
pub use manager::SessionManager;
