//! Connected Plant Care: a simulated houseplant monitoring service.
//!
//! Modules follow the Explicit Module Boundary Pattern (EMBP): each one
//! exposes a small surface and the binary only wires them together.
//! - `simulator` – synthetic readings, moisture status, history
//! - `orchestrator` – fleet state, the periodic tick, user actions
//! - `storage` / `schema` – persisted records over a key-value backend
//! - `alerts` / `settings` – page-level models
//! - `routes` – the HTTP surface
//! - `config` – environment configuration

pub mod alerts;
pub mod config;
pub mod models;
pub mod orchestrator;
pub mod routes;
pub mod schema;
pub mod settings;
pub mod simulator;
pub mod storage;

pub use config::Config;
pub use models::{Notification, Plant};
pub use orchestrator::{Orchestrator, Ticker};
pub use storage::PlantStore;
