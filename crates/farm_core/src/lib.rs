//! # Farm Core
//!
//! Deterministic simulation core for an incremental farm game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No wall clock (every operation takes the current [`Timestamp`](math::Timestamp))
//! - No floating-point duration math (uses fixed-point minutes)
//!
//! This separation enables:
//! - Offline catch-up that gives the same result for any split of the elapsed time
//! - Snapshot save/restore with load-time repair
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`resource`] - Growth, production and spoilage of one crop or animal
//! - [`farm`] - The farm aggregate: plots, workers, tasks, inventory
//! - [`production`] - Planting, harvesting and plot upgrades
//! - [`shop`] - Buying seeds and livestock, selling goods
//! - [`scheduler`] - Worker/task scheduling
//! - [`reconcile`] - Offline-time reconciliation
//! - [`snapshot`] - Snapshot encoding and repair
//! - [`math`] - Fixed-point time math

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod error;
pub mod farm;
pub mod ids;
pub mod inventory;
pub mod kind;
pub mod math;
pub mod plot;
pub mod production;
pub mod reconcile;
pub mod resource;
pub mod scheduler;
pub mod shop;
pub mod snapshot;
pub mod task;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{BundleOffer, GameConfig, InitialResources, ProduceConfig};
    pub use crate::error::{FarmError, Result};
    pub use crate::farm::Farm;
    pub use crate::ids::{EntityId, PlotId, TaskId, WorkerId};
    pub use crate::inventory::Inventory;
    pub use crate::kind::{AnimalKind, CropKind, ResourceKind};
    pub use crate::math::{EquipmentBonus, Fixed, Timestamp};
    pub use crate::plot::{Plot, PlotStatus};
    pub use crate::production::Production;
    pub use crate::reconcile::{ReconcileReport, Reconciler};
    pub use crate::resource::{LifeState, ResourceEntity};
    pub use crate::scheduler::{Scheduler, TickReport};
    pub use crate::shop::{SaleReport, Shop};
    pub use crate::snapshot::{FarmSnapshot, RepairReport, SNAPSHOT_VERSION};
    pub use crate::task::{Task, TaskKind, TaskStatus, Worker, WorkerStatus};
}
