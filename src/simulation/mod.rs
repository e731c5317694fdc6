//! The monthly simulation state machine and its outputs

mod cashflows;
mod engine;
mod events;
mod premium;
mod state;

pub use cashflows::{period_cashflow, run_cashflows, CashFlow};
pub use engine::Simulation;
pub use events::{AccountChanges, EventRecord};
pub use premium::estimate_premiums;
pub use state::SimulationState;
