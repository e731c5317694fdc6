//! Policy templates, policy groups, and model-point ingestion

mod data;
pub mod loader;

pub use data::{Policy, PolicyGroup, PremiumMode, ProductDescriptor, Sex, WHOLE_LIFE_TERM};
pub use loader::{load_policy_groups, load_policy_groups_from_reader, write_model_points};
