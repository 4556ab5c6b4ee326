pub mod location;
pub mod query_state;
pub mod resolver;
pub mod store;

pub use location::{ExpansionPlan, ExpansionStep, Location, location_to_plan};
pub use query_state::QueryState;
pub use resolver::{CapabilityResolver, ResolvedCapabilities};
pub use store::{NodeKind, TreeNode, TreeStore};
