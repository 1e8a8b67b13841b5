//! Plan model, assembly orchestration, mutation, and the service layer.

pub mod assemble;
pub mod mutate;
pub mod normalize;
pub mod service;
pub mod types;

pub use assemble::{assemble, generate_single_post, AssembleConfig};
pub use mutate::{edit_field, replace_post, InFlightSlots, MutateError, PostField, SlotKey};
pub use normalize::{normalize_hashtags, normalize_post, renumber_weeks};
pub use service::{PlanError, PlanOutcome, PlanService};
pub use types::{
    ContentPlan, PlanRequest, Post, PracticeProfile, RequestValidationError, WeekPlan,
};
