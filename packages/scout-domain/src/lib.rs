pub mod filters;
pub mod promotions;
pub mod registry;
pub mod time_serde;
pub mod tokens;

pub use filters::{ActiveFilter, FilterOperator};
pub use promotions::{MatchType, PromotedItem, PromotionRule};
pub use registry::{Registration, Registry, RegistryEntry};
pub use tokens::TokenContext;
