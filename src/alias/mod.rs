//! Alias core: records, the store they live in, group visibility, and resolution.

pub mod filter;
pub mod group;
pub mod record;
pub mod resolver;
pub mod store;

pub use filter::{Filter, FilterConfig, FilterContext, FilterRule};
pub use group::visible;
pub use record::{AliasRecord, GLOBAL_GROUP};
pub use resolver::{Resolution, ResolveContext, Resolver};
pub use store::AliasStore;
