pub mod auth_user;
pub mod entity_id;
pub mod json;
pub mod pagination;
pub mod query;

pub use auth_user::{AuthUser, MaybeAuthUser};
pub use entity_id::EntityId;
pub use json::JsonBody;
pub use pagination::{PageRequest, PaginationMeta};
pub use query::QueryParams;
