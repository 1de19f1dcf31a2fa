pub mod session;
pub mod session_tag;
pub mod user;

pub use session::{SessionRecord, SessionResponse, Status};
pub use user::UserResponse;
