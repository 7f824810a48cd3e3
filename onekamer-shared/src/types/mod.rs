pub mod api;
pub mod auth;
pub mod feed;
pub mod notification;
pub mod pagination;

pub use api::*;
pub use auth::*;
pub use feed::*;
pub use notification::*;
pub use pagination::*;
