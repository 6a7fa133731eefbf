pub mod chat;
pub mod frame;
pub mod service;
pub mod session;

pub use chat::*;
pub use frame::*;
pub use service::*;
pub use session::*;
