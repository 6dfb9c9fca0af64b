pub mod chat_stream;
pub mod completion;
pub mod config;
pub mod context;
pub mod conversation;
pub mod credentials;
pub mod message;
pub mod scenario;
pub mod session;
pub mod text_wrapping;
