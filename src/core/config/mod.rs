pub mod data;
pub mod io;
pub mod printing;

pub use data::{path_display, ClipboardSection, Config, OpenAiSection, SessionSection};
pub use io::ConfigError;
