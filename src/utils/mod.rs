pub mod encoding;
pub mod logging;
pub mod time;
