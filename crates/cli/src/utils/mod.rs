pub mod console;
pub mod logging;
