//! 命令定义和实现

pub mod capture;
pub mod config;

pub use capture::CaptureCommand;
pub use config::ConfigCommand;
