pub mod check_config;
pub mod replay;

pub use check_config::handle_check_config;
pub use replay::handle_replay;
