pub mod args;
pub mod dispatcher;
pub mod handlers;


pub use args::{Cli, Commands};
pub use dispatcher::dispatch;
