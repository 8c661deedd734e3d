pub mod cli;

pub use cli::{BatchArgs, Cli, Commands, SolveArgs};
