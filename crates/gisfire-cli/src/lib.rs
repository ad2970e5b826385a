pub mod cli;
pub mod config;
pub mod manifest;

pub use cli::{
    build_cli_command, ApiArgs, Cli, Commands, ExampleFiles, FillCommands, LearnCommands,
    MatchArgs,
};
pub use config::GisfireConfig;
