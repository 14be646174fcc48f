use clap::{Parser, Subcommand};

use super::PlanArgs;

#[derive(Parser, Debug)]
#[command(
    name = "payplan",
    about = "UK take-home pay, monthly budget and pension/ISA projection calculator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the JSON API.
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Print the full salary plan as JSON.
    Plan(PlanArgs),
}
