use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "radiko-cli",
    about = "Resolve radiko live and timeshift playlist URLs",
    version
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the live stream manifest for a station
    Live {
        /// Station id (e.g. LFR)
        #[arg(short, long, default_value = "LFR")]
        id: String,
    },

    /// Resolve a timeshift manifest for a past program
    Timeshift {
        /// Station id (e.g. LFR)
        #[arg(short, long, default_value = "LFR")]
        id: String,

        /// An instant inside the program, JST, as YYYYMMDDhhmmss
        #[arg(short, long)]
        at: String,
    },
}
