//! The `mathmate` command line: inspects what an editor session sees at a
//! position of a document and replays key presses on it.

mod args;
mod utils;
mod cmd {
    pub mod inspect;
    pub mod replay;
}

use clap::Parser;
use futures::executor::block_on;
use mathmate_std::error::prelude::*;

use crate::args::{CliArguments, Commands};
use crate::cmd::*;

/// The main entry point.
fn main() -> Result<()> {
    let args = CliArguments::parse();

    // Starts logging
    let _ = {
        use log::LevelFilter::*;

        let level = if args.verbose { Debug } else { Info };
        env_logger::builder()
            .filter_module("mathmate", level)
            .filter_module("mathmate_analysis", level)
            .filter_module("mathmate_query", level)
            .parse_default_env()
            .try_init()
    };

    let config = utils::load_config(args.config.as_deref())?;
    match args.command {
        Commands::Region(args) => inspect::region_main(args),
        Commands::Brackets(args) => block_on(inspect::brackets_main(args)),
        Commands::Symbols(args) => inspect::symbols_main(args),
        Commands::Trigger(args) => inspect::trigger_main(args, config),
        Commands::Replay(args) => block_on(replay::replay_main(args, config)),
    }
}
