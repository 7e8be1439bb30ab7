//! `idl <url-list>` – download everything in the list into the current directory.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use idl_core::logging;
use idl_core::pipeline::{self, RunError};

use super::{Cli, EXIT_INPUT, EXIT_OK, EXIT_RUN, EXIT_USAGE};

fn print_usage() {
    println!("This program expects one parameter, a name of a file (incl. path if necessary)");
    println!("containing the links to the image files, one link per line.");
    println!();
    println!("{}", Cli::command().render_usage());
}

/// Runs the CLI and returns the process exit code.
pub fn run_from_args() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_OK,
                _ => EXIT_USAGE,
            };
        }
    };

    let Some(url_list) = cli.url_list.clone() else {
        print_usage();
        return EXIT_USAGE;
    };

    let cfg = match cli.load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("idl error: {:#}", e);
            return EXIT_USAGE;
        }
    };

    if let Err(e) = logging::init_logging(&cfg.log_level, cfg.log_file.as_deref()) {
        logging::init_logging_stderr(&cfg.log_level);
        tracing::warn!("log file unavailable, logging to stderr: {:#}", e);
    }
    tracing::debug!("loaded config: {:?}", cfg);

    let download_dir = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::error!("cannot determine current directory: {}", e);
            return EXIT_RUN;
        }
    };

    match pipeline::run_list(cfg, &url_list, &download_dir) {
        Ok(_) => EXIT_OK,
        Err(RunError::Input(e)) => {
            tracing::error!("{}", e);
            EXIT_INPUT
        }
        Err(e) => {
            tracing::error!("{:#}", anyhow::Error::from(e));
            EXIT_RUN
        }
    }
}
