//! Till point-of-sale command line

use std::{io, process::ExitCode};

use tracing::error;

use till::{
    cli::{Cli, run},
    logging::init_subscriber,
};

fn main() -> ExitCode {
    let cli = match Cli::load() {
        Ok(cli) => cli,
        Err(error) => {
            // Help and version requests land here too
            _ = error.print();

            return if error.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Err(error) = init_subscriber(&cli.config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized, must use eprintln for subscriber errors"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    let mut stdout = io::stdout().lock();

    match run(cli, &mut stdout) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "command failed");

            #[expect(clippy::print_stderr, reason = "user-facing error summary")]
            {
                eprintln!("Error: {error}");
            }

            ExitCode::FAILURE
        }
    }
}
