use std::process::ExitCode;
use clap::Parser as ClapParser;
use tinyjs::Config;

fn main() -> ExitCode {
    let config: Config = Config::parse();

    match tinyjs::run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        },
    }
}
