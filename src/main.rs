//! Kodegen Bundler Cross - cross-compile and package Fyne applications.
//!
//! Each target architecture is built in its own Docker or Podman container.

use kodegen_bundler_cross::cli::{self, Args, OutputManager};
use std::process;

#[tokio::main]
async fn main() {
    let args = Args::parse_args();

    let default_filter = if args.debug_requested() {
        "kodegen_bundler_cross=debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match cli::execute_command(args).await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            OutputManager::new(false).failure("Fatal error", &e);
            process::exit(1);
        }
    }
}
