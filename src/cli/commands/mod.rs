//! Platform commands and their execution.
//!
//! Every platform command goes through the same lifecycle: `parse` validates
//! its arguments and builds one container image per target architecture,
//! `run` drives the build pipeline over those images.

mod linux;

pub use linux::{LINUX_ARCH_SUPPORTED, LinuxCommand, LinuxFlags};

use crate::cli::{Args, Command, OutputManager};
use crate::error::{CliError, CrossError, Result};
use crate::pipeline::BuildOutcome;
use handlebars::Handlebars;
use serde::Serialize;

const USAGE_TEMPLATE: &str = "
Usage: {{bin}} {{name}} [options] [package]

{{description}}

Options:
{{options}}";

/// CLI lifecycle of a platform command.
#[allow(async_fn_in_trait)]
pub trait PlatformCommand {
    /// Command name
    fn name(&self) -> &'static str;

    /// One line description
    fn description(&self) -> &'static str;

    /// Parses the command arguments and prepares the build images.
    fn parse(&mut self, args: &[String]) -> Result<()>;

    /// Builds every prepared target.
    async fn run(&self) -> Result<Vec<BuildOutcome>>;

    /// Help for the command's options
    fn options_help(&self) -> String;

    /// Full usage text
    fn usage(&self) -> Result<String> {
        render_usage(self.name(), self.description(), &self.options_help())
    }
}

#[derive(Serialize)]
struct UsageData<'a> {
    bin: &'a str,
    name: &'a str,
    description: &'a str,
    options: &'a str,
}

/// Renders the usage text shared by all platform commands.
pub fn render_usage(name: &str, description: &str, options: &str) -> Result<String> {
    let mut registry = Handlebars::new();
    registry.register_escape_fn(handlebars::no_escape);
    let data = UsageData {
        bin: env!("CARGO_PKG_NAME"),
        name,
        description,
        options,
    };
    Ok(registry.render_template(USAGE_TEMPLATE, &data)?)
}

/// Execute the platform command selected on the command line
pub async fn execute_command(args: Args) -> Result<i32> {
    log::debug!("{} {:?}", args.command.name(), args.command.args());
    match &args.command {
        Command::Linux { args: raw } => execute_platform(LinuxCommand::new(), raw).await,
    }
}

async fn execute_platform<C: PlatformCommand>(mut command: C, raw: &[String]) -> Result<i32> {
    let output = OutputManager::new(false);
    let headline = format!("Command '{}' failed", command.name());

    match command.parse(raw) {
        Ok(()) => {}
        Err(CrossError::Cli(CliError::UsageRequested)) => {
            output.usage(&command.usage()?)?;
            return Ok(0);
        }
        Err(e @ CrossError::Cli(CliError::InvalidArguments { .. })) => {
            output.error(&e.to_string());
            output.usage(&command.usage()?)?;
            return Ok(1);
        }
        Err(e) => {
            output.failure(&headline, &e);
            return Ok(1);
        }
    }

    match command.run().await {
        Ok(outcomes) => {
            output.summary(&outcomes)?;
            Ok(0)
        }
        Err(e) => {
            output.failure(&headline, &e);
            Ok(1)
        }
    }
}
