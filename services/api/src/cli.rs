use crate::inspect::{run_inspect, InspectArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use sscs_hearings::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "SSCS Hearings API",
    about = "Keep tribunal cases in step with the hearings management platform",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service and both listeners (default command)
    Serve(ServeArgs),
    /// Resolve the case transition for a saved hearing notification offline
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Inspect(args) => run_inspect(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["sscs-hearings-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn inspect_takes_a_file_and_optional_reason() {
        let cli = Cli::try_parse_from([
            "sscs-hearings-api",
            "inspect",
            "--file",
            "message.json",
            "--cancellation-reason",
            "withdraw",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Inspect(args)) => {
                assert_eq!(args.file.to_string_lossy(), "message.json");
                assert_eq!(args.cancellation_reason.as_deref(), Some("withdraw"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_accepts_host_and_port_overrides() {
        let cli = Cli::try_parse_from(["sscs-hearings-api", "serve", "--port", "8081"])
            .expect("parses");
        match cli.command {
            Some(Command::Serve(args)) => {
                assert_eq!(args.port, Some(8081));
                assert!(args.host.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
