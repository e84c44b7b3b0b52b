use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{debug, LevelFilter};
use transfer_access_acctest::acctest::fixtures::{random_with_prefix, RESOURCE_PREFIX};
use transfer_access_acctest::acctest::Fixture;
use transfer_access_acctest::api;

mod output;

use output::{note, output_json, output_line, warn, IdParts};

#[derive(Parser, Debug)]
#[command(name = "transfer-access", version, about = "Work with AWS Transfer Family access mappings")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// AWS region to call; defaults to the standard provider chain
    #[arg(long, env = "AWS_REGION", global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse or build `SERVER-ID/EXTERNAL-ID` identifiers
    Id {
        #[command(subcommand)]
        command: IdCommand,
    },
    /// Look an access mapping up live
    Describe {
        /// Composite ID `SERVER-ID/EXTERNAL-ID`
        id: String,
        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Verify no access mapping recorded in a terraform working directory still exists
    CheckDestroy {
        /// Initialized terraform working directory
        #[arg(long)]
        terraform_dir: PathBuf,
        /// Terraform binary
        #[arg(long, env = "TF_ACC_TERRAFORM_PATH", default_value = "terraform")]
        terraform_bin: String,
    },
    /// Print one of the acceptance test configurations
    Render {
        /// Fixture name, e.g. s3-basic
        fixture: Fixture,
        /// Name given to the generated resources
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
enum IdCommand {
    /// Split an ID into its parts and print them as JSON
    Parse { id: String },
    /// Join a server ID and an external ID
    Format {
        #[arg(long)]
        server_id: String,
        #[arg(long)]
        external_id: String,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    debug!("Running {:?}", cli.command);

    match cli.command {
        Command::Id {
            command: IdCommand::Parse { id },
        } => {
            let id = api::parse_access_id(&id)?;
            output_json(
                &IdParts {
                    server_id: id.server_id(),
                    external_id: id.external_id(),
                },
                false,
            )
        }
        Command::Id {
            command:
                IdCommand::Format {
                    server_id,
                    external_id,
                },
        } => output_line(&api::format_access_id(&server_id, &external_id)?),
        Command::Describe { id, pretty } => {
            let record = api::describe_access(&id, cli.region).await?;
            output_json(&record, pretty)
        }
        Command::CheckDestroy {
            terraform_dir,
            terraform_bin,
        } => {
            let count = api::check_destroy(&terraform_bin, &terraform_dir, cli.region).await?;
            if count == 0 {
                warn("no aws_transfer_access resources found in state");
            } else {
                note(&format!("{count} Transfer Access mappings destroyed"));
            }
            Ok(())
        }
        Command::Render { fixture, name } => {
            let name = name.unwrap_or_else(|| random_with_prefix(RESOURCE_PREFIX));
            debug!("Rendering {fixture} for {name}");
            output_line(&fixture.render(&name))
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            note(&format!("error: {e:#}"));
            ExitCode::FAILURE
        }
    }
}
