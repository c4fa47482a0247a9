use std::io::Write;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ct_recorder::SessionManager;
use tracing_subscriber::EnvFilter;

use ct_cli::commands::{annotate, attach, end, list, record, resume, start};
use ct_cli::{Cli, Commands, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout is reserved for command output
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let manager = SessionManager::new(config.recorder());
    let mut stdout = std::io::stdout().lock();
    let result = dispatch(&mut stdout, &manager, &config, cli.command).await;

    // Runs even when the command failed, so pending debounced work is settled.
    manager.close().await;
    stdout.flush()?;
    result
}

async fn dispatch(
    output: &mut impl Write,
    manager: &SessionManager,
    config: &Config,
    command: Option<Commands>,
) -> Result<()> {
    match command {
        Some(Commands::Start {
            session_id,
            project_path,
            save_path,
            output_format,
        }) => {
            start::run(
                output,
                manager,
                &session_id,
                &project_path,
                &save_path,
                &output_format,
            )
            .await
        }
        Some(Commands::End {
            session_id,
            save_path,
        }) => end::run(output, manager, &session_id, &save_path).await,
        Some(Commands::Annotate {
            session_id,
            save_path,
            note,
        }) => annotate::run(output, manager, &session_id, &save_path, &note).await,
        Some(Commands::RecordEdit {
            session_id,
            save_path,
            filename,
            line,
            col,
            line_count,
            changed_tick,
        }) => {
            let args = record::EditArgs {
                filename: &filename,
                line: &line,
                column: &col,
                line_count: &line_count,
                changed_tick: &changed_tick,
            };
            record::edit(manager, &session_id, &save_path, args).await
        }
        Some(Commands::RecordCursor {
            session_id,
            save_path,
            filename,
            line,
            col,
        }) => record::cursor(manager, &session_id, &save_path, &filename, &line, &col).await,
        Some(Commands::RecordTerminal {
            session_id,
            save_path,
            command,
        }) => record::terminal(manager, &session_id, &save_path, &command).await,
        Some(Commands::List { save_path }) => {
            let save_path = save_path.unwrap_or_else(|| config.save_path.clone());
            list::run(output, manager, &save_path)
        }
        Some(Commands::Resume {
            session_id,
            save_path,
        }) => resume::run(output, manager, &session_id, &save_path).await,
        Some(Commands::Attach {
            session_id,
            save_path,
        }) => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let applied = attach::run(output, manager, &session_id, &save_path, stdin).await?;
            tracing::debug!(applied, "detached");
            Ok(())
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
