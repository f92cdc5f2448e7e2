mod cli;
mod config;
mod error;
mod session;

use std::io;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, TopologyCommand};
use crate::error::{exit_code, CliError};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    if cli.global.no_color {
        // miette respects NO_COLOR for its fancy reports.
        std::env::set_var("NO_COLOR", "1");
    }

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = config::load(&cli.global)?;
    let path = session::topology_path(&config)?;
    let topology = session::load_topology(&path)?;
    let stdout = io::stdout();

    match cli.command {
        Command::Run => {
            let mut session = session::Session::new(topology, &config)?;
            let stdin = io::stdin();
            session.repl(&mut stdin.lock(), &mut stdout.lock())
        }
        Command::Exec(args) => {
            let mut session = session::Session::new(topology, &config)?;
            session.exec(&args.device, &args.lines, &mut stdout.lock())?;
            if args.save {
                session::save_topology(&path, session.topology())?;
            }
            Ok(())
        }
        Command::Topology(TopologyCommand::Validate) => {
            let findings = session::validate(&topology);
            if findings.is_empty() {
                println!("topology ok");
                return Ok(());
            }
            for finding in &findings {
                println!("{finding}");
            }
            Err(CliError::Validation {
                field: "topology".into(),
                reason: format!("{} finding(s)", findings.len()),
            })
        }
        Command::Topology(TopologyCommand::Show) => {
            session::summarize(&topology, &mut stdout.lock())
        }
    }
}
