//! `loom` -- agent-oriented issue tracker and workflow engine.
//!
//! Entry point: parses CLI arguments with clap, resolves the runtime
//! context, and dispatches to command handlers (spec.md §6).

mod cli;
mod commands;
mod context;
mod error;
mod fields;
mod output;

use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use cli::{Cli, Commands};
use context::RuntimeContext;
use error::CliError;

/// Tracks whether a Ctrl+C has already been received.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

fn main() {
    let _ = ctrlc::set_handler(|| {
        if CTRLC_RECEIVED.swap(true, Ordering::SeqCst) {
            std::process::exit(1);
        }
        std::process::exit(0);
    });

    let cli = Cli::parse();

    if cli.global.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("loom=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    let json = cli.global.json;
    let result = dispatch(cli);

    if let Err(e) = result {
        if json {
            let err_json = serde_json::json!({ "error": e.to_string() });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{s}");
            }
        } else {
            eprintln!("Error: {e}");
        }
        std::process::exit(e.exit_code());
    }
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }

        // Commands that don't require (or must not require) an existing
        // project.
        Some(Commands::Init(args)) => commands::init::run(&cli.global, args),
        Some(Commands::Completion(args)) => {
            commands::completion::run(args);
            Ok(())
        }
        Some(Commands::Serve(args)) => commands::serve::run(args),

        // Everything else operates on a discovered project.
        Some(command) => {
            let ctx = RuntimeContext::discover(&cli.global)?;
            match command {
                Commands::Install => commands::install::run(&ctx),
                Commands::Create(args) => commands::create::run(&ctx, args),
                Commands::Update(args) => commands::update::run(&ctx, args),
                Commands::Close(args) => commands::close::run(&ctx, args),
                Commands::Reopen(args) => commands::reopen::run(&ctx, args),
                Commands::Claim(args) => commands::claim::run(&ctx, args),
                Commands::Release(args) => commands::release::run(&ctx, args),
                Commands::ClaimNext(args) => commands::claim_next::run(&ctx, args),
                Commands::List(args) => commands::list::run(&ctx, args),
                Commands::Show(args) => commands::show::run(&ctx, args),
                Commands::Search(args) => commands::search::run(&ctx, args),
                Commands::Ready(args) => commands::ready::run(&ctx, args),
                Commands::Blocked(args) => commands::blocked::run(&ctx, args),
                Commands::CriticalPath => commands::critical_path::run(&ctx),
                Commands::Deps(args) => commands::deps::run(&ctx, args),
                Commands::Packs(args) => commands::packs::run(&ctx, args),
                Commands::Templates(args) => commands::templates::run(&ctx, args),
                Commands::Dashboard(args) => commands::dashboard::run(&ctx, args),
                Commands::Server(args) => commands::server::run(&ctx, args),
                Commands::Doctor => commands::doctor::run(&ctx),
                Commands::Init(_) | Commands::Completion(_) | Commands::Serve(_) => unreachable!(),
            }
        }
    }
}
