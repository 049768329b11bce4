//! `loom completion` -- generate shell completions.
//!
//! Uses `clap_complete` to generate shell completion scripts for Bash, Zsh,
//! Fish, and PowerShell.

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::{Cli, CompletionArgs, CompletionCommands};

pub fn run(args: CompletionArgs) {
    let shell = match args.shell {
        CompletionCommands::Bash => Shell::Bash,
        CompletionCommands::Zsh => Shell::Zsh,
        CompletionCommands::Fish => Shell::Fish,
        CompletionCommands::Powershell => Shell::PowerShell,
    };

    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "loom", &mut std::io::stdout());
}
