//! `aiopsctl completion <shell>`
//!
//! Completes subcommands (`run`, `get modules`, `describe module`) and flags;
//! module names are not completed since the registry is built at runtime.

use anyhow::Result;
use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell as ClapShell};
use std::io::{self, Write};

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl From<Shell> for ClapShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => ClapShell::Bash,
            Shell::Zsh => ClapShell::Zsh,
            Shell::Fish => ClapShell::Fish,
            Shell::Powershell => ClapShell::PowerShell,
        }
    }
}

/// Script goes to stdout so it can be redirected; the hint goes to stderr
pub fn execute(shell: Shell) -> Result<()> {
    write_script(shell, &mut io::stdout())?;
    eprintln!("\n{}", install_hint(shell));
    Ok(())
}

/// Render the completion script for `shell` into `out`
pub fn write_script(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let bin = cmd.get_name().to_string();
    generate(ClapShell::from(shell), &mut cmd, bin, out);
    out.flush()?;
    Ok(())
}

pub fn install_hint(shell: Shell) -> &'static str {
    match shell {
        Shell::Bash => "# Load now with: source <(aiopsctl completion bash)",
        Shell::Zsh => "# Save to a dir on $fpath: aiopsctl completion zsh > \"${fpath[1]}/_aiopsctl\", then restart the shell",
        Shell::Fish => "# Save with: aiopsctl completion fish > ~/.config/fish/completions/aiopsctl.fish",
        Shell::Powershell => "# Add to $PROFILE: aiopsctl completion powershell | Out-String | Invoke-Expression",
    }
}
