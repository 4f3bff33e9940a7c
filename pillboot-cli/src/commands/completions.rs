//! Shell completion generation.

use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;

use crate::Cli;

/// Generate shell completions to stdout.
pub(crate) fn cmd_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generated(shell: Shell) -> String {
        let mut buf = Vec::new();
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_bash_completions_mention_binary() {
        assert!(generated(Shell::Bash).contains("pillboot"));
    }

    #[test]
    fn test_zsh_completions_mention_binary() {
        assert!(generated(Shell::Zsh).contains("pillboot"));
    }

    #[test]
    fn test_fish_completions_mention_binary() {
        assert!(generated(Shell::Fish).contains("pillboot"));
    }
}
