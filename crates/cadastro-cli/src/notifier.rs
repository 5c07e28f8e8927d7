//! Terminal notifications and confirmations

use cadastro::Notifier;
use colored::Colorize;
use dialoguer::Confirm;

pub struct TerminalNotifier {
    /// Answer every confirmation with yes (`--yes`)
    assume_yes: bool,
}

impl TerminalNotifier {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Notifier for TerminalNotifier {
    fn notify_error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message.red());
    }

    fn notify_info(&self, message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        // A prompt that cannot be shown (no TTY) counts as "no"
        Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}
