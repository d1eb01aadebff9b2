use std::io::{self, BufRead, Write};

use crate::api::{Notice, Prompt};

/// Prompt that asks on stdout and reads the answer from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> bool {
        let mut stdout = io::stdout();
        if write!(stdout, "{} [y/N] ", message)
            .and_then(|_| stdout.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }

        is_affirmative(&answer)
    }

    fn notice(&self, notice: Notice) {
        if notice.is_failure() {
            eprintln!("{}", notice.message());
        } else {
            println!("{}", notice.message());
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[test]
fn only_explicit_yes_confirms() {
    assert!(is_affirmative("y\n"));
    assert!(is_affirmative(" YES "));
    assert!(!is_affirmative("\n"));
    assert!(!is_affirmative("no"));
    assert!(!is_affirmative("sure"));
}
