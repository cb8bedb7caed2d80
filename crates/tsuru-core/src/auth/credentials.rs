use std::io::{self, BufRead, IsTerminal};

use tracing::debug;

use super::AuthError;

/// Line-oriented input the commands read passwords and answers from.
///
/// Masking depends on whether the input is an interactive terminal, so the
/// capability is injectable and tests can drive it with in-memory input.
pub trait Prompt {
    fn is_interactive(&self) -> bool;

    /// Read one line with terminal echo disabled.
    ///
    /// Echo must be enabled again when this returns, whether the read
    /// succeeded or not.
    fn read_masked(&mut self) -> io::Result<String>;

    /// Read the next line and return its first whitespace-delimited word.
    fn read_word(&mut self) -> io::Result<String>;
}

/// Process stdin. Masked reads go through `rpassword`, which restores the
/// terminal mode when its read guard drops.
#[derive(Debug, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn read_masked(&mut self) -> io::Result<String> {
        rpassword::read_password()
    }

    fn read_word(&mut self) -> io::Result<String> {
        first_word(&mut io::stdin().lock())
    }
}

/// Non-interactive prompt over any buffered reader (pipes, files, tests).
pub struct BufReadPrompt<R> {
    reader: R,
}

impl<R: BufRead> BufReadPrompt<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Prompt for BufReadPrompt<R> {
    fn is_interactive(&self) -> bool {
        false
    }

    fn read_masked(&mut self) -> io::Result<String> {
        self.read_word()
    }

    fn read_word(&mut self) -> io::Result<String> {
        first_word(&mut self.reader)
    }
}

fn first_word(reader: &mut dyn BufRead) -> io::Result<String> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    Ok(line.split_whitespace().next().unwrap_or_default().to_string())
}

/// Read a password, masked when the input is a terminal.
pub fn read_password(prompt: &mut dyn Prompt) -> Result<String, AuthError> {
    let password = if prompt.is_interactive() {
        prompt.read_masked()?
    } else {
        debug!("Input is not a terminal, reading password without masking");
        prompt.read_word()?
    };

    if password.is_empty() {
        return Err(AuthError::EmptyPassword);
    }
    Ok(password)
}
