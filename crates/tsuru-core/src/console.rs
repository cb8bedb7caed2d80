//! Terminal I/O handed to commands: where output goes and where input comes from.

use std::io::{self, Write};

use crate::auth::Prompt;

pub struct Console<'a> {
    pub out: &'a mut (dyn Write + Send),
    pub input: &'a mut (dyn Prompt + Send),
}

impl<'a> Console<'a> {
    pub fn new(out: &'a mut (dyn Write + Send), input: &'a mut (dyn Prompt + Send)) -> Self {
        Self { out, input }
    }

    /// Write a prompt without a trailing newline and flush it
    pub fn prompt(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }
}
