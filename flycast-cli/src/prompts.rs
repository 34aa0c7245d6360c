use std::io::{self, BufRead, Write};

use colored::Colorize;

/// Interactive console over generic reader/writer pairs, so the whole flow
/// can be scripted in tests.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    pub fn warn(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message.yellow())
    }

    fn ask(&mut self, prompt: &str) -> io::Result<String> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed mid-session",
            ));
        }
        Ok(line.trim().to_string())
    }

    pub fn prompt_nonempty(&mut self, prompt: &str) -> io::Result<String> {
        loop {
            let value = self.ask(prompt)?;
            if !value.is_empty() {
                return Ok(value);
            }
            self.say("Please enter something.")?;
        }
    }

    /// Empty input means "skip".
    pub fn prompt_optional(&mut self, prompt: &str) -> io::Result<Option<String>> {
        let value = self.ask(prompt)?;
        Ok(if value.is_empty() { None } else { Some(value) })
    }

    pub fn prompt_yes_no(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        let suffix = if default { " [Y/n]: " } else { " [y/N]: " };
        loop {
            let value = self.ask(&format!("{prompt}{suffix}"))?.to_ascii_lowercase();
            match value.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }
}
