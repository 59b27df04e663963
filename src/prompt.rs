//! Interactive questions on a line-oriented terminal
//!
//! End of input answers with the default, so piping a short script into
//! `create` works the same as pressing enter at every question.

use std::io::{self, BufRead, Stdout, StdinLock, Write};

use anyhow::{bail, Context, Result};
use console::style;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Free-form answer, `default` on empty input or EOF
    pub fn text(&mut self, question: &str, default: &str) -> Result<String> {
        let answer = self.ask(&format!("{} [{}]", question, default))?;
        Ok(match answer {
            Some(answer) if !answer.is_empty() => answer,
            _ => default.to_string(),
        })
    }

    /// Answer that must not be empty; asks again until one is given
    pub fn required(&mut self, question: &str) -> Result<String> {
        loop {
            match self.ask(question)? {
                Some(answer) if !answer.is_empty() => return Ok(answer),
                Some(_) => writeln!(self.output, "{}", style("A value is required.").yellow())?,
                None => bail!("No answer given for: {}", question),
            }
        }
    }

    /// Yes/no question
    pub fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        let choices = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = match self.ask(&format!("{} [{}]", question, choices))? {
                Some(answer) => answer.to_lowercase(),
                None => return Ok(default),
            };
            match answer.as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "{}", style("Please answer y or n.").yellow())?,
            }
        }
    }

    /// Trimmed line, or `None` at end of input
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{} ", style(prompt).cyan().bold())?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Failed to read answer")?;
        if read == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
