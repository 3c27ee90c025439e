// imgprep/src/cli/interactive.rs
//! Prompt chain for picking a directory and naming prefix.
//!
//! `Session` is a plain state machine fed one answer at a time, so it can
//! be driven from a terminal by `run_session` or directly from tests.

use crate::core::{Result, RunConfig};
use crate::processors::ProcessingTarget;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Select,
    Confirm { target: usize },
    Prefix { target: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    NoTargets,
    InvalidSelection,
    Declined,
    InputClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Run(RunConfig),
    Cancelled(CancelReason),
}

pub struct Session<'a> {
    targets: &'a [ProcessingTarget],
    step: Step,
}

impl<'a> Session<'a> {
    pub fn new(targets: &'a [ProcessingTarget]) -> Self {
        Self {
            targets,
            step: Step::Select,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn prompt(&self) -> &'static str {
        match self.step {
            Step::Select => "\nEnter option number: ",
            Step::Confirm { .. } => "Continue? (Y/N): ",
            Step::Prefix { .. } => {
                "Image name prefix (e.g. Blog, leave empty to skip renaming): "
            }
        }
    }

    /// Feeds one line of input. Returns the outcome once the chain is over.
    pub fn answer(&mut self, input: &str) -> Option<SessionOutcome> {
        match self.step {
            Step::Select => match parse_selection(input, self.targets.len()) {
                Some(target) => {
                    self.step = Step::Confirm { target };
                    None
                }
                None => Some(SessionOutcome::Cancelled(CancelReason::InvalidSelection)),
            },
            Step::Confirm { target } => {
                if is_confirmed(input) {
                    self.step = Step::Prefix { target };
                    None
                } else {
                    Some(SessionOutcome::Cancelled(CancelReason::Declined))
                }
            }
            Step::Prefix { target } => Some(SessionOutcome::Run(RunConfig::new(
                self.targets[target].path.clone(),
                parse_prefix(input),
            ))),
        }
    }
}

/// 1-based menu choice to index.
pub fn parse_selection(input: &str, options: usize) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|&n| n >= 1 && n <= options)
        .map(|n| n - 1)
}

pub fn is_confirmed(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

pub fn parse_prefix(input: &str) -> Option<String> {
    let prefix = input.trim();
    (!prefix.is_empty()).then(|| prefix.to_string())
}

/// Drives a `Session` over a line reader, echoing the menu to `out`.
pub fn run_session<R, W>(
    targets: &[ProcessingTarget],
    mut input: R,
    out: &mut W,
) -> Result<SessionOutcome>
where
    R: BufRead,
    W: Write,
{
    if targets.is_empty() {
        writeln!(out, "No directories containing images were found")?;
        return Ok(SessionOutcome::Cancelled(CancelReason::NoTargets));
    }

    writeln!(out, "Select a directory to process:")?;
    for (index, target) in targets.iter().enumerate() {
        writeln!(out, "{}. {}", index + 1, target.label)?;
    }

    let mut session = Session::new(targets);
    loop {
        write!(out, "{}", session.prompt())?;
        out.flush()?;

        // undecodable bytes count as an invalid answer, not an I/O failure
        let mut raw = Vec::new();
        if input.read_until(b'\n', &mut raw)? == 0 {
            writeln!(out)?;
            return Ok(SessionOutcome::Cancelled(CancelReason::InputClosed));
        }

        let line = String::from_utf8_lossy(&raw);
        let outcome = session.answer(&line);
        match (&outcome, session.step()) {
            (None, Step::Confirm { target }) => {
                writeln!(out, "\nAbout to process: {}", targets[target].label)?;
            }
            (Some(SessionOutcome::Cancelled(CancelReason::InvalidSelection)), _) => {
                writeln!(out, "Invalid selection")?;
            }
            (Some(SessionOutcome::Cancelled(CancelReason::Declined)), _) => {
                writeln!(out, "Cancelled")?;
            }
            (Some(SessionOutcome::Run(run)), _) => match &run.prefix {
                Some(prefix) => writeln!(out, "Using prefix: {}", prefix)?,
                None => writeln!(out, "No prefix given, files will not be renamed")?,
            },
            _ => {}
        }

        if let Some(outcome) = outcome {
            return Ok(outcome);
        }
    }
}
