/// Line-based terminal input

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::rating::DecisionInput;
use crate::state::data::ImageSet;
use crate::state::outcome::Decision;
use crate::state::schedule::{Pair, Progress};

const HELP: &str = "[l] left is better  [r] right is better  [x] reject left  [y] reject right  [s] save and quit  [e] end now";

/// Map one line of user input to a decision
pub fn parse_decision(input: &str) -> Option<Decision> {
    match input.trim().to_ascii_lowercase().as_str() {
        "l" | "left" | "1" => Some(Decision::LeftBetter),
        "r" | "right" | "2" => Some(Decision::RightBetter),
        "x" | "rl" => Some(Decision::RejectLeft),
        "y" | "rr" => Some(Decision::RejectRight),
        "s" | "q" | "save" => Some(Decision::SaveAndQuit),
        "e" | "end" => Some(Decision::EndNow),
        _ => None,
    }
}

/// Line-based decision input over any reader/writer pair
pub struct TerminalInput<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalInput<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Ask a yes/no question; anything but y/yes counts as no
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        write!(self.writer, "{} [y/N] ", question)?;
        self.writer.flush()?;
        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    }

    /// Print a line of status text
    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message)?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> DecisionInput for TerminalInput<R, W> {
    fn decide(&mut self, pair: &Pair, progress: Progress, images: &ImageSet) -> Result<Decision> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{} ({:.0}%)", progress, progress.percent())?;
        writeln!(self.writer, "  left:  {}", images.path_of(&pair.left).display())?;
        writeln!(self.writer, "  right: {}", images.path_of(&pair.right).display())?;

        loop {
            write!(self.writer, "> ")?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                // Input closed: keep the progress instead of losing it
                return Ok(Decision::SaveAndQuit);
            }
            match parse_decision(&line) {
                Some(decision) => return Ok(decision),
                None => writeln!(self.writer, "{}", HELP)?,
            }
        }
    }
}
