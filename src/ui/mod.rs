/// Terminal front end
///
/// The decision input collaborator used by the binary: shows the pair as two
/// file paths and reads one key per comparison.

pub mod terminal;

pub use terminal::{parse_decision, TerminalInput};
