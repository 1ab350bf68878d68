//! Front-end commands. Anything that is not a command goes to the responder.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Print mood, turn and zone.
    Status,
    /// Say goodbye and end the session.
    Sleep,
}

impl Command {
    /// Recognize a command line. The match is exact after trimming, so
    /// `/status please` is ordinary input.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "/status" => Some(Command::Status),
            "/sleep" => Some(Command::Sleep),
            _ => None,
        }
    }
}
