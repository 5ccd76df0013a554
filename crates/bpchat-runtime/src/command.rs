//! Local command language
//!
//! A line is matched as a whole against the command keywords. Anything that
//! is not a command, including the empty line, is an outbound message.

/// Keyword that ends the session
pub const EXIT_KEYWORD: &str = "exit";

/// Static command list printed by `/help`
pub const HELP_TEXT: &str = "\nCommands:\n\
/help - Show this help message\n\
/clear - Clear the chat history\n\
/history - Show the chat history\n\
exit - Quit the chat application";

/// One interpreted input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    /// Leave the session
    Exit,
    /// Print the command list
    Help,
    /// Empty the history log
    Clear,
    /// Print the history log
    History,
    /// Send the line as a message
    Send(&'a str),
}

impl<'a> Command<'a> {
    /// Interpret a line with its line terminator already removed
    pub fn parse(line: &'a str) -> Self {
        match line {
            EXIT_KEYWORD => Command::Exit,
            "/help" => Command::Help,
            "/clear" => Command::Clear,
            "/history" => Command::History,
            message => Command::Send(message),
        }
    }
}
