//! Command parser for the : command system

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Select a token by address or by name prefix
    Token(String),
    Withdraw,
    /// Early withdrawal against a penalty (not supported)
    WithdrawEarly,
    Refresh,
    Transfers,
    /// Switch to the endpoint with this index
    Connect(usize),
    Help,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        "token" | "select" | "t" => {
            if let Some(query) = args {
                Command::Token(query)
            } else {
                Command::Unknown(input.to_string())
            }
        }
        "withdraw" | "wd" => Command::Withdraw,
        "early" | "withdraw-early" => Command::WithdrawEarly,
        "refresh" | "r" => Command::Refresh,
        "transfers" | "tx" => Command::Transfers,
        "connect" | "conn" => match args.and_then(|s| s.parse().ok()) {
            Some(index) => Command::Connect(index),
            None => Command::Unknown(input.to_string()),
        },
        "help" | "h" => Command::Help,
        "quit" | "q" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}
