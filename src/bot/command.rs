//! Command names and parsing of inbound message text

/// Every command the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `/start`, `/info`: help text
    Info,
    Support,
    /// `/add` with an attached file
    Add,
    Search,
    /// `/bdinfo`: per-dataset stats (admin)
    DbInfo,
    /// `/adm`: bot status (admin)
    Adm,
    /// `/setadmin <id>` (admin)
    SetAdmin,
    Unknown,
}

const COMMAND_TABLE: &[(&str, Command)] = &[
    ("start", Command::Info),
    ("info", Command::Info),
    ("support", Command::Support),
    ("add", Command::Add),
    ("search", Command::Search),
    ("bdinfo", Command::DbInfo),
    ("adm", Command::Adm),
    ("setadmin", Command::SetAdmin),
];

impl Command {
    /// Look up a command by name, ignoring ASCII case
    pub fn from_name(name: &str) -> Self {
        COMMAND_TABLE
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name))
            .map(|(_, command)| *command)
            .unwrap_or(Command::Unknown)
    }

    pub fn requires_admin(self) -> bool {
        match self {
            Command::DbInfo | Command::Adm | Command::SetAdmin => true,
            Command::Info
            | Command::Support
            | Command::Add
            | Command::Search
            | Command::Unknown => false,
        }
    }
}

/// A parsed command with its whitespace-separated arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub command: Command,
    pub args: Vec<&'a str>,
}

/// Parse `/name[@bot] arg1 arg2 ...`; the leading slash is optional
pub fn parse_command(text: &str) -> Invocation<'_> {
    let mut tokens = text.split_whitespace();
    let head = tokens.next().unwrap_or_default();

    let name = head.strip_prefix('/').unwrap_or(head);
    let name = name.split_once('@').map_or(name, |(name, _)| name);

    Invocation {
        command: Command::from_name(name),
        args: tokens.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_args() {
        let inv = parse_command("/search John   Smith");
        assert_eq!(inv.command, Command::Search);
        assert_eq!(inv.args, vec!["John", "Smith"]);
    }

    #[test]
    fn test_aliases_and_bot_suffix() {
        assert_eq!(parse_command("/start").command, Command::Info);
        assert_eq!(parse_command("/info@dbseek_bot").command, Command::Info);
        assert_eq!(parse_command("SETADMIN 5").command, Command::SetAdmin);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(parse_command("/deleteall").command, Command::Unknown);
        assert_eq!(parse_command("").command, Command::Unknown);
        assert_eq!(parse_command("   ").command, Command::Unknown);
    }

    #[test]
    fn test_admin_commands() {
        let admin: Vec<_> = COMMAND_TABLE
            .iter()
            .filter(|(_, c)| c.requires_admin())
            .map(|(name, _)| *name)
            .collect();
        assert_eq!(admin, vec!["bdinfo", "adm", "setadmin"]);
    }
}
