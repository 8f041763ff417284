use std::str::FromStr;

use grid_core::SortColumn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Sort(SortColumn),
    Page(u32),
    /// 1-based row number as printed in the table.
    Open(usize),
    Refresh,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "commands: sort <title|created_at|updated_at>, page <N>, open <row>, refresh, show, help, quit";

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Err("empty command".into());
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(format!("too many arguments for `{verb}`"));
        }

        let verb = verb.to_ascii_lowercase();
        match (verb.as_str(), arg) {
            ("sort", Some(column)) => column.parse().map(Command::Sort),
            ("page", Some(page)) => page
                .parse()
                .map(Command::Page)
                .map_err(|_| format!("`{page}` is not a page number")),
            ("open", Some(row)) => match row.parse::<usize>() {
                Ok(row) if row > 0 => Ok(Command::Open(row)),
                _ => Err(format!("`{row}` is not a row number")),
            },
            ("refresh", None) => Ok(Command::Refresh),
            ("show", None) => Ok(Command::Show),
            ("help", None) => Ok(Command::Help),
            ("quit" | "exit", None) => Ok(Command::Quit),
            ("sort" | "page" | "open", None) => Err(format!("`{verb}` needs an argument")),
            ("refresh" | "show" | "help" | "quit" | "exit", Some(_)) => {
                Err(format!("`{verb}` takes no argument"))
            }
            _ => Err(format!("unknown command `{verb}`")),
        }
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
