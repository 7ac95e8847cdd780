//! Interactive command parsing for the terminal front end

/// User action typed at the command prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Refresh,
    ToggleAdmin,
    /// Activate triage row `n` (1-based, as printed)
    Tag(usize),
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  r, refresh     reload readings
  a, admin       toggle admin mode
  t, tag <n>     tag untagged reading number <n> (admin mode)
  h, help        show this help
  q, quit        exit";

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err("empty command".to_string());
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "r" | "refresh" => Command::Refresh,
            "a" | "admin" => Command::ToggleAdmin,
            "h" | "help" | "?" => Command::Help,
            "q" | "quit" | "exit" => Command::Quit,
            "t" | "tag" => {
                let row = words
                    .next()
                    .ok_or_else(|| "usage: tag <n>".to_string())?
                    .parse::<usize>()
                    .map_err(|_| "row number must be a positive integer".to_string())?;
                if row == 0 {
                    return Err("rows are numbered from 1".to_string());
                }
                Command::Tag(row)
            }
            other => return Err(format!("unknown command '{}'", other)),
        };

        if words.next().is_some() {
            return Err(format!("unexpected arguments after '{}'", verb));
        }
        Ok(command)
    }
}
