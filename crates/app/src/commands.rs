//! Slash commands understood by the prompt.

use std::path::PathBuf;

pub const HELP: &str = "\
Type a message and press Enter to send it.

  /attach <path>   attach a text file (txt, md, js, jsx, ts, tsx, json, html, css, csv)
  /detach <n|id>   remove a pending attachment by number or id
  /files           list pending attachments
  /export <path>   write the conversation to a JSON file
  /key             enter your OpenAI API key
  /forget-key      remove the stored API key
  /reset           clear the conversation
  /help            show this help
  /quit            exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send(String),
    Attach(PathBuf),
    Detach(String),
    Files,
    Export(PathBuf),
    Key,
    ForgetKey,
    Reset,
    Help,
    Quit,
    /// Recognised command missing its argument
    Usage(&'static str),
    Unknown(String),
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Some(Command::Send(trimmed.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let cmd = match (name.to_lowercase().as_str(), arg) {
        ("attach", "") => Command::Usage("/attach <path>"),
        ("attach", path) => Command::Attach(expand_user_path(path)),
        ("detach", "") => Command::Usage("/detach <n|id>"),
        ("detach", which) => Command::Detach(which.to_string()),
        ("files", _) => Command::Files,
        ("export", "") => Command::Usage("/export <path>"),
        ("export", path) => Command::Export(expand_user_path(path)),
        ("key", _) => Command::Key,
        ("forget-key", _) => Command::ForgetKey,
        ("reset", _) | ("clear", _) => Command::Reset,
        ("help", _) => Command::Help,
        ("quit", _) | ("exit", _) => Command::Quit,
        _ => Command::Unknown(name.to_string()),
    };
    Some(cmd)
}

/// Expand a leading `~/` to the home directory
pub fn expand_user_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_sent() {
        assert_eq!(parse("  hello there "), Some(Command::Send("hello there".into())));
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse("/attach notes/today.md"),
            Some(Command::Attach(PathBuf::from("notes/today.md")))
        );
        assert_eq!(parse("/detach 2"), Some(Command::Detach("2".into())));
        assert_eq!(parse("/attach"), Some(Command::Usage("/attach <path>")));
        assert_eq!(
            parse("/export chat.json"),
            Some(Command::Export(PathBuf::from("chat.json")))
        );
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("/files"), Some(Command::Files));
        assert_eq!(parse("/KEY"), Some(Command::Key));
        assert_eq!(parse("/forget-key"), Some(Command::ForgetKey));
        assert_eq!(parse("/clear"), Some(Command::Reset));
        assert_eq!(parse("/exit"), Some(Command::Quit));
        assert_eq!(parse("/dance"), Some(Command::Unknown("dance".into())));
    }
}
