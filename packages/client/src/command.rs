//! プロンプト入力の解釈
//!
//! `/` で始まる行はコマンド、それ以外（`//` で始まるコメント行を含む）はコードバッファへの追記です。

use kyodo_server::domain::Language;

use crate::error::ClientError;

pub const HELP: &str = "\
Commands:
  /code <text>          replace the whole code buffer
  /lang <language>      switch language (javascript | arduino)
  /cursor <line> <col>  move your cursor
  /run                  request a simulation of the current buffer
  /who                  list participants and cursors
  /show                 print the code buffer
  /leave                leave the room and exit
  /quit                 exit
  /help                 show this help
Any other line is appended to the code buffer.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Append(String),
    SetCode(String),
    Language(Language),
    Cursor { line: u32, column: u32 },
    Run,
    Who,
    Show,
    Leave,
    Quit,
    Help,
}

/// 1 行の入力をコマンドに変換する
pub fn parse_input(line: &str) -> Result<InputCommand, ClientError> {
    if !line.starts_with('/') || line.starts_with("//") {
        return Ok(InputCommand::Append(line.to_string()));
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name {
        "/code" => Ok(InputCommand::SetCode(rest.to_string())),
        "/lang" => rest
            .parse::<Language>()
            .map(InputCommand::Language)
            .map_err(|e| ClientError::InvalidCommand(e.to_string())),
        "/cursor" => parse_cursor(rest),
        "/run" => Ok(InputCommand::Run),
        "/who" => Ok(InputCommand::Who),
        "/show" => Ok(InputCommand::Show),
        "/leave" => Ok(InputCommand::Leave),
        "/quit" | "/exit" => Ok(InputCommand::Quit),
        "/help" => Ok(InputCommand::Help),
        other => Err(ClientError::InvalidCommand(format!(
            "unknown command '{}' (try /help)",
            other
        ))),
    }
}

fn parse_cursor(args: &str) -> Result<InputCommand, ClientError> {
    let invalid = || ClientError::InvalidCommand("usage: /cursor <line> <column>".to_string());
    let mut parts = args.split_whitespace();
    let line = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
    let column = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok(InputCommand::Cursor { line, column })
}
