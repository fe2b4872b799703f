//! stdin 제어 명령.
//!
//! 한 줄에 명령 하나:
//! - `filter <term>` / `filter` (해제)
//! - `fraction <0..1>`
//! - `window <secs>`
//! - `help`, `quit`
//!
//! 값 검증은 여기서 끝냅니다. 스트림 엔진은 값을 보정하지 않습니다.

use firehose_core::{validate_fraction, validate_window_secs, FirehoseError, FirehoseResult};
use firehose_stream::ControlCommand;

/// 파싱된 입력 한 줄.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlInput {
    /// 스트림으로 보낼 명령
    Command(ControlCommand),
    /// 도움말 출력
    Help,
    /// 빈 줄
    Empty,
}

/// 도움말 문자열.
pub const HELP: &str = "commands: filter <term> | filter | fraction <0..1> | window <1..300> | help | quit";

/// 한 줄을 파싱합니다.
pub fn parse_input(line: &str) -> FirehoseResult<ControlInput> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(ControlInput::Empty);
    }

    let (name, arg) = match line.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (line, ""),
    };

    let command = match name.to_lowercase().as_str() {
        "filter" => ControlCommand::SetFilter(arg.to_string()),
        "fraction" => ControlCommand::SetFraction(validate_fraction(parse_arg(name, arg)?)?),
        "window" => ControlCommand::SetTimeout(validate_window_secs(parse_arg(name, arg)?)?),
        "quit" | "exit" => ControlCommand::Disconnect,
        "help" | "?" => return Ok(ControlInput::Help),
        other => {
            return Err(FirehoseError::InvalidInput(format!(
                "알 수 없는 명령: {} ({})",
                other, HELP
            )))
        }
    };

    Ok(ControlInput::Command(command))
}

fn parse_arg<T: std::str::FromStr>(name: &str, arg: &str) -> FirehoseResult<T> {
    arg.parse().map_err(|_| {
        FirehoseError::InvalidInput(format!("{} 값이 올바르지 않습니다: '{}'", name, arg))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(line: &str) -> ControlCommand {
        match parse_input(line).unwrap() {
            ControlInput::Command(command) => command,
            other => panic!("expected command, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_commands() {
        assert_eq!(
            command("filter  Rust Lang "),
            ControlCommand::SetFilter("Rust Lang".to_string())
        );
        assert_eq!(command("filter"), ControlCommand::SetFilter(String::new()));
    }

    #[test]
    fn test_numeric_commands() {
        assert_eq!(command("fraction 0.25"), ControlCommand::SetFraction(0.25));
        assert_eq!(command("WINDOW 30"), ControlCommand::SetTimeout(30));
        assert_eq!(command("quit"), ControlCommand::Disconnect);
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(parse_input("fraction 0").is_err());
        assert!(parse_input("fraction 1.5").is_err());
        assert!(parse_input("window 0").is_err());
        assert!(parse_input("window 301").is_err());
        assert!(parse_input("window -5").is_err());
        assert!(parse_input("fraction abc").is_err());
    }

    #[test]
    fn test_misc_inputs() {
        assert_eq!(parse_input("   ").unwrap(), ControlInput::Empty);
        assert_eq!(parse_input("help").unwrap(), ControlInput::Help);
        assert!(matches!(
            parse_input("reconnect"),
            Err(FirehoseError::InvalidInput(_))
        ));
    }
}
