//! Scenario language for driving the simulator.
//!
//! One command per line. `#` starts a comment and blank lines are skipped.
//! Keywords are case-insensitive.
//!
//! ```text
//! boot held
//! wait 1200ms
//! release
//! status
//! ```

pub mod catalog;

use core::fmt;
use core::time::Duration;

use winnow::ascii::{Caseless, digit1, space0, space1};
use winnow::combinator::{alt, cut_err, delimited, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::{literal, take_while};

use crate::sim::BootScenario;

use self::catalog::CommandSpec;

/// Longest virtual-time step a single `wait` may take.
pub const MAX_WAIT: Duration = Duration::from_secs(24 * 60 * 60);

/// Parsed scenario command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptCommand<'a> {
    Press,
    Release,
    Wait(Duration),
    Boot(BootScenario),
    Status,
    Help(Option<&'a str>),
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScriptErrorKind {
    UnknownCommand,
    /// A known command with a malformed or missing argument.
    InvalidArgument(&'static CommandSpec),
}

/// Parse failure with the 1-based column it was detected at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptError {
    pub column: usize,
    pub kind: ScriptErrorKind,
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ScriptErrorKind::UnknownCommand => {
                write!(f, "unknown command at column {} (try `help`)", self.column)
            }
            ScriptErrorKind::InvalidArgument(spec) => write!(
                f,
                "invalid `{}` at column {}; usage: {}",
                spec.name, self.column, spec.usage
            ),
        }
    }
}

/// Parses one line. Returns `Ok(None)` for blank and comment-only lines.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand<'_>>, ScriptError> {
    let body = line.split('#').next().unwrap_or_default();
    let body = body.trim_end_matches(['\r', '\n']);
    if body.trim().is_empty() {
        return Ok(None);
    }

    delimited(space0, command, space0)
        .parse(body)
        .map(Some)
        .map_err(|err| ScriptError {
            column: err.offset() + 1,
            kind: classify(body),
        })
}

fn classify(body: &str) -> ScriptErrorKind {
    let word = body.split_whitespace().next().unwrap_or_default();
    catalog::find(word).map_or(ScriptErrorKind::UnknownCommand, |spec| {
        ScriptErrorKind::InvalidArgument(spec)
    })
}

fn command<'a>(input: &mut &'a str) -> ModalResult<ScriptCommand<'a>> {
    alt((
        keyword("press").value(ScriptCommand::Press),
        keyword("release").value(ScriptCommand::Release),
        keyword("reset").value(ScriptCommand::Reset),
        keyword("status").value(ScriptCommand::Status),
        preceded(keyword("wait"), cut_err(preceded(space1, duration))).map(ScriptCommand::Wait),
        preceded(keyword("boot"), cut_err(preceded(space1, boot_scenario)))
            .map(ScriptCommand::Boot),
        preceded(keyword("help"), opt(preceded(space1, topic))).map(ScriptCommand::Help),
    ))
    .parse_next(input)
}

fn keyword<'a>(word: &'static str) -> impl Parser<&'a str, &'a str, ErrMode<ContextError>> {
    literal(Caseless(word))
}

fn duration(input: &mut &str) -> ModalResult<Duration> {
    (
        digit1.parse_to::<u64>(),
        alt((
            literal(Caseless("ms")).value(Duration::from_millis as fn(u64) -> Duration),
            literal(Caseless("s")).value(Duration::from_secs as fn(u64) -> Duration),
        )),
    )
        .map(|(value, unit)| unit(value))
        .verify(|wait: &Duration| *wait <= MAX_WAIT)
        .parse_next(input)
}

fn boot_scenario(input: &mut &str) -> ModalResult<BootScenario> {
    alt((
        keyword("held").value(BootScenario::Held),
        keyword("released").value(BootScenario::Released),
        keyword("unreadable").value(BootScenario::Unreadable),
    ))
    .parse_next(input)
}

fn topic<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '-').parse_next(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::catalog::CommandTag;

    fn parse_ok(line: &str) -> ScriptCommand<'_> {
        parse_line(line)
            .expect("parse failed")
            .expect("line was empty")
    }

    #[test]
    fn parses_bare_commands() {
        assert_eq!(parse_ok("press"), ScriptCommand::Press);
        assert_eq!(parse_ok("  RELEASE  "), ScriptCommand::Release);
        assert_eq!(parse_ok("status"), ScriptCommand::Status);
        assert_eq!(parse_ok("reset\r\n"), ScriptCommand::Reset);
    }

    #[test]
    fn parses_wait_durations() {
        assert_eq!(
            parse_ok("wait 250ms"),
            ScriptCommand::Wait(Duration::from_millis(250))
        );
        assert_eq!(
            parse_ok("wait 2s # settle"),
            ScriptCommand::Wait(Duration::from_secs(2))
        );
    }

    #[test]
    fn parses_boot_scenarios_and_help_topics() {
        assert_eq!(
            parse_ok("boot unreadable"),
            ScriptCommand::Boot(BootScenario::Unreadable)
        );
        assert_eq!(parse_ok("help"), ScriptCommand::Help(None));
        assert_eq!(parse_ok("help wait"), ScriptCommand::Help(Some("wait")));
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        assert_eq!(parse_line(""), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("# boot held"), Ok(None));
    }

    #[test]
    fn wait_without_unit_points_past_the_number() {
        let err = parse_line("wait 10").unwrap_err();
        assert_eq!(err.column, 8);
        match err.kind {
            ScriptErrorKind::InvalidArgument(spec) => assert_eq!(spec.tag, CommandTag::Wait),
            ScriptErrorKind::UnknownCommand => panic!("expected invalid argument"),
        }
    }

    #[test]
    fn wait_longer_than_a_day_is_rejected() {
        assert_eq!(parse_ok("wait 86400s"), ScriptCommand::Wait(MAX_WAIT));

        for line in [
            "wait 86401s",
            "wait 18446744073709551615s",
            "wait 99999999999999999999ms",
        ] {
            let err = parse_line(line).unwrap_err();
            assert_eq!(err.column, 6, "{line}");
            match err.kind {
                ScriptErrorKind::InvalidArgument(spec) => assert_eq!(spec.tag, CommandTag::Wait),
                ScriptErrorKind::UnknownCommand => panic!("expected invalid argument"),
            }
        }
    }

    #[test]
    fn unknown_command_is_reported() {
        let err = parse_line("hold 3s").unwrap_err();
        assert_eq!(err.kind, ScriptErrorKind::UnknownCommand);
        assert_eq!(err.column, 1);
    }

    #[test]
    fn trailing_input_is_rejected() {
        let err = parse_line("press now").unwrap_err();
        assert_eq!(err.column, 7);
    }
}
