mod session;

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use travel_switch_core::{BootSamplePolicy, SwitchConfig};

use session::Session;

const USAGE: &str = "Usage: travel-switch-emulator [--hold-ms <n>] [--cooldown-ms <n>] \
[--blink-count <n>] [--blink-interval-ms <n>] [--boot-samples <n>] \
[--transcript <path>] [script]";

/// Spacing between confirmation reads when `--boot-samples` is above one.
const BOOT_SAMPLE_SPACING: Duration = Duration::from_millis(5);

#[derive(Debug, PartialEq, Eq)]
struct Options {
    config: SwitchConfig,
    transcript: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let options = parse_options(env::args().skip(1)).unwrap_or_else(|err| {
        eprintln!("{err}");
        eprintln!("{USAGE}");
        process::exit(2);
    });

    if let Err(err) = options.config.validate() {
        eprintln!("invalid configuration: {err}");
        process::exit(2);
    }

    let mut session = Session::new(options.config, options.transcript.as_deref())?;
    let stdout = io::stdout();
    let mut writer = stdout.lock();

    match options.script {
        Some(path) => {
            let reader = BufReader::new(File::open(&path)?);
            run_script(&mut session, reader, &mut writer)
        }
        None => run_interactive(&mut session, &mut writer),
    }
}

fn run_script<R, W>(session: &mut Session, reader: R, writer: &mut W) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if should_terminate(trimmed) {
            break;
        }

        writeln!(writer, "> {trimmed}")?;
        for response in session.handle_command(trimmed)? {
            writeln!(writer, "{response}")?;
        }
    }
    Ok(())
}

fn run_interactive<W: Write>(session: &mut Session, writer: &mut W) -> io::Result<()> {
    let stdin = io::stdin();
    let mut reader = stdin.lock();
    let mut line = String::new();

    writeln!(
        writer,
        "Travel Switch Emulator ready. Type `help` for commands or `exit` to quit."
    )?;

    loop {
        line.clear();
        write!(writer, "> ")?;
        writer.flush()?;

        let bytes_read = reader.read_line(&mut line)?;
        if bytes_read == 0 {
            writeln!(writer)?;
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if should_terminate(trimmed) {
            writeln!(writer, "Session closed.")?;
            break;
        }

        for response in session.handle_command(trimmed)? {
            writeln!(writer, "{response}")?;
        }
    }

    Ok(())
}

fn should_terminate(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn parse_options<I>(args: I) -> Result<Options, String>
where
    I: IntoIterator<Item = String>,
{
    let mut config = SwitchConfig::default();
    let mut transcript = None;
    let mut script = None;
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if !arg.starts_with("--") {
            if script.replace(PathBuf::from(&arg)).is_some() {
                return Err(format!("Unexpected extra argument `{arg}`"));
            }
            continue;
        }

        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg.clone(), None),
        };
        let value = match inline {
            Some(value) => value,
            None => args
                .next()
                .ok_or_else(|| format!("Expected value after {flag}"))?,
        };

        match flag.as_str() {
            "--hold-ms" => config.hold_time = millis(&flag, &value)?,
            "--cooldown-ms" => config.led_cooldown = millis(&flag, &value)?,
            "--blink-count" => config.blink_count = number(&flag, &value)?,
            "--blink-interval-ms" => config.blink_interval = millis(&flag, &value)?,
            "--boot-samples" => {
                config.boot_policy = match number::<u8>(&flag, &value)? {
                    1 => BootSamplePolicy::Single,
                    samples => BootSamplePolicy::Confirmed {
                        samples,
                        spacing: BOOT_SAMPLE_SPACING,
                    },
                };
            }
            "--transcript" => transcript = Some(PathBuf::from(value)),
            _ => return Err(format!("Unknown option `{flag}`")),
        }
    }

    Ok(Options {
        config,
        transcript,
        script,
    })
}

fn number<T: std::str::FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid value `{value}` for {flag}"))
}

fn millis(flag: &str, value: &str) -> Result<Duration, String> {
    number::<u64>(flag, value).map(Duration::from_millis)
}
