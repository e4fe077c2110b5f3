use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;

use travel_switch_core::SwitchConfig;
use travel_switch_core::script::catalog::{self, COMMANDS};
use travel_switch_core::script::{ScriptCommand, parse_line};
use travel_switch_core::sim::{BootScenario, Simulator};

/// One emulator run: a simulator driven by scenario lines, optionally mirrored
/// into a transcript file.
pub struct Session {
    config: SwitchConfig,
    sim: Simulator,
    transcript: Option<TranscriptLogger>,
}

impl Session {
    pub fn new(config: SwitchConfig, transcript: Option<&Path>) -> io::Result<Self> {
        let transcript = match transcript {
            Some(path) => Some(TranscriptLogger::new(path, &config)?),
            None => None,
        };

        Ok(Self {
            config,
            sim: Simulator::new(config),
            transcript,
        })
    }

    pub fn simulator(&self) -> &Simulator {
        &self.sim
    }

    /// Runs one scenario line and returns the lines to show the operator.
    pub fn handle_command(&mut self, line: &str) -> io::Result<Vec<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }

        let started = self.sim.now();
        self.log(started, TranscriptRole::Host, trimmed)?;

        let mut lines = match parse_line(trimmed) {
            Ok(None) => Vec::new(),
            Ok(Some(command)) => self.apply(command),
            Err(err) => vec![format!("ERR syntax {err}")],
        };

        // Telemetry comes first so acknowledgements read as a summary.
        let mut output: Vec<String> = self
            .sim
            .take_journal()
            .iter()
            .map(ToString::to_string)
            .collect();
        output.append(&mut lines);

        let finished = self.sim.now();
        for line in &output {
            self.log(finished, TranscriptRole::Emulator, line)?;
        }
        Ok(output)
    }

    fn apply(&mut self, command: ScriptCommand<'_>) -> Vec<String> {
        match command {
            ScriptCommand::Press => {
                self.sim.press();
                vec![self.ack("press")]
            }
            ScriptCommand::Release => {
                self.sim.release();
                vec![self.ack("release")]
            }
            ScriptCommand::Wait(duration) => {
                self.sim.advance(duration);
                vec![self.ack("wait")]
            }
            ScriptCommand::Boot(scenario) => self.handle_boot(scenario),
            ScriptCommand::Status => vec![format!(
                "t={}ms {}",
                self.sim.now().as_millis(),
                self.sim.status()
            )],
            ScriptCommand::Help(topic) => handle_help(topic),
            ScriptCommand::Reset => {
                self.sim = Simulator::new(self.config);
                vec!["OK reset t=0ms state=idle (not booted)".to_string()]
            }
        }
    }

    fn handle_boot(&mut self, scenario: BootScenario) -> Vec<String> {
        match self.sim.boot(scenario) {
            Ok(outcome) => vec![format!(
                "OK boot {scenario} -> {outcome} t={}ms state={}",
                self.sim.now().as_millis(),
                self.sim.state()
            )],
            Err(err) => vec![format!("ERR boot {err}")],
        }
    }

    fn ack(&self, verb: &str) -> String {
        let mut line = format!(
            "OK {verb} t={}ms state={}",
            self.sim.now().as_millis(),
            self.sim.state()
        );
        if let Some(at) = self.sim.power_off_at() {
            line.push_str(&format!(" powered-off@{}ms", at.as_millis()));
        }
        line
    }

    fn log(&mut self, at: Duration, role: TranscriptRole, line: &str) -> io::Result<()> {
        match self.transcript.as_mut() {
            Some(transcript) => transcript.append_line(at, role, line),
            None => Ok(()),
        }
    }
}

fn handle_help(topic: Option<&str>) -> Vec<String> {
    match topic {
        None => {
            let mut lines = vec!["Commands:".to_string()];
            lines.extend(
                COMMANDS
                    .iter()
                    .map(|spec| format!("  {:<44} - {}", spec.usage, spec.summary)),
            );
            lines.push("  exit | quit                                  - end the session".to_string());
            lines
        }
        Some(name) => match catalog::find(name) {
            Some(spec) => vec![format!("{} - {}", spec.usage, spec.summary)],
            None => vec![format!(
                "ERR help unknown topic `{name}` (available: {})",
                help_topic_list()
            )],
        },
    }
}

fn help_topic_list() -> String {
    let mut buffer = String::new();
    for (index, spec) in COMMANDS.iter().enumerate() {
        if index > 0 {
            buffer.push_str(", ");
        }
        buffer.push_str(spec.name);
    }
    buffer
}

struct TranscriptLogger {
    writer: BufWriter<std::fs::File>,
}

impl TranscriptLogger {
    fn new(path: &Path, config: &SwitchConfig) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        let mut logger = Self {
            writer: BufWriter::new(file),
        };

        logger.write_header(config)?;
        Ok(logger)
    }

    fn write_header(&mut self, config: &SwitchConfig) -> io::Result<()> {
        writeln!(self.writer, "# Travel switch emulator transcript")?;
        writeln!(
            self.writer,
            "# hold={}ms cooldown={}ms blinks={} interval={}ms boot-samples={}",
            config.hold_time.as_millis(),
            config.led_cooldown.as_millis(),
            config.blink_count,
            config.blink_interval.as_millis(),
            config.boot_policy.sample_count()
        )?;
        writeln!(self.writer, "# Timestamps are virtual milliseconds")?;
        writeln!(self.writer)?;
        self.writer.flush()
    }

    fn append_line(&mut self, at: Duration, role: TranscriptRole, line: &str) -> io::Result<()> {
        writeln!(
            self.writer,
            "[+{:>6} ms] {} {}",
            at.as_millis(),
            role.prefix(),
            line
        )?;
        self.writer.flush()
    }
}

#[derive(Clone, Copy)]
enum TranscriptRole {
    Host,
    Emulator,
}

impl TranscriptRole {
    fn prefix(self) -> &'static str {
        match self {
            TranscriptRole::Host => "HOST>",
            TranscriptRole::Emulator => "EMU <",
        }
    }
}
