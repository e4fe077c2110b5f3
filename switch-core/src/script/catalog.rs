//! Command catalog shared by the scenario parser and `help`.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CommandTag {
    Press,
    Release,
    Wait,
    Boot,
    Status,
    Help,
    Reset,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: &'static str,
    pub tag: CommandTag,
    pub usage: &'static str,
    pub summary: &'static str,
}

pub const COMMANDS: [CommandSpec; 7] = [
    CommandSpec {
        name: "press",
        tag: CommandTag::Press,
        usage: "press",
        summary: "press the switch at the current time",
    },
    CommandSpec {
        name: "release",
        tag: CommandTag::Release,
        usage: "release",
        summary: "release the switch at the current time",
    },
    CommandSpec {
        name: "wait",
        tag: CommandTag::Wait,
        usage: "wait <n>ms | wait <n>s",
        summary: "advance virtual time (at most 24h), firing any timers that fall due",
    },
    CommandSpec {
        name: "boot",
        tag: CommandTag::Boot,
        usage: "boot held | boot released | boot unreadable",
        summary: "run wake validation with the given switch level",
    },
    CommandSpec {
        name: "status",
        tag: CommandTag::Status,
        usage: "status",
        summary: "show state, switch level, LED and power-off progress",
    },
    CommandSpec {
        name: "help",
        tag: CommandTag::Help,
        usage: "help [command]",
        summary: "list commands or describe one",
    },
    CommandSpec {
        name: "reset",
        tag: CommandTag::Reset,
        usage: "reset",
        summary: "discard the session and start over unbooted at t=0",
    },
];

/// Looks up a command by name, ignoring ASCII case.
#[must_use]
pub fn find(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS
        .iter()
        .find(|spec| spec.name.eq_ignore_ascii_case(name))
}

#[must_use]
pub fn spec_for(tag: CommandTag) -> &'static CommandSpec {
    match tag {
        CommandTag::Press => &COMMANDS[0],
        CommandTag::Release => &COMMANDS[1],
        CommandTag::Wait => &COMMANDS[2],
        CommandTag::Boot => &COMMANDS[3],
        CommandTag::Status => &COMMANDS[4],
        CommandTag::Help => &COMMANDS[5],
        CommandTag::Reset => &COMMANDS[6],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_map_back_to_their_entries() {
        for spec in &COMMANDS {
            assert_eq!(spec_for(spec.tag).name, spec.name);
        }
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find("WAIT").map(|spec| spec.tag), Some(CommandTag::Wait));
        assert!(find("hold").is_none());
    }
}
