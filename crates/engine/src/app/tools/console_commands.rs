use std::collections::{HashMap, VecDeque};

use crate::app::{GamepadButton, InputAction, PluginCommand, VehicleKind};

use super::ConsoleState;

const MAX_PENDING_HOST_COMMANDS: usize = 128;
const MAX_TICKS_PER_COMMAND: u32 = 36_000;

#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Tick { count: u32 },
    PressKey { key: String },
    PressPad { button: GamepadButton },
    Act { action: InputAction },
    Touch { x: f32, y: f32 },
    Drag { x: f32, y: f32 },
    Release,
    Board { kind: VehicleKind },
    SetSwitch { switch_id: u32, value: bool },
    SetEventRunning { running: bool },
    Save { slot: String },
    Load { slot: String },
    Status,
    Say { text: String },
    Quit,
    Plugin(PluginCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LocalAction {
    Help,
    Clear,
    Echo { text: String },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ParsedCommand {
    Local(LocalAction),
    Queueable(HostCommand),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommandParseError {
    reason: String,
    usage: String,
}

impl CommandParseError {
    fn new(reason: impl Into<String>, usage: &str) -> Self {
        Self {
            reason: reason.into(),
            usage: usage.to_string(),
        }
    }
}

type ParseFn = dyn Fn(&[String]) -> Result<ParsedCommand, CommandParseError> + Send + Sync;

pub(crate) struct CommandSpec {
    name: String,
    help: String,
    arg_schema: String,
    parse: Box<ParseFn>,
}

pub struct ConsoleCommandRegistry {
    specs: Vec<CommandSpec>,
    lookup_by_lower_name: HashMap<String, usize>,
}

impl ConsoleCommandRegistry {
    pub(crate) fn new() -> Self {
        Self {
            specs: Vec::new(),
            lookup_by_lower_name: HashMap::new(),
        }
    }

    pub(crate) fn with_host_builtins() -> Self {
        let builtins: [(&str, &str, &str, fn(&[String]) -> _); 17] = [
            ("help", "List commands", "", parse_help_command),
            ("clear", "Clear console output", "", parse_clear_command),
            ("echo", "Print text to console", "<text...>", parse_echo_command),
            ("tick", "Advance the simulation", "[count:u32]", parse_tick_command),
            ("press", "Hold a keyboard key for the next tick", "<key>", parse_press_command),
            ("pad", "Hold a gamepad button for the next tick", "<button>", parse_pad_command),
            (
                "act",
                "Hold an input action for the next tick",
                "<up|down|left|right|ok|cancel|shift>",
                parse_act_command,
            ),
            ("touch", "Pointer down at screen position", "<x:f32> <y:f32>", parse_touch_command),
            ("drag", "Pointer move to screen position", "<x:f32> <y:f32>", parse_drag_command),
            ("release", "Pointer up", "", parse_release_command),
            (
                "board",
                "Bring a vehicle next to the player and board it",
                "<boat|ship|airship>",
                parse_board_command,
            ),
            ("switch", "Set a game switch", "<switch_id:u32> <on|off>", parse_switch_command),
            ("event", "Mark a map event as running", "<on|off>", parse_event_command),
            ("save", "Write the game to a save slot", "[slot]", parse_save_command),
            ("load", "Load the game from a save slot", "[slot]", parse_load_command),
            ("status", "Show player and plugin state", "", parse_status_command),
            ("quit", "Quit", "", parse_quit_command),
        ];
        let mut registry = Self::new();
        for (name, help, arg_schema, parse) in builtins {
            if let Err(error) = registry.register(name, help, arg_schema, parse) {
                unreachable!("built-in command registration failed: {error}");
            }
        }
        if let Err(error) = registry.register(
            "say",
            "Show a message through the window text filters",
            "<text...>",
            parse_say_command,
        ) {
            unreachable!("built-in command registration failed: {error}");
        }
        registry
    }

    pub(crate) fn register<F>(
        &mut self,
        name: impl Into<String>,
        help: impl Into<String>,
        arg_schema: impl Into<String>,
        parse: F,
    ) -> Result<(), String>
    where
        F: Fn(&[String]) -> Result<ParsedCommand, CommandParseError> + Send + Sync + 'static,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err("command name cannot be empty".to_string());
        }
        let lower = name.to_ascii_lowercase();
        if self.lookup_by_lower_name.contains_key(&lower) {
            return Err(format!("duplicate command registration: {name}"));
        }

        self.specs.push(CommandSpec {
            name,
            help: help.into(),
            arg_schema: arg_schema.into(),
            parse: Box::new(parse),
        });
        self.lookup_by_lower_name
            .insert(lower, self.specs.len() - 1);
        Ok(())
    }

    /// Registers a command whose arguments are handed to the active scene
    /// untouched, as a [`PluginCommand`].
    pub fn register_plugin_command(
        &mut self,
        name: &str,
        help: &str,
        arg_schema: &str,
    ) -> Result<(), String> {
        let command_name = name.to_string();
        self.register(name, help, arg_schema, move |args: &[String]| {
            Ok(ParsedCommand::Queueable(HostCommand::Plugin(PluginCommand {
                name: command_name.clone(),
                args: args.to_vec(),
            })))
        })
    }

    pub(crate) fn lookup(&self, input_name: &str) -> Option<&CommandSpec> {
        let lower = input_name.to_ascii_lowercase();
        let index = self.lookup_by_lower_name.get(&lower)?;
        self.specs.get(*index)
    }

    pub(crate) fn iter_specs_in_order(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        // Help output order is registration order.
        self.specs.iter().map(|spec| {
            (
                spec.name.as_str(),
                spec.help.as_str(),
                spec.arg_schema.as_str(),
            )
        })
    }
}

pub struct ConsoleCommandProcessor {
    registry: ConsoleCommandRegistry,
    pending_host_commands: VecDeque<HostCommand>,
}

impl Default for ConsoleCommandProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleCommandProcessor {
    pub fn new() -> Self {
        Self {
            registry: ConsoleCommandRegistry::with_host_builtins(),
            pending_host_commands: VecDeque::new(),
        }
    }

    pub fn registry_mut(&mut self) -> &mut ConsoleCommandRegistry {
        &mut self.registry
    }

    pub fn process_pending_lines(&mut self, console: &mut ConsoleState) {
        let mut lines = Vec::new();
        console.drain_pending_lines_into(&mut lines);

        for raw_line in lines {
            self.process_line(console, &raw_line);
        }
    }

    pub fn drain_pending_host_commands_into(&mut self, out: &mut Vec<HostCommand>) {
        out.extend(self.pending_host_commands.drain(..));
    }

    fn process_line(&mut self, console: &mut ConsoleState, raw_line: &str) {
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return;
        }

        let tokens = match tokenize_line(trimmed) {
            Ok(tokens) => tokens,
            Err(reason) => {
                console.append_output_line(format!("error: {reason}. usage: help"));
                return;
            }
        };
        if tokens.is_empty() {
            return;
        }

        let command_name = &tokens[0];
        let args = &tokens[1..];
        let Some(spec) = self.registry.lookup(command_name) else {
            console.append_output_line(format!(
                "error: unknown command '{}'. try: help",
                command_name
            ));
            return;
        };

        match (spec.parse)(args) {
            Ok(ParsedCommand::Local(action)) => self.apply_local_action(console, action),
            Ok(ParsedCommand::Queueable(command)) => self.push_queueable(command),
            Err(error) => {
                console
                    .append_output_line(format!("error: {}. usage: {}", error.reason, error.usage));
            }
        }
    }

    fn apply_local_action(&self, console: &mut ConsoleState, action: LocalAction) {
        match action {
            LocalAction::Help => {
                for (name, help, arg_schema) in self.registry.iter_specs_in_order() {
                    let line = if arg_schema.is_empty() {
                        format!("{name} - {help}")
                    } else {
                        format!("{name} {arg_schema} - {help}")
                    };
                    console.append_output_line(line);
                }
            }
            LocalAction::Clear => {
                console.clear_output_lines();
            }
            LocalAction::Echo { text } => {
                console.append_output_line(text);
            }
        }
    }

    fn push_queueable(&mut self, command: HostCommand) {
        if self.pending_host_commands.len() == MAX_PENDING_HOST_COMMANDS {
            self.pending_host_commands.pop_front();
        }
        self.pending_host_commands.push_back(command);
    }
}

fn tokenize_line(line: &str) -> Result<Vec<String>, String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut seen_token_content = false;
    let mut just_closed_quote = false;

    for ch in line.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                seen_token_content = true;
                if !in_quotes {
                    just_closed_quote = true;
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if seen_token_content || just_closed_quote || !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                    seen_token_content = false;
                    just_closed_quote = false;
                }
            }
            _ => {
                current.push(ch);
                seen_token_content = true;
                just_closed_quote = false;
            }
        }
    }

    if in_quotes {
        return Err("unterminated quoted string".to_string());
    }

    if seen_token_content || just_closed_quote || !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

fn parse_help_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "help")?;
    Ok(ParsedCommand::Local(LocalAction::Help))
}

fn parse_clear_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "clear")?;
    Ok(ParsedCommand::Local(LocalAction::Clear))
}

fn parse_echo_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    if args.is_empty() {
        return Err(CommandParseError::new(
            "missing required argument <text...>",
            "echo <text...>",
        ));
    }
    Ok(ParsedCommand::Local(LocalAction::Echo {
        text: args.join(" "),
    }))
}

fn parse_say_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    if args.is_empty() {
        return Err(CommandParseError::new(
            "missing required argument <text...>",
            "say <text...>",
        ));
    }
    Ok(ParsedCommand::Queueable(HostCommand::Say {
        text: args.join(" "),
    }))
}

fn parse_tick_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "tick [count]";
    let count = match args {
        [] => 1,
        [raw] => raw.parse::<u32>().map_err(|_| {
            CommandParseError::new(format!("invalid tick count '{raw}' (expected u32)"), USAGE)
        })?,
        _ => return Err(CommandParseError::new("expected at most one argument", USAGE)),
    };
    if count == 0 || count > MAX_TICKS_PER_COMMAND {
        return Err(CommandParseError::new(
            format!("tick count must be in 1..={MAX_TICKS_PER_COMMAND}"),
            USAGE,
        ));
    }
    Ok(ParsedCommand::Queueable(HostCommand::Tick { count }))
}

fn parse_press_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let [key] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <key>",
            "press <key>",
        ));
    };
    Ok(ParsedCommand::Queueable(HostCommand::PressKey { key: key.clone() }))
}

fn parse_pad_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "pad <button>";
    let [raw] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <button>",
            USAGE,
        ));
    };
    let button = GamepadButton::from_token(raw).ok_or_else(|| {
        CommandParseError::new(format!("unknown gamepad button '{raw}'"), USAGE)
    })?;
    Ok(ParsedCommand::Queueable(HostCommand::PressPad { button }))
}

fn parse_act_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "act <action>";
    let [raw] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <action>",
            USAGE,
        ));
    };
    let action = InputAction::from_token(raw)
        .ok_or_else(|| CommandParseError::new(format!("unknown action '{raw}'"), USAGE))?;
    Ok(ParsedCommand::Queueable(HostCommand::Act { action }))
}

fn parse_point(args: &[String], usage: &str) -> Result<(f32, f32), CommandParseError> {
    let [raw_x, raw_y] = args else {
        return Err(CommandParseError::new("expected <x> <y>", usage));
    };
    let x = raw_x.parse::<f32>().map_err(|_| {
        CommandParseError::new(format!("invalid x coordinate '{raw_x}' (expected f32)"), usage)
    })?;
    let y = raw_y.parse::<f32>().map_err(|_| {
        CommandParseError::new(format!("invalid y coordinate '{raw_y}' (expected f32)"), usage)
    })?;
    Ok((x, y))
}

fn parse_touch_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let (x, y) = parse_point(args, "touch <x> <y>")?;
    Ok(ParsedCommand::Queueable(HostCommand::Touch { x, y }))
}

fn parse_drag_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let (x, y) = parse_point(args, "drag <x> <y>")?;
    Ok(ParsedCommand::Queueable(HostCommand::Drag { x, y }))
}

fn parse_release_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "release")?;
    Ok(ParsedCommand::Queueable(HostCommand::Release))
}

fn parse_board_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "board <boat|ship|airship>";
    let [raw] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <vehicle>",
            USAGE,
        ));
    };
    let kind = VehicleKind::from_token(&raw.to_ascii_lowercase())
        .ok_or_else(|| CommandParseError::new(format!("unknown vehicle '{raw}'"), USAGE))?;
    Ok(ParsedCommand::Queueable(HostCommand::Board { kind }))
}

fn parse_on_off(raw: &str, usage: &str) -> Result<bool, CommandParseError> {
    match raw.to_ascii_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(CommandParseError::new(
            format!("invalid value '{raw}' (expected on|off)"),
            usage,
        )),
    }
}

fn parse_switch_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "switch <switch_id> <on|off>";
    let [raw_id, raw_value] = args else {
        return Err(CommandParseError::new(
            "expected <switch_id> <on|off>",
            USAGE,
        ));
    };
    let switch_id = raw_id
        .parse::<u32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| {
            CommandParseError::new(
                format!("invalid switch id '{raw_id}' (expected positive u32)"),
                USAGE,
            )
        })?;
    let value = parse_on_off(raw_value, USAGE)?;
    Ok(ParsedCommand::Queueable(HostCommand::SetSwitch {
        switch_id,
        value,
    }))
}

fn parse_event_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    const USAGE: &str = "event <on|off>";
    let [raw] = args else {
        return Err(CommandParseError::new(
            "expected exactly one argument <on|off>",
            USAGE,
        ));
    };
    let running = parse_on_off(raw, USAGE)?;
    Ok(ParsedCommand::Queueable(HostCommand::SetEventRunning { running }))
}

fn parse_slot(args: &[String], usage: &str) -> Result<String, CommandParseError> {
    match args {
        [] => Ok("slot1".to_string()),
        [slot] if is_valid_slot_name(slot) => Ok(slot.clone()),
        [slot] => Err(CommandParseError::new(
            format!("invalid slot name '{slot}' (use letters, digits, '-' or '_')"),
            usage,
        )),
        _ => Err(CommandParseError::new("expected at most one argument", usage)),
    }
}

fn is_valid_slot_name(slot: &str) -> bool {
    !slot.is_empty()
        && slot
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

fn parse_save_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let slot = parse_slot(args, "save [slot]")?;
    Ok(ParsedCommand::Queueable(HostCommand::Save { slot }))
}

fn parse_load_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    let slot = parse_slot(args, "load [slot]")?;
    Ok(ParsedCommand::Queueable(HostCommand::Load { slot }))
}

fn parse_status_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "status")?;
    Ok(ParsedCommand::Queueable(HostCommand::Status))
}

fn parse_quit_command(args: &[String]) -> Result<ParsedCommand, CommandParseError> {
    require_no_args(args, "quit")?;
    Ok(ParsedCommand::Queueable(HostCommand::Quit))
}

fn require_no_args(args: &[String], usage: &str) -> Result<(), CommandParseError> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(CommandParseError::new("unexpected extra arguments", usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_output(console: &ConsoleState) -> Vec<String> {
        console.output_lines().map(ToString::to_string).collect()
    }

    fn process(lines: &[&str]) -> (Vec<String>, Vec<HostCommand>) {
        let mut processor = ConsoleCommandProcessor::new();
        let mut console = ConsoleState::default();
        for line in lines {
            console.submit_line(line);
        }
        processor.process_pending_lines(&mut console);
        let mut queued = Vec::new();
        processor.drain_pending_host_commands_into(&mut queued);
        (collect_output(&console), queued)
    }

    #[test]
    fn help_lists_commands_in_registration_order() {
        let (output, _) = process(&["help"]);
        assert_eq!(output[0], "help - List commands");
        assert_eq!(output[1], "clear - Clear console output");
        assert_eq!(output[2], "echo <text...> - Print text to console");
        assert_eq!(output.last().map(String::as_str), Some("say <text...> - Show a message through the window text filters"));
    }

    #[test]
    fn unknown_command_reports_clear_error() {
        let (output, queued) = process(&["nope"]);
        assert_eq!(output, vec!["error: unknown command 'nope'. try: help"]);
        assert!(queued.is_empty());
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let (output, queued) = process(&["# setup", "   ", "tick"]);
        assert!(output.is_empty());
        assert_eq!(queued, vec![HostCommand::Tick { count: 1 }]);
    }

    #[test]
    fn bad_args_report_usage_hint() {
        let (output, _) = process(&["tick soon", "switch 0 on", "board car"]);
        assert_eq!(
            output,
            vec![
                "error: invalid tick count 'soon' (expected u32). usage: tick [count]",
                "error: invalid switch id '0' (expected positive u32). usage: switch <switch_id> <on|off>",
                "error: unknown vehicle 'car'. usage: board <boat|ship|airship>",
            ]
        );
    }

    #[test]
    fn local_commands_are_immediate_and_not_enqueued() {
        let (output, queued) = process(&["echo hi", "clear", "echo bye"]);
        assert!(queued.is_empty());
        assert_eq!(output, vec!["bye"]);
    }

    #[test]
    fn queueable_parse_success_enqueues_host_commands() {
        let (output, queued) = process(&[
            "tick 30",
            "press a",
            "pad lb",
            "act ok",
            "touch 150 500",
            "drag 210.5 500",
            "release",
            "board Ship",
            "switch 3 off",
            "event on",
            "save",
            "load slot-2",
            "say \"the Ship sails\"",
            "quit",
        ]);
        assert!(output.is_empty(), "{output:?}");
        assert_eq!(
            queued,
            vec![
                HostCommand::Tick { count: 30 },
                HostCommand::PressKey {
                    key: "a".to_string()
                },
                HostCommand::PressPad {
                    button: GamepadButton::LeftBumper
                },
                HostCommand::Act {
                    action: InputAction::Ok
                },
                HostCommand::Touch { x: 150.0, y: 500.0 },
                HostCommand::Drag { x: 210.5, y: 500.0 },
                HostCommand::Release,
                HostCommand::Board {
                    kind: VehicleKind::Ship
                },
                HostCommand::SetSwitch {
                    switch_id: 3,
                    value: false
                },
                HostCommand::SetEventRunning { running: true },
                HostCommand::Save {
                    slot: "slot1".to_string()
                },
                HostCommand::Load {
                    slot: "slot-2".to_string()
                },
                HostCommand::Say {
                    text: "the Ship sails".to_string()
                },
                HostCommand::Quit,
            ]
        );
    }

    #[test]
    fn plugin_commands_forward_raw_arguments() {
        let mut processor = ConsoleCommandProcessor::new();
        processor
            .registry_mut()
            .register_plugin_command("change_vehicle", "Change interior", "<vehicle> ...")
            .expect("register");
        let mut console = ConsoleState::default();
        console.submit_line("CHANGE_VEHICLE boat 5 3 3 down");

        processor.process_pending_lines(&mut console);

        let mut queued = Vec::new();
        processor.drain_pending_host_commands_into(&mut queued);
        assert_eq!(
            queued,
            vec![HostCommand::Plugin(PluginCommand {
                name: "change_vehicle".to_string(),
                args: vec!["boat", "5", "3", "3", "down"]
                    .into_iter()
                    .map(String::from)
                    .collect(),
            })]
        );
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut processor = ConsoleCommandProcessor::new();
        let error = processor
            .registry_mut()
            .register_plugin_command("Tick", "again", "")
            .expect_err("duplicate");
        assert_eq!(error, "duplicate command registration: Tick");
    }

    #[test]
    fn slot_names_are_restricted_to_path_safe_characters() {
        let (output, queued) = process(&["save ../etc"]);
        assert!(queued.is_empty());
        assert_eq!(output.len(), 1);
        assert!(output[0].starts_with("error: invalid slot name '../etc'"));
    }

    #[test]
    fn tokenizer_handles_quotes_and_errors() {
        assert_eq!(
            tokenize_line("say \"a b\" c").expect("tokens"),
            vec!["say", "a b", "c"]
        );
        assert_eq!(tokenize_line("echo \"\"").expect("tokens"), vec!["echo", ""]);
        assert!(tokenize_line("say \"open").is_err());
    }

    #[test]
    fn pending_queue_is_bounded() {
        let mut processor = ConsoleCommandProcessor::new();
        for _ in 0..(MAX_PENDING_HOST_COMMANDS + 5) {
            processor.push_queueable(HostCommand::Status);
        }
        let mut queued = Vec::new();
        processor.drain_pending_host_commands_into(&mut queued);
        assert_eq!(queued.len(), MAX_PENDING_HOST_COMMANDS);
    }
}
