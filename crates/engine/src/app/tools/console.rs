use std::collections::VecDeque;

const CONSOLE_PROMPT_PREFIX: &str = "> ";

pub(crate) const MAX_HISTORY_LINES: usize = 64;
pub(crate) const MAX_OUTPUT_LINES: usize = 256;
pub(crate) const MAX_PENDING_LINES: usize = 64;
pub(crate) const MAX_LINE_CHARS: usize = 256;

/// Line buffers of the host console. Lines are submitted whole (stdin or a
/// script) and echoed into the output with a prompt prefix.
#[derive(Debug, Default)]
pub struct ConsoleState {
    echo_input: bool,
    history: VecDeque<String>,
    output_lines: VecDeque<String>,
    pending_lines: VecDeque<String>,
}

impl ConsoleState {
    pub fn with_echo(echo_input: bool) -> Self {
        Self {
            echo_input,
            ..Self::default()
        }
    }

    pub fn submit_line(&mut self, raw_line: &str) {
        let line = sanitize_line(raw_line);
        push_bounded(&mut self.history, line.clone(), MAX_HISTORY_LINES);
        if self.echo_input {
            push_bounded(
                &mut self.output_lines,
                format!("{CONSOLE_PROMPT_PREFIX}{line}"),
                MAX_OUTPUT_LINES,
            );
        }
        push_bounded(&mut self.pending_lines, line, MAX_PENDING_LINES);
    }

    pub fn output_lines(&self) -> impl Iterator<Item = &str> {
        self.output_lines.iter().map(String::as_str)
    }

    pub fn drain_output_lines_into(&mut self, out: &mut Vec<String>) {
        out.extend(self.output_lines.drain(..));
    }

    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }

    pub(crate) fn append_output_line(&mut self, line: impl Into<String>) {
        push_bounded(&mut self.output_lines, line.into(), MAX_OUTPUT_LINES);
    }

    pub(crate) fn clear_output_lines(&mut self) {
        self.output_lines.clear();
    }

    pub(crate) fn drain_pending_lines_into(&mut self, out: &mut Vec<String>) {
        out.extend(self.pending_lines.drain(..));
    }
}

fn sanitize_line(raw_line: &str) -> String {
    raw_line
        .chars()
        .filter(|ch| !ch.is_control())
        .take(MAX_LINE_CHARS)
        .collect()
}

fn push_bounded(queue: &mut VecDeque<String>, value: String, max_len: usize) {
    if queue.len() == max_len {
        queue.pop_front();
    }
    queue.push_back(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_echoes_and_enqueues_raw_line() {
        let mut console = ConsoleState::with_echo(true);
        console.submit_line("tick 3");

        assert_eq!(console.output_lines().collect::<Vec<_>>(), vec!["> tick 3"]);
        let mut pending = Vec::new();
        console.drain_pending_lines_into(&mut pending);
        assert_eq!(pending, vec!["tick 3"]);
    }

    #[test]
    fn control_characters_are_stripped_and_length_capped() {
        let mut console = ConsoleState::default();
        console.submit_line("say\thi\r");
        console.submit_line(&"x".repeat(MAX_LINE_CHARS + 10));

        let mut pending = Vec::new();
        console.drain_pending_lines_into(&mut pending);
        assert_eq!(pending[0], "sayhi");
        assert_eq!(pending[1].chars().count(), MAX_LINE_CHARS);
        assert_eq!(console.output_lines().count(), 0, "echo disabled");
    }

    #[test]
    fn bounded_buffers_drop_oldest_entries() {
        let mut console = ConsoleState::default();
        for i in 0..(MAX_PENDING_LINES + 3) {
            console.submit_line(&format!("echo {i}"));
        }
        let mut pending = Vec::new();
        console.drain_pending_lines_into(&mut pending);
        assert_eq!(pending.len(), MAX_PENDING_LINES);
        assert_eq!(pending[0], "echo 3");
        assert_eq!(console.history().count(), MAX_HISTORY_LINES);
    }

    #[test]
    fn drained_output_is_removed() {
        let mut console = ConsoleState::default();
        console.append_output_line("one");
        console.append_output_line("two");
        let mut out = Vec::new();
        console.drain_output_lines_into(&mut out);
        assert_eq!(out, vec!["one", "two"]);
        assert_eq!(console.output_lines().count(), 0);
    }
}
