// ── Keyboard-interactive prompting ───────────────────────────────────────────

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// One server prompt. `echo` is false for secrets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KbdPrompt {
    pub text: String,
    pub echo: bool,
}

impl KbdPrompt {
    pub fn new(text: impl Into<String>, echo: bool) -> Self {
        Self {
            text: text.into(),
            echo,
        }
    }
}

/// Synchronous callback invoked by the transport during keyboard-interactive
/// auth. Must return exactly one response per prompt, in order.
pub trait Prompter {
    fn respond(&mut self, name: &str, instruction: &str, prompts: &[KbdPrompt]) -> Vec<String>;
}

// ── Console ──────────────────────────────────────────────────────────────────

/// Shows prompts on `output` and reads one line per prompt from `input`.
pub struct ConsolePrompter<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompter<io::BufReader<io::Stdin>, io::Stderr> {
    /// Prompts on stderr, answers from stdin. Stdin is not locked until asked.
    pub fn stdio() -> Self {
        ConsolePrompter::new(io::BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_response(&mut self) -> String {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) => {
                while line.ends_with('\n') || line.ends_with('\r') {
                    line.pop();
                }
                line
            }
            // Exhausted or broken input: the only valid answer left is empty.
            Err(_) => String::new(),
        }
    }
}

impl<R: BufRead, W: Write> Prompter for ConsolePrompter<R, W> {
    fn respond(&mut self, name: &str, instruction: &str, prompts: &[KbdPrompt]) -> Vec<String> {
        if !name.is_empty() {
            let _ = writeln!(self.output, "{}", name);
        }
        if !instruction.is_empty() {
            let _ = writeln!(self.output, "{}", instruction);
        }

        let mut responses = Vec::with_capacity(prompts.len());
        for prompt in prompts {
            let _ = write!(self.output, "{}", prompt.text);
            let _ = self.output.flush();
            responses.push(self.read_response());
        }
        responses
    }
}

// ── Scripted ─────────────────────────────────────────────────────────────────

/// Answers from a preset queue, then with empty strings.
#[derive(Debug, Default, Clone)]
pub struct ScriptedPrompter {
    responses: VecDeque<String>,
    asked: usize,
}

impl ScriptedPrompter {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            asked: 0,
        }
    }

    /// Number of prompts answered so far.
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl Prompter for ScriptedPrompter {
    fn respond(&mut self, _name: &str, _instruction: &str, prompts: &[KbdPrompt]) -> Vec<String> {
        self.asked += prompts.len();
        prompts
            .iter()
            .map(|_| self.responses.pop_front().unwrap_or_default())
            .collect()
    }
}
