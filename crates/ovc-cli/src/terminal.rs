//! Terminal frontend: the line editor with live completion, dialoguer
//! prompts and ssh console sessions

use crate::editor::{History, LineBuffer};
use crate::picker::TerminalPicker;
use crate::theme::Theme;
use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{Print, ResetColor, SetForegroundColor, Stylize},
    terminal::{self, Clear, ClearType},
    QueueableCommand,
};
use dialoguer::{Confirm, Input};
use ovc_api::ConsoleSession;
use ovc_core::{labels, Component, CoreError, Frontend, Picker, Prompt, Result};
use std::io::{self, BufRead, IsTerminal, Stdout, Write};
use std::process::Command;

/// Guard that restores terminal state on drop
struct RawModeGuard {
    was_raw: bool,
}

impl RawModeGuard {
    fn new() -> io::Result<Self> {
        let was_raw = terminal::is_raw_mode_enabled()?;
        if !was_raw {
            terminal::enable_raw_mode()?;
        }
        Ok(Self { was_raw })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if !self.was_raw {
            let _ = terminal::disable_raw_mode();
        }
    }
}

/// What a key press does to the line being edited
#[derive(Debug, PartialEq, Eq)]
enum KeyOutcome {
    Continue,
    Submit,
    Quit,
}

pub struct TerminalFrontend {
    theme: Theme,
    picker: TerminalPicker,
    history: History,
    forward_agent: bool,
}

impl TerminalFrontend {
    pub fn new(theme: Theme, picker: TerminalPicker, forward_agent: bool) -> Self {
        Self {
            theme,
            picker,
            history: History::new(),
            forward_agent,
        }
    }

    /// Plain line input when stdin is not a terminal; validation messages
    /// go to stderr and the line is read again
    fn read_plain(&mut self, prompt: &Prompt, top: &Component) -> io::Result<Option<String>> {
        let stdin = io::stdin();
        loop {
            print!("{}", prompt.plain());
            io::stdout().flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let line = line.trim_end_matches(['\r', '\n']);
            if line.trim().is_empty() {
                continue;
            }
            match top.validate(line) {
                Ok(()) => return Ok(Some(line.to_string())),
                Err(e) => eprintln!("{}", e),
            }
        }
    }

    fn read_interactive(&mut self, prompt: &Prompt, top: &Component) -> io::Result<Option<String>> {
        let _guard = RawModeGuard::new()?;
        let mut stdout = io::stdout();
        let mut line = LineBuffer::new();
        let mut message: Option<String> = None;
        self.history.reset();

        loop {
            self.render(&mut stdout, prompt, top, &line, message.as_deref())?;

            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match self.handle_key(key, &mut line, top) {
                KeyOutcome::Continue => message = None,
                KeyOutcome::Quit => {
                    self.finish(&mut stdout, prompt, line.value())?;
                    return Ok(None);
                }
                KeyOutcome::Submit => {
                    let text = line.value().to_string();
                    if text.trim().is_empty() {
                        self.finish(&mut stdout, prompt, "")?;
                        return Ok(Some(String::new()));
                    }
                    match top.validate(&text) {
                        Ok(()) => {
                            self.finish(&mut stdout, prompt, &text)?;
                            self.history.push(&text);
                            return Ok(Some(text));
                        }
                        Err(e) => message = Some(e.to_string()),
                    }
                }
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent, line: &mut LineBuffer, top: &Component) -> KeyOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => return KeyOutcome::Quit,
            KeyCode::Char('d') if ctrl => {
                if line.is_empty() {
                    return KeyOutcome::Quit;
                }
                line.delete();
            }
            KeyCode::Char('a') if ctrl => line.home(),
            KeyCode::Char('e') if ctrl => line.end(),
            KeyCode::Char('u') if ctrl => line.clear(),
            KeyCode::Char(c) => line.insert(c),
            KeyCode::Backspace => line.backspace(),
            KeyCode::Delete => line.delete(),
            KeyCode::Left => line.move_left(),
            KeyCode::Right => line.move_right(),
            KeyCode::Home => line.home(),
            KeyCode::End => line.end(),
            KeyCode::Esc => line.clear(),
            KeyCode::Up => {
                if let Some(entry) = self.history.older() {
                    line.set_value(entry);
                }
            }
            KeyCode::Down => match self.history.newer() {
                Some(entry) => line.set_value(entry),
                None => line.clear(),
            },
            KeyCode::Tab => {
                let candidates = top.completions();
                line.complete(&labels(&candidates));
            }
            KeyCode::Enter => return KeyOutcome::Submit,
            _ => {}
        }
        KeyOutcome::Continue
    }

    /// Redraw the prompt line and the hint line below it, leaving the
    /// cursor in the input
    fn render(
        &self,
        stdout: &mut Stdout,
        prompt: &Prompt,
        top: &Component,
        line: &LineBuffer,
        message: Option<&str>,
    ) -> io::Result<()> {
        let width = terminal::size().map(|(cols, _)| cols as usize).unwrap_or(80);

        stdout.queue(MoveToColumn(0))?;
        stdout.queue(Clear(ClearType::FromCursorDown))?;
        self.queue_prompt(stdout, prompt)?;
        stdout.queue(Print(line.value()))?;
        stdout.queue(Print("\r\n"))?;

        match message {
            Some(message) => {
                stdout.queue(SetForegroundColor(self.theme.error))?;
                stdout.queue(Print(truncate(message, width)))?;
                stdout.queue(ResetColor)?;
            }
            None => {
                let mut used = 0;
                for candidate in top.matching(line.value()) {
                    let cost = candidate.label.chars().count() + 2;
                    if used + cost > width {
                        break;
                    }
                    used += cost;
                    stdout.queue(SetForegroundColor(self.theme.candidate_color(candidate.kind)))?;
                    stdout.queue(Print(&candidate.label))?;
                    stdout.queue(ResetColor)?;
                    stdout.queue(Print("  "))?;
                }
            }
        }

        let column = prompt.plain().chars().count() + line.cursor_column();
        stdout.queue(MoveUp(1))?;
        stdout.queue(MoveToColumn(column.min(u16::MAX as usize) as u16))?;
        stdout.flush()
    }

    /// Leave the accepted line on screen and drop the hint line
    fn finish(&self, stdout: &mut Stdout, prompt: &Prompt, text: &str) -> io::Result<()> {
        stdout.queue(MoveToColumn(0))?;
        stdout.queue(Clear(ClearType::FromCursorDown))?;
        self.queue_prompt(stdout, prompt)?;
        stdout.queue(Print(text))?;
        stdout.queue(Print("\r\n"))?;
        stdout.flush()
    }

    fn queue_prompt(&self, stdout: &mut Stdout, prompt: &Prompt) -> io::Result<()> {
        for segment in &prompt.segments {
            stdout.queue(SetForegroundColor(self.theme.prompt_color(segment.style)))?;
            stdout.queue(Print(&segment.text))?;
        }
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

fn prompt_error(e: dialoguer::Error) -> CoreError {
    CoreError::Prompt(e.to_string())
}

impl Picker for TerminalFrontend {
    fn pick(&mut self, prompt: &str, items: &[String]) -> Result<String> {
        self.picker.pick(prompt, items)
    }
}

impl Frontend for TerminalFrontend {
    fn read_command(&mut self, prompt: &Prompt, top: &Component) -> io::Result<Option<String>> {
        if io::stdin().is_terminal() {
            self.read_interactive(prompt, top)
        } else {
            self.read_plain(prompt, top)
        }
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(false)
            .interact()
            .map_err(prompt_error)
    }

    fn ask(&mut self, question: &str, default: Option<&str>) -> Result<String> {
        let mut input = Input::<String>::new()
            .with_prompt(question.trim_end().trim_end_matches(':'))
            .allow_empty(true);
        if let Some(default) = default {
            input = input.default(default.to_string());
        }
        input.interact_text().map_err(prompt_error)
    }

    fn show(&mut self, text: &str) {
        println!("{}", text);
    }

    fn error(&mut self, text: &str) {
        eprintln!("{}", text.with(self.theme.error));
    }

    fn run_session(&mut self, session: &ConsoleSession) -> Result<()> {
        let args = session.ssh_args(self.forward_agent);
        println!("ssh {}", shell_words::join(&args));

        let status = Command::new("ssh").args(&args).status()?;
        if !status.success() {
            tracing::warn!("ssh exited with {}", status);
        }
        Ok(())
    }
}
