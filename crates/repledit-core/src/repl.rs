//! Session loop tying input, dispatch, rendering, and the embedder together.
//!
//! A [`Repl`] repeatedly edits one submission and hands the finalized text to
//! a [`ReplHandler`]. The handler is where a language plugs in: evaluation,
//! completeness detection, meta commands, and line coloring all live behind
//! that trait, while the engine owns everything about keystrokes and the
//! screen.
//!
//! The engine assumes the terminal is already in raw mode; the embedder
//! enables it (see the io crate's `RawModeGuard`) and holds the guard for
//! the duration of [`Repl::run`]. Because raw mode disables output
//! post-processing, all line breaks written by handlers must be `"\r\n"`.

use crate::buffer::SubmissionBuffer;
use crate::console::{ConsoleInput, ConsoleOutput, ConsoleResult};
use crate::history::History;
use crate::key_handler::{KeyDispatcher, KeyResult};
use crate::renderer::Renderer;

/// How long one read waits before the key parser gets a chance to resolve a
/// pending partial sequence (this is what turns a lone ESC into Escape).
const READ_TIMEOUT_MS: u32 = 100;

/// Language-side collaborator the session loop calls into.
///
/// Only [`evaluate_submission`] is required; the other hooks default to the
/// engine's plain behavior.
///
/// [`evaluate_submission`]: ReplHandler::evaluate_submission
pub trait ReplHandler {
    /// Evaluate one finalized submission.
    fn evaluate_submission(&mut self, output: &dyn ConsoleOutput, text: &str)
        -> ConsoleResult<()>;

    /// Handle a submission that began with the command prefix. `command` is
    /// the text with the prefix stripped.
    fn evaluate_meta_command(
        &mut self,
        output: &dyn ConsoleOutput,
        command: &str,
    ) -> ConsoleResult<()> {
        output.write_text(&format!("Unknown command: #{command}\r\n"))
    }

    /// Whether the text forms a complete submission Enter should finalize.
    /// Incomplete submissions grow by one line instead.
    fn is_complete_submission(&self, _text: &str) -> bool {
        true
    }

    /// Paint one logical line during a repaint. Whatever is written must
    /// occupy exactly the line's rune count in screen columns.
    fn paint_line(&self, output: &dyn ConsoleOutput, line: &str) -> ConsoleResult<()> {
        output.write_text(line)
    }
}

/// Interactive session: edits submissions and dispatches them to a handler.
pub struct Repl {
    input: Box<dyn ConsoleInput>,
    output: Box<dyn ConsoleOutput>,
    handler: Box<dyn ReplHandler>,
    dispatcher: KeyDispatcher,
    history: History,
    command_prefix: char,
}

impl Repl {
    pub fn new(
        input: Box<dyn ConsoleInput>,
        output: Box<dyn ConsoleOutput>,
        handler: Box<dyn ReplHandler>,
    ) -> Self {
        Self {
            input,
            output,
            handler,
            dispatcher: KeyDispatcher::new(),
            history: History::new(),
            command_prefix: '#',
        }
    }

    /// Use a different meta command prefix character.
    pub fn with_command_prefix(mut self, prefix: char) -> Self {
        self.command_prefix = prefix;
        self
    }

    /// The key binding table, for rebinding before [`run`].
    ///
    /// [`run`]: Repl::run
    pub fn dispatcher_mut(&mut self) -> &mut KeyDispatcher {
        &mut self.dispatcher
    }

    /// Submissions evaluated so far.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Run edit-evaluate cycles until the user submits an empty first line.
    pub fn run(&mut self) -> ConsoleResult<()> {
        let caps = self.input.get_capabilities();
        log::debug!(
            "session starting on {} ({:?})",
            caps.platform_name,
            caps.backend_type
        );

        loop {
            let text = self.edit_submission()?;
            if text.is_empty() {
                log::debug!("session ended after {} submission(s)", self.history.len());
                return Ok(());
            }

            if let Some(command) = text.strip_prefix(self.command_prefix) {
                self.handler
                    .evaluate_meta_command(self.output.as_ref(), command)?;
            } else {
                self.handler
                    .evaluate_submission(self.output.as_ref(), &text)?;
            }

            self.history.append(text);
        }
    }

    /// Edit one submission to completion. An empty result is the session's
    /// end sentinel, produced by Enter on a sole blank first line.
    fn edit_submission(&mut self) -> ConsoleResult<String> {
        let start = self.output.get_cursor_position()?;
        let (width, _) = self.input.get_window_size()?;
        let mut buffer = SubmissionBuffer::new();
        let mut renderer = Renderer::new(start, width);

        self.repaint(&mut renderer, &buffer)?;

        loop {
            let Some(event) = self.input.read_key_timeout(Some(READ_TIMEOUT_MS))? else {
                continue;
            };
            log::trace!("key event: {:?}", event.key);

            match self.dispatcher.dispatch(&event, &mut buffer) {
                KeyResult::Edited => self.repaint(&mut renderer, &buffer)?,
                KeyResult::Moved => renderer.update_cursor(self.output.as_ref(), &buffer)?,
                KeyResult::Submit => {
                    if let Some(text) = self.finish_submission(&mut renderer, &mut buffer)? {
                        return Ok(text);
                    }
                }
                KeyResult::HistoryPrevious => {
                    if let Some(entry) = self.history.previous().map(str::to_string) {
                        buffer.load_text(&entry);
                        self.repaint(&mut renderer, &buffer)?;
                    }
                }
                KeyResult::HistoryNext => {
                    if let Some(entry) = self.history.next().map(str::to_string) {
                        buffer.load_text(&entry);
                        self.repaint(&mut renderer, &buffer)?;
                    }
                }
                KeyResult::Ignored => {}
            }
        }
    }

    /// Decide what Enter means right now.
    ///
    /// A sole blank first line is the end-of-session sentinel, even when
    /// later lines exist. Otherwise the submission finalizes when the
    /// current line is empty or the handler deems the text complete; if
    /// neither holds, an empty line is appended and editing continues.
    fn finish_submission(
        &self,
        renderer: &mut Renderer,
        buffer: &mut SubmissionBuffer,
    ) -> ConsoleResult<Option<String>> {
        if buffer.line_index() == 0 && buffer.current_line().is_empty() {
            self.write_newline()?;
            return Ok(Some(String::new()));
        }

        let text = buffer.text();
        if buffer.current_line().is_empty() || self.handler.is_complete_submission(&text) {
            buffer.move_to_submission_end();
            renderer.update_cursor(self.output.as_ref(), buffer)?;
            self.write_newline()?;
            log::debug!("submission finalized with {} line(s)", buffer.line_count());
            return Ok(Some(text));
        }

        buffer.append_line();
        self.repaint(renderer, buffer)?;
        Ok(None)
    }

    fn repaint(&self, renderer: &mut Renderer, buffer: &SubmissionBuffer) -> ConsoleResult<()> {
        // Track live resizes; on failure keep the width we had
        match self.input.get_window_size() {
            Ok((width, _)) => renderer.set_window_width(width),
            Err(err) => log::debug!("window size query failed: {err}"),
        }

        let handler = self.handler.as_ref();
        renderer.render(self.output.as_ref(), buffer, |out, line| {
            handler.paint_line(out, line)
        })?;
        renderer.update_cursor(self.output.as_ref(), buffer)
    }

    fn write_newline(&self) -> ConsoleResult<()> {
        self.output.write_text("\r\n")?;
        self.output.flush()
    }
}
