use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;

use crate::action::{ThreadCommand, ThreadEvent};
use crate::error::{Result, ThreadViewError};
use crate::state::ThreadViewState;
use crate::style::ThreadViewStyle;
use crate::widget::ThreadPager;

// Upper bound on how long the loop blocks waiting for input.
const IDLE_POLL: Duration = Duration::from_millis(250);

/// Destination of copied text (system clipboard, file, test recorder...).
pub trait Clipboard: Send + Sync + 'static {
    fn set_text(&self, text: &str) -> Result<()>;
}

impl<F> Clipboard for F
where
    F: Fn(&str) -> Result<()> + Send + Sync + 'static,
{
    fn set_text(&self, text: &str) -> Result<()> {
        self(text)
    }
}

/// Messages consumed by the event loop, one at a time.
#[derive(Debug)]
pub enum Message {
    Input(Event),
    /// Outcome of a background clipboard write.
    CopyFinished(std::result::Result<(), String>),
    /// A scheduled status clear came due.
    ClearStatus(u64),
}

/// Single-consumer loop connecting the terminal, the engine and the clipboard worker.
pub struct EventLoop<C> {
    clipboard: Arc<C>,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    timers: Vec<(Instant, Message)>,
    style: ThreadViewStyle,
    quit: bool,
}

impl<C: Clipboard> EventLoop<C> {
    pub fn new(clipboard: C) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            clipboard: Arc::new(clipboard),
            tx,
            rx,
            timers: Vec::new(),
            style: ThreadViewStyle::default(),
            quit: false,
        }
    }

    #[must_use]
    pub fn style(mut self, style: ThreadViewStyle) -> Self {
        self.style = style;
        self
    }

    /// Sender for posting messages from other threads.
    pub fn sender(&self) -> Sender<Message> {
        self.tx.clone()
    }

    pub const fn is_quitting(&self) -> bool {
        self.quit
    }

    /// Feeds one message to the engine. Returns whether a redraw is needed.
    pub fn dispatch<Id>(&mut self, state: &mut ThreadViewState<Id>, msg: Message) -> bool
    where
        Id: Copy + Eq + Hash + Display,
    {
        let event = match msg {
            Message::Input(event) => state.handle_input(event),
            Message::CopyFinished(result) => state.copy_finished(result),
            Message::ClearStatus(token) => state.clear_status(token),
        };
        match event {
            ThreadEvent::Handled => true,
            ThreadEvent::Unhandled => false,
            ThreadEvent::Command(command) => {
                self.execute(command);
                true
            }
        }
    }

    /// Carries out a command returned by the engine.
    pub fn execute(&mut self, command: ThreadCommand) {
        match command {
            ThreadCommand::Quit => self.quit = true,
            ThreadCommand::Copy(text) => {
                tracing::debug!(bytes = text.len(), "copying to clipboard");
                let clipboard = Arc::clone(&self.clipboard);
                let tx = self.tx.clone();
                thread::spawn(move || {
                    let result = clipboard.set_text(&text).map_err(|err| match err {
                        ThreadViewError::ClipboardFailure(reason) => reason,
                        other => other.to_string(),
                    });
                    // The loop may already be gone.
                    let _ = tx.send(Message::CopyFinished(result));
                });
            }
            ThreadCommand::ClearStatusAfter { delay, token } => {
                self.timers
                    .push((Instant::now() + delay, Message::ClearStatus(token)));
            }
        }
    }

    /// Removes and returns the timers due at `now`.
    fn take_due(&mut self, now: Instant) -> Vec<Message> {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.timers)
            .into_iter()
            .partition(|(deadline, _)| *deadline <= now);
        self.timers = pending;
        due.into_iter().map(|(_, msg)| msg).collect()
    }

    fn poll_timeout(&self, now: Instant) -> Duration {
        self.timers
            .iter()
            .map(|(deadline, _)| deadline.saturating_duration_since(now))
            .min()
            .map_or(IDLE_POLL, |next| next.min(IDLE_POLL))
    }

    /// Runs until a quit command, drawing `state` with a [`ThreadPager`] filling the frame.
    pub fn run<Id>(
        &mut self,
        terminal: &mut DefaultTerminal,
        state: &mut ThreadViewState<Id>,
    ) -> Result<()>
    where
        Id: Copy + Eq + Hash + Display,
    {
        let mut needs_render = true;
        while !self.quit {
            if needs_render {
                terminal.draw(|frame| {
                    frame.render_stateful_widget(ThreadPager::new(self.style), frame.area(), state);
                })?;
                needs_render = false;
            }

            if event::poll(self.poll_timeout(Instant::now()))? {
                needs_render |= self.dispatch(state, Message::Input(event::read()?));
                // Coalesce bursts (key repeat, wheel) into one frame.
                while !self.quit && event::poll(Duration::ZERO)? {
                    needs_render |= self.dispatch(state, Message::Input(event::read()?));
                }
            }

            while let Ok(msg) = self.rx.try_recv() {
                needs_render |= self.dispatch(state, msg);
            }
            for msg in self.take_due(Instant::now()) {
                needs_render |= self.dispatch(state, msg);
            }
        }
        tracing::debug!("event loop finished");
        Ok(())
    }
}
