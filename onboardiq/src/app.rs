//! Application state for the TUI.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use onboardiq_core::analytics::{AdminAggregator, AdminReport};
use onboardiq_core::{
    Assistant, Catalog, CompletionStore, MessageLog, Progress, RandomChooser, Reply,
    SessionRegistry, SessionState,
};

use crate::command::{parse_line, Command};
use crate::pizza::PizzaGeometry;

/// Number of confetti pieces spawned on full completion.
const CONFETTI_COUNT: u64 = 40;

/// How many frames the confetti keeps falling (~10s at 100ms ticks).
const CONFETTI_FRAMES: u64 = 100;

/// Top-level navigation sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Section {
    /// Chat and pizza progress
    #[default]
    User,
    /// Aggregate completion stats
    Admin,
    /// Static description
    About,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::User, Section::Admin, Section::About];

    pub fn title(&self) -> &'static str {
        match self {
            Section::User => "User",
            Section::Admin => "Admin",
            Section::About => "About App",
        }
    }

    fn next(self) -> Self {
        match self {
            Section::User => Section::Admin,
            Section::Admin => Section::About,
            Section::About => Section::User,
        }
    }

    fn previous(self) -> Self {
        match self {
            Section::User => Section::About,
            Section::Admin => Section::User,
            Section::About => Section::Admin,
        }
    }
}

/// A submitted message waiting out the typing delay.
#[derive(Debug, Clone)]
pub struct PendingReply {
    pub input: String,
    pub submitted_at: Instant,
}

/// A falling confetti piece: (x, y, speed, color index).
pub type Confetti = (u16, u16, u8, usize);

/// Main application state.
pub struct App<S> {
    /// Assistant wrapping the catalog and stores
    assistant: Assistant<S, RandomChooser>,
    /// Sessions opened during this run, keyed by user
    registry: SessionRegistry,
    /// User whose session the User view shows
    pub active_user: String,
    /// Current navigation section
    pub section: Section,
    /// Text being typed in the chat input
    pub input: String,
    /// Message waiting for its reply
    pub pending: Option<PendingReply>,
    typing_delay: Duration,
    /// Wrapped rows scrolled up from the bottom of the transcript
    pub scroll_offset: usize,
    /// Latest admin snapshot
    pub admin_report: Option<AdminReport>,
    /// Error message if the admin report failed
    pub admin_error: Option<String>,
    /// Transient status line (login notices, errors)
    pub status: Option<String>,
    /// Sample points for the pizza canvas
    pub pizza: PizzaGeometry,
    /// Animation frame counter (increments each tick)
    pub animation_frame: u64,
    /// Frame at which the current celebration started
    celebration_started: Option<u64>,
    /// Confetti pieces for the celebration animation
    pub confetti: Vec<Confetti>,
    /// Whether the app should exit
    pub should_quit: bool,
}

impl<S> App<S>
where
    S: CompletionStore + MessageLog,
{
    /// Create the app and log `user` in.
    pub fn new(
        assistant: Assistant<S, RandomChooser>,
        user: &str,
        typing_delay: Duration,
    ) -> onboardiq_core::Result<Self> {
        let mut registry = SessionRegistry::new();
        assistant.login_into(&mut registry, user)?;
        let pizza = PizzaGeometry::new(assistant.catalog().len());

        Ok(Self {
            assistant,
            registry,
            active_user: user.to_string(),
            section: Section::default(),
            input: String::new(),
            pending: None,
            typing_delay,
            scroll_offset: 0,
            admin_report: None,
            admin_error: None,
            status: None,
            pizza,
            animation_frame: 0,
            celebration_started: None,
            confetti: Vec::new(),
            should_quit: false,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        self.assistant.catalog()
    }

    /// The session shown in the User view.
    pub fn session(&self) -> Option<&SessionState> {
        self.registry.get(&self.active_user)
    }

    pub fn progress(&self) -> Progress {
        self.session()
            .map(|s| s.progress(self.assistant.catalog()))
            .unwrap_or(Progress {
                completed: 0,
                total: self.assistant.catalog().len(),
            })
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration_started.is_some()
    }

    // ========== Key handling ==========

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.open_section(self.section.next()),
            KeyCode::BackTab => self.open_section(self.section.previous()),
            KeyCode::F(1) => self.open_section(Section::User),
            KeyCode::F(2) => self.open_section(Section::Admin),
            KeyCode::F(3) => self.open_section(Section::About),
            _ => match self.section {
                Section::User => self.handle_user_key(key),
                Section::Admin => self.handle_admin_key(key),
                Section::About => self.handle_about_key(key),
            },
        }
    }

    /// Handle keyboard input in the chat view.
    fn handle_user_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Up => self.scroll_offset = self.scroll_offset.saturating_add(1),
            KeyCode::Down => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            KeyCode::PageUp => self.scroll_offset = self.scroll_offset.saturating_add(10),
            KeyCode::PageDown => self.scroll_offset = self.scroll_offset.saturating_sub(10),
            KeyCode::End => self.scroll_offset = 0,
            _ => {}
        }
    }

    /// Handle keyboard input in the admin view.
    fn handle_admin_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') => self.refresh_admin_report(),
            _ => {}
        }
    }

    fn handle_about_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('q') {
            self.should_quit = true;
        }
    }

    fn open_section(&mut self, section: Section) {
        self.section = section;
        if section == Section::Admin {
            self.refresh_admin_report();
        }
    }

    // ========== Chat ==========

    /// Take the input line and act on it.
    fn submit_input(&mut self) {
        if self.pending.is_some() {
            // One message at a time
            return;
        }

        let line = std::mem::take(&mut self.input);
        match parse_line(&line) {
            Command::Empty => {}
            Command::Login(user) => self.switch_user(&user),
            Command::Say(text) => {
                self.status = None;
                self.scroll_offset = 0;
                self.pending = Some(PendingReply {
                    input: text,
                    submitted_at: Instant::now(),
                });
            }
        }
    }

    /// Make `user` the active session, seeding it from the store if new.
    pub fn switch_user(&mut self, user: &str) {
        match self.assistant.login_into(&mut self.registry, user) {
            Ok(session) => {
                let percent = session.progress(self.assistant.catalog()).percent();
                tracing::info!(user, percent, "Switched active user");
                self.status = Some(format!("Logged in as {} ({}% complete)", user, percent));
                self.active_user = user.to_string();
                self.scroll_offset = 0;
                self.stop_celebration();
            }
            Err(e) => {
                tracing::warn!(user, error = %e, "Login failed");
                self.status = Some(format!("Login failed: {}", e));
            }
        }
    }

    /// Deliver the pending reply once the typing delay has passed.
    ///
    /// Returns the reply if one was produced.
    pub fn poll_pending(&mut self, now: Instant) -> Option<Reply> {
        let ready = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_duration_since(p.submitted_at) >= self.typing_delay);
        if !ready {
            return None;
        }
        let pending = self.pending.take()?;

        let result = match self.assistant.login_into(&mut self.registry, &self.active_user) {
            Ok(session) => self.assistant.respond(session, &pending.input),
            Err(e) => Err(e),
        };

        match result {
            Ok(reply) => {
                if reply.celebrate {
                    self.start_celebration();
                }
                if self.section == Section::Admin {
                    self.refresh_admin_report();
                }
                Some(reply)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to handle chat message");
                self.status = Some(format!("Could not save message: {}", e));
                None
            }
        }
    }

    /// Recompute the admin snapshot from the stores.
    pub fn refresh_admin_report(&mut self) {
        let catalog = self.assistant.catalog();
        match AdminAggregator::new(self.assistant.store()).report(catalog) {
            Ok(report) => {
                self.admin_report = Some(report);
                self.admin_error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Admin report failed");
                self.admin_error = Some(e.to_string());
            }
        }
    }

    // ========== Animation ==========

    /// Advance one frame: deliver pending replies and move confetti.
    pub fn tick_animation(&mut self, width: u16, height: u16) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
        self.poll_pending(Instant::now());

        if let Some(started) = self.celebration_started {
            if self.animation_frame.saturating_sub(started) > CONFETTI_FRAMES {
                self.confetti.clear();
                self.celebration_started = None;
                return;
            }
            if self.confetti.is_empty() && width > 0 && height > 0 {
                self.init_confetti(width, height);
            }
            self.update_confetti(height);
        }
    }

    fn start_celebration(&mut self) {
        self.celebration_started = Some(self.animation_frame);
        self.confetti.clear();
    }

    fn stop_celebration(&mut self) {
        self.celebration_started = None;
        self.confetti.clear();
    }

    /// Scatter confetti with pseudo-random positions.
    fn init_confetti(&mut self, width: u16, height: u16) {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let palette = self.assistant.catalog().len().max(1);
        for i in 0..CONFETTI_COUNT {
            let mut hasher = DefaultHasher::new();
            (i * 7919 + self.animation_frame).hash(&mut hasher);
            let hash = hasher.finish();

            let x = (hash % width as u64) as u16;
            let y = ((hash / width as u64) % height as u64) as u16;
            let speed = ((hash / (width as u64 * height as u64)) % 3 + 1) as u8;

            self.confetti.push((x, y, speed, i as usize % palette));
        }
    }

    /// Confetti falls one row every `speed * 2` frames and wraps at the bottom.
    fn update_confetti(&mut self, height: u16) {
        let frame = self.animation_frame;
        for (_, y, speed, _) in &mut self.confetti {
            if frame % (*speed as u64 * 2) == 0 {
                *y = (*y + 1) % height.max(1);
            }
        }
    }
}
