//! The chat assistant: logs input, matches it, updates progress, and phrases
//! a reply.

use crate::catalog::Catalog;
use crate::db::{CompletionStore, MessageLog};
use crate::error::Result;
use crate::matcher::match_stage;
use crate::session::{SessionRegistry, SessionState};
use crate::tracker::record_if_new;
use crate::types::{Outcome, Turn};
use rand::seq::SliceRandom;
use serde::Serialize;

/// Replies for input that names no stage.
pub const FILLER_PHRASES: [&str; 3] = [
    "Let’s focus on the next slice chef 🍕",
    "Try asking about Dough, Sauce, Cheese, Toppings, Bake, or Serve.",
    "We’re building your success pizza step by step 👨‍🍳",
];

/// Lines appended to a "stage completed" reply.
pub const ENCOURAGEMENT_PHRASES: [&str; 5] = [
    "Oops, chef 😅We can’t skip a slice. Let’s add that before serving.",
    "Every slice counts. Don’t leave your users hungry for success!",
    "Keep rolling, chef! Your onboarding masterpiece awaits 👨‍🍳✨.",
    "Your pizza’s almost ready… just a few more layers of brilliance.",
    "Smells like success already. Don’t burn it!",
];

/// Banner shown once every stage is complete.
pub const CELEBRATION_MESSAGE: &str = "🎉 All onboarding milestones completed! Users are live 🚀";

/// Source of phrase choices.
pub trait PhraseChooser {
    /// Pick one of `phrases`. Returns an empty string for an empty slice.
    fn choose<'a>(&mut self, phrases: &[&'a str]) -> &'a str;
}

/// Uniform choice from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomChooser;

impl PhraseChooser for RandomChooser {
    fn choose<'a>(&mut self, phrases: &[&'a str]) -> &'a str {
        phrases
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or_default()
    }
}

/// Always picks the phrase at a fixed index (wrapping). Useful for tests and
/// reproducible transcripts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedChooser(pub usize);

impl PhraseChooser for FixedChooser {
    fn choose<'a>(&mut self, phrases: &[&'a str]) -> &'a str {
        if phrases.is_empty() {
            return "";
        }
        phrases[self.0 % phrases.len()]
    }
}

/// What kind of reply was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "stage", rename_all = "snake_case")]
pub enum ReplyKind {
    /// No stage matched
    Filler,
    /// Matched a stage the user had already finished
    AlreadyCompleted(String),
    /// Matched and recorded a new stage
    NewlyCompleted(String),
}

/// A reply plus the signals the presentation layer reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
    /// Set on the reply that completes the final stage
    pub celebrate: bool,
}

/// The onboarding assistant.
///
/// Owns the catalog, a handle to the stores, and the phrase chooser. Session
/// state is passed in explicitly on every call.
pub struct Assistant<S, C = RandomChooser> {
    catalog: Catalog,
    store: S,
    chooser: C,
}

impl<S> Assistant<S, RandomChooser>
where
    S: CompletionStore + MessageLog,
{
    pub fn new(catalog: Catalog, store: S) -> Self {
        Self::with_chooser(catalog, store, RandomChooser)
    }
}

impl<S, C> Assistant<S, C>
where
    S: CompletionStore + MessageLog,
    C: PhraseChooser,
{
    pub fn with_chooser(catalog: Catalog, store: S, chooser: C) -> Self {
        Self {
            catalog,
            store,
            chooser,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a standalone session for `user`, seeded from the store.
    pub fn login(&self, user: &str) -> Result<SessionState> {
        SessionState::seed(user, &self.catalog, &self.store)
    }

    /// Fetch or create `user`'s session in `registry`.
    pub fn login_into<'r>(
        &self,
        registry: &'r mut SessionRegistry,
        user: &str,
    ) -> Result<&'r mut SessionState> {
        registry.login(user, &self.catalog, &self.store)
    }

    /// Offer `stage` to the progress tracker for this session.
    pub fn record_if_new(
        &self,
        session: &mut SessionState,
        stage: &crate::catalog::Stage,
    ) -> Result<Outcome> {
        record_if_new(session, stage, &self.store)
    }

    /// Handle one chat input.
    ///
    /// The input is always written to the message log first; a failed write
    /// aborts before any progress change. Both the input and the reply are
    /// appended to the session transcript.
    pub fn respond(&mut self, session: &mut SessionState, input: &str) -> Result<Reply> {
        self.store.append_chat(input)?;

        let reply = match match_stage(input, &self.catalog) {
            None => Reply {
                text: self.chooser.choose(&FILLER_PHRASES).to_string(),
                kind: ReplyKind::Filler,
                celebrate: false,
            },
            Some(stage) => match record_if_new(session, stage, &self.store)? {
                Outcome::AlreadyCompleted => Reply {
                    text: format!("You already finished {} 👍", stage.name),
                    kind: ReplyKind::AlreadyCompleted(stage.name.clone()),
                    celebrate: false,
                },
                Outcome::NewlyCompleted => {
                    let line = self.chooser.choose(&ENCOURAGEMENT_PHRASES);
                    let celebrate = session.progress(&self.catalog).is_complete();
                    if celebrate {
                        tracing::info!(user = session.user(), "User fully onboarded");
                    }
                    Reply {
                        text: format!("✅ {} completed! {}", stage.name, line),
                        kind: ReplyKind::NewlyCompleted(stage.name.clone()),
                        celebrate,
                    }
                }
            },
        };

        session.push_turn(Turn::user(input));
        session.push_turn(Turn::assistant(reply.text.clone()));
        Ok(reply)
    }
}
