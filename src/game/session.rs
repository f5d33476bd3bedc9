//! # Session
//!
//! Owns the current state and the random source, and feeds queued user
//! commands through the turn engine one at a time.
//!
//! Commands may arrive while the engine is busy with other actors; they are
//! queued, never dropped, and each is dispatched against the state the
//! previous one produced.

use crate::game::{dispatch, AutoexploreState, Command, GameState, Snapshot};
use crate::DelveResult;
use log::{debug, info};
use rand::rngs::StdRng;
use std::collections::VecDeque;
use std::sync::Arc;

/// A running game.
#[derive(Debug)]
pub struct Session {
    state: Arc<GameState>,
    rng: StdRng,
    queue: VecDeque<Command>,
    turns: u64,
}

impl Session {
    pub fn new(state: Arc<GameState>, rng: StdRng) -> Self {
        Self {
            state,
            rng,
            queue: VecDeque::new(),
            turns: 0,
        }
    }

    /// The latest state.
    pub fn state(&self) -> &Arc<GameState> {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.state.snapshot()
    }

    /// Number of user commands that consumed a turn.
    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Commands waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Queues a command.
    pub fn submit(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Dispatches queued commands in arrival order until the queue is empty.
    ///
    /// Returns how many of them changed the state. Once the game reaches a
    /// terminal screen, the rest of the queue is drained without effect.
    pub fn run_pending(&mut self) -> DelveResult<usize> {
        let mut applied = 0;
        while let Some(command) = self.queue.pop_front() {
            if self.step(&command)? {
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Dispatches one command immediately, returning whether it took effect.
    pub fn step(&mut self, command: &Command) -> DelveResult<bool> {
        let next = dispatch(&self.state, command, &mut self.rng)?;
        if Arc::ptr_eq(&next, &self.state) {
            debug!("no effect: {:?}", command.action);
            return Ok(false);
        }
        self.state = next;
        self.turns += 1;
        if self.state.is_terminal() {
            info!("game over after {} turns: {:?}", self.turns, self.state.screen);
        }
        Ok(true)
    }

    /// Lets autoexplore play for at most `max_turns` commands, stopping early
    /// when the game ends.
    pub fn autoplay(&mut self, max_turns: u64) -> DelveResult<()> {
        let mut autoexplore = AutoexploreState::new();
        autoexplore.toggle();
        for _ in 0..max_turns {
            match autoexplore.next_command(&self.state)? {
                Some(command) => {
                    self.step(&command)?;
                }
                None => break,
            }
        }
        Ok(())
    }
}
