//! Seeded random event stream for demos and benchmarks.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::log::{LogAction, LogEntry};
use crate::core::types::Timestamp;

const USERS: &[&str] = &["alice", "bob", "carol", "dave", "erin", "frank"];
const DIRS: &[&str] = &["src", "src/net", "src/render", "docs", "tests", "assets"];
const EXTS: &[&str] = &["rs", "md", "toml", "wgsl", "png"];

/// Deterministic generator of plausible log entries.
///
/// Files are only deleted once they exist, and a deleted file may later be
/// added again, so the stream exercises every action kind.
pub struct SyntheticLog {
    rng: ChaCha8Rng,
    users: usize,
    live: Vec<String>,
    next_file: usize,
    clock: Timestamp,
}

impl SyntheticLog {
    pub fn new(seed: u64, users: usize) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            users: users.clamp(1, USERS.len()),
            live: Vec::new(),
            next_file: 0,
            clock: 0,
        }
    }

    pub fn next_entry(&mut self) -> LogEntry {
        self.clock += self.rng.gen_range(1..=30);
        let user = USERS[self.rng.gen_range(0..self.users)].to_string();

        let roll: f32 = self.rng.gen();
        let action = if self.live.is_empty() || roll < 0.25 {
            LogAction::Add
        } else if roll < 0.35 {
            LogAction::Delete
        } else {
            LogAction::Modify
        };

        let path = match action {
            LogAction::Add => {
                let path = self.fresh_path();
                self.live.push(path.clone());
                path
            }
            LogAction::Delete => {
                let index = self.rng.gen_range(0..self.live.len());
                self.live.swap_remove(index)
            }
            LogAction::Modify => self
                .live
                .choose(&mut self.rng)
                .cloned()
                .unwrap_or_else(|| self.fresh_path()),
        };

        LogEntry {
            timestamp: self.clock,
            user,
            action,
            path,
            colour: None,
        }
    }

    pub fn take(&mut self, count: usize) -> Vec<LogEntry> {
        (0..count).map(|_| self.next_entry()).collect()
    }

    fn fresh_path(&mut self) -> String {
        let dir = DIRS[self.rng.gen_range(0..DIRS.len())];
        let ext = EXTS[self.rng.gen_range(0..EXTS.len())];
        self.next_file += 1;
        format!("{}/file_{}.{}", dir, self.next_file, ext)
    }
}
