//! Real-time event sources for the interactive session.
//!
//! Ticks and stdin lines are funnelled into one channel so the main loop
//! handles them strictly one at a time.

use hiit_core::{Clock, TickToken};
use std::collections::HashMap;
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Unified event type consumed by the session loop
#[derive(Debug)]
pub enum HostEvent {
    Tick(TickToken),
    Line(String),
    InputClosed,
}

/// Clock backed by one sleeper thread per scheduled token
pub struct ThreadClock {
    tx: Sender<HostEvent>,
    next_id: u64,
    sources: HashMap<TickToken, Arc<AtomicBool>>,
}

impl ThreadClock {
    pub fn new(tx: Sender<HostEvent>) -> Self {
        Self {
            tx,
            next_id: 0,
            sources: HashMap::new(),
        }
    }
}

impl Clock for ThreadClock {
    fn schedule(&mut self, period: Duration) -> TickToken {
        self.next_id += 1;
        let token = TickToken(self.next_id);

        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let tx = self.tx.clone();

        thread::spawn(move || loop {
            thread::sleep(period);
            if flag.load(Ordering::SeqCst) {
                break;
            }
            if tx.send(HostEvent::Tick(token)).is_err() {
                break;
            }
        });

        self.sources.insert(token, stopped);
        token
    }

    fn cancel(&mut self, token: TickToken) {
        if let Some(flag) = self.sources.remove(&token) {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

impl Drop for ThreadClock {
    fn drop(&mut self) {
        for flag in self.sources.values() {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

/// Forward stdin lines until EOF
pub fn spawn_stdin_reader(tx: Sender<HostEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(HostEvent::Line(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        let _ = tx.send(HostEvent::InputClosed);
    });
}
