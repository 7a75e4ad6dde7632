//! Fan-out barrier between the dispatch worker and the sink tasks
//!
//! Each round hands one item to every participant over its own rendezvous
//! channel, then waits on a shared acknowledgement channel until every
//! participant that took the item reports `Ready`. The next round cannot
//! start before that, so each participant sees items in the order the
//! driver published them.
//!
//! The final round publishes `Exit`; participants wind down and report
//! `Ended`. Acknowledgements are sent from drop guards, so a participant
//! that panics while handling an item still completes the round.

use super::error::{LoggerError, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::Mutex;

enum Round<T> {
    Deliver { seq: u64, item: T },
    Exit,
}

enum Ack {
    Ready { seq: u64 },
    Ended,
}

struct BarrierState<T> {
    participants: Vec<(usize, Sender<Round<T>>)>,
    next_id: usize,
    next_seq: u64,
    closed: bool,
}

pub struct FanOutBarrier<T> {
    state: Mutex<BarrierState<T>>,
    ack_tx: Sender<Ack>,
    ack_rx: Receiver<Ack>,
}

impl<T: Clone + Send> FanOutBarrier<T> {
    pub fn new() -> Self {
        let (ack_tx, ack_rx) = unbounded();
        Self {
            state: Mutex::new(BarrierState {
                participants: Vec::new(),
                next_id: 0,
                next_seq: 0,
                closed: false,
            }),
            ack_tx,
            ack_rx,
        }
    }

    /// Add a participant; it takes part from the next round on
    pub fn join(&self) -> Result<Participant<T>> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(LoggerError::ShutdownInProgress);
        }
        let (tx, rx) = bounded(0);
        let id = state.next_id;
        state.next_id += 1;
        state.participants.push((id, tx));
        Ok(Participant {
            rounds: rx,
            acks: self.ack_tx.clone(),
        })
    }

    /// Deliver `item` to every participant and wait until all are done
    ///
    /// Returns how many participants handled the item. Participants whose
    /// thread is gone are dropped from the barrier.
    pub fn run_round(&self, item: T) -> usize {
        let (seq, participants) = {
            let mut state = self.state.lock();
            let seq = state.next_seq;
            state.next_seq += 1;
            (seq, state.participants.clone())
        };

        let mut delivered = 0;
        let mut gone = Vec::new();
        for (id, tx) in &participants {
            let round = Round::Deliver {
                seq,
                item: item.clone(),
            };
            match tx.send(round) {
                Ok(()) => delivered += 1,
                Err(_) => gone.push(*id),
            }
        }

        let mut ready = 0;
        while ready < delivered {
            match self.ack_rx.recv() {
                Ok(Ack::Ready { seq: acked }) if acked == seq => ready += 1,
                Ok(_) => {}
                Err(_) => break,
            }
        }

        if !gone.is_empty() {
            self.state
                .lock()
                .participants
                .retain(|(id, _)| !gone.contains(id));
        }
        ready
    }

    /// Publish the exit round and wait for every participant to end
    ///
    /// Closes the barrier: later `join` calls fail. Returns how many
    /// participants reported `Ended`; a second call returns 0.
    pub fn exit_round(&self) -> usize {
        let participants = {
            let mut state = self.state.lock();
            state.closed = true;
            std::mem::take(&mut state.participants)
        };

        let sent = participants
            .iter()
            .filter(|(_, tx)| tx.send(Round::Exit).is_ok())
            .count();

        let mut ended = 0;
        while ended < sent {
            match self.ack_rx.recv() {
                Ok(Ack::Ended) => ended += 1,
                Ok(Ack::Ready { .. }) => {}
                Err(_) => break,
            }
        }
        ended
    }

    pub fn participants(&self) -> usize {
        self.state.lock().participants.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<T: Clone + Send> Default for FanOutBarrier<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a participant gets from [`Participant::wait`]
pub enum Step<T> {
    /// Handle the item; dropping the delivery reports `Ready`
    Deliver(Delivery<T>),
    /// Wind down; dropping the guard reports `Ended`
    Exit(ExitGuard),
}

/// The participant side of a [`FanOutBarrier`]
pub struct Participant<T> {
    rounds: Receiver<Round<T>>,
    acks: Sender<Ack>,
}

impl<T> Participant<T> {
    /// Block until the next round
    ///
    /// A barrier that went away without an exit round also yields `Exit`.
    pub fn wait(&self) -> Step<T> {
        match self.rounds.recv() {
            Ok(Round::Deliver { seq, item }) => Step::Deliver(Delivery {
                item,
                seq,
                acks: self.acks.clone(),
            }),
            Ok(Round::Exit) | Err(_) => Step::Exit(ExitGuard {
                acks: self.acks.clone(),
            }),
        }
    }
}

pub struct Delivery<T> {
    pub item: T,
    seq: u64,
    acks: Sender<Ack>,
}

impl<T> Drop for Delivery<T> {
    fn drop(&mut self) {
        let _ = self.acks.send(Ack::Ready { seq: self.seq });
    }
}

pub struct ExitGuard {
    acks: Sender<Ack>,
}

impl Drop for ExitGuard {
    fn drop(&mut self) {
        let _ = self.acks.send(Ack::Ended);
    }
}
