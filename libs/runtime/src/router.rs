//! Message queues and listener tables
//!
//! Two FIFO queues carry all traffic: `send` for outbound messages and
//! `process` for simulation-facing ones. Messages are shared as
//! `Arc<Message>` between the queue and whoever is still reading them.
//!
//! Listener registrations are kept in registration order, and duplicates
//! are allowed — registering twice means being invoked twice per matching
//! message. Unregistration removes the first matching entry only. The
//! tables hand out snapshots, so mutations during a delivery take effect
//! for the next message, never the current one.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tracing::{debug, trace};

use types::{ActorId, Message, MessageKind};

/// A single listener registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub listener: ActorId,
    pub invokable: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ActorRegistration {
    about: ActorId,
    listener: ActorId,
    invokable: String,
}

/// Queue and delivery counters
#[derive(Debug, Default, Clone, Copy)]
pub struct RouterStats {
    pub sends_queued: u64,
    pub process_queued: u64,
    pub sends_taken: u64,
    pub process_taken: u64,
}

/// FIFO queues plus global and per-actor listener tables
#[derive(Default)]
pub struct MessageRouter {
    send_queue: VecDeque<Arc<Message>>,
    process_queue: VecDeque<Arc<Message>>,
    global: HashMap<MessageKind, Vec<Registration>>,
    per_actor: HashMap<MessageKind, Vec<ActorRegistration>>,
    stats: RouterStats,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the send queue
    pub fn queue_send(&mut self, message: Arc<Message>) {
        trace!(kind = %message.kind(), "queued send");
        self.stats.sends_queued += 1;
        self.send_queue.push_back(message);
    }

    /// Append to the process queue
    pub fn queue_process(&mut self, message: Arc<Message>) {
        trace!(kind = %message.kind(), "queued process");
        self.stats.process_queued += 1;
        self.process_queue.push_back(message);
    }

    /// Pop the oldest send-queue message
    pub fn next_send(&mut self) -> Option<Arc<Message>> {
        let message = self.send_queue.pop_front();
        if message.is_some() {
            self.stats.sends_taken += 1;
        }
        message
    }

    /// Pop the oldest process-queue message
    pub fn next_process(&mut self) -> Option<Arc<Message>> {
        let message = self.process_queue.pop_front();
        if message.is_some() {
            self.stats.process_taken += 1;
        }
        message
    }

    pub fn pending_sends(&self) -> usize {
        self.send_queue.len()
    }

    pub fn pending_process(&self) -> usize {
        self.process_queue.len()
    }

    /// Listen for every message of a kind
    pub fn register_global(
        &mut self,
        kind: MessageKind,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        let registration = Registration {
            listener,
            invokable: invokable.into(),
        };
        debug!(
            kind = %kind,
            listener = %listener,
            invokable = %registration.invokable,
            "registered global listener"
        );
        self.global.entry(kind).or_default().push(registration);
    }

    /// Remove the first matching global registration; silent no-op if absent
    pub fn unregister_global(&mut self, kind: MessageKind, listener: ActorId, invokable: &str) {
        if let Some(registrations) = self.global.get_mut(&kind) {
            if let Some(idx) = registrations
                .iter()
                .position(|r| r.listener == listener && r.invokable == invokable)
            {
                registrations.remove(idx);
                debug!(kind = %kind, listener = %listener, "unregistered global listener");
            }
        }
    }

    /// Listen for messages of a kind that are about a particular actor
    pub fn register_for_actor(
        &mut self,
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: impl Into<String>,
    ) {
        let registration = ActorRegistration {
            about,
            listener,
            invokable: invokable.into(),
        };
        debug!(
            kind = %kind,
            about = %about,
            listener = %listener,
            invokable = %registration.invokable,
            "registered actor listener"
        );
        self.per_actor.entry(kind).or_default().push(registration);
    }

    /// Remove the first matching per-actor registration; silent no-op if absent
    pub fn unregister_for_actor(
        &mut self,
        kind: MessageKind,
        about: ActorId,
        listener: ActorId,
        invokable: &str,
    ) {
        if let Some(registrations) = self.per_actor.get_mut(&kind) {
            if let Some(idx) = registrations.iter().position(|r| {
                r.about == about && r.listener == listener && r.invokable == invokable
            }) {
                registrations.remove(idx);
                debug!(kind = %kind, about = %about, listener = %listener, "unregistered actor listener");
            }
        }
    }

    /// Strip every registration whose listening actor is `listener`, across
    /// both tables and all kinds
    pub fn unregister_all_for(&mut self, listener: ActorId) {
        for registrations in self.global.values_mut() {
            registrations.retain(|r| r.listener != listener);
        }
        for registrations in self.per_actor.values_mut() {
            registrations.retain(|r| r.listener != listener);
        }
        debug!(listener = %listener, "removed all listener registrations");
    }

    /// True when any table still references `listener` as the listening actor
    pub fn has_registrations_for(&self, listener: ActorId) -> bool {
        self.global
            .values()
            .any(|regs| regs.iter().any(|r| r.listener == listener))
            || self
                .per_actor
                .values()
                .any(|regs| regs.iter().any(|r| r.listener == listener))
    }

    /// Snapshot of global listeners for a kind, registration order
    pub fn global_listeners(&self, kind: MessageKind) -> Vec<Registration> {
        self.global.get(&kind).cloned().unwrap_or_default()
    }

    /// Snapshot of per-actor listeners for `(kind, about)`, registration order
    pub fn actor_listeners(&self, kind: MessageKind, about: ActorId) -> Vec<Registration> {
        self.per_actor
            .get(&kind)
            .map(|registrations| {
                registrations
                    .iter()
                    .filter(|r| r.about == about)
                    .map(|r| Registration {
                        listener: r.listener,
                        invokable: r.invokable.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }
}
