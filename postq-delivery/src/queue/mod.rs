//! Routing of returned messages onto the backoff ladder.
//!
//! A [`SendEventResult::Delay`] verdict moves the message exactly one rung
//! up the ladder and into that rung's delayed queue. A message that was
//! already on the last rung, or that steps onto [`DelayedBinding::NotSend`],
//! is never attempted again and goes to the dead-letter list instead. A
//! [`SendEventResult::Error`] verdict bypasses the ladder entirely: the
//! message keeps its binding and goes to the error list for reporting.

use std::{collections::VecDeque, sync::Arc};

use dashmap::DashMap;
use parking_lot::Mutex;
use postq_common::{DelayedBinding, MailMessage, delivery};
use serde::{Deserialize, Serialize};

use crate::event::{Returned, SendEventResult};

/// Where a returned message ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// Waiting in the delayed queue for this binding.
    Delayed(DelayedBinding),

    /// Classified failure, held for the error report.
    Failed,

    /// Ran off the end of the ladder.
    DeadLetter,

    /// Delivered; nothing more to do.
    Done,
}

/// In-memory delayed queues, one per rung of the ladder, plus the error and
/// dead-letter lists. Cloning is cheap and clones share the same queues.
#[derive(Debug, Clone, Default)]
pub struct DelayedQueues {
    delayed: Arc<DashMap<DelayedBinding, VecDeque<MailMessage>, ahash::RandomState>>,
    failed: Arc<Mutex<Vec<MailMessage>>>,
    dead_letters: Arc<Mutex<Vec<MailMessage>>>,
}

impl DelayedQueues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a returned message according to its verdict.
    pub fn route(&self, returned: Returned) -> Route {
        let Returned {
            result,
            mut message,
        } = returned;
        let id = message.id();

        match result {
            SendEventResult::Success => {
                delivery!("Message {id} delivered");
                Route::Done
            }
            SendEventResult::Error => {
                delivery!(
                    "Message {id} failed permanently at binding {}: {}",
                    message.binding(),
                    message.error().map_or("", |err| err.message.as_str())
                );
                self.failed.lock().push(message);
                Route::Failed
            }
            SendEventResult::Delay => match message.advance_binding() {
                Some(binding) if !binding.is_terminal() => {
                    delivery!(
                        "Message {id} delayed for {binding} on {}",
                        binding.queue_name().unwrap_or_default()
                    );
                    self.delayed.entry(binding).or_default().push_back(message);
                    Route::Delayed(binding)
                }
                _ => {
                    tracing::warn!(
                        message_id = %id,
                        recipient = message.recipient(),
                        "Backoff ladder exhausted, message will not be sent"
                    );
                    self.dead_letters.lock().push(message);
                    Route::DeadLetter
                }
            },
        }
    }

    /// Number of messages waiting at `binding`.
    #[must_use]
    pub fn len_for(&self, binding: DelayedBinding) -> usize {
        self.delayed.get(&binding).map_or(0, |queue| queue.len())
    }

    /// Remove and return everything waiting at `binding`, oldest first.
    #[must_use]
    pub fn take_delayed(&self, binding: DelayedBinding) -> Vec<MailMessage> {
        self.delayed
            .get_mut(&binding)
            .map(|mut queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Messages that failed with a classified error.
    #[must_use]
    pub fn failed(&self) -> Vec<MailMessage> {
        self.failed.lock().clone()
    }

    /// Messages that ran off the end of the ladder.
    #[must_use]
    pub fn dead_letters(&self) -> Vec<MailMessage> {
        self.dead_letters.lock().clone()
    }

    /// Remove and return every failed message, for the error report.
    #[must_use]
    pub fn take_failed(&self) -> Vec<MailMessage> {
        std::mem::take(&mut *self.failed.lock())
    }

    /// Remove and return every dead-lettered message.
    #[must_use]
    pub fn take_dead_letters(&self) -> Vec<MailMessage> {
        std::mem::take(&mut *self.dead_letters.lock())
    }

    /// Total number of messages held, across all queues and lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.delayed.iter().map(|entry| entry.value().len()).sum::<usize>()
            + self.failed.lock().len()
            + self.dead_letters.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
