//! Bounded inbound command queue, drained once per frame.

use std::collections::VecDeque;

use log::warn;

use crate::schema::Command;

/// Default queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// FIFO of pending commands.
///
/// A pointer command that follows another pointer command replaces it, since
/// only the latest position matters. When the queue is full the oldest
/// pointer command is dropped to make room; if there is none the push fails.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    commands: VecDeque<Command>,
    capacity: usize,
}

impl CommandQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            commands: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&mut self, command: Command) -> Result<(), QueueError> {
        if command.is_pointer() {
            if let Some(last) = self.commands.back_mut() {
                if last.is_pointer() {
                    *last = command;
                    return Ok(());
                }
            }
        }

        if self.commands.len() >= self.capacity {
            let Some(oldest_pointer) = self.commands.iter().position(Command::is_pointer) else {
                return Err(QueueError::Full {
                    capacity: self.capacity,
                    kind: command.kind(),
                });
            };
            warn!("Command queue full, dropping a stale pointer update");
            self.commands.remove(oldest_pointer);
        }

        self.commands.push_back(command);
        Ok(())
    }

    /// Take every pending command in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = Command> + '_ {
        self.commands.drain(..)
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

/// Command queue errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Command queue full ({capacity} pending), rejected '{kind}'")]
    Full {
        capacity: usize,
        kind: &'static str,
    },
}
