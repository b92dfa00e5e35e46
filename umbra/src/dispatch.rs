//! Thread-affine action dispatch.
//!
//! A driver context must only be driven from a single thread. A [`Dispatcher`] enforces that: it
//! has an explicit owner thread, and actions pushed from any other thread are queued until the
//! owner flushes them. Actions pushed from the owner run right away.
//!
//! The queue is a multi-producer, single-consumer channel: the dispatcher holds the consuming end,
//! and every [`Remote`] handed to other threads holds a producing end.
//!
//! # Caveats
//!
//! - The queue is unbounded and nothing is ever withdrawn from it: if the owner never flushes,
//!   queued actions never run. A warning is logged whenever the number of pending actions grows to
//!   the configured threshold.
//! - A flush is not atomic. If an action panics, the panic propagates out of
//!   [`Dispatcher::flush`]; the actions queued after it stay queued and run at the next flush.

use log::{debug, trace, warn};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, ThreadId};

/// Deferred action, run against a target of type `T` on the owning thread.
pub type Action<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

/// Producing end of the queue.
struct Inbox<T> {
  tx: Sender<Action<T>>,
  pending: Arc<AtomicUsize>,
  warn_threshold: Option<usize>,
}

impl<T> Clone for Inbox<T> {
  fn clone(&self) -> Self {
    Inbox {
      tx: self.tx.clone(),
      pending: self.pending.clone(),
      warn_threshold: self.warn_threshold,
    }
  }
}

impl<T> Inbox<T> {
  fn enqueue(&self, action: Action<T>) {
    // the consuming end lives in the dispatcher; if it is gone, nobody will ever run the action
    if self.tx.send(action).is_err() {
      debug!("action dropped; its dispatcher is gone");
      return;
    }

    let previous = self.pending.fetch_add(1, Ordering::AcqRel);
    let pending = previous + 1;
    trace!("action deferred ({} pending)", pending);

    if crosses_threshold(self.warn_threshold, previous) {
      warn!(
        "{} actions pending; is the owning thread flushing its dispatcher?",
        pending
      );
    }
  }

  fn pending(&self) -> usize {
    self.pending.load(Ordering::Acquire)
  }
}

// whether going from `previous` to `previous + 1` pending actions reaches the threshold from below;
// a zero threshold behaves like one
fn crosses_threshold(threshold: Option<usize>, previous: usize) -> bool {
  match threshold {
    Some(threshold) => {
      let threshold = threshold.max(1);
      previous < threshold && previous + 1 >= threshold
    }
    None => false,
  }
}

/// Thread-affine action queue.
///
/// The dispatcher starts unowned; [`Dispatcher::thread_change`] makes the calling thread its
/// owner. A temporary dispatcher ([`Dispatcher::temporary`]) has no owner and runs everything right
/// away, on whatever thread pushes.
pub struct Dispatcher<T> {
  owner: Option<ThreadId>,
  temporary: bool,
  inbox: Inbox<T>,
  rx: Receiver<Action<T>>,
}

impl<T> fmt::Debug for Dispatcher<T> {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Dispatcher")
      .field("owner", &self.owner)
      .field("temporary", &self.temporary)
      .field("pending", &self.pending())
      .finish()
  }
}

impl<T> Default for Dispatcher<T> {
  fn default() -> Self {
    Dispatcher::new()
  }
}

impl<T> Dispatcher<T> {
  /// Create an unowned dispatcher.
  ///
  /// Until some thread takes ownership, every pushed action gets queued.
  pub fn new() -> Self {
    Self::with_kind(false)
  }

  /// Create a temporary dispatcher.
  ///
  /// Temporary dispatchers are meant for call sites with no durable context: they run every action
  /// synchronously, whatever the calling thread, and never queue anything.
  pub fn temporary() -> Self {
    Self::with_kind(true)
  }

  fn with_kind(temporary: bool) -> Self {
    let (tx, rx) = mpsc::channel();
    let inbox = Inbox {
      tx,
      pending: Arc::new(AtomicUsize::new(0)),
      warn_threshold: None,
    };

    Dispatcher {
      owner: None,
      temporary,
      inbox,
      rx,
    }
  }

  /// Log a warning when that many actions are pending.
  ///
  /// The warning fires each time the queue grows to the threshold, not on every push past it.
  ///
  /// [`Remote`]s created before the change keep the previous threshold.
  pub fn set_warn_threshold(&mut self, threshold: Option<usize>) {
    self.inbox.warn_threshold = threshold;
  }

  /// Whether this dispatcher is temporary.
  pub fn is_temporary(&self) -> bool {
    self.temporary
  }

  /// Owning thread, if any.
  pub fn owner(&self) -> Option<ThreadId> {
    self.owner
  }

  /// Whether actions pushed from the calling thread run right away.
  pub fn runs_here(&self) -> bool {
    self.temporary || self.owner == Some(thread::current().id())
  }

  /// Make the calling thread the owner.
  ///
  /// Taking `&mut self` guarantees no push or flush through this dispatcher is in flight; remotes
  /// can keep pushing, their actions simply wait for the new owner to flush. A temporary dispatcher
  /// has no owner; this is a no-op for it.
  pub fn thread_change(&mut self) {
    if self.temporary {
      return;
    }

    let current = thread::current().id();

    if self.owner != Some(current) {
      debug!("dispatcher ownership: {:?} -> {:?}", self.owner, current);
      self.owner = Some(current);
    }
  }

  /// Push an action.
  ///
  /// The action runs right away against `target` if the calling thread is the owner or if the
  /// dispatcher is temporary. Otherwise, it is queued until the next [`Dispatcher::flush`].
  pub fn push<F>(&self, target: &mut T, action: F)
  where
    F: FnOnce(&mut T) + Send + 'static,
  {
    if self.runs_here() {
      action(target);
    } else {
      self.inbox.enqueue(Box::new(action));
    }
  }

  /// Run the actions pending when the flush starts, in push order.
  ///
  /// Actions pushed while flushing wait for the next flush. Returns the number of actions that ran.
  ///
  /// Flushing is meant to happen on the owning thread. Flushing from elsewhere does not break the
  /// queue, but runs the actions on the wrong thread.
  pub fn flush(&self, target: &mut T) -> usize {
    let batch = self.inbox.pending();
    let mut ran = 0;

    while ran < batch {
      let action = match self.rx.try_recv() {
        Ok(action) => action,
        Err(_) => break,
      };

      self.inbox.pending.fetch_sub(1, Ordering::AcqRel);
      ran += 1;
      action(target);
    }

    if ran > 0 {
      debug!("flushed {} action(s)", ran);
    }

    ran
  }

  /// Number of queued actions.
  pub fn pending(&self) -> usize {
    self.inbox.pending()
  }

  /// Handle other threads can push actions through.
  ///
  /// Temporary dispatchers have no queue to push into; they return `None`.
  pub fn remote(&self) -> Option<Remote<T>> {
    if self.temporary {
      None
    } else {
      Some(Remote {
        inbox: self.inbox.clone(),
      })
    }
  }
}

/// Handle to push actions into a [`Dispatcher`] from any thread.
///
/// Remotes never run actions themselves: whatever they push waits for the owning thread to flush.
pub struct Remote<T> {
  inbox: Inbox<T>,
}

impl<T> Clone for Remote<T> {
  fn clone(&self) -> Self {
    Remote {
      inbox: self.inbox.clone(),
    }
  }
}

impl<T> fmt::Debug for Remote<T> {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    f.debug_struct("Remote")
      .field("pending", &self.pending())
      .finish()
  }
}

impl<T> Remote<T> {
  /// Queue an action.
  pub fn push<F>(&self, action: F)
  where
    F: FnOnce(&mut T) + Send + 'static,
  {
    self.inbox.enqueue(Box::new(action));
  }

  /// Number of queued actions.
  pub fn pending(&self) -> usize {
    self.inbox.pending()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::panic::{self, AssertUnwindSafe};

  #[test]
  fn unowned_queues_everything() {
    let dispatcher = Dispatcher::new();
    let mut log = Vec::new();

    dispatcher.push(&mut log, |log: &mut Vec<u32>| log.push(1));

    assert!(log.is_empty());
    assert_eq!(dispatcher.pending(), 1);
  }

  #[test]
  fn owner_runs_synchronously() {
    let mut dispatcher = Dispatcher::new();
    let mut log = Vec::new();

    dispatcher.thread_change();
    dispatcher.push(&mut log, |log: &mut Vec<u32>| log.push(1));

    assert_eq!(log, vec![1]);
    assert_eq!(dispatcher.pending(), 0);
    assert_eq!(dispatcher.owner(), Some(thread::current().id()));
  }

  #[test]
  fn flush_runs_in_push_order() {
    let mut dispatcher = Dispatcher::new();
    let remote = dispatcher.remote().unwrap();
    let mut log = Vec::new();

    for i in 1..=3 {
      remote.push(move |log: &mut Vec<u32>| log.push(i));
    }

    dispatcher.thread_change();
    assert_eq!(dispatcher.flush(&mut log), 3);
    assert_eq!(log, vec![1, 2, 3]);
    assert_eq!(dispatcher.pending(), 0);
    assert_eq!(dispatcher.flush(&mut log), 0);
  }

  #[test]
  fn pushes_during_flush_wait_for_next_flush() {
    let dispatcher = Dispatcher::new();
    let remote = dispatcher.remote().unwrap();
    let inner = remote.clone();
    let mut log = Vec::new();

    remote.push(move |log: &mut Vec<u32>| {
      log.push(1);
      inner.push(|log: &mut Vec<u32>| log.push(2));
    });

    assert_eq!(dispatcher.flush(&mut log), 1);
    assert_eq!(log, vec![1]);
    assert_eq!(dispatcher.pending(), 1);

    dispatcher.flush(&mut log);
    assert_eq!(log, vec![1, 2]);
  }

  #[test]
  fn panicking_action_leaves_remainder_queued() {
    let dispatcher = Dispatcher::new();
    let remote = dispatcher.remote().unwrap();
    let mut log = Vec::new();

    remote.push(|log: &mut Vec<u32>| log.push(1));
    remote.push(|_: &mut Vec<u32>| panic!("boom"));
    remote.push(|log: &mut Vec<u32>| log.push(3));

    let result = panic::catch_unwind(AssertUnwindSafe(|| dispatcher.flush(&mut log)));

    assert!(result.is_err());
    assert_eq!(log, vec![1]);
    assert_eq!(dispatcher.pending(), 1);

    dispatcher.flush(&mut log);
    assert_eq!(log, vec![1, 3]);
  }

  #[test]
  fn threshold_crossing() {
    assert!(crosses_threshold(Some(3), 2));
    assert!(!crosses_threshold(Some(3), 1));
    assert!(!crosses_threshold(Some(3), 3));
    assert!(!crosses_threshold(Some(3), 10));
    assert!(crosses_threshold(Some(0), 0));
    assert!(!crosses_threshold(Some(0), 1));
    assert!(!crosses_threshold(None, 0));
  }

  #[test]
  fn temporary_never_queues() {
    let mut dispatcher = Dispatcher::temporary();
    let mut log = Vec::new();

    dispatcher.push(&mut log, |log: &mut Vec<u32>| log.push(1));
    dispatcher.thread_change();

    assert_eq!(log, vec![1]);
    assert_eq!(dispatcher.pending(), 0);
    assert_eq!(dispatcher.owner(), None);
    assert!(dispatcher.remote().is_none());
  }
}
