//! Locked framebuffers.
//!
//! A framebuffer can pin its own depth state and viewport. While such a framebuffer is bound for
//! drawing and locked, global depth and viewport requests of the kind it overrides are discarded:
//! the framebuffer stays authoritative until it gets unlocked or unbound.
//!
//! Locking is configured on the framebuffer side, through
//! [`GraphicsState::bind_framebuffer`](crate::state::GraphicsState::bind_framebuffer) and
//! [`GraphicsState::set_framebuffer_lock`](crate::state::GraphicsState::set_framebuffer_lock). This
//! module only reads that configuration.

use crate::cache::Cached;
use crate::depth::DepthState;
use crate::object::ObjectId;
use crate::viewport::Viewport;

/// Lock configuration of a framebuffer.
///
/// The three states of a slot are `Unlocked`, `Locked` without any override and `Locked` with at
/// least one override.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LockedState {
  /// Global requests apply.
  Unlocked,
  /// Overrides in place of the global requests.
  Locked {
    /// Pinned depth state.
    depth: Option<DepthState>,
    /// Pinned viewport.
    viewport: Option<Viewport>,
  },
}

impl Default for LockedState {
  fn default() -> Self {
    LockedState::Unlocked
  }
}

impl LockedState {
  /// Lock with a pinned viewport only.
  pub fn viewport(viewport: Viewport) -> Self {
    LockedState::Locked {
      depth: None,
      viewport: Some(viewport),
    }
  }

  /// Lock with a pinned depth state only.
  pub fn depth(depth: DepthState) -> Self {
    LockedState::Locked {
      depth: Some(depth),
      viewport: None,
    }
  }

  /// Whether the framebuffer is locked.
  pub fn is_locked(&self) -> bool {
    matches!(*self, LockedState::Locked { .. })
  }

  /// Pinned viewport, if locked with one.
  pub fn viewport_override(&self) -> Option<Viewport> {
    match *self {
      LockedState::Locked { viewport, .. } => viewport,
      LockedState::Unlocked => None,
    }
  }

  /// Pinned depth state, if locked with one.
  pub fn depth_override(&self) -> Option<DepthState> {
    match *self {
      LockedState::Locked { depth, .. } => depth,
      LockedState::Unlocked => None,
    }
  }
}

/// One of the two framebuffer binding slots (read or draw).
///
/// The lock belongs to the framebuffer last bound to the slot. Invalidating the binding makes it
/// unknown but keeps that framebuffer and its lock around: the driver still has it bound.
#[derive(Clone, Copy, Debug)]
pub struct FramebufferSlot {
  pub(crate) framebuffer: Cached<Option<ObjectId>>,
  pub(crate) last: Option<ObjectId>,
  pub(crate) lock: LockedState,
}

impl FramebufferSlot {
  pub(crate) fn new(framebuffer: Cached<Option<ObjectId>>) -> Self {
    FramebufferSlot {
      framebuffer,
      last: None,
      lock: LockedState::Unlocked,
    }
  }

  /// Bound framebuffer; `None` if nothing is bound or the binding is unknown.
  pub fn framebuffer(&self) -> Option<ObjectId> {
    self.framebuffer.get().copied().flatten()
  }

  /// Framebuffer last bound to the slot, even if the binding has been invalidated since.
  pub fn last_bound(&self) -> Option<ObjectId> {
    self.last
  }

  /// Record a bind; unbinding drops the lock.
  pub(crate) fn bound(&mut self, framebuffer: Option<ObjectId>, lock: LockedState) {
    self.framebuffer.set(framebuffer);
    self.last = framebuffer;
    self.lock = if framebuffer.is_some() {
      lock
    } else {
      LockedState::Unlocked
    };
  }

  /// Lock configuration of the bound framebuffer.
  pub fn lock(&self) -> LockedState {
    self.lock
  }
}

/// Outcome of a global request going through the resolver.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Resolution<T> {
  /// Diff and apply the requested value.
  Apply(T),
  /// Discard the request; the bound framebuffer pins this value.
  Suppress(T),
}

/// Resolve a global viewport request against the draw slot.
pub(crate) fn resolve_viewport(draw: &FramebufferSlot, requested: Viewport) -> Resolution<Viewport> {
  match draw.lock.viewport_override() {
    Some(pinned) if draw.last.is_some() => Resolution::Suppress(pinned),
    _ => Resolution::Apply(requested),
  }
}

/// Resolve a global depth request against the draw slot.
pub(crate) fn resolve_depth(draw: &FramebufferSlot, requested: DepthState) -> Resolution<DepthState> {
  match draw.lock.depth_override() {
    Some(pinned) if draw.last.is_some() => Resolution::Suppress(pinned),
    _ => Resolution::Apply(requested),
  }
}
