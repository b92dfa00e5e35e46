//! Context options.

/// What the shadow state assumes about the driver when a context is created.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InitialState {
  /// The driver is in its documented initial state: nothing bound, texture unit 0 active, default
  /// depth configuration. Requests matching those values are elided right away.
  Defaults,
  /// Nothing is known; the first request for every item reaches the driver.
  Unknown,
}

/// Different context options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ContextOpt {
  initial_state: InitialState,
  queue_warn_threshold: Option<usize>,
  texture_units_cap: Option<u32>,
}

impl Default for ContextOpt {
  /// Defaults:
  ///
  /// - `initial_state` set to [`InitialState::Defaults`].
  /// - `queue_warn_threshold` set to `Some(1024)`.
  /// - `texture_units_cap` set to `None`.
  fn default() -> Self {
    ContextOpt {
      initial_state: InitialState::Defaults,
      queue_warn_threshold: Some(1024),
      texture_units_cap: None,
    }
  }
}

impl ContextOpt {
  /// Choose what the shadow state assumes at creation. Default to [`InitialState::Defaults`].
  ///
  /// Use [`InitialState::Unknown`] if the driver context has been used before being handed over.
  #[inline]
  pub fn set_initial_state(self, initial_state: InitialState) -> Self {
    ContextOpt {
      initial_state,
      ..self
    }
  }

  /// Get the initial state assumption.
  #[inline]
  pub fn initial_state(&self) -> InitialState {
    self.initial_state
  }

  /// Number of pending actions above which a warning is logged.
  ///
  /// Pass `None` to never warn. The queue itself is never bounded.
  #[inline]
  pub fn set_queue_warn_threshold<T>(self, threshold: T) -> Self
  where
    T: Into<Option<usize>>,
  {
    ContextOpt {
      queue_warn_threshold: threshold.into(),
      ..self
    }
  }

  /// Get the pending-actions warning threshold, if any.
  #[inline]
  pub fn queue_warn_threshold(&self) -> Option<usize> {
    self.queue_warn_threshold
  }

  /// Track at most that many texture units, even if the driver reports more.
  #[inline]
  pub fn set_texture_units_cap<C>(self, cap: C) -> Self
  where
    C: Into<Option<u32>>,
  {
    ContextOpt {
      texture_units_cap: cap.into(),
      ..self
    }
  }

  /// Get the texture units cap, if any.
  #[inline]
  pub fn texture_units_cap(&self) -> Option<u32> {
    self.texture_units_cap
  }
}
