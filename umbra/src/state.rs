//! Graphics state.

use log::trace;
use std::error;
use std::fmt;

use crate::cache::{forget, ShadowState};
use crate::depth::DepthState;
use crate::driver::{Capability, Driver, Limits};
use crate::lock::{resolve_depth, resolve_viewport, LockedState, Resolution};
use crate::object::ObjectId;
use crate::opt::ContextOpt;
use crate::target::{BindingTarget, BufferTarget, FramebufferRole, IndexedBufferTarget, TextureKind};
use crate::viewport::Viewport;

/// The graphics state.
///
/// This type represents the current state of a given driver context. It acts as a forward-gate to
/// all the exposed features from the driver but adds a small cache layer over it to prevent from
/// issuing the same driver call (with the same parameters) twice in a row.
///
/// A graphics state is only ever reached through its [`Context`](crate::context::Context), on the
/// context’s owning thread: either directly, or from within an action the context runs.
#[derive(Debug)]
pub struct GraphicsState<D> {
  driver: D,
  shadow: ShadowState,
  limits: Limits,
}

impl<D> GraphicsState<D>
where
  D: Driver,
{
  /// Create a new graphics state, sized from the driver limits.
  ///
  /// # Safety
  ///
  /// The driver context must be current on the calling thread.
  pub(crate) unsafe fn new(mut driver: D, opt: &ContextOpt) -> Self {
    let limits = Limits::query(&mut driver, opt);
    let shadow = ShadowState::new(&limits, opt.initial_state());

    GraphicsState {
      driver,
      shadow,
      limits,
    }
  }

  /// Shadow state, mirroring the driver state.
  pub fn shadow(&self) -> &ShadowState {
    &self.shadow
  }

  /// Limits this state was sized from.
  pub fn limits(&self) -> &Limits {
    &self.limits
  }

  /// Underlying driver.
  pub fn driver(&self) -> &D {
    &self.driver
  }

  /// Internal access to the driver.
  ///
  /// # Unsafety
  ///
  /// Calls issued on the driver directly bypass the cache. Invalidate whatever they touched
  /// afterwards (see the `invalidate_*` methods), or the shadow state will lie.
  pub unsafe fn driver_mut(&mut self) -> &mut D {
    &mut self.driver
  }

  /// Bind a buffer to a general binding point.
  pub fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<ObjectId>, bind: Bind) {
    let cached = self.shadow.buffer_mut(target);

    if bind == Bind::Forced || cached.is_invalid(&buffer) {
      unsafe { self.driver.bind_buffer(target, buffer) };
      cached.set(buffer);
    }
  }

  /// Bind a buffer to an indexed slot.
  ///
  /// The buffer also ends up bound to the general binding point of the same name.
  pub fn bind_buffer_base(
    &mut self,
    target: IndexedBufferTarget,
    index: u32,
    buffer: Option<ObjectId>,
  ) -> Result<(), StateError> {
    let count = self.limits.indexed_buffers(target);
    let cached = self
      .shadow
      .indexed_buffers_mut()
      .binding_mut(target, index)
      .ok_or(StateError::IndexedSlotOutOfRange {
        target,
        index,
        count,
      })?;

    if cached.is_invalid(&buffer) {
      unsafe { self.driver.bind_buffer_base(target, index, buffer) };
      cached.set(buffer);
      self.shadow.buffer_mut(target.general()).set(buffer);
    }

    Ok(())
  }

  /// Make a texture unit active.
  pub fn set_texture_unit(&mut self, unit: u32) -> Result<(), StateError> {
    check_texture_unit(&self.limits, unit)?;

    let cached = self.shadow.active_texture_unit_mut();

    if cached.is_invalid(&unit) {
      unsafe { self.driver.active_texture(unit) };
      cached.set(unit);
    }

    Ok(())
  }

  /// Bind a texture on a texture unit.
  ///
  /// If `unit` is not the active unit, it gets activated first, whether the texture bind turns out
  /// to be needed or not; that switch stays in effect afterwards. The texture bind itself is only
  /// issued if the unit holds something else for that kind.
  pub fn bind_texture(
    &mut self,
    unit: u32,
    kind: TextureKind,
    texture: Option<ObjectId>,
  ) -> Result<(), StateError> {
    self.set_texture_unit(unit)?;

    let count = self.limits.texture_units;
    let cached = self
      .shadow
      .texture_unit_mut(unit)
      .ok_or(StateError::TextureUnitOutOfRange { unit, count })?
      .binding_mut(kind);

    if cached.is_invalid(&texture) {
      unsafe { self.driver.bind_texture(kind, texture) };
      cached.set(texture);
    }

    Ok(())
  }

  /// Bind a framebuffer, along with its lock configuration.
  ///
  /// Unbinding (`None`) always resets the slot to [`LockedState::Unlocked`]. When the draw slot ends
  /// up locked with overrides, those are applied right away.
  pub fn bind_framebuffer(
    &mut self,
    role: FramebufferRole,
    framebuffer: Option<ObjectId>,
    lock: LockedState,
  ) {
    let slot = self.shadow.framebuffer_slot_mut(role);

    if slot.framebuffer.is_invalid(&framebuffer) {
      unsafe { self.driver.bind_framebuffer(role, framebuffer) };
    }

    slot.bound(framebuffer, lock);

    if role == FramebufferRole::Draw {
      self.apply_overrides();
    }
  }

  /// Change the lock configuration of the framebuffer bound to a slot.
  ///
  /// Has no effect if no framebuffer is bound there. A framebuffer whose binding was invalidated
  /// still counts as bound.
  pub fn set_framebuffer_lock(&mut self, role: FramebufferRole, lock: LockedState) {
    let slot = self.shadow.framebuffer_slot_mut(role);

    if slot.last_bound().is_none() {
      return;
    }

    slot.lock = lock;

    if role == FramebufferRole::Draw {
      self.apply_overrides();
    }
  }

  /// Bind a renderbuffer.
  pub fn bind_renderbuffer(&mut self, renderbuffer: Option<ObjectId>) {
    let cached = self.shadow.renderbuffer_mut();

    if cached.is_invalid(&renderbuffer) {
      unsafe { self.driver.bind_renderbuffer(renderbuffer) };
      cached.set(renderbuffer);
    }
  }

  /// Bind a vertex array.
  pub fn bind_vertex_array(&mut self, vertex_array: Option<ObjectId>, bind: Bind) {
    let cached = self.shadow.vertex_array_mut();

    if bind == Bind::Forced || cached.is_invalid(&vertex_array) {
      unsafe { self.driver.bind_vertex_array(vertex_array) };
      cached.set(vertex_array);
    }
  }

  /// Use a shader program.
  pub fn use_program(&mut self, program: Option<ObjectId>) {
    let cached = self.shadow.program_mut();

    if cached.is_invalid(&program) {
      unsafe { self.driver.use_program(program) };
      cached.set(program);
    }
  }

  /// Request a global viewport.
  ///
  /// The request is discarded if the draw framebuffer is locked with a viewport of its own.
  pub fn set_viewport(&mut self, viewport: Viewport) {
    let draw = self.shadow.framebuffer_slot(FramebufferRole::Draw);

    match resolve_viewport(draw, viewport) {
      Resolution::Apply(viewport) => self.apply_viewport(viewport),
      Resolution::Suppress(pinned) => {
        trace!(
          "viewport {:?} suppressed; locked framebuffer pins {:?}",
          viewport,
          pinned
        );
      }
    }
  }

  /// Request a global depth state.
  ///
  /// The request is discarded if the draw framebuffer is locked with a depth state of its own.
  pub fn set_depth_state(&mut self, depth: DepthState) {
    let draw = self.shadow.framebuffer_slot(FramebufferRole::Draw);

    match resolve_depth(draw, depth) {
      Resolution::Apply(depth) => self.apply_depth(depth),
      Resolution::Suppress(pinned) => {
        trace!(
          "depth state {:?} suppressed; locked framebuffer pins {:?}",
          depth,
          pinned
        );
      }
    }
  }

  /// Bind an object to any target.
  ///
  /// Framebuffers bound this way keep their lock configuration if they are already bound to that
  /// slot, and are unlocked otherwise.
  pub fn bind(&mut self, target: BindingTarget, object: Option<ObjectId>) -> Result<(), StateError> {
    match target {
      BindingTarget::Buffer(target) => self.bind_buffer(target, object, Bind::Cached),
      BindingTarget::IndexedBuffer { target, index } => self.bind_buffer_base(target, index, object)?,
      BindingTarget::Texture { unit, kind } => self.bind_texture(unit, kind, object)?,
      BindingTarget::Framebuffer(role) => {
        let slot = self.shadow.framebuffer_slot(role);
        let lock = if slot.last_bound() == object {
          slot.lock()
        } else {
          LockedState::Unlocked
        };

        self.bind_framebuffer(role, object, lock);
      }
      BindingTarget::Renderbuffer => self.bind_renderbuffer(object),
      BindingTarget::VertexArray => self.bind_vertex_array(object, Bind::Cached),
      BindingTarget::Program => self.use_program(object),
    }

    Ok(())
  }

  /// Invalidate every buffer binding, indexed slots included.
  pub fn invalidate_buffers(&mut self) {
    self.shadow.invalidate_buffers();
  }

  /// Invalidate the active texture unit and every texture binding.
  pub fn invalidate_textures(&mut self) {
    self.shadow.invalidate_textures();
  }

  /// Invalidate both framebuffer bindings.
  pub fn invalidate_framebuffers(&mut self) {
    self.shadow.invalidate_framebuffers();
  }

  /// Invalidate the renderbuffer binding.
  pub fn invalidate_renderbuffer(&mut self) {
    self.shadow.renderbuffer_mut().invalidate();
  }

  /// Invalidate the vertex array binding.
  pub fn invalidate_vertex_array(&mut self) {
    self.shadow.vertex_array_mut().invalidate();
  }

  /// Invalidate the program in use.
  pub fn invalidate_program(&mut self) {
    self.shadow.program_mut().invalidate();
  }

  /// Invalidate the viewport.
  pub fn invalidate_viewport(&mut self) {
    self.shadow.viewport_mut().invalidate();
  }

  /// Invalidate the depth state.
  pub fn invalidate_depth(&mut self) {
    self.shadow.depth_mut().invalidate();
  }

  /// Invalidate everything; every next request reaches the driver.
  pub fn invalidate_all(&mut self) {
    self.invalidate_buffers();
    self.invalidate_textures();
    self.invalidate_framebuffers();
    self.invalidate_renderbuffer();
    self.invalidate_vertex_array();
    self.invalidate_program();
    self.invalidate_viewport();
    self.invalidate_depth();
  }

  /// Forget a deleted buffer.
  ///
  /// The driver unbinds deleted objects on its own; this clears every slot still holding it.
  pub fn forget_buffer(&mut self, buffer: ObjectId) {
    self.shadow.forget_buffer(buffer);
  }

  /// Forget a deleted texture.
  pub fn forget_texture(&mut self, texture: ObjectId) {
    self.shadow.forget_texture(texture);
  }

  /// Forget a deleted framebuffer.
  pub fn forget_framebuffer(&mut self, framebuffer: ObjectId) {
    self.shadow.forget_framebuffer(framebuffer);
  }

  /// Forget a deleted renderbuffer.
  pub fn forget_renderbuffer(&mut self, renderbuffer: ObjectId) {
    forget(Some(self.shadow.renderbuffer_mut()), renderbuffer);
  }

  /// Forget a deleted vertex array.
  pub fn forget_vertex_array(&mut self, vertex_array: ObjectId) {
    forget(Some(self.shadow.vertex_array_mut()), vertex_array);
  }

  /// Forget a deleted program.
  pub fn forget_program(&mut self, program: ObjectId) {
    forget(Some(self.shadow.program_mut()), program);
  }

  fn apply_overrides(&mut self) {
    let draw = *self.shadow.framebuffer_slot(FramebufferRole::Draw);

    if draw.last_bound().is_none() {
      return;
    }

    if let Some(viewport) = draw.lock().viewport_override() {
      self.apply_viewport(viewport);
    }

    if let Some(depth) = draw.lock().depth_override() {
      self.apply_depth(depth);
    }
  }

  fn apply_viewport(&mut self, viewport: Viewport) {
    let cached = self.shadow.viewport_mut();

    if cached.is_invalid(&viewport) {
      unsafe { self.driver.viewport(viewport) };
      cached.set(viewport);
    }
  }

  // only the fields that differ reach the driver; everything does if the current state is unknown
  fn apply_depth(&mut self, depth: DepthState) {
    let cached = self.shadow.depth_mut();

    if !cached.is_invalid(&depth) {
      return;
    }

    let (testing, clamp, mask, comparison, range) = match cached.get() {
      Some(c) => (
        c.testing != depth.testing,
        c.clamp != depth.clamp,
        c.mask != depth.mask,
        c.comparison != depth.comparison,
        !c.same_range(&depth),
      ),
      None => (true, true, true, true, true),
    };

    unsafe {
      if testing {
        self.driver.set_capability(Capability::DepthTest, depth.testing);
      }

      if clamp {
        self.driver.set_capability(Capability::DepthClamp, depth.clamp);
      }

      if mask {
        self.driver.depth_mask(depth.mask);
      }

      if comparison {
        self.driver.depth_func(depth.comparison);
      }

      if range {
        self.driver.depth_range(depth.near, depth.far);
      }
    }

    cached.set(depth);
  }
}

/// Should the binding be cached or forced to the provided value?
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Bind {
  /// Always issue the driver call.
  Forced,
  /// Issue the driver call only if the cached value differs.
  Cached,
}

/// Check that a target lies within the limits.
pub(crate) fn check_target(limits: &Limits, target: &BindingTarget) -> Result<(), StateError> {
  match *target {
    BindingTarget::IndexedBuffer { target, index } => {
      let count = limits.indexed_buffers(target);

      if index < count {
        Ok(())
      } else {
        Err(StateError::IndexedSlotOutOfRange {
          target,
          index,
          count,
        })
      }
    }

    BindingTarget::Texture { unit, .. } => check_texture_unit(limits, unit),

    _ => Ok(()),
  }
}

pub(crate) fn check_texture_unit(limits: &Limits, unit: u32) -> Result<(), StateError> {
  if unit < limits.texture_units {
    Ok(())
  } else {
    Err(StateError::TextureUnitOutOfRange {
      unit,
      count: limits.texture_units,
    })
  }
}

/// Errors that might happen when changing the graphics state.
///
/// Those are caller errors: nothing is sent to the driver when they occur.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StateError {
  /// The texture unit is beyond what the driver supports.
  TextureUnitOutOfRange {
    /// Requested unit.
    unit: u32,
    /// Number of units.
    count: u32,
  },
  /// The indexed buffer slot is beyond what the driver supports.
  IndexedSlotOutOfRange {
    /// Target of the slot.
    target: IndexedBufferTarget,
    /// Requested slot.
    index: u32,
    /// Number of slots for that target.
    count: u32,
  },
}

impl fmt::Display for StateError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateError::TextureUnitOutOfRange { unit, count } => write!(
        f,
        "texture unit {} out of range (only {} available)",
        unit, count
      ),
      StateError::IndexedSlotOutOfRange {
        target,
        index,
        count,
      } => write!(
        f,
        "{} buffer slot {} out of range (only {} available)",
        target, index, count
      ),
    }
  }
}

impl error::Error for StateError {}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::depth::Comparison;
  use crate::driver::recording::{id, Call, RecordingDriver};

  fn state() -> GraphicsState<RecordingDriver> {
    unsafe { GraphicsState::new(RecordingDriver::new(), &ContextOpt::default()) }
  }

  #[test]
  fn idempotent_bind() {
    let mut state = state();

    state.bind_buffer(BufferTarget::Array, id(3), Bind::Cached);
    state.bind_buffer(BufferTarget::Array, id(3), Bind::Cached);

    assert_eq!(
      state.driver.drain(),
      vec![Call::BindBuffer(BufferTarget::Array, id(3))]
    );
    assert_eq!(state.shadow().bound(BufferTarget::Array.into()), id(3));
  }

  #[test]
  fn forced_bind_always_reaches_driver() {
    let mut state = state();

    state.bind_buffer(BufferTarget::Array, id(3), Bind::Cached);
    state.bind_buffer(BufferTarget::Array, id(3), Bind::Forced);

    assert_eq!(state.driver.drain().len(), 2);
  }

  #[test]
  fn defaults_elide_unbinding() {
    let mut state = state();

    state.use_program(None);
    state.bind_renderbuffer(None);

    assert!(state.driver.drain().is_empty());
  }

  #[test]
  fn viewport_diffing() {
    let mut state = state();

    state.set_viewport(Viewport::new(0, 0, 800, 600));
    state.set_viewport(Viewport::new(0, 0, 800, 600));
    assert_eq!(
      state.driver.drain(),
      vec![Call::Viewport(Viewport::new(0, 0, 800, 600))]
    );

    state.set_viewport(Viewport::new(0, 0, 640, 480));
    assert_eq!(
      state.driver.drain(),
      vec![Call::Viewport(Viewport::new(0, 0, 640, 480))]
    );
  }

  #[test]
  fn locked_framebuffer_suppresses_viewport() {
    let mut state = state();
    let pinned = Viewport::new(0, 0, 256, 256);

    state.bind_framebuffer(FramebufferRole::Draw, id(4), LockedState::viewport(pinned));
    assert_eq!(
      state.driver.drain(),
      vec![
        Call::BindFramebuffer(FramebufferRole::Draw, id(4)),
        Call::Viewport(pinned)
      ]
    );

    state.set_viewport(Viewport::new(0, 0, 800, 600));

    assert!(state.driver.drain().is_empty());
    assert_eq!(state.shadow().viewport(), Some(pinned));
    assert_eq!(
      state
        .shadow()
        .framebuffer_slot(FramebufferRole::Draw)
        .lock()
        .viewport_override(),
      Some(pinned)
    );
  }

  #[test]
  fn invalidated_framebuffer_keeps_its_lock() {
    let mut state = state();
    let pinned = Viewport::new(0, 0, 256, 256);

    state.bind_framebuffer(FramebufferRole::Draw, id(4), LockedState::viewport(pinned));
    state.invalidate_framebuffers();
    state.driver.drain();

    state.set_viewport(Viewport::new(0, 0, 800, 600));
    assert!(state.driver.drain().is_empty());
    assert_eq!(state.shadow().viewport(), Some(pinned));

    // the binding is unknown, so rebinding reaches the driver but keeps the lock
    state.bind(FramebufferRole::Draw.into(), id(4)).unwrap();
    assert_eq!(
      state.driver.drain(),
      vec![Call::BindFramebuffer(FramebufferRole::Draw, id(4))]
    );
    assert_eq!(
      state.shadow().framebuffer_slot(FramebufferRole::Draw).lock(),
      LockedState::viewport(pinned)
    );

    state.set_viewport(Viewport::new(0, 0, 800, 600));
    assert!(state.driver.drain().is_empty());
  }

  #[test]
  fn invalidated_framebuffer_lock_can_change() {
    let mut state = state();
    let pinned = Viewport::new(0, 0, 256, 256);

    state.bind_framebuffer(FramebufferRole::Draw, id(4), LockedState::Unlocked);
    state.invalidate_framebuffers();
    state.driver.drain();

    state.set_framebuffer_lock(FramebufferRole::Draw, LockedState::viewport(pinned));
    assert_eq!(state.driver.drain(), vec![Call::Viewport(pinned)]);

    state.set_viewport(Viewport::new(0, 0, 800, 600));
    assert!(state.driver.drain().is_empty());
  }

  #[test]
  fn global_viewport_applies_again_once_unbound() {
    let mut state = state();
    let pinned = Viewport::new(0, 0, 256, 256);

    state.bind_framebuffer(FramebufferRole::Draw, id(4), LockedState::viewport(pinned));
    state.bind_framebuffer(FramebufferRole::Draw, None, LockedState::Unlocked);
    state.driver.drain();

    state.set_viewport(Viewport::new(0, 0, 800, 600));
    assert_eq!(
      state.driver.drain(),
      vec![Call::Viewport(Viewport::new(0, 0, 800, 600))]
    );
  }

  #[test]
  fn unlocking_restores_global_requests() {
    let mut state = state();
    let pinned = Viewport::new(0, 0, 256, 256);

    state.bind_framebuffer(FramebufferRole::Draw, id(4), LockedState::viewport(pinned));
    state.set_framebuffer_lock(FramebufferRole::Draw, LockedState::Unlocked);
    state.driver.drain();

    state.set_viewport(Viewport::new(0, 0, 800, 600));
    assert_eq!(state.shadow().viewport(), Some(Viewport::new(0, 0, 800, 600)));
  }

  #[test]
  fn read_framebuffer_lock_is_ignored() {
    let mut state = state();

    state.bind_framebuffer(
      FramebufferRole::Read,
      id(4),
      LockedState::viewport(Viewport::new(0, 0, 256, 256)),
    );
    state.driver.drain();

    state.set_viewport(Viewport::new(0, 0, 800, 600));
    assert_eq!(
      state.driver.drain(),
      vec![Call::Viewport(Viewport::new(0, 0, 800, 600))]
    );
  }

  #[test]
  fn depth_state_applied_field_by_field() {
    let mut state = state();

    state.set_depth_state(DepthState::test(Comparison::LessOrEqual));
    assert_eq!(
      state.driver.drain(),
      vec![
        Call::SetCapability(Capability::DepthTest, true),
        Call::DepthFunc(Comparison::LessOrEqual)
      ]
    );

    state.set_depth_state(DepthState::test(Comparison::LessOrEqual));
    assert!(state.driver.drain().is_empty());
  }

  #[test]
  fn unknown_depth_state_applies_every_field() {
    let mut state = state();
    state.invalidate_depth();

    state.set_depth_state(DepthState::default());
    assert_eq!(state.driver.drain().len(), 5);
  }

  #[test]
  fn locked_depth_override() {
    let mut state = state();
    let pinned = DepthState::test(Comparison::Always);

    state.bind_framebuffer(FramebufferRole::Draw, id(2), LockedState::depth(pinned));
    state.driver.drain();

    state.set_depth_state(DepthState::default());
    assert!(state.driver.drain().is_empty());
    assert_eq!(state.shadow().depth(), Some(pinned));
  }

  #[test]
  fn texture_unit_independence() {
    let mut state = state();

    state.bind_texture(0, TextureKind::Dim2, id(7)).unwrap();
    state.bind_texture(1, TextureKind::Dim2, id(9)).unwrap();

    let unit0 = BindingTarget::Texture {
      unit: 0,
      kind: TextureKind::Dim2,
    };
    let unit1 = BindingTarget::Texture {
      unit: 1,
      kind: TextureKind::Dim2,
    };

    assert_eq!(state.shadow().bound(unit0), id(7));
    assert_eq!(state.shadow().bound(unit1), id(9));
    assert_eq!(state.shadow().active_texture_unit(), Some(1));
    assert_eq!(
      state.driver.drain(),
      vec![
        Call::BindTexture(TextureKind::Dim2, id(7)),
        Call::ActiveTexture(1),
        Call::BindTexture(TextureKind::Dim2, id(9)),
      ]
    );
  }

  #[test]
  fn texture_rebind_on_active_unit_is_noop() {
    let mut state = state();

    state.bind_texture(3, TextureKind::Cubemap, id(7)).unwrap();
    state.driver.drain();

    state.bind_texture(3, TextureKind::Cubemap, id(7)).unwrap();
    assert!(state.driver.drain().is_empty());
  }

  #[test]
  fn texture_unit_out_of_range() {
    let mut state = state();

    assert_eq!(
      state.bind_texture(16, TextureKind::Dim2, id(1)),
      Err(StateError::TextureUnitOutOfRange {
        unit: 16,
        count: 16
      })
    );
    assert!(state.driver.drain().is_empty());
  }

  #[test]
  fn indexed_bind_updates_general_binding_point() {
    let mut state = state();

    state
      .bind_buffer_base(IndexedBufferTarget::Uniform, 2, id(5))
      .unwrap();

    assert_eq!(state.shadow().bound(BufferTarget::Uniform.into()), id(5));
    assert_eq!(
      state
        .shadow()
        .indexed_buffers()
        .bound(IndexedBufferTarget::Uniform, 2),
      id(5)
    );

    let err = state
      .bind_buffer_base(IndexedBufferTarget::Uniform, 8, id(5))
      .unwrap_err();
    assert_eq!(
      err.to_string(),
      "uniform buffer slot 8 out of range (only 8 available)"
    );
  }

  #[test]
  fn invalidation_forces_next_call() {
    let mut state = state();

    state.use_program(id(1));
    state.invalidate_all();
    state.use_program(id(1));

    assert_eq!(
      state.driver.drain(),
      vec![Call::UseProgram(id(1)), Call::UseProgram(id(1))]
    );
  }

  #[test]
  fn forgetting_deleted_objects() {
    let mut state = state();

    state.bind_texture(0, TextureKind::Dim2, id(7)).unwrap();
    state.bind_texture(2, TextureKind::Dim3, id(7)).unwrap();
    state.bind_vertex_array(id(7), Bind::Cached);
    state.bind_framebuffer(
      FramebufferRole::Draw,
      id(8),
      LockedState::viewport(Viewport::whole(4, 4)),
    );

    state.forget_texture(ObjectId::new(7).unwrap());
    state.forget_framebuffer(ObjectId::new(8).unwrap());

    let shadow = state.shadow();
    assert_eq!(shadow.texture_unit(0).unwrap().bound(TextureKind::Dim2), None);
    assert_eq!(shadow.texture_unit(2).unwrap().bound(TextureKind::Dim3), None);
    assert_eq!(shadow.bound(BindingTarget::VertexArray), id(7));
    assert_eq!(shadow.bound(FramebufferRole::Draw.into()), None);
    assert_eq!(
      shadow.framebuffer_slot(FramebufferRole::Draw).lock(),
      LockedState::Unlocked
    );
  }

  #[test]
  fn generic_bind_covers_every_target() {
    let mut state = state();
    let targets = [
      BindingTarget::Buffer(BufferTarget::Query),
      BindingTarget::IndexedBuffer {
        target: IndexedBufferTarget::ShaderStorage,
        index: 1,
      },
      BindingTarget::Texture {
        unit: 5,
        kind: TextureKind::Rectangle,
      },
      BindingTarget::Framebuffer(FramebufferRole::Read),
      BindingTarget::Renderbuffer,
      BindingTarget::VertexArray,
      BindingTarget::Program,
    ];

    for target in targets.iter() {
      state.bind(*target, id(11)).unwrap();
      assert_eq!(state.shadow().bound(*target), id(11));
    }
  }
}
