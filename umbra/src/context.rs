//! Graphics contexts.
//!
//! A [`Context`] bundles the graphics state of a driver context (the driver, its shadow state and
//! its limits) with the [`Dispatcher`] guarding it. Every state-changing operation goes through the
//! dispatcher: on the owning thread it runs right away, elsewhere it waits for the next
//! [`Context::flush`].
//!
//! Operations are validated against the limits before they get dispatched, so that an action that
//! has been deferred can never fail once it eventually runs.

use log::{debug, warn};
use std::error;
use std::fmt;
use std::thread::{self, ThreadId};

use crate::cache::ShadowState;
use crate::depth::DepthState;
use crate::dispatch::{Dispatcher, Remote};
use crate::driver::{Driver, Limits};
use crate::lock::LockedState;
use crate::object::{GlObject, ObjectId};
use crate::opt::ContextOpt;
use crate::state::{check_target, check_texture_unit, Bind, GraphicsState, StateError};
use crate::target::{BindingTarget, BufferTarget, FramebufferRole, IndexedBufferTarget, TextureKind};
use crate::viewport::Viewport;

/// A graphics context.
///
/// One context exists per driver context (i.e. per rendering surface). There is no global context:
/// code that needs one gets handed a `&mut Context`, and other threads get a [`Remote`].
#[derive(Debug)]
pub struct Context<D> {
  state: GraphicsState<D>,
  dispatcher: Dispatcher<GraphicsState<D>>,
  opt: ContextOpt,
}

impl<D> Context<D>
where
  D: Driver + 'static,
{
  /// Create a context owned by the calling thread.
  ///
  /// Limits are queried once, here, and the shadow state is sized from them.
  ///
  /// # Safety
  ///
  /// The driver context must be current on the calling thread.
  pub unsafe fn new(driver: D, opt: ContextOpt) -> Self {
    let mut dispatcher: Dispatcher<GraphicsState<D>> = Dispatcher::new();
    dispatcher.set_warn_threshold(opt.queue_warn_threshold());
    dispatcher.thread_change();

    Self::with_dispatcher(driver, opt, dispatcher)
  }

  /// Create a context that runs everything right away, whatever the calling thread.
  ///
  /// Such a context has no owner and hands out no [`Remote`]. It is meant for short-lived contexts
  /// (tools, tests) where the caller already makes sure the driver context is current.
  ///
  /// # Safety
  ///
  /// The driver context must be current on the calling thread, and on every thread using the
  /// context afterwards.
  pub unsafe fn temporary(driver: D, opt: ContextOpt) -> Self {
    Self::with_dispatcher(driver, opt, Dispatcher::temporary())
  }

  unsafe fn with_dispatcher(
    driver: D,
    opt: ContextOpt,
    dispatcher: Dispatcher<GraphicsState<D>>,
  ) -> Self {
    let state = GraphicsState::new(driver, &opt);
    let limits = state.limits();

    match limits.version {
      Some((major, minor)) => debug!("driver version {}.{}", major, minor),
      None => debug!("driver version unknown"),
    }

    debug!(
      "limits: {} texture units, {} transform feedback / {} uniform / {} atomic counter / {} shader storage buffer slots",
      limits.texture_units,
      limits.transform_feedback_buffers,
      limits.uniform_buffers,
      limits.atomic_counter_buffers,
      limits.shader_storage_buffers
    );

    Context {
      state,
      dispatcher,
      opt,
    }
  }

  /// Options the context was created with.
  pub fn opt(&self) -> &ContextOpt {
    &self.opt
  }

  /// Limits the context was sized from.
  pub fn limits(&self) -> &Limits {
    self.state.limits()
  }

  /// Read-only view of the shadow state.
  pub fn shadow(&self) -> &ShadowState {
    self.state.shadow()
  }

  /// Underlying driver.
  pub fn driver(&self) -> &D {
    self.state.driver()
  }

  /// Graphics state, for calls not covered by the context methods.
  ///
  /// Mutating the state directly bypasses the dispatcher; prefer [`Context::push`] unless you are
  /// on the owning thread.
  pub fn state(&mut self) -> &mut GraphicsState<D> {
    &mut self.state
  }

  /// Run an action against the graphics state.
  ///
  /// The action runs right away on the owning thread and is queued elsewhere.
  pub fn push<F>(&mut self, action: F)
  where
    F: FnOnce(&mut GraphicsState<D>) + Send + 'static,
  {
    self.dispatcher.push(&mut self.state, action);
  }

  /// Run the queued actions, in push order.
  ///
  /// Returns the number of actions that ran. Meant to be called by the owning thread, typically
  /// once per frame; flushing from another thread logs a warning.
  pub fn flush(&mut self) -> usize {
    if !self.dispatcher.is_temporary() && self.owner() != Some(thread::current().id()) {
      warn!(
        "flushing from {:?}, which does not own the context ({:?})",
        thread::current().id(),
        self.owner()
      );
    }

    self.dispatcher.flush(&mut self.state)
  }

  /// Make the calling thread the owner of the context.
  ///
  /// # Safety
  ///
  /// The driver context must be current on the calling thread.
  pub unsafe fn thread_change(&mut self) {
    self.dispatcher.thread_change();
  }

  /// Owning thread; `None` for temporary contexts.
  pub fn owner(&self) -> Option<ThreadId> {
    self.dispatcher.owner()
  }

  /// Number of queued actions.
  pub fn pending(&self) -> usize {
    self.dispatcher.pending()
  }

  /// Handle other threads can push actions through; `None` for temporary contexts.
  pub fn remote(&self) -> Option<Remote<GraphicsState<D>>> {
    self.dispatcher.remote()
  }

  /// Bind an object to a target.
  pub fn bind<O>(&mut self, target: BindingTarget, object: &O) -> Result<(), ContextError>
  where
    O: GlObject + ?Sized,
  {
    let id = object
      .object_id()
      .ok_or(ContextError::NullObject { target })?;

    self.bind_raw(target, Some(id))
  }

  /// Unbind whatever is bound to a target.
  ///
  /// Unbinding a framebuffer also unlocks its slot.
  pub fn unbind(&mut self, target: BindingTarget) -> Result<(), ContextError> {
    self.bind_raw(target, None)
  }

  fn bind_raw(&mut self, target: BindingTarget, object: Option<ObjectId>) -> Result<(), ContextError> {
    check_target(self.limits(), &target)?;

    self.push(move |state| {
      if let Err(e) = state.bind(target, object) {
        warn!("cannot bind {:?}: {}", target, e);
      }
    });

    Ok(())
  }

  /// Object bound to a target, as far as the shadow state knows.
  pub fn bound(&self, target: BindingTarget) -> Option<ObjectId> {
    self.shadow().bound(target)
  }

  /// Whether an object is bound to a target.
  ///
  /// An object with no identifier is never bound.
  pub fn is_bound<O>(&self, target: BindingTarget, object: &O) -> bool
  where
    O: GlObject + ?Sized,
  {
    match object.object_id() {
      Some(id) => self.bound(target) == Some(id),
      None => false,
    }
  }

  /// Texture bound to a unit for a given kind.
  pub fn bound_texture(&self, unit: u32, kind: TextureKind) -> Option<ObjectId> {
    self.bound(BindingTarget::Texture { unit, kind })
  }

  /// Bind a buffer to a general binding point.
  ///
  /// Use [`Bind::Forced`] right after creating the buffer: the driver only really creates it on its
  /// first bind.
  pub fn bind_buffer<O>(&mut self, target: BufferTarget, buffer: &O, bind: Bind) -> Result<(), ContextError>
  where
    O: GlObject + ?Sized,
  {
    let id = buffer.object_id().ok_or(ContextError::NullObject {
      target: target.into(),
    })?;

    self.push(move |state| state.bind_buffer(target, Some(id), bind));
    Ok(())
  }

  /// Bind a buffer to an indexed slot.
  pub fn bind_buffer_base<O>(
    &mut self,
    target: IndexedBufferTarget,
    index: u32,
    buffer: &O,
  ) -> Result<(), ContextError>
  where
    O: GlObject + ?Sized,
  {
    self.bind(BindingTarget::IndexedBuffer { target, index }, buffer)
  }

  /// Bind a texture on a texture unit.
  pub fn bind_texture<O>(&mut self, unit: u32, kind: TextureKind, texture: &O) -> Result<(), ContextError>
  where
    O: GlObject + ?Sized,
  {
    self.bind(BindingTarget::Texture { unit, kind }, texture)
  }

  /// Make a texture unit active.
  pub fn set_texture_unit(&mut self, unit: u32) -> Result<(), ContextError> {
    check_texture_unit(self.limits(), unit)?;

    self.push(move |state| {
      if let Err(e) = state.set_texture_unit(unit) {
        warn!("cannot activate texture unit: {}", e);
      }
    });

    Ok(())
  }

  /// Bind a framebuffer along with its lock configuration.
  pub fn bind_framebuffer<O>(
    &mut self,
    role: FramebufferRole,
    framebuffer: &O,
    lock: LockedState,
  ) -> Result<(), ContextError>
  where
    O: GlObject + ?Sized,
  {
    let id = framebuffer.object_id().ok_or(ContextError::NullObject {
      target: role.into(),
    })?;

    self.push(move |state| state.bind_framebuffer(role, Some(id), lock));
    Ok(())
  }

  /// Change the lock configuration of the framebuffer bound to a slot.
  pub fn set_framebuffer_lock(&mut self, role: FramebufferRole, lock: LockedState) {
    self.push(move |state| state.set_framebuffer_lock(role, lock));
  }

  /// Bind a vertex array.
  pub fn bind_vertex_array<O>(&mut self, vertex_array: &O, bind: Bind) -> Result<(), ContextError>
  where
    O: GlObject + ?Sized,
  {
    let id = vertex_array.object_id().ok_or(ContextError::NullObject {
      target: BindingTarget::VertexArray,
    })?;

    self.push(move |state| state.bind_vertex_array(Some(id), bind));
    Ok(())
  }

  /// Use a shader program.
  pub fn use_program<O>(&mut self, program: &O) -> Result<(), ContextError>
  where
    O: GlObject + ?Sized,
  {
    self.bind(BindingTarget::Program, program)
  }

  /// Request a global viewport.
  pub fn set_viewport(&mut self, viewport: Viewport) {
    self.push(move |state| state.set_viewport(viewport));
  }

  /// Request a global depth state.
  pub fn set_depth_state(&mut self, depth: DepthState) {
    self.push(move |state| state.set_depth_state(depth));
  }

  /// Mark everything unknown, so that every next request reaches the driver.
  ///
  /// Finer-grained invalidation is available on [`GraphicsState`], through [`Context::push`].
  pub fn invalidate_all(&mut self) {
    self.push(|state| state.invalidate_all());
  }

  /// Forget a deleted buffer.
  pub fn forget_buffer(&mut self, buffer: ObjectId) {
    self.push(move |state| state.forget_buffer(buffer));
  }

  /// Forget a deleted texture.
  pub fn forget_texture(&mut self, texture: ObjectId) {
    self.push(move |state| state.forget_texture(texture));
  }

  /// Forget a deleted framebuffer.
  pub fn forget_framebuffer(&mut self, framebuffer: ObjectId) {
    self.push(move |state| state.forget_framebuffer(framebuffer));
  }

  /// Forget a deleted renderbuffer.
  pub fn forget_renderbuffer(&mut self, renderbuffer: ObjectId) {
    self.push(move |state| state.forget_renderbuffer(renderbuffer));
  }

  /// Forget a deleted vertex array.
  pub fn forget_vertex_array(&mut self, vertex_array: ObjectId) {
    self.push(move |state| state.forget_vertex_array(vertex_array));
  }

  /// Forget a deleted program.
  pub fn forget_program(&mut self, program: ObjectId) {
    self.push(move |state| state.forget_program(program));
  }
}

/// Errors that might happen when using a [`Context`].
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContextError {
  /// The object to bind has no identifier (not created yet, or already deleted).
  NullObject {
    /// Target the object was about to be bound to.
    target: BindingTarget,
  },
  /// Invalid state change.
  State(StateError),
}

impl fmt::Display for ContextError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ContextError::NullObject { target } => write!(f, "cannot bind a null object to {:?}", target),
      ContextError::State(ref e) => write!(f, "state error: {}", e),
    }
  }
}

impl error::Error for ContextError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ContextError::State(e) => Some(e),
      _ => None,
    }
  }
}

impl From<StateError> for ContextError {
  fn from(e: StateError) -> Self {
    ContextError::State(e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::driver::recording::{id, Call, RecordingDriver};
  use std::error::Error as _;

  fn context() -> Context<RecordingDriver> {
    unsafe { Context::new(RecordingDriver::new(), ContextOpt::default()) }
  }

  fn calls(ctx: &mut Context<RecordingDriver>) -> Vec<Call> {
    unsafe { ctx.state().driver_mut().drain() }
  }

  #[test]
  fn creation_takes_ownership() {
    let ctx = context();

    assert_eq!(ctx.owner(), Some(thread::current().id()));
    assert_eq!(ctx.limits().texture_units, 16);
    assert_eq!(ctx.limits().version, Some((4, 6)));
  }

  #[test]
  fn owner_binds_synchronously() {
    let mut ctx = context();
    let buffer = ObjectId::new(3).unwrap();

    ctx.bind(BufferTarget::Array.into(), &buffer).unwrap();

    assert!(ctx.is_bound(BufferTarget::Array.into(), &buffer));
    assert_eq!(ctx.pending(), 0);
    assert_eq!(calls(&mut ctx), vec![Call::BindBuffer(BufferTarget::Array, id(3))]);
  }

  #[test]
  fn null_object_is_rejected() {
    let mut ctx = context();
    let target = BindingTarget::Program;

    assert_eq!(
      ctx.bind(target, &None::<ObjectId>),
      Err(ContextError::NullObject { target })
    );
    assert!(!ctx.is_bound(target, &None::<ObjectId>));
    assert!(calls(&mut ctx).is_empty());
  }

  #[test]
  fn out_of_range_rejected_before_dispatch() {
    let mut ctx = context();
    let err = ctx
      .bind_texture(16, TextureKind::Dim2, &ObjectId::new(1).unwrap())
      .unwrap_err();

    assert_eq!(
      err,
      ContextError::State(StateError::TextureUnitOutOfRange {
        unit: 16,
        count: 16
      })
    );
    assert!(err.source().is_some());
    assert_eq!(ctx.pending(), 0);
  }

  #[test]
  fn unbinding_framebuffer_unlocks() {
    let mut ctx = context();
    let fb = ObjectId::new(4).unwrap();

    ctx
      .bind_framebuffer(
        FramebufferRole::Draw,
        &fb,
        LockedState::viewport(Viewport::whole(64, 64)),
      )
      .unwrap();
    ctx.unbind(FramebufferRole::Draw.into()).unwrap();

    let slot = ctx.shadow().framebuffer_slot(FramebufferRole::Draw);
    assert_eq!(slot.framebuffer(), None);
    assert_eq!(slot.lock(), LockedState::Unlocked);
  }

  #[test]
  fn off_thread_actions_wait_for_flush() {
    let mut ctx = context();
    let remote = ctx.remote().unwrap();

    thread::spawn(move || {
      remote.push(|state| state.use_program(id(9)));
    })
    .join()
    .unwrap();

    assert_eq!(ctx.pending(), 1);
    assert_eq!(ctx.bound(BindingTarget::Program), None);

    assert_eq!(ctx.flush(), 1);
    assert_eq!(ctx.bound(BindingTarget::Program), id(9));
    assert_eq!(calls(&mut ctx), vec![Call::UseProgram(id(9))]);
  }

  #[test]
  fn temporary_context_has_no_owner() {
    let mut ctx = unsafe { Context::temporary(RecordingDriver::new(), ContextOpt::default()) };

    ctx.set_viewport(Viewport::whole(800, 600));

    assert_eq!(ctx.owner(), None);
    assert!(ctx.remote().is_none());
    assert_eq!(ctx.shadow().viewport(), Some(Viewport::whole(800, 600)));
  }

  #[test]
  fn forgetting_through_context() {
    let mut ctx = context();
    let texture = ObjectId::new(7).unwrap();

    ctx.bind_texture(0, TextureKind::Dim2, &texture).unwrap();
    ctx.forget_texture(texture);

    assert_eq!(ctx.bound_texture(0, TextureKind::Dim2), None);
  }
}
