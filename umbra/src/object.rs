//! Driver object handles.
//!
//! Every object living on the driver side (buffers, textures, framebuffers, etc.) is named by an
//! unsigned integer. The name `0` is reserved and means “no object”; that reservation is encoded in
//! [`ObjectId`], which can never be zero. An unbound slot is then simply `Option<ObjectId>::None`.

use std::fmt;
use std::num::NonZeroU32;

/// Name of an object living on the driver side.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ObjectId(NonZeroU32);

impl ObjectId {
  /// Wrap a raw driver name.
  ///
  /// Returns `None` for `0`, which the driver reserves for “no object”.
  pub fn new(name: u32) -> Option<Self> {
    NonZeroU32::new(name).map(ObjectId)
  }

  /// Raw driver name.
  pub fn get(self) -> u32 {
    self.0.get()
  }

  /// Raw driver name of an optional object, `0` standing for “none”.
  pub fn raw(id: Option<Self>) -> u32 {
    id.map_or(0, ObjectId::get)
  }
}

impl fmt::Display for ObjectId {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    write!(f, "#{}", self.0)
  }
}

/// Objects that can be bound through a [`Context`](crate::context::Context).
///
/// This is implemented by the thin object wrappers living outside of this crate. An object that has
/// not been created yet or that has already been deleted reports no identifier; binding it is a
/// caller error.
pub trait GlObject {
  /// Driver name of the object, if it is alive.
  fn object_id(&self) -> Option<ObjectId>;
}

impl GlObject for ObjectId {
  fn object_id(&self) -> Option<ObjectId> {
    Some(*self)
  }
}

impl GlObject for Option<ObjectId> {
  fn object_id(&self) -> Option<ObjectId> {
    *self
  }
}

impl<'a, T> GlObject for &'a T
where
  T: GlObject + ?Sized,
{
  fn object_id(&self) -> Option<ObjectId> {
    (**self).object_id()
  }
}
