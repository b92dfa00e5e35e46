use gl::types::*;
use umbra::depth::Comparison;
use umbra::driver::{Capability, Limit};
use umbra::target::{BufferTarget, FramebufferRole, IndexedBufferTarget, TextureKind};
use umbra::viewport::Viewport;

pub(crate) fn buffer_target_to_glenum(target: BufferTarget) -> GLenum {
  match target {
    BufferTarget::Array => gl::ARRAY_BUFFER,
    BufferTarget::ElementArray => gl::ELEMENT_ARRAY_BUFFER,
    BufferTarget::Uniform => gl::UNIFORM_BUFFER,
    BufferTarget::ShaderStorage => gl::SHADER_STORAGE_BUFFER,
    BufferTarget::AtomicCounter => gl::ATOMIC_COUNTER_BUFFER,
    BufferTarget::TransformFeedback => gl::TRANSFORM_FEEDBACK_BUFFER,
    BufferTarget::PixelPack => gl::PIXEL_PACK_BUFFER,
    BufferTarget::PixelUnpack => gl::PIXEL_UNPACK_BUFFER,
    BufferTarget::CopyRead => gl::COPY_READ_BUFFER,
    BufferTarget::CopyWrite => gl::COPY_WRITE_BUFFER,
    BufferTarget::Query => gl::QUERY_BUFFER,
  }
}

pub(crate) fn indexed_target_to_glenum(target: IndexedBufferTarget) -> GLenum {
  buffer_target_to_glenum(target.general())
}

pub(crate) fn texture_kind_to_glenum(kind: TextureKind) -> GLenum {
  match kind {
    TextureKind::Dim1 => gl::TEXTURE_1D,
    TextureKind::Dim2 => gl::TEXTURE_2D,
    TextureKind::Dim3 => gl::TEXTURE_3D,
    TextureKind::Dim1Array => gl::TEXTURE_1D_ARRAY,
    TextureKind::Dim2Array => gl::TEXTURE_2D_ARRAY,
    TextureKind::Dim2Multisample => gl::TEXTURE_2D_MULTISAMPLE,
    TextureKind::Dim2MultisampleArray => gl::TEXTURE_2D_MULTISAMPLE_ARRAY,
    TextureKind::Cubemap => gl::TEXTURE_CUBE_MAP,
    TextureKind::CubemapArray => gl::TEXTURE_CUBE_MAP_ARRAY,
    TextureKind::Buffer => gl::TEXTURE_BUFFER,
    TextureKind::Rectangle => gl::TEXTURE_RECTANGLE,
  }
}

pub(crate) fn framebuffer_role_to_glenum(role: FramebufferRole) -> GLenum {
  match role {
    FramebufferRole::Read => gl::READ_FRAMEBUFFER,
    FramebufferRole::Draw => gl::DRAW_FRAMEBUFFER,
  }
}

pub(crate) fn comparison_to_glenum(dc: Comparison) -> GLenum {
  match dc {
    Comparison::Never => gl::NEVER,
    Comparison::Always => gl::ALWAYS,
    Comparison::Equal => gl::EQUAL,
    Comparison::NotEqual => gl::NOTEQUAL,
    Comparison::Less => gl::LESS,
    Comparison::LessOrEqual => gl::LEQUAL,
    Comparison::Greater => gl::GREATER,
    Comparison::GreaterOrEqual => gl::GEQUAL,
  }
}

pub(crate) fn capability_to_glenum(capability: Capability) -> GLenum {
  match capability {
    Capability::DepthTest => gl::DEPTH_TEST,
    Capability::DepthClamp => gl::DEPTH_CLAMP,
  }
}

pub(crate) fn limit_to_glenum(limit: Limit) -> GLenum {
  match limit {
    Limit::TextureUnits => gl::MAX_COMBINED_TEXTURE_IMAGE_UNITS,
    Limit::IndexedBuffers(IndexedBufferTarget::TransformFeedback) => {
      gl::MAX_TRANSFORM_FEEDBACK_BUFFERS
    }
    Limit::IndexedBuffers(IndexedBufferTarget::Uniform) => gl::MAX_UNIFORM_BUFFER_BINDINGS,
    Limit::IndexedBuffers(IndexedBufferTarget::AtomicCounter) => {
      gl::MAX_ATOMIC_COUNTER_BUFFER_BINDINGS
    }
    Limit::IndexedBuffers(IndexedBufferTarget::ShaderStorage) => {
      gl::MAX_SHADER_STORAGE_BUFFER_BINDINGS
    }
  }
}

pub(crate) fn bool_to_glboolean(b: bool) -> GLboolean {
  if b {
    gl::TRUE
  } else {
    gl::FALSE
  }
}

// sizes past GLsizei::MAX saturate instead of wrapping to a negative size
pub(crate) fn viewport_to_glint(viewport: Viewport) -> [GLint; 4] {
  let clamp = |size: u32| size.min(GLsizei::MAX as u32) as GLsizei;

  [
    viewport.x as GLint,
    viewport.y as GLint,
    clamp(viewport.width),
    clamp(viewport.height),
  ]
}
