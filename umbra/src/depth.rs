//! Depth test related features.

/// Depth comparison to perform while depth testing. `a` is the incoming fragment’s depth and `b`
/// is the fragment’s depth that is already stored.
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq)]
pub enum Comparison {
  /// Depth test never succeeds.
  Never,
  /// Depth test always succeeds.
  Always,
  /// Depth test succeeds if `a == b`.
  Equal,
  /// Depth test succeeds if `a != b`.
  NotEqual,
  /// Depth test succeeds if `a < b`.
  Less,
  /// Depth test succeeds if `a <= b`.
  LessOrEqual,
  /// Depth test succeeds if `a > b`.
  Greater,
  /// Depth test succeeds if `a >= b`.
  GreaterOrEqual,
}

/// Complete depth configuration.
///
/// Two depth states are equal if all their fields are; `near` and `far` are compared bit-for-bit,
/// so `-0.0` and `0.0` are considered different, as are two different NaN payloads.
#[derive(Clone, Copy, Debug)]
pub struct DepthState {
  /// Whether the depth test is enabled.
  pub testing: bool,
  /// Whether depth clamping is enabled.
  pub clamp: bool,
  /// Whether depth writes are enabled.
  pub mask: bool,
  /// Comparison used by the depth test.
  pub comparison: Comparison,
  /// Near end of the depth range.
  pub near: f64,
  /// Far end of the depth range.
  pub far: f64,
}

impl Default for DepthState {
  /// The driver’s initial depth configuration:
  ///
  /// - testing and clamping disabled;
  /// - writes enabled;
  /// - [`Comparison::Less`];
  /// - range `0..1`.
  fn default() -> Self {
    DepthState {
      testing: false,
      clamp: false,
      mask: true,
      comparison: Comparison::Less,
      near: 0.,
      far: 1.,
    }
  }
}

impl PartialEq for DepthState {
  fn eq(&self, other: &Self) -> bool {
    self.testing == other.testing
      && self.clamp == other.clamp
      && self.mask == other.mask
      && self.comparison == other.comparison
      && self.near.to_bits() == other.near.to_bits()
      && self.far.to_bits() == other.far.to_bits()
  }
}

impl Eq for DepthState {}

impl DepthState {
  /// Depth test enabled with the given comparison, other fields left to their defaults.
  pub fn test(comparison: Comparison) -> Self {
    DepthState {
      testing: true,
      comparison,
      ..DepthState::default()
    }
  }

  pub(crate) fn same_range(&self, other: &Self) -> bool {
    self.near.to_bits() == other.near.to_bits() && self.far.to_bits() == other.far.to_bits()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn equal_field_by_field() {
    let a = DepthState::test(Comparison::LessOrEqual);
    let mut b = a;
    assert_eq!(a, b);

    b.mask = false;
    assert_ne!(a, b);
  }

  #[test]
  fn range_compared_bit_for_bit() {
    let a = DepthState::default();
    let b = DepthState {
      near: -0.,
      ..DepthState::default()
    };

    assert_ne!(a, b);
    assert!(!a.same_range(&b));

    let nan = DepthState {
      far: f64::NAN,
      ..DepthState::default()
    };
    assert_eq!(nan, nan);
  }
}
