use std::num::NonZero;

use new_zealand::nz;

/// The geometric factor by which a [`PlacementVec`][crate::PlacementVec] grows its capacity when
/// it runs out of room implicitly (e.g. on `push()` or `insert()`).
///
/// The factor is a ratio of two integers so that capacity math stays exact. When an operation
/// needs more slots than are available, the new capacity is
/// `ceil((capacity + shortfall) * numerator / denominator)`, where the shortfall is the number of
/// slots missing. This keeps the total relocation cost of `N` sequential insertions linear in `N`.
///
/// The default factor is 3/2.
///
/// # Examples
///
/// ```
/// use new_zealand::nz;
/// use placement_vec::{GrowthFactor, PlacementVec};
///
/// let mut items = PlacementVec::<u32>::builder()
///     .growth_factor(GrowthFactor::new(nz!(2), nz!(1)))
///     .build();
///
/// items.push(1);
/// assert_eq!(items.capacity(), 2);
/// ```
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct GrowthFactor {
    numerator: NonZero<u32>,
    denominator: NonZero<u32>,
}

impl GrowthFactor {
    /// Grow by half of the needed capacity on top of the needed capacity.
    pub const DEFAULT: Self = Self {
        numerator: nz!(3),
        denominator: nz!(2),
    };

    /// Creates a growth factor of `numerator / denominator`.
    ///
    /// # Panics
    ///
    /// Panics if the ratio is not greater than one, as such a factor would not grow the container.
    #[must_use]
    pub fn new(numerator: NonZero<u32>, denominator: NonZero<u32>) -> Self {
        assert!(
            numerator > denominator,
            "growth factor {numerator}/{denominator} must be greater than one"
        );

        Self {
            numerator,
            denominator,
        }
    }

    /// The numerator of the ratio.
    #[must_use]
    pub fn numerator(&self) -> NonZero<u32> {
        self.numerator
    }

    /// The denominator of the ratio.
    #[must_use]
    pub fn denominator(&self) -> NonZero<u32> {
        self.denominator
    }

    /// Calculates the capacity to grow to when a container with `current` slots needs to hold
    /// `required` elements, without exceeding `max` slots.
    ///
    /// Returns `current` unchanged if it already satisfies `required`. The result is clamped to
    /// `max` but never below `required`, so callers must reject `required > max` themselves.
    #[must_use]
    pub fn grown_capacity(&self, current: usize, required: usize, max: usize) -> usize {
        if required <= current {
            return current;
        }

        // `current + shortfall` is just `required`.
        let scaled = u128::try_from(required)
            .expect("usize always fits in u128 on supported platforms")
            .checked_mul(u128::from(self.numerator.get()))
            .expect("usize times u32 always fits in u128")
            .div_ceil(u128::from(self.denominator.get()));

        let grown = usize::try_from(scaled).unwrap_or(usize::MAX);

        grown.min(max).max(required)
    }
}

impl Default for GrowthFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}
