use std::ops::{Add, Div, Sub};

/// Numeric types a [`RunningAverage`] can hold
///
/// The running sum is kept in the same type as the values, so pick a type
/// wide enough for `N` values (e.g. feed `i16` sensor readings into an
/// `i32` accumulator).
pub trait Accumulate: Copy + Add<Output = Self> + Sub<Output = Self> + Div<Output = Self> {
    const ZERO: Self;

    /// Largest fill count [`from_count`](Self::from_count) represents exactly
    const MAX_COUNT: usize;

    /// Convert a fill count into the value domain for the final division
    fn from_count(count: usize) -> Self;
}

macro_rules! impl_accumulate {
    ($($t:ty => $zero:expr, $max:expr);* $(;)?) => {
        $(
            impl Accumulate for $t {
                const ZERO: Self = $zero;
                const MAX_COUNT: usize = $max;

                fn from_count(count: usize) -> Self {
                    count as $t
                }
            }
        )*
    };
}

impl_accumulate!(
    i16 => 0, i16::MAX as usize;
    i32 => 0, i32::MAX as usize;
    i64 => 0, usize::MAX;
    f32 => 0.0, 1 << f32::MANTISSA_DIGITS;
    f64 => 0.0, usize::MAX;
);

/// Fixed-capacity running average
///
/// Keeps the last `N` values in a circular buffer together with their sum,
/// so adding a value and reading the average are both O(1). Storage is
/// inline and sized at compile time; `N == 0` fails to compile, as does an
/// `N` above [`Accumulate::MAX_COUNT`] (e.g. more than 32767 `i16` slots),
/// so the fill count never narrows when it is converted for the division.
///
/// Until `N` values have been added the average covers only the values seen
/// so far. With no values at all the average is zero.
#[derive(Debug, Clone)]
pub struct RunningAverage<T: Accumulate, const N: usize> {
    buffer: [T; N],
    index: usize,
    count: usize,
    sum: T,
}

impl<T: Accumulate, const N: usize> RunningAverage<T, N> {
    const VALID_CAPACITY: () = {
        assert!(N > 0, "RunningAverage capacity must be non-zero");
        assert!(
            N <= T::MAX_COUNT,
            "RunningAverage capacity exceeds what the value type can count"
        );
    };

    /// Create an empty running average
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;
        Self {
            buffer: [T::ZERO; N],
            index: 0,
            count: 0,
            sum: T::ZERO,
        }
    }

    /// Forget every value, zeroing all slots
    pub fn reset(&mut self) {
        self.buffer = [T::ZERO; N];
        self.index = 0;
        self.count = 0;
        self.sum = T::ZERO;
    }

    /// Add a value, evicting the oldest one once the window is full
    ///
    /// Subtracts the slot under the cursor from the sum, stores `value`
    /// there, adds it to the sum and advances the cursor.
    ///
    /// # Arguments
    /// * `value` - New value to add to the window
    pub fn add(&mut self, value: T) {
        // Slots start zeroed, so subtracting before the window fills is a no-op.
        self.sum = self.sum - self.buffer[self.index];
        self.buffer[self.index] = value;
        self.sum = self.sum + value;

        self.index += 1;
        if self.index == N {
            self.index = 0;
        }
        if self.count < N {
            self.count += 1;
        }
    }

    /// Average of the values in the window
    ///
    /// # Returns
    /// `sum / count` over the values added so far (at most `N`), or zero
    /// when the window is empty
    pub fn average(&self) -> T {
        if self.count == 0 {
            return T::ZERO;
        }
        self.sum / T::from_count(self.count)
    }

    /// Reset, then add `value` `repeats` times
    ///
    /// Seeds the filter with a known value; `repeats` is normally between 1
    /// and `N`, larger values just overwrite the window again.
    pub fn prime(&mut self, value: T, repeats: usize) {
        self.reset();
        for _ in 0..repeats {
            self.add(value);
        }
    }

    pub fn sum(&self) -> T {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn is_full(&self) -> bool {
        self.count == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T: Accumulate, const N: usize> Default for RunningAverage<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_average_partial_window() {
        let mut ra = RunningAverage::<i32, 4>::new();

        ra.add(10);
        assert_eq!(ra.average(), 10);
        ra.add(20);
        assert_eq!(ra.average(), 15);
        ra.add(30);
        assert_eq!(ra.average(), 20);
        assert_eq!(ra.len(), 3);
        assert!(!ra.is_full());
    }

    #[test]
    fn test_largest_i16_window_counts_exactly() {
        const WINDOW: usize = i16::MAX as usize;
        let mut ra = RunningAverage::<i16, WINDOW>::new();
        for _ in 0..WINDOW {
            ra.add(1);
        }
        assert!(ra.is_full());
        assert_eq!(ra.sum(), i16::MAX);
        assert_eq!(ra.average(), 1);
        assert_eq!(<i16 as Accumulate>::MAX_COUNT, WINDOW);
    }

    #[test]
    fn test_running_average_evicts_oldest() {
        let mut ra = RunningAverage::<i32, 3>::new();

        for v in [10, 20, 30] {
            ra.add(v);
        }
        assert_eq!(ra.average(), 20);

        ra.add(40); // window is now 40, 20, 30
        assert_eq!(ra.average(), 30);
        assert_eq!(ra.sum(), 90);
        assert_eq!(ra.len(), 3);
    }

    #[test]
    fn test_empty_average_is_zero() {
        let ra = RunningAverage::<i32, 5>::new();
        assert_eq!(ra.average(), 0);
        assert!(ra.is_empty());

        let rf = RunningAverage::<f32, 5>::new();
        assert_eq!(rf.average(), 0.0);
    }

    #[test]
    fn test_reset_then_add() {
        let mut ra = RunningAverage::<i32, 3>::new();
        ra.add(100);
        ra.add(-7);
        ra.reset();
        assert_eq!(ra.average(), 0);
        assert_eq!(ra.sum(), 0);

        ra.add(42);
        assert_eq!(ra.average(), 42);
    }

    #[test]
    fn test_prime_fills_window() {
        let mut ra = RunningAverage::<i32, 3>::new();
        ra.add(1000);
        ra.prime(5, 3);
        assert_eq!(ra.average(), 5);
        assert!(ra.is_full());

        ra.add(8); // 8, 5, 5
        assert_eq!(ra.average(), 6);
    }

    #[test]
    fn test_prime_partial_weight() {
        let mut ra = RunningAverage::<i32, 4>::new();
        ra.prime(12, 2);
        ra.add(0);
        assert_eq!(ra.len(), 3);
        assert_eq!(ra.average(), 8);
    }

    #[test]
    fn test_integer_average_truncates_toward_zero() {
        let mut ra = RunningAverage::<i32, 2>::new();
        ra.add(-3);
        ra.add(0);
        assert_eq!(ra.average(), -1);
    }

    #[test]
    fn test_float_average() {
        let mut ra = RunningAverage::<f32, 3>::new();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            ra.add(v);
        }
        assert!((ra.average() - 4.0).abs() < 1e-6); // (3+4+5)/3
    }

    #[test]
    fn test_capacity_one() {
        let mut ra = RunningAverage::<i64, 1>::new();
        ra.add(3);
        ra.add(9);
        assert_eq!(ra.average(), 9);
        assert_eq!(ra.capacity(), 1);
    }
}
