use std::fmt;

use serde::{Deserialize, Serialize};

use crate::timestamps::TrackTimestamp;

/// Index range `[start, end]` over the loaded track's timestamp sequence.
///
/// Always satisfies `start <= end < len` for the sequence it was built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScrubWindow {
    start: usize,
    end: usize,
}

impl ScrubWindow {
    /// Build a window over a sequence of `len` samples.
    ///
    /// Out-of-range handles are clamped to the last index and swapped handles
    /// are reordered, so any slider position maps onto a valid window.
    pub fn new(start: usize, end: usize, len: usize) -> Option<Self> {
        let last = len.checked_sub(1)?;
        let (start, end) = (start.min(last), end.min(last));
        Some(Self {
            start: start.min(end),
            end: start.max(end),
        })
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn sample_count(&self) -> usize {
        self.end - self.start + 1
    }
}

/// Timestamps at the two ends of a [`ScrubWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: TrackTimestamp,
    pub end: TrackTimestamp,
}

impl WindowBounds {
    /// Labels shown next to the slider.
    pub fn labels(&self) -> (String, String) {
        (self.start.display_label(), self.end.display_label())
    }

    /// Query-parameter values for window-scoped API requests.
    pub fn query_values(&self) -> (String, String) {
        (self.start.local_naive(), self.end.local_naive())
    }
}

/// Decimation factor applied to map track points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Stride {
    #[default]
    Every1,
    Every2,
    Every5,
    Every10,
    Every25,
    Every100,
    Every1000,
}

impl Stride {
    pub const ALL: [Stride; 7] = [
        Stride::Every1,
        Stride::Every2,
        Stride::Every5,
        Stride::Every10,
        Stride::Every25,
        Stride::Every100,
        Stride::Every1000,
    ];

    pub fn factor(self) -> u32 {
        match self {
            Stride::Every1 => 1,
            Stride::Every2 => 2,
            Stride::Every5 => 5,
            Stride::Every10 => 10,
            Stride::Every25 => 25,
            Stride::Every100 => 100,
            Stride::Every1000 => 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("stride {0} is not one of 1, 2, 5, 10, 25, 100, 1000")]
pub struct InvalidStride(pub u32);

impl TryFrom<u32> for Stride {
    type Error = InvalidStride;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Stride::ALL
            .into_iter()
            .find(|stride| stride.factor() == value)
            .ok_or(InvalidStride(value))
    }
}

impl From<Stride> for u32 {
    fn from(stride: Stride) -> Self {
        stride.factor()
    }
}

impl fmt::Display for Stride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.factor())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_requires_samples() {
        assert!(ScrubWindow::new(0, 0, 0).is_none());
        let single = ScrubWindow::new(0, 0, 1).unwrap();
        assert_eq!(single.sample_count(), 1);
    }

    #[test]
    fn window_clamps_and_orders_handles() {
        let clamped = ScrubWindow::new(5, 500, 100).unwrap();
        assert_eq!((clamped.start(), clamped.end()), (5, 99));

        let swapped = ScrubWindow::new(20, 10, 100).unwrap();
        assert_eq!((swapped.start(), swapped.end()), (10, 20));
        assert_eq!(swapped.sample_count(), 11);
    }

    #[test]
    fn stride_offers_only_the_fixed_set() {
        let factors: Vec<u32> = Stride::ALL.iter().map(|stride| stride.factor()).collect();
        assert_eq!(factors, vec![1, 2, 5, 10, 25, 100, 1000]);
        assert_eq!(Stride::default().factor(), 1);

        assert_eq!(Stride::try_from(25), Ok(Stride::Every25));
        assert_eq!(Stride::try_from(3), Err(InvalidStride(3)));
        assert_eq!(Stride::try_from(0), Err(InvalidStride(0)));
    }

    #[test]
    fn stride_serializes_as_number() {
        let json = serde_json::to_string(&Stride::Every100).unwrap();
        assert_eq!(json, "100");
        assert!(serde_json::from_str::<Stride>("7").is_err());
    }
}
