//! Hours and sub-hour slices of the planning horizon.
//!
//! Hour 0 is an initial hour: it carries plant and sorbent state into the horizon but earns no
//! margin. Operating hours run from 1 to `n_hour` inclusive. Each hour is divided into
//! [`SLICES_PER_HOUR`] slices for tracking the DAC sorbent inventory; inventory pools are also
//! defined at the closing boundary of an hour, which is the same instant as slice 0 of the next.
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;

/// Number of 15-minute slices in an hour
pub const SLICES_PER_HOUR: usize = 4;

/// Hours in a day
pub const HOURS_PER_DAY: usize = 24;

/// A slice within an hour, or the closing boundary of an hour when equal to
/// [`SLICES_PER_HOUR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HourSlice {
    /// The hour
    pub hour: usize,
    /// The slice within the hour
    pub slice: usize,
}

impl HourSlice {
    /// Create a new [`HourSlice`]
    pub fn new(hour: usize, slice: usize) -> Self {
        assert!(slice <= SLICES_PER_HOUR, "Slice {slice} out of range");
        Self { hour, slice }
    }

    /// The boundary at the end of this slice
    pub fn next(self) -> Self {
        Self::new(self.hour, self.slice + 1)
    }
}

impl fmt::Display for HourSlice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.hour, self.slice)
    }
}

/// The planning horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Horizon {
    n_hour: usize,
}

impl Horizon {
    /// Create a horizon with the given number of operating hours
    pub fn new(n_hour: usize) -> Self {
        assert!(n_hour > 0, "Horizon must contain at least one operating hour");
        Self { n_hour }
    }

    /// Create a horizon spanning whole days
    pub fn from_days(n_day: u32) -> Self {
        Self::new(n_day as usize * HOURS_PER_DAY)
    }

    /// Number of operating hours
    pub fn n_hour(&self) -> usize {
        self.n_hour
    }

    /// The last hour of the horizon
    pub fn last_hour(&self) -> usize {
        self.n_hour
    }

    /// All hours including the initial hour
    pub fn hours(&self) -> RangeInclusive<usize> {
        0..=self.n_hour
    }

    /// Hours which contribute to the operating margin
    pub fn operating_hours(&self) -> RangeInclusive<usize> {
        1..=self.n_hour
    }

    /// Every slice of every hour
    pub fn iter_slices(&self) -> impl Iterator<Item = HourSlice> + Clone + use<> {
        self.hours()
            .flat_map(|hour| (0..SLICES_PER_HOUR).map(move |slice| HourSlice { hour, slice }))
    }

    /// Every slice boundary of every hour, including the closing boundary of each hour
    pub fn iter_boundaries(&self) -> impl Iterator<Item = HourSlice> + Clone + use<> {
        self.hours()
            .flat_map(|hour| (0..=SLICES_PER_HOUR).map(move |slice| HourSlice { hour, slice }))
    }

    /// The first boundary of the horizon
    pub fn initial_boundary(&self) -> HourSlice {
        HourSlice::new(0, 0)
    }

    /// The final boundary of the horizon
    pub fn terminal_boundary(&self) -> HourSlice {
        HourSlice::new(self.n_hour, SLICES_PER_HOUR)
    }

    /// Factor converting a sum over operating hours into an annual amount
    pub fn annualisation_factor(&self, operating_hours_per_year: f64) -> f64 {
        operating_hours_per_year / self.n_hour as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn horizon_from_days() {
        let horizon = Horizon::from_days(2);
        assert_eq!(horizon.n_hour(), 48);
        assert_eq!(horizon.hours().count(), 49);
        assert_eq!(horizon.operating_hours().count(), 48);
        assert_eq!(horizon.terminal_boundary(), HourSlice::new(48, 4));
    }

    #[test]
    fn slice_counts() {
        let horizon = Horizon::new(3);
        assert_eq!(horizon.iter_slices().count(), 4 * SLICES_PER_HOUR);
        assert_eq!(horizon.iter_boundaries().count(), 4 * (SLICES_PER_HOUR + 1));
        assert!(horizon.iter_slices().all(|hs| hs.slice < SLICES_PER_HOUR));
    }

    #[test]
    fn hour_slice_next() {
        assert_eq!(HourSlice::new(2, 3).next(), HourSlice::new(2, 4));
        assert_eq!(HourSlice::new(2, 3).to_string(), "2.3");
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn hour_slice_out_of_range() {
        HourSlice::new(0, SLICES_PER_HOUR + 1);
    }

    #[test]
    fn annualisation() {
        assert_approx_eq!(f64, Horizon::new(48).annualisation_factor(8736.0), 182.0);
    }
}
