use std::fmt::Display;

/// Points in time are totally ordered integers.
pub type Time = i64;

/// A closed validity interval `[start, end]` with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Interval {
    start: Time,
    end: Time,
}

impl Interval {
    /// An interval that holds at all times.
    pub const ALWAYS: Interval = Interval {
        start: Time::MIN,
        end: Time::MAX,
    };

    /// Creates `[start, end]`, or `None` if `start > end`.
    pub fn new(start: Time, end: Time) -> Option<Self> {
        if start <= end {
            Some(Interval { start, end })
        } else {
            None
        }
    }

    /// Creates `[start, start + length]`; negative lengths are treated as zero.
    pub fn spanning(start: Time, length: Time) -> Self {
        Interval {
            start,
            end: start.saturating_add(length.max(0)),
        }
    }

    pub fn start(&self) -> Time {
        self.start
    }

    pub fn end(&self) -> Time {
        self.end
    }

    pub fn is_bounded(&self) -> bool {
        *self != Self::ALWAYS
    }

    pub fn contains(&self, time: Time) -> bool {
        self.start <= time && time <= self.end
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn intersect(&self, other: &Interval) -> Option<Interval> {
        Interval::new(self.start.max(other.start), self.end.min(other.end))
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// The relation under which a sequence of intervals is collapsed
/// into a single validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composition {
    /// All intervals hold simultaneously.
    Concur,
    /// All intervals hold simultaneously and their start times
    /// are non-decreasing in sequence order.
    Ordered,
}

impl Composition {
    /// Composes the given intervals into one window.
    ///
    /// Returns `None` if the composition is empty, including the
    /// case of no intervals at all.
    pub fn simplify<I>(self, intervals: I) -> Option<Interval>
    where
        I: IntoIterator<Item = Interval>,
    {
        let mut intervals = intervals.into_iter();
        let mut window = intervals.next()?;
        let mut last_start = window.start;

        for interval in intervals {
            if self == Composition::Ordered && interval.start < last_start {
                return None;
            }
            last_start = interval.start;
            window = window.intersect(&interval)?;
        }

        Some(window)
    }
}
