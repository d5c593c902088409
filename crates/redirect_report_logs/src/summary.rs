use crate::classify::Category;
use std::ops::AddAssign;

/// What happened to a single parsed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The response status was not a redirect.
    NotRedirect,
    /// The request is never counted (root path or monitoring host).
    Excluded,
    /// No redirect rule matched the request path.
    Unmatched,
    Counted(Category),
}

/// Line statistics of one or more processed log sources.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub lines: u64,
    /// Lines that could not be parsed.
    pub skipped: u64,
    pub redirects: u64,
    pub excluded: u64,
    pub unmatched: u64,
    pub counted: u64,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_skipped(&mut self) {
        self.lines += 1;
        self.skipped += 1;
    }

    pub fn record(&mut self, outcome: Outcome) {
        self.lines += 1;

        match outcome {
            Outcome::NotRedirect => return,
            Outcome::Excluded => self.excluded += 1,
            Outcome::Unmatched => self.unmatched += 1,
            Outcome::Counted(_) => self.counted += 1,
        }

        self.redirects += 1;
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.skipped += other.skipped;
        self.redirects += other.redirects;
        self.excluded += other.excluded;
        self.unmatched += other.unmatched;
        self.counted += other.counted;
    }
}
