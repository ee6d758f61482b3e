//! Severity bucket aggregation.
//!
//! Vulnerability buckets: 0=info, 1=low, 2=medium, 3=high, 4=critical.
//! Compliance buckets: 1=pass, 2=warning, 3=fail (0 unused).

use serde::Serialize;
use std::ops::AddAssign;

/// An entry carrying a severity index and a weight.
pub trait Weighted {
    fn severity(&self) -> Option<i64>;
    fn count(&self) -> i64;
}

/// Sum entry counts into `N` buckets by severity index.
///
/// Entries with no severity, or a severity outside `0..N`, contribute to no bucket.
pub fn tally<const N: usize, W: Weighted>(entries: &[W]) -> [i64; N] {
    let mut buckets = [0i64; N];
    for e in entries {
        let Some(sev) = e.severity() else { continue };
        if let Some(slot) = usize::try_from(sev).ok().and_then(|i| buckets.get_mut(i)) {
            *slot += e.count();
        }
    }
    buckets
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityBuckets(pub [i64; 5]);

impl SeverityBuckets {
    pub fn from_entries<W: Weighted>(entries: &[W]) -> Self {
        SeverityBuckets(tally(entries))
    }
    pub fn info(&self) -> i64 { self.0[0] }
    pub fn low(&self) -> i64 { self.0[1] }
    pub fn medium(&self) -> i64 { self.0[2] }
    pub fn high(&self) -> i64 { self.0[3] }
    pub fn critical(&self) -> i64 { self.0[4] }
    pub fn total(&self) -> i64 { self.0.iter().sum() }
}

impl AddAssign for SeverityBuckets {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceBuckets(pub [i64; 4]);

impl ComplianceBuckets {
    pub fn from_entries<W: Weighted>(entries: &[W]) -> Self {
        ComplianceBuckets(tally(entries))
    }
    pub fn pass(&self) -> i64 { self.0[1] }
    pub fn warning(&self) -> i64 { self.0[2] }
    pub fn fail(&self) -> i64 { self.0[3] }
}

impl AddAssign for ComplianceBuckets {
    fn add_assign(&mut self, rhs: Self) {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
    }
}
