//! Checks a method's destination against the reference output.

use ndarray::{ArrayView3, Zip};
use serde::Serialize;

/// The first cell where a destination differs from the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Row of the cell.
    pub row: usize,
    /// Column of the cell.
    pub col: usize,
    /// Channel within the cell.
    pub channel: usize,
    /// Reference value.
    pub expected: u8,
    /// Value the method wrote.
    pub actual: u8,
}

/// Channel 0 of one configured cell, expected vs actual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeCheck {
    /// Row of the probed cell.
    pub row: usize,
    /// Column of the probed cell.
    pub col: usize,
    /// Reference value of channel 0.
    pub expected: u8,
    /// Channel 0 as the method wrote it.
    pub actual: u8,
}

impl ProbeCheck {
    /// Returns `true` if the probed cell holds the expected value.
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }
}

/// The outcome of comparing a destination with the reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verification {
    /// Number of differing values across all channels.
    pub mismatches: usize,
    /// The first differing value in row-major order.
    pub first_mismatch: Option<Mismatch>,
    /// The probe cell, when one was requested and lies inside the grid.
    pub probe: Option<ProbeCheck>,
}

impl Verification {
    /// Compares `actual` with `expected` value by value, and checks `probe` if given.
    ///
    /// Both arrays must have the same shape; the runner guarantees this.
    pub fn compare(
        expected: ArrayView3<'_, u8>,
        actual: ArrayView3<'_, u8>,
        probe: Option<[usize; 2]>,
    ) -> Self {
        let mut mismatches = 0;
        let mut first_mismatch = None;
        Zip::indexed(expected)
            .and(actual)
            .for_each(|(row, col, channel), &expected, &actual| {
                if expected != actual {
                    mismatches += 1;
                    first_mismatch.get_or_insert(Mismatch {
                        row,
                        col,
                        channel,
                        expected,
                        actual,
                    });
                }
            });

        let probe = probe.and_then(|[row, col]| {
            Some(ProbeCheck {
                row,
                col,
                expected: *expected.get([row, col, 0])?,
                actual: *actual.get([row, col, 0])?,
            })
        });

        Self {
            mismatches,
            first_mismatch,
            probe,
        }
    }

    /// Returns `true` when nothing differs and the probe, if any, matches.
    pub fn passed(&self) -> bool {
        self.mismatches == 0 && self.probe.is_none_or(|probe| probe.matches())
    }
}
