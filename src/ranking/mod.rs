//! Win/draw/loss records and the fixture ranking order

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::StandingRow;

/// Win/draw/loss record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wdl {
    pub wins: u32,
    pub draws: u32,
    pub losses: u32,
}

impl Wdl {
    pub const ZERO: Wdl = Wdl::new(0, 0, 0);

    pub const fn new(wins: u32, draws: u32, losses: u32) -> Self {
        Self {
            wins,
            draws,
            losses,
        }
    }
}

/// Renders the counts back to back, e.g. `3-1-2` as `"312"`.
impl fmt::Display for Wdl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.wins, self.draws, self.losses)
    }
}

/// A count field: a non-negative whole number, whether encoded as an integer
/// or a float like `3.0`.
fn count(record: &Value, field: &str) -> Option<u32> {
    let value = record.get(field)?;
    let n = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })?;
    u32::try_from(n).ok()
}

/// Read `win`/`draw`/`lose` from a raw standings record.
///
/// All or nothing: if any of the three is missing or not a count, the whole
/// record reads as zero.
pub fn extract_wdl(record: &Value) -> Wdl {
    match (
        count(record, "win"),
        count(record, "draw"),
        count(record, "lose"),
    ) {
        (Some(wins), Some(draws), Some(losses)) => Wdl::new(wins, draws, losses),
        _ => Wdl::ZERO,
    }
}

/// Ranking order: more wins first, then more draws, then fewer losses.
///
/// `Ordering::Less` means `a` ranks ahead of `b`.
pub fn compare_wdl(a: &Wdl, b: &Wdl) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.draws.cmp(&a.draws))
        .then_with(|| a.losses.cmp(&b.losses))
}

/// The record a fixture is ranked by: whichever side does not rank first.
/// On a tie the away record is returned.
pub fn representative_wdl(home: Wdl, away: Wdl) -> Wdl {
    if compare_wdl(&home, &away) == Ordering::Greater {
        home
    } else {
        away
    }
}

/// A team's records in one league season
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStanding {
    pub overall: Wdl,
    pub home: Wdl,
    pub away: Wdl,
}

impl TeamStanding {
    pub fn from_row(row: &StandingRow) -> Self {
        Self {
            overall: extract_wdl(&row.all),
            home: extract_wdl(&row.home),
            away: extract_wdl(&row.away),
        }
    }
}
