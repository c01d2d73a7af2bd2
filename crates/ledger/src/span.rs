use serde::{Deserialize, Serialize};

use flowledger_core::Period;

/// Inclusive range of periods touched by a run (empty until first use).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodSpan {
    bounds: Option<(Period, Period)>,
}

impl PeriodSpan {
    pub fn new(first: Period, last: Period) -> Self {
        if first <= last {
            Self {
                bounds: Some((first, last)),
            }
        } else {
            Self {
                bounds: Some((last, first)),
            }
        }
    }

    pub fn include(&mut self, period: Period) {
        self.bounds = Some(match self.bounds {
            None => (period, period),
            Some((first, last)) => (first.min(period), last.max(period)),
        });
    }

    pub fn union(self, other: PeriodSpan) -> PeriodSpan {
        let mut out = self;
        if let Some((first, last)) = other.bounds {
            out.include(first);
            out.include(last);
        }
        out
    }

    pub fn first(&self) -> Option<Period> {
        self.bounds.map(|(first, _)| first)
    }

    pub fn last(&self) -> Option<Period> {
        self.bounds.map(|(_, last)| last)
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_none()
    }

    pub fn periods(&self) -> impl Iterator<Item = Period> + use<> {
        let bounds = self.bounds;
        bounds
            .into_iter()
            .flat_map(|(first, last)| Period::range(first, last))
    }
}
