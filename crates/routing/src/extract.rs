//! Event extraction: flat location→date mapping to an ordered event list.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use flowledger_core::{CaseId, DataQualityIssue, Period, ValueObject, Warning};

use crate::config::{LocationKind, ValidatedConfig};
use crate::record::CaseRecord;

/// A single arrival of a case at a location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationEvent {
    pub case_id: CaseId,
    pub location_name: String,
    pub location_kind: LocationKind,
    pub timestamp: NaiveDate,
}

impl ValueObject for LocationEvent {}

impl LocationEvent {
    pub fn period(&self) -> Period {
        Period::of(self.timestamp)
    }
}

/// Ordered events for one case plus the data-quality findings met on the way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Extraction {
    pub events: Vec<LocationEvent>,
    pub warnings: Vec<Warning>,
}

impl Extraction {
    /// No recorded arrival at all.
    pub fn is_pre_arrival(&self) -> bool {
        self.events.is_empty()
    }
}

/// Turns [`CaseRecord`]s into chronologically ordered [`LocationEvent`]s.
///
/// Ordering is by day, then by the configured tie-break rank, so the result
/// never depends on the order of the source mapping.
#[derive(Debug, Clone)]
pub struct EventExtractor {
    config: Arc<ValidatedConfig>,
}

impl EventExtractor {
    pub fn new(config: Arc<ValidatedConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Extract the ordered event list of one case. Never fails.
    pub fn extract(&self, record: &CaseRecord) -> Extraction {
        let mut out = Extraction::default();
        let case_id = &record.case_id;

        for (location, cell) in &record.locations {
            let Some(raw) = cell else { continue };

            let Some(kind) = self.config.kind_of(location) else {
                out.warnings.push(data_quality(
                    case_id,
                    location,
                    DataQualityIssue::UnknownLocation,
                    format!("date recorded for unconfigured location {location}"),
                ));
                continue;
            };

            let date = match raw.to_date() {
                Ok(Some(date)) => date,
                Ok(None) => continue,
                Err(text) => {
                    out.warnings.push(data_quality(
                        case_id,
                        location,
                        DataQualityIssue::UnparsableDate,
                        format!("unparsable date {text:?}"),
                    ));
                    continue;
                }
            };

            if !self.config.is_plausible(date) {
                out.warnings.push(
                    data_quality(
                        case_id,
                        location,
                        DataQualityIssue::ImplausibleDate,
                        format!("date {date} outside plausible window"),
                    )
                    .with_period(Period::of(date)),
                );
                continue;
            }

            out.events.push(LocationEvent {
                case_id: case_id.clone(),
                location_name: location.clone(),
                location_kind: kind,
                timestamp: date,
            });
        }

        // Every extracted location is configured, so the rank always exists.
        out.events.sort_by_key(|e| {
            (
                e.timestamp,
                self.config.priority_of(&e.location_name).unwrap_or(usize::MAX),
            )
        });

        if let Some(first_site) = out
            .events
            .iter()
            .find(|e| e.location_kind == LocationKind::Site)
            .map(|e| e.timestamp)
        {
            for e in out
                .events
                .iter()
                .filter(|e| e.location_kind != LocationKind::Site && e.timestamp > first_site)
            {
                out.warnings.push(
                    data_quality(
                        case_id,
                        &e.location_name,
                        DataQualityIssue::PostSiteMovement,
                        format!("movement on {} after first site arrival on {first_site}", e.timestamp),
                    )
                    .with_period(e.period()),
                );
            }
        }

        debug!(
            case_id = %case_id,
            events = out.events.len(),
            warnings = out.warnings.len(),
            "extracted case events"
        );
        out
    }
}

fn data_quality(
    case_id: &CaseId,
    location: &str,
    issue: DataQualityIssue,
    detail: String,
) -> Warning {
    warn!(case_id = %case_id, location, ?issue, "{detail}");
    Warning::data_quality(case_id.clone(), location, issue, detail)
}
