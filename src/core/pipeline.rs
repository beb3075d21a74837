//! Recommendation and watering-event ingestion.
//!
//! [`WateringService`] is the engine's public face. It answers "how much
//! should I water this plant now" and records waterings, storing with each
//! event how far the applied volume was from the recommendation in effect
//! just before it.
//!
//! Ingestion steps:
//! 1. Validate required fields and the freshness window
//! 2. The plant must exist (not-found surfaces as-is)
//! 3. Reject a second event for the same plant and date
//! 4. Recompute the recommendation from the previous event's error
//! 5. Store `recommended - applied` as the new event's error

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::core::calculator::VolumeBreakdown;
use crate::core::correction::ErrorCorrection;
use crate::core::model::{
    EventFilter, EventId, PlantId, Recommendation, WateringEvent, WateringEventDraft,
    WateringPatch, WateringRequest,
};
use crate::core::resolver::{ParameterResolver, ResolvedContext};
use crate::error::{Resource, Result, WaterlogError};
use crate::storage::DiaryStore;

/// Default freshness window in days.
pub const DEFAULT_FRESHNESS_DAYS: u32 = 7;

/// A recommendation with the inputs that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Explanation {
    pub recommendation: Recommendation,
    pub context: ResolvedContext,
    pub breakdown: VolumeBreakdown,
    /// The event whose error fed the correction, if any.
    pub last_event: Option<WateringEvent>,
}

/// Stateless engine over a diary store.
#[derive(Debug)]
pub struct WateringService<S: DiaryStore> {
    store: S,
    correction: ErrorCorrection,
    freshness_days: u32,
}

impl<S: DiaryStore> WateringService<S> {
    /// Create a service with default engine settings.
    pub fn new(store: S) -> Self {
        Self {
            store,
            correction: ErrorCorrection::default(),
            freshness_days: DEFAULT_FRESHNESS_DAYS,
        }
    }

    /// Create a service with engine settings from configuration.
    pub fn with_config(store: S, config: &EngineConfig) -> Self {
        Self {
            store,
            correction: ErrorCorrection::with_cap_ratio(config.feedback_cap_ratio),
            freshness_days: config.freshness_days,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn resolver(&self) -> ParameterResolver<'_, S> {
        ParameterResolver::new(&self.store)
    }

    // =========================================================================
    // Recommendation
    // =========================================================================

    /// Recommended volume for a plant right now.
    ///
    /// The feedback term comes from the plant's last recorded event; a plant
    /// with no history gets no correction.
    pub fn calculate_recommendation(&self, plant_id: PlantId) -> Result<Recommendation> {
        self.calculate_recommendation_at(plant_id, today())
    }

    /// [`calculate_recommendation`](Self::calculate_recommendation) with an
    /// explicit processing date.
    pub fn calculate_recommendation_at(
        &self,
        plant_id: PlantId,
        today: NaiveDate,
    ) -> Result<Recommendation> {
        Ok(self.explain_at(plant_id, today)?.recommendation)
    }

    /// Recommendation plus every factor that went into it.
    pub fn explain_at(&self, plant_id: PlantId, today: NaiveDate) -> Result<Explanation> {
        let context = self.resolver().resolve_at(plant_id, today)?;
        let last_event = self.store.get_last_watering_event(plant_id)?;

        let feedback = self.correction.feedback(
            last_event.as_ref().map(|e| e.error_ml),
            context.plant_type.coefficient,
            context.base_volume(),
        );
        let breakdown = context.breakdown(feedback);

        debug!(
            plant = %plant_id,
            base = breakdown.base_volume_ml,
            feedback,
            volume = breakdown.volume_ml,
            "calculated recommendation"
        );

        Ok(Explanation {
            recommendation: Recommendation::new(plant_id, breakdown.volume_ml),
            context,
            breakdown,
            last_event,
        })
    }

    // =========================================================================
    // Ingestion
    // =========================================================================

    /// Record a watering processed today.
    pub fn ingest_watering_event(&self, request: &WateringRequest) -> Result<WateringEvent> {
        self.ingest_at(request, today())
    }

    /// Record a watering with an explicit processing date.
    pub fn ingest_at(&self, request: &WateringRequest, today: NaiveDate) -> Result<WateringEvent> {
        let plant_id = request
            .plant_id
            .ok_or_else(|| WaterlogError::validation("plant id is required"))?;
        let date = request
            .date
            .ok_or_else(|| WaterlogError::validation("date is required"))?;
        let time = request
            .time
            .ok_or_else(|| WaterlogError::validation("time is required"))?;
        let applied = request
            .applied_volume_ml
            .ok_or_else(|| WaterlogError::validation("applied volume is required"))?;
        let applied = validate_volume(applied)?;
        self.check_fresh(date, today)?;

        self.resolver().profile(plant_id)?;

        if self.store.event_exists(plant_id, date)? {
            warn!(plant = %plant_id, %date, "duplicate watering event rejected");
            return Err(duplicate(plant_id, date));
        }

        let error_ml = self.compute_error(plant_id, date, applied, None, today)?;

        let event = self.store.insert_watering_event(WateringEventDraft {
            plant_id,
            date,
            time,
            applied_volume_ml: applied,
            error_ml,
        })?;

        info!(
            event = %event.id,
            plant = %plant_id,
            %date,
            applied,
            error_ml,
            "watering event recorded"
        );
        Ok(event)
    }

    /// Apply a partial update to an event processed today.
    pub fn amend_watering_event(&self, id: EventId, patch: &WateringPatch) -> Result<WateringEvent> {
        self.amend_at(id, patch, today())
    }

    /// Apply a partial update with an explicit processing date.
    ///
    /// The date is re-checked for freshness and uniqueness only when it
    /// actually changes. The error term is recomputed as a whole whenever
    /// the date or the applied volume changes.
    pub fn amend_at(
        &self,
        id: EventId,
        patch: &WateringPatch,
        today: NaiveDate,
    ) -> Result<WateringEvent> {
        let mut event = self
            .store
            .get_watering_event(id)?
            .ok_or_else(|| WaterlogError::not_found(Resource::WateringEvent, id))?;

        if patch.is_empty() {
            return Ok(event);
        }

        let new_date = patch.date.filter(|d| *d != event.date);
        if let Some(date) = new_date {
            self.check_fresh(date, today)?;
            if self.store.event_exists(event.plant_id, date)? {
                return Err(duplicate(event.plant_id, date));
            }
            event.date = date;
        }

        if let Some(time) = patch.time {
            event.time = time;
        }

        let mut volume_changed = false;
        if let Some(volume) = patch.applied_volume_ml {
            let volume = validate_volume(volume)?;
            volume_changed = volume != event.applied_volume_ml;
            event.applied_volume_ml = volume;
        }

        if new_date.is_some() || volume_changed {
            event.error_ml = self.compute_error(
                event.plant_id,
                event.date,
                event.applied_volume_ml,
                Some(event.id),
                today,
            )?;
        }

        self.store.update_watering_event(&event)?;
        info!(event = %event.id, error_ml = event.error_ml, "watering event amended");
        Ok(event)
    }

    /// Delete an event and return it.
    pub fn remove_watering_event(&self, id: EventId) -> Result<WateringEvent> {
        let removed = self
            .store
            .delete_watering_event(id)?
            .ok_or_else(|| WaterlogError::not_found(Resource::WateringEvent, id))?;
        info!(event = %id, "watering event removed");
        Ok(removed)
    }

    /// Watering history, oldest first.
    pub fn history(&self, filter: &EventFilter) -> Result<Vec<WateringEvent>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                return Err(WaterlogError::validation(format!(
                    "date range is empty: {} is after {}",
                    from, to
                )));
            }
        }
        if let Some(plant_id) = filter.plant_id {
            self.resolver().profile(plant_id)?;
        }
        self.store.list_watering_events(filter)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn check_fresh(&self, date: NaiveDate, today: NaiveDate) -> Result<()> {
        let age_days = (today - date).num_days();
        if age_days > i64::from(self.freshness_days) {
            warn!(%date, %today, age_days, "stale watering date rejected");
            return Err(WaterlogError::validation(format!(
                "stale data: {} is more than {} days before {}",
                date, self.freshness_days, today
            )));
        }
        Ok(())
    }

    /// The plant's event immediately before `date`, skipping `exclude`.
    fn previous_event(
        &self,
        plant_id: PlantId,
        date: NaiveDate,
        exclude: Option<EventId>,
    ) -> Result<Option<WateringEvent>> {
        let previous = self.store.get_previous_watering_event(plant_id, date)?;
        match (previous, exclude) {
            (Some(prev), Some(skip)) if prev.id == skip => {
                self.store.get_previous_watering_event(plant_id, prev.date)
            }
            (previous, _) => Ok(previous),
        }
    }

    /// Recommended minus applied volume for a watering on `date`.
    ///
    /// The recommendation is the one in effect before the watering: fed by
    /// the previous event's error, or uncorrected for a plant's first event.
    /// Missing reference data here is a data-integrity conflict.
    fn compute_error(
        &self,
        plant_id: PlantId,
        date: NaiveDate,
        applied_ml: u32,
        exclude: Option<EventId>,
        today: NaiveDate,
    ) -> Result<i32> {
        let previous = self.previous_event(plant_id, date, exclude)?;
        let context = self
            .resolver()
            .resolve_at(plant_id, today)
            .map_err(WaterlogError::into_incomplete_data)?;

        let feedback = self.correction.feedback(
            previous.as_ref().map(|e| e.error_ml),
            context.plant_type.coefficient,
            context.base_volume(),
        );
        let expected = context.breakdown(feedback).volume_ml;

        debug!(
            plant = %plant_id,
            previous = ?previous.as_ref().map(|e| e.id),
            feedback,
            expected,
            applied_ml,
            "computed watering error"
        );

        let error = i64::from(expected) - i64::from(applied_ml);
        Ok(error.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn duplicate(plant_id: PlantId, date: NaiveDate) -> WaterlogError {
    WaterlogError::duplicate(format!(
        "plant {} already has a watering event on {}",
        plant_id, date
    ))
}

/// Applied volumes must be non-negative and fit the signed error range.
fn validate_volume(volume_ml: i64) -> Result<u32> {
    if volume_ml < 0 {
        return Err(WaterlogError::validation(format!(
            "applied volume cannot be negative: {} mL",
            volume_ml
        )));
    }
    if volume_ml > i64::from(i32::MAX) {
        return Err(WaterlogError::validation(format!(
            "applied volume too large: {} mL",
            volume_ml
        )));
    }
    Ok(volume_ml as u32)
}
