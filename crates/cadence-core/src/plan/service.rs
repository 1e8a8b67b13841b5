//! The plan service: the explicit context object tying the deterministic
//! calendar core to the injected generator, researcher, and research cache.
//!
//! Holding the collaborators in one value (instead of module-level
//! singletons) lets tests wire in stubs and lets several sessions coexist.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::calendar::{
    align, build_schedule, facts_order, holidays_in_range, AlignmentAssignment, Anchor,
    PostingSlot, ScheduleError,
};
use crate::generator::{prompt::PromptContext, GenerateError, Generator};
use crate::plan::assemble::{assemble, generate_single_post, AssembleConfig};
use crate::plan::mutate::{InFlightSlots, MutateError, SlotClaim};
use crate::plan::types::{ContentPlan, PlanRequest, Post, RequestValidationError};
use crate::research::{grounding_summary, Researcher, ResearchStore};

/// Errors surfaced by plan generation and regeneration.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] RequestValidationError),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Mutate(#[from] MutateError),

    /// The slot already has a regeneration in flight.
    #[error("a regeneration is already in flight for week {week_index}, post {post_index}")]
    SlotBusy { week_index: usize, post_index: usize },
}

/// A generated plan together with the schedule it was generated against.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub plan: ContentPlan,
    pub slots: Vec<PostingSlot>,
    pub assignments: Vec<AlignmentAssignment>,
}

/// The orchestrating context object.
pub struct PlanService {
    generator: Arc<dyn Generator>,
    researcher: Arc<dyn Researcher>,
    store: Arc<dyn ResearchStore>,
    in_flight: InFlightSlots,
    assemble_config: AssembleConfig,
}

impl PlanService {
    pub fn new(
        generator: Arc<dyn Generator>,
        researcher: Arc<dyn Researcher>,
        store: Arc<dyn ResearchStore>,
    ) -> Self {
        Self {
            generator,
            researcher,
            store,
            in_flight: InFlightSlots::new(),
            assemble_config: AssembleConfig::default(),
        }
    }

    pub fn with_assemble_config(mut self, config: AssembleConfig) -> Self {
        self.assemble_config = config;
        self
    }

    /// Slots currently regenerating, for per-slot UI annotation.
    pub fn in_flight_slots(&self) -> Vec<(usize, usize)> {
        self.in_flight.snapshot()
    }

    /// Recompute the schedule and alignment for a request.
    ///
    /// Pure with respect to the request: identical inputs always produce
    /// identical slots and assignments, which is what keeps holiday
    /// placement stable across independent generation calls.
    pub fn resolve_schedule(
        &self,
        request: &PlanRequest,
    ) -> Result<(Vec<PostingSlot>, Vec<AlignmentAssignment>), PlanError> {
        let slots = build_schedule(request.start_date, request.weekday_pair, request.num_weeks)?;
        // The anchor window runs from the requested start date through the
        // last slot: an anchor can precede the first slot (it aligns After)
        // but nothing past the final post is addressable.
        let window_start = request.start_date;
        let window_end = slots.last().map(|s| s.date).unwrap_or(request.start_date);

        let mut anchors: Vec<Anchor> = holidays_in_range(window_start, window_end)
            .iter()
            .map(Anchor::from_holiday)
            .collect();
        for milestone in &request.milestones {
            for occurrence in milestone.occurrences_in_range(window_start, window_end) {
                anchors.push(Anchor::from_milestone(milestone, occurrence));
            }
        }

        let mut assignments = align(&slots, &anchors);
        facts_order(&mut assignments);
        Ok((slots, assignments))
    }

    /// Generate a full plan.
    ///
    /// Validation happens before any external call; a failure in any batch
    /// fails the whole operation, so the caller's previous plan (if any)
    /// is never partially overwritten.
    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<PlanOutcome, PlanError> {
        request.validate()?;
        let (slots, assignments) = self.resolve_schedule(request)?;

        let research = grounding_summary(
            self.store.as_ref(),
            self.researcher.as_ref(),
            &request.profile.name,
            &request.profile.website,
        )
        .await;
        let ctx = PromptContext {
            profile: request.profile.clone(),
            research,
        };

        let plan = assemble(
            Arc::clone(&self.generator),
            &ctx,
            &slots,
            &assignments,
            request.num_weeks,
            &self.assemble_config,
        )
        .await?;

        info!(
            weeks = plan.weeks.len(),
            anchors = assignments.len(),
            "content plan assembled"
        );
        Ok(PlanOutcome { plan, slots, assignments })
    }

    /// Regenerate one post. On success the returned post replaces only the
    /// targeted slot; on failure the plan is untouched. Concurrent
    /// regenerations of distinct slots proceed independently.
    pub async fn regenerate_post(
        &self,
        request: &PlanRequest,
        plan: &ContentPlan,
        week_index: usize,
        post_index: usize,
        instructions: Option<&str>,
    ) -> Result<Post, PlanError> {
        plan.post(week_index, post_index)
            .ok_or(MutateError::OutOfRange { week_index, post_index })?;

        let _claim: SlotClaim = self
            .in_flight
            .claim((week_index, post_index))
            .ok_or(PlanError::SlotBusy { week_index, post_index })?;

        let (slots, assignments) = self.resolve_schedule(request)?;
        let sequence = week_index * 2 + post_index + 1;
        let slot = slots
            .iter()
            .find(|s| s.sequence == sequence)
            .copied()
            .ok_or(MutateError::OutOfRange { week_index, post_index })?;

        let research = grounding_summary(
            self.store.as_ref(),
            self.researcher.as_ref(),
            &request.profile.name,
            &request.profile.website,
        )
        .await;
        let ctx = PromptContext {
            profile: request.profile.clone(),
            research,
        };

        let post = generate_single_post(
            Arc::clone(&self.generator),
            &ctx,
            &slot,
            &assignments,
            plan,
            week_index,
            post_index,
            instructions,
        )
        .await?;
        Ok(post)
    }
}

// Integration-style coverage for this service lives in
// `tests/plan_service_test.rs`, driven by stub generators.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::WeekdayPair;
    use crate::plan::types::PracticeProfile;
    use chrono::NaiveDate;

    fn request() -> PlanRequest {
        PlanRequest {
            profile: PracticeProfile {
                name: "Lakeside Dental".into(),
                website: "lakesidedental.example".into(),
                ..PracticeProfile::default()
            },
            start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            weekday_pair: WeekdayPair::TueThu,
            num_weeks: 12,
            milestones: vec![],
        }
    }

    fn service() -> PlanService {
        use crate::research::{MemoryStore, NoopResearcher};

        struct FailingGenerator;

        #[async_trait::async_trait]
        impl Generator for FailingGenerator {
            fn name(&self) -> &str {
                "failing"
            }
            async fn generate(
                &self,
                _request: &crate::generator::GenerationRequest,
            ) -> Result<String, GenerateError> {
                Err(GenerateError::EmptyResponse)
            }
        }

        PlanService::new(
            Arc::new(FailingGenerator),
            Arc::new(NoopResearcher),
            Arc::new(MemoryStore::new()),
        )
    }

    #[test]
    fn resolve_schedule_is_deterministic() {
        let svc = service();
        let req = request();
        let (slots_a, assignments_a) = svc.resolve_schedule(&req).unwrap();
        let (slots_b, assignments_b) = svc.resolve_schedule(&req).unwrap();
        assert_eq!(slots_a, slots_b);
        assert_eq!(assignments_a, assignments_b);
        assert_eq!(slots_a.len(), 24);
    }

    #[test]
    fn fall_window_resolves_expected_anchors() {
        let svc = service();
        let (_, assignments) = svc.resolve_schedule(&request()).unwrap();
        let names: Vec<&str> = assignments.iter().map(|a| a.anchor.name.as_str()).collect();
        // Sep 1 start, 12 weeks of Tue/Thu: the window runs through Thu
        // Nov 21, so Thanksgiving (Nov 28) is out of reach. Labor Day
        // (Mon Sep 2) precedes the first slot and aligns After it.
        assert_eq!(names, vec!["Labor Day", "Halloween", "Veterans Day"]);
        assert_eq!(assignments[0].relation, crate::calendar::SlotRelation::After);
        assert_eq!(assignments[1].relation, crate::calendar::SlotRelation::Exact);
    }

    #[tokio::test]
    async fn invalid_request_fails_before_any_external_call() {
        let svc = service();
        let mut req = request();
        req.profile.name = String::new();
        let err = svc.generate_plan(&req).await.unwrap_err();
        assert!(matches!(
            err,
            PlanError::Validation(RequestValidationError::MissingPracticeName)
        ));
    }
}
