//! End-to-end tests for the plan service, driven by stub generators so the
//! deterministic pipeline is exercised with zero network dependency.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use cadence_core::calendar::WeekdayPair;
use cadence_core::generator::{GenerateError, GenerationRequest, Generator};
use cadence_core::plan::{
    replace_post, AssembleConfig, PlanError, PlanRequest, PlanService, PracticeProfile,
};
use cadence_core::research::{MemoryStore, Researcher};

// ===========================================================================
// Stub generators
// ===========================================================================

/// Parses the requested week range out of the prompt and answers with a
/// deliberately mislabeled batch (weeks all numbered 1) so renumbering is
/// exercised. Captures every request for later inspection.
struct ScriptedGenerator {
    requests: Mutex<Vec<GenerationRequest>>,
    /// Fail any batch whose range contains this week.
    fail_on_week: Option<usize>,
}

impl ScriptedGenerator {
    fn new() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on_week: None,
        }
    }

    fn failing_on(week: usize) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail_on_week: Some(week),
        }
    }

    fn captured(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Extract `(first, last)` from the "weeks A through B" task line.
fn requested_range(prompt: &str) -> (usize, usize) {
    let idx = prompt.find("weeks ").expect("prompt names a week range");
    let rest = &prompt[idx + "weeks ".len()..];
    let mut parts = rest.split_whitespace();
    let first: usize = parts.next().unwrap().parse().unwrap();
    assert_eq!(parts.next(), Some("through"));
    let last: usize = parts.next().unwrap().parse().unwrap();
    (first, last)
}

fn batch_json(first: usize, last: usize) -> String {
    let weeks: Vec<String> = (first..=last)
        .map(|week| {
            format!(
                r#"{{"week": 1, "posts": [
                    {{"title": "Topic {week}a #BrightSmiles", "caption": "Caption {week}a #SmileOn"}},
                    {{"title": "Topic {week}b", "caption": "Caption {week}b", "photoIdeas": "chair selfie"}}
                ]}}"#
            )
        })
        .collect();
    // Wrapped in a fence like real model output.
    format!("```json\n{{\"weeks\": [{}]}}\n```", weeks.join(","))
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        self.requests.lock().unwrap().push(request.clone());
        let (first, last) = requested_range(&request.user_prompt);
        if let Some(bad) = self.fail_on_week {
            if bad >= first && bad <= last {
                return Err(GenerateError::EmptyResponse);
            }
        }
        Ok(batch_json(first, last))
    }
}

/// Answers single-post requests; captures the prompt for blocklist checks.
struct SinglePostGenerator {
    requests: Mutex<Vec<GenerationRequest>>,
}

#[async_trait]
impl Generator for SinglePostGenerator {
    fn name(&self) -> &str {
        "single-post"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerateError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(r#"{"title": "Fresh Take #NewPost", "caption": "Rewritten #SmileOn"}"#.to_string())
    }
}

/// Blocks until released, so tests can observe in-flight state.
struct BlockingGenerator {
    release: tokio::sync::Notify,
}

#[async_trait]
impl Generator for BlockingGenerator {
    fn name(&self) -> &str {
        "blocking"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerateError> {
        self.release.notified().await;
        Ok(r#"{"title": "Late", "caption": "Eventually"}"#.to_string())
    }
}

/// Researcher with a fixed summary, for asserting grounding flows into
/// prompts.
struct FixedResearcher(&'static str);

#[async_trait]
impl Researcher for FixedResearcher {
    async fn research(&self, _name: &str, _website: &str) -> Result<String, String> {
        Ok(self.0.to_string())
    }
}

// ===========================================================================
// Fixtures
// ===========================================================================

fn request() -> PlanRequest {
    PlanRequest {
        profile: PracticeProfile {
            name: "Lakeside Dental".into(),
            website: "lakesidedental.example".into(),
            ..PracticeProfile::default()
        },
        // A Sunday; Tue/Thu slots start Tue 2024-09-03.
        start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
        weekday_pair: WeekdayPair::TueThu,
        num_weeks: 12,
        milestones: vec![],
    }
}

fn service_with(generator: Arc<dyn Generator>) -> PlanService {
    PlanService::new(
        generator,
        Arc::new(FixedResearcher("Community practice since 1998.")),
        Arc::new(MemoryStore::new()),
    )
}

// ===========================================================================
// Full-plan generation
// ===========================================================================

#[tokio::test]
async fn full_plan_batches_renumbers_and_normalizes() {
    let generator = Arc::new(ScriptedGenerator::new());
    let service = service_with(generator.clone())
        .with_assemble_config(AssembleConfig { batch_weeks: 4 });

    let outcome = service.generate_plan(&request()).await.unwrap();

    // 12 weeks of 2 posts, week numbers renumbered despite the stub
    // labeling every week 1.
    assert_eq!(outcome.plan.weeks.len(), 12);
    let numbers: Vec<usize> = outcome.plan.weeks.iter().map(|w| w.week).collect();
    assert_eq!(numbers, (1..=12).collect::<Vec<_>>());
    for week in &outcome.plan.weeks {
        assert_eq!(week.posts.len(), 2);
    }

    // Hashtags were lowercased on the way in.
    assert!(outcome.plan.weeks[0].posts[0].title.contains("#brightsmiles"));
    assert!(outcome.plan.weeks[0].posts[0].caption.contains("#smileon"));

    // Three concurrent batches for 12 weeks at 4 per batch.
    let captured = generator.captured();
    assert_eq!(captured.len(), 3);
}

#[tokio::test]
async fn scheduling_facts_reach_the_generator_verbatim() {
    let generator = Arc::new(ScriptedGenerator::new());
    let service = service_with(generator.clone());

    let outcome = service.generate_plan(&request()).await.unwrap();
    let captured = generator.captured();

    // Week 1's first slot (Tue 2024-09-03) appears in the first batch.
    assert!(captured[0].user_prompt.contains("2024-09-03"));
    assert!(captured[0].user_prompt.contains("not negotiable"));
    // Research context flows through.
    assert!(captured[0].user_prompt.contains("Community practice since 1998."));

    // Every alignment assignment shows up in every batch: a batch must know
    // about placements outside its own week range to stay off their themes.
    for assignment in &outcome.assignments {
        for request in &captured {
            assert!(
                request.user_prompt.contains(&assignment.anchor.name),
                "a batch prompt omitted anchor {}",
                assignment.anchor.name
            );
        }
    }
}

#[tokio::test]
async fn one_failed_batch_fails_the_whole_plan() {
    let generator = Arc::new(ScriptedGenerator::failing_on(6));
    let service = service_with(generator);

    let err = service.generate_plan(&request()).await.unwrap_err();
    assert!(matches!(
        err,
        PlanError::Generate(GenerateError::EmptyResponse)
    ));
}

#[tokio::test]
async fn repeated_generation_uses_the_research_cache() {
    struct CountingResearcher(Mutex<usize>);

    #[async_trait]
    impl Researcher for CountingResearcher {
        async fn research(&self, _name: &str, _website: &str) -> Result<String, String> {
            *self.0.lock().unwrap() += 1;
            Ok("notes".to_string())
        }
    }

    let researcher = Arc::new(CountingResearcher(Mutex::new(0)));
    let service = PlanService::new(
        Arc::new(ScriptedGenerator::new()),
        researcher.clone(),
        Arc::new(MemoryStore::new()),
    );

    service.generate_plan(&request()).await.unwrap();
    service.generate_plan(&request()).await.unwrap();
    assert_eq!(*researcher.0.lock().unwrap(), 1, "second run should hit the cache");
}

// ===========================================================================
// Single-slot regeneration
// ===========================================================================

#[tokio::test]
async fn regeneration_blocklists_every_other_post_and_replaces_one() {
    let plan_service = service_with(Arc::new(ScriptedGenerator::new()));
    let outcome = plan_service.generate_plan(&request()).await.unwrap();

    let single = Arc::new(SinglePostGenerator { requests: Mutex::new(Vec::new()) });
    let regen_service = service_with(single.clone());

    let post = regen_service
        .regenerate_post(&request(), &outcome.plan, 2, 1, Some("Make it about flossing"))
        .await
        .unwrap();
    assert_eq!(post.title, "Fresh Take #newpost");

    let captured = single.requests.lock().unwrap().clone();
    assert_eq!(captured.len(), 1);
    let prompt = &captured[0].user_prompt;
    // The targeted post is excluded from the blocklist; all 23 others are in.
    assert!(!prompt.contains("Topic 3b"));
    assert!(prompt.contains("Topic 3a"));
    assert!(prompt.contains("Topic 12b"));
    assert!(prompt.contains("Make it about flossing"));

    // Applying the replacement touches exactly one post.
    let updated = replace_post(&outcome.plan, 2, 1, post).unwrap();
    assert_eq!(updated.post(2, 1).unwrap().caption, "Rewritten #smileon");
    assert_eq!(updated.post(2, 0).unwrap(), outcome.plan.post(2, 0).unwrap());
    assert_eq!(updated.post(3, 0).unwrap(), outcome.plan.post(3, 0).unwrap());
}

#[tokio::test]
async fn same_slot_regeneration_is_refused_while_in_flight() {
    let plan_service = service_with(Arc::new(ScriptedGenerator::new()));
    let outcome = plan_service.generate_plan(&request()).await.unwrap();

    let blocking = Arc::new(BlockingGenerator { release: tokio::sync::Notify::new() });
    let service = Arc::new(service_with(blocking.clone()));

    let first = {
        let service = Arc::clone(&service);
        let plan = outcome.plan.clone();
        tokio::spawn(async move {
            service.regenerate_post(&request(), &plan, 1, 0, None).await
        })
    };

    // Wait until the first regeneration has claimed its slot.
    while !service.in_flight_slots().contains(&(1, 0)) {
        tokio::task::yield_now().await;
    }

    // Same slot: refused. Different slot: would be independent (the claim
    // set only carries (1, 0)).
    let err = service
        .regenerate_post(&request(), &outcome.plan, 1, 0, None)
        .await
        .unwrap_err();
    assert!(matches!(err, PlanError::SlotBusy { week_index: 1, post_index: 0 }));
    assert_eq!(service.in_flight_slots(), vec![(1, 0)]);

    blocking.release.notify_one();
    let post = first.await.unwrap().unwrap();
    assert_eq!(post.title, "Late");
    assert!(service.in_flight_slots().is_empty(), "claim released after completion");
}

#[tokio::test]
async fn regeneration_failure_leaves_plan_and_other_slots_untouched() {
    struct AlwaysMalformed;

    #[async_trait]
    impl Generator for AlwaysMalformed {
        fn name(&self) -> &str {
            "malformed"
        }
        async fn generate(&self, _request: &GenerationRequest) -> Result<String, GenerateError> {
            Ok("not json at all".to_string())
        }
    }

    let plan_service = service_with(Arc::new(ScriptedGenerator::new()));
    let outcome = plan_service.generate_plan(&request()).await.unwrap();

    let service = service_with(Arc::new(AlwaysMalformed));
    let err = service
        .regenerate_post(&request(), &outcome.plan, 0, 0, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlanError::Generate(GenerateError::MalformedResponse { .. })
    ));
    // The failed claim was released.
    assert!(service.in_flight_slots().is_empty());
}
