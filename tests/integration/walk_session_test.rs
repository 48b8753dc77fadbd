//! Integration tests for complete walks: plan, route, story, session.

use std::sync::Arc;
use wanderer::credentials::CredentialRotator;
use wanderer::geo::Coordinate;
use wanderer::location::{self, LocationError, ReplayPositionSource};
use wanderer::narration::{LoggingNarrator, NarrationSink};
use wanderer::routing::{ChainSettings, Route, RoutingChain};
use wanderer::session::{SessionError, SessionEvent, SessionUpdate, WalkPlan, WalkSession};
use wanderer::story::{Genre, NarrationCue, StoryGenerator, StorySettings, StoryState};

const START: Coordinate = Coordinate::new(10.7680, 106.6880);

fn three_stop_plan() -> WalkPlan {
    let mut plan = WalkPlan::new(Genre::Adventure).with_trigger_radius(50.0);
    plan.add_checkpoint(Coordinate::new(10.7700, 106.6900));
    plan.add_checkpoint(Coordinate::new(10.7750, 106.6950));
    plan.add_checkpoint(Coordinate::new(10.7800, 106.7000));
    plan
}

async fn offline_route(plan: &WalkPlan) -> Route {
    let chain = RoutingChain::new(CredentialRotator::new().into_shared(), ChainSettings::default());
    chain.route(&plan.route_request(START).unwrap()).await
}

fn offline_generator() -> StoryGenerator {
    StoryGenerator::new(CredentialRotator::new().into_shared(), StorySettings::default())
}

#[tokio::test]
async fn test_simulated_walk_completes_story() {
    let plan = three_stop_plan();
    let route = offline_route(&plan).await;
    let story = offline_generator()
        .generate(&plan.story_request(Some(&route)))
        .await;
    assert_eq!(story.len(), 3);

    let track = location::walk_along(&route, 10.0);
    let narrator = Arc::new(LoggingNarrator::new());
    let mut session = WalkSession::start(
        &plan,
        route,
        Box::new(ReplayPositionSource::new(track)),
        narrator.clone(),
    )
    .unwrap();
    assert_eq!(session.origin(), START);

    let (control, events) = crossbeam::channel::unbounded();
    control.send(SessionEvent::StoryReady(story)).unwrap();

    let mut reached = Vec::new();
    let summary = session.run(events, |update| match update {
        SessionUpdate::CheckpointReached(r) => reached.push(r.index),
        SessionUpdate::Cue(NarrationCue::Speak { .. }) => {
            control.send(SessionEvent::NarrationDone).unwrap();
        }
        SessionUpdate::Cue(NarrationCue::PresentChoices { choices, .. }) => {
            control
                .send(SessionEvent::ChoiceSelected(choices[1].id.clone()))
                .unwrap();
        }
        _ => {}
    });

    assert_eq!(reached, vec![0, 1, 2]);
    assert!(summary.completed);
    assert_eq!(summary.checkpoints_completed, 3);
    assert_eq!(summary.checkpoints_total, 3);
    assert_eq!(summary.genre, Genre::Adventure);

    // Two choice-bearing segments traversed
    assert_eq!(summary.story_choices_made.len(), 2);
    assert_eq!(summary.story_choices_made[0].choice_id, "choice_2");
    assert_eq!(summary.story_choices_made[1].choice_id, "choice_4");

    assert_eq!(narrator.transcript().len(), 3);
    assert!(!narrator.is_speaking());
    assert_eq!(session.story_state(), StoryState::Completed);
}

#[tokio::test]
async fn test_passing_near_one_checkpoint_only() {
    let plan = three_stop_plan();
    let route = offline_route(&plan).await;
    let story = offline_generator()
        .generate(&plan.story_request(Some(&route)))
        .await;

    // Walk east along a line ~9 m north of checkpoint 2 and far from the others
    let track: Vec<Coordinate> = (0..=20)
        .map(|k| Coordinate::new(10.77508, 106.6900 + k as f64 * 0.0005))
        .collect();

    let mut session = WalkSession::start(
        &plan,
        route,
        Box::new(ReplayPositionSource::new(track)),
        Arc::new(LoggingNarrator::new()),
    )
    .unwrap();

    let (control, events) = crossbeam::channel::unbounded();
    control.send(SessionEvent::StoryReady(story)).unwrap();
    let summary = session.run(events, |_| {});

    assert!(!summary.completed);
    assert_eq!(summary.checkpoints_completed, 1);
    assert!(session.monitor().is_reached(plan.checkpoints[1].id));
    assert!(!session.monitor().is_reached(plan.checkpoints[0].id));
    assert!(!session.monitor().is_reached(plan.checkpoints[2].id));
}

#[tokio::test]
async fn test_story_after_stop_is_discarded() {
    let plan = three_stop_plan();
    let route = offline_route(&plan).await;
    let narrator = Arc::new(LoggingNarrator::new());
    let mut session = WalkSession::start(
        &plan,
        route,
        Box::new(ReplayPositionSource::new(vec![START])),
        narrator.clone(),
    )
    .unwrap();

    let updates = session.handle(SessionEvent::Stop).unwrap();
    let summary = match updates.last() {
        Some(SessionUpdate::Completed(summary)) => summary.clone(),
        other => panic!("expected summary, got {:?}", other),
    };
    assert!(!summary.completed);

    // Generation finishes after the walker gave up
    let story = offline_generator()
        .generate(&plan.story_request(Some(session.route())))
        .await;
    assert!(session.handle(SessionEvent::StoryReady(story)).unwrap().is_empty());
    assert!(session
        .handle(SessionEvent::Position(plan.checkpoints[0].coordinate))
        .unwrap()
        .is_empty());

    assert!(narrator.transcript().is_empty());
    assert_eq!(session.summary(), Some(&summary));
}

#[tokio::test]
async fn test_location_denied_is_surfaced() {
    let plan = three_stop_plan();
    let route = offline_route(&plan).await;

    let result = WalkSession::start(
        &plan,
        route,
        Box::new(ReplayPositionSource::denied()),
        Arc::new(LoggingNarrator::new()),
    );
    assert!(matches!(
        result,
        Err(SessionError::Location(LocationError::PermissionDenied))
    ));
}
