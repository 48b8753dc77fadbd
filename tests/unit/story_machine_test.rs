//! Unit tests for story progression driven by fallback stories.

use wanderer::geo::Coordinate;
use wanderer::story::fallback::{fallback_story, FallbackStyle};
use wanderer::story::{Genre, NarrationCue, StoryRequest, StoryState, StoryStateMachine};
use wanderer::tracking::Checkpoint;

fn request(n: usize) -> StoryRequest {
    let checkpoints = (0..n)
        .map(|i| {
            Checkpoint::new(
                Coordinate::new(10.77 + i as f64 * 0.002, 106.69),
                format!("Điểm {}", i + 1),
            )
        })
        .collect();
    StoryRequest::new(Genre::Historical, checkpoints, 30)
}

#[test]
fn test_awaiting_choice_blocks_until_choice() {
    let req = request(3);
    let story = fallback_story(FallbackStyle::RouteAware, &req);
    let mut machine = StoryStateMachine::new();
    machine.begin_generation().unwrap();
    machine.story_ready(story).unwrap();

    machine.checkpoint_reached(req.checkpoints[0].id);
    assert_eq!(machine.state(), StoryState::AwaitingChoice(0));

    // Neither narration ending nor later checkpoints move it on
    assert!(machine.narration_finished().is_empty());
    assert!(machine.checkpoint_reached(req.checkpoints[1].id).is_empty());
    assert_eq!(machine.state(), StoryState::AwaitingChoice(0));

    let cues = machine.select_choice("choice_2").unwrap();
    assert!(matches!(cues[0], NarrationCue::Speak { segment_index: 1, .. }));

    // Checkpoint 2 was already reached, so finishing narration arrives there
    let cues = machine.narration_finished();
    assert!(matches!(cues[0], NarrationCue::PresentChoices { segment_index: 1, .. }));
}

#[test]
fn test_choice_count_matches_traversed_choice_segments() {
    for n in 1..=5 {
        let req = request(n);
        let story = fallback_story(FallbackStyle::RouteAware, &req);
        let choice_segments = story.segments.iter().filter(|s| s.has_choices()).count();
        assert_eq!(choice_segments, n - 1);

        let mut machine = StoryStateMachine::new();
        machine.story_ready(story).unwrap();

        for checkpoint in &req.checkpoints {
            let cues = machine.checkpoint_reached(checkpoint.id);
            if let Some(NarrationCue::PresentChoices { choices, .. }) = cues.last() {
                machine.select_choice(&choices[0].id).unwrap();
            }
        }

        assert_eq!(machine.state(), StoryState::Completed);
        assert_eq!(machine.choices_made().len(), choice_segments);
    }
}

#[test]
fn test_simplified_story_plays_through_unbound_segments() {
    let req = request(1);
    let story = fallback_story(FallbackStyle::Simplified, &req);
    assert_eq!(story.len(), 3);

    let mut machine = StoryStateMachine::new();
    machine.story_ready(story).unwrap();
    machine.checkpoint_reached(req.checkpoints[0].id);
    machine.select_choice("choice_1").unwrap();
    assert_eq!(machine.state(), StoryState::Narrating(1));

    let cues = machine.narration_finished();
    assert!(matches!(cues[0], NarrationCue::PresentChoices { segment_index: 1, .. }));
    machine.select_choice("choice_4").unwrap();

    assert_eq!(machine.narration_finished(), vec![NarrationCue::Finished]);
    assert_eq!(machine.choices_made().len(), 2);
}
