//! Integration tests for the turn arbiter on scripted backends.
//!
//! All tests run under paused tokio time, so scripted delays and backoff
//! sleeps resolve virtually and nothing depends on wall-clock pacing.

use std::sync::Arc;
use std::time::Duration;
use voxread_voice::{
    ChannelEvent, ChannelTrace, ScriptedInput, ScriptedOutput, SpeakResult, SpeechError,
    TurnArbiter, TurnState, Utterance,
};

fn utterance(text: &str) -> Utterance {
    Utterance::new(text, "en-US")
}

fn long_text() -> String {
    std::iter::repeat("sentence")
        .take(50)
        .collect::<Vec<_>>()
        .join(" ")
}

#[tokio::test(start_paused = true)]
async fn speak_completes_when_interrupt_script_is_exhausted() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()));
    let input = Arc::new(ScriptedInput::new(trace.clone()));
    let mut arbiter = TurnArbiter::new(output, input);

    let result = arbiter
        .speak_with_barge_in(utterance("hello there reader"), "en-US")
        .await;

    assert!(matches!(result, SpeakResult::Completed));
    assert_eq!(arbiter.state(), TurnState::Idle);
    let cancelled = trace.events().iter().any(|e| {
        matches!(e, ChannelEvent::SpeakEnd { cancelled: true, .. })
    });
    assert!(!cancelled, "speech should have ended naturally");
    assert!(!trace.exclusion_violated());
}

#[tokio::test(start_paused = true)]
async fn barge_in_cancels_in_flight_speech() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()));
    let input = Arc::new(ScriptedInput::new(trace.clone()).hear(100, "pause"));
    let mut arbiter = TurnArbiter::new(output, input);

    let result = arbiter
        .speak_with_barge_in(utterance(&long_text()), "en-US")
        .await;

    match result {
        SpeakResult::Interrupted(t) => {
            assert_eq!(t.text, "pause");
            assert!(t.via_barge_in);
        }
        other => panic!("expected barge-in, got {other:?}"),
    }
    assert_eq!(arbiter.state(), TurnState::Idle);
    let cancelled = trace.events().iter().any(|e| {
        matches!(e, ChannelEvent::SpeakEnd { cancelled: true, .. })
    });
    assert!(cancelled, "speech should have been cancelled");
    assert!(!trace.exclusion_violated());
}

#[tokio::test(start_paused = true)]
async fn benign_interrupt_closure_reopens_a_single_channel() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()));
    let input = Arc::new(
        ScriptedInput::new(trace.clone())
            .miss(50, SpeechError::NoSpeech)
            .hear(50, "stop"),
    );
    let mut arbiter = TurnArbiter::new(output, input);

    let result = arbiter
        .speak_with_barge_in(utterance(&long_text()), "en-US")
        .await;

    assert!(matches!(result, SpeakResult::Interrupted(t) if t.text == "stop"));
    assert!(!trace.exclusion_violated(), "two interrupt channels were open at once");
    // Both the failed and the successful interrupt attempt show in the trace.
    let listens = trace
        .events()
        .iter()
        .filter(|e| matches!(e, ChannelEvent::ListenStart))
        .count();
    assert_eq!(listens, 2);
}

#[tokio::test(start_paused = true)]
async fn listen_retries_unbounded_until_heard() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()));
    let input = Arc::new(
        ScriptedInput::new(trace.clone())
            .miss(0, SpeechError::NoSpeech)
            .miss(0, SpeechError::Recognition("engine offline".into()))
            .hear(0, "hello"),
    );
    let mut arbiter = TurnArbiter::new(output, input);

    let transcript = arbiter.listen("en-US").await.expect("transcript");

    assert_eq!(transcript.text, "hello");
    assert!(!transcript.via_barge_in);
    assert_eq!(arbiter.listen_attempts(), 3);
    assert_eq!(arbiter.state(), TurnState::Idle);
}

#[tokio::test(start_paused = true)]
async fn empty_transcripts_are_retried() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()));
    let input = Arc::new(
        ScriptedInput::new(trace.clone())
            .hear(0, "   ")
            .hear(0, "resume"),
    );
    let mut arbiter = TurnArbiter::new(output, input);

    let transcript = arbiter.listen("en-US").await.expect("transcript");
    assert_eq!(transcript.text, "resume");
    assert_eq!(arbiter.listen_attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn exhausted_input_capability_ends_listening() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()));
    let input = Arc::new(ScriptedInput::new(trace.clone()));
    let mut arbiter = TurnArbiter::new(output, input);

    let err = arbiter.listen("en-US").await.unwrap_err();
    assert_eq!(err, SpeechError::ChannelClosed);
}

#[tokio::test(start_paused = true)]
async fn synthesis_failure_resolves_as_completed() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()).failing_on("broken"));
    let input = Arc::new(ScriptedInput::new(trace.clone()));
    let mut arbiter = TurnArbiter::new(output, input);

    arbiter.speak(utterance("this one is broken")).await;

    assert_eq!(arbiter.state(), TurnState::Idle);
    // Exactly one attempt: synthesis failures are abandoned, not retried.
    let speaks = trace
        .events()
        .iter()
        .filter(|e| matches!(e, ChannelEvent::SpeakStart(_)))
        .count();
    assert_eq!(speaks, 1);
}

#[tokio::test(start_paused = true)]
async fn speaking_and_primary_listening_never_overlap() {
    let trace = ChannelTrace::new();
    let output = Arc::new(ScriptedOutput::new(trace.clone()));
    let input = Arc::new(
        ScriptedInput::new(trace.clone())
            .hear(0, "first")
            .hear(30, "interrupting")
            .hear(0, "second"),
    );
    let mut arbiter = TurnArbiter::new(output, input);

    arbiter.speak(utterance("a short prompt")).await;
    let first = arbiter.listen("en-US").await.expect("first transcript");
    assert_eq!(first.text, "first");
    let raced = arbiter
        .speak_with_barge_in(utterance(&long_text()), "en-US")
        .await;
    assert!(matches!(raced, SpeakResult::Interrupted(_)));
    let second = arbiter.listen("en-US").await.expect("second transcript");
    assert_eq!(second.text, "second");

    assert!(!trace.exclusion_violated());
}

#[tokio::test(start_paused = true)]
async fn rate_shortens_playback() {
    let trace = ChannelTrace::new();
    let output = Arc::new(
        ScriptedOutput::new(trace.clone()).with_per_word(Duration::from_millis(100)),
    );
    let input = Arc::new(ScriptedInput::new(trace.clone()).hear(450, "too late"));
    let mut arbiter = TurnArbiter::new(output, input);

    // Five words at double rate: 250ms of playback, so the 450ms hearing
    // never lands and the utterance completes.
    let result = arbiter
        .speak_with_barge_in(
            Utterance::new("one two three four five", "en-US").with_delivery(2.0, 1.0),
            "en-US",
        )
        .await;
    assert!(matches!(result, SpeakResult::Completed));
}
