//! Audio/feedback hooks
//!
//! The sim queues [`GameEvent`]s; the session hands each one to a
//! [`FeedbackSink`]. Sinks are fire-and-forget: nothing flows back.

use crate::sim::GameEvent;

/// Receiver for discrete game cues (sounds, haptics, HUD flashes)
pub trait FeedbackSink {
    fn on_shot_fired(&mut self) {}
    fn on_match_popped(&mut self, _count: usize) {}
    fn on_floaters_fell(&mut self, _count: usize) {}
    fn on_level_won(&mut self, _level: u32) {}
    fn on_level_lost(&mut self, _score: u64) {}
    fn on_level_started(&mut self, _level: u32) {}
}

/// Route one event to the matching sink method
pub fn dispatch(sink: &mut dyn FeedbackSink, event: &GameEvent) {
    match *event {
        GameEvent::ShotFired => sink.on_shot_fired(),
        GameEvent::MatchPopped { count } => sink.on_match_popped(count),
        GameEvent::FloatersFell { count } => sink.on_floaters_fell(count),
        GameEvent::LevelWon { level } => sink.on_level_won(level),
        GameEvent::LevelLost { score } => sink.on_level_lost(score),
        GameEvent::LevelStarted { level } => sink.on_level_started(level),
    }
}

/// Sink that just logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LogFeedback;

impl FeedbackSink for LogFeedback {
    fn on_shot_fired(&mut self) {
        log::trace!("shot fired");
    }

    fn on_match_popped(&mut self, count: usize) {
        log::debug!("popped {count}");
    }

    fn on_floaters_fell(&mut self, count: usize) {
        log::debug!("{count} floaters fell");
    }

    fn on_level_won(&mut self, level: u32) {
        log::info!("level {level} won");
    }

    fn on_level_lost(&mut self, score: u64) {
        log::info!("lost with {score} points");
    }

    fn on_level_started(&mut self, level: u32) {
        log::info!("level {level} started");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tally {
        popped: usize,
        fell: usize,
        shots: u32,
        started: Vec<u32>,
    }

    impl FeedbackSink for Tally {
        fn on_shot_fired(&mut self) {
            self.shots += 1;
        }
        fn on_match_popped(&mut self, count: usize) {
            self.popped += count;
        }
        fn on_floaters_fell(&mut self, count: usize) {
            self.fell += count;
        }
        fn on_level_started(&mut self, level: u32) {
            self.started.push(level);
        }
    }

    #[test]
    fn test_dispatch_routes_counts() {
        let mut tally = Tally::default();
        for event in [
            GameEvent::ShotFired,
            GameEvent::MatchPopped { count: 4 },
            GameEvent::FloatersFell { count: 2 },
            GameEvent::LevelWon { level: 1 },
        ] {
            dispatch(&mut tally, &event);
        }
        assert_eq!(tally.shots, 1);
        assert_eq!(tally.popped, 4);
        assert_eq!(tally.fell, 2);
        assert!(tally.started.is_empty());
    }

    #[test]
    fn test_dispatch_routes_level_started() {
        let mut tally = Tally::default();
        dispatch(&mut tally, &GameEvent::LevelStarted { level: 1 });
        dispatch(&mut tally, &GameEvent::LevelStarted { level: 2 });
        assert_eq!(tally.started, vec![1, 2]);

        // The logging sink takes every event without complaint
        let mut logger = LogFeedback;
        for event in [
            GameEvent::ShotFired,
            GameEvent::MatchPopped { count: 3 },
            GameEvent::FloatersFell { count: 1 },
            GameEvent::LevelWon { level: 1 },
            GameEvent::LevelLost { score: 10 },
            GameEvent::LevelStarted { level: 2 },
        ] {
            dispatch(&mut logger, &event);
        }
    }
}
