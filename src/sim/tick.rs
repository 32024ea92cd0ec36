//! Fixed timestep simulation tick
//!
//! One call = one display frame: input, shot flight, and (on contact) the
//! full attach -> match -> win/lose -> respawn pipeline.

use glam::Vec2;

use super::collision::{ShotStep, advance_shot};
use super::matching::handle_matches;
use super::snap::resolve_placement;
use super::spatial::SpatialSet;
use super::state::{Arena, BubbleId, GameEvent, GamePhase, GameState};
use crate::aim_toward;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Aim direction (need not be normalized)
    pub aim: Option<Vec2>,
    /// Aim toward a playfield point instead of a direction
    pub aim_point: Option<Vec2>,
    /// Pointer left the playfield; drop the aim
    pub cancel_aim: bool,
    /// Release: fire the loaded bubble
    pub fire: bool,
    /// Pause toggle
    pub pause: bool,
    /// Idle/demo mode - AI aims and fires
    pub idle_mode: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.pause();
                return;
            }
            GamePhase::Paused => state.resume(),
            _ => {}
        }
    }

    // Nothing simulates outside Playing
    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;

    // Board cleared: wait out the win delay, then advance
    if let Some(pending) = state.pending_advance.as_mut() {
        pending.remaining -= dt;
        if pending.remaining <= 0.0 {
            let epoch = pending.epoch;
            state.pending_advance = None;
            state.complete_level_advance(epoch);
        }
        return;
    }

    let mut input = input.clone();
    if input.idle_mode && state.shot.is_some_and(|s| !s.moving) {
        input.aim = Some(idle_aim(state));
        input.aim_point = None;
        input.fire = true;
    }

    if input.cancel_aim {
        state.cancel_aim();
    }
    if let Some(point) = input.aim_point {
        state.aim_at(point);
    }
    if let Some(dir) = input.aim {
        state.aim(dir);
    }
    if input.fire {
        state.fire();
    }

    let step = match state.shot.as_mut() {
        Some(shot) if shot.moving => advance_shot(shot, &state.board, &state.arena, dt),
        _ => return,
    };
    match step {
        ShotStep::Flying => {}
        ShotStep::HitCeiling => attach_shot(state, None),
        ShotStep::HitBubble(id) => attach_shot(state, Some(id)),
    }
}

/// Settle the shot and resolve the turn.
///
/// Placement, match removal, floater removal, then win (board empty) or
/// lose (board reached the shooter line) or load the next bubble.
pub fn attach_shot(state: &mut GameState, anchor: Option<BubbleId>) {
    let Some(mut shot) = state.shot.take() else {
        return;
    };
    shot.moving = false;

    let anchor = anchor.and_then(|id| state.board.get(id).copied());
    let pos = match anchor {
        Some(anchor) => resolve_placement(&state.board, &anchor, &shot, &state.arena),
        None => Vec2::new(shot.pos.x, shot.pos.y.max(shot.radius)),
    };
    let placed = state.board.insert(pos, shot.radius, shot.color);

    let outcome = handle_matches(&mut state.board, placed, &state.arena);
    if outcome.is_match() {
        state.progress.add_score(outcome.pop_points());
        state.push_event(GameEvent::MatchPopped {
            count: outcome.popped.len(),
        });
    }
    if !outcome.fallen.is_empty() {
        state.progress.add_score(outcome.fall_points());
        state.push_event(GameEvent::FloatersFell {
            count: outcome.fallen.len(),
        });
    }

    if state.board.is_empty() {
        let level = state.progress.level;
        state.push_event(GameEvent::LevelWon { level });
        log::info!(
            "Level {} cleared in {} shots (score {})",
            level,
            state.progress.shot_count,
            state.progress.score
        );
        state.schedule_level_advance();
        return;
    }

    if reached_shooter_line(&state.board, &state.arena) {
        state.end_game();
        return;
    }

    state.spawn_shot();
}

/// True if any settled bubble's bottom edge is at or past the lose line
pub fn reached_shooter_line(board: &SpatialSet, arena: &Arena) -> bool {
    let line = arena.lose_line();
    board.iter().any(|b| b.pos.y + b.radius >= line)
}

/// Fill the board with the opening grid for the current level.
///
/// `BASE_ROWS + level` staggered rows; odd rows shift right by a radius.
pub fn generate_level(state: &mut GameState) {
    state.board.clear();
    let rows = BASE_ROWS + state.progress.level;
    let r = state.arena.radius;
    if !(r.is_finite() && r > 0.0) {
        log::warn!("Bubble radius {r} cannot tile a level; leaving the board empty");
        return;
    }
    let right = state.arena.width - r;

    for row in 0..rows {
        let offset = if row % 2 == 1 { r } else { 0.0 };
        let y = r + row as f32 * r * ROW_PITCH_FACTOR;
        let mut x = r + offset;
        while x <= right {
            let color = state.draw_color();
            state.board.insert(Vec2::new(x, y), r, color);
            x += 2.0 * r;
        }
    }
}

/// Demo aim: the lowest bubble matching the loaded color, else a slow sweep
fn idle_aim(state: &GameState) -> Vec2 {
    let shooter = state.arena.shooter_pos();
    let target = state.shot.and_then(|shot| {
        state
            .board
            .iter()
            .filter(|b| b.color == shot.color)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))
            .map(|b| b.pos)
    });
    let point = target.unwrap_or_else(|| {
        let sweep = (state.time_ticks as f32 * 0.037).sin();
        Vec2::new(state.arena.width / 2.0 + sweep * state.arena.width * 0.4, 0.0)
    });
    aim_toward(shooter, point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{BubbleColor, ColorSource};

    /// Always hands out the same color
    struct Always(BubbleColor);

    impl ColorSource for Always {
        fn next_color(&mut self, _pool: usize) -> BubbleColor {
            self.0
        }
    }

    /// A Playing game whose board holds exactly `bubbles`, with a loaded
    /// shot of `shot_color`
    fn staged(bubbles: &[(f32, f32, BubbleColor)], shot_color: BubbleColor) -> GameState {
        let mut state = GameState::new(Arena::default(), Box::new(Always(shot_color)));
        state.start_new_game();
        state.board.clear();
        for &(x, y, color) in bubbles {
            state.board.insert(Vec2::new(x, y), 16.0, color);
        }
        state.drain_events();
        state
    }

    fn fire_up() -> TickInput {
        TickInput {
            aim: Some(Vec2::NEG_Y),
            fire: true,
            ..Default::default()
        }
    }

    /// Tick until the shot settles (or a safety cap)
    fn run_until_settled(state: &mut GameState) {
        for _ in 0..200 {
            if !state.shot_in_flight() {
                return;
            }
            tick(state, &TickInput::default(), SIM_DT);
        }
        panic!("shot never settled");
    }

    #[test]
    fn test_single_non_match_does_not_win() {
        let mut state = staged(&[(240.0, 16.0, BubbleColor::Red)], BubbleColor::Red);
        tick(&mut state, &fire_up(), SIM_DT);
        run_until_settled(&mut state);

        assert_eq!(state.board.len(), 2);
        assert_eq!(state.progress.score, 0);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.pending_advance.is_none());
        assert!(state.shot.is_some());
        assert_eq!(state.drain_events(), vec![GameEvent::ShotFired]);
    }

    #[test]
    fn test_match_clears_board_and_advances_after_delay() {
        let red = BubbleColor::Red;
        let mut state = staged(
            &[(208.0, 16.0, red), (240.0, 16.0, red), (272.0, 16.0, red)],
            red,
        );
        tick(&mut state, &fire_up(), SIM_DT);
        run_until_settled(&mut state);

        assert!(state.board.is_empty());
        assert_eq!(state.progress.score, 40);
        assert!(state.pending_advance.is_some());
        assert!(state.shot.is_none());
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::ShotFired,
                GameEvent::MatchPopped { count: 4 },
                GameEvent::LevelWon { level: 1 },
            ]
        );

        // Fire input during the delay does nothing
        tick(&mut state, &fire_up(), SIM_DT);
        assert_eq!(state.progress.level, 1);

        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.progress.level, 2);
        assert_eq!(state.progress.score, 40);
        assert_eq!(state.progress.shot_count, 0);
        assert_eq!(state.board.len(), 15 + 14 + 15 + 14 + 15 + 14);
        assert!(state.shot.is_some());
    }

    #[test]
    fn test_pause_freezes_level_advance_countdown() {
        let red = BubbleColor::Red;
        let mut state = staged(
            &[(208.0, 16.0, red), (240.0, 16.0, red), (272.0, 16.0, red)],
            red,
        );
        tick(&mut state, &fire_up(), SIM_DT);
        run_until_settled(&mut state);
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Paused);
        assert_eq!(state.progress.level, 1);
    }

    #[test]
    fn test_stale_level_advance_is_noop() {
        let red = BubbleColor::Red;
        let mut state = staged(
            &[(208.0, 16.0, red), (240.0, 16.0, red), (272.0, 16.0, red)],
            red,
        );
        tick(&mut state, &fire_up(), SIM_DT);
        run_until_settled(&mut state);
        let epoch = state.pending_advance.unwrap().epoch;

        state.go_to_menu();
        state.complete_level_advance(epoch);
        assert_eq!(state.phase, GamePhase::Menu);
        assert_eq!(state.progress.level, 1);

        // Continuing picks the cleared game back up at the next level
        state.continue_game();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progress.level, 2);
        assert!(state.pending_advance.is_none());
    }

    #[test]
    fn test_reaching_shooter_line_loses() {
        let mut state = staged(&[(240.0, 620.0, BubbleColor::Blue)], BubbleColor::Red);
        tick(&mut state, &fire_up(), SIM_DT);
        run_until_settled(&mut state);

        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.board.len(), 2);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ShotFired, GameEvent::LevelLost { score: 0 }]
        );

        // Game over swallows input
        tick(&mut state, &fire_up(), SIM_DT);
        assert_eq!(state.progress.shot_count, 1);
    }

    #[test]
    fn test_continue_after_game_over_starts_fresh() {
        let mut state = staged(&[(240.0, 620.0, BubbleColor::Blue)], BubbleColor::Red);
        tick(&mut state, &fire_up(), SIM_DT);
        run_until_settled(&mut state);
        assert_eq!(state.phase, GamePhase::GameOver);

        state.go_to_menu();
        state.continue_game();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.progress.level, 1);
        assert_eq!(state.progress.shot_count, 0);
        assert!(state.shot.is_some_and(|s| !s.moving));
        assert!(!reached_shooter_line(&state.board, &state.arena));

        // The loaded bubble can actually be fired
        tick(&mut state, &fire_up(), SIM_DT);
        assert!(state.shot_in_flight());
        assert_eq!(state.progress.shot_count, 1);
    }

    #[test]
    fn test_continue_mid_level_keeps_board() {
        let mut state = staged(&[(16.0, 16.0, BubbleColor::Blue)], BubbleColor::Red);
        state.go_to_menu();
        state.continue_game();
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.board.len(), 1);
        assert!(state.shot.is_some());
    }

    #[test]
    fn test_zero_radius_level_terminates() {
        let mut state = GameState::new(
            Arena::new(480.0, 720.0, 0.0),
            Box::new(Always(BubbleColor::Red)),
        );
        state.start_new_game();
        assert!(state.board.is_empty());
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_ceiling_attach_keeps_column() {
        let mut state = staged(&[(16.0, 16.0, BubbleColor::Blue)], BubbleColor::Red);
        tick(&mut state, &fire_up(), SIM_DT);
        run_until_settled(&mut state);
        let placed = state.board.iter().last().copied().unwrap();
        assert_eq!(placed.pos, Vec2::new(240.0, 16.0));
        assert_eq!(placed.color, BubbleColor::Red);
    }

    #[test]
    fn test_pause_stops_flight() {
        let mut state = staged(&[(16.0, 16.0, BubbleColor::Blue)], BubbleColor::Red);
        tick(&mut state, &fire_up(), SIM_DT);
        let before = state.shot.unwrap().pos;
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.shot.unwrap().pos, before);
        // Unpausing resumes in the same tick
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.shot.unwrap().pos.y < before.y);
    }

    #[test]
    fn test_floaters_score_after_pop() {
        let (red, blue) = (BubbleColor::Red, BubbleColor::Blue);
        // Red pair on the ceiling with a blue bubble hanging below them
        let mut state = staged(
            &[
                (224.0, 16.0, red),
                (256.0, 16.0, red),
                (240.0, 44.0, blue),
                (400.0, 16.0, blue),
            ],
            red,
        );
        // Ceiling shot lands next to the pair and completes the three
        tick(
            &mut state,
            &TickInput {
                aim: Some(Vec2::new(48.0, -644.0)),
                fire: true,
                ..Default::default()
            },
            SIM_DT,
        );
        run_until_settled(&mut state);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::MatchPopped { count: 3 }));
        assert!(events.contains(&GameEvent::FloatersFell { count: 1 }));
        assert_eq!(state.progress.score, 35);
        assert_eq!(state.board.len(), 1);
    }

    #[test]
    fn test_generate_level_rows() {
        let mut state = GameState::seeded(11);
        state.progress.level = 1;
        generate_level(&mut state);
        let rows: std::collections::BTreeSet<i32> =
            state.board.iter().map(|b| b.pos.y as i32).collect();
        assert_eq!(rows.len(), 5);
        assert!(state.board.iter().all(|b| b.pos.x >= 16.0 && b.pos.x <= 464.0));
        assert!(!reached_shooter_line(&state.board, &state.arena));
    }

    #[test]
    fn test_idle_mode_is_deterministic() {
        let mut a = GameState::seeded(99999);
        let mut b = GameState::seeded(99999);
        a.start_new_game();
        b.start_new_game();

        let input = TickInput {
            idle_mode: true,
            ..Default::default()
        };
        for _ in 0..600 {
            tick(&mut a, &input, SIM_DT);
            tick(&mut b, &input, SIM_DT);
        }

        assert!(a.progress.shot_count > 0);
        assert_eq!(a.progress, b.progress);
        assert_eq!(a.board.len(), b.board.len());
        assert_eq!(a.phase, b.phase);
    }
}
