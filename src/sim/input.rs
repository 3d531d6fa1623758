//! Tap resolution
//!
//! The host reports everything under the finger, front to back. The first
//! entry that means something in the current phase wins; entries behind it
//! are never looked at.

use serde::{Deserialize, Serialize};

use super::pool::EntityId;
use super::state::GamePhase;

/// Something the host found under a tap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTarget {
    Balloon(EntityId),
    RestartControl,
    /// Labels, background and anything else the core does not act on
    Other,
}

/// What a tap should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapAction {
    Pop(EntityId),
    Restart,
    None,
}

/// Scan `hits` front to back and return the action for the first match.
///
/// `is_live` reports whether a balloon id is still in the pool.
pub fn resolve_tap(
    phase: GamePhase,
    hits: &[HitTarget],
    is_live: impl Fn(EntityId) -> bool,
) -> TapAction {
    for hit in hits {
        match (phase, *hit) {
            (GamePhase::Active, HitTarget::Balloon(id)) if is_live(id) => {
                return TapAction::Pop(id);
            }
            (GamePhase::GameOver, HitTarget::RestartControl) => return TapAction::Restart,
            _ => {}
        }
    }
    TapAction::None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_live(_: EntityId) -> bool {
        true
    }

    #[test]
    fn test_first_balloon_wins() {
        let hits = [
            HitTarget::Other,
            HitTarget::Balloon(EntityId(7)),
            HitTarget::Balloon(EntityId(3)),
        ];
        assert_eq!(
            resolve_tap(GamePhase::Active, &hits, all_live),
            TapAction::Pop(EntityId(7))
        );
    }

    #[test]
    fn test_restart_shadows_balloon_underneath() {
        let hits = [HitTarget::RestartControl, HitTarget::Balloon(EntityId(1))];
        assert_eq!(
            resolve_tap(GamePhase::GameOver, &hits, all_live),
            TapAction::Restart
        );
    }

    #[test]
    fn test_restart_control_ignored_while_active() {
        let hits = [HitTarget::RestartControl, HitTarget::Balloon(EntityId(1))];
        assert_eq!(
            resolve_tap(GamePhase::Active, &hits, all_live),
            TapAction::Pop(EntityId(1))
        );
    }

    #[test]
    fn test_balloons_ignored_while_game_over() {
        let hits = [HitTarget::Balloon(EntityId(1))];
        assert_eq!(
            resolve_tap(GamePhase::GameOver, &hits, all_live),
            TapAction::None
        );
    }

    #[test]
    fn test_dead_balloon_is_skipped() {
        let hits = [HitTarget::Balloon(EntityId(1)), HitTarget::Balloon(EntityId(2))];
        let action = resolve_tap(GamePhase::Active, &hits, |id| id == EntityId(2));
        assert_eq!(action, TapAction::Pop(EntityId(2)));
    }

    #[test]
    fn test_empty_hit_list() {
        assert_eq!(resolve_tap(GamePhase::Active, &[], all_live), TapAction::None);
    }
}
