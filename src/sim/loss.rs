//! Loss detection
//!
//! A session ends when any token is simultaneously above the line, settled,
//! and older than the maturity window. The age gate keeps fresh drops and
//! merge pops from ending the game while they pass through the top.

use super::state::Token;
use crate::tuning::Tuning;

/// Top of the token is above the game-over line
#[inline]
pub fn is_over_line(token: &Token, radius: f32, tuning: &Tuning) -> bool {
    token.pos.y - radius < tuning.game_over_line
}

/// Both velocity components are below the settle threshold
#[inline]
pub fn is_settled(token: &Token, tuning: &Tuning) -> bool {
    token.vel.x.abs() < tuning.settle_speed && token.vel.y.abs() < tuning.settle_speed
}

#[inline]
pub fn is_mature(token: &Token, now_ms: f64, tuning: &Tuning) -> bool {
    now_ms - token.created_at_ms > tuning.loss_maturity_ms
}

/// First token (in store order) that ends the session, if any
pub fn find_losing_token<'a>(tokens: &'a [Token], tuning: &Tuning, now_ms: f64) -> Option<&'a Token> {
    tokens.iter().find(|token| {
        let radius = tuning.stages.radius(token.stage);
        is_over_line(token, radius, tuning)
            && is_settled(token, tuning)
            && is_mature(token, now_ms, tuning)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn token(y: f32, vel: Vec2, created_at_ms: f64) -> Token {
        Token {
            id: 1,
            pos: Vec2::new(175.0, y),
            vel,
            stage: 0,
            rotation: 0.0,
            rotation_speed: 0.0,
            created_at_ms,
        }
    }

    #[test]
    fn test_requires_all_three_conditions() {
        let tuning = Tuning::default();
        let over = token(80.0, Vec2::ZERO, 0.0);
        assert!(find_losing_token(std::slice::from_ref(&over), &tuning, 2001.0).is_some());

        // Too young
        assert!(find_losing_token(std::slice::from_ref(&over), &tuning, 2000.0).is_none());

        // Still moving
        let moving = token(80.0, Vec2::new(0.0, 1.5), 0.0);
        assert!(find_losing_token(&[moving], &tuning, 5000.0).is_none());

        // Below the line: top at 120 - 13.5
        let below = token(120.0, Vec2::ZERO, 0.0);
        assert!(find_losing_token(&[below], &tuning, 5000.0).is_none());
    }

    #[test]
    fn test_line_uses_token_top() {
        let tuning = Tuning::default();
        let r = tuning.stages.radius(0);
        assert!(is_over_line(&token(100.0 + r - 0.1, Vec2::ZERO, 0.0), r, &tuning));
        assert!(!is_over_line(&token(100.0 + r, Vec2::ZERO, 0.0), r, &tuning));
    }

    #[test]
    fn test_settle_threshold_is_per_axis() {
        let tuning = Tuning::default();
        assert!(is_settled(&token(0.0, Vec2::new(0.9, -0.9), 0.0), &tuning));
        assert!(!is_settled(&token(0.0, Vec2::new(-1.0, 0.0), 0.0), &tuning));
    }
}
