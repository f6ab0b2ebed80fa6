//! Integrator
//!
//! Gravity, speed clamping, position/rotation integration and container
//! boundaries. `d` is the normalized delta factor (1.0 = one 60 Hz frame).

use super::state::Token;
use crate::tuning::Tuning;

/// Advance every token by one step
pub fn integrate(tokens: &mut [Token], tuning: &Tuning, d: f32) {
    for token in tokens.iter_mut() {
        let radius = tuning.stages.radius(token.stage);
        integrate_token(token, radius, tuning, d);
    }
}

/// Advance a single token
pub fn integrate_token(token: &mut Token, radius: f32, tuning: &Tuning, d: f32) {
    token.vel.y += tuning.gravity * d;

    // Clamp speed so a single step can never tunnel through a neighbor
    let speed = token.vel.length();
    if speed > tuning.max_speed {
        token.vel *= tuning.max_speed / speed;
    }

    token.pos += token.vel * d;

    token.rotation += token.rotation_speed * d;
    token.rotation_speed *= tuning.rotation_decay;

    collide_walls(token, radius, tuning);
    collide_floor(token, radius, tuning);
}

/// Side walls: clamp to the face, bounce back, spin from the vertical slide
fn collide_walls(token: &mut Token, radius: f32, tuning: &Tuning) {
    let left = tuning.left_wall();
    let right = tuning.right_wall();

    if token.pos.x - radius < left {
        token.pos.x = left + radius;
        token.vel.x = token.vel.x.abs() * tuning.bounce;
        token.rotation_speed += token.vel.y * tuning.wall_spin;
    }
    if token.pos.x + radius > right {
        token.pos.x = right - radius;
        token.vel.x = -token.vel.x.abs() * tuning.bounce;
        token.rotation_speed -= token.vel.y * tuning.wall_spin;
    }
}

/// Floor: clamp, bounce, friction, rolling spin and rest snapping
fn collide_floor(token: &mut Token, radius: f32, tuning: &Tuning) {
    let floor = tuning.floor();
    if token.pos.y + radius <= floor {
        return;
    }

    token.pos.y = floor - radius;
    token.vel.y = -token.vel.y.abs() * tuning.bounce;
    token.vel.x *= tuning.friction;
    token.rotation_speed = token.vel.x * tuning.roll_spin;

    if token.vel.y.abs() < tuning.rest_vy {
        token.vel.y = 0.0;
    }
    if token.vel.x.abs() < tuning.rest_vx {
        token.vel.x = 0.0;
    }
}
