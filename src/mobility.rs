use crate::model::Agent;
use rand::prelude::*;

/// Number of ticks after infection during which a confined agent still moves.
pub const GRACE_TICKS: u64 = 30;

/// Whether `agt` is allowed to move at tick `now`.
pub fn can_move(agt: &Agent, now: u64) -> bool {
    let confined = agt.dead || agt.quarantined || agt.hospitalized;
    let in_grace = agt.infected
        && agt
            .infected_tick
            .is_some_and(|tick| now < tick + GRACE_TICKS);
    !confined || in_grace
}

/// Move `agt` one step in a random axis direction, unless it is confined.
pub fn move_agent<R: Rng + ?Sized>(agt: &mut Agent, step: f64, now: u64, rng: &mut R) {
    if !can_move(agt, now) {
        return;
    }
    match rng.random_range(0..4) {
        0 => agt.pos.x += step,
        1 => agt.pos.x -= step,
        2 => agt.pos.y += step,
        _ => agt.pos.y -= step,
    }
}
