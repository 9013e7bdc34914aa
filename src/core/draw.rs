use rand::Rng;

use crate::{core::participant::Participant, error::Error};

/// Winner count used when a draw request carries no usable count.
pub const DEFAULT_DRAW_COUNT: usize = 2;

/// Randomly selects `count` distinct winners from the roster and returns
/// their ids in selection order.
///
/// Indexes are drawn uniformly at random and re-drawn on collision, so a
/// `count` above the roster size can never finish; it is rejected up front
/// instead. The randomness source is a parameter so tests can seed it.
pub fn select_winners<R: Rng>(
    participants: &[Participant],
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, Error> {
    if count > participants.len() {
        return Err(Error::DrawTooLarge {
            requested: count,
            available: participants.len(),
        });
    }

    let mut selected: Vec<usize> = Vec::with_capacity(count);
    while selected.len() < count {
        let candidate = rng.gen_range(0..participants.len());
        if !selected.contains(&candidate) {
            selected.push(candidate);
        }
    }

    Ok(selected
        .into_iter()
        .map(|index| participants[index].id.clone())
        .collect())
}
