//! Auto-generated document ids
//!
//! 20 characters drawn uniformly from `[A-Za-z0-9]`, the same shape the
//! hosted backend assigns. Probe anchors and real ids share this scheme so a
//! random anchor lands at a uniformly random point of the id space.

use rand::Rng;
use rand::distr::Alphanumeric;

use super::PostId;

pub const AUTO_ID_LENGTH: usize = 20;

/// Generate a fresh auto id
pub fn auto_id<R: Rng>(rng: &mut R) -> PostId {
    let id: String = rng
        .sample_iter(Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect();
    PostId::new(id)
}
