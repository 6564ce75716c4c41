// Domain models

mod kill;
mod snapshot;

pub use kill::{KillResponse, KillResult};
pub use snapshot::{ProcessRecord, SystemSnapshot, round_percent};
