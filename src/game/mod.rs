pub mod agent;
pub mod boost;
pub mod constants;
pub mod events;
pub mod performance;
pub mod respawn;
pub mod snapshot;
pub mod state;
pub mod systems;
pub mod trail;
