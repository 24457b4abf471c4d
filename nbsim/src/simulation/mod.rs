pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod scenario;
pub mod presets;
pub mod snapshot;
pub mod scheduler;
