pub mod simulation;
pub mod configuration;
pub mod error;

pub use error::{ConfigError, SimError, SimResult};

pub use simulation::states::{Body, Body2, Body3, System, System2, System3, NVec, NVec2, NVec3};
pub use simulation::params::{Parameters, G_SI};
pub use simulation::forces::{acceleration_on, Acceleration, AccelSet, NewtonianGravity};
pub use simulation::integrator::{kinematic_integrator, step, verlet_integrator};
pub use simulation::scenario::{AnyScenario, Scenario, Scenario2D, Scenario3D};
pub use simulation::presets::Preset;
pub use simulation::snapshot::{BodyView, Emission, FnSink, NullSink, Snapshot, SnapshotSink};
pub use simulation::scheduler::{
    run_bulk, run_continuous, BulkPlan, Cadence, ContinuousHandle, RunReport, RunState, Simulator,
};

pub use configuration::config::{
    BodyConfig, EngineConfig, IntegratorConfig, ModeConfig, ParametersConfig, ScenarioConfig,
};
