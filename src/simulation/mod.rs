//! Simulation runner.
//!
//! # Example
//! ```
//! use rexi_rs::physics::GlobalConfig;
//! use rexi_rs::simulation::Simulation;
//! use rexi_rs::solver::PlaneState;
//! use rexi_rs::time::{ExponentialTimeIntegrator, PropagatorKind, SlRexiConfig};
//! use rexi_rs::types::{DomainSize, Resolution2D};
//!
//! let res = Resolution2D::square(8);
//! let config = GlobalConfig::f_plane(res, DomainSize::square(1000.0), 1e-4, 9.81, 100.0).unwrap();
//! let options = SlRexiConfig::default().with_propagator(PropagatorKind::Direct);
//! let integrator =
//!     ExponentialTimeIntegrator::new(config, options, PlaneState::at_rest(res, 100.0)).unwrap();
//!
//! let result = Simulation::new(integrator).with_dt(60.0).run(600.0).unwrap();
//! assert!(result.success);
//! ```

mod runner;

pub use runner::{Simulation, SimulationConfig, SimulationResult};
