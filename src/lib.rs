pub mod algorithm;
pub mod common;
pub mod config;
pub mod error;
pub mod map;
pub mod observer;
pub mod obstacle;
pub mod optimize;
pub mod scenario;
pub mod stat;

pub use algorithm::{plan, OpenPolicy, Planner};
pub use common::{Path, Route};
pub use error::{Endpoint, MapError, PlanError};
pub use map::Grid;
