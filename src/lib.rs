pub mod body;
pub mod c_api;
pub mod collision;
pub mod config;
pub mod error;
pub mod kinematics;
pub mod response;
pub mod scene;
pub mod world;

pub use body::{Body, BodyDesc, BodyId, BodyKind, BodyState, Circle, Pose, ProxyCircle};
pub use collision::{collides, proxy_world_positions};
pub use config::{PhysicsConfig, ScenarioConfig};
pub use error::{PhysicsError, Result};
pub use kinematics::{Drag, Trajectory};
pub use response::{Axis, ResponseRule, ResponseTable, conserve_momentum};
pub use scene::Cannon;
pub use world::World;
