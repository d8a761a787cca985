use crate::body::BodyId;

/// Errors raised while building or driving a [`World`](crate::World).
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Mass, proxy geometry or another construction parameter is unusable.
    InvalidBodyParameters(String),
    /// No body with this id exists in the world.
    UnknownBody(BodyId),
    /// The body is static and cannot receive an impulse.
    Immovable(BodyId),
    /// The world has no projectile body assigned.
    NoProjectile,
    /// A physics constant or scenario file is malformed.
    InvalidConfig(String),
}

impl std::fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBodyParameters(msg) => write!(f, "invalid body parameters: {}", msg),
            Self::UnknownBody(id) => write!(f, "unknown body {}", id),
            Self::Immovable(id) => write!(f, "body {} is immovable", id),
            Self::NoProjectile => write!(f, "world has no projectile"),
            Self::InvalidConfig(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for PhysicsError {}

impl From<serde_json::Error> for PhysicsError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PhysicsError>;
