/// Crate-wide error type.
pub type Err = anyhow::Error;
/// Crate-wide result type.
pub type Res<T> = Result<T, Err>;
/// Result with no success payload.
pub type Void = Res<()>;

/// Typed domain errors the API layer maps to stable error codes and HTTP
/// statuses. Everything else travels as a plain `anyhow` error and surfaces
/// as an internal error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeskError {
    /// The referenced record does not exist.
    ResourceNotFound,
    /// The topic already has a secret key; keys are issued once.
    SecretAlreadyExists,
    /// The client payload is missing or violating required fields.
    MalformedInput(String),
}

impl std::fmt::Display for DeskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeskError::ResourceNotFound => write!(f, "resource not found"),
            DeskError::SecretAlreadyExists => write!(f, "topic secret key already exists"),
            DeskError::MalformedInput(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for DeskError {}

/// Authentication state of the caller, resolved from its bearer token.
///
/// Unauthenticated requests still carry a (default) `AuthState`; handlers
/// decide whether that is acceptable for the route.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    /// Whether the caller presented a valid bearer token.
    pub authenticated: bool,
    /// User record key of the caller, when authenticated.
    pub sub: Option<String>,
    /// Roles held by the caller.
    pub roles: Vec<String>,
}

impl AuthState {
    /// Whether the caller holds the admin role.
    pub fn is_root(&self) -> bool {
        self.roles.iter().any(|role| role == "root")
    }
}
