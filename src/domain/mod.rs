use thiserror::Error;

pub mod password;
pub mod task;
pub mod user;


/// Failure reported by a driven port that writes to the backing store.
#[derive(Error, Debug)]
pub enum DrivenPortError {
    #[error("a communication failure occurred: {0}")]
    CommsFailure(#[from] anyhow::Error),
    /// The store refused the write because it would break a uniqueness or integrity rule
    #[error("the write violated the storage constraint \"{constraint}\"")]
    ConstraintViolation { constraint: String },
}

impl DrivenPortError {
    /// Attaches a description of the [action] being taken over the port, keeping constraint
    /// violations intact so callers can still classify them
    fn while_trying_to(self, action: &'static str) -> Self {
        match self {
            Self::CommsFailure(err) => Self::CommsFailure(err.context(action)),
            violation => violation,
        }
    }
}
