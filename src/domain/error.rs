use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("No such user")]
    UserNotFound,
}
