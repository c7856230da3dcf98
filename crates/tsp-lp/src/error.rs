use thiserror::Error;

#[derive(Debug, Error)]
pub enum LpError {
    #[error("LP reported infeasible on a problem that must be feasible")]
    Infeasible,
    #[error("LP reported unbounded")]
    Unbounded,
    #[error("LP solver returned a non-optimal status after full optimization: {0}")]
    NonOptimal(String),
    #[error("programming error: {0}")]
    Bug(String),
}
