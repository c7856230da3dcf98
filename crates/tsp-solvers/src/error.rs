//! Error taxonomy for the solver layer. Fatal kinds are re-exported from `tsp-core`; the
//! `Transient` signals named alongside them are deliberately *not* error values here — they
//! surface as `Option`/dedicated enums at each call site instead.

pub use tsp_core::error::{SolveError, SolveResult, Timeout};

use tsp_lp::LpError;

impl From<LpError> for SolveError {
    fn from(err: LpError) -> Self {
        SolveError::LpFailure(err.to_string())
    }
}
