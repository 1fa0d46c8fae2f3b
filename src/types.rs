use ndarray::{
    Array1,
    Array2,
    Array3,
};

pub use cauchy::c64;

pub type Vector<T> = Array1<T>;  // Define this type to use broadcast operations.
pub type Matrix<T> = Array2<T>;
pub type Cube<T>   = Array3<T>;

pub type Result<T> = anyhow::Result<T>;


/// Validation failure raised while refining raw data: bad selection strings
/// or an unrecognized k-point mode. Storage and I/O failures are not
/// refinement errors and propagate unchanged.
#[derive(Debug, thiserror::Error)]
pub enum RefinementError {
    #[error("[SELECTION]: malformed selection string {0:?}")]
    MalformedSelection(String),

    #[error("[SELECTION]: unknown token {token:?}, available tokens are {available}")]
    UnknownToken {
        token: String,
        available: String,
    },

    #[error("[SELECTION]: conflicting tokens {0:?} and {1:?} in one group")]
    ConflictingTokens(String, String),

    #[error("[KPOINTS]: unknown k-point mode {0:?}")]
    UnknownKpointMode(String),
}
