use argmin::core::{ArgminError, Error};

/// Crate-wide result alias for optimizer, objective, and problem operations.
pub type OptResult<T> = Result<T, OptError>;

/// Errors from objectives, the problem definition, and the minimizer.
///
/// Objective and gradient failures raised inside an Argmin run travel
/// through Argmin's `Error` and are recovered unchanged by
/// `From<argmin::core::Error>`.
#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Derivatives ----
    /// Implies that FD should be used
    GradientNotImplemented,

    /// Implies that a FD Hessian of the gradient should be used
    HessianNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MinimizeOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    /// The objective refused to evaluate at the requested point.
    ObjectiveFailed {
        text: String,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing
    MissingThetaHat,

    /// No start point produced a usable optimum.
    AllStartsFailed {
        n_starts: usize,
    },

    // ---- Problem ----
    /// Lower and upper bound vectors differ in length.
    BoundsDimMismatch {
        lb: usize,
        ub: usize,
    },

    /// A bound pair is NaN or has `lb > ub`.
    InvalidBounds {
        index: usize,
        lb: f64,
        ub: f64,
    },

    /// Parameter index outside of `0..dim_full`.
    IndexOutOfRange {
        index: usize,
        dim: usize,
    },

    /// Fixed indices and fixed values differ in length.
    FixedValuesMismatch {
        indices: usize,
        values: usize,
    },

    /// Fixed values need to be finite.
    InvalidFixedValue {
        index: usize,
        value: f64,
    },

    /// Theta length mismatch (full or reduced vector).
    ThetaLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Optimization input must have finite values.
    InvalidThetaInput {
        index: usize,
        value: f64,
    },

    // ---- Argmin ----
    /// Error raised inside the solver. `kind` names the argmin error class
    /// (`"condition violated"`, `"not implemented"`, ...) or `"backend"` for
    /// errors argmin does not classify.
    Solver {
        kind: &'static str,
        text: String,
    },

    // ---- Finite Diffs ----
    /// Hessian matrix dimensions do not match parameter dimensions.
    HessianDimMismatch {
        expected: usize,
        found: (usize, usize),
    },

    /// Hessian values need to be finite.
    InvalidHessian {
        row: usize,
        col: usize,
        value: f64,
    },
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use OptError::*;
        match self {
            GradientNotImplemented => f.write_str("Gradient not implemented"),
            HessianNotImplemented => f.write_str("Hessian not implemented"),
            GradientDimMismatch { expected, found } => {
                write!(f, "Gradient has {found} entries, expected {expected}")
            }
            InvalidGradient { index, value, reason } => {
                write!(f, "Gradient entry {index} is {value}: {reason}")
            }

            InvalidTolGrad { tol, reason } => write!(f, "Gradient tolerance {tol}: {reason}"),
            InvalidTolCost { tol, reason } => write!(f, "Cost tolerance {tol}: {reason}"),
            InvalidMaxIter { max_iter, reason } => write!(f, "max_iter {max_iter}: {reason}"),
            NoTolerancesProvided => {
                f.write_str("At least one of tol_grad, tol_cost, max_iter must be set")
            }
            InvalidLineSearch { name, reason } => write!(f, "Line search '{name}': {reason}"),
            InvalidLBFGSMem { mem, reason } => write!(f, "L-BFGS memory {mem}: {reason}"),

            NonFiniteCost { value } => write!(f, "Objective returned non-finite value {value}"),
            ObjectiveFailed { text } => write!(f, "Objective evaluation failed: {text}"),

            InvalidThetaHat { index, value, reason } => {
                write!(f, "Optimum entry {index} is {value}: {reason}")
            }
            MissingThetaHat => f.write_str("Solver finished without a best parameter vector"),
            AllStartsFailed { n_starts } => write!(f, "All {n_starts} optimizer starts failed"),

            BoundsDimMismatch { lb, ub } => {
                write!(f, "Lower bounds have {lb} entries, upper bounds {ub}")
            }
            InvalidBounds { index, lb, ub } => {
                write!(f, "Bounds [{lb}, {ub}] of parameter {index} need lb <= ub")
            }
            IndexOutOfRange { index, dim } => {
                write!(f, "Parameter index {index} out of range for dimension {dim}")
            }
            FixedValuesMismatch { indices, values } => {
                write!(f, "Got {indices} fixed indices but {values} fixed values")
            }
            InvalidFixedValue { index, value } => {
                write!(f, "Fixed value {value} of parameter {index} must be finite")
            }
            ThetaLengthMismatch { expected, actual } => {
                write!(f, "Parameter vector has {actual} entries, expected {expected}")
            }
            InvalidThetaInput { index, value } => {
                write!(f, "Start vector entry {index} is {value}, must be finite")
            }

            Solver { kind, text } => write!(f, "Solver error ({kind}): {text}"),

            HessianDimMismatch { expected, found: (r, c) } => {
                write!(f, "Hessian is {r}x{c}, expected {expected}x{expected}")
            }
            InvalidHessian { row, col, value } => {
                write!(f, "Hessian entry ({row}, {col}) is {value}, must be finite")
            }
        }
    }
}

impl From<Error> for OptError {
    /// Recover an `OptError` raised inside a cost or gradient call; classify
    /// everything else as [`OptError::Solver`].
    fn from(original_err: Error) -> Self {
        let original_err = match original_err.downcast::<OptError>() {
            Ok(opt_err) => return opt_err,
            Err(err) => err,
        };
        match original_err.downcast::<ArgminError>() {
            Ok(argmin_err) => {
                let (kind, text) = match argmin_err {
                    ArgminError::InvalidParameter { text } => ("invalid parameter", text),
                    ArgminError::NotImplemented { text } => ("not implemented", text),
                    ArgminError::NotInitialized { text } => ("not initialized", text),
                    ArgminError::ConditionViolated { text } => ("condition violated", text),
                    ArgminError::CheckpointNotFound { text } => ("checkpoint not found", text),
                    ArgminError::PotentialBug { text } => ("potential bug", text),
                    ArgminError::ImpossibleError { text } => ("impossible error", text),
                    other => ("unclassified", other.to_string()),
                };
                OptError::Solver { kind, text }
            }
            Err(err) => OptError::Solver { kind: "backend", text: err.to_string() },
        }
    }
}
