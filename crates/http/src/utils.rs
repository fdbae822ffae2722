//! Internal helper macros.

/// Returns early with an error if a condition is not met.
///
/// Like `assert!`, but returns `Err($error)` from the enclosing function instead of
/// panicking.
///
/// ```ignore
/// ensure!(self.state != ParseState::Done, ParseError::InvalidState { state: self.state });
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;
