/// Failure categories surfaced by verbs and the evaluator.
///
/// Every error unwinds the current command line; the REPL decides whether
/// that also terminates the process (`exitonerror`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unexpected character, unterminated format string.
    Syntax,
    /// Unknown verb, variable, pattern, or label.
    Name,
    /// Division or modulo by zero.
    Arithmetic,
    /// Sector count or LBA outside the buffer or drive.
    Bounds,
    /// No drive set, or write attempted with write protect on.
    State,
    /// The block layer reported a failure.
    Io,
    /// Miscompare while the compare mode is `fail`.
    Compare,
    /// Ran off the end of the program while scanning for a terminator.
    Flow,
    /// Interpreter stack underflow.
    Fatal,
}

#[derive(Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

#[macro_export]
macro_rules! error {
    ($kind:ident; $($arg:tt)*) => {
        Err($crate::lang::Error::new(
            $crate::lang::ErrorKind::$kind,
            format!($($arg)*),
        ))
    };
}

impl Error {
    pub fn new(kind: ErrorKind, message: String) -> Error {
        Error { kind, message }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macro_builds_err() {
        let r: Result<(), Error> = error!(Name; "Variable \"{}\" invalid", "x");
        let e = r.unwrap_err();
        assert_eq!(e.kind(), ErrorKind::Name);
        assert_eq!(e.to_string(), "Variable \"x\" invalid");
    }
}
