use std::fmt::{Debug, Display};
use std::path::PathBuf;

pub trait ErrorType: Display + Debug + PartialEq {}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Location {
    pub file: PathBuf,
    // 0 when the problem is with the file as a whole
    pub line: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize) -> Self {
        Location { file, line }
    }

    pub fn whole_file(file: PathBuf) -> Self {
        Location { file, line: 0 }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.line == 0 {
            write!(f, "{}", self.file.display())
        } else {
            write!(f, "{}:{}", self.file.display(), self.line)
        }
    }
}

/// An error (or warning) tied to the place in a grammar file it came from.
#[derive(Debug, PartialEq)]
pub struct Error<T: ErrorType> {
    pub location: Location,
    pub error: T,
}

impl<T: ErrorType> Display for Error<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\x1b[31;49;1m[{}]\x1b[39;49;1m  {}\x1b[0m", self.location, self.error)
    }
}

impl<T: ErrorType> std::error::Error for Error<T> {}

pub type Errors<T> = Vec<Error<T>>;
