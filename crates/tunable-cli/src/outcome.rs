//! Results of applying a command line

use tunable_core::BatchReport;

/// Exit code for a successful early exit, such as `--help`
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for a command line that does not parse
pub const EXIT_USAGE: i32 = 2;

/// Request for the host to stop, with text to show
///
/// The backend never exits the process itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitRequest {
    /// Whether the exit is a normal one
    pub success: bool,
    /// Usage text, preceded by the parse error on failure
    pub message: String,
}

impl ExitRequest {
    /// Successful exit showing `message`
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed exit showing `message`
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    /// Process exit code for this request
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.success {
            EXIT_SUCCESS
        } else {
            EXIT_USAGE
        }
    }

    /// Print the message to stdout on success, stderr otherwise
    pub fn print(&self) {
        if self.success {
            println!("{}", self.message);
        } else {
            eprintln!("{}", self.message);
        }
    }
}

/// Outcome of [`CommandLineInterceptor::apply`](crate::CommandLineInterceptor::apply)
#[derive(Debug, Clone, PartialEq)]
pub enum CliOutcome {
    /// Values were loaded; per-field failures are in the report
    Proceed(BatchReport),
    /// The host should exit
    Exit(ExitRequest),
}

impl CliOutcome {
    /// Check if the host should exit
    #[inline]
    #[must_use]
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Exit(_))
    }

    /// Load report, if values were loaded
    #[must_use]
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            Self::Proceed(report) => Some(report),
            Self::Exit(_) => None,
        }
    }

    /// Exit request, if any
    #[must_use]
    pub fn exit(&self) -> Option<&ExitRequest> {
        match self {
            Self::Proceed(_) => None,
            Self::Exit(request) => Some(request),
        }
    }
}
