use thiserror::Error;

/// Typed failures the pipeline must tell apart. Everything else
/// travels as `anyhow::Error` at the application seams.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Source is not syntactically valid Python.
    #[error("invalid Python syntax at line {line}")]
    Parse {
        /// 1-based line of the first offending node
        line: usize,
    },

    /// An advisor produced a message without the mandatory brief
    /// level - a programmer error in the advisor, not in the user's
    /// snippet.
    #[error("advisor '{advisor}' produced a message lacking the mandatory brief level")]
    EmptyBrief {
        /// Advisor that misbehaved
        advisor: String,
    },

    /// More than one of code / file / project supplied.
    #[error(
        "the code to examine can only be identified one way: \
         supply exactly one of --code, --file-path, or --project-path"
    )]
    AmbiguousSource,
}
