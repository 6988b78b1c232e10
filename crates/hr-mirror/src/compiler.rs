//! The external compiler seam.
//!
//! Source-to-source transformation is not done in-process. [`Compiler`] is the
//! boundary, and [`CommandCompiler`] implements it by piping the file through
//! an external command (Babel by default).

use std::io::Write;
use std::process::{Command, Stdio};

use camino::Utf8Path;
use hr_core::CompilerConfig;
use hr_core::config::FILE_PLACEHOLDER;

/// Errors reported by a [`Compiler`].
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    /// The compiler executable could not be started.
    #[error("failed to start compiler '{program}': {source}")]
    Spawn {
        /// The executable that failed to start.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The compiler ran and exited unsuccessfully.
    #[error("compiler '{program}' exited with {}: {stderr}", describe_exit(.code))]
    Failed {
        /// The compiler executable.
        program: String,
        /// Exit code, `None` if the compiler was killed by a signal.
        code: Option<i32>,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// Piping data to or from the compiler failed.
    #[error("compiler I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The compiler produced output that is not UTF-8.
    #[error("compiler output is not valid UTF-8: {0}")]
    NonUtf8Output(#[from] std::string::FromUtf8Error),

    /// Any other compiler-specific failure.
    #[error("{0}")]
    Other(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    code.map_or_else(|| "a signal".to_owned(), |c| format!("status {c}"))
}

/// Transforms one source file into its runtime form.
///
/// Implementations must be [`Send`] and [`Sync`] because passes run on the
/// blocking thread pool.
///
/// Closures with the matching signature implement the trait, which keeps
/// tests free of external executables:
///
/// ```
/// use hr_mirror::{Compiler, CompileError};
/// use camino::Utf8Path;
///
/// let upper = |_: &Utf8Path, src: &[u8]| -> Result<String, CompileError> {
///     Ok(String::from_utf8_lossy(src).to_uppercase())
/// };
/// assert_eq!(upper.compile(Utf8Path::new("a.js"), b"let x").unwrap(), "LET X");
/// ```
pub trait Compiler: Send + Sync {
    /// Compiles `source`, read from `path`, and returns the output text.
    fn compile(&self, path: &Utf8Path, source: &[u8]) -> Result<String, CompileError>;
}

impl<F> Compiler for F
where
    F: Fn(&Utf8Path, &[u8]) -> Result<String, CompileError> + Send + Sync,
{
    fn compile(&self, path: &Utf8Path, source: &[u8]) -> Result<String, CompileError> {
        self(path, source)
    }
}

/// Runs an external command with the file on stdin and reads the result from stdout.
///
/// Every `{file}` in the arguments is replaced with the source path, so the
/// compiler can resolve its own configuration relative to the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCompiler {
    program: String,
    args: Vec<String>,
}

impl CommandCompiler {
    /// Creates a compiler that runs `program` with `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Creates a compiler from the `compiler` configuration section.
    #[must_use]
    pub fn from_config(config: &CompilerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }

    /// Returns the compiler executable.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn args_for(&self, path: &Utf8Path) -> impl Iterator<Item = String> + '_ {
        let file = path.as_str().to_owned();
        self.args
            .iter()
            .map(move |arg| arg.replace(FILE_PLACEHOLDER, &file))
    }
}

impl Compiler for CommandCompiler {
    fn compile(&self, path: &Utf8Path, source: &[u8]) -> Result<String, CompileError> {
        let mut child = Command::new(&self.program)
            .args(self.args_for(path))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| CompileError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| CompileError::Other("compiler stdin unavailable".to_owned()))?;

        // stdin is fed from its own thread so a compiler that streams output
        // before consuming all input cannot deadlock on a full pipe.
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(source));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (written, output)
        });

        let (written, output) = output;
        let output = output?;

        if !output.status.success() {
            return Err(CompileError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        // A compiler may exit successfully without reading stdin at all.
        if let Err(e) = written {
            if e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(CompileError::Io(e));
            }
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_placeholder_substitution() {
        let compiler = CommandCompiler::new(
            "babel",
            vec!["--filename".to_owned(), "{file}".to_owned(), "-q".to_owned()],
        );
        let args: Vec<String> = compiler.args_for(Utf8Path::new("app/a.js")).collect();
        assert_eq!(args, vec!["--filename", "app/a.js", "-q"]);
    }

    #[test]
    fn test_from_config() {
        let compiler = CommandCompiler::from_config(&CompilerConfig::default());
        assert_eq!(compiler.program(), "node_modules/.bin/babel");
    }

    #[test]
    fn test_spawn_failure() {
        let compiler = CommandCompiler::new("/nonexistent/hotrun-compiler", Vec::new());
        let err = compiler
            .compile(Utf8Path::new("a.js"), b"1")
            .expect_err("missing program must fail");
        assert!(matches!(err, CompileError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_passes_stdin_through() {
        let compiler = CommandCompiler::new("cat", Vec::new());
        let out = compiler
            .compile(Utf8Path::new("a.js"), b"const a = 1;\n")
            .expect("cat succeeds");
        assert_eq!(out, "const a = 1;\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_failure_captures_stderr() {
        let compiler = CommandCompiler::new(
            "sh",
            vec!["-c".to_owned(), "echo boom >&2; exit 3".to_owned()],
        );
        let err = compiler
            .compile(Utf8Path::new("a.js"), b"")
            .expect_err("non-zero exit must fail");
        match err {
            CompileError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("Expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn test_failed_display() {
        let err = CompileError::Failed {
            program: "babel".to_owned(),
            code: None,
            stderr: "killed".to_owned(),
        };
        assert_eq!(err.to_string(), "compiler 'babel' exited with a signal: killed");
    }
}
