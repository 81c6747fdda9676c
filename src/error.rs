use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading measurements or producing figures.
#[derive(Debug, Error)]
pub enum FigureError {
    #[error("{source_name}:{line}: {message}")]
    Parse {
        source_name: String,
        line: usize,
        message: String,
    },
    #[error("bound files disagree at row {row}: {detail}")]
    ShapeMismatch { row: usize, detail: String },
    #[error("distribution `{distribution}` has no `{variant}` measurement for method `{method}`")]
    MissingVariant {
        distribution: String,
        method: String,
        variant: String,
    },
    #[error("palette exhausted: {needed} distributions but only {available} colors")]
    PaletteExhaustion { needed: usize, available: usize },
    #[error("distribution `{distribution}` has more than one measurement for method `{method}`")]
    DuplicateMeasurement {
        distribution: String,
        method: String,
    },
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("render error: {0}")]
    Render(String),
}

impl FigureError {
    pub fn parse<S: Into<String>, M: Into<String>>(source_name: S, line: usize, message: M) -> Self {
        FigureError::Parse {
            source_name: source_name.into(),
            line,
            message: message.into(),
        }
    }

    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        FigureError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn render<E: std::fmt::Display>(err: E) -> Self {
        FigureError::Render(err.to_string())
    }

    /// Errors that describe malformed upstream data and end the whole pass.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FigureError::Parse { .. } | FigureError::ShapeMismatch { .. } | FigureError::Io { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FigureError>;
