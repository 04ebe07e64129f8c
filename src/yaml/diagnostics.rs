//! YAML error types with source spans for miette

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("cannot read input file {path}")]
    #[diagnostic(code(amv::yaml::io), help("check the path, or create a blank snapshot with `amv init`"))]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A parse or type error pointing at the offending spot of the file
#[derive(Debug, Error, Diagnostic)]
#[error("invalid input file: {message}")]
#[diagnostic(
    code(amv::yaml::syntax),
    help("run `amv init` to see the expected layout; leave unknown values as ~")
)]
pub struct YamlSyntaxError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: Option<SourceSpan>,
}

impl YamlSyntaxError {
    pub fn from_serde_error(err: &serde_yml::Error, content: &str, filename: &str) -> Self {
        let span = err.location().map(|loc| {
            let mut start = loc.index().min(content.len());
            while !content.is_char_boundary(start) {
                start -= 1;
            }
            let len = content[start..].chars().next().map_or(0, char::len_utf8);
            SourceSpan::new(start.into(), len)
        });
        Self {
            message: err.to_string(),
            src: NamedSource::new(filename, content.to_string()),
            span,
        }
    }

    /// 1-based line of the error, when known
    pub fn line(&self) -> Option<usize> {
        let span = self.span?;
        let offset = span.offset().min(self.src.inner().len());
        Some(self.src.inner()[..offset].matches('\n').count() + 1)
    }
}
