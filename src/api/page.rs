//! Home page rendering.
//!
//! The page is produced by an injected [`PageRenderer`] so handlers never
//! touch file paths. The built-in page is embedded with rust-embed; in debug
//! builds rust-embed reads it from `static/` at runtime.

use std::io;
use std::path::PathBuf;

use miette::Diagnostic;
use rust_embed::RustEmbed;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

const HOME_PAGE: &str = "home.html";

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticPages;

/// Errors that can occur while producing a page.
#[derive(Error, Diagnostic, Debug)]
pub enum PageError {
    #[error("Page '{name}' is not embedded in this build")]
    #[diagnostic(code(todo_api::page::missing))]
    Missing { name: String },

    #[error("Failed to read page template {}", .path.display())]
    #[diagnostic(
        code(todo_api::page::read),
        help("Check the --home-template path and its permissions.")
    )]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Page '{name}' is not valid UTF-8")]
    #[diagnostic(code(todo_api::page::encoding))]
    Encoding { name: String },
}

/// Produces the HTML served at `/`. Can be mocked in tests.
#[cfg_attr(test, automock)]
pub trait PageRenderer {
    /// Render the home page.
    fn render_home(&self) -> Result<String, PageError>;
}

/// Renders the page compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedPages;

impl PageRenderer for EmbeddedPages {
    fn render_home(&self) -> Result<String, PageError> {
        let file = StaticPages::get(HOME_PAGE).ok_or_else(|| PageError::Missing {
            name: HOME_PAGE.to_string(),
        })?;

        String::from_utf8(file.data.into_owned()).map_err(|_| PageError::Encoding {
            name: HOME_PAGE.to_string(),
        })
    }
}

/// Renders a template file from disk, re-read on every request.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    path: PathBuf,
}

impl TemplateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PageRenderer for TemplateFile {
    fn render_home(&self) -> Result<String, PageError> {
        std::fs::read_to_string(&self.path).map_err(|source| match source.kind() {
            io::ErrorKind::InvalidData => PageError::Encoding {
                name: self.path.display().to_string(),
            },
            _ => PageError::Read {
                path: self.path.clone(),
                source,
            },
        })
    }
}

/// Page source chosen at startup: a template file when one is configured,
/// the embedded page otherwise.
#[derive(Debug, Clone)]
pub enum HomePage {
    Embedded(EmbeddedPages),
    File(TemplateFile),
}

impl HomePage {
    pub fn from_config(template: Option<PathBuf>) -> Self {
        match template {
            Some(path) => HomePage::File(TemplateFile::new(path)),
            None => HomePage::Embedded(EmbeddedPages),
        }
    }
}

impl PageRenderer for HomePage {
    fn render_home(&self) -> Result<String, PageError> {
        match self {
            HomePage::Embedded(pages) => pages.render_home(),
            HomePage::File(template) => template.render_home(),
        }
    }
}
