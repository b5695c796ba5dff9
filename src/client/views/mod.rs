//! View-models for the client pages. Each one holds the page state and performs the
//! page's API calls; failures leave the state untouched so forms stay populated.

pub mod booking;
pub mod catalog;
pub mod dashboard;
pub mod forms;

use super::api::ClientError;
use super::router::Route;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// Shown inline next to the form.
    #[error("{0}")]
    Form(String),

    /// Not a form error: the page navigates elsewhere instead.
    #[error("redirecting to {}", .0.path())]
    Redirect(Route),

    #[error(transparent)]
    Client(#[from] ClientError),
}
