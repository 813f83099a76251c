//! Search expressions for the files API.
//!
//! Queries are built as values and rendered to the `q` parameter syntax:
//!
//! ```
//! use drivekit_query::{Conjunction, Operator, Query, Term};
//!
//! let query = Query::group([
//!     Term::new("name", "Project").operator(Operator::Contains).into(),
//!     Query::from(Conjunction::And),
//!     Term::new("trashed", false).into(),
//! ]);
//!
//! assert_eq!(
//!     query.render().unwrap(),
//!     "name contains 'Project' and trashed = false"
//! );
//! ```

mod error;
mod expr;
mod render;

pub use error::{QueryError, Result};
pub use expr::{Conjunction, NEGATION, Operator, Query, Term, Value};
pub use render::{quote, render_value};
