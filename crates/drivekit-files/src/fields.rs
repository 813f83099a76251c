//! Partial-response field selectors.

/// A `fields` selector such as `nextPageToken, files(id, name)`.
///
/// # Examples
///
/// ```
/// use drivekit_files::Fields;
///
/// let fields = Fields::new()
///     .field("nextPageToken")
///     .nested("files", Fields::of(["id", "name"]));
/// assert_eq!(fields.render(), "nextPageToken, files(id, name)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, Option<Fields>)>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// A flat selector.
    pub fn of<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(|name| (name.into(), None)).collect())
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.0.push((name.into(), None));
        self
    }

    #[must_use]
    pub fn nested(mut self, name: impl Into<String>, fields: Fields) -> Self {
        self.0.push((name.into(), Some(fields)));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn render(&self) -> String {
        self.0
            .iter()
            .map(|(name, nested)| match nested {
                Some(fields) => format!("{name}({})", fields.render()),
                None => name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
