//! Rendering expressions to the `q` parameter syntax.

use chrono::SecondsFormat;

use crate::error::{QueryError, Result};
use crate::expr::{NEGATION, Operator, Query, Term, Value};

/// Single-quote `text`, escaping backslashes and quotes.
///
/// # Examples
///
/// ```
/// assert_eq!(drivekit_query::quote(r"Bob's \ folder"), r"'Bob\'s \\ folder'");
/// ```
pub fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

/// Render a value. Text is quoted when `quote_text` is set; list items never are.
pub fn render_value(value: &Value, quote_text: bool) -> String {
    match value {
        Value::Text(text) if quote_text => quote(text),
        Value::Text(text) => text.clone(),
        Value::Integer(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::DateTime(at) => format!("'{}'", at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(|item| render_value(item, false)).collect();
            format!("{{ {} }}", items.join(" "))
        }
        Value::Term(term) => format!(
            "key={} and {}value{}{}",
            quote(&term.key),
            negation(term.negated),
            term.operator,
            render_value(&term.value, true)
        ),
    }
}

fn negation(negated: bool) -> String {
    if negated {
        format!("{NEGATION} ")
    } else {
        String::new()
    }
}

fn render_term(term: &Term) -> Result<String> {
    if term.operator == Operator::Has && !matches!(term.value, Value::List(_)) {
        return Err(QueryError::HasRequiresList {
            key: term.key.clone(),
        });
    }

    let value = render_value(&term.value, true);
    let not = negation(term.negated);
    Ok(match term.operator {
        Operator::In => format!("{not}{value} in {}", term.key),
        operator => format!("{not}{} {operator} {value}", term.key),
    })
}

fn render_query(query: &Query, top: bool) -> Result<String> {
    match query {
        Query::Raw(raw) => Ok(raw.clone()),
        Query::Conjunction(conjunction) => Ok(conjunction.as_str().to_string()),
        Query::Term(term) => render_term(term),
        Query::Group(items) => {
            let parts = items
                .iter()
                .map(|item| render_query(item, false))
                .collect::<Result<Vec<_>>>()?;
            let joined = parts.join(" ");
            Ok(if top { joined } else { format!("( {joined} )") })
        }
    }
}

impl Query {
    /// Render the expression.
    ///
    /// # Errors
    ///
    /// [`QueryError::HasRequiresList`] when a `has` term carries anything but a list.
    pub fn render(&self) -> Result<String> {
        render_query(self, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Conjunction;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_renders_reference_query() {
        let query = Query::group([
            Term::new(
                "properties",
                vec![
                    Term::new("CENTRAL_HOME_ITEM_TYPE", "ITEM").into(),
                    Value::from(Conjunction::And),
                    Term::new("HIDDEN", true).negated().into(),
                ],
            )
            .operator(Operator::Has)
            .into(),
            Conjunction::Or.into(),
            Term::new("name", "Project").operator(Operator::Contains).into(),
            Conjunction::And.into(),
            Query::group([
                Term::new("mimeType", "image/png").into(),
                Conjunction::Or.into(),
                Term::new("mimeType", "image/svg").into(),
            ]),
        ]);

        assert_eq!(
            query.render().unwrap(),
            "properties has { key='CENTRAL_HOME_ITEM_TYPE' and value='ITEM' and key='HIDDEN' and not value=true } or name contains 'Project' and ( mimeType = 'image/png' or mimeType = 'image/svg' )"
        );
    }

    #[test]
    fn test_in_puts_value_first() {
        let term = Term::new("parents", "root").operator(Operator::In);
        assert_eq!(Query::from(term.clone()).render().unwrap(), "'root' in parents");
        assert_eq!(
            Query::from(term.negated()).render().unwrap(),
            "not 'root' in parents"
        );
    }

    #[test]
    fn test_has_requires_list() {
        let query = Query::from(Term::new("properties", "x").operator(Operator::Has));
        assert_eq!(
            query.render(),
            Err(QueryError::HasRequiresList {
                key: "properties".to_string()
            })
        );
    }

    #[test]
    fn test_error_inside_nested_group_propagates() {
        let query = Query::group([Query::group([
            Term::new("appProperties", 1).operator(Operator::Has).into(),
        ])]);
        assert!(query.render().is_err());
    }

    #[test]
    fn test_escapes_text_values() {
        let query = Query::from(Term::new("name", r"it's a \ path"));
        assert_eq!(query.render().unwrap(), r"name = 'it\'s a \\ path'");
    }

    #[test]
    fn test_scalar_values() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(
            Query::from(Term::new("modifiedTime", at).operator(Operator::GreaterThan))
                .render()
                .unwrap(),
            "modifiedTime > '2024-03-01T12:30:00Z'"
        );
        assert_eq!(
            Query::from(Term::new("quotaBytesUsed", 42).operator(Operator::LessThanOrEqual))
                .render()
                .unwrap(),
            "quotaBytesUsed <= 42"
        );
        assert_eq!(
            Query::from(Term::new("trashed", false).operator(Operator::NotEquals))
                .render()
                .unwrap(),
            "trashed != false"
        );
        assert_eq!(render_value(&Value::Float(1.5), true), "1.5");
    }

    #[test]
    fn test_raw_and_top_level_group() {
        let query = Query::all([Query::raw("'root' in parents"), Query::raw("trashed = false")]);
        assert_eq!(query.render().unwrap(), "'root' in parents and trashed = false");
        assert_eq!(Query::raw("starred = true").render().unwrap(), "starred = true");
    }
}
