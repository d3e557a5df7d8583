//! SQL identifier helpers.
//!
//! Identifiers cannot be bound as parameters, so the few that reach a
//! statement are quoted here. Quoting is not a substitute for the catalog
//! allow-list: callers only pass names that came from discovery.

/// Quotes an identifier for PostgreSQL, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    let mut quoted = String::with_capacity(name.len() + 2);
    quoted.push('"');
    for ch in name.chars() {
        if ch == '"' {
            quoted.push('"');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}
