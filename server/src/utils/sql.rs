//! SQL utility functions

/// Escape SQL LIKE metacharacters (%, _, \) so user input matches literally
///
/// Pair with `ESCAPE '\'` in the LIKE clause.
///
/// # Example
///
/// ```
/// use racetime_server::utils::sql::escape_like_pattern;
///
/// let pattern = format!("%{}%", escape_like_pattern("10_km 100%"));
/// assert_eq!(pattern, "%10\\_km 100\\%%");
/// ```
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
