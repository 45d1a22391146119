//! `%VAR%` placeholder substitution for launcher templates.

/// Replace `%NAME%` tokens in `text` using the variable table.
///
/// A `%` followed by an ASCII letter or underscore starts a candidate
/// variable name, terminated by the next `%`. Known names are replaced by
/// their value (both delimiters consumed); unknown names are emitted
/// literally, delimiters included. A `%` that does not start a valid name,
/// or a candidate that reaches end of input without a closing `%`, passes
/// through unchanged. Names match case-sensitively; the first table entry
/// wins. Runs in linear time over the input.
pub fn substitute(text: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let starts_name = after
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if !starts_name {
            out.push('%');
            rest = after;
            continue;
        }

        match after.find('%') {
            Some(end) => {
                let name = &after[..end];
                match vars.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push('%');
                        out.push_str(name);
                        out.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // Unterminated candidate, e.g. "%HOME" at end of input.
                out.push('%');
                out.push_str(after);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}
