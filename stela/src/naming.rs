//! The naming convention mapping type and field names to table and column
//! names: `UserAccount` becomes `user_account`.

/// Convert a camel-cased type or field name to its snake-cased table or
/// column name.
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
