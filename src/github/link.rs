//! Parsing of the `Link` response header.

/// Returns true when any entry of a `Link` header carries the `last` relation.
///
/// Entries look like `<https://api.github.com/...?page=3>; rel="last"`. The
/// `rel` value may be quoted or bare and may list several space-separated
/// relation types.
pub fn has_last_relation(header: &str) -> bool {
    header.split(',').any(|entry| {
        entry.split(';').skip(1).any(|param| {
            let Some((key, value)) = param.split_once('=') else {
                return false;
            };
            if !key.trim().eq_ignore_ascii_case("rel") {
                return false;
            }
            value
                .trim()
                .trim_matches('"')
                .split_ascii_whitespace()
                .any(|rel| rel.eq_ignore_ascii_case("last"))
        })
    })
}
