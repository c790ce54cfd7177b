//! Name and path-segment helpers shared by the tree builder, the decoder and
//! the encoder.
//!
//! Two rules hold everywhere in the crate:
//!
//! - Names compare case-insensitively ([`eq_fold`]). Environment variables
//!   are upper-case, flags are usually camelCase, file keys are whatever the
//!   author typed.
//! - A segment spelled `[N]` is an index, never a name. Bare integers and the
//!   `name[N]` suffix form are normalized to it by [`split_segment`].

use std::borrow::Cow;

use crate::shape::{Configurable, ShapeRef};

/// Stands in for "any key" when a mapping is documented rather than decoded.
pub const MAP_NAME_PLACEHOLDER: &str = "<NAME>";

/// Stands in for "any index" when a sequence of records is documented.
pub const SEQUENCE_INDEX_PLACEHOLDER: &str = "<N>";

/// Separator used to split a single leaf value into sequence elements.
pub const SEQUENCE_SEPARATOR: char = ',';

/// Largest sequence the decoder will grow. An index at or past this is a
/// decode error rather than an allocation.
pub const MAX_SEQUENCE_LEN: usize = 1 << 16;

/// Unicode-aware case-insensitive equality.
pub fn eq_fold(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive prefix test.
pub fn starts_with_fold(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.is_char_boundary(prefix.len()) && eq_fold(&s[..prefix.len()], prefix)
}

/// Parse an index segment (`[3]` → `Some(3)`).
pub fn index_of(segment: &str) -> Option<usize> {
    let digits = segment.strip_prefix('[')?.strip_suffix(']')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Render an index segment (`3` → `[3]`).
pub fn index_name(index: usize) -> String {
    format!("[{index}]")
}

/// Normalize one raw path segment into one or more tree segments.
///
/// - `foo` → `["foo"]`
/// - `0` and `[0]` → `["[0]"]`
/// - `foo[0][1]` → `["foo", "[0]", "[1]"]`
///
/// The error string explains what is malformed; callers attach the full path.
pub fn split_segment(raw: &str) -> Result<Vec<String>, String> {
    if raw.is_empty() {
        return Err("empty segment".into());
    }
    if raw.bytes().all(|b| b.is_ascii_digit()) {
        let index = parse_index(raw)?;
        return Ok(vec![index_name(index)]);
    }

    let (head, mut rest) = match raw.find('[') {
        Some(at) => (&raw[..at], &raw[at..]),
        None => (raw, ""),
    };
    if head.contains(']') {
        return Err(format!("unmatched ']' in segment '{raw}'"));
    }

    let mut out = Vec::new();
    if !head.is_empty() {
        out.push(head.to_string());
    }
    while !rest.is_empty() {
        let Some(open) = rest.strip_prefix('[') else {
            return Err(format!("unexpected '{rest}' after index in segment '{raw}'"));
        };
        let Some(close) = open.find(']') else {
            return Err(format!("unmatched '[' in segment '{raw}'"));
        };
        let index = parse_index(&open[..close])?;
        out.push(index_name(index));
        rest = &open[close + 1..];
    }
    Ok(out)
}

fn parse_index(digits: &str) -> Result<usize, String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("index '{digits}' is not a non-negative integer"));
    }
    digits
        .parse()
        .map_err(|e| format!("index '{digits}' is out of range: {e}"))
}

/// Convert a Rust field identifier to its canonical config name.
///
/// `disable_epsv` → `disableEpsv`, `host` → `host`, `r#type` → `type`.
pub fn camel_case(ident: &str) -> Cow<'_, str> {
    let ident = ident.strip_prefix("r#").unwrap_or(ident);
    let trimmed = ident.trim_start_matches('_');
    if !trimmed.contains('_') {
        return Cow::Borrowed(trimmed);
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut upper_next = false;
    for c in trimmed.chars() {
        if c == '_' {
            upper_next = !out.is_empty();
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Top-level names a source must start with to matter to `value`.
///
/// Each non-ignored field of the root record yields `{prefix}{NAME}`,
/// upper-cased the way the env encoder spells it. Flattened fields
/// contribute their own fields instead. Optional roots are looked through;
/// non-record roots have no prefixes.
pub fn root_prefixes(value: &dyn Configurable, prefix: &str) -> Vec<String> {
    field_names(value)
        .into_iter()
        .map(|name| format!("{prefix}{}", name.to_uppercase()))
        .collect()
}

/// Config names of the fields addressable directly below `value`, with
/// flattened fields replaced by their own fields.
pub(crate) fn field_names(value: &dyn Configurable) -> Vec<String> {
    match value.shape() {
        ShapeRef::Record(record) => {
            let mut names = Vec::new();
            for (i, field) in record.fields().iter().enumerate() {
                if field.is_ignored() {
                    continue;
                }
                match record.field(i) {
                    Some(inner) if field.is_flattened() => names.extend(field_names(inner)),
                    _ => names.push(field.config_name().into_owned()),
                }
            }
            names
        }
        ShapeRef::Optional(optional) => match optional.get() {
            Some(inner) => field_names(inner),
            None => field_names(optional.placeholder().as_ref()),
        },
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{Base, Embedded, EmbeddedOpt, Ignored, Yo};

    #[test]
    fn eq_fold_ignores_case() {
        assert!(eq_fold("Foo", "fOO"));
        assert!(eq_fold("ÉTÉ", "été"));
        assert!(!eq_fold("foo", "food"));
    }

    #[test]
    fn starts_with_fold_matches_prefix() {
        assert!(starts_with_fold("TREEFIG_FII01", "treefig_fii"));
        assert!(!starts_with_fold("TREEFIG", "treefig_"));
    }

    #[test]
    fn index_round_trip() {
        assert_eq!(index_of("[12]"), Some(12));
        assert_eq!(index_of(&index_name(4)), Some(4));
        assert_eq!(index_of("12"), None);
        assert_eq!(index_of("[]"), None);
        assert_eq!(index_of("[a]"), None);
    }

    #[test]
    fn split_plain_name() {
        assert_eq!(split_segment("foo").unwrap(), vec!["foo"]);
    }

    #[test]
    fn split_bare_integer_becomes_index() {
        assert_eq!(split_segment("0").unwrap(), vec!["[0]"]);
        assert_eq!(split_segment("007").unwrap(), vec!["[7]"]);
    }

    #[test]
    fn split_suffix_indexes() {
        assert_eq!(split_segment("aaa[0]").unwrap(), vec!["aaa", "[0]"]);
        assert_eq!(split_segment("aaa[0][1]").unwrap(), vec!["aaa", "[0]", "[1]"]);
        assert_eq!(split_segment("[3]").unwrap(), vec!["[3]"]);
    }

    #[test]
    fn split_rejects_malformed() {
        assert!(split_segment("").is_err());
        assert!(split_segment("aaa[0").is_err());
        assert!(split_segment("aaa]").is_err());
        assert!(split_segment("aaa[x]").is_err());
        assert!(split_segment("aaa[]").is_err());
        assert!(split_segment("aaa[0]b").is_err());
    }

    #[test]
    fn camel_case_conversion() {
        assert_eq!(camel_case("host"), "host");
        assert_eq!(camel_case("disable_epsv"), "disableEpsv");
        assert_eq!(camel_case("insecure_skip_verify"), "insecureSkipVerify");
        assert_eq!(camel_case("r#type"), "type");
        assert_eq!(camel_case("_private_field"), "privateField");
    }

    #[test]
    fn root_prefixes_of_simple_fields() {
        let names = root_prefixes(&Yo::default(), "TREEFIG_");
        assert_eq!(
            names,
            vec!["TREEFIG_FOO", "TREEFIG_FII", "TREEFIG_FUU", "TREEFIG_YI", "TREEFIG_YU"]
        );
    }

    #[test]
    fn root_prefixes_skip_ignored_fields() {
        let names = root_prefixes(&Ignored::default(), "TREEFIG_");
        assert!(names.is_empty());
    }

    #[test]
    fn root_prefixes_look_through_optional_root() {
        let root: Option<Yo> = None;
        assert_eq!(root_prefixes(&root, "X_").len(), 5);
        assert!(root_prefixes(&String::new(), "X_").is_empty());
    }

    #[test]
    fn root_prefixes_promote_flattened_fields() {
        assert_eq!(
            root_prefixes(&Embedded::default(), "TREEFIG_"),
            vec!["TREEFIG_FOO", "TREEFIG_FII", "TREEFIG_FUU", "TREEFIG_NAME"]
        );
        assert_eq!(
            root_prefixes(&EmbeddedOpt::default(), "TREEFIG_"),
            vec!["TREEFIG_FOO", "TREEFIG_FII", "TREEFIG_FUU"]
        );
        assert_eq!(root_prefixes(&Base::default(), "TREEFIG_").len(), 3);
    }
}
