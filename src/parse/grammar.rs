use winnow::combinator::{cut_err, delimited, repeat, separated};
use winnow::error::{ModalResult, StrContext, StrContextValue};
use winnow::prelude::*;
use winnow::token::take_while;

use super::path::{Path, Segment};

// -- Segments ---------------------------------------------------------------

fn index(input: &mut &str) -> ModalResult<usize> {
    take_while(1.., |c: char| c.is_ascii_digit())
        .try_map(|s: &str| s.parse::<usize>())
        .context(StrContext::Expected(StrContextValue::Description("index")))
        .parse_next(input)
}

fn bracket_index(input: &mut &str) -> ModalResult<usize> {
    delimited('[', cut_err(index), cut_err(']')).parse_next(input)
}

/// A bare segment of digits is an index; anything else is a key.
fn classify(raw: &str) -> Segment {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Segment::Key(raw.to_owned());
    }
    match raw.parse::<usize>() {
        Ok(i) => Segment::Index(i),
        Err(_) => Segment::Key(raw.to_owned()),
    }
}

fn segment(input: &mut &str) -> ModalResult<Vec<Segment>> {
    let head = take_while(1.., |c: char| !matches!(c, '.' | '[' | ']'))
        .context(StrContext::Expected(StrContextValue::Description(
            "path segment",
        )))
        .parse_next(input)?;
    let suffixes: Vec<usize> = repeat(0.., bracket_index).parse_next(input)?;

    let mut out = Vec::with_capacity(1 + suffixes.len());
    out.push(classify(head));
    out.extend(suffixes.into_iter().map(Segment::Index));
    Ok(out)
}

// -- Top-level parser -------------------------------------------------------

pub fn parse_path(input: &mut &str) -> ModalResult<Path> {
    let groups: Vec<Vec<Segment>> = separated(1.., segment, '.').parse_next(input)?;
    Ok(Path::from_segments(groups.into_iter().flatten().collect()))
}

#[cfg(test)]
mod tests {
    use crate::parse::parse;

    use super::*;

    fn key(s: &str) -> Segment {
        Segment::Key(s.to_owned())
    }

    #[test]
    fn parse_single_key() {
        let path = parse("name").unwrap();
        assert_eq!(path.segments(), &[key("name")]);
    }

    #[test]
    fn parse_dotted_keys() {
        let path = parse("rules_v2023_01_05.0.name").unwrap();
        assert_eq!(
            path.segments(),
            &[key("rules_v2023_01_05"), Segment::Index(0), key("name")]
        );
    }

    #[test]
    fn parse_bracket_indices() {
        let path = parse("behavior[2].cache[0]").unwrap();
        assert_eq!(
            path.segments(),
            &[
                key("behavior"),
                Segment::Index(2),
                key("cache"),
                Segment::Index(0)
            ]
        );
    }

    #[test]
    fn bracket_and_dotted_forms_agree() {
        assert_eq!(
            parse("behavior[2].cache[0]").unwrap(),
            parse("behavior.2.cache.0").unwrap()
        );
    }

    #[test]
    fn keys_may_contain_dashes_and_digits() {
        let path = parse("v2023-01-05.edge_ttl2").unwrap();
        assert_eq!(path.segments(), &[key("v2023-01-05"), key("edge_ttl2")]);
    }

    #[test]
    fn digit_segments_classify_as_index_or_key() {
        assert_eq!(classify("12"), Segment::Index(12));
        assert_eq!(classify("1a"), key("1a"));
        // Too large for usize, so it stays a map key.
        let huge = "99999999999999999999999999";
        assert_eq!(classify(huge), key(huge));
    }

    #[test]
    fn reject_empty_path() {
        assert!(parse("").is_err());
    }

    #[test]
    fn reject_empty_segment() {
        assert!(parse("a..b").is_err());
        assert!(parse("a.").is_err());
    }

    #[test]
    fn reject_unclosed_bracket() {
        assert!(parse("a[0").is_err());
        assert!(parse("a[x]").is_err());
    }
}
