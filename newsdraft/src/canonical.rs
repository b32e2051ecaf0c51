use url::Url;

/// Query parameters left behind by search-result redirects and AMP links.
pub const TRACKING_PARAMS: [&str; 3] = ["ved", "usg", "amp"];

/// Strip tracking parameters from an article URL.
///
/// Only the query is touched: scheme, host, path and fragment are kept, and the
/// remaining parameters stay in their original order. Input without any
/// tracking parameter, or input that does not parse as a URL, is returned as-is.
pub fn canonicalize_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    let Some(query) = url.query() else {
        return raw.to_string();
    };

    // Segments are kept verbatim; only the key is decoded for the comparison.
    let segments: Vec<&str> = query.split('&').collect();
    if !segments.iter().any(|s| is_tracking_segment(s)) {
        return raw.to_string();
    }

    let kept = segments
        .iter()
        .copied()
        .filter(|s| !is_tracking_segment(s))
        .collect::<Vec<_>>()
        .join("&");

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&kept));
    }
    url.to_string()
}

fn is_tracking_segment(segment: &str) -> bool {
    let raw_key = segment.split('=').next().unwrap_or(segment);
    url::form_urlencoded::parse(raw_key.as_bytes())
        .next()
        .map(|(key, _)| TRACKING_PARAMS.contains(&&*key))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_params_and_keeps_order() {
        let url = "https://example.com/news/story?b=2&ved=abc&a=1&usg=xyz&c=3&amp=1#top";
        assert_eq!(
            canonicalize_url(url),
            "https://example.com/news/story?b=2&a=1&c=3#top"
        );
    }

    #[test]
    fn drops_question_mark_when_nothing_left() {
        let url = "https://example.com/a?ved=1&usg=2";
        assert_eq!(canonicalize_url(url), "https://example.com/a");
    }

    #[test]
    fn untouched_without_tracking_params() {
        let url = "https://Example.com/path?z=1&a=&x=hello%20world";
        assert_eq!(canonicalize_url(url), url);
    }

    #[test]
    fn keeps_blank_and_repeated_params() {
        let url = "https://example.com/?tag=a&ved=0&empty=&tag=b";
        assert_eq!(
            canonicalize_url(url),
            "https://example.com/?tag=a&empty=&tag=b"
        );
    }

    #[test]
    fn kept_params_are_not_reencoded() {
        assert_eq!(
            canonicalize_url("https://example.com/a?x=%FF&ved=1&y=%C3%A9"),
            "https://example.com/a?x=%FF&y=%C3%A9"
        );
        assert_eq!(
            canonicalize_url("https://example.com/a?flag&ved=1&q=a%20b"),
            "https://example.com/a?flag&q=a%20b"
        );
    }

    #[test]
    fn encoded_tracking_key_is_still_removed() {
        assert_eq!(
            canonicalize_url("https://example.com/a?%76ed=1&b=2"),
            "https://example.com/a?b=2"
        );
    }

    #[test]
    fn unparsable_input_is_returned_unchanged() {
        assert_eq!(canonicalize_url("not a url ?ved=1"), "not a url ?ved=1");
    }

    #[test]
    fn canonical_form_is_a_fixed_point() {
        let inputs = [
            "https://example.com/a?q=rust+lang&ved=1&page=2",
            "https://example.com/a?amp",
            "https://example.com/a?x=%26&usg=abc#frag",
            "https://example.com/plain",
        ];
        for input in inputs {
            let once = canonicalize_url(input);
            assert_eq!(canonicalize_url(&once), once, "not idempotent for {}", input);
            for param in TRACKING_PARAMS {
                let parsed = Url::parse(&once).expect("canonical url parses");
                assert!(parsed.query_pairs().all(|(k, _)| k != param));
            }
        }
    }
}
