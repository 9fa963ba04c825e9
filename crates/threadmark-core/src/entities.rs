use std::borrow::Cow;

// `&nbsp;` maps to a plain space so decoded text compares equal to what users typed.
const ENTITIES: &[(&str, &str)] = &[
    ("gt", ">"),
    ("lt", "<"),
    ("amp", "&"),
    ("quot", "\""),
    ("#39", "'"),
    ("apos", "'"),
    ("nbsp", " "),
];

/// Returns the replacement for an entity name (the part between `&` and `;`).
pub fn lookup_entity(name: &str) -> Option<&'static str> {
    ENTITIES
        .iter()
        .find(|(entity, _)| *entity == name)
        .map(|(_, decoded)| *decoded)
}

/// Reverses the HTML escaping chat platforms apply to message text.
///
/// Single left-to-right pass: output of one replacement is never rescanned, so
/// `&amp;gt;` becomes `&gt;`. Unknown `&...;` sequences are copied through.
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    let Some(first) = text.find('&') else {
        return Cow::Borrowed(text);
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    let mut pos = first;
    while let Some(offset) = text[pos..].find('&') {
        let amp = pos + offset;
        match match_entity(text, amp) {
            Some((decoded, end)) => {
                out.push_str(&text[last..amp]);
                out.push_str(decoded);
                last = end;
                pos = end;
            }
            None => pos = amp + 1,
        }
    }

    if last == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[last..]);
    Cow::Owned(out)
}

fn match_entity(text: &str, amp: usize) -> Option<(&'static str, usize)> {
    let rest = &text[amp + 1..];
    // Longest known name is four bytes.
    let semi = rest.bytes().take(5).position(|b| b == b';')?;
    let decoded = lookup_entity(&rest[..semi])?;
    Some((decoded, amp + 1 + semi + 1))
}

#[cfg(test)]
mod tests {
    use super::{decode_entities, lookup_entity};
    use std::borrow::Cow;

    #[test]
    fn decodes_every_known_entity() {
        assert_eq!(
            decode_entities("&gt;&lt;&amp;&quot;&#39;&apos;&nbsp;"),
            "><&\"'' "
        );
    }

    #[test]
    fn unknown_entities_pass_through() {
        assert_eq!(decode_entities("&copy; &#40; &gt"), "&copy; &#40; &gt");
        assert_eq!(decode_entities("a & b"), "a & b");
        assert_eq!(decode_entities("&&gt;"), "&>");
    }

    #[test]
    fn single_pass_does_not_rescan_output() {
        assert_eq!(decode_entities("&amp;gt;"), "&gt;");
        assert_eq!(decode_entities(&decode_entities("&amp;gt;")), ">");
    }

    #[test]
    fn borrows_when_nothing_changes() {
        assert!(matches!(decode_entities("plain text"), Cow::Borrowed(_)));
        assert!(matches!(decode_entities("a & b;"), Cow::Borrowed(_)));
        assert!(matches!(decode_entities("1 &lt; 2"), Cow::Owned(_)));
    }

    #[test]
    fn decoded_text_without_entities_is_a_fixed_point() {
        let once = decode_entities("if a &lt; b &amp;&amp; c &gt; d").into_owned();
        assert_eq!(once, "if a < b && c > d");
        assert_eq!(decode_entities(&once), once);
    }

    #[test]
    fn lookup_covers_both_apostrophe_forms() {
        assert_eq!(lookup_entity("#39"), Some("'"));
        assert_eq!(lookup_entity("apos"), Some("'"));
        assert_eq!(lookup_entity("copy"), None);
    }

    #[test]
    fn handles_multibyte_neighbours() {
        assert_eq!(decode_entities("日本&amp;語"), "日本&語");
        assert_eq!(decode_entities("&日本;"), "&日本;");
    }
}
