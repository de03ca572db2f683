//! HTML entity decoding for catalog names.
//!
//! The raw catalog encodes names the way they came off the web, e.g.
//! `&quot;Bungaku Shoujo&quot;` or `Shakugan no Shana-tan Returns &#039;`.
//! Only the named entities that actually occur plus the numeric forms are
//! handled; an unrecognized entity passes through verbatim.

/// Decode HTML entities in `s`.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        // Entity bodies are short; a far-away ';' means a bare ampersand.
        match rest[1..].find(';') {
            Some(len) if len <= 8 => match decode_entity(&rest[1..1 + len]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &rest[len + 2..];
                }
                None => {
                    out.push('&');
                    rest = &rest[1..];
                }
            },
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(body: &str) -> Option<char> {
    match body {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let num = body.strip_prefix('#')?;
            let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse::<u32>().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entities() {
        assert_eq!(
            decode_entities("&quot;Bungaku Shoujo&quot; Memoire"),
            "\"Bungaku Shoujo\" Memoire"
        );
        assert_eq!(decode_entities("Fate/stay night &amp; Zero"), "Fate/stay night & Zero");
    }

    #[test]
    fn test_numeric_entities() {
        assert_eq!(decode_entities("Shana-tan &#039;09"), "Shana-tan '09");
        assert_eq!(decode_entities("&#x26;"), "&");
    }

    #[test]
    fn test_passthrough() {
        assert_eq!(decode_entities("Cowboy Bebop"), "Cowboy Bebop");
        assert_eq!(decode_entities("Dungeons & Dragons"), "Dungeons & Dragons");
        assert_eq!(decode_entities("&notanentity;"), "&notanentity;");
    }

    #[test]
    fn test_trailing_ampersand() {
        assert_eq!(decode_entities("A &"), "A &");
    }
}
