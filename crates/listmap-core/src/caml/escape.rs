use super::{Formatter, ToCaml};

/// Text escaped for use in element content and single-quoted attributes.
pub(super) struct Escape<'a>(pub(super) &'a str);

impl ToCaml for Escape<'_> {
    fn to_caml(self, f: &mut Formatter<'_>) {
        for c in self.0.chars() {
            match c {
                '&' => f.dst.push_str("&amp;"),
                '<' => f.dst.push_str("&lt;"),
                '>' => f.dst.push_str("&gt;"),
                '\'' => f.dst.push_str("&apos;"),
                '"' => f.dst.push_str("&quot;"),
                c => f.dst.push(c),
            }
        }
    }
}
