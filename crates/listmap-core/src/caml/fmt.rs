use super::Formatter;

macro_rules! fmt {
    ($f:expr, $( $fragments:expr )*) => {{
        $(
            $fragments.to_caml($f);
        )*
    }};
}

pub(super) trait ToCaml {
    fn to_caml(self, f: &mut Formatter<'_>);
}

impl ToCaml for &str {
    fn to_caml(self, f: &mut Formatter<'_>) {
        f.dst.push_str(self);
    }
}

impl ToCaml for usize {
    fn to_caml(self, f: &mut Formatter<'_>) {
        f.dst.push_str(&self.to_string());
    }
}

impl Formatter<'_> {
    pub(super) fn fail(&mut self, err: crate::Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
