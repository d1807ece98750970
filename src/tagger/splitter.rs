use std::borrow::Cow;

/// Row-splitting strategy turning one data line into ordered string fields.
///
/// `Naive` splits on every comma and borrows straight from the line — fast,
/// but wrong for fields containing quoted commas. `Quoted` understands
/// double-quoted fields with `""` escapes at the cost of allocating. Both
/// feed the matcher the same shape of data, so they are interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitStrategy {
    #[default]
    Naive,
    Quoted,
}

impl SplitStrategy {
    /// Splits `line` into `out`. Callers can reuse the buffer between rows.
    pub fn split_into<'a>(&self, line: &'a str, out: &mut Vec<Cow<'a, str>>) {
        match self {
            SplitStrategy::Naive => out.extend(line.split(',').map(Cow::Borrowed)),
            SplitStrategy::Quoted => {
                let mut field = String::new();
                let mut in_quotes = false;
                let mut chars = line.chars().peekable();

                while let Some(c) = chars.next() {
                    match c {
                        '"' if in_quotes => {
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                field.push('"');
                            } else {
                                in_quotes = false;
                            }
                        }
                        '"' => in_quotes = true,
                        ',' if !in_quotes => out.push(Cow::Owned(std::mem::take(&mut field))),
                        _ => field.push(c),
                    }
                }

                out.push(Cow::Owned(field));
            }
        }
    }

    pub fn split<'a>(&self, line: &'a str) -> Vec<Cow<'a, str>> {
        let mut out = Vec::new();
        self.split_into(line, &mut out);
        out
    }
}
