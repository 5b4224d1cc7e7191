// ANSI SGR escape codes to inline HTML, for rendering coloured backend logs.
//
// Each style code opens a tag, reset closes everything, and every tag still open
// at the end of a line is closed, so lines can be rendered independently.

use std::fmt::Write;

const PALETTE: [&str; 16] = [
    "#000", "#A00", "#0A0", "#A50", "#00A", "#A0A", "#0AA", "#AAA", "#555", "#F55", "#5F5",
    "#FF5", "#55F", "#F5F", "#5FF", "#FFF",
];

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tag {
    Bold,
    Italic,
    Underline,
    Span(String),
}

impl Tag {
    fn open(&self, out: &mut String) {
        match self {
            Tag::Bold => out.push_str("<b>"),
            Tag::Italic => out.push_str("<i>"),
            Tag::Underline => out.push_str("<u>"),
            Tag::Span(style) => {
                let _ = write!(out, "<span style=\"{style}\">");
            }
        }
    }

    fn close(&self, out: &mut String) {
        out.push_str(match self {
            Tag::Bold => "</b>",
            Tag::Italic => "</i>",
            Tag::Underline => "</u>",
            Tag::Span(_) => "</span>",
        });
    }
}

/// Converts one log line at a time; no state carries over between lines.
#[derive(Debug, Clone)]
pub struct AnsiConverter {
    fg: String,
    bg: String,
}

impl Default for AnsiConverter {
    fn default() -> Self {
        Self::new("#FFF", "#000")
    }
}

impl AnsiConverter {
    /// `fg`/`bg` are the colours restored by codes 39 and 49.
    pub fn new(fg: impl Into<String>, bg: impl Into<String>) -> Self {
        Self {
            fg: fg.into(),
            bg: bg.into(),
        }
    }

    pub fn to_html(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut stack: Vec<Tag> = Vec::new();
        let mut chars = input.chars().peekable();

        while let Some(c) = chars.next() {
            if c != '\x1b' {
                out.push(c);
                continue;
            }
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    let mut params = String::new();
                    let mut terminator = None;
                    for c in chars.by_ref() {
                        if ('@'..='~').contains(&c) {
                            terminator = Some(c);
                            break;
                        }
                        params.push(c);
                    }
                    if terminator == Some('m') {
                        self.apply_sgr(&params, &mut stack, &mut out);
                    }
                }
                Some(&next) if ('@'..='_').contains(&next) => {
                    chars.next();
                }
                _ => {}
            }
        }

        close_all(&mut stack, &mut out);
        out
    }

    fn apply_sgr(&self, params: &str, stack: &mut Vec<Tag>, out: &mut String) {
        let codes: Vec<u32> = if params.is_empty() {
            vec![0]
        } else {
            // An empty parameter means 0; anything unparseable is ignored.
            params
                .split(';')
                .filter_map(|p| if p.is_empty() { Some(0) } else { p.parse().ok() })
                .collect()
        };

        let mut i = 0;
        while i < codes.len() {
            let code = codes[i];
            i += 1;
            match code {
                0 => close_all(stack, out),
                1 => push(stack, out, Tag::Bold),
                2 => push(stack, out, Tag::Span("opacity:0.5".into())),
                3 => push(stack, out, Tag::Italic),
                4 => push(stack, out, Tag::Underline),
                22 => {
                    close_tag(stack, out, |t| *t == Tag::Bold);
                    close_tag(stack, out, |t| matches!(t, Tag::Span(s) if s == "opacity:0.5"));
                }
                23 => close_tag(stack, out, |t| *t == Tag::Italic),
                24 => close_tag(stack, out, |t| *t == Tag::Underline),
                30..=37 => push_color(stack, out, "color", PALETTE[(code - 30) as usize]),
                90..=97 => push_color(stack, out, "color", PALETTE[(code - 90 + 8) as usize]),
                40..=47 => {
                    push_color(stack, out, "background-color", PALETTE[(code - 40) as usize])
                }
                100..=107 => push_color(
                    stack,
                    out,
                    "background-color",
                    PALETTE[(code - 100 + 8) as usize],
                ),
                39 => push_color(stack, out, "color", &self.fg),
                49 => push_color(stack, out, "background-color", &self.bg),
                38 | 48 => {
                    let property = if code == 38 { "color" } else { "background-color" };
                    match codes.get(i) {
                        Some(5) => {
                            if let Some(&n) = codes.get(i + 1) {
                                push_color(stack, out, property, &xterm_color(n));
                            }
                            i += 2;
                        }
                        Some(2) => {
                            if let (Some(&r), Some(&g), Some(&b)) =
                                (codes.get(i + 1), codes.get(i + 2), codes.get(i + 3))
                            {
                                let color = format!(
                                    "#{:02x}{:02x}{:02x}",
                                    r.min(255),
                                    g.min(255),
                                    b.min(255)
                                );
                                push_color(stack, out, property, &color);
                            }
                            i += 4;
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }
}

fn push(stack: &mut Vec<Tag>, out: &mut String, tag: Tag) {
    tag.open(out);
    stack.push(tag);
}

fn push_color(stack: &mut Vec<Tag>, out: &mut String, property: &str, color: &str) {
    push(stack, out, Tag::Span(format!("{property}:{color}")));
}

fn close_all(stack: &mut Vec<Tag>, out: &mut String) {
    while let Some(tag) = stack.pop() {
        tag.close(out);
    }
}

/// Close the innermost tag matching `pred`, reopening the tags nested inside it.
fn close_tag(stack: &mut Vec<Tag>, out: &mut String, pred: impl Fn(&Tag) -> bool) {
    let Some(pos) = stack.iter().rposition(pred) else {
        return;
    };
    let inner: Vec<Tag> = stack.drain(pos + 1..).collect();
    for tag in inner.iter().rev() {
        tag.close(out);
    }
    if let Some(tag) = stack.pop() {
        tag.close(out);
    }
    for tag in inner {
        push(stack, out, tag);
    }
}

/// 256-colour palette entry as CSS.
fn xterm_color(n: u32) -> String {
    match n {
        0..=15 => PALETTE[n as usize].to_string(),
        16..=231 => {
            let n = n - 16;
            let r = CUBE_LEVELS[(n / 36) as usize];
            let g = CUBE_LEVELS[((n % 36) / 6) as usize];
            let b = CUBE_LEVELS[(n % 6) as usize];
            format!("#{r:02x}{g:02x}{b:02x}")
        }
        232..=255 => {
            let level = (8 + (n - 232) * 10) as u8;
            format!("#{level:02x}{level:02x}{level:02x}")
        }
        _ => PALETTE[15].to_string(),
    }
}
