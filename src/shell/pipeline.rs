use std::fmt;

const SEPARATORS: [char; 2] = [' ', '\t'];

/// One stage of a pipeline: a program or built-in with its arguments and
/// stream redirections.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub args: Vec<String>,
    pub background: bool,
    pub autocomplete_requested: bool,
    pub redirect_in: Option<String>,
    pub redirect_out_truncate: Option<String>,
    pub redirect_out_append: Option<String>,
    pub next: Option<Box<Stage>>,
}

impl Stage {
    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    fn accept(&mut self, token: String) {
        if self.name.is_empty() {
            self.name = token;
        } else {
            self.args.push(token);
        }
    }
}

/// A parsed input line: a non-empty chain of stages linked through `next`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    head: Stage,
}

impl Pipeline {
    pub fn parse(line: &str) -> Self {
        let mut line = line.trim_matches(SEPARATORS);

        let mut background = false;
        let mut autocomplete = false;
        if let Some(rest) = line.strip_suffix('?') {
            autocomplete = true;
            line = rest;
        } else if let Some(rest) = line.strip_suffix('&') {
            background = true;
            line = rest;
        }

        let mut stages = vec![Stage::default()];
        let mut tokens = tokenize(line).into_iter();

        while let Some(token) = tokens.next() {
            if token == "|" {
                stages.push(Stage::default());
                continue;
            }
            // Background is decided from the end of the line only
            if token == "&" {
                continue;
            }

            let Some(current) = stages.last_mut() else {
                break;
            };
            if let Some(rest) = token.strip_prefix(">>") {
                current.redirect_out_append = Some(redirect_target(rest, &mut tokens));
            } else if let Some(rest) = token.strip_prefix('>') {
                current.redirect_out_truncate = Some(redirect_target(rest, &mut tokens));
            } else if let Some(rest) = token.strip_prefix('<') {
                current.redirect_in = Some(redirect_target(rest, &mut tokens));
            } else {
                current.accept(strip_quotes(token));
            }
        }

        if let Some(last) = stages.last_mut() {
            last.background = background;
            last.autocomplete_requested = autocomplete;
        }

        let head = stages
            .into_iter()
            .rev()
            .reduce(|next, mut stage| {
                stage.next = Some(Box::new(next));
                stage
            })
            .unwrap_or_default();

        Pipeline { head }
    }

    pub fn head(&self) -> &Stage {
        &self.head
    }

    pub fn stages(&self) -> Stages<'_> {
        Stages {
            current: Some(&self.head),
        }
    }

    pub fn len(&self) -> usize {
        self.stages().count()
    }

    /// True for a blank line, which parses to a single stage with no name.
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.head.next.is_none()
    }

    pub fn last(&self) -> &Stage {
        self.stages().last().unwrap_or(&self.head)
    }

    pub fn is_background(&self) -> bool {
        self.last().background
    }

    pub fn wants_autocomplete(&self) -> bool {
        self.last().autocomplete_requested
    }

    pub fn has_empty_stage(&self) -> bool {
        self.stages().any(Stage::is_empty)
    }
}

pub struct Stages<'a> {
    current: Option<&'a Stage>,
}

impl<'a> Iterator for Stages<'a> {
    type Item = &'a Stage;

    fn next(&mut self) -> Option<Self::Item> {
        let stage = self.current?;
        self.current = stage.next.as_deref();
        Some(stage)
    }
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages().enumerate() {
            writeln!(f, "{:indent$}Command: <{}>", "", stage.name, indent = i * 2)?;
            writeln!(f, "{:indent$}  background: {}", "", stage.background, indent = i * 2)?;
            writeln!(
                f,
                "{:indent$}  auto-complete: {}",
                "",
                stage.autocomplete_requested,
                indent = i * 2
            )?;
            let redirects = [
                ("<", &stage.redirect_in),
                (">", &stage.redirect_out_truncate),
                (">>", &stage.redirect_out_append),
            ];
            for (op, target) in redirects {
                if let Some(target) = target {
                    writeln!(f, "{:indent$}  {} {}", "", op, target, indent = i * 2)?;
                }
            }
            writeln!(f, "{:indent$}  args ({}): {:?}", "", stage.arg_count(), stage.args, indent = i * 2)?;
            if let Some(next) = &stage.next {
                writeln!(f, "{:indent$}  piped to: <{}>", "", next.name, indent = i * 2)?;
            }
        }
        Ok(())
    }
}

/// Splits on runs of spaces and tabs. Whitespace inside a single- or
/// double-quoted region stays in its token; the quotes are kept.
fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => {
                quote = None;
                current.push(c);
            }
            Some(_) => current.push(c),
            None if SEPARATORS.contains(&c) => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            None => {
                if c == '"' || c == '\'' {
                    quote = Some(c);
                }
                current.push(c);
            }
        }
    }

    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn redirect_target(inline: &str, tokens: &mut impl Iterator<Item = String>) -> String {
    if inline.is_empty() {
        tokens.next().map(strip_quotes).unwrap_or_default()
    } else {
        strip_quotes(inline.to_string())
    }
}

fn strip_quotes(token: String) -> String {
    let bytes = token.as_bytes();
    let len = bytes.len();
    if len > 2 && (bytes[0] == b'"' || bytes[0] == b'\'') && bytes[len - 1] == bytes[0] {
        token[1..len - 1].to_string()
    } else {
        token
    }
}
