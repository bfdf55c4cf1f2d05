//! The textual SAS/FDR parser.
//!
//! A single-pass line-oriented state machine over the `begin_X`/`end_X`
//! bracket tokens, reading one block at a time.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SasParseError {
    #[error("line {line}: expected `{expected}`, found `{found}`")]
    UnexpectedToken {
        line: usize,
        expected: &'static str,
        found: String,
    },
    #[error("unexpected end of file while reading {context}")]
    UnclosedBlock { context: &'static str },
    #[error("line {line}: missing field while reading {context}")]
    MissingField { line: usize, context: &'static str },
    #[error("line {line}: expected an integer, found `{token}`")]
    NotAnInteger { line: usize, token: String },
    #[error("duplicate `begin_{block}` block, only one is permitted")]
    DuplicateBlock { block: &'static str },
    #[error("missing required `begin_{block}` block")]
    MissingBlock { block: &'static str },
    #[error("could not read `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An effect `(var, pre, post)`; `pre` is `None` where the source file used
/// the `-1` sentinel for "no precondition contributed by this effect".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SasEffect {
    pub var: u32,
    pub pre: Option<u32>,
    pub post: u32,
}

#[derive(Debug, Clone)]
pub struct SasVariable {
    pub name: String,
    pub domain_size: u32,
    pub atoms: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SasOperator {
    pub name: String,
    pub prevail: Vec<(u32, u32)>,
    pub effects: Vec<SasEffect>,
    pub cost: u32,
}

#[derive(Debug, Clone)]
pub struct SasTask {
    pub version: i32,
    pub metric: i32,
    pub variables: Vec<SasVariable>,
    pub initial: Vec<u32>,
    pub goal: Vec<(u32, u32)>,
    pub operators: Vec<SasOperator>,
}

pub fn read_sas_file(path: impl AsRef<std::path::Path>) -> Result<SasTask, SasParseError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SasParseError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_sas(&text)
}

/// Splits a 1-based-line-numbered, blank-line-skipping scanner over the raw text.
struct Cursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor {
            lines: text.lines().collect(),
            pos: 0,
        }
    }

    /// Returns the next non-blank line without consuming it.
    fn peek(&mut self) -> Option<(usize, &'a str)> {
        while self.pos < self.lines.len() {
            let trimmed = self.lines[self.pos].trim();
            if trimmed.is_empty() {
                self.pos += 1;
                continue;
            }
            return Some((self.pos + 1, trimmed));
        }
        None
    }

    fn next(&mut self) -> Option<(usize, &'a str)> {
        let item = self.peek();
        if item.is_some() {
            self.pos += 1;
        }
        item
    }

    fn expect_tag(&mut self, tag: &'static str) -> Result<usize, SasParseError> {
        match self.next() {
            Some((line, found)) if found == tag => Ok(line),
            Some((line, found)) => Err(SasParseError::UnexpectedToken {
                line,
                expected: tag,
                found: found.to_string(),
            }),
            None => Err(SasParseError::UnclosedBlock { context: tag }),
        }
    }

    fn next_line(&mut self, context: &'static str) -> Result<(usize, &'a str), SasParseError> {
        self.next().ok_or(SasParseError::UnclosedBlock { context })
    }

    fn parse_int(line: usize, token: &str) -> Result<i64, SasParseError> {
        token.parse::<i64>().map_err(|_| SasParseError::NotAnInteger {
            line,
            token: token.to_string(),
        })
    }

    fn read_int(&mut self, context: &'static str) -> Result<i64, SasParseError> {
        let (line, text) = self.next_line(context)?;
        let token = text
            .split_whitespace()
            .next()
            .ok_or(SasParseError::MissingField { line, context })?;
        Self::parse_int(line, token)
    }

    fn read_n_ints(&mut self, n: usize, context: &'static str) -> Result<Vec<i64>, SasParseError> {
        let (line, text) = self.next_line(context)?;
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.len() < n {
            return Err(SasParseError::MissingField { line, context });
        }
        tokens[..n].iter().map(|t| Self::parse_int(line, t)).collect()
    }
}

pub fn parse_sas(text: &str) -> Result<SasTask, SasParseError> {
    let mut cur = Cursor::new(text);

    let mut version: Option<i32> = None;
    let mut metric: Option<i32> = None;
    let mut variables = Vec::new();
    let mut initial: Vec<u32> = Vec::new();
    let mut goal: Option<Vec<(u32, u32)>> = None;
    let mut operators = Vec::new();
    let mut seen_state = false;

    while let Some((line_no, tag)) = cur.peek() {
        match tag {
            "begin_version" => {
                if version.is_some() {
                    return Err(SasParseError::DuplicateBlock { block: "version" });
                }
                cur.next();
                let v = cur.read_int("version")?;
                cur.expect_tag("end_version")?;
                version = Some(v as i32);
            }
            "begin_metric" => {
                if metric.is_some() {
                    return Err(SasParseError::DuplicateBlock { block: "metric" });
                }
                cur.next();
                let m = cur.read_int("metric")?;
                cur.expect_tag("end_metric")?;
                metric = Some(m as i32);
            }
            "begin_variable" => {
                cur.next();
                let (_, name) = cur.next_line("variable name")?;
                let (dom_line, dom_text) = cur.next_line("variable domain")?;
                let domain_token = dom_text
                    .split_whitespace()
                    .last()
                    .ok_or(SasParseError::MissingField {
                        line: dom_line,
                        context: "variable domain",
                    })?;
                let domain_size = Cursor::parse_int(dom_line, domain_token)? as u32;
                let mut atoms = Vec::new();
                loop {
                    let (_, peeked) = cur.next_line("variable atoms")?;
                    if peeked == "end_variable" {
                        break;
                    }
                    atoms.push(peeked.to_string());
                }
                variables.push(SasVariable {
                    name: name.to_string(),
                    domain_size,
                    atoms,
                });
            }
            "begin_state" => {
                if seen_state {
                    return Err(SasParseError::DuplicateBlock { block: "state" });
                }
                seen_state = true;
                cur.next();
                loop {
                    let (peek_line, peeked) = cur.peek().ok_or(SasParseError::UnclosedBlock { context: "state" })?;
                    if peeked == "end_state" {
                        cur.next();
                        break;
                    }
                    cur.next();
                    for tok in peeked.split_whitespace() {
                        initial.push(Cursor::parse_int(peek_line, tok)? as u32);
                    }
                }
            }
            "begin_goal" => {
                if goal.is_some() {
                    return Err(SasParseError::DuplicateBlock { block: "goal" });
                }
                cur.next();
                let _count = cur.read_int("goal count")?; // count line is not load-bearing
                let mut pairs = Vec::new();
                loop {
                    let (_, peeked) = cur.peek().ok_or(SasParseError::UnclosedBlock { context: "goal" })?;
                    if peeked == "end_goal" {
                        cur.next();
                        break;
                    }
                    let ints = cur.read_n_ints(2, "goal pair")?;
                    pairs.push((ints[0] as u32, ints[1] as u32));
                }
                goal = Some(pairs);
            }
            "begin_operator" => {
                cur.next();
                let (_, name) = cur.next_line("operator name")?;
                let num_prevail = cur.read_int("operator prevail count")?;
                let mut prevail = Vec::with_capacity(num_prevail.max(0) as usize);
                for _ in 0..num_prevail {
                    let ints = cur.read_n_ints(2, "operator prevail condition")?;
                    prevail.push((ints[0] as u32, ints[1] as u32));
                }
                let num_effects = cur.read_int("operator effect count")?;
                let mut effects = Vec::with_capacity(num_effects.max(0) as usize);
                for _ in 0..num_effects {
                    let ints = cur.read_n_ints(4, "operator effect")?;
                    let pre = if ints[1] == -1 { None } else { Some(ints[1] as u32) };
                    effects.push(SasEffect {
                        var: ints[0] as u32,
                        pre,
                        post: ints[2] as u32,
                    });
                }
                let cost = cur.read_int("operator cost")?;
                cur.expect_tag("end_operator")?;
                operators.push(SasOperator {
                    name: name.to_string(),
                    prevail,
                    effects,
                    cost: cost as u32,
                });
            }
            other => {
                return Err(SasParseError::UnexpectedToken {
                    line: line_no,
                    expected: "a `begin_...` block",
                    found: other.to_string(),
                });
            }
        }
    }

    Ok(SasTask {
        version: version.ok_or(SasParseError::MissingBlock { block: "version" })?,
        metric: metric.ok_or(SasParseError::MissingBlock { block: "metric" })?,
        variables,
        initial: {
            if !seen_state {
                return Err(SasParseError::MissingBlock { block: "state" });
            }
            initial
        },
        goal: goal.ok_or(SasParseError::MissingBlock { block: "goal" })?,
        operators,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIVIAL: &str = "\
begin_version
3
end_version
begin_metric
0
end_metric
begin_variable
var0
-1 2
atom0
atom1
end_variable
begin_state
0
end_state
begin_goal
1
0 1
end_goal
begin_operator
move
0
1
0 0 1 0
5
end_operator
";

    #[test]
    fn parses_a_minimal_task() {
        let task = parse_sas(TRIVIAL).unwrap();
        assert_eq!(task.version, 3);
        assert_eq!(task.metric, 0);
        assert_eq!(task.variables.len(), 1);
        assert_eq!(task.variables[0].domain_size, 2);
        assert_eq!(task.initial, vec![0]);
        assert_eq!(task.goal, vec![(0, 1)]);
        assert_eq!(task.operators.len(), 1);
        let op = &task.operators[0];
        assert_eq!(op.name, "move");
        assert!(op.prevail.is_empty());
        assert_eq!(op.effects.len(), 1);
        assert_eq!(op.effects[0], SasEffect { var: 0, pre: Some(0), post: 1 });
        assert_eq!(op.cost, 5);
    }

    #[test]
    fn blank_lines_inside_blocks_are_ignored() {
        let with_blanks = TRIVIAL.replace("end_metric\n", "end_metric\n\n\n");
        let task = parse_sas(&with_blanks).unwrap();
        assert_eq!(task.operators.len(), 1);
    }

    #[test]
    fn missing_goal_block_is_an_error() {
        let truncated = TRIVIAL.split("begin_goal").next().unwrap();
        let err = parse_sas(truncated).unwrap_err();
        assert!(matches!(err, SasParseError::MissingBlock { block: "goal" }));
    }

    #[test]
    fn non_integer_token_is_reported() {
        let broken = TRIVIAL.replace("0 0 1 0", "0 0 one 0");
        let err = parse_sas(&broken).unwrap_err();
        assert!(matches!(err, SasParseError::NotAnInteger { .. }));
    }
}
