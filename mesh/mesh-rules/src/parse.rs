//! Line-oriented text format for external rule sets.
//!
//! The format is deliberately minimal: one keyword-led entry per line,
//! whitespace-separated tokens, `#` comments. Template point references are
//! 1-based; new-point references are written `n1`, `n2`, ...
//!
//! ```text
//! rule "free triangle"
//! tolerance 1
//! point 0 0 tol 0.5
//! point 1 0 tol 0.5
//! line 1 2 del
//! newpoint 0.5 0.866
//! element 1 2 n1
//! newline 1 n1
//! newline n1 2
//! freezone 0 0  1 0  1.4 0.7  0.5 1.6  -0.4 0.7
//! freezonelimit 0 0  1 0  1.05 0.5  0.5 1.0  -0.05 0.5
//! endrule
//! ```
//!
//! `freezonelimit` may be omitted; the strict free zone is then used at
//! every tolerance level. Rules are validated on `endrule`.

use nalgebra::Point2;
use smallvec::SmallVec;

use crate::error::RuleParseError;
use crate::rule::{MeshRule, PointRef, RuleElement};

/// Parse a rule set from the text format.
///
/// # Errors
///
/// Returns a [`RuleParseError`] with the 1-based line number of the first
/// problem; parsed rules are validated with the same checks as compiled
/// ones.
pub fn parse_rules(text: &str) -> Result<Vec<MeshRule>, RuleParseError> {
    let mut rules = Vec::new();
    let mut current: Option<PartialRule> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or("");
        let rest: Vec<&str> = tokens.collect();

        if keyword == "rule" {
            if let Some(open) = current.take() {
                return Err(RuleParseError::Syntax {
                    line: line_no,
                    message: format!("rule '{}' not closed before next rule", open.name),
                });
            }
            current = Some(PartialRule::new(parse_name(line, line_no)?));
            continue;
        }

        if keyword == "endrule" {
            let Some(done) = current.take() else {
                return Err(syntax(line_no, "'endrule' outside of a rule block"));
            };
            rules.push(done.finish(line_no)?);
            continue;
        }

        let Some(rule) = current.as_mut() else {
            return Err(RuleParseError::Syntax {
                line: line_no,
                message: format!("'{keyword}' outside of a rule block"),
            });
        };

        match keyword {
            "tolerance" => {
                rule.min_tolerance = parse_one(&rest, line_no, "tolerance level")?;
            }
            "point" => {
                if rest.len() != 4 || rest[2] != "tol" {
                    return Err(syntax(line_no, "expected: point <x> <y> tol <radius>"));
                }
                rule.old_points
                    .push(Point2::new(num(rest[0], line_no)?, num(rest[1], line_no)?));
                rule.point_tolerance.push(num(rest[3], line_no)?);
            }
            "line" => {
                let deleted = rest.last() == Some(&"del");
                let ends = &rest[..rest.len() - usize::from(deleted)];
                if ends.len() != 2 {
                    return Err(syntax(line_no, "expected: line <p1> <p2> [del]"));
                }
                let a = old_ref(ends[0], line_no)?;
                let b = old_ref(ends[1], line_no)?;
                if deleted {
                    rule.delete_lines.push(rule.old_lines.len());
                }
                rule.old_lines.push([a, b]);
            }
            "newpoint" => {
                if rest.len() != 2 {
                    return Err(syntax(line_no, "expected: newpoint <x> <y>"));
                }
                rule.new_points
                    .push(Point2::new(num(rest[0], line_no)?, num(rest[1], line_no)?));
            }
            "element" => {
                if !(3..=4).contains(&rest.len()) {
                    return Err(syntax(line_no, "elements take 3 or 4 corners"));
                }
                let corners = rest
                    .iter()
                    .map(|t| point_ref(t, line_no))
                    .collect::<Result<SmallVec<[PointRef; 4]>, _>>()?;
                rule.elements.push(RuleElement { corners });
            }
            "newline" => {
                if rest.len() != 2 {
                    return Err(syntax(line_no, "expected: newline <p1> <p2>"));
                }
                rule.new_lines
                    .push([point_ref(rest[0], line_no)?, point_ref(rest[1], line_no)?]);
            }
            "freezone" => {
                rule.free_zone = polygon(&rest, line_no)?;
            }
            "freezonelimit" => {
                rule.free_zone_limit = polygon(&rest, line_no)?;
            }
            other => {
                return Err(syntax(line_no, &format!("unknown keyword '{other}'")));
            }
        }
    }

    if let Some(open) = current {
        return Err(RuleParseError::UnexpectedEof(open.name));
    }
    Ok(rules)
}

#[derive(Default)]
struct PartialRule {
    name: String,
    min_tolerance: u32,
    old_points: Vec<Point2<f64>>,
    point_tolerance: Vec<f64>,
    old_lines: Vec<[usize; 2]>,
    delete_lines: Vec<usize>,
    new_points: Vec<Point2<f64>>,
    elements: Vec<RuleElement>,
    new_lines: Vec<[PointRef; 2]>,
    free_zone: Vec<Point2<f64>>,
    free_zone_limit: Vec<Point2<f64>>,
}

impl PartialRule {
    fn new(name: String) -> Self {
        Self {
            name,
            min_tolerance: 1,
            ..Self::default()
        }
    }

    fn finish(self, line: usize) -> Result<MeshRule, RuleParseError> {
        let free_zone_limit = if self.free_zone_limit.is_empty() {
            self.free_zone.clone()
        } else {
            self.free_zone_limit
        };
        let rule = MeshRule {
            name: self.name,
            min_tolerance: self.min_tolerance,
            old_points: self.old_points,
            point_tolerance: self.point_tolerance,
            old_lines: self.old_lines,
            delete_lines: self.delete_lines,
            new_points: self.new_points,
            elements: self.elements,
            new_lines: self.new_lines,
            free_zone: self.free_zone,
            free_zone_limit,
        };
        rule.validate()
            .map_err(|source| RuleParseError::InvalidRule { line, source })?;
        Ok(rule)
    }
}

fn syntax(line: usize, message: &str) -> RuleParseError {
    RuleParseError::Syntax {
        line,
        message: message.to_string(),
    }
}

fn parse_name(line: &str, line_no: usize) -> Result<String, RuleParseError> {
    let name = line
        .strip_prefix("rule")
        .map(str::trim)
        .map(|n| n.trim_matches('"').to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| syntax(line_no, "expected: rule \"<name>\""))?;
    Ok(name)
}

fn num(token: &str, line: usize) -> Result<f64, RuleParseError> {
    token
        .parse::<f64>()
        .map_err(|_| syntax(line, &format!("bad number '{token}'")))
}

fn parse_one<T: std::str::FromStr>(
    rest: &[&str],
    line: usize,
    what: &str,
) -> Result<T, RuleParseError> {
    rest.first()
        .and_then(|t| t.parse::<T>().ok())
        .ok_or_else(|| syntax(line, &format!("bad {what}")))
}

/// A 1-based template point reference.
fn old_ref(token: &str, line: usize) -> Result<usize, RuleParseError> {
    let index: usize = token
        .parse()
        .map_err(|_| syntax(line, &format!("bad point reference '{token}'")))?;
    index
        .checked_sub(1)
        .ok_or_else(|| syntax(line, "point references are 1-based"))
}

/// A template (`3`) or new-point (`n1`) reference.
fn point_ref(token: &str, line: usize) -> Result<PointRef, RuleParseError> {
    if let Some(new) = token.strip_prefix('n') {
        let index: usize = new
            .parse()
            .map_err(|_| syntax(line, &format!("bad new-point reference '{token}'")))?;
        let index = index
            .checked_sub(1)
            .ok_or_else(|| syntax(line, "new-point references are 1-based"))?;
        Ok(PointRef::New(index))
    } else {
        old_ref(token, line).map(PointRef::Old)
    }
}

fn polygon(rest: &[&str], line: usize) -> Result<Vec<Point2<f64>>, RuleParseError> {
    if rest.len() < 6 || rest.len() % 2 != 0 {
        return Err(syntax(line, "a free zone needs at least three x y pairs"));
    }
    rest.chunks(2)
        .map(|pair| Ok(Point2::new(num(pair[0], line)?, num(pair[1], line)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::standard_triangle_rules;

    const FREE_TRIANGLE: &str = r#"
# advance into open space
rule "free triangle"
tolerance 1
point 0 0 tol 0.5
point 1 0 tol 0.5
line 1 2 del
newpoint 0.5 0.866
element 1 2 n1
newline 1 n1
newline n1 2
freezone 0 0  1 0  1.4 0.7  0.5 1.6  -0.4 0.7
freezonelimit 0 0  1 0  1.05 0.5  0.5 1.0  -0.05 0.5
endrule
"#;

    #[test]
    fn parses_the_compiled_free_triangle() {
        let parsed = parse_rules(FREE_TRIANGLE).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed.len(), 1);
        let compiled = standard_triangle_rules()
            .into_iter()
            .find(|r| r.name == "free triangle")
            .unwrap_or_else(|| panic!("missing compiled rule"));
        assert_eq!(parsed[0], compiled);
    }

    #[test]
    fn missing_freezonelimit_falls_back_to_freezone() {
        let text = r#"
rule "corner"
point 0 0 tol 0.5
point 1 0 tol 0.5
point 0.5 0.866 tol 0.5
line 1 2 del
line 2 3 del
element 1 2 3
newline 1 3
freezone 0 0  1 0  0.5 0.866
endrule
"#;
        let parsed = parse_rules(text).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(parsed[0].free_zone, parsed[0].free_zone_limit);
        assert_eq!(parsed[0].min_tolerance, 1);
        assert_eq!(parsed[0].delete_lines, vec![0, 1]);
    }

    #[test]
    fn reports_line_numbers() {
        let text = "rule \"broken\"\npoint 0 0 tol 0.5\nwhat 1 2\nendrule\n";
        let err = parse_rules(text).unwrap_err();
        assert_eq!(
            err,
            RuleParseError::Syntax {
                line: 3,
                message: "unknown keyword 'what'".into()
            }
        );
    }

    #[test]
    fn entry_outside_rule_is_rejected() {
        let err = parse_rules("point 0 0 tol 0.5\n").unwrap_err();
        assert!(matches!(err, RuleParseError::Syntax { line: 1, .. }));
    }

    #[test]
    fn unterminated_rule_is_rejected() {
        let err = parse_rules("rule \"open\"\npoint 0 0 tol 0.5\n").unwrap_err();
        assert_eq!(err, RuleParseError::UnexpectedEof("open".into()));
    }

    #[test]
    fn invalid_rule_carries_validation_error() {
        // Base line missing entirely.
        let text = "rule \"no base\"\npoint 0 0 tol 0.5\npoint 1 0 tol 0.5\nfreezone 0 0  1 0  0.5 1\nendrule\n";
        let err = parse_rules(text).unwrap_err();
        assert!(matches!(err, RuleParseError::InvalidRule { line: 5, .. }));
    }
}
