use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::tagger::TaggerError;

/// A single field predicate.
///
/// The row value at `field_idx` is compared for exact string equality against
/// each entry of `values`; `inclusive` decides whether membership counts as a
/// match (`IS`-style keywords) or a non-match (`IS NOT`-style keywords).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    pub field: String,
    /// Resolved column position, `None` until [`RuleSet::resolve_field_indexes`]
    /// runs or when the header has no such column.
    pub field_idx: Option<usize>,
    pub values: Vec<String>,
    pub inclusive: bool,
}

impl Expression {
    /// Parses one indented rule-file line: `field<TAB>keyword<TAB>v1,v2,...`.
    ///
    /// Lines with fewer than three tab-separated parts or an unrecognized
    /// keyword are logged and skipped; parts beyond the third are ignored.
    fn parse(line: &str) -> Option<Expression> {
        let parts: Vec<&str> = line.trim_start().split('\t').collect();

        if parts.len() < 3 {
            warn!(
                "invalid expression line {:?}, expected format: field<TAB>keyword<TAB>value[,value2,...]",
                line
            );
            return None;
        }

        let inclusive = match parts[1] {
            "IS" | "EQUALS" | "IS ANY" => true,
            "ALL EXCEPT" | "IS NOT" => false,
            other => {
                warn!("invalid keyword {:?} in expression line {:?}", other, line);
                return None;
            }
        };

        Some(Expression {
            field: parts[0].to_string(),
            field_idx: None,
            values: parts[2].split(',').map(str::to_string).collect(),
            inclusive,
        })
    }
}

/// A named AND-combination of expressions: a row satisfies the rule only if
/// every expression holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub expressions: Vec<Expression>,
}

impl Rule {
    /// True once every expression has a resolved column index. Rules that
    /// stay unresolved are excluded from matching and keep a zero count.
    pub fn is_resolved(&self) -> bool {
        self.expressions.iter().all(|e| e.field_idx.is_some())
    }
}

/// The ordered set of rules loaded for one run. Order determines both the
/// display order and the tally slot of each rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Reads and parses a rule file. A missing or unreadable file is fatal
    /// for the run.
    ///
    /// # Example
    /// ```rust
    /// # use row_tagger::tagger::rules::RuleSet;
    /// let rule_set = RuleSet::parse("NotCA\n\tstate\tIS NOT\tCA\n");
    /// assert_eq!(rule_set.len(), 1);
    /// ```
    pub fn load(path: &Path) -> Result<RuleSet, TaggerError> {
        info!("reading rules from {}", path.display());
        let text = fs::read_to_string(path)?;
        Ok(Self::parse(&text))
    }

    /// Parses rule-definition text.
    ///
    /// An unindented line starts a rule named by its trimmed text; a
    /// tab-indented line adds an expression to the most recently started
    /// rule. Malformed expression lines, expressions appearing before any
    /// rule header, and rules left without a single valid expression are all
    /// dropped with a logged diagnostic; none of them abort the load. Blank
    /// lines are ignored and a leading UTF-8 BOM is tolerated.
    pub fn parse(text: &str) -> RuleSet {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rules: Vec<Rule> = Vec::new();

        for line in text.lines() {
            let line = line.trim_end();

            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with('\t') {
                match rules.last_mut() {
                    Some(rule) => {
                        if let Some(expr) = Expression::parse(line) {
                            rule.expressions.push(expr);
                        }
                    }
                    None => warn!("expression before any rule header, skipping: {:?}", line),
                }
            } else {
                rules.push(Rule {
                    name: line.trim().to_string(),
                    expressions: Vec::new(),
                });
            }
        }

        rules.retain(|rule| {
            if rule.expressions.is_empty() {
                warn!("rule {:?} has no valid expressions, dropping", rule.name);
                false
            } else {
                true
            }
        });

        RuleSet { rules }
    }

    /// Assigns every expression the position of the first header column whose
    /// name exactly equals the expression's field (case-sensitive).
    ///
    /// Duplicate header names resolve to the lowest index. Expressions whose
    /// field is absent keep `field_idx = None`; the enclosing rule is logged
    /// and will be skipped during matching. Must complete before any worker
    /// is dispatched — the matcher only ever borrows the set immutably.
    pub fn resolve_field_indexes(&mut self, header: &[String]) {
        for rule in &mut self.rules {
            for expr in &mut rule.expressions {
                expr.field_idx = header.iter().position(|col| *col == expr.field);
            }
        }

        for rule in &self.rules {
            for expr in &rule.expressions {
                if expr.field_idx.is_none() {
                    warn!(
                        "rule {:?}: no column named {:?} in header, rule will not be matched",
                        rule.name, expr.field
                    );
                }
            }
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
