use std::borrow::Cow;

use crate::tagger::rules::{Expression, Rule, RuleSet};
use crate::tagger::splitter::SplitStrategy;

// An unresolved expression or an out-of-range field index fails the
// expression, so the enclosing rule never counts such a row.
fn expression_matches(fields: &[Cow<'_, str>], expr: &Expression) -> bool {
    let Some(idx) = expr.field_idx else {
        return false;
    };
    let Some(value) = fields.get(idx).map(|f| f.as_ref()) else {
        return false;
    };

    let present = expr.values.iter().any(|v| v.as_str() == value);
    present == expr.inclusive
}

/// True when the split row satisfies every expression of the rule.
/// Short-circuits on the first unsatisfied expression.
pub fn rule_matches(fields: &[Cow<'_, str>], rule: &Rule) -> bool {
    rule.expressions
        .iter()
        .all(|expr| expression_matches(fields, expr))
}

/// Tallies how many of `rows` each rule matches.
///
/// Returns one count per rule, in rule-set order. Rules are independent: a
/// single row may add to zero, one, or several slots. Rules with unresolved
/// field indexes are skipped and keep a zero count.
pub fn count_matches(rows: &[&str], rule_set: &RuleSet, strategy: SplitStrategy) -> Vec<u64> {
    let mut tally = vec![0u64; rule_set.len()];
    let mut fields = Vec::new();

    for &row in rows {
        fields.clear();
        strategy.split_into(row, &mut fields);

        for (slot, rule) in tally.iter_mut().zip(rule_set.rules()) {
            if rule.is_resolved() && rule_matches(&fields, rule) {
                *slot += 1;
            }
        }
    }

    tally
}
