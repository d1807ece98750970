use std::io::{self, Write};

use crate::tagger::rules::RuleSet;

const SEPARATOR: &str = "----------------------------------------";

/// Writes the loaded rules with each expression's field, mode and value list.
pub fn write_rules<W: Write>(w: &mut W, rule_set: &RuleSet) -> io::Result<()> {
    writeln!(w, "{SEPARATOR}")?;
    writeln!(w, "\t\tRULES")?;
    writeln!(w, "{SEPARATOR}")?;

    for rule in rule_set.rules() {
        writeln!(w, "{}", rule.name)?;
        for expr in &rule.expressions {
            let mode = if expr.inclusive {
                "INCLUSIVE"
            } else {
                "EXCLUSIVE"
            };
            writeln!(
                w,
                "\t{:<16}\t{:<10}\t{}",
                expr.field,
                mode,
                expr.values.join(", ")
            )?;
        }
        writeln!(w)?;
    }

    writeln!(w, "{} rules", rule_set.len())
}

/// Writes the final match count of every rule, in rule-set order.
pub fn write_results<W: Write>(w: &mut W, rule_set: &RuleSet, counts: &[u64]) -> io::Result<()> {
    writeln!(w, "{SEPARATOR}")?;
    writeln!(w, "\t\tRESULTS")?;
    writeln!(w, "{SEPARATOR}")?;

    for (idx, (rule, count)) in rule_set.rules().iter().zip(counts).enumerate() {
        writeln!(w, "{:>3}. {:<48} {:>8}", idx, rule.name, count)?;
    }

    Ok(())
}
