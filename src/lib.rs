//! # RowTagger
//!
//! `row_tagger` counts how many rows of a delimited text file match each of a
//! set of user-defined inclusion/exclusion rules. It supports:
//!
//! - Memory-mapped CSV loading (zero-copy for large files)
//! - A tab-delimited rule language (`IS`, `EQUALS`, `IS ANY`, `IS NOT`, `ALL EXCEPT`)
//! - Field-index resolution against the header row
//! - Naive or quote-aware row splitting behind one interface
//! - Parallel chunked tallying with Rayon
//!
//! # Rule language
//!
//! An unindented line names a rule; tab-indented lines below it add
//! expressions, all of which must hold for a row to count:
//!
//! ```text
//! CheapCalifornia
//! <TAB>state<TAB>IS<TAB>CA
//! <TAB>category<TAB>ALL EXCEPT<TAB>D
//! ```
//!
//! # Example
//!
//! ```rust
//! use row_tagger::tagger::{matcher::count_matches, rules::RuleSet, splitter::SplitStrategy};
//!
//! let mut rule_set = RuleSet::parse("LowIncome\n\tincome\tIS\t1000,2000\n");
//! rule_set.resolve_field_indexes(&["id".to_string(), "income".to_string()]);
//!
//! let rows = ["1,1000", "2,3000", "3,2000"];
//! let counts = count_matches(&rows, &rule_set, SplitStrategy::Naive);
//! assert_eq!(counts, vec![2]);
//! ```

pub mod tagger;
