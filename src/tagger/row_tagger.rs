use std::fs::File;
use std::path::Path;
use std::thread;

use log::info;
use memchr::{memchr, memchr_iter};
use memmap2::Mmap;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::tagger::matcher::count_matches;
use crate::tagger::rules::RuleSet;
use crate::tagger::splitter::SplitStrategy;
use crate::tagger::{TagSummary, TaggerError};

/// Rows per parallel work unit. Throughput knob only: tallies are identical
/// for any chunk size (see tests).
const CHUNK_SIZE: usize = 100_000;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// A memory-mapped data file: one header row plus data rows
///
/// The whole file is buffered up front; rows are handed to workers as `&str`
/// slices into the map, so no row data is ever copied.
#[derive(Debug)]
pub struct DataFile {
    mmap: Mmap,
    bom_len: usize,
    // Byte offset of the header's terminating newline (or EOF).
    header_end: usize,
}

impl DataFile {
    /// Maps the file and locates the header row.
    ///
    /// # Errors
    /// Returns a [`TaggerError`] if the file cannot be opened or mapped, is
    /// not valid UTF-8, or has no header row.
    pub fn open(path: &Path) -> Result<DataFile, TaggerError> {
        info!("reading data from {}", path.display());

        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Err(TaggerError::MissingHeader);
        }

        let mmap = unsafe { Mmap::map(&file)? };
        std::str::from_utf8(&mmap)?;

        let bom_len = if mmap.starts_with(UTF8_BOM) {
            UTF8_BOM.len()
        } else {
            0
        };
        let buf = &mmap[bom_len..];

        let header_end = memchr(b'\n', buf).unwrap_or(buf.len());
        if trim_line(&buf[..header_end]).is_empty() {
            return Err(TaggerError::MissingHeader);
        }

        Ok(DataFile {
            bom_len,
            header_end: bom_len + header_end,
            mmap,
        })
    }

    fn line_str(&self, start: usize, end: usize) -> &str {
        // The buffer was UTF-8 validated in `open` and line boundaries sit on
        // ASCII newlines, so the slice is always valid.
        std::str::from_utf8(trim_line(&self.mmap[start..end])).unwrap_or("")
    }

    /// Header column names, split with the same strategy as the data rows.
    pub fn header(&self, strategy: SplitStrategy) -> Vec<String> {
        strategy
            .split(self.line_str(self.bom_len, self.header_end))
            .iter()
            .map(|f| f.to_string())
            .collect()
    }

    /// Data lines in file order, excluding the header and blank lines.
    pub fn data_lines(&self) -> Vec<&str> {
        let start = (self.header_end + 1).min(self.mmap.len());
        let data = &self.mmap[start..];

        let mut spans = Vec::new();
        let mut line_start = 0;
        for newline_pos in memchr_iter(b'\n', data) {
            spans.push((line_start, newline_pos));
            line_start = newline_pos + 1;
        }
        if line_start < data.len() {
            spans.push((line_start, data.len()));
        }

        spans
            .into_iter()
            .map(|(s, e)| self.line_str(start + s, start + e))
            .filter(|line| !line.is_empty())
            .collect()
    }
}

// Strips the trailing carriage return of CRLF input.
fn trim_line(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// The matching engine: resolves rule field indexes against the header,
/// partitions the rows into chunks, and tallies matches on a worker pool.
#[derive(Debug, Clone)]
pub struct Tagger {
    strategy: SplitStrategy,
    threads: usize,
}

impl Tagger {
    /// Creates a tagger with a worker pool sized to the host's available
    /// CPU cores.
    pub fn new(strategy: SplitStrategy) -> Tagger {
        let threads = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Tagger { strategy, threads }
    }

    /// Overrides the worker pool size.
    pub fn with_threads(mut self, threads: usize) -> Tagger {
        self.threads = threads.max(1);
        self
    }

    /// Tags every data row and returns per-rule match counts.
    ///
    /// Field indexes are resolved before the pool starts; workers only ever
    /// see the rule set through an immutable reference, so no rule state can
    /// change mid-run. The call blocks until every chunk has been tallied.
    ///
    /// # Errors
    /// Returns a [`TaggerError`] if the worker pool cannot be built.
    pub fn run(&self, rule_set: &mut RuleSet, data: &DataFile) -> Result<TagSummary, TaggerError> {
        let header = data.header(self.strategy);
        rule_set.resolve_field_indexes(&header);

        let lines = data.data_lines();
        info!("file read into memory: {} rows", lines.len());

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .build()?;
        info!("spooling up {} worker threads", self.threads);

        let rule_set: &RuleSet = rule_set;
        let counts = pool.install(|| count_chunked(&lines, rule_set, self.strategy, CHUNK_SIZE));

        info!("processed {} rows, all workers complete", lines.len());

        Ok(TagSummary {
            rows_processed: lines.len(),
            counts,
        })
    }
}

// Splits `lines` into fixed-size chunks, tallies each chunk in parallel, and
// sums the per-chunk tallies element-wise. Chunks are contiguous and
// non-overlapping, so every row is counted exactly once regardless of how
// chunk completion interleaves.
fn count_chunked(
    lines: &[&str],
    rule_set: &RuleSet,
    strategy: SplitStrategy,
    chunk_size: usize,
) -> Vec<u64> {
    let tallies: Vec<Vec<u64>> = lines
        .par_chunks(chunk_size.max(1))
        .map(|chunk| count_matches(chunk, rule_set, strategy))
        .collect();

    let mut totals = vec![0u64; rule_set.len()];
    for tally in tallies {
        for (total, count) in totals.iter_mut().zip(tally) {
            *total += count;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn data_file(csv: &str) -> (NamedTempFile, DataFile) {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(tmp, "{}", csv).unwrap();
        let data = DataFile::open(tmp.path()).unwrap();
        (tmp, data)
    }

    #[test]
    fn chunking_does_not_change_results() {
        let mut csv = String::from("id,income,state\n");
        for i in 0..37 {
            csv.push_str(&format!(
                "{},{},{}\n",
                i,
                (i % 5) * 1000,
                ["CA", "NY", "TX"][i % 3]
            ));
        }
        let (_tmp, data) = data_file(&csv);

        let mut rule_set =
            RuleSet::parse("LowIncome\n\tincome\tIS\t1000,2000\nNotNY\n\tstate\tIS NOT\tNY\n");
        rule_set.resolve_field_indexes(&data.header(SplitStrategy::Naive));
        let lines = data.data_lines();

        let reference = count_matches(&lines, &rule_set, SplitStrategy::Naive);
        for chunk_size in [1, 2, 3, 7, 100] {
            let chunked = count_chunked(&lines, &rule_set, SplitStrategy::Naive, chunk_size);
            assert_eq!(chunked, reference, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn header_and_lines_are_extracted() {
        let (_tmp, data) = data_file("id,income\n1,1000\n2,3000\n");

        assert_eq!(data.header(SplitStrategy::Naive), vec!["id", "income"]);
        assert_eq!(data.data_lines(), vec!["1,1000", "2,3000"]);
    }

    #[test]
    fn missing_trailing_newline_keeps_last_row() {
        let (_tmp, data) = data_file("id\n1\n2");

        assert_eq!(data.data_lines(), vec!["1", "2"]);
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        let (_tmp, data) = data_file("id,state\r\n1,CA\r\n");

        assert_eq!(data.header(SplitStrategy::Naive), vec!["id", "state"]);
        assert_eq!(data.data_lines(), vec!["1,CA"]);
    }

    #[test]
    fn leading_bom_is_stripped_from_header() {
        let (_tmp, data) = data_file("\u{feff}id,state\n1,CA\n");

        assert_eq!(data.header(SplitStrategy::Naive), vec!["id", "state"]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let (_tmp, data) = data_file("id\n1\n\n2\n");

        assert_eq!(data.data_lines(), vec!["1", "2"]);
    }

    #[test]
    fn empty_file_has_no_header() {
        let tmp = NamedTempFile::new().unwrap();

        assert!(matches!(
            DataFile::open(tmp.path()),
            Err(TaggerError::MissingHeader)
        ));
    }

    #[test]
    fn header_only_file_yields_zero_rows() {
        let (_tmp, data) = data_file("id,income\n");

        let mut rule_set = RuleSet::parse("R\n\tincome\tIS\t1000\n");
        let summary = Tagger::new(SplitStrategy::Naive)
            .run(&mut rule_set, &data)
            .unwrap();

        assert_eq!(summary.rows_processed, 0);
        assert_eq!(summary.counts, vec![0]);
    }

    #[test]
    fn single_thread_pool_matches_default_pool() {
        let (_tmp, data) = data_file("a,b\n1,2\n1,3\n2,2\n1,2\n");
        let rules_text = "Both\n\ta\tIS\t1\n\tb\tIS\t2\n";

        let mut rule_set = RuleSet::parse(rules_text);
        let multi = Tagger::new(SplitStrategy::Naive)
            .run(&mut rule_set, &data)
            .unwrap();

        let mut rule_set = RuleSet::parse(rules_text);
        let single = Tagger::new(SplitStrategy::Naive)
            .with_threads(1)
            .run(&mut rule_set, &data)
            .unwrap();

        assert_eq!(multi, single);
        assert_eq!(multi.counts, vec![2]);
    }
}
