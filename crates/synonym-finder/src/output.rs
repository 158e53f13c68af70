use std::io::{self, Write};

use lexicon_types::QueryResult;

/// Write one `query,cand:score,...` line.
///
/// Without scores the line is `query,cand,...`; a query without candidates is
/// written as `query,`.
pub fn write_result<W: Write>(out: &mut W, result: &QueryResult, with_scores: bool) -> io::Result<()> {
    write!(out, "{}", result.query)?;
    if result.candidates.is_empty() {
        write!(out, ",")?;
    }
    for c in &result.candidates {
        if with_scores {
            write!(out, ",{}:{}", c.lemma, c.score)?;
        } else {
            write!(out, ",{}", c.lemma)?;
        }
    }
    writeln!(out)
}

pub fn write_results<'a, W, I>(out: &mut W, results: I, with_scores: bool) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a QueryResult>,
{
    for result in results {
        write_result(out, result, with_scores)?;
    }
    Ok(())
}
