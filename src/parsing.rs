use crate::{Error, Result, Tensor};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::Path;

/// Number of non-blank records inspected when deciding the encoding
pub const DEFAULT_SNIFF_LINES: usize = 32;

/// How the feature values of a file are written down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Every record lists all feature values
    Dense,
    /// Records list `index:value` pairs, omitted indices are zero
    Sparse,
}

/// Everything the sniffer learns about a file before parsing it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileLayout {
    pub encoding: Encoding,
    /// Number of records (N)
    pub lines: usize,
    /// Feature dimensionality (D)
    pub dimension: usize,
    /// Whether every record starts with a label token
    pub labeled: bool,
}

/// Output of a full parse: N x D features and, for labeled files, N raw labels
#[derive(Debug, Clone)]
pub struct ParsedData {
    pub features: Tensor,
    pub labels: Option<Vec<f32>>,
}

/// Unwraps one result of `lines()`, reporting undecodable text as a parse error
fn decode_line(line: io::Result<String>, line_no: usize) -> Result<String> {
    match line {
        Ok(line) => Ok(line),
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            Err(Error::parse(line_no, "line is not valid UTF-8"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Calls `f` with the 1-based line number and trimmed text of every non-blank line
fn for_each_record<R, F>(reader: R, mut f: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(usize, &str) -> Result<()>,
{
    for (idx, line) in reader.lines().enumerate() {
        let line = decode_line(line, idx + 1)?;
        let record = line.trim();
        if record.is_empty() {
            continue;
        }
        f(idx + 1, record)?;
    }
    Ok(())
}

/// Parses a single numeric token, rejecting NaN and infinities
fn parse_value(token: &str, line: usize) -> Result<f32> {
    match token.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::parse(line, format!("invalid numeric value '{}'", token))),
    }
}

/// Parses an `index:value` token
fn parse_sparse_token(token: &str, line: usize) -> Result<(usize, f32)> {
    let (index, value) = token
        .split_once(':')
        .ok_or_else(|| Error::parse(line, format!("expected index:value, found '{}'", token)))?;
    let index = index
        .parse::<usize>()
        .map_err(|_| Error::parse(line, format!("invalid feature index in '{}'", token)))?;
    Ok((index, parse_value(value, line)?))
}

/// Splits a dense record on whitespace and commas
fn dense_tokens(record: &str) -> impl Iterator<Item = &str> {
    record
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
}

/// Parses a comma- or whitespace-separated string of numbers into a vector of f32
pub fn parse_vector_str(vector_str: &str, line: usize) -> Result<Vec<f32>> {
    dense_tokens(vector_str)
        .map(|token| parse_value(token, line))
        .collect()
}

/// Returns true if any of the first `max_lines` records contains the
/// `index:value` separator
pub fn is_sparse<R: BufRead>(reader: R, max_lines: usize) -> Result<bool> {
    let mut seen = 0;
    for (idx, line) in reader.lines().enumerate() {
        if seen >= max_lines {
            break;
        }
        let line = decode_line(line, idx + 1)?;
        if line.trim().is_empty() {
            continue;
        }
        if line.contains(':') {
            return Ok(true);
        }
        seen += 1;
    }
    Ok(false)
}

/// Opens `path` and checks a bounded prefix for sparse tokens
pub fn is_file_sparse(path: impl AsRef<Path>) -> Result<bool> {
    let file = File::open(path)?;
    is_sparse(BufReader::new(file), DEFAULT_SNIFF_LINES)
}

/// Counts records (non-blank lines). A last line without a trailing
/// newline still counts.
pub fn get_line_number<R: BufRead>(reader: R) -> Result<usize> {
    let mut count = 0;
    for_each_record(reader, |_, _| {
        count += 1;
        Ok(())
    })?;
    Ok(count)
}

/// Scans a sparse file and returns `max(index) + 1` over all tokens
pub fn find_max_dimension<R: BufRead>(reader: R) -> Result<usize> {
    let mut dimension = 0;
    for_each_record(reader, |line, record| {
        for (position, token) in record.split_whitespace().enumerate() {
            if !token.contains(':') {
                // A leading token without a separator is the label
                if position == 0 {
                    continue;
                }
                return Err(Error::parse(
                    line,
                    format!("expected index:value, found '{}'", token),
                ));
            }
            let (index, _) = parse_sparse_token(token, line)?;
            let width = index.checked_add(1).ok_or_else(|| {
                Error::parse(line, format!("feature index {} is too large", index))
            })?;
            dimension = dimension.max(width);
        }
        Ok(())
    })?;
    Ok(dimension)
}

/// Returns the dense feature dimension: the first record's token count,
/// minus one for the label column when `labeled`. Every record must have
/// the same token count.
pub fn find_dimension<R: BufRead>(reader: R, labeled: bool) -> Result<usize> {
    let mut width: Option<usize> = None;
    for_each_record(reader, |line, record| {
        let count = dense_tokens(record).count();
        match width {
            None => width = Some(count),
            Some(expected) if expected != count => {
                return Err(Error::parse(
                    line,
                    format!("expected {} columns, found {}", expected, count),
                ));
            }
            Some(_) => {}
        }
        Ok(())
    })?;

    let width = width.unwrap_or(0);
    if labeled {
        Ok(width.saturating_sub(1))
    } else {
        Ok(width)
    }
}

/// Returns whether the first record of a sparse file starts with a label
fn sparse_has_label<R: BufRead>(reader: R) -> Result<bool> {
    for (idx, line) in reader.lines().enumerate() {
        let line = decode_line(line, idx + 1)?;
        if let Some(first) = line.split_whitespace().next() {
            return Ok(!first.contains(':'));
        }
    }
    Ok(false)
}

/// Determines encoding, record count, dimension and label presence.
/// The reader is rewound before every pass and left at the start.
pub fn sniff<R: BufRead + Seek>(
    reader: &mut R,
    sniff_lines: usize,
    dense_labeled: bool,
) -> Result<FileLayout> {
    reader.rewind()?;
    let sparse = is_sparse(&mut *reader, sniff_lines)?;

    reader.rewind()?;
    let lines = get_line_number(&mut *reader)?;

    reader.rewind()?;
    let layout = if sparse {
        let dimension = find_max_dimension(&mut *reader)?;
        reader.rewind()?;
        FileLayout {
            encoding: Encoding::Sparse,
            lines,
            dimension,
            labeled: sparse_has_label(&mut *reader)?,
        }
    } else {
        FileLayout {
            encoding: Encoding::Dense,
            lines,
            dimension: find_dimension(&mut *reader, dense_labeled)?,
            labeled: dense_labeled && lines > 0,
        }
    };
    reader.rewind()?;

    tracing::debug!(
        "Sniffed {:?} file: {} records, dimension {}, labeled {}",
        layout.encoding,
        layout.lines,
        layout.dimension,
        layout.labeled
    );

    Ok(layout)
}

/// Parses a dense record into `out`, returning the label if the layout has one
fn parse_dense_record(
    record: &str,
    line: usize,
    layout: &FileLayout,
    out: &mut [f32],
) -> Result<Option<f32>> {
    let values = parse_vector_str(record, line)?;
    let expected = layout.dimension + usize::from(layout.labeled);
    if values.len() != expected {
        return Err(Error::parse(
            line,
            format!("expected {} columns, found {}", expected, values.len()),
        ));
    }

    let (label, features) = if layout.labeled {
        (Some(values[0]), &values[1..])
    } else {
        (None, &values[..])
    };
    out.copy_from_slice(features);
    Ok(label)
}

/// Parses a sparse record into `out`, returning the label if the layout has one
fn parse_sparse_record(
    record: &str,
    line: usize,
    layout: &FileLayout,
    out: &mut [f32],
) -> Result<Option<f32>> {
    let mut tokens = record.split_whitespace().peekable();

    let label = match tokens.peek() {
        Some(&first) if !first.contains(':') => {
            if !layout.labeled {
                return Err(Error::parse(
                    line,
                    format!("unexpected label '{}' in unlabeled file", first),
                ));
            }
            let label = parse_value(first, line)?;
            tokens.next();
            Some(label)
        }
        _ if layout.labeled => return Err(Error::parse(line, "missing label")),
        _ => None,
    };

    for token in tokens {
        let (index, value) = parse_sparse_token(token, line)?;
        if index >= layout.dimension {
            return Err(Error::parse(
                line,
                format!(
                    "feature index {} out of range 0..{}",
                    index, layout.dimension
                ),
            ));
        }
        out[index] = value;
    }
    Ok(label)
}

/// Parses every record according to a previously sniffed layout
pub fn parse_lines<R: BufRead>(reader: R, layout: &FileLayout) -> Result<ParsedData> {
    let too_large = || {
        Error::parse(
            1,
            format!(
                "feature matrix of {} x {} is too large",
                layout.lines, layout.dimension
            ),
        )
    };
    let cells = layout
        .lines
        .checked_mul(layout.dimension)
        .ok_or_else(|| too_large())?;
    let mut data = Vec::new();
    data.try_reserve_exact(cells).map_err(|_| too_large())?;
    data.resize(cells, 0.0);

    let mut features = Tensor::new_with_shape(data, (layout.lines, layout.dimension));
    let mut labels = Vec::with_capacity(if layout.labeled { layout.lines } else { 0 });
    let mut row = 0;
    let mut last_line = 0;

    for_each_record(reader, |line, record| {
        last_line = line;
        if row >= layout.lines {
            return Err(Error::parse(line, "more records than sniffed"));
        }
        let out = features.row_mut(row);
        let label = match layout.encoding {
            Encoding::Dense => parse_dense_record(record, line, layout, out)?,
            Encoding::Sparse => parse_sparse_record(record, line, layout, out)?,
        };
        if let Some(label) = label {
            labels.push(label);
        }
        row += 1;
        Ok(())
    })?;

    if row != layout.lines {
        return Err(Error::parse(last_line, "fewer records than sniffed"));
    }

    Ok(ParsedData {
        features,
        labels: layout.labeled.then_some(labels),
    })
}

/// Opens `path` once, sniffs it and parses it. The file handle is released
/// on return, including on error.
pub fn read_data_file(
    path: impl AsRef<Path>,
    sniff_lines: usize,
    dense_labeled: bool,
) -> Result<(FileLayout, ParsedData)> {
    let mut reader = BufReader::new(File::open(path)?);
    let layout = sniff(&mut reader, sniff_lines, dense_labeled)?;
    let parsed = parse_lines(&mut reader, &layout)?;
    Ok((layout, parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_tensors_eq, write_data_file};
    use std::io::Cursor;

    fn sniff_str(contents: &str) -> Result<FileLayout> {
        sniff(&mut Cursor::new(contents), DEFAULT_SNIFF_LINES, true)
    }

    fn parse_str(contents: &str) -> Result<ParsedData> {
        let mut reader = Cursor::new(contents);
        let layout = sniff(&mut reader, DEFAULT_SNIFF_LINES, true)?;
        parse_lines(&mut reader, &layout)
    }

    #[test]
    fn test_parse_vector_str() {
        assert_eq!(
            parse_vector_str("1.5, 2,3\t-4", 1).unwrap(),
            vec![1.5, 2.0, 3.0, -4.0]
        );
        assert!(parse_vector_str("1,abc", 1).is_err());
        assert!(parse_vector_str("1,NaN", 1).is_err());
    }

    #[test]
    fn test_is_file_sparse() {
        let sparse = write_data_file("1 1:0.5\n0 2:0.9\n");
        let dense = write_data_file("1 0.5 0.2\n0 0.1 0.9\n");
        assert!(is_file_sparse(sparse.path()).unwrap());
        assert!(!is_file_sparse(dense.path()).unwrap());
    }

    #[test]
    fn test_is_file_sparse_missing_file() {
        let result = is_file_sparse("/nonexistent/path/to/data.txt");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_is_sparse_only_scans_prefix() {
        let contents = "1 2 3\n4 5 6\n7 1:8\n";
        assert!(!is_sparse(Cursor::new(contents), 2).unwrap());
        assert!(is_sparse(Cursor::new(contents), 3).unwrap());
    }

    #[test]
    fn test_get_line_number() {
        assert_eq!(get_line_number(Cursor::new("a\nb\nc\n")).unwrap(), 3);
        assert_eq!(get_line_number(Cursor::new("a\n\n  \nb")).unwrap(), 2);
        assert_eq!(get_line_number(Cursor::new("")).unwrap(), 0);
    }

    #[test]
    fn test_find_max_dimension() {
        let contents = "1 3:1.0 1:2.0\n0 7:0.5\n2\n";
        assert_eq!(find_max_dimension(Cursor::new(contents)).unwrap(), 8);

        let unlabeled = "0:1.0 4:2.0\n";
        assert_eq!(find_max_dimension(Cursor::new(unlabeled)).unwrap(), 5);

        let malformed = "1 1:0.5 oops\n";
        assert!(matches!(
            find_max_dimension(Cursor::new(malformed)),
            Err(Error::Parse { line: 1, .. })
        ));

        let bad_index = "1 -1:0.5\n";
        assert!(find_max_dimension(Cursor::new(bad_index)).is_err());
    }

    #[test]
    fn test_find_dimension() {
        assert_eq!(find_dimension(Cursor::new("1 2 3\n4 5 6\n"), true).unwrap(), 2);
        assert_eq!(find_dimension(Cursor::new("1,2,3\n"), false).unwrap(), 3);

        let ragged = "1 2 3\n4 5\n";
        assert!(matches!(
            find_dimension(Cursor::new(ragged), true),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_sniff_dense() {
        let layout = sniff_str("1 0.5 0.2\n0 0.1 0.9\n").unwrap();
        assert_eq!(
            layout,
            FileLayout {
                encoding: Encoding::Dense,
                lines: 2,
                dimension: 2,
                labeled: true,
            }
        );
    }

    #[test]
    fn test_sniff_sparse() {
        let layout = sniff_str("1 1:0.5\n0 2:0.9\n").unwrap();
        assert_eq!(layout.encoding, Encoding::Sparse);
        assert_eq!(layout.lines, 2);
        assert_eq!(layout.dimension, 3);
        assert!(layout.labeled);

        let unlabeled = sniff_str("1:0.5\n2:0.9\n").unwrap();
        assert!(!unlabeled.labeled);
    }

    #[test]
    fn test_parse_dense() {
        let parsed = parse_str("1 0.5 0.2\n0,0.1,0.9\n").unwrap();
        assert_tensors_eq(
            &parsed.features,
            &Tensor::new_with_shape(vec![0.5, 0.2, 0.1, 0.9], (2, 2)),
        );
        assert_eq!(parsed.labels, Some(vec![1.0, 0.0]));
    }

    #[test]
    fn test_parse_dense_unlabeled() {
        let mut reader = Cursor::new("0.5 0.2\n0.1 0.9\n");
        let layout = sniff(&mut reader, DEFAULT_SNIFF_LINES, false).unwrap();
        let parsed = parse_lines(&mut reader, &layout).unwrap();
        assert_eq!(parsed.features.shape, (2, 2));
        assert!(parsed.labels.is_none());
    }

    #[test]
    fn test_parse_sparse() {
        let parsed = parse_str("1 1:0.5\n0 2:0.9\n").unwrap();
        assert_tensors_eq(
            &parsed.features,
            &Tensor::new_with_shape(vec![0.0, 0.5, 0.0, 0.0, 0.0, 0.9], (2, 3)),
        );
        assert_eq!(parsed.labels, Some(vec![1.0, 0.0]));
    }

    #[test]
    fn test_parse_sparse_label_only_record() {
        let parsed = parse_str("1 0:2.0\n3\n").unwrap();
        assert_eq!(parsed.features.data, vec![2.0, 0.0]);
        assert_eq!(parsed.labels, Some(vec![1.0, 3.0]));
    }

    #[test]
    fn test_dense_and_sparse_agree() {
        let dense = parse_str("2 0 1.5 0 -3\n5 4 0 0 0\n").unwrap();
        let sparse = parse_str("2 1:1.5 3:-3\n5 0:4 3:0\n").unwrap();
        assert_tensors_eq(&dense.features, &sparse.features);
        assert_eq!(dense.labels, sparse.labels);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_str("1 0.5 x\n"),
            Err(Error::Parse { line: 1, .. })
        ));
        // Sparse detected from first line, second line has a bare value
        assert!(matches!(
            parse_str("1 1:0.5\n0 2:0.9 7\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        // Label on some records but not others
        assert!(matches!(
            parse_str("1 1:0.5\n2:0.9\n"),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            parse_str("1:0.5\n1 2:0.9\n"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_parse_index_out_of_range() {
        let mut reader = Cursor::new("1 5:0.5\n");
        let layout = FileLayout {
            encoding: Encoding::Sparse,
            lines: 1,
            dimension: 3,
            labeled: true,
        };
        assert!(matches!(
            parse_lines(&mut reader, &layout),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_huge_sparse_index() {
        let overflow = format!("1 {}:1.0\n", usize::MAX);
        assert!(matches!(
            find_max_dimension(Cursor::new(overflow)),
            Err(Error::Parse { line: 1, .. })
        ));

        let huge = format!("1 {}:1.0\n0 1:1\n1 2:2\n0 3:3\n", 1usize << 62);
        let mut reader = Cursor::new(huge);
        let layout = sniff(&mut reader, DEFAULT_SNIFF_LINES, true).unwrap();
        assert!(matches!(
            parse_lines(&mut reader, &layout),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_unallocatable_layout() {
        let layout = FileLayout {
            encoding: Encoding::Sparse,
            lines: 1,
            dimension: usize::MAX / 4,
            labeled: true,
        };
        assert!(matches!(
            parse_lines(Cursor::new("1 0:1\n"), &layout),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_fewer_records_reports_last_line() {
        let layout = FileLayout {
            encoding: Encoding::Dense,
            lines: 3,
            dimension: 1,
            labeled: true,
        };
        assert!(matches!(
            parse_lines(Cursor::new("1 2\n\n\n0 3\n"), &layout),
            Err(Error::Parse { line: 4, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_parse_error() {
        let bytes: &[u8] = b"1 2\n\xff 3\n";
        assert!(matches!(
            get_line_number(Cursor::new(bytes)),
            Err(Error::Parse { line: 2, .. })
        ));
        assert!(matches!(
            is_sparse(Cursor::new(bytes), DEFAULT_SNIFF_LINES),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_sparse_token_after_sniff_prefix() {
        let file = write_data_file("1 2\n3 1:4\n");
        let result = read_data_file(file.path(), 1, true);
        assert!(matches!(result, Err(Error::Parse { line: 2, .. })));
    }

    #[test]
    fn test_read_data_file() {
        let file = write_data_file("1 1:0.5\n\n0 2:0.9");
        let (layout, parsed) = read_data_file(file.path(), DEFAULT_SNIFF_LINES, true).unwrap();
        assert_eq!(layout.lines, 2);
        assert_eq!(parsed.features.rows(), 2);
    }
}
