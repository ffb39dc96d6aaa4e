use csv::ReaderBuilder;
use tracing::warn;

/// The daily file ends with two summary lines (theoretical total quantity
/// and the index reductor) that are not constituent rows.
pub const TRAILING_SUMMARY_ROWS: usize = 2;

/// Remap a localized header label to its canonical field name. Exact match
/// only, accents and case included; anything unrecognized keeps its
/// original token and is ignored by validation downstream.
pub fn map_header(raw: &str) -> &str {
    match raw {
        "Código" => "codigo",
        "Ação" => "acao",
        "Tipo" => "tipo",
        "Qtde. Teórica" => "qtde_teorica",
        "Part. (%)" => "part",
        other => other,
    }
}

/// B3 serves the file in Latin-1. Each byte maps 1:1 to the Unicode scalar
/// with the same value, so the decode is a straight widening.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// A parsed-but-unvalidated row: mapped field name → raw string value,
/// in source column order.
#[derive(Debug, Clone, Default)]
pub struct CandidateRecord {
    fields: Vec<(String, String)>,
}

impl CandidateRecord {
    fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A row that passed every field-presence and numeric-parse check.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    pub codigo: String,
    pub acao: String,
    pub tipo: String,
    pub qtde_teorica: String,
    pub part: f64,
}

impl ValidatedRecord {
    /// Promote a candidate, or reject it: all four text fields must be
    /// present and non-empty and `part` must coerce to a finite float.
    fn from_candidate(candidate: &CandidateRecord) -> Option<Self> {
        let text = |name: &str| {
            candidate
                .get(name)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Some(Self {
            codigo: text("codigo")?,
            acao: text("acao")?,
            tipo: text("tipo")?,
            qtde_teorica: text("qtde_teorica")?,
            part: coerce_part(candidate.get("part")?)?,
        })
    }
}

/// Coerce a localized decimal: the first comma becomes the decimal point.
/// `"1,2,3"` therefore becomes `"1.2,3"`, fails the parse, and the row is
/// dropped rather than guessed at.
pub fn coerce_part(raw: &str) -> Option<f64> {
    raw.replacen(',', ".", 1)
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Drop the last `n` records. Materialize-everything-then-truncate keeps
/// the trailing-summary removal a standalone step instead of a splice
/// buried in the read loop.
pub fn strip_trailing(mut records: Vec<CandidateRecord>, n: usize) -> Vec<CandidateRecord> {
    records.truncate(records.len().saturating_sub(n));
    records
}

/// Result of normalizing one source file.
#[derive(Debug)]
pub struct NormalizeOutcome {
    pub records: Vec<ValidatedRecord>,
    /// Candidate rows that failed validation, after the trailing strip.
    pub dropped: usize,
}

/// Normalize one raw report: decode Latin-1, discard the title line, remap
/// the header row, parse every data line, strip the trailing summary rows,
/// then validate each remaining candidate in order.
///
/// Per-line problems (column-count drift, quoting damage) are not fatal:
/// the line becomes an empty candidate and falls out at validation.
pub fn normalize(bytes: &[u8]) -> NormalizeOutcome {
    let content = decode_latin1(bytes);

    // First line is a human-readable title, not the header.
    let body = match content.split_once('\n') {
        Some((_title, rest)) => rest,
        None => "",
    };

    let mut reader = ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = reader.records();

    let headers: Vec<String> = match rows.next() {
        Some(Ok(record)) => record.iter().map(|h| map_header(h).to_string()).collect(),
        Some(Err(err)) => {
            warn!(%err, "header row unreadable; no rows can validate");
            Vec::new()
        }
        None => {
            return NormalizeOutcome {
                records: Vec::new(),
                dropped: 0,
            }
        }
    };

    let mut candidates = Vec::new();
    for result in rows {
        match result {
            Ok(record) => {
                let fields = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(name, value)| (name.clone(), value.to_string()))
                    .collect();
                candidates.push(CandidateRecord { fields });
            }
            Err(err) => {
                warn!(%err, "malformed data line; treating as empty row");
                candidates.push(CandidateRecord::default());
            }
        }
    }

    let candidates = strip_trailing(candidates, TRAILING_SUMMARY_ROWS);

    let mut records = Vec::with_capacity(candidates.len());
    let mut dropped = 0;
    for candidate in &candidates {
        match ValidatedRecord::from_candidate(candidate) {
            Some(record) => records.push(record),
            None => {
                warn!(row = ?candidate.fields, "row failed validation; dropped");
                dropped += 1;
            }
        }
    }

    NormalizeOutcome { records, dropped }
}
