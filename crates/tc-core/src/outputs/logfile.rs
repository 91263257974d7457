use crate::domain::{TcError, TcResult};
use crate::tables::RbiTable;
use indexmap::IndexMap;

/// The program version the adapter is tested against. Anything else is an
/// advisory, never an error.
pub const KNOWN_VERSION: &str = "3.50";

/// Structured fields recovered from one run log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogSummary {
    pub rbi: Option<RbiTable>,
    pub phases: Option<Vec<String>>,
    pub pressure: Option<f64>,
    pub temperature: Option<f64>,
    pub composition: IndexMap<String, f64>,
    pub modes: Option<IndexMap<String, f64>>,
    pub advisories: Vec<String>,
}

fn parse_float(token: &str, context: &str) -> TcResult<f64> {
    token.parse::<f64>().map_err(|_| {
        TcError::output_parse(
            "PARSE.LOG_NUMBER",
            format!("{context}: '{token}' is not a number"),
        )
    })
}

/// Tokenised scan of the run log (`tc-log.txt`).
///
/// Recognizes the version announcement, repeated `rbi` lines (same grammar
/// as the script directive), the `phases:` list, `ptguess` pressure and
/// temperature, repeated `xyzguess` lines, and the `mode` two-line
/// micro-record whose values sit on the next physical line.
pub fn parse_log(text: &str) -> TcResult<LogSummary> {
    let mut summary = LogSummary::default();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&key, args)) = tokens.split_first() else {
            continue;
        };

        match key {
            "THERMOCALC" => match args.first() {
                Some(&version) if version != KNOWN_VERSION => {
                    summary.advisories.push(format!(
                        "only tested against version {KNOWN_VERSION}; detected version is {version}",
                    ));
                }
                Some(_) => {}
                None => {
                    summary.advisories.push(format!(
                        "unable to detect program version; only tested against {KNOWN_VERSION}",
                    ));
                }
            },
            "rbi" => match summary.rbi.as_mut() {
                None => summary.rbi = Some(RbiTable::new(args)),
                Some(rbi) => rbi.add_row(args)?,
            },
            "phases:" => {
                summary.phases = Some(args.iter().map(|token| token.to_string()).collect());
            }
            "ptguess" => {
                let (Some(&p), Some(&t)) = (args.first(), args.get(1)) else {
                    return Err(TcError::output_parse(
                        "PARSE.LOG_PTGUESS",
                        "'ptguess' line needs pressure and temperature tokens",
                    ));
                };
                summary.pressure = Some(parse_float(p, "ptguess pressure")?);
                summary.temperature = Some(parse_float(t, "ptguess temperature")?);
            }
            "xyzguess" => {
                let (Some(&name), Some(&value)) = (args.first(), args.get(1)) else {
                    return Err(TcError::output_parse(
                        "PARSE.LOG_XYZGUESS",
                        "'xyzguess' line needs a name and a value",
                    ));
                };
                summary
                    .composition
                    .insert(name.to_string(), parse_float(value, "xyzguess value")?);
            }
            "mode" => {
                // Fixed two-line micro-record: names here, values on the next
                // physical line, zipped positionally.
                let values_line = lines.next().unwrap_or("");
                let mut modes = IndexMap::with_capacity(args.len());
                for (name, value) in args.iter().zip(values_line.split_whitespace()) {
                    modes.insert((*name).to_string(), parse_float(value, "mode value")?);
                }
                summary.modes = Some(modes);
            }
            _ => {}
        }
    }

    Ok(summary)
}
