use crate::domain::{TcError, TcResult};
use crate::tables::{PropertyTable, SiteFractions};
use indexmap::IndexMap;

/// Structured fields recovered from one information-content report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IcSummary {
    pub site_fractions: Option<SiteFractions>,
    pub bulk_composition: Option<IndexMap<String, f64>>,
    pub properties: Option<PropertyTable>,
    pub advisories: Vec<String>,
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn parse_float(token: &str, context: &str) -> TcResult<f64> {
    token.parse::<f64>().map_err(|_| {
        TcError::output_parse(
            "PARSE.IC_NUMBER",
            format!("{context}: '{token}' is not a number"),
        )
    })
}

/// Section-oriented scan of the information-content report
/// (`tc-<scriptfile>-ic.txt`), keyed on exact trimmed marker lines.
///
/// A `site fractions` marker feeds following lines into the two-line block
/// accumulator until a blank line. An `oxide compositions` marker reads a
/// header line and keeps only the `bulk` row, then the first header/data
/// block that follows becomes the thermodynamic-property table; later blocks
/// of the same shape are ignored.
pub fn parse_ic(text: &str) -> TcResult<IcSummary> {
    let mut summary = IcSummary::default();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        match line.trim() {
            "site fractions" => {
                let mut fractions = SiteFractions::new();
                for block_line in lines.by_ref() {
                    if is_blank(block_line) {
                        break;
                    }
                    let tokens: Vec<&str> = block_line.split_whitespace().collect();
                    fractions.add_line(&tokens)?;
                }
                if !fractions.is_complete() {
                    summary.advisories.push(
                        "site-fraction block ended before its last value line; unfilled columns kept as unset"
                            .to_string(),
                    );
                }
                summary.site_fractions = Some(fractions);
            }
            "oxide compositions" => {
                let header: Vec<String> = lines
                    .next()
                    .unwrap_or("")
                    .split_whitespace()
                    .map(str::to_string)
                    .collect();

                let mut bulk = IndexMap::new();
                for row_line in lines.by_ref() {
                    if is_blank(row_line) {
                        break;
                    }
                    let tokens: Vec<&str> = row_line.split_whitespace().collect();
                    // Only the bulk row matters; per-phase rows are discarded.
                    if tokens.first() == Some(&"bulk") {
                        for (oxide, value) in header.iter().zip(&tokens[1..]) {
                            bulk.insert(oxide.clone(), parse_float(value, "bulk composition")?);
                        }
                    }
                }
                summary.bulk_composition = Some(bulk);

                // The property table is assumed to start on the very next
                // line; a blank line there means the report carries none.
                let Some(header_line) = lines.next() else {
                    continue;
                };
                if is_blank(header_line) {
                    continue;
                }
                let mut properties = PropertyTable::new(header_line.split_whitespace());
                for row_line in lines.by_ref() {
                    if is_blank(row_line) {
                        break;
                    }
                    let tokens: Vec<&str> = row_line.split_whitespace().collect();
                    properties.add_row(&tokens)?;
                }
                if summary.properties.is_none() {
                    summary.properties = Some(properties);
                }
            }
            _ => {}
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::parse_ic;

    const SAMPLE: &str = concat!(
        "some preamble the scanner ignores\n",
        "\n",
        "site fractions\n",
        "g          xMgX      xFeX\n",
        "        0.13698   0.82757\n",
        "bi        xMgM3     xFeM3\n",
        "        0.23132   0.50716\n",
        "\n",
        "oxide compositions\n",
        "         H2O     SiO2    Al2O3\n",
        "g       0.000   40.103   22.010\n",
        "bulk    4.423   65.929    9.372\n",
        "\n",
        "          mode        G        H\n",
        "g        0.021   -6419.8   -5231.1\n",
        "bi       0.145   -8842.2   -7120.9\n",
        "\n",
    );

    #[test]
    fn sample_report_yields_all_three_sections() {
        let summary = parse_ic(SAMPLE).expect("sample report should parse");

        let fractions = summary.site_fractions.expect("site fractions should parse");
        assert!(fractions.is_complete());
        assert_eq!(fractions.len(), 2);
        assert_eq!(
            fractions.group("g").and_then(|group| group.get("xFeX").cloned()),
            Some(Some("0.82757".to_string())),
        );

        let bulk = summary.bulk_composition.expect("bulk composition should parse");
        assert_eq!(bulk.get("H2O"), Some(&4.423));
        assert_eq!(bulk.len(), 3);
        assert!(!bulk.contains_key("g"), "per-phase rows must be discarded");

        let properties = summary.properties.expect("property table should parse");
        assert_eq!(properties.header(), ["mode", "G", "H"]);
        assert_eq!(
            properties.row("bi").and_then(|row| row.get("G")).map(String::as_str),
            Some("-8842.2"),
        );
    }

    #[test]
    fn only_the_first_property_block_is_materialized() {
        let report = concat!(
            "oxide compositions\n",
            "      H2O\n",
            "bulk  1.0\n",
            "\n",
            "      G\n",
            "g     -1.0\n",
            "\n",
            "oxide compositions\n",
            "      H2O\n",
            "bulk  2.0\n",
            "\n",
            "      S\n",
            "g     9.9\n",
            "\n",
        );
        let summary = parse_ic(report).expect("report should parse");
        let properties = summary.properties.expect("first block should be kept");
        assert_eq!(properties.header(), ["G"]);
        // the second marker still refreshes the bulk composition
        assert_eq!(
            summary.bulk_composition.and_then(|bulk| bulk.get("H2O").copied()),
            Some(2.0),
        );
    }

    #[test]
    fn blank_line_after_oxides_means_no_property_table() {
        let report = "oxide compositions\n      H2O\nbulk  1.0\n\n\nlater text\n";
        let summary = parse_ic(report).expect("report should parse");
        assert!(summary.properties.is_none());
        assert!(summary.bulk_composition.is_some());
    }

    #[test]
    fn dangling_site_fraction_group_is_an_advisory() {
        let report = "site fractions\ng  xMgX  xFeX\n\n";
        let summary = parse_ic(report).expect("report should parse");
        assert_eq!(summary.advisories.len(), 1);
        let fractions = summary.site_fractions.expect("filled groups kept");
        assert!(!fractions.is_complete());
        assert_eq!(fractions.group("g").and_then(|group| group.get("xMgX").cloned()), Some(None));
    }

    #[test]
    fn bad_bulk_number_fails_the_report_parse() {
        let report = "oxide compositions\n      H2O\nbulk  lots\n\n";
        let error = parse_ic(report).expect_err("non-numeric bulk should fail");
        assert_eq!(error.code(), "PARSE.IC_NUMBER");
    }
}
