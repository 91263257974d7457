use super::model::{ScriptModel, ScriptValue};
use crate::domain::{TcError, TcResult};
use crate::tables::RbiTable;
use indexmap::IndexMap;
use std::collections::HashMap;

/// Strips the `%` comment and tokenises the remainder. Everything from the
/// first `%` to end of line is discardable context.
fn directive_tokens(line: &str) -> Vec<&str> {
    let content = line.split('%').next().unwrap_or("");
    content.split_whitespace().collect()
}

/// Parses scripting-file lines into `model`, applying the directive grammar:
/// `%` comments, the `*` stop sentinel, the two nested-table keys
/// (`xyzguess`, `rbi`), and scalar-to-row-list promotion for repeated plain
/// keys.
///
/// Occurrence counting is per parse call, so keys pre-seeded on the model
/// (defaults) are overwritten by their first in-file occurrence rather than
/// demoted.
pub fn parse_script<'a, I>(lines: I, model: &mut ScriptModel) -> TcResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut occurrences: HashMap<String, usize> = HashMap::new();

    for line in lines {
        let tokens = directive_tokens(line);
        let Some((&key, args)) = tokens.split_first() else {
            continue;
        };
        if key == "*" {
            break;
        }

        match key {
            "xyzguess" => {
                let Some((&component, rest)) = args.split_first() else {
                    return Err(TcError::config(
                        "CONFIG.XYZGUESS",
                        "'xyzguess' directive requires a component name",
                    ));
                };
                model.merge_guess(component, rest.iter().map(|token| token.to_string()).collect());
            }
            "rbi" => match model.rbi_mut() {
                None => model.set("rbi", ScriptValue::Proportions(RbiTable::new(args))),
                Some(rbi) => rbi.add_row(args)?,
            },
            _ => {
                let value = if args.is_empty() {
                    None
                } else {
                    let joined = args.join(" ");
                    if joined == "ask" {
                        return Err(TcError::config(
                            "CONFIG.ASK",
                            format!("key '{key}': interactive 'ask' values are not supported"),
                        ));
                    }
                    Some(joined)
                };

                let seen = occurrences.entry(key.to_string()).or_insert(0);
                *seen += 1;
                if *seen == 1 {
                    let entry = match value {
                        Some(joined) => ScriptValue::Scalar(joined),
                        None => ScriptValue::Empty,
                    };
                    model.set(key, entry);
                } else {
                    model.append_row(key, value.unwrap_or_default())?;
                }
            }
        }
    }

    Ok(())
}

/// Parses the simpler preferences grammar into `prefs`: `key value` pairs
/// with the same `%` comment rule, no repeats, no nesting. Lines with fewer
/// than two tokens are skipped.
pub fn parse_prefs<'a, I>(lines: I, prefs: &mut IndexMap<String, String>)
where
    I: IntoIterator<Item = &'a str>,
{
    for line in lines {
        let tokens = directive_tokens(line);
        if tokens.len() > 1 {
            prefs.insert(tokens[0].to_string(), tokens[1].to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_prefs, parse_script};
    use crate::script::model::{ScriptModel, ScriptValue};
    use indexmap::IndexMap;

    fn parsed(source: &str) -> ScriptModel {
        let mut model = ScriptModel::new();
        parse_script(source.lines(), &mut model).expect("script should parse");
        model
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let model = parsed("% header comment\n\naxfile mb50 % trailing\n   % indented comment\n");
        assert_eq!(model.get("axfile").and_then(ScriptValue::as_scalar), Some("mb50"));
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn star_sentinel_stops_the_whole_file() {
        let model = parsed("axfile mb50\n*\nsetPwindow 2 12\n");
        assert!(model.get("setPwindow").is_none());
        assert!(model.contains("axfile"));
    }

    #[test]
    fn occurrence_count_drives_scalar_to_rows_promotion() {
        let once = parsed("samecoding mu pa\n");
        assert_eq!(once.get("samecoding").and_then(ScriptValue::as_scalar), Some("mu pa"));

        let twice = parsed("samecoding mu pa\nsamecoding sp mt\n");
        assert_eq!(
            twice.get("samecoding").and_then(ScriptValue::as_rows),
            Some(&["mu pa".to_string(), "sp mt".to_string()][..]),
        );

        let thrice = parsed("samecoding mu pa\nsamecoding sp mt\nsamecoding g liq\n");
        assert_eq!(thrice.get("samecoding").and_then(ScriptValue::as_rows).map(<[String]>::len), Some(3));
    }

    #[test]
    fn first_in_file_occurrence_overwrites_a_preseeded_default() {
        let mut model = ScriptModel::new();
        model.set("autoexit", ScriptValue::Scalar("yes".to_string()));
        parse_script("autoexit no\n".lines(), &mut model).expect("script should parse");
        assert_eq!(model.get("autoexit").and_then(ScriptValue::as_scalar), Some("no"));
    }

    #[test]
    fn keyless_directive_becomes_empty_value() {
        let model = parsed("dogmin\n");
        assert_eq!(model.get("dogmin"), Some(&ScriptValue::Empty));
    }

    #[test]
    fn ask_value_is_a_fatal_configuration_error() {
        let mut model = ScriptModel::new();
        let error = parse_script("calctatp ask\n".lines(), &mut model)
            .expect_err("'ask' should be rejected");
        assert_eq!(error.code(), "CONFIG.ASK");
        assert!(error.message().contains("calctatp"));
    }

    #[test]
    fn rbi_lines_build_header_then_rows() {
        let model = parsed(concat!(
            "rbi  SiO2 Al2O3 FeO\n",
            "rbi  g   0.18  3.0 0.98 1.2\n",
            "rbi  bi  0.11  2.8 0.65 1.9\n",
        ));
        let rbi = model.rbi().expect("rbi table should exist");
        assert_eq!(rbi.oxides(), ["SiO2", "Al2O3", "FeO"]);
        assert_eq!(rbi.len(), 2);
    }

    #[test]
    fn rbi_row_with_wrong_oxide_count_fails_parse() {
        let mut model = ScriptModel::new();
        let error = parse_script("rbi SiO2 Al2O3\nrbi g 0.5 1.0\n".lines(), &mut model)
            .expect_err("short rbi row should fail");
        assert!(error.message().contains("'g'"));
    }

    #[test]
    fn xyzguess_directives_merge_into_one_table() {
        let model = parsed("xyzguess x(g) 0.885\nxyzguess z(g) 0.245 0 1\n");
        let guesses = model.guesses().expect("guesses should exist");
        assert_eq!(guesses.get("z(g)"), Some(&vec!["0.245".to_string(), "0".to_string(), "1".to_string()]));
    }

    #[test]
    fn prefs_grammar_takes_first_two_tokens() {
        let mut prefs = IndexMap::new();
        parse_prefs(
            "calcmode 1\n% comment\nscriptfile test extra-token\ndataset 55\n".lines(),
            &mut prefs,
        );
        assert_eq!(prefs.get("calcmode").map(String::as_str), Some("1"));
        assert_eq!(prefs.get("scriptfile").map(String::as_str), Some("test"));
        assert_eq!(prefs.get("dataset").map(String::as_str), Some("55"));
    }
}
