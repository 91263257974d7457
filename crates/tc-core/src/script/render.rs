use super::model::{ScriptModel, ScriptValue};
use indexmap::IndexMap;

fn longest_key<'a, I>(keys: I) -> usize
where
    I: IntoIterator<Item = &'a String>,
{
    keys.into_iter().map(String::len).max().unwrap_or(0)
}

fn push_line(text: &mut String, line: &str) {
    text.push_str(line.trim_end());
    text.push('\n');
}

/// Renders a script model back into scripting-file text.
///
/// This is the directive grammar in reverse: keys in insertion order, one
/// line per row of a repeated key, `xyzguess` and `rbi` expanded into their
/// directive forms. The output re-parses into an equal model, except that a
/// single-element row list collapses back to a scalar.
pub fn render_script(model: &ScriptModel) -> String {
    let width = longest_key(model.iter().map(|(key, _)| key));
    let mut text = String::new();

    for (key, value) in model.iter() {
        match value {
            ScriptValue::Empty => push_line(&mut text, key),
            ScriptValue::Scalar(scalar) => {
                push_line(&mut text, &format!("{key:<width$} {scalar}"));
            }
            ScriptValue::Rows(rows) => {
                for row in rows {
                    push_line(&mut text, &format!("{key} {row}"));
                }
            }
            ScriptValue::Guesses(guesses) => {
                let inner = longest_key(guesses.keys());
                for (component, tokens) in guesses {
                    push_line(
                        &mut text,
                        &format!("{key} {component:<inner$} {}", tokens.join(" ")),
                    );
                }
            }
            ScriptValue::Proportions(rbi) => text.push_str(&rbi.to_script_text()),
        }
    }

    text
}

/// Renders the preferences table as padded `key value` lines.
pub fn render_prefs(prefs: &IndexMap<String, String>) -> String {
    let width = longest_key(prefs.keys());
    let mut text = String::new();
    for (key, value) in prefs {
        push_line(&mut text, &format!("{key:<width$} {value}"));
    }
    text
}
