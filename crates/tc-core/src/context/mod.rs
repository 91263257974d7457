mod exec;

pub use exec::{
    DEFAULT_EXECUTABLE, EXECUTABLE_ENV_VAR, ProgramRunner, RunOutput, SystemRunner,
    resolve_executable,
};

use crate::domain::{TcError, TcResult};
use crate::encoding::decode_cp437;
use crate::outputs::{ResultValue, RunResults, keys, parse_ic, parse_log};
use crate::script::{ScriptModel, ScriptValue, parse_prefs, parse_script, render_prefs, render_script};
use indexmap::IndexMap;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

const PREFS_FILE: &str = "tc-prefs.txt";
const LOG_FILE: &str = "tc-log.txt";

/// Answer fed to the program's interactive prompt so it always terminates.
const PROMPT_DECLINE: &[u8] = b"n\n";

fn random_id<R: Rng>(rng: &mut R) -> String {
    (0..6).map(|_| rng.gen_range(b'a'..=b'z') as char).collect()
}

/// Construction inputs for a [`Context`]. All fields are optional: an empty
/// set of options gives an empty context resolving `thermo` from `PATH`,
/// with a random scratch directory under the system temp dir.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub scripts_dir: Option<PathBuf>,
    pub executable: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    /// Overrides the random session id; used by tests for determinism.
    pub fixed_id: Option<String>,
}

impl ContextOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = Some(dir.into());
        self
    }

    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    pub fn temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn fixed_id(mut self, id: impl Into<String>) -> Self {
        self.fixed_id = Some(id.into());
        self
    }
}

/// One logical calculation session against the external program.
///
/// Owns the resolved executable, the preferences table, the script model and
/// an isolated scratch directory named after a random six-letter id, so
/// concurrent contexts never collide on disk. `reload()` rebuilds
/// configuration from the scripts directory wholesale; `execute()` runs a
/// fresh write/run/parse cycle, overwriting any prior outputs in the scratch
/// directory.
#[derive(Debug)]
pub struct Context {
    executable: PathBuf,
    scripts_dir: Option<PathBuf>,
    scratch_dir: PathBuf,
    id: String,
    prefs: IndexMap<String, String>,
    script: ScriptModel,
}

impl Context {
    /// Resolves the executable, loads configuration, then creates the
    /// scratch directory. Any failure leaves no scratch directory behind.
    pub fn new(options: ContextOptions) -> TcResult<Self> {
        let executable = resolve_executable(options.executable.as_deref())?;
        let id = options
            .fixed_id
            .unwrap_or_else(|| random_id(&mut rand::thread_rng()));

        let mut context = Self {
            executable,
            scripts_dir: options.scripts_dir,
            scratch_dir: PathBuf::new(),
            id,
            prefs: IndexMap::new(),
            script: ScriptModel::new(),
        };
        context.reload()?;

        let scratch_dir = options
            .temp_dir
            .unwrap_or_else(|| std::env::temp_dir().join(format!("TC_{}", context.id)));
        fs::create_dir_all(&scratch_dir).map_err(|source| {
            TcError::io_system(
                "IO.SCRATCH_DIR",
                format!(
                    "unable to create scratch directory '{}': {source}",
                    scratch_dir.display()
                ),
            )
        })?;
        context.scratch_dir = scratch_dir;
        Ok(context)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub fn prefs(&self) -> &IndexMap<String, String> {
        &self.prefs
    }

    pub fn prefs_mut(&mut self) -> &mut IndexMap<String, String> {
        &mut self.prefs
    }

    pub fn script(&self) -> &ScriptModel {
        &self.script
    }

    pub fn script_mut(&mut self) -> &mut ScriptModel {
        &mut self.script
    }

    /// Rebuilds preferences and script from the scripts directory, fully
    /// replacing prior state. With no scripts directory this resets the
    /// context to its defaults.
    pub fn reload(&mut self) -> TcResult<()> {
        self.prefs = IndexMap::new();
        self.prefs.insert("calcmode".to_string(), "1".to_string());
        self.prefs.insert("scriptfile".to_string(), self.id.clone());

        self.script = ScriptModel::new();
        self.script.set("axfile", ScriptValue::Empty);
        self.script.set("autoexit", ScriptValue::Scalar("yes".to_string()));

        let Some(dir) = self.scripts_dir.clone() else {
            return Ok(());
        };

        let prefs_path = dir.join(PREFS_FILE);
        if !prefs_path.is_file() {
            return Err(TcError::config(
                "CONFIG.PREFS_MISSING",
                format!("unable to find '{PREFS_FILE}' in '{}'", dir.display()),
            ));
        }
        let prefs_text = read_text(&prefs_path, "IO.PREFS_READ")?;
        parse_prefs(prefs_text.lines(), &mut self.prefs);

        let dataset = self.prefs.get("dataset").cloned().ok_or_else(|| {
            TcError::config(
                "CONFIG.DATASET",
                format!("'dataset' does not appear to be specified in '{PREFS_FILE}'"),
            )
        })?;
        let dataset_name = format!("tc-ds{dataset}.txt");
        if !dir.join(&dataset_name).is_file() {
            return Err(TcError::config(
                "CONFIG.DATASET_FILE",
                format!(
                    "unable to find dataset file '{dataset_name}' in '{}'",
                    dir.display()
                ),
            ));
        }

        let script_name = self.script_file_name()?;
        let script_path = dir.join(&script_name);
        if !script_path.is_file() {
            return Err(TcError::config(
                "CONFIG.SCRIPTFILE",
                format!(
                    "unable to find scriptfile '{script_name}' in '{}'",
                    dir.display()
                ),
            ));
        }
        let script_text = read_text(&script_path, "IO.SCRIPT_READ")?;
        parse_script(script_text.lines(), &mut self.script)?;

        self.check_config()
    }

    /// Sanity checks over the current configuration; raises on the first
    /// problem, naming the offending key.
    pub fn check_config(&self) -> TcResult<()> {
        if !self.prefs.contains_key("dataset") {
            return Err(TcError::config(
                "CONFIG.DATASET",
                format!("'dataset' does not appear to be specified in '{PREFS_FILE}'"),
            ));
        }

        match self.prefs.get("calcmode") {
            None => {
                return Err(TcError::config(
                    "CONFIG.CALCMODE",
                    format!("'calcmode' does not appear to be specified in '{PREFS_FILE}'"),
                ));
            }
            Some(mode) if mode.parse::<i64>() != Ok(1) => {
                return Err(TcError::config(
                    "CONFIG.CALCMODE",
                    format!("only 'calcmode' 1 is supported, found '{mode}'"),
                ));
            }
            Some(_) => {}
        }

        match self.script.get("axfile") {
            Some(ScriptValue::Scalar(value)) if !value.is_empty() => Ok(()),
            None => Err(TcError::config(
                "CONFIG.AXFILE",
                "your script must specify an 'axfile'",
            )),
            Some(_) => Err(TcError::config(
                "CONFIG.AXFILE",
                "your script must specify a valid 'axfile'",
            )),
        }
    }

    fn script_file_name(&self) -> TcResult<String> {
        let scriptfile = self.prefs.get("scriptfile").ok_or_else(|| {
            TcError::config(
                "CONFIG.SCRIPTFILE",
                format!("'scriptfile' does not appear to be specified in '{PREFS_FILE}'"),
            )
        })?;
        Ok(format!("tc-{scriptfile}.txt"))
    }

    fn ic_file_name(&self) -> TcResult<String> {
        let scriptfile = self.prefs.get("scriptfile").ok_or_else(|| {
            TcError::config(
                "CONFIG.SCRIPTFILE",
                format!("'scriptfile' does not appear to be specified in '{PREFS_FILE}'"),
            )
        })?;
        Ok(format!("tc-{scriptfile}-ic.txt"))
    }

    fn axfile_name(&self) -> TcResult<String> {
        match self.script.get("axfile") {
            Some(ScriptValue::Scalar(value)) if !value.is_empty() => Ok(format!("tc-{value}.txt")),
            _ => Err(TcError::config(
                "CONFIG.AXFILE",
                "your script must specify a valid 'axfile'",
            )),
        }
    }

    fn stage_input_file(&self, datasets_dir: &Path, name: &str) -> TcResult<()> {
        let from = datasets_dir.join(name);
        let to = self.scratch_dir.join(name);
        fs::copy(&from, &to).map_err(|source| {
            TcError::io_system(
                "IO.STAGE_INPUT",
                format!(
                    "unable to copy '{name}' from '{}': {source}",
                    datasets_dir.display()
                ),
            )
        })?;
        Ok(())
    }

    /// Serializes configuration into the scratch directory, stages the
    /// dataset and axfile inputs, runs the program, and parses every
    /// recognized output artifact into a fresh result set.
    ///
    /// Output-parse failures are isolated per artifact and reported as
    /// advisories on the result set; only configuration and I/O failures
    /// abort the call.
    pub fn execute(
        &self,
        runner: &dyn ProgramRunner,
        datasets_dir: Option<&Path>,
    ) -> TcResult<RunResults> {
        self.check_config()?;

        write_text(
            &self.scratch_dir.join(PREFS_FILE),
            &render_prefs(&self.prefs),
            "IO.PREFS_WRITE",
        )?;
        write_text(
            &self.scratch_dir.join(self.script_file_name()?),
            &render_script(&self.script),
            "IO.SCRIPT_WRITE",
        )?;

        let datasets_dir = datasets_dir.or(self.scripts_dir.as_deref()).ok_or_else(|| {
            TcError::config(
                "CONFIG.DATASETS_DIR",
                "no datasets directory available; pass one explicitly or create the context from a scripts directory",
            )
        })?;
        let dataset = self.prefs.get("dataset").ok_or_else(|| {
            TcError::config(
                "CONFIG.DATASET",
                format!("'dataset' does not appear to be specified in '{PREFS_FILE}'"),
            )
        })?;
        self.stage_input_file(datasets_dir, &format!("tc-ds{dataset}.txt"))?;
        self.stage_input_file(datasets_dir, &self.axfile_name()?)?;

        let output = runner.run(&self.executable, &self.scratch_dir, PROMPT_DECLINE)?;

        let mut results = RunResults::new();
        results.insert(keys::OUTPUT_STDOUT, ResultValue::Text(decode_cp437(&output.stdout)));
        results.insert(keys::OUTPUT_STDERR, ResultValue::Text(decode_cp437(&output.stderr)));

        self.absorb_log(&mut results);
        self.absorb_ic(&mut results)?;

        Ok(results)
    }

    fn absorb_log(&self, results: &mut RunResults) {
        let path = self.scratch_dir.join(LOG_FILE);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => {
                results.push_advisory(format!("unable to read '{LOG_FILE}': {source}"));
                return;
            }
        };
        let text = decode_cp437(&bytes);

        match parse_log(&text) {
            Ok(summary) => {
                if let Some(rbi) = summary.rbi {
                    results.insert(keys::RBI, ResultValue::Proportions(rbi));
                }
                if let Some(phases) = summary.phases {
                    results.insert(keys::PHASES, ResultValue::Words(phases));
                }
                if let Some(pressure) = summary.pressure {
                    results.insert(keys::PRESSURE, ResultValue::Number(pressure));
                }
                if let Some(temperature) = summary.temperature {
                    results.insert(keys::TEMPERATURE, ResultValue::Number(temperature));
                }
                if !summary.composition.is_empty() {
                    results.insert(keys::XYZ, ResultValue::NumberMap(summary.composition));
                }
                if let Some(modes) = summary.modes {
                    results.insert(keys::MODES, ResultValue::NumberMap(modes));
                }
                for advisory in summary.advisories {
                    results.push_advisory(advisory);
                }
            }
            Err(error) => results.push_advisory(format!("error parsing '{LOG_FILE}': {error}")),
        }

        results.insert(keys::OUTPUT_TC_LOG, ResultValue::Text(text));
    }

    fn absorb_ic(&self, results: &mut RunResults) -> TcResult<()> {
        let name = self.ic_file_name()?;
        let path = self.scratch_dir.join(&name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => {
                results.push_advisory(format!("unable to read '{name}': {source}"));
                return Ok(());
            }
        };
        let text = decode_cp437(&bytes);

        match parse_ic(&text) {
            Ok(summary) => {
                if let Some(fractions) = summary.site_fractions {
                    results.insert(keys::SITE_FRACTIONS, ResultValue::SiteFractions(fractions));
                }
                if let Some(bulk) = summary.bulk_composition {
                    results.insert(keys::BULK_COMPOSITION, ResultValue::NumberMap(bulk));
                }
                if let Some(properties) = summary.properties {
                    results.insert(
                        keys::THERMODYNAMIC_PROPERTIES,
                        ResultValue::Properties(properties),
                    );
                }
                for advisory in summary.advisories {
                    results.push_advisory(advisory);
                }
            }
            Err(error) => results.push_advisory(format!("error parsing '{name}': {error}")),
        }

        results.insert(keys::OUTPUT_TC_IC, ResultValue::Text(text));
        Ok(())
    }
}

fn read_text(path: &Path, code: &str) -> TcResult<String> {
    fs::read_to_string(path).map_err(|source| {
        TcError::io_system(code, format!("failed to read '{}': {source}", path.display()))
    })
}

fn write_text(path: &Path, text: &str, code: &str) -> TcResult<()> {
    fs::write(path, text).map_err(|source| {
        TcError::io_system(code, format!("failed to write '{}': {source}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::random_id;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_ids_are_six_lowercase_letters() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..64 {
            let id = random_id(&mut rng);
            assert_eq!(id.len(), 6);
            assert!(id.chars().all(|character| character.is_ascii_lowercase()));
        }
    }

    #[test]
    fn seeded_generators_are_deterministic() {
        let first = random_id(&mut StdRng::seed_from_u64(42));
        let second = random_id(&mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
