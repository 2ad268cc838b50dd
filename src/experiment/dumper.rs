//! Per-run result files.
//!
//! For run `k` three files are written into the result directory:
//!
//! - `i_k.json`: `{"elapsed time": <seconds>, "solutions found": <n>}`
//! - `s_k.txt`: one `(o1, o2[, o3])` objective tuple per line
//! - `v_k.txt`: one `(0, 1, ...)` decision vector per line

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::error::{NrpError, Result};
use crate::problem::Solution;

#[derive(Debug, Serialize)]
struct RunInfo {
    #[serde(rename = "elapsed time")]
    elapsed_time: f64,
    #[serde(rename = "solutions found")]
    solutions_found: usize,
}

/// Writes run results below one directory.
#[derive(Debug, Clone)]
pub struct Dumper {
    result_path: PathBuf,
}

impl Dumper {
    /// Creates the result directory if it does not exist yet.
    pub fn new(result_path: impl Into<PathBuf>) -> Result<Self> {
        let result_path = result_path.into();
        std::fs::create_dir_all(&result_path).map_err(|source| NrpError::Write {
            path: result_path.clone(),
            source,
        })?;
        Ok(Self { result_path })
    }

    pub fn result_path(&self) -> &Path {
        &self.result_path
    }

    /// Writes the info, objective and variable files of run `run`.
    pub fn dump(&self, run: usize, solutions: &[Solution], elapsed: Duration) -> Result<()> {
        let info = RunInfo {
            elapsed_time: elapsed.as_secs_f64(),
            solutions_found: solutions.len(),
        };
        self.write(&format!("i_{run}.json"), &serde_json::to_string(&info)?)?;

        let objectives = lines(solutions, |s| {
            s.objectives().iter().map(|v| format!("{v:?}")).collect()
        });
        self.write(&format!("s_{run}.txt"), &objectives)?;

        let variables = lines(solutions, |s| {
            s.bits()
                .iter()
                .map(|&b| if b { "1" } else { "0" }.to_string())
                .collect()
        });
        self.write(&format!("v_{run}.txt"), &variables)
    }

    fn write(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.result_path.join(name);
        std::fs::write(&path, contents).map_err(|source| NrpError::Write { path, source })
    }
}

/// One parenthesised, comma-separated tuple per solution.
fn lines(solutions: &[Solution], fields: impl Fn(&Solution) -> Vec<String>) -> String {
    solutions
        .iter()
        .map(|solution| format!("({})\n", fields(solution).join(", ")))
        .collect()
}
