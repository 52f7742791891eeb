//! # Arm script interpreter module
//!
//! This module provides an interpreter for arm scripts, allowing
//! telecommands to be executed from these scripts.
//!
//! A script is a list of `<time_s>: <tc_json>;` entries, for example:
//!
//! ```text
//! 0.5: {"ModeSelect": {"mode": 1, "target_position_m": [0.3, 0.0, 0.4]}};
//! 6.0: {"ModeSelect": {"mode": 3}};
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use comms_if::tc::{Tc, TcParseError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The Telecommand to run
    tc: Tc,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_tcs`
/// to acquire a list of telecommands that need executing.
pub struct ScriptInterpreter {
    cmds: VecDeque<Command>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid TC at {0} s: {1}")]
    InvalidTc(f64, TcParseError),
}

#[derive(Debug)]
pub enum PendingTcs {
    None,
    Some(Vec<Tc>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        Self::from_script_str(&script)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {
        let mut tc_queue: VecDeque<Command> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

        for cap in re.captures_iter(script) {
            // Both groups are mandatory in the pattern so are always present
            // in a capture.
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
            let tc_str = cap.get(3).map(|m| m.as_str()).unwrap_or_default();

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            // Parse the TC from the payload. The scripts contain JSON only.
            let tc = Tc::from_json(tc_str).map_err(|e| ScriptError::InvalidTc(exec_time_s, e))?;

            tc_queue.push_back(Command { exec_time_s, tc });
        }

        if tc_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            cmds: tc_queue,
        })
    }

    /// Return the TCs which are due at the current session time.
    pub fn get_pending_tcs(&mut self) -> PendingTcs {
        self.get_pending_tcs_at(get_elapsed_seconds())
    }

    /// Return the TCs which are due at `current_time_s`.
    ///
    /// TCs are returned in script order, each one exactly once.
    pub fn get_pending_tcs_at(&mut self, current_time_s: f64) -> PendingTcs {
        // If the queue is empty the script is over and we return the end of
        // script variant
        if self.cmds.is_empty() {
            return PendingTcs::EndOfScript;
        }

        let mut tc_vec: Vec<Tc> = vec![];

        // Keep popping from the front while the head is due.
        while let Some(cmd) = self.cmds.front() {
            if cmd.exec_time_s >= current_time_s {
                break;
            }

            if let Some(cmd) = self.cmds.pop_front() {
                tc_vec.push(cmd.tc);
            }
        }

        if tc_vec.is_empty() {
            PendingTcs::None
        } else {
            PendingTcs::Some(tc_vec)
        }
    }

    /// Get the number of TCs remaining in the script
    pub fn get_num_tcs(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use comms_if::tc::{CmdVel, ModeSelectRequest};
    use std::io::Write;

    const SCRIPT: &str = "\
        0.5: {\"ModeSelect\": {\"mode\": 1, \"target_position_m\": [0.3, 0.0, 0.4]}};\n\
        1.0: {\"CmdVel\": {\"linear_ms\": [0.0, 0.01, 0.0]}};\n\
        1.0: {\"ModeSelect\": {\"mode\": 2}};\n\
        6.25: {\"ModeSelect\": {\"mode\": 3}};\n";

    #[test]
    fn test_parse_script() {
        let si = ScriptInterpreter::from_script_str(SCRIPT).unwrap();

        assert_eq!(si.get_num_tcs(), 4);
        assert_eq!(si.get_duration(), 6.25);
    }

    #[test]
    fn test_pending_tcs() {
        let mut si = ScriptInterpreter::from_script_str(SCRIPT).unwrap();

        assert!(matches!(si.get_pending_tcs_at(0.1), PendingTcs::None));

        match si.get_pending_tcs_at(0.6) {
            PendingTcs::Some(v) => assert_eq!(
                v,
                vec![Tc::ModeSelect(ModeSelectRequest {
                    mode: 1,
                    target_position_m: Some([0.3, 0.0, 0.4])
                })]
            ),
            p => panic!("Expected one TC, got {:?}", p),
        }

        match si.get_pending_tcs_at(2.0) {
            PendingTcs::Some(v) => {
                assert_eq!(v.len(), 2);
                assert_eq!(
                    v[0],
                    Tc::CmdVel(CmdVel {
                        linear_ms: [0.0, 0.01, 0.0]
                    })
                );
            }
            p => panic!("Expected two TCs, got {:?}", p),
        }

        assert!(matches!(si.get_pending_tcs_at(10.0), PendingTcs::Some(_)));
        assert!(matches!(si.get_pending_tcs_at(11.0), PendingTcs::EndOfScript));
    }

    #[test]
    fn test_empty_script() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("# nothing to see here\n"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_tc() {
        assert!(matches!(
            ScriptInterpreter::from_script_str("1.0: {\"Jump\": {}};"),
            Err(ScriptError::InvalidTc(_, _))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SCRIPT.as_bytes()).unwrap();

        let si = ScriptInterpreter::new(file.path()).unwrap();
        assert_eq!(si.get_num_tcs(), 4);

        assert!(matches!(
            ScriptInterpreter::new("/no/such/script.iks"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
