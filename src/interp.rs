//! Top-level interpreter session
//!
//! Wires the line reader, block builder, and semantic executor into the
//! `init`/`read`/`execute`/`exit` loop a driver runs one line at a time.
//! Grounded on `driver2.cc`'s `main()` read/execute loop and on
//! `setup_t`'s active-code bookkeeping.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::block::Block;
use crate::canon::CanonicalMachine;
use crate::error::Error;
use crate::executor::{self, ExecStatus};
use crate::params::ParameterTable;
use crate::paramfile;
use crate::settings::Settings;

/// Outcome of [`Interpreter::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// A block was parsed and is ready for [`Interpreter::execute`].
    Ok,
    /// A prior probe hasn't been synchronised yet; call
    /// [`Interpreter::synch`] before reading further lines.
    ExecuteFinish,
    /// The `%` end-of-program marker was read; no block to execute.
    EndFile,
}

/// One interpreter session: modal state, parameter table, and the block
/// most recently handed from `read` to `execute`.
pub struct Interpreter {
    settings: Settings,
    params: ParameterTable,
    parameter_path: Option<PathBuf>,
    pending: Option<(Block, bool)>,
    awaiting_synch: bool,
}

impl Interpreter {
    /// A session with no parameters loaded yet; call [`Self::init`] before
    /// reading any lines.
    pub fn new() -> Self {
        Interpreter {
            settings: Settings::new(),
            params: ParameterTable::new(),
            parameter_path: None,
            pending: None,
            awaiting_synch: false,
        }
    }

    /// Load the parameter file at `parameter_path` and the tool table from
    /// `cmi`. Must run before the first `read`.
    pub fn init(&mut self, parameter_path: impl AsRef<Path>, cmi: &impl CanonicalMachine) -> Result<(), Error> {
        let path = parameter_path.as_ref();
        self.params = paramfile::load(path)?;
        self.parameter_path = Some(path.to_path_buf());
        self.load_tool_table(cmi);
        self.settings.write_g_codes(None);
        self.settings.write_m_codes(None);
        self.settings.write_settings();
        info!(path = %path.display(), "interpreter initialised");
        Ok(())
    }

    /// Parse one source line. Stages its block for [`Self::execute`].
    ///
    /// If a probing move from a previous `execute` hasn't been synchronised
    /// yet, this refuses to parse further and returns `ExecuteFinish`
    /// instead, until [`Self::synch`] runs.
    pub fn read(&mut self, line: &str) -> Result<ReadStatus, Error> {
        if self.awaiting_synch {
            return Ok(ReadStatus::ExecuteFinish);
        }

        self.settings.linetext = line.to_string();
        self.settings.line_length = line.len();

        if line.trim() == "%" {
            return Ok(ReadStatus::EndFile);
        }

        let (mut block, block_delete) = Block::parse(line, &self.params)?;
        block.enhance(&self.settings)?;
        block.check(&self.settings)?;

        for (index, value) in block.parameter_settings.drain(..) {
            self.params.stage(index, value);
        }
        self.params.commit();

        self.pending = Some((block, block_delete));
        Ok(ReadStatus::Ok)
    }

    /// Run the block staged by the most recent `read` through the executor.
    ///
    /// A block-delete line (leading `/`) is skipped: active-code reporting
    /// still refreshes, but nothing reaches `cmi`.
    pub fn execute(&mut self, cmi: &mut impl CanonicalMachine) -> Result<ExecStatus, Error> {
        let (block, block_delete) = self
            .pending
            .take()
            .ok_or_else(|| Error::Bug("execute called with no block staged by read".into()))?;

        if block_delete {
            self.settings.write_g_codes(Some(&block));
            self.settings.write_m_codes(Some(&block));
            self.settings.write_settings();
            return Ok(ExecStatus::Ok);
        }

        let status = executor::execute_block(&block, &mut self.settings, &mut self.params, cmi)?;
        if status == ExecStatus::ExecuteFinish {
            self.awaiting_synch = true;
        }
        Ok(status)
    }

    /// Save parameters (if a path was ever established) and end the session.
    pub fn exit(&mut self) -> Result<(), Error> {
        if let Some(path) = &self.parameter_path {
            paramfile::save(path, &self.params)?;
        } else {
            warn!("exit called with no parameter file path set; parameters not saved");
        }
        Ok(())
    }

    /// Reset modal state to its power-on defaults, as M2/M30 do, without
    /// touching the CMI. Used to recover after an aborted program.
    pub fn reset(&mut self) {
        crate::executor::coords::reset_to_system_one(&mut self.settings, &self.params);
        self.settings = Settings {
            tool_table: self.settings.tool_table.clone(),
            tool_max: self.settings.tool_max,
            current: self.settings.current,
            origin_offset: self.settings.origin_offset,
            origin_index: self.settings.origin_index,
            ..Settings::new()
        };
        self.pending = None;
        self.awaiting_synch = false;
    }

    /// Query `cmi` for the current position and the latched probe result,
    /// refreshing parameters 5061..5067 (the latched probe result).
    pub fn synch(&mut self, cmi: &impl CanonicalMachine) {
        self.settings.current = cmi.current_position();

        let probe = cmi.probe_position();
        self.params.set(5061, probe.x);
        self.params.set(5062, probe.y);
        self.params.set(5063, probe.z);
        self.params.set(5064, probe.a);
        self.params.set(5065, probe.b);
        self.params.set(5066, probe.c);
        self.params.set(5067, cmi.probe_value());

        self.awaiting_synch = false;
    }

    /// Refresh the in-memory tool table from `cmi`.
    pub fn load_tool_table(&mut self, cmi: &impl CanonicalMachine) {
        let max = cmi.tool_max();
        self.settings.tool_max = max;
        self.settings.tool_table = (0..=max).map(|pocket| cmi.tool(pocket)).collect();
    }

    /// Replace the parameter table by loading `path`, and remember `path`
    /// for a later [`Self::exit`] or [`Self::save_parameters`].
    pub fn restore_parameters(&mut self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        self.params = paramfile::load(path)?;
        self.parameter_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Save the current parameter table to `path`.
    pub fn save_parameters(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        paramfile::save(path.as_ref(), &self.params)
    }

    /// Copy the 12-entry active-G-code array.
    pub fn active_g_codes(&self, out: &mut [i32; 12]) {
        *out = self.settings.active_g_codes;
    }

    /// Copy the 7-entry active-M-code array.
    pub fn active_m_codes(&self, out: &mut [i32; 7]) {
        *out = self.settings.active_m_codes;
    }

    /// Copy the 3-entry active-settings array (`[_, feed_rate, speed]`).
    pub fn active_settings(&self, out: &mut [f64; 3]) {
        *out = self.settings.active_settings;
    }

    /// Length, in bytes, of the line most recently passed to `read`.
    pub fn line_length(&self) -> usize {
        self.settings.line_length
    }

    /// Copy up to `max` characters of the line most recently passed to
    /// `read` into `out`.
    pub fn line_text(&self, out: &mut String, max: usize) {
        out.clear();
        out.extend(self.settings.linetext.chars().take(max));
    }

    /// Read-only access to modal state, for drivers that want more than the
    /// `active_*` arrays (e.g. logging `settings.current`).
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::test_support::RecordingMachine;
    use crate::params::required_parameters;

    fn minimal_param_file(dir: &std::path::Path) -> std::path::PathBuf {
        let path = dir.join("params.var");
        let mut table = ParameterTable::new();
        for index in required_parameters() {
            table.set(index, 0.0);
        }
        paramfile::save(&path, &table).unwrap();
        path
    }

    #[test]
    fn read_then_execute_runs_a_rapid_move() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_param_file(dir.path());
        let mut interp = Interpreter::new();
        let mut cmi = RecordingMachine::default();
        interp.init(&path, &cmi).unwrap();

        assert_eq!(interp.read("G0 X1 Y2 Z3").unwrap(), ReadStatus::Ok);
        let status = interp.execute(&mut cmi).unwrap();
        assert_eq!(status, ExecStatus::Ok);
        assert!(cmi.calls.iter().any(|c| c.starts_with("rapid")));
        let mut g = [0; 12];
        interp.active_g_codes(&mut g);
        assert_eq!(g[1], crate::codes::G0);
    }

    #[test]
    fn block_delete_line_is_parsed_but_not_executed() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_param_file(dir.path());
        let mut interp = Interpreter::new();
        let mut cmi = RecordingMachine::default();
        interp.init(&path, &cmi).unwrap();

        assert_eq!(interp.read("/G0 X1").unwrap(), ReadStatus::Ok);
        interp.execute(&mut cmi).unwrap();
        assert!(cmi.calls.is_empty());
    }

    #[test]
    fn percent_marker_reports_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_param_file(dir.path());
        let mut interp = Interpreter::new();
        let cmi = RecordingMachine::default();
        interp.init(&path, &cmi).unwrap();

        assert_eq!(interp.read("%").unwrap(), ReadStatus::EndFile);
    }

    #[test]
    fn probe_move_demands_synch_before_next_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_param_file(dir.path());
        let mut interp = Interpreter::new();
        let mut cmi = RecordingMachine::default();
        interp.init(&path, &cmi).unwrap();

        interp.read("G38.2 Z-1 F10").unwrap();
        let status = interp.execute(&mut cmi).unwrap();
        assert_eq!(status, ExecStatus::ExecuteFinish);

        assert_eq!(interp.read("G0 X0").unwrap(), ReadStatus::ExecuteFinish);
        interp.synch(&cmi);
        assert_eq!(interp.read("G0 X0").unwrap(), ReadStatus::Ok);
    }

    #[test]
    fn exit_saves_parameters_to_the_restored_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = minimal_param_file(dir.path());
        let mut interp = Interpreter::new();
        let cmi = RecordingMachine::default();
        interp.init(&path, &cmi).unwrap();
        interp.read("G10 L2 P1 X5").unwrap();
        interp.execute(&mut RecordingMachine::default()).unwrap();

        interp.exit().unwrap();
        let reloaded = paramfile::load(&path).unwrap();
        assert_eq!(reloaded.get(5221), 5.0);
    }
}
