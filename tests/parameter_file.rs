//! Parameter-file/session integration.

mod common;

use common::{write_minimal_parameter_file, TestMachine};
use rs274ngc::{Block, Interpreter, ParameterTable, ReadStatus};

#[test]
fn interpreter_round_trips_parameters_through_restore_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let in_path = dir.path().join("in.var");
    let out_path = dir.path().join("out.var");
    write_minimal_parameter_file(&in_path);

    let mut interp = Interpreter::new();
    let cmi = TestMachine::default();
    interp.init(&in_path, &cmi).unwrap();
    interp.save_parameters(&out_path).unwrap();

    let reloaded = rs274ngc::paramfile::load(&out_path).unwrap();
    for index in rs274ngc::params::required_parameters() {
        assert_eq!(reloaded.get(index), 0.0);
    }
}

#[test]
fn restore_parameters_replaces_the_active_table() {
    let dir = tempfile::tempdir().unwrap();
    let base_path = dir.path().join("base.var");
    let other_path = dir.path().join("other.var");
    write_minimal_parameter_file(&base_path);

    let mut other = ParameterTable::new();
    for index in rs274ngc::params::required_parameters() {
        other.set(index, 0.0);
    }
    other.set(5220, 3.0);
    rs274ngc::paramfile::save(&other_path, &other).unwrap();

    let mut interp = Interpreter::new();
    let cmi = TestMachine::default();
    interp.init(&base_path, &cmi).unwrap();
    interp.restore_parameters(&other_path).unwrap();

    let resaved = dir.path().join("resaved.var");
    interp.save_parameters(&resaved).unwrap();
    let reloaded = rs274ngc::paramfile::load(&resaved).unwrap();
    assert_eq!(reloaded.get(5220), 3.0);
}

#[test]
fn a_parameter_referenced_twice_in_one_block_reads_its_start_of_block_value() {
    // `#1=5 #1=#1+1` in a single block: the second assignment's right-hand
    // side must see #1 as it was before this block ran (0), not the 5 the
    // first assignment in the same block just staged.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("params.var");
    write_minimal_parameter_file(&path);

    let mut interp = Interpreter::new();
    let mut cmi = TestMachine::default();
    interp.init(&path, &cmi).unwrap();

    assert_eq!(interp.read("#1=5 #1=[#1+1]").unwrap(), ReadStatus::Ok);
    interp.execute(&mut cmi).unwrap();

    let out_path = dir.path().join("out.var");
    interp.save_parameters(&out_path).unwrap();
    let table = rs274ngc::paramfile::load(&out_path).unwrap();
    assert_eq!(table.get(1), 1.0);
}

#[test]
fn block_parse_collects_parameter_settings_in_arrival_order() {
    let params = ParameterTable::new();
    let (block, _) = Block::parse("#100=1.5 #101=[#100*2]", &params).unwrap();
    assert_eq!(block.parameter_settings, vec![(100, 1.5), (101, 0.0)]);
}
