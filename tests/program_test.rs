mod common;
use common::*;

#[test]
fn test_procedure_call_with_parameters() {
    let mut h = harness();
    h.run("1 add(a b): p a+b");
    assert_eq!(h.run("add 40 2"), "42\n");
    // parameters are destroyed on return
    assert_eq!(h.run("p a"), "*** Error: Variable \"a\" invalid\n");
    assert_eq!(h.run("p b"), "*** Error: Variable \"b\" invalid\n");
}

#[test]
fn test_procedure_set_updates_outer_variable() {
    let mut h = harness();
    h.run("1 bump: set c c+1; end");
    h.run("s c 5");
    h.run("bump");
    assert_eq!(h.run("p c"), "6\n");
}

#[test]
fn test_procedure_locals_vanish() {
    let mut h = harness();
    h.run("1 proc: set c 7; end");
    h.run("proc");
    // c did not exist outside, so it was created local and destroyed
    assert_eq!(h.run("p c"), "*** Error: Variable \"c\" invalid\n");
}

#[test]
fn test_local_always_shadows() {
    let mut h = harness();
    h.run("1 lp: local c; s c 9; pn c; end");
    h.run("s c 1");
    assert_eq!(h.run("lp"), "9");
    assert_eq!(h.run("p c"), "1\n");
}

#[test]
fn test_end_at_immediate_mode() {
    let mut h = harness();
    assert_eq!(
        h.run("end"),
        "*** Error: Nothing to return to at immediate mode\n"
    );
}

#[test]
fn test_execution_resumes_after_call() {
    let mut h = harness();
    h.run("1 hi: echon hel; end");
    assert_eq!(h.run("hi; echo lo"), "hello\n");
}

#[test]
fn test_falling_off_end_terminates() {
    let mut h = harness();
    h.run("1 a: pn 1");
    h.run("2 pn 2");
    // no `end`: the callee runs into the next line, then off the end,
    // which abandons the rest of the calling line
    assert_eq!(h.run("a; pn 9"), "12");
}

#[test]
fn test_go_redirects() {
    let mut h = harness();
    h.run("1 top: pn 5");
    assert_eq!(h.run("go top; pn 9"), "5");
    assert_eq!(h.run("go missing"), "*** Error: Program label missing not found\n");
}

#[test]
fn test_list_shows_labels_and_params() {
    let mut h = harness();
    h.run("1 add(a b): p a+b");
    h.run("2 plain command");
    assert_eq!(
        h.run("list"),
        "\nProgram store:\n\n1: add(a b): p a+b\n2:  plain command\n"
    );
}

#[test]
fn test_delt_removes_line() {
    let mut h = harness();
    h.run("1 first");
    h.run("2 second");
    h.run("delt 1");
    assert_eq!(h.run("list"), "\nProgram store:\n\n1:  second\n");
    h.run("clear");
    assert_eq!(h.run("list"), "\nProgram store:\n\n");
}

#[test]
fn test_save_load_round_trip() {
    let mut h = harness();
    // filenames are words (alphanumerics and dots), saved in the current
    // directory
    h.run("1 add(a b): p a+b");
    h.run("2 plain line");
    assert_eq!(h.run("save roundtrip.tmp"), "");
    h.run("clear");
    assert_eq!(h.run("load roundtrip.tmp"), "");
    assert_eq!(h.run("add 1 2"), "3\n");
    assert_eq!(
        h.run("list"),
        "\nProgram store:\n\n1: add(a b): p a+b\n2:  plain line\n"
    );
    let _ = std::fs::remove_file("roundtrip.tmp");
}

#[test]
fn test_load_missing_file() {
    let mut h = harness();
    assert_eq!(h.run("load no.such.file.here"), "*** Error: cannot load file\n");
}

#[test]
fn test_procedure_shadows_builtin_verb() {
    let mut h = harness();
    h.run("1 list: pn 77; end");
    assert_eq!(h.run("list"), "77");
}

#[test]
fn test_insert_before() {
    let mut h = harness();
    h.run("1 pn 1");
    h.run("1 pn 0");
    h.run("3 pn 2");
    assert_eq!(h.run("list"), "\nProgram store:\n\n1:  pn 0\n2:  pn 1\n3:  pn 2\n");
}

#[test]
fn test_listvariables() {
    let mut h = harness();
    h.run("s alpha 1; s beta 2");
    assert_eq!(
        h.run("listvariables"),
        "Contents of variables stack:\n\nvar: beta val: 2\nvar: alpha val: 1\n"
    );
}
