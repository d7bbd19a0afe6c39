mod common;
use common::*;

#[test]
fn test_set_and_print() {
    let mut h = harness();
    assert_eq!(h.run("s x 0x10; p \"%4.4x\" x"), "0010\n");
    assert_eq!(h.run("p x"), "16\n");
    assert_eq!(h.run("p x*2+1"), "33\n");
}

#[test]
fn test_set_overwrites_in_place() {
    let mut h = harness();
    h.run("s x 1");
    h.run("s x x+1");
    assert_eq!(h.run("p x"), "2\n");
}

#[test]
fn test_unknown_variable() {
    let mut h = harness();
    assert_eq!(h.run("p nosuch"), "*** Error: Variable \"nosuch\" invalid\n");
}

#[test]
fn test_unknown_command() {
    let mut h = harness();
    assert_eq!(h.run("frobnicate"), "*** Error: Command \"frobnicate\" invalid\n");
}

#[test]
fn test_zero_divide() {
    let mut h = harness();
    assert_eq!(h.run("p 1/0"), "*** Error: Zero divide\n");
    assert_eq!(h.run("p 5%(3-3)"), "*** Error: Zero divide\n");
}

#[test]
fn test_builtin_variables() {
    let mut h = harness();
    assert_eq!(h.run("p secsiz"), "512\n");
    assert_eq!(h.run("p bufsiz"), "256\n");
    // no drive set yet
    assert_eq!(h.run("p drvsiz"), "0\n");
    assert_eq!(h.run("p lbarnd"), "*** Error: No current drive is set\n");
}

#[test]
fn test_drvsiz_and_lbarnd_with_drive() {
    let mut h = harness();
    h.run("drive 1");
    assert_eq!(h.run("p drvsiz"), "1024\n");
    assert_eq!(h.run("p lbarnd<drvsiz"), "1\n");
    assert_eq!(h.run("p lbarnd>=0"), "1\n");
}

#[test]
fn test_srand_reproduces_stream() {
    let mut h = harness();
    h.run("srand; s a rand; srand; s b rand");
    assert_eq!(h.run("p a=b"), "1\n");
    // successive draws differ
    h.run("srand; s a rand; s b rand");
    assert_eq!(h.run("p a=b"), "0\n");
}

#[test]
fn test_comparisons_yield_unit() {
    let mut h = harness();
    assert_eq!(h.run("p 2>1"), "1\n");
    assert_eq!(h.run("p 1>=2"), "0\n");
    assert_eq!(h.run("p 3!=4"), "1\n");
    assert_eq!(h.run("p (1<2)*10"), "10\n");
}

#[test]
fn test_comment_after_separator() {
    let mut h = harness();
    assert_eq!(h.run("pn 1; ! the rest is ignored; pn 2"), "1");
    assert_eq!(h.run("! whole line comment"), "");
}

#[test]
fn test_invalid_termination() {
    let mut h = harness();
    assert_eq!(h.run("unprot extra"), "*** Error: Invalid command termination\n");
}

#[test]
fn test_negative_and_parenthesized_arguments() {
    let mut h = harness();
    assert_eq!(h.run("p -5+8"), "3\n");
    assert_eq!(h.run("p (1+2)*(3+4)"), "21\n");
}
