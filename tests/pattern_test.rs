mod common;
use common::*;

/// Every write-side pattern verifies clean after a write/read round trip
/// through the device.
#[test]
fn test_patterns_round_trip_through_device() {
    for (pattern, val) in &[
        ("cnt", "0"),
        ("dwcnt", "0"),
        ("val", "0xdeadbeef"),
        ("rand", "0"),
        ("lba", "0x80"),
    ] {
        for len in &[1, 2, 7, 256] {
            let mut h = harness();
            h.run("drive 1; unprot");
            let line = format!(
                "pt {p} {v} {l}; w 0 {l}; r 0 {l}; c {p} {v} {l}",
                p = pattern,
                v = val,
                l = len
            );
            assert_eq!(h.run(&line), "", "pattern {} len {}", pattern, len);
        }
    }
}

#[test]
fn test_buffs_round_trip() {
    let mut h = harness();
    h.run("drive 1; unprot");
    assert_eq!(h.run("pt cnt; w 0 256; r 0 256; c buffs 0 256"), "");
}

#[test]
fn test_pattern_then_compare_same_buffer_without_io_mismatches() {
    // the read buffer starts zeroed, the write side got the pattern, so
    // comparing the read buffer reports mismatches
    let mut h = harness();
    let out = h.run("pt cnt 0 1; c cnt 0 1");
    assert!(out.contains("Buffer miscompare"));
}

#[test]
fn test_rand_compare_is_idempotent() {
    // seed-per-sector discipline: two compares in a row see the same bytes
    let mut h = harness();
    h.run("drive 1; unprot; pt rand 0 4; w 0 4; r 0 4");
    assert_eq!(h.run("c rand 0 4"), "");
    assert_eq!(h.run("c rand 0 4"), "");
}

#[test]
fn test_pattern_does_not_disturb_user_rand_stream() {
    let mut h = harness();
    h.run("srand; pt rand 0 8; s a rand; srand; s b rand");
    assert_eq!(h.run("p a=b"), "1\n");
    h.run("drive 1; unprot; pt rand 0 2; w 0 2; r 0 2");
    h.run("srand; c rand 0 2; s a rand; srand; s b rand");
    assert_eq!(h.run("p a=b"), "1\n");
}

#[test]
fn test_lba_background_untouched() {
    let mut h = harness();
    // fill the background with val, overlay the lba pattern, both verify
    h.run("drive 1; unprot");
    assert_eq!(
        h.run("pt val 0x55aa55aa 4; pt lba 9 4; w 0 4; r 0 4; c lba 9 4"),
        ""
    );
    // the background survives everywhere the lba dword is not
    assert_eq!(h.run("c buffs 0 4"), "");
}

#[test]
fn test_mode_one_reports_first_mismatch_only() {
    let mut h = harness();
    // read buffer is all zeros; expect 0xff in the low byte of every dword
    let out = h.run("c val 0xff 1");
    assert_eq!(
        out,
        "*** Error: Buffer miscompare: 00000003: 00 s/b ff\n"
    );
}

#[test]
fn test_mode_all_accumulates_repeats() {
    let mut h = harness();
    h.run("cm all");
    let out = h.run("c val 0xff 1");
    // 128 dwords in a sector: the first mismatch prints, 127 repeats
    assert_eq!(
        out,
        "*** Error: Buffer miscompare: 00000003: 00 s/b ff\n\
         *** Info: There were 127 occurrances of the above mismatch\n"
    );
}

#[test]
fn test_mode_all_distinct_mismatches_all_print() {
    let mut h = harness();
    h.run("cm all");
    // expect cnt in a zeroed buffer: offsets 1 and 2 mismatch distinctly
    let out = h.run("c cnt 0 1");
    assert!(out.contains("00000001: 00 s/b 01"));
    assert!(out.contains("00000002: 00 s/b 02"));
    assert!(out.contains("occurrances of the above mismatch") == false);
}

#[test]
fn test_mode_fail_aborts_compare() {
    let mut h = harness();
    h.run("cm fail");
    let out = h.run("c val 0xff 1; pn 9");
    // the first mismatch prints, the compare fails, the line aborts
    assert_eq!(
        out,
        "*** Error: Buffer miscompare: 00000003: 00 s/b ff\n\
         *** Error: Buffer miscompare in fail mode\n"
    );
}

#[test]
fn test_compare_modes_reset_per_compare() {
    let mut h = harness();
    let first = h.run("c val 0xff 1");
    let second = h.run("c val 0xff 1");
    // `first` flag re-arms: the same single mismatch line both times
    assert_eq!(first, second);
}

#[test]
fn test_bad_pattern_name() {
    let mut h = harness();
    assert_eq!(h.run("pt wavy"), "*** Error: bad pattern name: wavy\n");
    assert_eq!(h.run("c wavy"), "*** Error: bad pattern name: wavy\n");
    // buffs has no write side
    assert_eq!(h.run("pt buffs"), "*** Error: bad pattern name: buffs\n");
}

#[test]
fn test_bad_compmode() {
    let mut h = harness();
    assert_eq!(h.run("cm sometimes"), "*** Error: mode not recognized\n");
}

#[test]
fn test_pattern_length_bounds() {
    let mut h = harness();
    assert_eq!(
        h.run("pt cnt 0 257"),
        "*** Error: Invalid sector count, must be <= 256\n"
    );
    assert_eq!(
        h.run("c cnt 0 257"),
        "*** Error: Invalid sector count, must be <= 256\n"
    );
}

#[test]
fn test_break_stops_compare() {
    let mut h = harness();
    h.brk.store(true, std::sync::atomic::Ordering::SeqCst);
    // sampled at the first byte, before any mismatch can print
    assert_eq!(h.run("c val 0xff 256"), "");
}
