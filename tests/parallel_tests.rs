mod common;
use common::*;

#[test]
fn test_parallel_sequential_equivalence() {
    let input = numbered_log(3_000);

    let (seq_stdout, _stderr, seq_exit_code) =
        run_linesift_with_file(&["-p", "ERROR", "--sequential"], &input);
    assert_eq!(seq_exit_code, 0);

    for threads in ["1", "2", "4", "13"] {
        let (par_stdout, stderr, par_exit_code) =
            run_linesift_with_file(&["-p", "ERROR", "--threads", threads], &input);
        assert_eq!(par_exit_code, 0, "stderr: {}", stderr);
        assert_eq!(
            par_stdout, seq_stdout,
            "parallel output with {} threads differs from sequential",
            threads
        );
    }
    assert_eq!(seq_stdout.lines().count(), 1_000);
}

#[test]
fn test_order_preserved_with_tiny_buffers() {
    let input = numbered_log(5_000);
    let expected: String = input.lines().map(|l| format!("{}\n", l)).collect();

    // Queues far smaller than the input must not deadlock or reorder.
    let (stdout, stderr, exit_code) =
        run_linesift_with_file(&["--threads", "8", "--buffer-size", "1"], &input);
    assert_eq!(exit_code, 0, "stderr: {}", stderr);
    assert_eq!(stdout, expected);
}

#[test]
fn test_count_matches_printed_lines() {
    let input = numbered_log(2_500);
    for args in [
        vec!["-p", "ERROR"],
        vec!["-p", "ERROR", "-v"],
        vec!["-p", "request 1"],
    ] {
        let (printed, _, code) = run_linesift_with_file(&[&args[..], &["--threads", "6"]].concat(), &input);
        assert_eq!(code, 0);
        let (counted, _, code) = run_linesift_with_file(
            &[&args[..], &["--threads", "6", "-F", "count"]].concat(),
            &input,
        );
        assert_eq!(code, 0);
        assert_eq!(
            counted.trim().parse::<usize>().unwrap(),
            printed.lines().count(),
            "args: {:?}",
            args
        );
    }
}

#[test]
fn test_repeated_runs_are_identical() {
    let input = numbered_log(4_000);
    let (first, _, _) = run_linesift_with_file(&["-p", "INFO", "--threads", "7"], &input);
    for _ in 0..3 {
        let (again, _, code) = run_linesift_with_file(&["-p", "INFO", "--threads", "7"], &input);
        assert_eq!(code, 0);
        assert_eq!(again, first);
    }
}

#[test]
fn test_completeness_reported_in_stats() {
    let input = numbered_log(999);
    let (_stdout, stderr, exit_code) =
        run_linesift_with_file(&["-p", "ERROR", "--threads", "5", "--stats"], &input);
    assert_eq!(exit_code, 0);

    let read = stat_value(&stderr, "Lines read:").unwrap();
    let kept = stat_value(&stderr, "Lines kept:").unwrap();
    let discarded = stat_value(&stderr, "Lines discarded:").unwrap();
    let emitted = stat_value(&stderr, "Lines emitted:").unwrap();
    assert_eq!(read, 999);
    assert_eq!(kept + discarded, read);
    assert_eq!(emitted, kept);
}

#[test]
fn test_more_workers_than_lines() {
    let (stdout, _stderr, exit_code) =
        run_linesift_with_file(&["--threads", "32"], "only\ntwo\n");
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "only\ntwo\n");
}

#[test]
fn test_default_thread_count() {
    let input = numbered_log(300);
    let (stdout, stderr, exit_code) = run_linesift_with_file(&["-F", "count", "--stats"], &input);
    assert_eq!(exit_code, 0);
    assert_eq!(stdout, "300\n");
    assert!(stat_value(&stderr, "Workers:").unwrap() >= 1);
}
