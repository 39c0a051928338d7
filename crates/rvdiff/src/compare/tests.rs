use super::*;

fn compare(sut: &str, oracle: &str) -> CompareResult {
    compare_traces(sut.as_bytes(), oracle.as_bytes(), CompareConfig::default()).unwrap()
}

fn comparator<'a>(sut: &'a str, oracle: &'a str) -> LockstepComparator<&'a [u8], &'a [u8]> {
    LockstepComparator::new(sut.as_bytes(), oracle.as_bytes(), CompareConfig::default())
}

const SUT_TWO: &str = "\
1: global: 0x80000000 (0x00000013): nop
2: global: 0x80000004 (0x00000093): li a0, 5
";

#[test]
fn test_matching_traces() {
    let oracle = "\
core   0: 0x80000000 (0x00000013) nop
core   0: 0x80000004 (0x00000093) li a0, 5
";
    let result = compare(SUT_TWO, oracle);

    assert_eq!(result.verdict, Verdict::Done(DoneReason::SutExhausted));
    assert_eq!(result.stats.steps, 2);
    assert!(!result.is_divergent());
}

#[test]
fn test_divergence_at_second_step() {
    let oracle = "\
core   0: 0x80000000 (0x00000013) nop
core   0: 0x80000008 (0x00000013) nop
";
    let result = compare(SUT_TWO, oracle);
    let report = result.divergence().unwrap();

    assert_eq!(report.step, 2);
    assert_eq!(report.sut.current.pc, 0x8000_0004);
    assert_eq!(report.oracle.current.pc, 0x8000_0008);
    assert_eq!(report.sut.previous.pc, 0x8000_0000);
    assert_eq!(report.oracle.previous.pc, 0x8000_0000);
}

#[test]
fn test_trap_resumes_at_next_instruction() {
    let sut = "\
1: global: 0x80000008 (0x00000013): nop
2: global: 0x8000000c (0x00000073): ecall
3: global: 0x80000010 (0x00000013): nop
";
    let oracle = "\
core   0: 0x80000008 (0x00000013) nop
core   0: 0x8000000c (0x00000073) ecall
core   0: exception trap_user_ecall, epc 0x000000008000000c
core   0: 0x80000100 (0x34202f73) csrr t5, mcause
core   0: 0x80000104 (0x30200073) mret
core   0: 0x80000010 (0x00000013) nop
";
    let result = compare(sut, oracle);

    assert_eq!(result.verdict, Verdict::Done(DoneReason::SutExhausted));
    assert_eq!(result.stats.steps, 3);
    assert_eq!(result.stats.oracle.traps, 1);
    assert_eq!(result.stats.oracle.resync_skipped, 2);
}

#[test]
fn test_trap_retries_faulting_instruction() {
    let sut = "\
1: global: 0x80000020 (0x00002083): lw ra, 0(zero)
2: global: 0x80000024 (0x00000013): nop
";
    let oracle = "\
core   0: 0x80000020 (0x00002083) lw ra, 0(zero)
core   0: exception trap_load_page_fault, epc 0x0000000080000020
core   0: 0x80000200 (0x30200073) mret
core   0: 0x80000020 (0x00002083) lw ra, 0(zero)
core   0: 0x80000024 (0x00000013) nop
";
    let result = compare(sut, oracle);

    // The retried instruction has the same pc and is coalesced into step 1
    assert_eq!(result.verdict, Verdict::Done(DoneReason::SutExhausted));
    assert_eq!(result.stats.steps, 2);
    assert_eq!(result.stats.oracle_repeats, 1);
}

#[test]
fn test_sut_stalls_coalesce() {
    let sut = "\
1: global: 0x80000000 (0x00000013): nop
2: global: 0x80000004 (0x00a00513): li a0, 10
3: global: 0x80000004 (0x00a00513): li a0, 10
4: global: 0x80000004 (0x00a00513): li a0, 10
5: global: 0x80000008 (0x00000013): nop
";
    let oracle = "\
core   0: 0x80000000 (0x00000013) nop
core   0: 0x80000004 (0x00a00513) li a0, 10
core   0: 0x80000008 (0x00000013) nop
";
    let result = compare(sut, oracle);

    assert_eq!(result.verdict, Verdict::Done(DoneReason::SutExhausted));
    assert_eq!(result.stats.steps, 3);
    assert_eq!(result.stats.sut_stalls, 2);
}

#[test]
fn test_oracle_boot_code_skipped() {
    let oracle = "\
core   0: 0x00001000 (0x00000297) auipc t0, 0x0
core   0: 0x00001004 (0x02028593) addi a1, t0, 32
core   0: 0x00001010 (0x00028067) jr t0
core   0: 0x80000000 (0x00000013) nop
core   0: 0x80000004 (0x00000093) li a0, 5
";
    let mut comparator = comparator(SUT_TWO, oracle);

    assert_eq!(
        comparator.step().unwrap(),
        Step::Synced {
            step: 1,
            pc: 0x8000_0000
        }
    );
    let state = comparator.state();
    assert_eq!(state.oracle_position, 4);
    assert_eq!(state.sut_position, 1);
    assert_eq!(state.last_sut_pc, state.last_oracle_pc);
}

#[test]
fn test_phase_progression() {
    let oracle = "\
core   0: 0x80000000 (0x00000013) nop
core   0: 0x80000008 (0x00000013) nop
";
    let mut comparator = comparator(SUT_TWO, oracle);
    assert_eq!(comparator.phase(), Phase::Init);

    comparator.step().unwrap();
    assert_eq!(comparator.phase(), Phase::Synced);

    let step = comparator.step().unwrap();
    assert!(matches!(step, Step::Finished(Verdict::Diverged(_))));
    assert_eq!(comparator.phase(), Phase::Diverged);

    // Finished comparators keep returning the same verdict
    assert_eq!(comparator.step().unwrap(), step);
}

#[test]
fn test_empty_sut() {
    let oracle = "core   0: 0x80000000 (0x00000013) nop\n";
    let result = compare("", oracle);

    assert_eq!(result.verdict, Verdict::Done(DoneReason::EmptySut));
    assert_eq!(result.stats.steps, 0);
}

#[test]
fn test_empty_oracle() {
    let result = compare(SUT_TWO, "");
    assert_eq!(result.verdict, Verdict::Done(DoneReason::NoOverlap));
}

#[test]
fn test_oracle_never_reaches_start() {
    let oracle = "\
core   0: 0x00001000 (0x00000297) auipc t0, 0x0
core   0: 0x00001004 (0x02028593) addi a1, t0, 32
";
    let result = compare(SUT_TWO, oracle);
    assert_eq!(result.verdict, Verdict::Done(DoneReason::NoOverlap));
}

#[test]
fn test_oracle_exhausted_first() {
    let oracle = "core   0: 0x80000000 (0x00000013) nop\n";
    let result = compare(SUT_TWO, oracle);

    assert_eq!(result.verdict, Verdict::Done(DoneReason::OracleExhausted));
    assert_eq!(result.stats.steps, 1);
}

#[test]
fn test_divergence_at_later_step() {
    let sut: String = (0..10u64)
        .map(|i| format!("{}: global: 0x{:08x} (0x00000013): nop\n", i + 1, 0x8000_0000 + i * 4))
        .collect();
    let oracle: String = (0..10u64)
        .map(|i| {
            let pc = if i == 6 { 0x9000_0000 } else { 0x8000_0000 + i * 4 };
            format!("core   0: 0x{pc:08x} (0x00000013) nop\n")
        })
        .collect();
    let result = compare(&sut, &oracle);
    let report = result.divergence().unwrap();

    assert_eq!(report.step, 7);
    assert_eq!(report.sut.current.source_line, 7);
    assert_eq!(report.oracle.current.pc, 0x9000_0000);
}

#[test]
fn test_lines_between_records_ignored() {
    let sut = "\
warming up caches
1: global: 0x80000000 (0x00000013): nop

2: global: 0x80000004 (0x00000093): li a0, 5
";
    let oracle = "\
bbl loader
core   0: 0x80000000 (0x00000013) nop
z  0000000000000000 ra 0000000000000000
core   0: 0x80000004 (0x00000093) li a0, 5
";
    let result = compare(sut, oracle);

    assert_eq!(result.verdict, Verdict::Done(DoneReason::SutExhausted));
    assert_eq!(result.stats.sut.lines, 4);
}

#[test]
fn test_step_limit() {
    let config = CompareConfig {
        max_steps: Some(1),
        ..CompareConfig::default()
    };
    let oracle = "\
core   0: 0x80000000 (0x00000013) nop
core   0: 0x80000008 (0x00000013) nop
";
    let result = compare_traces(SUT_TWO.as_bytes(), oracle.as_bytes(), config).unwrap();

    assert_eq!(result.verdict, Verdict::Done(DoneReason::StepLimit));
    assert_eq!(result.stats.steps, 1);
}

#[test]
fn test_compressed_instruction_width() {
    let config = CompareConfig {
        instruction_width: 2,
        ..CompareConfig::default()
    };
    let sut = "\
1: global: 0x80000000 (0x00000073): ecall
2: global: 0x80000002 (0x00000001): c.nop
";
    let oracle = "\
core   0: 0x80000000 (0x00000073) ecall
core   0: exception trap_machine_ecall, epc 0x0000000080000000
core   0: 0x80000100 (0x30200073) mret
core   0: 0x80000002 (0x00000001) c.nop
";
    let result = compare_traces(sut.as_bytes(), oracle.as_bytes(), config).unwrap();

    assert_eq!(result.verdict, Verdict::Done(DoneReason::SutExhausted));
    assert_eq!(result.stats.steps, 2);
}
