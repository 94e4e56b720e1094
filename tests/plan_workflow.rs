use kakeibo_core::{
    engine::{Finding, FundKind, Mode},
    init,
    plan::PlanState,
};

fn plan_with_income(amount: &str) -> PlanState {
    let mut plan = PlanState::new();
    let id = plan.sources()[0].id;
    plan.set_received(id, true).unwrap();
    plan.set_amount(id, amount).unwrap();
    plan
}

#[test]
fn fresh_plan_locks_allocation() {
    init();

    let plan = PlanState::new();
    let report = plan.report();
    assert_eq!(report.total_income, 0.0);
    assert_eq!(report.stage1_findings, vec![Finding::MissingReceivedIncome]);
    assert_eq!(report.stage2_findings, vec![Finding::Stage2Locked]);
    assert!(!report.can_finalize);
}

#[test]
fn unreceived_amounts_do_not_count() {
    let mut plan = plan_with_income("1000");
    let other = plan.sources()[1].id;
    plan.set_amount(other, "500").unwrap();

    let report = plan.report();
    assert_eq!(report.total_income, 1000.0);
    assert!(report.stage1_findings.is_empty());
}

#[test]
fn amount_mode_allocation_flow() {
    let mut plan = plan_with_income("1000");
    plan.set_fund(FundKind::EmergencyFund, "300");
    plan.set_fund(FundKind::SinkingFund, "200");
    plan.set_fund(FundKind::Spending, "400");
    plan.set_fund(FundKind::Fun, "50");

    let report = plan.report();
    assert_eq!(report.allocated_total, 950.0);
    assert_eq!(report.remaining, 50.0);
    assert!(report.stage2_findings.is_empty());
    assert!(report.can_finalize);

    let snapshot = plan.finalize().unwrap();
    assert_eq!(snapshot.amounts.ef, 300.0);
    assert_eq!(snapshot.amounts.total(), 950.0);
}

#[test]
fn percent_mode_over_100_blocks_finalize() {
    let mut plan = plan_with_income("1000");
    plan.set_mode(Mode::Percent);
    plan.set_fund(FundKind::EmergencyFund, "30");
    plan.set_fund(FundKind::SinkingFund, "30");
    plan.set_fund(FundKind::Spending, "30");
    plan.set_fund(FundKind::Fun, "20");

    let report = plan.report();
    assert_eq!(
        report.stage2_findings,
        vec![Finding::PercentTotalExceeds100 { total: 110.0 }]
    );
    assert!(!report.can_finalize);
    assert!(plan.finalize().is_err());
}

#[test]
fn income_edit_after_finalize_forces_a_fresh_save() {
    let mut plan = plan_with_income("1000");
    plan.set_fund(FundKind::EmergencyFund, "300");
    plan.finalize().unwrap();
    assert!(plan.finalized().is_some());

    let id = plan.sources()[0].id;
    plan.set_amount(id, "900").unwrap();
    assert!(plan.finalized().is_none());

    // The allocation itself is still valid and can be finalized again.
    assert!(plan.report().can_finalize);
    plan.finalize().unwrap();
}

#[test]
fn mode_switch_reinterprets_without_rewriting_text() {
    let mut plan = plan_with_income("1000");
    plan.set_mode(Mode::Percent);
    plan.set_fund(FundKind::Fun, "20");
    assert_eq!(plan.report().funds_as_amount.fun, 200.0);

    plan.set_mode(Mode::Amount);
    assert_eq!(plan.funds().fun, "20");
    assert_eq!(plan.report().funds_as_amount.fun, 20.0);
}

#[test]
fn received_garbage_amount_is_flagged_not_fatal() {
    let mut plan = PlanState::new();
    let id = plan.sources()[2].id;
    plan.set_received(id, true).unwrap();
    plan.set_amount(id, "not-a-number").unwrap();

    let report = plan.report();
    assert_eq!(report.total_income, 0.0);
    assert!(report
        .stage1_findings
        .contains(&Finding::NonPositiveSourceAmount {
            source: "Other".into()
        }));
}
