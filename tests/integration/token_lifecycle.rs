//! Mint, split, merge and re-transfer a token

use crate::common::scenario::{Authorizer, Scenario, ScenarioConfig, Transfer};
use crate::common::TestKey;
use token_covenant::covenant::InputOutcome;
use token_covenant::ledger::ChainSource;

#[test]
fn test_mint_then_split_transfer() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let bob = TestKey::from_seed(3);

    let minted = scenario.mint(0, &alice.owner(), 1).unwrap();
    assert_eq!(minted.state.amount, 1000);
    assert_eq!(minted.state.owner, alice.owner());

    let outputs = scenario
        .transfer(Transfer::new(
            vec![(minted, Authorizer::User(&alice))],
            vec![(bob.owner(), 600), (alice.owner(), 400)],
        ))
        .unwrap();

    assert_eq!(outputs.len(), 2);
    assert_eq!(outputs[0].state.amount, 600);
    assert_eq!(outputs[0].state.owner, bob.owner());
    assert_eq!(outputs[1].state.amount, 400);

    let token_utxos = scenario.ledger.get_utxos(scenario.token.script());
    assert_eq!(token_utxos.len(), 2);
}

#[test]
fn test_tokens_keep_moving_through_guards() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let bob = TestKey::from_seed(3);
    let carol = TestKey::from_seed(4);

    let minted = scenario.mint(0, &alice.owner(), 1).unwrap();
    let hop1 = scenario
        .transfer(Transfer::new(
            vec![(minted, Authorizer::User(&alice))],
            vec![(bob.owner(), 1000)],
        ))
        .unwrap();
    let hop2 = scenario
        .transfer(Transfer::new(
            vec![(hop1[0].clone(), Authorizer::User(&bob))],
            vec![(carol.owner(), 250), (bob.owner(), 750)],
        ))
        .unwrap();
    let hop3 = scenario
        .transfer(Transfer::new(
            vec![(hop2[0].clone(), Authorizer::User(&carol))],
            vec![(alice.owner(), 250)],
        ))
        .unwrap();

    assert_eq!(hop3[0].state.amount, 250);
    assert_eq!(hop3[0].state.owner, alice.owner());
}

#[test]
fn test_merge_tokens_from_two_owners() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let bob = TestKey::from_seed(3);

    let a = scenario.mint(0, &alice.owner(), 1).unwrap();
    let b = scenario.mint(0, &bob.owner(), 1).unwrap();

    let merged = scenario
        .transfer(Transfer::new(
            vec![(a, Authorizer::User(&alice)), (b, Authorizer::User(&bob))],
            vec![(alice.owner(), 2000)],
        ))
        .unwrap();
    assert_eq!(merged[0].state.amount, 2000);
}

#[test]
fn test_validation_report_describes_inputs() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let minted = scenario.mint(0, &alice.owner(), 1).unwrap();

    let mut captured = None;
    scenario
        .transfer_with(
            Transfer::new(
                vec![(minted, Authorizer::User(&alice))],
                vec![(alice.owner(), 900)],
            )
            .burn(100),
            |ctx, spends| {
                captured = Some(
                    token_covenant::validator::TransactionValidator::validate(ctx, spends).unwrap(),
                );
            },
        )
        .unwrap();

    let report = captured.unwrap();
    assert_eq!(report.input_count, 2);
    assert!(matches!(report.outcomes[0], InputOutcome::Token { amount: 1000, .. }));
    let guard = report.guard().unwrap();
    assert_eq!(guard.types.len(), 1);
    assert_eq!(guard.types[0].input, 1000);
    assert_eq!(guard.types[0].output, 900);
    assert_eq!(guard.types[0].burn, 100);
    assert_eq!(report.token_input_total(), 1000);
}
