//! Guard conservation: Σinputs = Σoutputs + Σburn per token type

use crate::assert_rejected;
use crate::common::scenario::{Authorizer, Scenario, ScenarioConfig, Transfer};
use crate::common::TestKey;
use token_covenant::covenant::guard::CONSERVATION_MESSAGE;
use token_covenant::types::{GuardOutput, GuardVariant};
use token_covenant::validator::InputSpend;

fn minted(scenario: &mut Scenario, owner: &TestKey) -> crate::common::scenario::TokenUtxo {
    scenario.mint(0, &owner.owner(), 1).unwrap()
}

fn guard_witness(spends: &mut [InputSpend]) -> &mut token_covenant::types::GuardWitness {
    spends
        .iter_mut()
        .find_map(|s| match s {
            InputSpend::Guard { spend } => Some(&mut spend.witness),
            _ => None,
        })
        .unwrap()
}

#[test]
fn test_inflating_transfer_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    let result = scenario.transfer(Transfer::new(
        vec![(token, Authorizer::User(&alice))],
        vec![(alice.owner(), 700), (alice.owner(), 500)],
    ));
    let msg = assert_rejected!(result, ConservationViolation);
    assert_eq!(msg, CONSERVATION_MESSAGE);
}

#[test]
fn test_deflating_transfer_without_burn_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    let result = scenario.transfer(Transfer::new(
        vec![(token, Authorizer::User(&alice))],
        vec![(alice.owner(), 999)],
    ));
    assert_rejected!(result, ConservationViolation);
}

#[test]
fn test_declared_burn_accepted() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    let outputs = scenario
        .transfer(
            Transfer::new(
                vec![(token, Authorizer::User(&alice))],
                vec![(alice.owner(), 500)],
            )
            .burn(500),
        )
        .unwrap();
    assert_eq!(outputs[0].state.amount, 500);
}

#[test]
fn test_burn_everything_accepted() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    let outputs = scenario
        .transfer(Transfer::new(vec![(token, Authorizer::User(&alice))], vec![]).burn(1000))
        .unwrap();
    assert!(outputs.is_empty());
}

#[test]
fn test_overstated_burn_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    let result = scenario.transfer(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 500)],
        )
        .burn(600),
    );
    assert_rejected!(result, ConservationViolation);
}

#[test]
fn test_claimed_input_total_must_match_spent_states() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    // Claim 1200 in and 1200 out: balanced on paper, but the input holds 1000
    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1200)],
        ),
        |_, spends| guard_witness(spends).token_amounts[0] = 1200,
    );
    assert_rejected!(result, StateMismatch);
}

#[test]
fn test_token_output_declared_as_plain_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);
    let token_script = scenario.token.script().clone();

    // Hide the second token output from the guard to mint 400 for free
    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000), (alice.owner(), 400)],
        ),
        |ctx, spends| {
            let witness = guard_witness(spends);
            witness.outputs[1] = GuardOutput::plain(&token_script, 330, ctx.outputs[1].state_hash);
        },
    );
    let msg = assert_rejected!(result, StateMismatch);
    assert!(msg.contains("not declared as a token output"));
}

#[test]
fn test_declared_output_must_match_real_output() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let bob = TestKey::from_seed(3);
    let token = minted(&mut scenario, &alice);

    // Witness says bob gets 1000 but the real output commits to alice
    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000)],
        ),
        |_, spends| {
            guard_witness(spends).outputs[0] = GuardOutput::token(&bob.owner(), 1000, 0, 330);
        },
    );
    assert_rejected!(result, StateMismatch);
}

#[test]
fn test_output_count_over_guard_capacity_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    let outputs = (0..7).map(|_| (alice.owner(), 100)).collect::<Vec<_>>();
    let result = scenario.transfer(
        Transfer::new(vec![(token, Authorizer::User(&alice))], outputs)
            .burn(300)
            .variant(GuardVariant::Inputs6Types2),
    );
    assert_rejected!(result, CapacityExceeded);
}

#[test]
fn test_large_transfer_selects_bigger_guard() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = minted(&mut scenario, &alice);

    let outputs = (0..10).map(|_| (alice.owner(), 100)).collect::<Vec<_>>();
    let result = scenario.transfer(Transfer::new(
        vec![(token, Authorizer::User(&alice))],
        outputs,
    ));
    assert_eq!(result.unwrap().len(), 10);
}
