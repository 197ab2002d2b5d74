//! Open minter supply allocation

use crate::assert_rejected;
use crate::common::scenario::{Scenario, ScenarioConfig};
use crate::common::TestKey;
use token_covenant::types::MinterPhase;

fn config(total_mint_count: u64, premine_count: u64, limit: u64) -> ScenarioConfig {
    ScenarioConfig {
        total_mint_count,
        premine_count,
        limit,
        with_admin: false,
    }
}

#[test]
fn test_premine_then_regular_mints() {
    let mut scenario = Scenario::new(config(10, 2, 100));
    let issuer = scenario.issuer.clone();
    let alice = TestKey::from_seed(2);

    assert_eq!(scenario.minters[0].state.phase(), MinterPhase::Unminted);
    let premined = scenario.mint(0, &issuer.owner(), 1).unwrap();
    assert_eq!(premined.state.amount, 200);
    assert_eq!(scenario.minters.len(), 1);
    assert_eq!(scenario.minters[0].state.remaining_count, 8);
    assert!(scenario.minters[0].state.has_minted_before);

    let regular = scenario.mint(0, &alice.owner(), 1).unwrap();
    assert_eq!(regular.state.amount, 100);
    assert_eq!(
        scenario.minters[0].state.phase(),
        MinterPhase::Minting { remaining: 7 }
    );
}

#[test]
fn test_premine_requires_preminer_signature() {
    let mut scenario = Scenario::new(config(10, 2, 100));
    let mallory = TestKey::from_seed(5);

    let result = scenario.mint_with(0, &mallory.owner(), 200, vec![8], |spend| {
        spend.preminer = Some(mallory.sign(&[0u8; 32]));
    });
    assert_rejected!(result, AuthorizationFailure);
}

#[test]
fn test_premine_amount_must_match() {
    let mut scenario = Scenario::new(config(10, 2, 100));
    let issuer = scenario.issuer.clone();

    let result = scenario.mint_with(0, &issuer.owner(), 300, vec![8], |_| {});
    let msg = assert_rejected!(result, InvalidParameter);
    assert_eq!(msg, "token amount is not equal to premine");
}

#[test]
fn test_premine_amount_not_accepted_after_premine() {
    let mut scenario = Scenario::new(config(10, 2, 100));
    let issuer = scenario.issuer.clone();
    let alice = TestKey::from_seed(2);

    scenario.mint(0, &issuer.owner(), 1).unwrap();
    assert_eq!(scenario.minters[0].state.remaining_count, 8);

    // A second premine-sized mint is a regular mint and must equal the limit
    let result = scenario.mint_with(0, &alice.owner(), 200, vec![7], |_| {});
    let msg = assert_rejected!(result, InvalidParameter);
    assert_eq!(msg, "token amount is not equal to limit");
    assert_eq!(scenario.minters[0].state.remaining_count, 8);
}

#[test]
fn test_supply_exhausts() {
    let mut scenario = Scenario::new(config(3, 0, 50));
    let alice = TestKey::from_seed(2);

    let mut minted = 0;
    while !scenario.minters.is_empty() {
        minted += scenario.mint(0, &alice.owner(), 1).unwrap().state.amount;
    }
    assert_eq!(minted, 150);
    assert_eq!(minted, scenario.minter.config().max_supply());
}

#[test]
fn test_forked_minters_split_remaining_supply() {
    let mut scenario = Scenario::new(config(5, 0, 10));
    let alice = TestKey::from_seed(2);

    scenario.mint(0, &alice.owner(), 2).unwrap();
    let remaining: Vec<u64> = scenario
        .minters
        .iter()
        .map(|m| m.state.remaining_count)
        .collect();
    assert_eq!(remaining, vec![2, 2]);

    // Both children keep minting independently
    scenario.mint(1, &alice.owner(), 1).unwrap();
    scenario.mint(0, &alice.owner(), 1).unwrap();
    let total: u64 = scenario.minters.iter().map(|m| m.state.remaining_count).sum();
    assert_eq!(total, 2);
}

#[test]
fn test_mint_above_limit_rejected() {
    let mut scenario = Scenario::new(config(5, 0, 10));
    let alice = TestKey::from_seed(2);

    let result = scenario.mint_with(0, &alice.owner(), 20, vec![4], |_| {});
    let msg = assert_rejected!(result, InvalidParameter);
    assert_eq!(msg, "token amount is not equal to limit");
}

#[test]
fn test_remaining_count_must_decrease_by_one() {
    let mut scenario = Scenario::new(config(5, 0, 10));
    let alice = TestKey::from_seed(2);

    let result = scenario.mint_with(0, &alice.owner(), 10, vec![3, 2], |_| {});
    let msg = assert_rejected!(result, InvalidParameter);
    assert_eq!(msg, "sumNextRemainingCount is not equal to remainingCount - 1");
}

#[test]
fn test_too_many_child_minters_rejected() {
    let mut scenario = Scenario::new(config(5, 0, 10));
    let alice = TestKey::from_seed(2);

    let result = scenario.mint_with(0, &alice.owner(), 10, vec![2, 1, 1], |_| {});
    assert_rejected!(result, CapacityExceeded);
}

#[test]
fn test_witness_counts_must_match_outputs() {
    let mut scenario = Scenario::new(config(5, 0, 10));
    let alice = TestKey::from_seed(2);

    // Outputs commit to [4] but the witness claims [2, 2]
    let result = scenario.mint_with(0, &alice.owner(), 10, vec![4], |spend| {
        spend.next_remaining_counts = vec![2, 2];
    });
    let msg = assert_rejected!(result, InvalidParameter);
    assert_eq!(msg, "outputs are invalid");
}
