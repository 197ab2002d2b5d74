//! Admin-controlled tokens

use crate::assert_rejected;
use crate::common::scenario::{Authorizer, Scenario, ScenarioConfig, Transfer};
use crate::common::TestKey;
use token_covenant::covenant::{AdminMethod, OwnerAuth};
use token_covenant::validator::InputSpend;

fn admin_scenario() -> Scenario {
    Scenario::new(ScenarioConfig {
        with_admin: true,
        ..ScenarioConfig::default()
    })
}

#[test]
fn test_admin_burns_user_tokens() {
    let mut scenario = admin_scenario();
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let outputs = scenario
        .transfer(Transfer::new(vec![(token, Authorizer::Admin)], vec![]).burn(1000))
        .unwrap();
    assert!(outputs.is_empty());
    // Admin anchor survives and can be used again
    assert_eq!(scenario.admin_utxo.as_ref().unwrap().parent_input, 2);
}

#[test]
fn test_admin_can_act_repeatedly() {
    let mut scenario = admin_scenario();
    let alice = TestKey::from_seed(2);
    let bob = TestKey::from_seed(3);
    let first = scenario.mint(0, &alice.owner(), 1).unwrap();
    let second = scenario.mint(0, &alice.owner(), 1).unwrap();

    scenario
        .transfer(Transfer::new(vec![(first, Authorizer::Admin)], vec![(bob.owner(), 1000)]))
        .unwrap();
    scenario
        .transfer(Transfer::new(vec![(second, Authorizer::Admin)], vec![]).burn(1000))
        .unwrap();
}

#[test]
fn test_admin_spend_still_conserves() {
    let mut scenario = admin_scenario();
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer(Transfer::new(
        vec![(token, Authorizer::Admin)],
        vec![(alice.owner(), 5000)],
    ));
    assert_rejected!(result, ConservationViolation);
}

#[test]
fn test_admin_spend_requires_owner_signature() {
    let mut scenario = admin_scenario();
    let alice = TestKey::from_seed(2);
    let mallory = TestKey::from_seed(5);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer_with(
        Transfer::new(vec![(token, Authorizer::Admin)], vec![]).burn(1000),
        |ctx, spends| {
            if let InputSpend::Admin { spend, .. } = &mut spends[2] {
                spend.auth = OwnerAuth {
                    signature: Some(mallory.sign(&ctx.sighash)),
                    contract_input_index: None,
                };
            }
        },
    );
    let msg = assert_rejected!(result, AuthorizationFailure);
    assert_eq!(msg, "owner address is not match to the pubkey");
}

#[test]
fn test_admin_must_recreate_unchanged_state_on_freeze() {
    let mut scenario = admin_scenario();
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    // Claim an ownership transfer while the output keeps the old state
    let result = scenario.transfer_with(
        Transfer::new(vec![(token, Authorizer::Admin)], vec![]).burn(1000),
        |_, spends| {
            if let InputSpend::Admin { spend, .. } = &mut spends[2] {
                spend.method = AdminMethod::TransferOwnership {
                    new_owner: alice.owner(),
                };
            }
        },
    );
    assert_rejected!(result, StateMismatch);
}

#[test]
fn test_ownership_transfer_moves_authority() {
    let mut scenario = admin_scenario();
    let alice = TestKey::from_seed(2);
    let new_admin = TestKey::from_seed(6);
    let issuer = scenario.issuer.clone();

    scenario
        .transfer_admin(&issuer, new_admin.owner())
        .unwrap();
    assert_eq!(
        scenario.admin_utxo.as_ref().unwrap().state.owner_address(),
        &new_admin.owner()
    );

    // The previous owner can no longer act
    let result = scenario.transfer_admin(&issuer, issuer.owner());
    assert_rejected!(result, AuthorizationFailure);

    // The scenario signs admin co-spends with the issuer key, so burns now fail
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();
    let result = scenario.transfer(Transfer::new(vec![(token, Authorizer::Admin)], vec![]).burn(1000));
    assert_rejected!(result, AuthorizationFailure);

    scenario.transfer_admin(&new_admin, alice.owner()).unwrap();
}
