//! Token spend authorization and guard presence

use crate::assert_rejected;
use crate::common::scenario::{Authorizer, Scenario, ScenarioConfig, Transfer};
use crate::common::TestKey;
use token_covenant::covenant::TokenUnlockArgs;
use token_covenant::validator::InputSpend;

fn token_args(spends: &mut [InputSpend], index: usize) -> &mut TokenUnlockArgs {
    match &mut spends[index] {
        InputSpend::Token { spend, .. } => &mut spend.args,
        other => panic!("input {} is not a token spend: {:?}", index, other.kind()),
    }
}

#[test]
fn test_wrong_signer_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let mallory = TestKey::from_seed(5);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer(Transfer::new(
        vec![(token, Authorizer::User(&mallory))],
        vec![(mallory.owner(), 1000)],
    ));
    let msg = assert_rejected!(result, AuthorizationFailure);
    assert_eq!(msg, "owner address is not match to the pubkey");
}

#[test]
fn test_signature_over_other_digest_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000)],
        ),
        |_, spends| *token_args(spends, 0) = TokenUnlockArgs::user(alice.sign(&[0xee; 32])),
    );
    assert_rejected!(result, AuthorizationFailure);
}

#[test]
fn test_token_cannot_authorize_itself() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000)],
        ),
        |_, spends| *token_args(spends, 0) = TokenUnlockArgs::contract(0),
    );
    let msg = assert_rejected!(result, AuthorizationFailure);
    assert_eq!(msg, "cannot reference self");
}

#[test]
fn test_token_cannot_be_authorized_by_guard() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000)],
        ),
        |_, spends| *token_args(spends, 0) = TokenUnlockArgs::contract(1),
    );
    let msg = assert_rejected!(result, AuthorizationFailure);
    assert_eq!(msg, "cannot reference guard");
}

#[test]
fn test_out_of_range_spend_index_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000)],
        ),
        |_, spends| *token_args(spends, 0) = TokenUnlockArgs::contract(7),
    );
    assert_rejected!(result, InvalidParameter);
}

#[test]
fn test_unknown_spend_type_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000)],
        ),
        |_, spends| token_args(spends, 0).spend_type = 3,
    );
    let msg = assert_rejected!(result, InvalidParameter);
    assert_eq!(msg, "invalid spendType");
}

#[test]
fn test_admin_spend_of_token_without_admin_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 1000)],
        ),
        |_, spends| *token_args(spends, 0) = TokenUnlockArgs::admin(1),
    );
    assert_rejected!(result, AuthorizationFailure);
}

#[test]
fn test_token_spend_without_guard_rejected() {
    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario.mint(0, &alice.owner(), 1).unwrap();

    // Drop the guard witness and pretend the guard is an ordinary input
    let result = scenario.transfer_with(
        Transfer::new(
            vec![(token, Authorizer::User(&alice))],
            vec![(alice.owner(), 5000)],
        ),
        |_, spends| spends[1] = InputSpend::Plain,
    );
    assert_rejected!(result, StateMismatch);
}

#[test]
fn test_forged_token_fails_backtrace() {
    use crate::common::scenario::{build_tx, TokenUtxo, TOKEN_SATS};
    use bitcoin::OutPoint;
    use token_covenant::codec::StateCodec;
    use token_covenant::types::TokenState;

    let mut scenario = Scenario::new(ScenarioConfig::default());
    let mallory = TestKey::from_seed(5);

    // Create a token output straight from a plain coin, bypassing the minter
    let funding = scenario.ledger.fund(mallory.script(), 10_000);
    let forged = TokenState::new(mallory.owner(), 1_000_000);
    let tx = build_tx(&[funding], vec![(scenario.token.script().clone(), TOKEN_SATS)]);
    let txid = scenario.ledger.apply(tx, &[forged.state_hash()]).unwrap();
    let forged_utxo = TokenUtxo {
        outpoint: OutPoint::new(txid, 0),
        state: forged,
        parent_input: 0,
    };

    let result = scenario.transfer(Transfer::new(
        vec![(forged_utxo, Authorizer::User(&mallory))],
        vec![(mallory.owner(), 1_000_000)],
    ));
    assert_rejected!(result, BacktraceMismatch);
}

#[test]
fn test_contract_owned_token_spent_by_co_spent_contract() {
    use bitcoin::ScriptBuf;
    use token_covenant::types::{OwnerAddr, ScriptHash};

    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let vault = ScriptBuf::from_bytes(vec![0x51]);
    let vault_owner = OwnerAddr::Contract(ScriptHash::of_script(&vault));

    let token = scenario.mint(0, &vault_owner, 1).unwrap();
    let vault_coin = scenario.ledger.fund(vault.clone(), 1000);

    // inputs: [token, guard, vault]
    let outputs = scenario
        .transfer(
            Transfer::new(
                vec![(token, Authorizer::Contract(2))],
                vec![(alice.owner(), 1000)],
            )
            .extra_input(vault_coin),
        )
        .unwrap();
    assert_eq!(outputs[0].state.owner, alice.owner());
}

#[test]
fn test_contract_owned_token_rejects_other_contract() {
    use bitcoin::ScriptBuf;
    use token_covenant::types::{OwnerAddr, ScriptHash};

    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let vault = ScriptBuf::from_bytes(vec![0x51]);
    let vault_owner = OwnerAddr::Contract(ScriptHash::of_script(&vault));

    let token = scenario.mint(0, &vault_owner, 1).unwrap();
    let other_coin = scenario.ledger.fund(ScriptBuf::from_bytes(vec![0x52]), 1000);

    let result = scenario.transfer(
        Transfer::new(
            vec![(token, Authorizer::Contract(2))],
            vec![(alice.owner(), 1000)],
        )
        .extra_input(other_coin),
    );
    assert_rejected!(result, AuthorizationFailure);
}

#[test]
fn test_user_signature_cannot_spend_contract_owned_token() {
    use token_covenant::types::{OwnerAddr, ScriptHash};

    let mut scenario = Scenario::new(ScenarioConfig::default());
    let alice = TestKey::from_seed(2);
    let token = scenario
        .mint(0, &OwnerAddr::Contract(ScriptHash([0x42; 32])), 1)
        .unwrap();

    let result = scenario.transfer(Transfer::new(
        vec![(token, Authorizer::User(&alice))],
        vec![(alice.owner(), 1000)],
    ));
    assert_rejected!(result, AuthorizationFailure);
}
