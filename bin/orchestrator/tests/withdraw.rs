use crate::setup::{
    build_orchestrator, scenario_chain, FixedBalanceOracle, RecordingClock, FORK_BLOCK,
};
use action::RetryPolicy;
use alloy_primitives::{address, Address, U256};
use client::mock::{ChainCall, MockChain};
use config::{LOCAL_FORK_CHAIN_ID, PRODUCTION_CHAIN_ID};
use orchestrator::{Orchestrator, Settings};
use withdrawal::{Error, WithdrawalInput};

#[path = "setup.rs"]
mod setup;

const DESTINATION: Address = address!("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

fn local_fork() -> MockChain {
    scenario_chain(LOCAL_FORK_CHAIN_ID)
}

fn submitted_value(chain: &MockChain) -> Option<U256> {
    chain.transactions().into_iter().find_map(|call| match call {
        ChainCall::SendWithdrawEthToFork(call) => Some(call.value),
        _ => None,
    })
}

#[tokio::test]
async fn test_withdrawal_arguments() {
    let chain = local_fork();
    let orchestrator = build_orchestrator(
        chain.clone(),
        FixedBalanceOracle::default(),
        RecordingClock::default(),
    );

    orchestrator
        .run(&WithdrawalInput::new("42", "0x3e8", DESTINATION.to_string()))
        .await
        .unwrap();

    let call = chain
        .transactions()
        .into_iter()
        .find_map(|call| match call {
            ChainCall::SendWithdrawEthToFork(call) => Some(call),
            _ => None,
        })
        .unwrap();
    assert_eq!(call.gasLimit, U256::from(100_000));
    assert_eq!(call.maxFeePerGas, U256::from(120_000_000));
    assert_eq!(call.nonce, U256::from(42));
    assert_eq!(call.value, U256::from(1000));
    assert_eq!(call.withdrawTo, DESTINATION);
}

#[tokio::test]
async fn test_malformed_destination_touches_nothing() {
    let oracle = FixedBalanceOracle::new(U256::from(1_000_000_000_000_000u64));

    for destination in [
        "0x1234",
        "not an address",
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD",
    ] {
        let chain = local_fork();
        let orchestrator =
            build_orchestrator(chain.clone(), oracle.clone(), RecordingClock::default());

        let err = orchestrator
            .run(&WithdrawalInput::new("1", "all", destination))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidAddress(_)), "{destination}");
        assert!(chain.calls().is_empty());
    }
    assert!(oracle.lookups().is_empty());
}

#[tokio::test]
async fn test_malformed_nonce_and_value() {
    let chain = local_fork();
    let orchestrator = build_orchestrator(
        chain.clone(),
        FixedBalanceOracle::default(),
        RecordingClock::default(),
    );
    let destination = DESTINATION.to_string();

    let err = orchestrator
        .run(&WithdrawalInput::new("one", "1000", destination.as_str()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidNonce(_)));

    let err = orchestrator
        .run(&WithdrawalInput::new("1", "-5", destination.as_str()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidValue(_)));

    assert!(chain.calls().is_empty());
}

#[tokio::test]
async fn test_zero_value_is_rejected() {
    let chain = local_fork();
    let orchestrator = build_orchestrator(
        chain.clone(),
        FixedBalanceOracle::default(),
        RecordingClock::default(),
    );

    let err = orchestrator
        .run(&WithdrawalInput::new("1", "0", DESTINATION.to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NonPositiveValue));
    assert!(chain.transactions().is_empty());
}

#[tokio::test]
async fn test_all_withdraws_balance_minus_fee_reservation() {
    let chain = local_fork();
    let oracle = FixedBalanceOracle::new(U256::from(1_000_000_000_000_000u64));
    let orchestrator =
        build_orchestrator(chain.clone(), oracle.clone(), RecordingClock::default());

    let outcome = orchestrator
        .run(&WithdrawalInput::new("1", "all", DESTINATION.to_string()))
        .await
        .unwrap();

    let expected = U256::from(1_000_000_000_000_000u64 - 12_000_000_000_000);
    assert_eq!(outcome.request.value, expected);
    assert_eq!(submitted_value(&chain), Some(expected));
    assert_eq!(oracle.lookups(), vec![(DESTINATION, FORK_BLOCK)]);
}

#[tokio::test]
async fn test_all_with_insufficient_balance() {
    for balance in [0u64, 12_000_000_000_000] {
        let chain = local_fork();
        let orchestrator = build_orchestrator(
            chain.clone(),
            FixedBalanceOracle::new(U256::from(balance)),
            RecordingClock::default(),
        );

        let err = orchestrator
            .run(&WithdrawalInput::new("1", "all", DESTINATION.to_string()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert!(chain.transactions().is_empty());
    }
}

#[tokio::test]
async fn test_all_without_fork_block() {
    let chain = local_fork();
    let oracle = FixedBalanceOracle::new(U256::from(1_000_000_000_000_000u64));
    let settings = Settings {
        l2_chain_id: 42161,
        l2_fork_block: None,
        inclusion: RetryPolicy::default(),
    };
    let orchestrator =
        Orchestrator::new(chain.clone(), oracle.clone(), RecordingClock::default(), settings);

    let err = orchestrator
        .run(&WithdrawalInput::new("1", "all", DESTINATION.to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MissingConfig("l2_fork_block")));
    assert!(chain.transactions().is_empty());
    assert!(oracle.lookups().is_empty());
}

#[tokio::test]
async fn test_refuses_production_chain() {
    let chain = scenario_chain(PRODUCTION_CHAIN_ID);
    let oracle = FixedBalanceOracle::new(U256::from(1_000_000_000_000_000u64));
    let orchestrator =
        build_orchestrator(chain.clone(), oracle.clone(), RecordingClock::default());

    let err = orchestrator
        .run(&WithdrawalInput::new("1", "all", DESTINATION.to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::ProductionChain { chain_id: 1 }));
    assert!(chain.transactions().is_empty());
    assert!(oracle.lookups().is_empty());

    let err = orchestrator
        .resume(alloy_primitives::B256::repeat_byte(0x01))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ProductionChain { .. }));
}
