// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{collections::HashSet, sync::Arc};

use alloy::primitives::{Address, U256};
use anyhow::Result;
use arena_client::{AuthorizationState, DecryptionRequest, SubmitOutcome};
use arena_coprocessor::DecryptionBackend;
use arena_data::SledDb;
use arena_events::{ArenaError, ArenaEvent, ScoreSubmitted};
use arena_ledger::{LedgerRead, LedgerWrite};
use arena_test_helpers::{
    setup_test_tracing, sign_authorization, to_u64, wallet_from_seed, ArenaTestSystem,
    CountingSigner, DecliningSigner, TEST_START,
};
use futures::future::join_all;

fn contract_a() -> Address {
    Address::repeat_byte(0xA0)
}

fn contract_b() -> Address {
    Address::repeat_byte(0xB0)
}

/// Decrypted history of the session's account in submission order.
fn clear_history(session: &arena_client::ArenaSession) -> Vec<Option<u64>> {
    session
        .snapshot()
        .clear_history()
        .into_iter()
        .map(|v| v.map(to_u64))
        .collect()
}

#[tokio::test]
async fn test_five_score_scenario() -> Result<()> {
    let _guard = setup_test_tracing("info");
    let system = ArenaTestSystem::new(1)?;
    let (wallet, _) = wallet_from_seed(1)?;
    let session = system
        .session_for(contract_a(), Arc::new(wallet.clone()))
        .await?;

    for score in [5u64, 15, 25, 35, 45] {
        let outcome = session.submit_score(score).await;
        assert!(matches!(outcome, SubmitOutcome::Submitted(_)), "{outcome:?}");
        assert_eq!(session.snapshot().status, format!("Score ({score}) submitted!"));
    }

    let ledger = system.ledger(contract_a());
    let history = ledger.get_score_history(wallet.address()).await?;
    assert_eq!(history.len(), 5);
    assert_eq!(ledger.get_submit_count(wallet.address()).await?, 5);

    let result = session.decrypt_history().await?;
    assert!(result.is_complete());
    assert_eq!(result.values[&history[0]], U256::from(5));
    assert_eq!(result.values[&history[4]], U256::from(45));
    assert_eq!(
        clear_history(&session),
        vec![Some(5), Some(15), Some(25), Some(35), Some(45)]
    );

    let submitted: Vec<u64> = system
        .events_of("ScoreSubmitted")
        .into_iter()
        .filter_map(|e| match e {
            ArenaEvent::ScoreSubmitted(ScoreSubmitted { index, .. }) => Some(index),
            _ => None,
        })
        .collect();
    assert_eq!(submitted, vec![0, 1, 2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_user_with_no_submissions() -> Result<()> {
    let system = ArenaTestSystem::new(2)?;
    let (wallet, _) = wallet_from_seed(2)?;
    let signer = CountingSigner::new(wallet.clone());
    let session = system
        .session_for(contract_a(), Arc::new(signer.clone()))
        .await?;

    let ledger = system.ledger(contract_a());
    assert!(ledger.get_score_history(wallet.address()).await?.is_empty());
    assert_eq!(ledger.get_submit_count(wallet.address()).await?, 0);

    let snapshot = session.snapshot();
    assert!(snapshot.handles.is_empty());
    assert!(!snapshot.can_decrypt);

    let result = session.decrypt_history().await?;
    assert!(result.values.is_empty());
    assert!(result.is_complete());
    assert_eq!(signer.prompts(), 0);
    Ok(())
}

#[tokio::test]
async fn test_round_trip_at_the_bounds() -> Result<()> {
    let system = ArenaTestSystem::new(3)?;
    let (wallet, _) = wallet_from_seed(3)?;
    let session = system
        .session_for(contract_a(), Arc::new(wallet))
        .await?;

    let values = [0u64, 1 << 31, u64::from(u32::MAX)];
    for value in values {
        assert!(session.submit_score(value).await.receipt().is_some());
    }
    assert!(matches!(
        session.submit_score(u64::from(u32::MAX) + 1).await,
        SubmitOutcome::Failed(ArenaError::ValueOutOfRange { .. })
    ));

    session.decrypt_history().await?;
    assert_eq!(
        clear_history(&session),
        values.iter().copied().map(Some).collect::<Vec<_>>()
    );
    Ok(())
}

#[tokio::test]
async fn test_duplicates_keep_distinct_handles() -> Result<()> {
    let system = ArenaTestSystem::new(4)?;
    let (wallet, _) = wallet_from_seed(4)?;
    let session = system
        .session_for(contract_a(), Arc::new(wallet))
        .await?;

    for _ in 0..3 {
        session.submit_score(50u64).await;
    }
    let handles = session.snapshot().handles;
    assert_eq!(handles.iter().collect::<HashSet<_>>().len(), 3);

    session.decrypt_history().await?;
    assert_eq!(clear_history(&session), vec![Some(50); 3]);
    Ok(())
}

#[tokio::test]
async fn test_concurrent_submissions_are_gap_free() -> Result<()> {
    let system = ArenaTestSystem::new(5)?;
    let ledger = system.ledger(contract_a());
    let user = Address::repeat_byte(0x11);

    let mut inputs = Vec::new();
    for value in 0..10u64 {
        inputs.push(system.encrypt(value, contract_a(), user).await?);
    }
    let results = join_all(
        inputs
            .iter()
            .map(|input| ledger.submit_score(user, input.handle, &input.proof)),
    )
    .await;

    let mut indices = results
        .into_iter()
        .map(|r| r.map(|receipt| receipt.entry.index))
        .collect::<Result<Vec<_>, _>>()?;
    indices.sort();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());

    let history = ledger.get_score_history(user).await?;
    assert_eq!(history.len() as u64, ledger.get_submit_count(user).await?);
    for (index, handle) in history.iter().enumerate() {
        let entry = ledger
            .ledger()
            .get_entry(user, index as u64)?
            .ok_or_else(|| anyhow::anyhow!("missing entry {index}"))?;
        assert_eq!(entry.handle, *handle);
    }
    Ok(())
}

#[tokio::test]
async fn test_users_are_isolated() -> Result<()> {
    let system = ArenaTestSystem::new(6)?;
    let ledger = system.ledger(contract_a());
    let alice = Address::repeat_byte(0x0A);
    let bob = Address::repeat_byte(0x0B);

    system.submit(&ledger, alice, 1).await?;
    system.submit(&ledger, alice, 2).await?;
    let before = ledger.get_score_history(alice).await?;

    let receipt = system.submit(&ledger, bob, 3).await?;
    assert_eq!(receipt.entry.index, 0);
    assert_eq!(ledger.get_score_history(alice).await?, before);
    assert_eq!(ledger.get_submit_count(alice).await?, 2);
    assert_eq!(ledger.get_submit_count(bob).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_rejected_submissions_leave_no_trace() -> Result<()> {
    let system = ArenaTestSystem::new(7)?;
    let ledger = system.ledger(contract_a());
    let user = Address::repeat_byte(0x21);
    let input = system.encrypt(9, contract_a(), user).await?;

    // Submitted by someone else than the proof was issued for
    let other = Address::repeat_byte(0x22);
    let err = ledger
        .submit_score(other, input.handle, &input.proof)
        .await
        .err();
    assert!(matches!(err, Some(ArenaError::InvalidProof(_))));

    ledger.submit_score(user, input.handle, &input.proof).await?;
    // Replaying the same proof fails
    let err = ledger
        .submit_score(user, input.handle, &input.proof)
        .await
        .err();
    assert!(matches!(err, Some(ArenaError::InvalidProof(_))));

    // Coprocessor down
    let input = system.encrypt(10, contract_a(), user).await?;
    system.coprocessor.set_online(false);
    let err = ledger
        .submit_score(user, input.handle, &input.proof)
        .await
        .err();
    assert!(matches!(err, Some(ArenaError::CoprocessorUnavailable(_))));

    assert_eq!(ledger.get_submit_count(user).await?, 1);
    assert_eq!(ledger.get_submit_count(other).await?, 0);
    assert_eq!(system.events_of("SubmissionRejected").len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_cross_scope_authorizations_are_rejected() -> Result<()> {
    let system = ArenaTestSystem::new(8)?;
    let (_, x) = wallet_from_seed(8)?;
    let (_, y) = wallet_from_seed(9)?;
    let ledger_a = system.ledger(contract_a());
    let ledger_b = system.ledger(contract_b());

    let x_on_a = system.submit(&ledger_a, x.address(), 1).await?.entry.handle;
    let y_on_a = system.submit(&ledger_a, y.address(), 2).await?.entry.handle;
    let x_on_b = system.submit(&ledger_b, x.address(), 3).await?.entry.handle;

    let domain = system.coprocessor.authorization_domain();
    let auth = sign_authorization(&x, contract_a(), &domain, TEST_START, 3600)?;

    let values = system.coprocessor.user_decrypt(&[x_on_a], &auth).await?;
    assert_eq!(values[&x_on_a], U256::from(1));

    for foreign in [y_on_a, x_on_b] {
        let err = system
            .coprocessor
            .user_decrypt(&[x_on_a, foreign], &auth)
            .await
            .err();
        assert!(
            matches!(err, Some(ArenaError::AuthorizationDenied(_))),
            "{err:?}"
        );
    }

    // Expired
    system.clock.advance(3600);
    let err = system.coprocessor.user_decrypt(&[x_on_a], &auth).await.err();
    assert!(matches!(err, Some(ArenaError::AuthorizationDenied(_))));
    Ok(())
}

#[tokio::test]
async fn test_session_decrypt_is_scoped_per_contract() -> Result<()> {
    let system = ArenaTestSystem::new(10)?;
    let (wallet, _) = wallet_from_seed(10)?;
    let signer = CountingSigner::new(wallet.clone());
    let session = system
        .session_for(contract_a(), Arc::new(signer.clone()))
        .await?;
    session.submit_score(4u64).await;
    let ledger_b = system.ledger(contract_b());
    let foreign = system.submit(&ledger_b, wallet.address(), 8).await?.entry.handle;

    let mut batch: Vec<_> = session
        .snapshot()
        .handles
        .into_iter()
        .map(|handle| DecryptionRequest {
            handle,
            contract: contract_a(),
        })
        .collect();
    batch.push(DecryptionRequest {
        handle: foreign,
        contract: contract_b(),
    });

    let result = session.decryption().decrypt(&batch).await?;
    assert_eq!(result.values.len(), 2);
    assert_eq!(result.values[&foreign], U256::from(8));
    // One prompt per contract
    assert_eq!(signer.prompts(), 2);
    Ok(())
}

#[tokio::test]
async fn test_declined_authorization() -> Result<()> {
    let system = ArenaTestSystem::new(11)?;
    let user = Address::repeat_byte(0x31);
    let ledger = system.ledger(contract_a());
    system.submit(&ledger, user, 12).await?;

    let session = system
        .session_for(contract_a(), Arc::new(DecliningSigner::new(user)))
        .await?;
    assert!(session.snapshot().can_decrypt);

    let result = session.decrypt_history().await?;
    assert!(result.values.is_empty());
    assert!(matches!(
        result.failures[0].error,
        ArenaError::AuthorizationDenied(_)
    ));
    assert_eq!(
        session.decryption().authorization_state(contract_a(), user),
        AuthorizationState::Unauthorized
    );
    let snapshot = session.snapshot();
    assert!(!snapshot.is_decrypting);
    assert!(snapshot.can_decrypt);
    assert!(snapshot.results.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_history_survives_a_restart() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let (wallet, _) = wallet_from_seed(0x41)?;
    let user = wallet.address();
    let handles = {
        let system = ArenaTestSystem::sled(dir.path(), 12)?;
        let ledger = system.ledger(contract_a());
        system.submit(&ledger, user, 21).await?;
        system.submit(&ledger, user, 22).await?;
        ledger.get_score_history(user).await?
    };
    SledDb::close_all_connections();

    let system = ArenaTestSystem::sled(dir.path(), 13)?;
    let ledger = system.ledger(contract_a());
    assert_eq!(ledger.get_score_history(user).await?, handles);
    assert_eq!(ledger.get_submit_count(user).await?, 2);

    // Key material is reloaded, so the old ciphertexts still decrypt
    let session = system
        .session_for(contract_a(), Arc::new(wallet))
        .await?;
    session.decrypt_history().await?;
    assert_eq!(clear_history(&session), vec![Some(21), Some(22)]);
    Ok(())
}
