//! # End-to-End Issuance Scenarios
//!
//! Drives the public [`Engine`] surface through the deployment flows the
//! collection is expected to support: privileged minting, allowlist
//! self-minting, root rotation, and both bulk-mint policies.

use std::collections::BTreeSet;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use mintgate_engine::{
    AllowlistTree, BulkMintPolicy, CallContext, Engine, EngineConfig, EngineEvent, MintError,
    Principal, Proof, ReceiverContext, Role, TokenId,
};

fn p(n: u8) -> Principal {
    Principal::from_bytes([n; 20])
}

const ADMIN: u8 = 0xA1;
const MINTER: u8 = 0xB2;
const RECIPIENT: u8 = 0xC3;

fn deploy() -> Engine {
    Engine::new(EngineConfig::new("Gas Test", "GAS", "https://meta.example/", p(ADMIN)))
        .expect("valid config")
}

fn allowlist(engine: &Engine, members: &[Principal]) -> AllowlistTree {
    AllowlistTree::from_principals(engine.hash_algorithm().unwrap(), members).expect("non-empty allowlist")
}

// -- Privileged path ----------------------------------------------------------

#[test]
fn admin_mints_then_delegated_minter_bulk_mints() {
    let engine = deploy();
    let (a, m, r) = (p(ADMIN), p(MINTER), p(RECIPIENT));

    assert_eq!(engine.mint(a, r).unwrap(), TokenId(1));
    assert_eq!(engine.owner_of(TokenId(1)).unwrap(), r);
    assert_eq!(engine.balance_of(&r).unwrap(), 1);

    assert!(engine.grant_role(a, Role::Minter, m).unwrap());
    let ids = engine.bulk_mint(m, &[r, r]).unwrap();
    assert_eq!(ids, vec![TokenId(2), TokenId(3)]);
    assert_eq!(engine.balance_of(&r).unwrap(), 3);
    assert_eq!(engine.total_supply().unwrap(), 3);
    assert_eq!(engine.tokens_of_owner(&r).unwrap(), vec![TokenId(1), TokenId(2), TokenId(3)]);
    assert_eq!(engine.token_of_owner_by_index(&r, 2).unwrap(), TokenId(3));
    assert_eq!(
        engine.token_of_owner_by_index(&r, 3),
        Err(MintError::IndexOutOfRange { index: 3, len: 3 })
    );

    // Minter carries no administrative authority.
    assert!(!engine.has_role(&m, Role::Administrator).unwrap());
    assert!(!engine.has_role(&m, Role::Executor).unwrap());
    assert!(engine.grant_role(m, Role::Minter, r).unwrap_err().is_unauthorized());
}

#[test]
fn unauthorized_mint_leaves_state_untouched() {
    let engine = deploy();
    let seq = engine.last_event_seq().unwrap();

    let err = engine.mint(p(9), p(RECIPIENT)).unwrap_err();
    assert_eq!(
        err,
        MintError::Unauthorized {
            principal: p(9),
            role: Role::Minter
        }
    );
    assert!(engine.bulk_mint(p(9), &[p(1), p(2)]).is_err());

    assert_eq!(engine.total_supply().unwrap(), 0);
    assert!(engine.events_since(seq).unwrap().is_empty());
    assert_eq!(engine.owner_of(TokenId(1)), Err(MintError::NotFound(TokenId(1))));
    assert!(!engine.exists(TokenId(1)).unwrap());
}

// -- Allowlist path -----------------------------------------------------------

#[test]
fn listed_principal_self_mints_and_proof_does_not_transfer() {
    let engine = deploy();
    let (u, n) = (p(0x11), p(0x22));
    let tree = allowlist(&engine, &[u, p(0x33), p(0x44)]);
    engine.set_merkle_root(p(ADMIN), tree.root()).unwrap();

    let proof = tree.proof_for(&u).expect("member has a proof");
    let id = engine.mint_allowlisted(u, &proof).unwrap();
    assert_eq!(engine.owner_of(id).unwrap(), u);

    assert_eq!(engine.mint_allowlisted(n, &proof), Err(MintError::InvalidProof));
    assert_eq!(engine.balance_of(&n).unwrap(), 0);
    assert_eq!(engine.total_supply().unwrap(), 1);
}

#[test]
fn proofs_are_not_consumed() {
    let engine = deploy();
    let u = p(0x11);
    let tree = allowlist(&engine, &[u, p(0x12)]);
    engine.set_merkle_root(p(ADMIN), tree.root()).unwrap();

    let proof = tree.proof_for(&u).unwrap();
    assert_eq!(engine.mint_allowlisted(u, &proof).unwrap(), TokenId(1));
    assert_eq!(engine.mint_allowlisted(u, &proof).unwrap(), TokenId(2));
    assert_eq!(engine.balance_of(&u).unwrap(), 2);
}

#[test]
fn non_admin_root_update_fails_and_old_root_stays_active() {
    let engine = deploy();
    let u = p(0x11);
    let tree = allowlist(&engine, &[u, p(0x12), p(0x13)]);
    engine.set_merkle_root(p(ADMIN), tree.root()).unwrap();

    let attacker = p(0x66);
    let forged = allowlist(&engine, &[attacker]);
    let err = engine.set_merkle_root(attacker, forged.root()).unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "caller is not the owner");
    assert_eq!(engine.merkle_root().unwrap(), Some(tree.root()));

    assert_eq!(
        engine.mint_allowlisted(attacker, &Proof::empty()),
        Err(MintError::InvalidProof)
    );
    engine
        .mint_allowlisted(u, &tree.proof_for(&u).unwrap())
        .expect("old root still verifies");
}

#[test]
fn root_rotation_invalidates_old_proofs() {
    let engine = deploy();
    let (u, v) = (p(0x11), p(0x12));
    let first = allowlist(&engine, &[u, p(0x13)]);
    let second = allowlist(&engine, &[v, p(0x14)]);

    engine.set_merkle_root(p(ADMIN), first.root()).unwrap();
    let stale = first.proof_for(&u).unwrap();
    engine.set_merkle_root(p(ADMIN), second.root()).unwrap();

    assert_eq!(engine.mint_allowlisted(u, &stale), Err(MintError::InvalidProof));
    engine.mint_allowlisted(v, &second.proof_for(&v).unwrap()).unwrap();

    let rotations: Vec<_> = engine
        .events()
        .unwrap()
        .into_iter()
        .filter_map(|r| match r.event {
            EngineEvent::MerkleRootUpdated { previous, current } => Some((previous, current)),
            _ => None,
        })
        .collect();
    assert_eq!(
        rotations,
        vec![(None, first.root()), (Some(first.root()), second.root())]
    );
}

#[test]
fn malformed_proof_is_rejected_at_parse_time() {
    let err = Proof::from_hex(&["0x1234"]).unwrap_err();
    assert_eq!(MintError::from(err.clone()), MintError::MalformedInput(err));
}

// -- Bulk mint policies -------------------------------------------------------

/// Admin `a` revokes Minter from `m` as soon as it receives a token.
fn revoke_on_receipt(engine: &Engine, a: Principal, m: Principal) {
    engine
        .install_receiver(a, move |ctx: &mut ReceiverContext<'_>, _id: TokenId| {
            ctx.revoke_role(Role::Minter, &m)
                .expect("receiver is an administrator");
        })
        .unwrap();
}

#[test]
fn require_again_keeps_earlier_issuances_when_authorization_lapses() {
    let engine = deploy();
    let (a, m, r) = (p(ADMIN), p(MINTER), p(RECIPIENT));
    engine.grant_role(a, Role::Minter, m).unwrap();
    revoke_on_receipt(&engine, a, m);

    let err = engine
        .bulk_mint_with_policy(m, &[r, a, r], BulkMintPolicy::RequireAgain)
        .unwrap_err();

    match &err {
        MintError::BatchInterrupted { committed, source } => {
            assert_eq!(committed, &vec![TokenId(1), TokenId(2)]);
            assert_eq!(
                **source,
                MintError::Unauthorized {
                    principal: m,
                    role: Role::Minter
                }
            );
        }
        other => panic!("expected BatchInterrupted, got {other:?}"),
    }
    assert!(err.root_cause().is_unauthorized());

    // The committed prefix is not rolled back.
    assert_eq!(engine.total_supply().unwrap(), 2);
    assert_eq!(engine.owner_of(TokenId(1)).unwrap(), r);
    assert_eq!(engine.owner_of(TokenId(2)).unwrap(), a);
    assert!(!engine.has_role(&m, Role::Minter).unwrap());
}

#[test]
fn require_once_completes_the_batch_it_authorized() {
    let engine = deploy();
    let (a, m, r) = (p(ADMIN), p(MINTER), p(RECIPIENT));
    engine.grant_role(a, Role::Minter, m).unwrap();
    revoke_on_receipt(&engine, a, m);

    let ids = engine
        .bulk_mint_with_policy(m, &[r, a, r], BulkMintPolicy::RequireOnce)
        .unwrap();
    assert_eq!(ids, vec![TokenId(1), TokenId(2), TokenId(3)]);
    assert!(!engine.has_role(&m, Role::Minter).unwrap());

    // The revocation applies to the next call.
    assert!(engine.bulk_mint(m, &[r]).unwrap_err().is_unauthorized());
    assert_eq!(engine.total_supply().unwrap(), 3);
}

#[test]
fn require_again_without_interference_matches_require_once() {
    let once = deploy();
    let again = Engine::new(
        EngineConfig::new("Gas Test", "GAS", "", p(ADMIN)).with_bulk_policy(BulkMintPolicy::RequireAgain),
    )
    .unwrap();
    let recipients = [p(1), p(2), p(1), p(3)];

    let a = once.bulk_mint(p(ADMIN), &recipients).unwrap();
    let b = again.bulk_mint(p(ADMIN), &recipients).unwrap();
    assert_eq!(a, b);
    assert_eq!(again.bulk_policy().unwrap(), BulkMintPolicy::RequireAgain);
}

// -- Receiver hooks -----------------------------------------------------------

#[test]
fn hook_querying_its_own_engine_fails_fast() {
    let engine = deploy();
    let (a, r) = (p(ADMIN), p(RECIPIENT));
    let handle = engine.clone();
    let (seen_tx, seen_rx) = mpsc::channel();
    engine
        .install_receiver(r, move |ctx: &mut ReceiverContext<'_>, _id: TokenId| {
            let from_engine = handle.balance_of(&ctx.principal());
            let _ = seen_tx.send((from_engine, ctx.balance_of(&ctx.principal())));
        })
        .unwrap();

    let (done_tx, done_rx) = mpsc::channel();
    let worker = engine.clone();
    thread::spawn(move || {
        let _ = done_tx.send(worker.mint(a, r));
    });

    let minted = done_rx
        .recv_timeout(Duration::from_secs(3))
        .expect("mint returned while its hook queried the engine");
    assert_eq!(minted, Ok(TokenId(1)));
    assert_eq!(seen_rx.recv().unwrap(), (Err(MintError::Reentrant), 1));

    // The lock was released; other callers proceed.
    assert_eq!(engine.balance_of(&r).unwrap(), 1);
    assert!(engine.exists(TokenId(1)).unwrap());
}

#[test]
fn removed_hook_no_longer_interferes() {
    let engine = deploy();
    let (a, m, r) = (p(ADMIN), p(MINTER), p(RECIPIENT));
    engine.grant_role(a, Role::Minter, m).unwrap();
    revoke_on_receipt(&engine, a, m);
    assert!(engine.remove_receiver(&a).unwrap());

    let ids = engine
        .bulk_mint_with_policy(m, &[r, a, r], BulkMintPolicy::RequireAgain)
        .unwrap();
    assert_eq!(ids, vec![TokenId(1), TokenId(2), TokenId(3)]);
    assert!(engine.has_role(&m, Role::Minter).unwrap());
    assert!(!engine.remove_receiver(&a).unwrap());
}

// -- Forwarder, metadata, journal --------------------------------------------

#[test]
fn forwarder_relays_allowlist_mint_for_member() {
    let forwarder = p(0xF0);
    let engine = Engine::new(
        EngineConfig::new("Gas Test", "GAS", "", p(ADMIN)).with_trusted_forwarder(forwarder),
    )
    .unwrap();
    let u = p(0x11);
    let tree = allowlist(&engine, &[u, p(0x12)]);
    engine.set_merkle_root(p(ADMIN), tree.root()).unwrap();
    let proof = tree.proof_for(&u).unwrap();

    let id = engine
        .mint_allowlisted(CallContext::relayed(forwarder, u), &proof)
        .unwrap();
    assert_eq!(engine.owner_of(id).unwrap(), u);
    assert_eq!(engine.balance_of(&forwarder).unwrap(), 0);

    // An untrusted relayer is treated as the caller itself.
    assert_eq!(
        engine.mint_allowlisted(CallContext::relayed(p(0xF1), u), &proof),
        Err(MintError::InvalidProof)
    );
}

#[test]
fn token_uri_follows_base_uri() {
    let engine = deploy();
    engine.mint(p(ADMIN), p(RECIPIENT)).unwrap();
    assert_eq!(engine.token_uri(TokenId(1)).unwrap(), "https://meta.example/1");

    engine.set_base_uri(p(ADMIN), "ipfs://cid/").unwrap();
    assert_eq!(engine.token_uri(TokenId(1)).unwrap(), "ipfs://cid/1");
    assert!(engine.set_base_uri(p(RECIPIENT), "x").is_err());
    assert_eq!(engine.base_uri().unwrap(), "ipfs://cid/");
}

#[test]
fn journal_records_bootstrap_and_issuance() {
    let engine = deploy();
    let a = p(ADMIN);
    engine.mint(a, p(RECIPIENT)).unwrap();

    let events = engine.events().unwrap();
    let seqs: Vec<u64> = events.iter().map(|r| r.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3, 4]);
    assert_eq!(engine.last_event_seq().unwrap(), 4);
    for (record, role) in events.iter().zip(Role::ALL) {
        assert_eq!(
            record.event,
            EngineEvent::RoleGranted {
                role,
                account: a,
                sender: a
            }
        );
    }
    assert_eq!(
        events[3].event,
        EngineEvent::Transfer {
            from: Principal::ZERO,
            to: p(RECIPIENT),
            token_id: TokenId(1)
        }
    );

    let json = serde_json::to_value(&events[3]).unwrap();
    assert_eq!(json["event"]["type"], "transfer");
    assert_eq!(json["event"]["token_id"], 1);
}

// -- Concurrency --------------------------------------------------------------

#[test]
fn concurrent_minters_never_share_an_identifier() {
    const THREADS: u8 = 8;
    const PER_THREAD: usize = 25;

    let engine = deploy();
    for t in 1..=THREADS {
        engine.grant_role(p(ADMIN), Role::Minter, p(t)).unwrap();
    }

    let handles: Vec<_> = (1..=THREADS)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || {
                let mut ids = Vec::new();
                for i in 0..PER_THREAD {
                    if i % 5 == 0 {
                        ids.extend(engine.bulk_mint(p(t), &[p(t + 100), p(t + 100)]).unwrap());
                    } else {
                        ids.push(engine.mint(p(t), p(t + 100)).unwrap());
                    }
                }
                ids
            })
        })
        .collect();

    let mut all = BTreeSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(all.insert(id), "identifier {id} issued twice");
        }
    }

    let per_thread = (PER_THREAD + PER_THREAD / 5) as u64;
    let expected = u64::from(THREADS) * per_thread;
    assert_eq!(engine.total_supply().unwrap(), expected);
    assert_eq!(all, (1..=expected).map(TokenId).collect::<BTreeSet<_>>());
    for t in 1..=THREADS {
        assert_eq!(engine.balance_of(&p(t + 100)).unwrap(), per_thread);
    }
}

#[test]
fn bulk_batches_are_contiguous_under_contention() {
    let engine = deploy();
    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || engine.bulk_mint(p(ADMIN), &vec![p(t + 1); 10]).unwrap())
        })
        .collect();
    for handle in handles {
        let ids = handle.join().unwrap();
        let first = ids[0].get();
        let expected: Vec<TokenId> = (first..first + 10).map(TokenId).collect();
        assert_eq!(ids, expected);
    }
}
