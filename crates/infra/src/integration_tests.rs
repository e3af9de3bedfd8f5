//! Engine + repository integration tests.
//!
//! The engine is specified against the repository contract; these tests
//! exercise the whole stack (lifecycle, arbitrator, verifier) over the
//! in-memory implementation with scripted oracles.

use std::sync::Arc;

use async_trait::async_trait;

use truetag_core::{DomainError, LabelRegion, TrustScore, UserId};
use truetag_engine::{
    EngineConfig, NewProduct, Product, ProductLifecycle, ProductRepository, ProductStatus,
    ReturnArbitrator, Verifier,
};
use truetag_oracle::{LabelOracle, LabelRequest, OracleError, TrustOracle, TrustRequest};
use truetag_token::TokenService;

use crate::InMemoryProductRepository;

/// Trust oracle returning a fixed score, or failing when `score` is `None`.
struct ScriptedTrustOracle {
    score: Option<f64>,
}

impl ScriptedTrustOracle {
    fn fixed(score: f64) -> Self {
        Self { score: Some(score) }
    }

    fn unavailable() -> Self {
        Self { score: None }
    }
}

#[async_trait]
impl TrustOracle for ScriptedTrustOracle {
    async fn score_return(&self, _request: TrustRequest) -> Result<TrustScore, OracleError> {
        match self.score {
            Some(s) => Ok(TrustScore::new(s).unwrap()),
            None => Err(OracleError::Timeout),
        }
    }
}

struct ScriptedLabelOracle {
    score: Option<f64>,
}

#[async_trait]
impl LabelOracle for ScriptedLabelOracle {
    async fn score_label(&self, _request: LabelRequest) -> Result<f64, OracleError> {
        self.score.ok_or(OracleError::Status(503))
    }
}

struct Harness {
    lifecycle: ProductLifecycle,
    arbitrator: ReturnArbitrator,
    repository: Arc<InMemoryProductRepository>,
}

fn harness(oracle: ScriptedTrustOracle) -> Harness {
    let repository = Arc::new(InMemoryProductRepository::new());
    let tokens = TokenService::new(b"integration-secret".to_vec()).unwrap();
    let lifecycle = ProductLifecycle::new(repository.clone(), tokens);
    let arbitrator = ReturnArbitrator::new(
        repository.clone(),
        Arc::new(oracle),
        EngineConfig::default(),
    );
    Harness {
        lifecycle,
        arbitrator,
        repository,
    }
}

fn new_product(serial: &str) -> NewProduct {
    NewProduct {
        serial_number: serial.to_string(),
        name: "Limited Sneaker".to_string(),
        brand: "Acme".to_string(),
        label_region: LabelRegion::new(0.0, 0.0, 100.0, 50.0).unwrap(),
    }
}

async fn registered_and_activated(h: &Harness, serial: &str, owner: UserId) -> Product {
    let product = h.lifecycle.register(new_product(serial)).await.unwrap();
    h.lifecycle
        .activate(&product.identity_token, owner)
        .await
        .unwrap();
    h.repository
        .find_by_id(product.id)
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn registration_assigns_unique_identity_tokens() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let a = h.lifecycle.register(new_product("SN-001")).await.unwrap();
    let b = h.lifecycle.register(new_product("SN-002")).await.unwrap();
    assert_ne!(a.identity_token, b.identity_token);
    assert_eq!(a.status, ProductStatus::Created);
}

#[tokio::test]
async fn duplicate_serial_registration_fails() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    h.lifecycle.register(new_product("SN-001")).await.unwrap();
    let err = h
        .lifecycle
        .register(new_product("SN-001"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateKey(_)));
}

#[tokio::test]
async fn concurrent_activation_has_exactly_one_winner() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let product = h.lifecycle.register(new_product("SN-001")).await.unwrap();

    let lifecycle = Arc::new(h.lifecycle);
    let mut handles = Vec::new();
    for _ in 0..16 {
        let lifecycle = lifecycle.clone();
        let token = product.identity_token.clone();
        handles.push(tokio::spawn(async move {
            lifecycle.activate(&token, UserId::new()).await
        }));
    }

    let mut winners = 0;
    let mut losers = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(summary) => {
                assert_eq!(summary.status, ProductStatus::Activated);
                winners += 1;
            }
            Err(DomainError::AlreadyActivated) => losers += 1,
            Err(other) => panic!("unexpected activation error: {other:?}"),
        }
    }
    assert_eq!(winners, 1);
    assert_eq!(losers, 15);
}

#[tokio::test]
async fn activation_of_unknown_token_is_not_found() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let err = h
        .lifecycle
        .activate(&"f".repeat(64).into(), UserId::new())
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotFound);
}

#[tokio::test]
async fn non_owner_cannot_request_return() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    let err = h
        .arbitrator
        .request_return(
            &product.identity_token,
            UserId::new(),
            "damaged".to_string(),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotOwner);
}

#[tokio::test]
async fn never_activated_product_cannot_be_returned() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let product = h.lifecycle.register(new_product("SN-001")).await.unwrap();

    // No owner exists yet, so the ownership check fails by construction.
    let err = h
        .arbitrator
        .request_return(
            &product.identity_token,
            UserId::new(),
            "damaged".to_string(),
            None,
        )
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotOwner);
}

#[tokio::test]
async fn threshold_is_inclusive_at_exactly_0_7() {
    let h = harness(ScriptedTrustOracle::fixed(0.7));
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    let outcome = h
        .arbitrator
        .request_return(&product.identity_token, owner, "damaged".to_string(), None)
        .await
        .unwrap();
    assert!(outcome.approved);

    let stored = h.repository.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProductStatus::Returned);
}

#[tokio::test]
async fn score_just_below_threshold_is_denied() {
    let h = harness(ScriptedTrustOracle::fixed(0.6999999));
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    let outcome = h
        .arbitrator
        .request_return(&product.identity_token, owner, "damaged".to_string(), None)
        .await
        .unwrap();
    assert!(!outcome.approved);

    let stored = h.repository.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProductStatus::Activated);
    assert_eq!(stored.return_attempts.len(), 1);
    assert!(!stored.return_attempts[0].approved);
}

#[tokio::test]
async fn oracle_outage_degrades_to_fallback_score() {
    let h = harness(ScriptedTrustOracle::unavailable());
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    // The request still completes; no error is surfaced.
    let outcome = h
        .arbitrator
        .request_return(&product.identity_token, owner, "damaged".to_string(), None)
        .await
        .unwrap();

    assert!(!outcome.approved);
    assert!(outcome.degraded);
    assert_eq!(outcome.trust_score, TrustScore::FALLBACK);

    let stored = h.repository.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.return_attempts[0].trust_score, TrustScore::FALLBACK);
    assert!(stored.return_attempts[0].degraded);
}

#[tokio::test]
async fn every_denied_attempt_lands_in_the_ledger_in_order() {
    let h = harness(ScriptedTrustOracle::fixed(0.2));
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    for i in 0..4 {
        let outcome = h
            .arbitrator
            .request_return(
                &product.identity_token,
                owner,
                format!("attempt {i}"),
                None,
            )
            .await
            .unwrap();
        assert!(!outcome.approved);
    }

    let stored = h.repository.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.return_attempts.len(), 4);
    for (i, attempt) in stored.return_attempts.iter().enumerate() {
        assert_eq!(attempt.reason, format!("attempt {i}"));
    }
    assert!(
        stored
            .return_attempts
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp)
    );
}

#[tokio::test]
async fn concurrent_return_attempts_are_all_recorded() {
    let h = harness(ScriptedTrustOracle::fixed(0.2));
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    let arbitrator = Arc::new(h.arbitrator);
    let mut handles = Vec::new();
    for i in 0..3 {
        let arbitrator = arbitrator.clone();
        let token = product.identity_token.clone();
        handles.push(tokio::spawn(async move {
            arbitrator
                .request_return(&token, owner, format!("concurrent {i}"), None)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = h.repository.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.return_attempts.len(), 3);
}

#[tokio::test]
async fn end_to_end_scenario() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let u1 = UserId::new();
    let u2 = UserId::new();

    // Register SN-001; receive identity token T.
    let product = h.lifecycle.register(new_product("SN-001")).await.unwrap();
    let token = product.identity_token.clone();

    // Activate(T, U1) succeeds.
    let summary = h.lifecycle.activate(&token, u1).await.unwrap();
    assert_eq!(summary.status, ProductStatus::Activated);
    assert_eq!(summary.activated_by, Some(u1));

    // Activate(T, U2) is a benign idempotent failure.
    let err = h.lifecycle.activate(&token, u2).await.unwrap_err();
    assert_eq!(err, DomainError::AlreadyActivated);

    // RequestReturn(T, U1) with a forced 0.9 score approves and terminates.
    let outcome = h
        .arbitrator
        .request_return(&token, u1, "damaged".to_string(), None)
        .await
        .unwrap();
    assert!(outcome.approved);
    let stored = h.repository.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProductStatus::Returned);

    // A second return is rejected outright; status stays Returned and the
    // ledger does not grow.
    let err = h
        .arbitrator
        .request_return(&token, u1, "again".to_string(), None)
        .await
        .unwrap_err();
    assert_eq!(err, DomainError::NotReturnable);
    let stored = h.repository.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ProductStatus::Returned);
    assert_eq!(stored.return_attempts.len(), 1);
}

#[tokio::test]
async fn return_history_is_most_recent_first() {
    let h = harness(ScriptedTrustOracle::fixed(0.2));
    let owner = UserId::new();
    let first = registered_and_activated(&h, "SN-001", owner).await;
    let second = registered_and_activated(&h, "SN-002", owner).await;

    h.arbitrator
        .request_return(&first.identity_token, owner, "scuffed".to_string(), None)
        .await
        .unwrap();
    h.arbitrator
        .request_return(&second.identity_token, owner, "scuffed".to_string(), None)
        .await
        .unwrap();
    h.arbitrator
        .request_return(&first.identity_token, owner, "scuffed more".to_string(), None)
        .await
        .unwrap();

    let history = h.arbitrator.get_return_history(owner).await.unwrap();
    assert_eq!(history.len(), 2);
    // SN-001 got the most recent attempt, so it sorts first.
    assert_eq!(history[0].serial_number, "SN-001");
    assert_eq!(history[0].return_attempts.len(), 2);
    assert_eq!(history[1].serial_number, "SN-002");

    // A stranger has no history.
    let empty = h.arbitrator.get_return_history(UserId::new()).await.unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn verify_reports_label_score_when_oracle_is_up() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    let verifier = Verifier::new(
        h.repository.clone(),
        Arc::new(ScriptedLabelOracle { score: Some(0.83) }),
    );

    let result = verifier
        .verify(&product.identity_token, Some("aGVsbG8=".to_string()))
        .await
        .unwrap();
    assert!(result.is_authentic);
    assert_eq!(result.serial_number, "SN-001");
    assert_eq!(result.status, ProductStatus::Activated);
    assert_eq!(result.label_match_score, Some(0.83));
}

#[tokio::test]
async fn verify_survives_label_oracle_outage() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let owner = UserId::new();
    let product = registered_and_activated(&h, "SN-001", owner).await;

    let verifier = Verifier::new(
        h.repository.clone(),
        Arc::new(ScriptedLabelOracle { score: None }),
    );

    let result = verifier
        .verify(&product.identity_token, Some("aGVsbG8=".to_string()))
        .await
        .unwrap();
    assert!(result.is_authentic);
    assert!(result.label_match_score.is_none());
}

#[tokio::test]
async fn verify_without_image_skips_the_oracle_entirely() {
    let h = harness(ScriptedTrustOracle::fixed(0.9));
    let product = h.lifecycle.register(new_product("SN-001")).await.unwrap();

    let verifier = Verifier::new(
        h.repository.clone(),
        Arc::new(ScriptedLabelOracle { score: None }),
    );

    let result = verifier
        .verify(&product.identity_token, None)
        .await
        .unwrap();
    assert_eq!(result.status, ProductStatus::Created);
    assert!(result.label_match_score.is_none());
}
