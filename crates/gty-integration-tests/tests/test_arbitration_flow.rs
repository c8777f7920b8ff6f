//! # Arbitration — End-to-End Integration Tests
//!
//! Exercises the full dispute lifecycle across crates: opening, defense,
//! the working-day resolution window, verdict rendering, the restitution
//! payment flow, and the symmetric trust-score penalty/restoration.

use chrono::{DateTime, TimeZone, Utc};

use gty_arbitration::{
    ArbitrationError, Decision, DisputeStatus, GuaranteeCase, RestitutionStatus,
};
use gty_core::{Actor, BusinessId, Capability, Money, ProfileId, TrustPolicy, TrustScore, UserId};
use gty_state::{Guarantee, GuaranteeStatus, StatusUpdate};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

// 2026-08-24 is a Monday.
fn monday() -> DateTime<Utc> {
    utc(2026, 8, 24, 9)
}

struct World {
    case: GuaranteeCase,
    seller: Actor,
    buyer: Actor,
    arbitrator: Actor,
    score: TrustScore,
    policy: TrustPolicy,
}

fn active_world() -> World {
    let business_id = BusinessId::new();
    let seller = Actor::with_capabilities(
        UserId::new(),
        Some(ProfileId::new()),
        [Capability::BusinessMember(business_id)],
    );
    let buyer = Actor::plain(UserId::new());
    let mut guarantee = Guarantee::create(
        &seller,
        business_id,
        buyer.user_id,
        "Custom furniture set, eight weeks".to_string(),
        serde_json::Map::new(),
        Money::from_major(100_000).unwrap(),
        None,
        monday(),
    )
    .unwrap();
    guarantee.accept(&buyer, monday()).unwrap();
    guarantee.give_consent(&seller, monday()).unwrap();
    guarantee.give_consent(&buyer, monday()).unwrap();

    let score = TrustScore::new(seller.user_id);
    World {
        case: GuaranteeCase::new(guarantee),
        seller,
        buyer,
        arbitrator: Actor::with_capabilities(UserId::new(), None, [Capability::Arbitrator]),
        score,
        policy: TrustPolicy::default(),
    }
}

fn open_dispute(w: &mut World) {
    w.case
        .open_dispute(
            &w.buyer,
            "quality".to_string(),
            "Chairs delivered with cracked joints".to_string(),
            serde_json::Map::new(),
            monday(),
        )
        .unwrap();
}

fn file_defense(w: &mut World) {
    w.case
        .submit_defense(
            &w.seller,
            serde_json::Map::new(),
            "Damage occurred in the buyer's transport".to_string(),
            monday(),
        )
        .unwrap();
}

// ---------------------------------------------------------------------------
// Test: partial refund, restitution, and the trust round trip
// ---------------------------------------------------------------------------

#[test]
fn partial_refund_case_closes_with_trust_restored() {
    let mut w = active_world();
    assert_eq!(w.score.value(), 100);

    open_dispute(&mut w);
    assert_eq!(w.case.guarantee().status, GuaranteeStatus::Disputed);

    file_defense(&mut w);
    assert_eq!(w.case.dispute().unwrap().status, DisputeStatus::InReview);

    let refund = Money::from_major(30_000).unwrap();
    w.case
        .resolve(
            &w.arbitrator,
            Decision::PartialRefund,
            "Partial delivery established; damage shared".to_string(),
            Some(refund),
            &w.policy,
            &mut w.score,
            monday(),
        )
        .unwrap();

    // Penalty lands with the verdict.
    assert_eq!(w.score.value(), 80);
    let verdict = w.case.verdict().unwrap();
    assert_eq!(verdict.decision, Decision::PartialRefund);
    assert_eq!(verdict.refund_amount, Some(refund));
    assert_eq!(w.case.restitution().unwrap().amount, refund);

    // Seller pays, buyer confirms.
    w.case
        .process_restitution(&w.seller, "bank-transfer-99841".to_string(), monday())
        .unwrap();
    assert_eq!(
        w.case.restitution().unwrap().status,
        RestitutionStatus::Processed
    );
    w.case
        .complete_restitution(&w.buyer, &w.policy, &mut w.score, monday())
        .unwrap();

    // Restoration is symmetric with the penalty, and the case is closed.
    assert_eq!(w.score.value(), 100);
    assert_eq!(
        w.case.restitution().unwrap().status,
        RestitutionStatus::Completed
    );
    assert_eq!(w.case.guarantee().status, GuaranteeStatus::Completed);
}

// ---------------------------------------------------------------------------
// Test: no-refund round trip leaves exactly one verdict, zero restitutions
// ---------------------------------------------------------------------------

#[test]
fn no_refund_round_trip() {
    let mut w = active_world();
    open_dispute(&mut w);
    file_defense(&mut w);

    w.case
        .resolve(
            &w.arbitrator,
            Decision::NoRefund,
            "Defense substantiated by delivery records".to_string(),
            None,
            &w.policy,
            &mut w.score,
            monday(),
        )
        .unwrap();

    assert_eq!(w.score.value(), 100);
    assert!(w.case.verdict().is_some());
    assert!(w.case.restitution().is_none());
    assert_eq!(w.case.guarantee().status, GuaranteeStatus::Completed);

    // A second resolution attempt changes nothing.
    let again = w.case.resolve(
        &w.arbitrator,
        Decision::Refund,
        "reconsidered".to_string(),
        None,
        &w.policy,
        &mut w.score,
        monday(),
    );
    assert!(matches!(again, Err(ArbitrationError::AlreadyResolved { .. })));
    assert_eq!(w.score.value(), 100);
}

// ---------------------------------------------------------------------------
// Test: retroactive dispute on a completed guarantee
// ---------------------------------------------------------------------------

#[test]
fn completed_guarantee_can_still_be_disputed_and_refunded() {
    let mut w = active_world();
    let mut guarantee = w.case.guarantee().clone();
    guarantee
        .update_status(&w.buyer, StatusUpdate::Completed, monday())
        .unwrap();
    let mut case = GuaranteeCase::new(guarantee);

    case.open_dispute(
        &w.buyer,
        "latent defect".to_string(),
        "Varnish peeled within a week of delivery".to_string(),
        serde_json::Map::new(),
        monday(),
    )
    .unwrap();
    assert_eq!(case.guarantee().status, GuaranteeStatus::Disputed);

    case.submit_defense(
        &w.seller,
        serde_json::Map::new(),
        "Varnish was applied to specification".to_string(),
        monday(),
    )
    .unwrap();
    case.resolve(
        &w.arbitrator,
        Decision::Refund,
        "Latent defect confirmed".to_string(),
        None,
        &w.policy,
        &mut w.score,
        monday(),
    )
    .unwrap();

    assert_eq!(w.score.value(), 50);
    assert_eq!(
        case.restitution().unwrap().amount,
        Money::from_major(100_000).unwrap()
    );
}

// ---------------------------------------------------------------------------
// Test: the working-day window for undefended disputes
// ---------------------------------------------------------------------------

#[test]
fn silence_defers_resolution_by_three_working_days() {
    let mut w = active_world();
    open_dispute(&mut w);

    // Tuesday and Wednesday: window still open.
    for (day, elapsed) in [(25, 1), (26, 2)] {
        let result = w.case.resolve(
            &w.arbitrator,
            Decision::Refund,
            "undefended".to_string(),
            None,
            &w.policy,
            &mut w.score,
            utc(2026, 8, day, 9),
        );
        match result {
            Err(ArbitrationError::NotYetResolvable {
                elapsed: got,
                required,
                ..
            }) => {
                assert_eq!(got, elapsed);
                assert_eq!(required, 3);
            }
            other => panic!("expected NotYetResolvable, got {other:?}"),
        }
    }
    assert_eq!(w.score.value(), 100);

    // Thursday: the counter-party's silence no longer blocks arbitration.
    w.case
        .resolve(
            &w.arbitrator,
            Decision::Refund,
            "No defense filed within the window".to_string(),
            None,
            &w.policy,
            &mut w.score,
            utc(2026, 8, 27, 9),
        )
        .unwrap();
    assert_eq!(w.score.value(), 50);
    assert_eq!(w.case.dispute().unwrap().status, DisputeStatus::Resolved);
}

// ---------------------------------------------------------------------------
// Test: weekends do not count toward the window
// ---------------------------------------------------------------------------

#[test]
fn weekend_does_not_advance_the_resolution_window() {
    let mut w = active_world();
    // Open on Friday 2026-08-28.
    w.case
        .open_dispute(
            &w.buyer,
            "no-show".to_string(),
            "Fitter never arrived".to_string(),
            serde_json::Map::new(),
            utc(2026, 8, 28, 9),
        )
        .unwrap();

    // Following Tuesday: Fri + Mon = 2 working days, still blocked.
    assert!(matches!(
        w.case.resolve(
            &w.arbitrator,
            Decision::Refund,
            "undefended".to_string(),
            None,
            &w.policy,
            &mut w.score,
            utc(2026, 9, 1, 9),
        ),
        Err(ArbitrationError::NotYetResolvable { elapsed: 2, .. })
    ));

    // Wednesday: three working days elapsed.
    assert!(w
        .case
        .resolve(
            &w.arbitrator,
            Decision::Refund,
            "undefended".to_string(),
            None,
            &w.policy,
            &mut w.score,
            utc(2026, 9, 2, 9),
        )
        .is_ok());
}

// ---------------------------------------------------------------------------
// Test: authorization seams between the crates
// ---------------------------------------------------------------------------

#[test]
fn each_step_rejects_the_wrong_actor() {
    let mut w = active_world();
    let stranger = Actor::plain(UserId::new());

    assert!(matches!(
        w.case.open_dispute(
            &stranger,
            "r".to_string(),
            "d".to_string(),
            serde_json::Map::new(),
            monday(),
        ),
        Err(ArbitrationError::Unauthorized { .. })
    ));

    open_dispute(&mut w);
    assert!(matches!(
        w.case.submit_defense(
            &w.buyer,
            serde_json::Map::new(),
            "defending my own claim".to_string(),
            monday(),
        ),
        Err(ArbitrationError::Forbidden { .. })
    ));
    file_defense(&mut w);

    assert!(matches!(
        w.case.resolve(
            &w.seller,
            Decision::NoRefund,
            "self-acquittal".to_string(),
            None,
            &w.policy,
            &mut w.score,
            monday(),
        ),
        Err(ArbitrationError::Unauthorized { .. })
    ));

    // Admins carry the arbitrator capability implicitly.
    let admin = Actor::with_capabilities(UserId::new(), None, [Capability::Admin]);
    assert!(w
        .case
        .resolve(
            &admin,
            Decision::NoRefund,
            "claim unsubstantiated".to_string(),
            None,
            &w.policy,
            &mut w.score,
            monday(),
        )
        .is_ok());
}
