use chrono::Duration;

use airlytics_monitor::domain::repository::OtpRepository;
use airlytics_monitor::domain::types::{OtpFailure, VerifyOutcome};
use airlytics_monitor::error::{MailError, MonitorError};
use airlytics_monitor::infra::otp::MemoryOtpStore;
use airlytics_monitor::usecase::otp::{
    DeliveryPolicy, IssueOtpInput, IssueOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

use crate::helpers::{TEST_HASH_COST, TestClock, TestMailer, base_time, code_from, wrong_code};

const EMAIL: &str = "alice@example.com";
/// Codes issued without a login are not bound to an account.
const VERIFIED: VerifyOutcome = VerifyOutcome::Verified { user_id: None };

fn issuer(
    store: &MemoryOtpStore,
    mailer: TestMailer,
    clock: &TestClock,
    policy: DeliveryPolicy,
) -> IssueOtpUseCase<MemoryOtpStore, TestMailer, TestClock> {
    IssueOtpUseCase {
        store: store.clone(),
        mailer,
        clock: clock.clone(),
        policy,
        expose_codes: false,
        hash_cost: TEST_HASH_COST,
    }
}

fn verifier(store: &MemoryOtpStore, clock: &TestClock) -> VerifyOtpUseCase<MemoryOtpStore, TestClock> {
    VerifyOtpUseCase {
        store: store.clone(),
        clock: clock.clone(),
    }
}

/// Issue a code for `email` and return it as delivered by mail.
async fn issue_code(store: &MemoryOtpStore, clock: &TestClock, email: &str) -> String {
    let mailer = TestMailer::new();
    let sent = mailer.sent_handle();
    issuer(store, mailer, clock, DeliveryPolicy::Strict)
        .execute(IssueOtpInput {
            email: email.to_owned(),
            user_id: None,
        })
        .await
        .unwrap();
    let sent = sent.lock().unwrap();
    code_from(sent.last().unwrap())
}

async fn verify(
    store: &MemoryOtpStore,
    clock: &TestClock,
    email: &str,
    code: &str,
) -> VerifyOutcome {
    verifier(store, clock)
        .execute(VerifyOtpInput {
            email: email.to_owned(),
            code: code.to_owned(),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn should_deliver_code_by_mail_without_returning_it() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let mailer = TestMailer::new();
    let sent = mailer.sent_handle();

    let issued = issuer(&store, mailer, &clock, DeliveryPolicy::Strict)
        .execute(IssueOtpInput {
            email: "  Alice@Example.COM ".to_owned(),
            user_id: None,
        })
        .await
        .unwrap();

    assert_eq!(issued.code, None);
    assert!(!issued.fallback);
    assert_eq!(issued.expires_at, base_time() + Duration::minutes(5));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, EMAIL);
    assert_eq!(sent[0].subject, "Your Airlytics Login OTP");
    let code = code_from(&sent[0]);
    assert!(sent[0].html.contains(&code));
}

#[tokio::test]
async fn should_store_only_a_hash_of_the_code() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let code = issue_code(&store, &clock, EMAIL).await;

    let record = store.find_current(EMAIL).await.unwrap().unwrap();
    assert_ne!(record.code_hash, code);
    assert!(bcrypt::verify(&code, &record.code_hash).unwrap());
}

#[tokio::test]
async fn should_verify_code_exactly_once() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let code = issue_code(&store, &clock, EMAIL).await;

    assert_eq!(verify(&store, &clock, EMAIL, &code).await, VERIFIED);
    assert_eq!(
        verify(&store, &clock, EMAIL, &code).await,
        VerifyOutcome::Failed(OtpFailure::NotFound)
    );
}

#[tokio::test]
async fn should_match_email_case_insensitively_and_trim_code() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let code = issue_code(&store, &clock, EMAIL).await;

    let outcome = verify(&store, &clock, " ALICE@example.com", &format!(" {code}\n")).await;
    assert_eq!(outcome, VERIFIED);
}

#[tokio::test]
async fn should_supersede_previous_code_on_reissue() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let first = issue_code(&store, &clock, EMAIL).await;
    let mut second = issue_code(&store, &clock, EMAIL).await;
    while second == first {
        second = issue_code(&store, &clock, EMAIL).await;
    }

    assert_eq!(store.len(), 1);
    assert_eq!(
        verify(&store, &clock, EMAIL, &first).await,
        VerifyOutcome::Failed(OtpFailure::Mismatch)
    );
    assert_eq!(verify(&store, &clock, EMAIL, &second).await, VERIFIED);
}

#[tokio::test]
async fn should_lock_code_after_five_mismatches() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let code = issue_code(&store, &clock, EMAIL).await;
    let wrong = wrong_code(&code);

    for attempt in 1..=5 {
        let outcome = verify(&store, &clock, EMAIL, &wrong).await;
        assert_eq!(
            outcome,
            VerifyOutcome::Failed(OtpFailure::Mismatch),
            "attempt {attempt}"
        );
    }

    let outcome = verify(&store, &clock, EMAIL, &code).await;
    assert_eq!(outcome, VerifyOutcome::Failed(OtpFailure::AttemptsExceeded));
}

#[tokio::test]
async fn should_count_malformed_codes_as_mismatches() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    issue_code(&store, &clock, EMAIL).await;

    for code in ["12345", "abcdef", "", "1234567"] {
        assert_eq!(
            verify(&store, &clock, EMAIL, code).await,
            VerifyOutcome::Failed(OtpFailure::Mismatch),
            "code {code:?}"
        );
    }
    let record = store.find_current(EMAIL).await.unwrap().unwrap();
    assert_eq!(record.attempt_count, 4);
}

#[tokio::test]
async fn should_accept_code_at_expiry_instant() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let code = issue_code(&store, &clock, EMAIL).await;

    clock.advance(Duration::minutes(5));
    assert_eq!(verify(&store, &clock, EMAIL, &code).await, VERIFIED);
}

#[tokio::test]
async fn should_expire_code_after_five_minutes() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let code = issue_code(&store, &clock, EMAIL).await;

    clock.advance(Duration::minutes(5) + Duration::seconds(1));
    assert_eq!(
        verify(&store, &clock, EMAIL, &code).await,
        VerifyOutcome::Failed(OtpFailure::Expired)
    );
    // The expired record is gone after the first rejection.
    assert_eq!(
        verify(&store, &clock, EMAIL, &code).await,
        VerifyOutcome::Failed(OtpFailure::NotFound)
    );
}

#[tokio::test]
async fn should_report_not_found_for_unknown_or_invalid_email() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());

    assert_eq!(
        verify(&store, &clock, "nobody@example.com", "123456").await,
        VerifyOutcome::Failed(OtpFailure::NotFound)
    );
    assert_eq!(
        verify(&store, &clock, "not-an-email", "123456").await,
        VerifyOutcome::Failed(OtpFailure::NotFound)
    );
}

#[tokio::test]
async fn should_reject_invalid_email_on_issue() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let mailer = TestMailer::new();
    let sent = mailer.sent_handle();

    let result = issuer(&store, mailer, &clock, DeliveryPolicy::Strict)
        .execute(IssueOtpInput {
            email: "missing-at.example.com".to_owned(),
            user_id: None,
        })
        .await;

    assert!(
        matches!(result, Err(MonitorError::InvalidEmail)),
        "expected InvalidEmail, got {result:?}"
    );
    assert!(sent.lock().unwrap().is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn should_fail_strict_delivery_without_storing_a_code() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let previous = issue_code(&store, &clock, EMAIL).await;

    let result = issuer(
        &store,
        TestMailer::failing(MailError::MissingCredentials),
        &clock,
        DeliveryPolicy::Strict,
    )
    .execute(IssueOtpInput {
        email: EMAIL.to_owned(),
        user_id: None,
    })
    .await;

    assert!(
        matches!(
            result,
            Err(MonitorError::DeliveryFailed(MailError::MissingCredentials))
        ),
        "expected DeliveryFailed, got {result:?}"
    );
    assert!(store.is_empty());
    assert_eq!(
        verify(&store, &clock, EMAIL, &previous).await,
        VerifyOutcome::Failed(OtpFailure::NotFound)
    );
}

#[tokio::test]
async fn should_return_code_when_delivery_falls_back() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());

    let issued = issuer(
        &store,
        TestMailer::failing(MailError::Transport("connection refused".to_owned())),
        &clock,
        DeliveryPolicy::Fallback,
    )
    .execute(IssueOtpInput {
        email: EMAIL.to_owned(),
        user_id: None,
    })
    .await
    .unwrap();

    assert!(issued.fallback);
    let code = issued.code.expect("fallback returns the code");
    assert_eq!(verify(&store, &clock, EMAIL, &code).await, VERIFIED);
}

#[tokio::test]
async fn should_expose_code_when_configured() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let mailer = TestMailer::new();
    let sent = mailer.sent_handle();
    let usecase = IssueOtpUseCase {
        expose_codes: true,
        ..issuer(&store, mailer, &clock, DeliveryPolicy::Strict)
    };

    let issued = usecase
        .execute(IssueOtpInput {
            email: EMAIL.to_owned(),
            user_id: None,
        })
        .await
        .unwrap();

    assert!(!issued.fallback);
    let sent = sent.lock().unwrap();
    assert_eq!(issued.code, Some(code_from(&sent[0])));
}

#[tokio::test]
async fn should_keep_codes_for_different_emails_apart() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let alice = issue_code(&store, &clock, EMAIL).await;
    let bob = issue_code(&store, &clock, "bob@example.com").await;

    assert_eq!(store.len(), 2);
    assert_eq!(verify(&store, &clock, "bob@example.com", &bob).await, VERIFIED);
    assert_eq!(verify(&store, &clock, EMAIL, &alice).await, VERIFIED);
}
