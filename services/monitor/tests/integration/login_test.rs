use airlytics_domain::user::UserRole;
use airlytics_monitor::domain::types::VerifyOutcome;
use airlytics_monitor::error::MonitorError;
use airlytics_monitor::infra::otp::MemoryOtpStore;
use airlytics_monitor::usecase::login::{LoginInput, LoginUseCase};
use airlytics_monitor::usecase::otp::{
    DeliveryPolicy, IssueOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};

use crate::helpers::{
    MockUserRepo, TEST_HASH_COST, TEST_PASSWORD, TestClock, TestMailer, base_time, code_from,
    test_user,
};

const EMAIL: &str = "asha@gmail.com";

fn login(
    users: MockUserRepo,
    store: &MemoryOtpStore,
    mailer: TestMailer,
    clock: &TestClock,
) -> LoginUseCase<MockUserRepo, MemoryOtpStore, TestMailer, TestClock> {
    LoginUseCase {
        users,
        issue: IssueOtpUseCase {
            store: store.clone(),
            mailer,
            clock: clock.clone(),
            policy: DeliveryPolicy::Strict,
            expose_codes: false,
            hash_cost: TEST_HASH_COST,
        },
    }
}

#[tokio::test]
async fn should_mail_code_bound_to_account_after_password_check() {
    let user = test_user(EMAIL, UserRole::Member);
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let mailer = TestMailer::new();
    let sent = mailer.sent_handle();

    let issued = login(MockUserRepo::new(vec![user.clone()]), &store, mailer, &clock)
        .execute(LoginInput {
            email: " Asha@Gmail.com ".to_owned(),
            password: TEST_PASSWORD.to_owned(),
        })
        .await
        .unwrap();

    assert!(!issued.fallback);
    assert_eq!(issued.code, None);
    let code = code_from(&sent.lock().unwrap()[0]);
    let outcome = VerifyOtpUseCase {
        store: store.clone(),
        clock: clock.clone(),
    }
    .execute(VerifyOtpInput {
        email: EMAIL.to_owned(),
        code,
    })
    .await
    .unwrap();
    assert_eq!(
        outcome,
        VerifyOutcome::Verified {
            user_id: Some(user.id)
        }
    );
}

#[tokio::test]
async fn should_reject_wrong_password_without_hint_or_code() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());
    let mailer = TestMailer::new();
    let sent = mailer.sent_handle();

    let result = login(
        MockUserRepo::new(vec![test_user(EMAIL, UserRole::Member)]),
        &store,
        mailer,
        &clock,
    )
    .execute(LoginInput {
        email: EMAIL.to_owned(),
        password: "blue-kite42".to_owned(),
    })
    .await;

    assert!(
        matches!(
            result,
            Err(MonitorError::InvalidCredentials {
                email_suggestion: None
            })
        ),
        "expected InvalidCredentials without a hint, got {result:?}"
    );
    assert!(sent.lock().unwrap().is_empty());
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn should_suggest_domain_for_unknown_address() {
    let store = MemoryOtpStore::new();
    let clock = TestClock::at(base_time());

    let result = login(
        MockUserRepo::new(vec![test_user(EMAIL, UserRole::Member)]),
        &store,
        TestMailer::new(),
        &clock,
    )
    .execute(LoginInput {
        email: "asha@gamil.com".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await;

    match result {
        Err(MonitorError::InvalidCredentials { email_suggestion }) => {
            assert_eq!(email_suggestion.as_deref(), Some("asha@gmail.com"));
        }
        other => panic!("expected InvalidCredentials, got {other:?}"),
    }
    assert_eq!(store.len(), 0);
}

#[tokio::test]
async fn should_not_suggest_for_unknown_address_on_unrelated_domain() {
    let result = login(
        MockUserRepo::empty(),
        &MemoryOtpStore::new(),
        TestMailer::new(),
        &TestClock::at(base_time()),
    )
    .execute(LoginInput {
        email: "asha@example.com".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await;

    assert!(
        matches!(
            result,
            Err(MonitorError::InvalidCredentials {
                email_suggestion: None
            })
        ),
        "expected InvalidCredentials without a hint, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_malformed_email() {
    let result = login(
        MockUserRepo::empty(),
        &MemoryOtpStore::new(),
        TestMailer::new(),
        &TestClock::at(base_time()),
    )
    .execute(LoginInput {
        email: "missing-at.example.com".to_owned(),
        password: TEST_PASSWORD.to_owned(),
    })
    .await;

    assert!(
        matches!(result, Err(MonitorError::InvalidEmail)),
        "expected InvalidEmail, got {result:?}"
    );
}
