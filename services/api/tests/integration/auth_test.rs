use eventhub_api::auth::validate_token;
use eventhub_api::domain::types::UserRole;
use eventhub_api::error::ApiError;
use eventhub_api::usecase::auth::{
    LoginInput, LoginUseCase, SignupInput, SignupUseCase, verify_password,
};

use crate::helpers::{MockLedger, MockUserRepo, TEST_JWT_SECRET, test_event, test_user};

fn signup_input(email: &str, role: UserRole) -> SignupInput {
    SignupInput {
        name: "alice".into(),
        email: email.into(),
        password: "hunter2".into(),
        role,
    }
}

#[tokio::test]
async fn should_signup_then_login_with_same_credentials() {
    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();

    let signup = SignupUseCase {
        users: users.clone(),
        jwt_secret: TEST_JWT_SECRET.into(),
    };
    let created = signup
        .execute(signup_input("alice@example.com", UserRole::User))
        .await
        .unwrap();

    // The stored account carries a salted hash, never the clear password.
    {
        let stored = users_handle.lock().unwrap();
        let hash = stored[0].password_hash.as_deref().unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", hash));
    }

    let login = LoginUseCase {
        users,
        ledger: MockLedger::default(),
        jwt_secret: TEST_JWT_SECRET.into(),
    };
    let session = login
        .execute(LoginInput {
            email: "alice@example.com".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();

    assert_eq!(session.user.id, created.user.id);

    let claims = validate_token(&session.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(claims.sub, created.user.id.to_string());
    assert_eq!(claims.role, UserRole::User);
}

#[tokio::test]
async fn should_reject_second_signup_with_same_email() {
    let users = MockUserRepo::empty();
    let signup = SignupUseCase {
        users,
        jwt_secret: TEST_JWT_SECRET.into(),
    };

    signup
        .execute(signup_input("alice@example.com", UserRole::User))
        .await
        .unwrap();
    let result = signup
        .execute(signup_input("alice@example.com", UserRole::Organizer))
        .await;

    assert!(matches!(result, Err(ApiError::EmailTaken)));
}

#[tokio::test]
async fn should_list_held_seats_in_login_output() {
    let alice = {
        let mut user = test_user(1, UserRole::User);
        user.password_hash = Some(eventhub_api::usecase::auth::hash_password("hunter2"));
        user
    };
    let event = test_event(1, test_user(2, UserRole::Organizer).id, chrono::Utc::now(), 10);

    let ledger = MockLedger::default();
    ledger.add_event(&event);
    ledger.seed_registration(&alice, event.id);

    let login = LoginUseCase {
        users: MockUserRepo::new(vec![alice]),
        ledger,
        jwt_secret: TEST_JWT_SECRET.into(),
    };
    let session = login
        .execute(LoginInput {
            email: "user1@example.com".into(),
            password: "hunter2".into(),
        })
        .await
        .unwrap();

    assert_eq!(session.registered_events, vec![event.id]);
}
