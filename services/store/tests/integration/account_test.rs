use cakeorder_auth_types::token::validate_session_token;
use cakeorder_domain::user::UserRole;
use cakeorder_store::auth::password::verify_password;
use cakeorder_store::auth::verify_token::issue_verify_token;
use cakeorder_store::error::StoreError;
use cakeorder_store::usecase::account::{
    GetUserUseCase, SigninInput, SigninUseCase, SignupInput, SignupUseCase, VerifyEmailUseCase,
};

use crate::helpers::{
    MockUserRepo, TEST_DOMAIN_URL, TEST_JWT_SECRET, TEST_PASSWORD, TEST_VERIFY_SECRET, test_user,
};

fn signup_usecase(users: MockUserRepo) -> SignupUseCase<MockUserRepo> {
    SignupUseCase {
        users,
        verify_secret: TEST_VERIFY_SECRET.to_owned(),
        domain_url: TEST_DOMAIN_URL.to_owned(),
    }
}

fn signup_input(name: &str, email: &str, password: &str) -> SignupInput {
    SignupInput {
        name: Some(name.to_owned()),
        email: Some(email.to_owned()),
        password: Some(password.to_owned()),
    }
}

// ── SignupUseCase ────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_user_with_hashed_password_and_verification_email() {
    let repo = MockUserRepo::empty();
    let users = repo.users_handle();
    let events = repo.events_handle();

    let user = signup_usecase(repo)
        .execute(signup_input("Baker", "  Baker@Example.com ", "sponge"))
        .await
        .unwrap();

    assert_eq!(user.email, "baker@example.com");
    assert_eq!(user.role, UserRole::User);
    assert!(!user.email_verified);
    assert!(verify_password("sponge", &user.password_hash).unwrap());
    assert_eq!(users.lock().unwrap().len(), 1);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, "verification_email");
    assert_eq!(events[0].payload["email"], "baker@example.com");
    let token = user.verify_token.unwrap();
    assert_eq!(
        events[0].payload["link"],
        format!("{TEST_DOMAIN_URL}/account/verify-email?token={token}")
    );
}

#[tokio::test]
async fn should_reject_duplicate_email_without_writing_event() {
    let repo = MockUserRepo::new(vec![test_user()]);
    let events = repo.events_handle();

    let result = signup_usecase(repo)
        .execute(signup_input("Other", "BAKER@example.com", "sponge"))
        .await;

    assert!(
        matches!(result, Err(StoreError::UserAlreadyExists)),
        "expected UserAlreadyExists, got {result:?}"
    );
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_require_all_signup_fields() {
    let result = signup_usecase(MockUserRepo::empty())
        .execute(SignupInput {
            name: Some("Baker".to_owned()),
            email: Some("   ".to_owned()),
            password: Some("sponge".to_owned()),
        })
        .await;
    assert!(matches!(result, Err(StoreError::MissingFields)));
}

#[tokio::test]
async fn should_reject_short_signup_password() {
    let result = signup_usecase(MockUserRepo::empty())
        .execute(signup_input("Baker", "baker@example.com", "abc"))
        .await;
    assert!(matches!(result, Err(StoreError::PasswordTooShort)));
}

// ── SigninUseCase ────────────────────────────────────────────────────────────

fn signin_usecase(users: MockUserRepo) -> SigninUseCase<MockUserRepo> {
    SigninUseCase {
        users,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

#[tokio::test]
async fn should_sign_in_and_issue_session_token() {
    let user = test_user();
    let repo = MockUserRepo::new(vec![user.clone()]);
    let users = repo.users_handle();

    let out = signin_usecase(repo)
        .execute(SigninInput {
            email: Some("Baker@Example.com".to_owned()),
            password: Some(TEST_PASSWORD.to_owned()),
        })
        .await
        .unwrap();

    assert_eq!(out.user.id, user.id);
    assert_eq!(out.user.login_count, 1);
    assert_eq!(users.lock().unwrap()[0].login_count, 1);

    let info = validate_session_token(&out.token, TEST_JWT_SECRET).unwrap();
    assert_eq!(info.user_id, user.id);
    assert_eq!(info.user_role, UserRole::User.as_u8());
    assert_eq!(info.exp, out.token_exp);
}

#[tokio::test]
async fn should_give_same_error_for_unknown_email_and_wrong_password() {
    let unknown = signin_usecase(MockUserRepo::new(vec![test_user()]))
        .execute(SigninInput {
            email: Some("nobody@example.com".to_owned()),
            password: Some(TEST_PASSWORD.to_owned()),
        })
        .await;
    let wrong = signin_usecase(MockUserRepo::new(vec![test_user()]))
        .execute(SigninInput {
            email: Some("baker@example.com".to_owned()),
            password: Some("carrot-cake".to_owned()),
        })
        .await;

    assert!(matches!(unknown, Err(StoreError::InvalidCredentials)));
    assert!(matches!(wrong, Err(StoreError::InvalidCredentials)));
}

#[tokio::test]
async fn should_require_email_and_password_to_sign_in() {
    let result = signin_usecase(MockUserRepo::empty())
        .execute(SigninInput {
            email: Some("baker@example.com".to_owned()),
            password: None,
        })
        .await;
    assert!(matches!(result, Err(StoreError::MissingFields)));
}

// ── VerifyEmailUseCase ───────────────────────────────────────────────────────

#[tokio::test]
async fn should_verify_email_and_clear_token() {
    let token = issue_verify_token(TEST_VERIFY_SECRET).unwrap();
    let mut user = test_user();
    user.verify_token = Some(token.clone());
    let repo = MockUserRepo::new(vec![user]);
    let users = repo.users_handle();

    VerifyEmailUseCase {
        users: repo,
        verify_secret: TEST_VERIFY_SECRET.to_owned(),
    }
    .execute(Some(token))
    .await
    .unwrap();

    let users = users.lock().unwrap();
    assert!(users[0].email_verified);
    assert!(users[0].verify_token.is_none());
}

#[tokio::test]
async fn should_reject_verify_token_not_stored_for_any_user() {
    let token = issue_verify_token(TEST_VERIFY_SECRET).unwrap();
    let result = VerifyEmailUseCase {
        users: MockUserRepo::new(vec![test_user()]),
        verify_secret: TEST_VERIFY_SECRET.to_owned(),
    }
    .execute(Some(token))
    .await;
    assert!(matches!(result, Err(StoreError::InvalidVerifyToken)));
}

#[tokio::test]
async fn should_reject_verify_token_signed_with_session_secret() {
    let token = issue_verify_token(TEST_JWT_SECRET).unwrap();
    let mut user = test_user();
    user.verify_token = Some(token.clone());

    let result = VerifyEmailUseCase {
        users: MockUserRepo::new(vec![user]),
        verify_secret: TEST_VERIFY_SECRET.to_owned(),
    }
    .execute(Some(token))
    .await;
    assert!(matches!(result, Err(StoreError::InvalidVerifyToken)));
}

// ── GetUserUseCase ───────────────────────────────────────────────────────────

#[tokio::test]
async fn should_return_not_found_for_deleted_session_user() {
    let result = GetUserUseCase {
        users: MockUserRepo::empty(),
    }
    .execute(test_user().id)
    .await;
    assert!(matches!(result, Err(StoreError::UserNotFound)));
}
