//! Tests for account handlers.

use super::*;
use crate::domain::UserId;
use crate::inbound::http::test_utils::{InMemoryHarness, test_session_middleware};
use actix_http::Request;
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::rstest;
use serde_json::Value;

async fn signed_in_as(
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.as_str()).map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .route("/test/session/{id}", web::post().to(signed_in_as))
        .service(
            web::scope("/api/v1")
                .service(register)
                .service(login)
                .service(logout),
        )
}

fn ada_registration() -> RegisterRequest {
    RegisterRequest {
        display_name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        password: "correct horse".to_owned(),
    }
}

fn ada_login(password: &str) -> LoginRequest {
    LoginRequest {
        email: "Ada@Example.com".to_owned(),
        password: password.to_owned(),
    }
}

async fn call<S>(app: &S, request: Request) -> ServiceResponse
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    actix_test::call_service(app, request).await
}

fn location(res: &ServiceResponse) -> Option<&str> {
    res.headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn session_cookie(res: &ServiceResponse) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

async fn register_ada<S>(app: &S)
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = call(
        app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(ada_registration())
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[actix_web::test]
async fn registration_returns_public_view_and_login_redirect() {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(ada_registration())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("redirect").and_then(Value::as_str), Some(LOGIN_PATH));
    let user = body.get("user").expect("user view");
    assert_eq!(user.get("displayName").and_then(Value::as_str), Some("Ada"));
    assert!(user.get("email").is_none());
    assert!(user.get("passwordHash").is_none());
}

#[actix_web::test]
async fn duplicate_email_registration_conflicts() {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    register_ada(&app).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(RegisterRequest {
                display_name: "Ada Again".to_owned(),
                ..ada_registration()
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("duplicate_email")
    );
}

#[rstest]
#[case(RegisterRequest { display_name: "  ".to_owned(), ..ada_registration() }, "displayName", "empty_display_name")]
#[case(RegisterRequest { display_name: "Ada!".to_owned(), ..ada_registration() }, "displayName", "invalid_display_name")]
#[case(RegisterRequest { email: "ada".to_owned(), ..ada_registration() }, "email", "invalid_email")]
#[case(RegisterRequest { password: "short".to_owned(), ..ada_registration() }, "password", "password_too_short")]
#[actix_web::test]
async fn invalid_registration_is_rejected(
    #[case] request: RegisterRequest,
    #[case] field: &str,
    #[case] code: &str,
) {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .set_json(request)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    assert_eq!(body.pointer("/details/code").and_then(Value::as_str), Some(code));
}

#[actix_web::test]
async fn login_sets_session_and_blocks_repeat_login() {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    register_ada(&app).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(ada_login("correct horse"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("session cookie");

    let again = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .cookie(cookie.clone())
            .set_json(ada_login("correct horse"))
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&again), Some(CATALOGUE_PATH));

    let register_again = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .cookie(cookie)
            .set_json(ada_registration())
            .to_request(),
    )
    .await;
    assert_eq!(register_again.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&register_again), Some(CATALOGUE_PATH));
}

#[rstest]
#[case("wrong horse")]
#[case("correct horse ")]
#[actix_web::test]
async fn wrong_password_redirects_to_login(#[case] password: &str) {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    register_ada(&app).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(ada_login(password))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some(LOGIN_PATH));
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.get("code").and_then(Value::as_str), Some("unauthorized"));
}

#[actix_web::test]
async fn unknown_email_matches_wrong_password_response() {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(ada_login("correct horse"))
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some(LOGIN_PATH));
}

#[rstest]
#[case("", "correct horse", "email", "empty_email")]
#[case("ada@example.com", "", "password", "empty_password")]
#[actix_web::test]
async fn invalid_login_is_rejected(
    #[case] email: &str,
    #[case] password: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(LoginRequest {
                email: email.to_owned(),
                password: password.to_owned(),
            })
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body.pointer("/details/field").and_then(Value::as_str), Some(field));
    assert_eq!(body.pointer("/details/code").and_then(Value::as_str), Some(code));
}

#[actix_web::test]
async fn logout_clears_session_and_redirects() {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    register_ada(&app).await;
    let signed_in = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(ada_login("correct horse"))
            .to_request(),
    )
    .await;
    let cookie = session_cookie(&signed_in).expect("session cookie");

    let res = call(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), Some(LOGIN_PATH));
    let removal = session_cookie(&res).expect("removal cookie");
    assert_eq!(removal.value(), "");
}

async fn session_for_removed_account<S>(app: &S) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = call(
        app,
        actix_test::TestRequest::post()
            .uri(&format!("/test/session/{}", UserId::random()))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    session_cookie(&res).expect("session cookie")
}

#[actix_web::test]
async fn login_with_a_session_for_a_removed_account_signs_in() {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let stale = session_for_removed_account(&app).await;
    register_ada(&app).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .cookie(stale)
            .set_json(ada_login("correct horse"))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = session_cookie(&res).expect("fresh session cookie");

    let again = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/login")
            .cookie(cookie)
            .set_json(ada_login("correct horse"))
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&again), Some(CATALOGUE_PATH));
}

#[actix_web::test]
async fn register_with_a_session_for_a_removed_account_creates_the_account() {
    let harness = InMemoryHarness::new();
    let app = actix_test::init_service(test_app(harness.state.clone())).await;
    let stale = session_for_removed_account(&app).await;

    let res = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/register")
            .cookie(stale)
            .set_json(ada_registration())
            .to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::CREATED);
}
