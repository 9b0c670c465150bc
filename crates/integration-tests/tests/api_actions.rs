use api_adapters::Flash;
use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, Response, StatusCode};
use chrono::Utc;
use domains::ProductRepository;
use integration_tests::{Harness, PASSWORD};
use tower::ServiceExt;

async fn post(app: axum::Router, uri: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        req = req.header(COOKIE, cookie);
    }
    app.oneshot(req.body(Body::from(form.to_string())).unwrap())
        .await
        .unwrap()
}

fn cookie_value(res: &Response<Body>, name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    res.headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix(&prefix))
        .and_then(|rest| rest.split(';').next())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn flash(res: &Response<Body>) -> Flash {
    let raw = cookie_value(res, "saaslist_flash").expect("flash cookie");
    Flash::decode(&raw).expect("decodable flash")
}

async fn sign_in(h: &Harness, app: axum::Router, email: &str) -> String {
    let res = post(
        app,
        "/login",
        &format!("email={email}&password={PASSWORD}&next=%2Fproducts%2Fnew"),
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/products/new");
    let token = cookie_value(&res, "saaslist_session").expect("session cookie");
    assert!(h.sessions.resolve(&token, Utc::now()).await.unwrap().is_some());
    format!("saaslist_session={token}")
}

#[tokio::test]
async fn wrong_password_re_renders_login() {
    let h = Harness::new();
    h.user("Ada Lovelace").await;
    let res = post(h.app(), "/login", "email=ada%40example.com&password=nope", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Invalid email or password"));
}

#[tokio::test]
async fn signup_signs_the_new_account_in() {
    let h = Harness::new();
    let res = post(
        h.app(),
        "/signup",
        "name=Grace+Hopper&email=grace%40example.com&password=compilers1&next=%2Fproducts%2Fnew",
        None,
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/products/new");
    assert_eq!(flash(&res), Flash::success("Welcome, Grace Hopper"));
    let token = cookie_value(&res, "saaslist_session").expect("session cookie");
    let profile = h.sessions.resolve(&token, Utc::now()).await.unwrap().unwrap();
    assert_eq!(profile.email.as_deref(), Some("grace@example.com"));

    let res = post(h.app(), "/login", "email=grace%40example.com&password=compilers1", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn signup_rejects_taken_email_and_short_password() {
    let h = Harness::new();
    h.user("Ada Lovelace").await;

    let res = post(h.app(), "/signup", "email=ada%40example.com&password=longenough", None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert!(cookie_value(&res, "saaslist_session").is_none());
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("An account with this email already exists"));

    let res = post(h.app(), "/signup", "email=new%40example.com&password=short", None).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&body).contains("Password must be at least 8 characters"));
}

#[tokio::test]
async fn anonymous_upvote_redirects_with_error() {
    let h = Harness::new();
    let maker = h.user("Ada Lovelace").await;
    let product = h.product(maker.id, "Invoicely", Utc::now()).await;

    let uri = format!("/products/{}/upvote", product.id);
    let res = post(h.app(), &uri, "is_upvoted=false", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], format!("/products/{}", product.id).as_str());
    assert_eq!(flash(&res), Flash::error("You must be logged in to upvote products"));
}

#[tokio::test]
async fn signed_in_upvote_toggles() {
    let h = Harness::new();
    let maker = h.user("Ada Lovelace").await;
    let product = h.product(maker.id, "Invoicely", Utc::now()).await;
    let app = h.app();
    let session = sign_in(&h, app.clone(), "ada%40example.com").await;
    let uri = format!("/products/{}/upvote", product.id);

    let res = post(app.clone(), &uri, "is_upvoted=false", Some(&session)).await;
    assert_eq!(flash(&res), Flash::success("Upvoted!"));

    let res = post(app.clone(), &uri, "is_upvoted=false", Some(&session)).await;
    assert_eq!(flash(&res), Flash::error("You have already upvoted this product"));

    let res = post(app, &uri, "is_upvoted=true", Some(&session)).await;
    assert_eq!(flash(&res), Flash::success("Upvote removed"));

    let stored = h.store.find_by_id(product.id).await.unwrap().unwrap();
    assert_eq!(stored.upvotes_count, 0);
}

#[tokio::test]
async fn submit_product_then_comment() {
    let h = Harness::new();
    h.user("Ada Lovelace").await;
    let app = h.app();
    let session = sign_in(&h, app.clone(), "ada%40example.com").await;

    let form = "name=Invoicely&tagline=Invoices+for+freelancers\
        &website_url=https%3A%2F%2Finvoicely.app\
        &description=Send+invoices%2C+track+payments+and+chase+late+clients+from+one+place.\
        &tags=finance%2C+billing&pricing_model=freemium&platforms=web&platforms=ios";
    let res = post(app.clone(), "/products", form, Some(&session)).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let location = res.headers()[LOCATION].to_str().unwrap().to_string();
    let product_id: uuid::Uuid = location.trim_start_matches("/products/").parse().unwrap();

    let product = h.store.find_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.tags, vec!["finance", "billing"]);
    assert_eq!(product.platforms.len(), 2);

    let res = post(
        app,
        &format!("/products/{product_id}/comments"),
        "content=Congrats+on+shipping",
        Some(&session),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(flash(&res), Flash::success("Comment posted"));
    let product = h.store.find_by_id(product_id).await.unwrap().unwrap();
    assert_eq!(product.comments_count, 1);
}

#[tokio::test]
async fn invalid_submission_re_renders_form_with_errors() {
    let h = Harness::new();
    h.user("Ada Lovelace").await;
    let app = h.app();
    let session = sign_in(&h, app.clone(), "ada%40example.com").await;

    let res = post(app, "/products", "name=&tagline=x&website_url=nope", Some(&session)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8_lossy(&body);
    assert!(body.contains("Name is required"));
    assert!(body.contains("Add at least one tag"));
}

#[tokio::test]
async fn submission_error_with_periods_is_one_list_item() {
    let h = Harness::new();
    h.user("Ada Lovelace").await;
    let app = h.app();
    let session = sign_in(&h, app.clone(), "ada%40example.com").await;

    let form = "name=Invoicely&tagline=Invoices&website_url=https%3A%2F%2Finvoicely.app\
                &description=Send+invoices%2C+track+payments+and+chase+late+clients+from+one+inbox.\
                &tags=finance&pricing_model=v1.2.+beta";
    let res = post(app, "/products", form, Some(&session)).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8_lossy(&body);
    assert_eq!(body.matches("<li>").count(), 1);
    assert!(body.contains("v1.2. beta"));
}

#[tokio::test]
async fn logout_clears_the_session() {
    let h = Harness::new();
    let res = post(h.app(), "/logout", "", None).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[LOCATION], "/login");
    let cleared = res
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().unwrap().starts_with("saaslist_session=;"));
    assert!(cleared);
}
