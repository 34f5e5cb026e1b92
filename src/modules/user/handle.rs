use actix_web::{
    cookie::{time, Cookie},
    get, post, web, HttpRequest,
};

use crate::{
    api::{
        error,
        pagination::{PageQuery, Paginated},
        success,
    },
    constants::REFRESH_TOKEN_COOKIE,
    middlewares::get_claims,
    modules::user::{
        model::{self, SignInResponse},
        service::{TokenPair, UserService},
    },
    utils::{ValidatedJson, ValidatedQuery},
};

fn refresh_cookie(token: String, max_age: u64) -> Cookie<'static> {
    Cookie::build(REFRESH_TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(max_age as i64))
        .finish()
}

fn token_response(
    user_service: &UserService,
    tokens: TokenPair,
) -> success::Success<SignInResponse> {
    let config = user_service.token_config();
    let response = SignInResponse {
        access_token: tokens.access_token,
        token_type: "Bearer",
        expires_in: config.access_ttl,
    };
    success::Success::ok(Some(response))
        .cookie(refresh_cookie(tokens.refresh_token, config.refresh_ttl))
}

#[post("/signup/")]
pub async fn sign_up(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignUpModel>,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let user = user_service.sign_up(user_data.0).await?;
    Ok(success::Success::created(Some(user)).message("User created successfully"))
}

#[post("/login/")]
pub async fn sign_in(
    user_service: web::Data<UserService>,
    user_data: ValidatedJson<model::SignInModel>,
) -> Result<success::Success<SignInResponse>, error::Error> {
    let tokens = user_service.sign_in(user_data.0).await?;
    Ok(token_response(&user_service, tokens).message("Login successful"))
}

#[post("/token/refresh/")]
pub async fn refresh(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<SignInResponse>, error::Error> {
    let refresh_token = req.cookie(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string());
    let tokens = user_service.refresh(refresh_token).await?;
    Ok(token_response(&user_service, tokens).message("Token refreshed"))
}

#[post("/logout/")]
pub async fn sign_out(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<()>, error::Error> {
    let refresh_token = req.cookie(REFRESH_TOKEN_COOKIE).map(|c| c.value().to_string());
    user_service.sign_out(refresh_token).await?;

    let cleared = Cookie::build(REFRESH_TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .max_age(time::Duration::seconds(0))
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .finish();

    Ok(success::Success::no_content().cookie(cleared))
}

#[get("/me/")]
pub async fn get_profile(
    user_service: web::Data<UserService>,
    req: HttpRequest,
) -> Result<success::Success<model::UserResponse>, error::Error> {
    let id = get_claims(&req)?.sub;
    let user = user_service.get_by_id(id).await?;
    Ok(success::Success::ok(Some(user)).message("Profile retrieved successfully"))
}

#[get("/search/")]
pub async fn search_users(
    user_service: web::Data<UserService>,
    query: ValidatedQuery<model::SearchQuery>,
    page: ValidatedQuery<PageQuery>,
) -> Result<success::Success<Paginated<model::UserResponse>>, error::Error> {
    let keyword = query.0.keyword.unwrap_or_default();
    let users = user_service.search(&keyword, &page.0).await?;
    Ok(success::Success::ok(Some(users)).message("Users retrieved successfully"))
}
