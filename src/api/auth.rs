use crate::domain::user;
use crate::domain::user::driven_ports::{DetectUser, UserReader, UserWriter};
use crate::domain::user::driving_ports::{AuthenticateError, RegisterError, UserPort};
use crate::external_connections::ExternalConnectivity;
use crate::routing_utils::{GenericErrorResponse, flash_redirect, take_flash};
use crate::session::{SessionSigner, clear_session_cookie, session_cookie};
use crate::{AppState, SharedData, dto, persistence};
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Form, Json, Router};
use axum_extra::extract::CookieJar;
use std::sync::Arc;
use tracing::{error, info};
use validator::Validate;

/// Routes for registration and login, reachable without a session
pub fn auth_routes() -> Router<Arc<SharedData>> {
    Router::new()
        .route(
            "/register",
            get(|jar: CookieJar| async move { render_register_page(jar) }).post(
                |State(app_data): AppState,
                 jar: CookieJar,
                 Form(form): Form<dto::RegisterForm>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    register_user(
                        jar,
                        form,
                        &mut ext_cxn,
                        &user::UserService {},
                        &persistence::db_user_driven_ports::DbDetectUsers {},
                        &persistence::db_user_driven_ports::DbWriteUsers {},
                    )
                    .await
                },
            ),
        )
        .route(
            "/login",
            get(|jar: CookieJar| async move { render_login_page(jar) }).post(
                |State(app_data): AppState,
                 jar: CookieJar,
                 Form(form): Form<dto::LoginForm>| async move {
                    let mut ext_cxn = app_data.ext_cxn.clone();

                    login_user(
                        jar,
                        form,
                        &mut ext_cxn,
                        &app_data.sessions,
                        &user::UserService {},
                        &persistence::db_user_driven_ports::DbReadUsers {},
                    )
                    .await
                },
            ),
        )
}

/// Routes for ending a session. Logout sits behind the login gate like the
/// task pages do.
pub fn protected_auth_routes() -> Router<Arc<SharedData>> {
    Router::new().route("/logout", get(|jar: CookieJar| async move { logout(jar) }))
}

fn render_register_page(jar: CookieJar) -> (CookieJar, Json<dto::AuthView>) {
    let (jar, flash) = take_flash(jar);
    (jar, Json(dto::AuthView { flash }))
}

fn render_login_page(jar: CookieJar) -> (CookieJar, Json<dto::AuthView>) {
    let (jar, flash) = take_flash(jar);
    (jar, Json(dto::AuthView { flash }))
}

/// Creates an account from the registration form and sends the user on to the
/// login page
async fn register_user(
    jar: CookieJar,
    form: dto::RegisterForm,
    ext_cxn: &mut impl ExternalConnectivity,
    user_service: &impl UserPort,
    user_detect: &impl DetectUser,
    user_write: &impl UserWriter,
) -> Response {
    if form.validate().is_err() {
        return flash_redirect(jar, "Username and password are required!", "/register")
            .into_response();
    }

    info!("Processing {form}");
    let registration = user::RegisterUser {
        username: form.username,
        password: form.password,
    };
    let register_result = user_service
        .register(&registration, ext_cxn, user_detect, user_write)
        .await;

    match register_result {
        Ok(_) => flash_redirect(jar, "Registered successfully. Please log in.", "/login")
            .into_response(),
        Err(RegisterError::UsernameTaken) => {
            flash_redirect(jar, "Username already exists!", "/register").into_response()
        }
        Err(RegisterError::PortError(err)) => {
            error!("Could not register a user: {err}");
            GenericErrorResponse(err).into_response()
        }
    }
}

/// Verifies credentials and establishes a session cookie
async fn login_user(
    jar: CookieJar,
    form: dto::LoginForm,
    ext_cxn: &mut impl ExternalConnectivity,
    sessions: &SessionSigner,
    user_service: &impl UserPort,
    user_read: &impl UserReader,
) -> Response {
    let auth_result = user_service
        .authenticate(&form.username, &form.password, ext_cxn, user_read)
        .await;

    match auth_result {
        Ok(authenticated_user) => {
            let token = match sessions.issue(authenticated_user.id) {
                Ok(token) => token,
                Err(issue_err) => {
                    error!("Could not issue a session token: {issue_err}");
                    return GenericErrorResponse(issue_err).into_response();
                }
            };

            info!("User {} logged in", authenticated_user.id);
            (jar.add(session_cookie(token)), Redirect::to("/")).into_response()
        }
        Err(AuthenticateError::BadCredentials) => {
            flash_redirect(jar, "Invalid username or password.", "/login").into_response()
        }
        Err(AuthenticateError::PortError(err)) => {
            error!("Could not authenticate a user: {err}");
            GenericErrorResponse(err).into_response()
        }
    }
}

/// Drops the session cookie and returns to the login page
fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(clear_session_cookie()), Redirect::to("/login"))
}
