use axum::{
    Form, Router,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use minijinja::context;
use tokio::time::sleep;
use validator::Validate;

use super::user::{AuthSession, Credentials, LoginCredentials, SignUpCredentials};
use crate::util::validation::field_errors;
use crate::error::AppError;
use crate::router::{AppState, render};

fn no_errors() -> std::collections::BTreeMap<String, String> {
    std::collections::BTreeMap::new()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(self::get::login).post(self::post::login))
        .route("/signup", get(self::get::signup).post(self::post::signup))
        .route("/logout", get(self::get::logout))
}

mod get {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        auth_session: AuthSession,
    ) -> Result<Response, AppError> {
        if let Some(user) = auth_session.user {
            return Ok(Redirect::to(user.role.home_path()).into_response());
        }
        let html = render(
            &state,
            "login.html",
            context! { errors => no_errors(), email => "" },
        )?;
        Ok(html.into_response())
    }

    pub async fn signup(
        State(state): State<AppState>,
        auth_session: AuthSession,
    ) -> Result<Response, AppError> {
        if let Some(user) = auth_session.user {
            return Ok(Redirect::to(user.role.home_path()).into_response());
        }
        let html = render(&state, "signup.html", context! { errors => no_errors() })?;
        Ok(html.into_response())
    }

    pub async fn logout(
        State(state): State<AppState>,
        mut auth_session: AuthSession,
    ) -> Result<Response, AppError> {
        auth_session
            .logout()
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;
        // Logout also clears the persisted record, so a fresh process start
        // comes up logged out.
        state.storage.clear()?;
        Ok(Redirect::to("/login").into_response())
    }
}

mod post {
    use super::*;

    pub async fn login(
        State(state): State<AppState>,
        mut auth_session: AuthSession,
        Form(creds): Form<LoginCredentials>,
    ) -> Result<Response, AppError> {
        if let Err(errors) = creds.validate() {
            let html = render(
                &state,
                "login.html",
                context! {
                    errors => field_errors(&errors),
                    email => creds.email,
                },
            )?;
            return Ok(html.into_response());
        }

        // Stand-in for the network round trip a real login would make.
        sleep(state.config.simulated_latency).await;

        let user = match auth_session.authenticate(Credentials::Login(creds)).await {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AppError::Auth("login rejected".to_string())),
            Err(e) => return Err(AppError::Auth(e.to_string())),
        };
        auth_session
            .login(&user)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(Redirect::to(user.role.home_path()).into_response())
    }

    pub async fn signup(
        State(state): State<AppState>,
        mut auth_session: AuthSession,
        Form(creds): Form<SignUpCredentials>,
    ) -> Result<Response, AppError> {
        if let Err(errors) = creds.validate() {
            let html = render(
                &state,
                "signup.html",
                context! {
                    errors => field_errors(&errors),
                    name => creds.name,
                    email => creds.email,
                    srm_email => creds.srm_email,
                    personal_email => creds.personal_email,
                    phone => creds.phone,
                    department => creds.department,
                    section => creds.section,
                    role => creds.role,
                },
            )?;
            return Ok(html.into_response());
        }

        sleep(state.config.simulated_latency).await;

        let user = match auth_session
            .authenticate(Credentials::SignUp(creds))
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AppError::Auth("signup rejected".to_string())),
            Err(e) => return Err(AppError::Auth(e.to_string())),
        };
        auth_session
            .login(&user)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        Ok(Redirect::to(user.role.home_path()).into_response())
    }
}
