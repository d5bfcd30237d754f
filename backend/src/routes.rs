use crate::auth;
use crate::error::AppError;
use crate::models::{
    CourseForm, CoursesResponse, HoleDataForm, LoginForm, MessageResponse, SignupForm,
    TeeInfoForm, UserResponse,
};
use crate::pages;
use crate::session::{
    self, current_user, redirect_with_flash, require_api_user, require_page_user, take_flash,
    CurrentUser,
};
use crate::state::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Form, Json, Path, State,
    },
    http::{header, Method, StatusCode},
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Extension, Router,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::Session;
use tracing::{error, info, warn};

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    let public_pages = Router::new()
        .route("/", get(about))
        .route("/signup", get(signup_page).post(signup))
        .route("/login", get(login_page).post(login))
        .route("/health", get(health_check));

    let protected_pages = Router::new()
        .route("/home", get(home))
        .route("/logout", get(logout))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_page_user,
        ));

    let protected_api = Router::new()
        .route("/api/me", get(me))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_user,
        ));

    let course_routes = Router::new()
        .route("/get_courses", get(get_courses))
        .route("/add_courses", post(add_course))
        .route("/tee_info", post(add_tee_info))
        .route("/hole_info", post(add_hole_data))
        .route("/courses/:id", put(update_course).delete(delete_course));

    Router::new()
        .merge(public_pages)
        .merge(protected_pages)
        .merge(protected_api)
        .merge(course_routes)
        .nest_service("/static", ServeDir::new(&state.config.static_dir))
        .layer(session::layer(&state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

// Pages

/// Renders a page with the pending flash message and consumes it.
async fn page(session: &Session, render: impl FnOnce(Option<&str>) -> Html<String>) -> Response {
    match take_flash(session).await {
        Ok(flash) => render(flash.as_deref()).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn about(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    if current_user(&state, &session).await?.is_some() {
        return Ok(Redirect::to("/home").into_response());
    }
    Ok(page(&session, pages::about).await)
}

async fn home(session: Session, Extension(CurrentUser(user)): Extension<CurrentUser>) -> Response {
    page(&session, |flash| pages::home(&user, flash)).await
}

async fn signup_page(session: Session) -> Response {
    page(&session, pages::signup).await
}

async fn login_page(session: Session) -> Response {
    page(&session, pages::login).await
}

async fn signup(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let result = match form.validate() {
        Ok(user) => auth::signup(&state.database, &user, state.config.bcrypt_cost).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(_) => {
            redirect_with_flash(&session, "/login", "Signup successful! You can now log in.").await
        }
        Err(AppError::Validation(message)) | Err(AppError::Conflict(message)) => {
            redirect_with_flash(&session, "/signup", &message).await
        }
        Err(e) => e.into_response(),
    }
}

async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    match auth::login(&state.database, &session, &form.username, &form.password).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(AppError::Unauthorized) => {
            redirect_with_flash(&session, "/login", "Invalid username or password").await
        }
        Err(e) => e.into_response(),
    }
}

async fn logout(session: Session) -> Response {
    if let Err(e) = auth::logout(&session).await {
        error!("Failed to end session on logout: {}", e);
        return e.into_response();
    }

    redirect_with_flash(&session, "/login", "You have been logged out.").await
}

async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<UserResponse> {
    Json(UserResponse::from(&user))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "golf-course-backend",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

// Courses, tees and holes

/// Decodes a JSON request body. Anything but a JSON object is a validation
/// error, so arrays never fill form fields by position.
fn json_body<T: DeserializeOwned>(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<T, AppError> {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => {
            warn!("Rejected request body: {}", rejection.body_text());
            return Err(AppError::Validation(rejection.body_text()));
        }
    };

    if !body.is_object() {
        warn!("Rejected request body that is not a JSON object");
        return Err(AppError::validation("Request body must be a JSON object"));
    }

    serde_json::from_value(body).map_err(|e| {
        warn!("Rejected request body: {}", e);
        AppError::Validation(e.to_string())
    })
}

fn course_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, AppError> {
    id.map(|Path(id)| id)
        .map_err(|_| AppError::NotFound("Course not found".to_string()))
}

async fn get_courses(State(state): State<AppState>) -> Result<Json<CoursesResponse>, AppError> {
    let courses = state.database.list_courses().await?;
    Ok(Json(CoursesResponse { courses }))
}

async fn add_course(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let course = json_body::<CourseForm>(payload)?.validate()?;
    let id = state.database.create_course(&course).await?;
    info!("Added course {} ({})", id, course.name);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Course added successfully")),
    ))
}

async fn add_tee_info(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let tee = json_body::<TeeInfoForm>(payload)?.validate()?;
    if !state.database.course_exists(tee.course_id).await? {
        return Err(AppError::validation("Invalid course ID"));
    }

    let id = state.database.create_tee_info(&tee).await?;
    info!("Added {} tee {} for course {}", tee.tee_color, id, tee.course_id);

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Tee info added successfully")),
    ))
}

async fn add_hole_data(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let hole = json_body::<HoleDataForm>(payload)?.validate()?;
    if !state.database.course_exists(hole.course_id).await? {
        return Err(AppError::validation("Invalid course ID"));
    }

    let id = state.database.create_hole_data(&hole).await?;
    info!(
        "Added hole {} ({}) for course {}",
        hole.hole_number, id, hole.course_id
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Hole data added successfully")),
    ))
}

async fn update_course(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = course_id(id)?;
    let course = json_body::<CourseForm>(payload)?.validate()?;

    if !state.database.update_course(id, &course).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    info!("Updated course {}", id);
    Ok(Json(MessageResponse::new("Course updated successfully")))
}

async fn delete_course(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = course_id(id)?;

    if !state.database.delete_course(id).await? {
        return Err(AppError::NotFound("Course not found".to_string()));
    }

    info!("Deleted course {}", id);
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}
