use crate::database::{Database, UserInsert};
use crate::error::AppError;
use crate::models::{NewUser, User};
use bcrypt::{hash, verify};
use tower_sessions::Session;
use tracing::{debug, info, warn};

/// Session key holding the id of the logged-in user.
pub const USER_ID_KEY: &str = "user_id";

/// Creates a user. Fails with `Conflict` when the username or email is taken.
pub async fn signup(db: &Database, user: &NewUser, bcrypt_cost: u32) -> Result<i64, AppError> {
    if db
        .find_user_by_username_or_email(&user.username, &user.email)
        .await?
        .is_some()
    {
        info!("Signup rejected, username or email taken: {}", user.username);
        return Err(AppError::Conflict(
            "Username or email already exists".to_string(),
        ));
    }

    let password_hash = hash(&user.password, bcrypt_cost)?;

    match db.create_user(user, &password_hash).await? {
        UserInsert::Created(id) => {
            info!("Created user {} with id {}", user.username, id);
            Ok(id)
        }
        // Lost a race with a concurrent signup for the same name or email
        UserInsert::Duplicate => Err(AppError::Conflict(
            "Username or email already exists".to_string(),
        )),
    }
}

/// Looks up `username` and checks `password` against its bcrypt hash.
pub async fn verify_credentials(
    db: &Database,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = match db.get_user_by_username(username).await? {
        Some(user) => user,
        None => {
            info!("Login failed, unknown username: {}", username);
            return Err(AppError::Unauthorized);
        }
    };

    if !verify(password, &user.password_hash)? {
        info!("Login failed, wrong password for: {}", username);
        return Err(AppError::Unauthorized);
    }

    Ok(user)
}

/// Checks credentials and binds the user to `session` under a fresh id.
pub async fn login(
    db: &Database,
    session: &Session,
    username: &str,
    password: &str,
) -> Result<User, AppError> {
    let user = verify_credentials(db, username, password).await?;

    session.cycle_id().await?;
    session.insert(USER_ID_KEY, user.id).await?;

    info!("User {} logged in", user.username);
    Ok(user)
}

/// Ends the login. The session id is replaced so a copied cookie stops
/// working, while the session itself can still carry a flash message.
pub async fn logout(session: &Session) -> Result<(), AppError> {
    let user_id: Option<i64> = session.remove(USER_ID_KEY).await?;
    session.cycle_id().await?;
    debug!("Logout, session belonged to user {:?}", user_id);
    Ok(())
}

/// The user bound to `session`, or `None` for anonymous, expired or unknown
/// sessions. A session whose user was deleted is flushed.
pub async fn resolve_session(db: &Database, session: &Session) -> Result<Option<User>, AppError> {
    let Some(user_id) = session.get::<i64>(USER_ID_KEY).await? else {
        return Ok(None);
    };

    match db.get_user_by_id(user_id).await? {
        Some(user) => Ok(Some(user)),
        None => {
            warn!("Session references deleted user {}", user_id);
            session.flush().await?;
            Ok(None)
        }
    }
}
