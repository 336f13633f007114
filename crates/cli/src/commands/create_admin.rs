use anyhow::bail;
use optiondesk_core::config_loader::ConfigLoader;
use optiondesk_core::types::UserRole;
use optiondesk_data::models::UserRecord;
use optiondesk_data::{DatabaseClient, Repositories};
use optiondesk_web_api::AuthService;
use tracing::info;

/// Creates an admin account directly in the database.
///
/// # Errors
/// Returns an error if the username or email is taken, or on database
/// failure.
pub async fn run(
    config_path: &str,
    username: String,
    email: String,
    password: &str,
    super_admin: bool,
) -> anyhow::Result<()> {
    if password.len() < 8 {
        bail!("password must be at least 8 characters");
    }

    let config = ConfigLoader::load_from(config_path)?;
    let db = DatabaseClient::new(&config.database.url, config.database.max_connections).await?;
    let repos = Repositories::new(db.pool());
    let auth = AuthService::new(&config.auth);

    if repos.users.get_by_username(&username).await?.is_some() {
        bail!("username '{username}' already taken");
    }
    if repos.users.get_by_email(&email).await?.is_some() {
        bail!("email '{email}' already registered");
    }

    let hash = auth.hash_password(password)?;
    let mut user = UserRecord::new(username, email, hash);
    let role = if super_admin {
        UserRole::SuperAdmin
    } else {
        UserRole::Admin
    };
    user.role = role.as_str().to_string();

    repos.users.insert(&user).await?;

    info!(user_id = %user.id, username = %user.username, role = role.as_str(), "admin created");
    println!("{}", user.id);
    Ok(())
}
