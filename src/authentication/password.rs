use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use secrecy::{ExposeSecret, SecretString};

/// Verified in place of a real hash when the email is unknown, so both
/// rejection paths cost one Argon2 verification.
const FALLBACK_PASSWORD_HASH: &str = "$argon2id$v=19$m=15000,t=2,p=1$\
    gZiV/M1gPc22ElAH/Jh1Hw$\
    CWOrkoo7oJBQ/iyh7uJ0LO2aLEfrHwTWllSAxT0zRno";

#[derive(thiserror::Error, Debug)]
pub enum AuthError {
    #[error("Invalid credentials.")]
    InvalidCredentials(#[source] anyhow::Error),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

#[tracing::instrument(name = "Compute password hash", skip(password))]
pub async fn compute_password_hash(password: SecretString) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")?
}

fn hash_password(password: &SecretString) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let params = Params::new(15000, 2, 1, None)
        .map_err(|e| anyhow::anyhow!("Failed to create Argon2 params: {}", e))?;

    let password_hash = Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    tracing::debug!("Password hash computed (length: {})", password_hash.len());
    Ok(password_hash)
}

/// Checks `candidate` against the stored hash. `None` means no such account;
/// the fallback hash is still verified and the result is always a rejection.
#[tracing::instrument(name = "Verify credentials", skip_all, fields(known_account = stored_hash.is_some()))]
pub async fn verify_credentials(
    stored_hash: Option<String>,
    candidate: SecretString,
) -> Result<(), AuthError> {
    let known_account = stored_hash.is_some();
    let expected = stored_hash.unwrap_or_else(|| FALLBACK_PASSWORD_HASH.to_string());

    tokio::task::spawn_blocking(move || verify_password_hash(&expected, &candidate))
        .await
        .context("Password verification task failed")??;

    if known_account {
        Ok(())
    } else {
        Err(AuthError::InvalidCredentials(anyhow::anyhow!("Unknown email.")))
    }
}

fn verify_password_hash(
    expected_password_hash: &str,
    password_candidate: &SecretString,
) -> Result<(), AuthError> {
    let expected_password_hash = PasswordHash::new(expected_password_hash)
        .map_err(|e| anyhow::anyhow!("Failed to parse hash in PHC string format: {}", e))?;

    Argon2::default()
        .verify_password(
            password_candidate.expose_secret().as_bytes(),
            &expected_password_hash,
        )
        .map_err(|e| AuthError::InvalidCredentials(anyhow::anyhow!("Invalid password: {}", e)))
}
