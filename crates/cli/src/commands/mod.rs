//! CLI subcommands.

pub mod migrate;
pub mod seed;

use secrecy::SecretString;

/// Read the database URL, preferring `TEAKSPICE_DATABASE_URL` over `DATABASE_URL`.
fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();

    std::env::var("TEAKSPICE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
