//! Print an Argon2 PHC hash for a `[[users]] password_hash` config entry.

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let (Some(username), Some(password)) = (args.next(), args.next()) else {
        anyhow::bail!("Usage: hash_password <username> <password>");
    };

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
        .to_string();

    println!("[[users]]");
    println!("username = \"{}\"", username);
    println!("password_hash = \"{}\"", password_hash);
    Ok(())
}
