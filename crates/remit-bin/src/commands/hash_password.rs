// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `hash-password` command.

use std::io::BufRead;

use remit_config::schema::DEFAULT_BCRYPT_COST;
use remit_core::PasswordHasher;
use remit_core::validation::is_strong_password;
use tracing::debug;

use crate::cli::{Cli, HashPasswordArgs};
use crate::error::{BinError, BinResult};

/// Prints a bcrypt hash suitable for `seed.employees[].password_hash`.
pub async fn hash_password(cli: &Cli, args: HashPasswordArgs) -> BinResult<()> {
    let password = match (args.stdin, args.password) {
        (true, _) => read_stdin_line()?,
        (false, Some(password)) => password,
        (false, None) => return Err(BinError::invalid_input("No password given")),
    };

    let cost = match args.cost {
        Some(cost) => cost,
        None => configured_cost(cli),
    };

    let hash = tokio::task::spawn_blocking(move || hash_for_seed(&password, cost))
        .await
        .map_err(|e| BinError::runtime(format!("hashing task: {}", e)))??;

    println!("{}", hash);
    Ok(())
}

/// Checks `password` against the employee policy and hashes it.
pub fn hash_for_seed(password: &str, cost: u32) -> BinResult<String> {
    if !is_strong_password(password) {
        return Err(BinError::invalid_input(
            "Weak password. Must be at least 8 characters with uppercase, number, and special character",
        ));
    }

    let hasher = PasswordHasher::new(cost)?;
    Ok(hasher.hash(password)?)
}

/// Uses the cost from the config file when it loads, else the default.
fn configured_cost(cli: &Cli) -> u32 {
    if !cli.config.exists() {
        return DEFAULT_BCRYPT_COST;
    }
    match remit_config::load_config(&cli.config) {
        Ok(config) => config.security.password.bcrypt_cost,
        Err(e) => {
            debug!(error = %e, "Config not usable, falling back to default cost");
            DEFAULT_BCRYPT_COST
        }
    }
}

fn read_stdin_line() -> BinResult<String> {
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(BinError::invalid_input("No password on stdin"));
    }
    Ok(password)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_for_seed() {
        let hash = hash_for_seed("Review!2024", 4).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(PasswordHasher::new(4).unwrap().verify("Review!2024", &hash));
    }

    #[test]
    fn test_hash_for_seed_rejects_weak_password() {
        let err = hash_for_seed("password", 4).unwrap_err();
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_hash_for_seed_rejects_bad_cost() {
        let err = hash_for_seed("Review!2024", 99).unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }
}
